use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use shared_database::AppointmentRepository;
use shared_models::Appointment;

use crate::models::AppointmentError;

pub struct ConflictDetectionService {
    appointments: Arc<dyn AppointmentRepository>,
}

impl ConflictDetectionService {
    pub fn new(appointments: Arc<dyn AppointmentRepository>) -> Self {
        Self { appointments }
    }

    /// Occupying appointments of the doctor overlapping `[start, end)`,
    /// optionally ignoring one appointment.
    pub async fn find_conflicts(
        &self,
        doctor_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_appointment_id: Option<i64>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let existing = self.appointments.find_occupying(doctor_id, start, end).await?;

        let conflicts: Vec<Appointment> = existing
            .into_iter()
            .filter(|apt| Some(apt.id) != exclude_appointment_id)
            .filter(|apt| apt.blocks(start, end))
            .collect();

        debug!(
            "Doctor {} has {} conflicting appointments between {} and {}",
            doctor_id,
            conflicts.len(),
            start,
            end
        );
        Ok(conflicts)
    }

    pub async fn ensure_free(
        &self,
        doctor_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_appointment_id: Option<i64>,
    ) -> Result<(), AppointmentError> {
        let conflicts = self
            .find_conflicts(doctor_id, start, end, exclude_appointment_id)
            .await?;

        if let Some(first) = conflicts.first() {
            warn!(
                "Conflict detected for doctor {}: {} to {} overlaps {}",
                doctor_id, start, end, first.confirmation_id
            );
            return Err(AppointmentError::ConflictDetected);
        }
        Ok(())
    }
}
