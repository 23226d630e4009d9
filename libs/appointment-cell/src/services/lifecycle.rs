use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

use patient_cell::PatientRepository;
use shared_database::AppointmentRepository;
use shared_models::{Appointment, AppointmentStatus};

use crate::models::AppointmentError;
use crate::services::lock::DoctorLocks;
use crate::state::AppointmentState;

pub fn ensure_transition(from: AppointmentStatus, to: AppointmentStatus) -> Result<(), AppointmentError> {
    if !from.can_transition_to(to) {
        warn!("Invalid status transition attempted: {} -> {}", from, to);
        return Err(AppointmentError::InvalidStatusTransition { from, to });
    }
    Ok(())
}

/// Adds a line to free-text notes.
pub fn append_note(existing: Option<&str>, line: &str) -> String {
    match existing.map(str::trim).filter(|notes| !notes.is_empty()) {
        Some(notes) => format!("{}\n{}", notes, line),
        None => line.to_string(),
    }
}

/// Lookups and status changes after booking. Status changes take the same
/// doctor lock as booking and rescheduling.
pub struct AppointmentLifecycleService {
    appointments: Arc<dyn AppointmentRepository>,
    patients: Arc<dyn PatientRepository>,
    locks: Arc<DoctorLocks>,
}

impl AppointmentLifecycleService {
    pub fn new(state: &AppointmentState) -> Self {
        Self::with_parts(state.appointments.clone(), state.patients.clone(), state.locks.clone())
    }

    pub fn with_parts(
        appointments: Arc<dyn AppointmentRepository>,
        patients: Arc<dyn PatientRepository>,
        locks: Arc<DoctorLocks>,
    ) -> Self {
        Self {
            appointments,
            patients,
            locks,
        }
    }

    /// Looks up by numeric id or by confirmation id.
    pub async fn get_appointment(&self, reference: &str) -> Result<Appointment, AppointmentError> {
        let found = match reference.parse::<i64>() {
            Ok(id) => self.appointments.get(id).await?,
            Err(_) => self.appointments.get_by_confirmation_id(reference).await?,
        };
        found.ok_or(AppointmentError::NotFound)
    }

    /// The user's own appointments plus those of their authorized family
    /// members, newest first.
    pub async fn list_user_appointments(&self, user_id: i64) -> Result<Vec<Appointment>, AppointmentError> {
        let members: Vec<i64> = self
            .patients
            .list_authorized_family_members(user_id)
            .await?
            .iter()
            .map(|member| member.id)
            .collect();

        let appointments = self.appointments.list_for_user(user_id, &members).await?;
        debug!("User {} has {} appointments", user_id, appointments.len());
        Ok(appointments)
    }

    pub async fn cancel_appointment(
        &self,
        appointment_id: i64,
        reason: Option<String>,
    ) -> Result<Appointment, AppointmentError> {
        let (appointment, _guard) = self.load_locked(appointment_id).await?;
        ensure_transition(appointment.status, AppointmentStatus::Canceled)?;

        let notes = reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|r| append_note(appointment.notes.as_deref(), &format!("Cancellation reason: {}", r)));

        let canceled = self
            .appointments
            .update_status(appointment_id, AppointmentStatus::Canceled, notes)
            .await?;

        info!("Appointment {} cancelled", canceled.confirmation_id);
        Ok(canceled)
    }

    pub async fn complete_appointment(&self, appointment_id: i64) -> Result<Appointment, AppointmentError> {
        let (appointment, _guard) = self.load_locked(appointment_id).await?;
        ensure_transition(appointment.status, AppointmentStatus::Completed)?;

        let completed = self
            .appointments
            .update_status(appointment_id, AppointmentStatus::Completed, None)
            .await?;

        info!("Appointment {} completed", completed.confirmation_id);
        Ok(completed)
    }

    async fn load(&self, appointment_id: i64) -> Result<Appointment, AppointmentError> {
        self.appointments
            .get(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    /// Loads the appointment again once its doctor's lock is held, so the
    /// caller sees any change made by a booking or reschedule that held it.
    async fn load_locked(&self, appointment_id: i64) -> Result<(Appointment, OwnedMutexGuard<()>), AppointmentError> {
        let doctor_id = self.load(appointment_id).await?.doctor_id;
        let guard = self.locks.acquire(doctor_id).await;
        debug!("Acquired lifecycle lock for doctor {}", doctor_id);

        let appointment = self.load(appointment_id).await?;
        Ok((appointment, guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_transition_rules() {
        assert!(ensure_transition(AppointmentStatus::Requested, AppointmentStatus::Confirmed).is_ok());
        assert!(ensure_transition(AppointmentStatus::Confirmed, AppointmentStatus::Completed).is_ok());
        assert_matches!(
            ensure_transition(AppointmentStatus::Canceled, AppointmentStatus::Confirmed),
            Err(AppointmentError::InvalidStatusTransition { .. })
        );
        assert_matches!(
            ensure_transition(AppointmentStatus::Requested, AppointmentStatus::Completed),
            Err(AppointmentError::InvalidStatusTransition { .. })
        );
    }

    #[test]
    fn test_append_note() {
        assert_eq!(append_note(None, "a"), "a");
        assert_eq!(append_note(Some("  "), "a"), "a");
        assert_eq!(append_note(Some("first"), "second"), "first\nsecond");
    }
}
