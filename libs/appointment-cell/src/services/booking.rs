use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use doctor_cell::{DirectoryService, DoctorRepository};
use patient_cell::{PatientRepository, PatientService};
use session_cell::{BookingSessionService, ConfirmationDetails, KeyValueStore};
use shared_database::AppointmentRepository;
use shared_models::{Appointment, AppointmentStatus, NewAppointment};

use crate::models::{
    AppointmentError, BookAppointmentRequest, BookingInterval, RescheduleAppointmentRequest, RescheduleOutcome,
};
use crate::services::confirmation::generate_confirmation_id;
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::{append_note, ensure_transition};
use crate::services::lock::DoctorLocks;
use crate::services::validation::{parse_interval, parse_timestamp, validate_interval, validate_reason};
use crate::state::AppointmentState;

/// Attempts at finding an unused confirmation id.
pub const MAX_CONFIRMATION_ATTEMPTS: usize = 3;

/// Turns a chosen slot into a CONFIRMED appointment.
///
/// Booking and rescheduling take the doctor's lock before re-checking for
/// conflicts and hold it until the insert has committed, so two overlapping
/// requests for one doctor can never both succeed.
pub struct AppointmentBookingService {
    directory: DirectoryService,
    patients: PatientService,
    sessions: BookingSessionService,
    appointments: Arc<dyn AppointmentRepository>,
    conflict_service: ConflictDetectionService,
    locks: Arc<DoctorLocks>,
    slot_minutes: i64,
}

impl AppointmentBookingService {
    pub fn new(state: &AppointmentState) -> Self {
        Self::with_parts(
            state.doctors.clone(),
            state.patients.clone(),
            state.appointments.clone(),
            state.sessions.clone(),
            state.locks.clone(),
            state.config.slot_minutes,
            state.config.session_ttl_seconds,
        )
    }

    pub fn with_parts(
        doctors: Arc<dyn DoctorRepository>,
        patients: Arc<dyn PatientRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        sessions: Arc<dyn KeyValueStore>,
        locks: Arc<DoctorLocks>,
        slot_minutes: i64,
        session_ttl_seconds: u64,
    ) -> Self {
        Self {
            directory: DirectoryService::with_repository(doctors),
            patients: PatientService::new(patients.clone()),
            sessions: BookingSessionService::with_parts(sessions, patients, session_ttl_seconds),
            conflict_service: ConflictDetectionService::new(appointments.clone()),
            appointments,
            locks,
            slot_minutes,
        }
    }

    pub async fn book_appointment(&self, request: BookAppointmentRequest) -> Result<Appointment, AppointmentError> {
        let interval = parse_interval(&request.slot_start, &request.slot_end)?;
        validate_interval(interval, self.slot_minutes)?;
        let reason = validate_reason(&request.reason)?;

        let doctor = self.directory.get_doctor(request.doctor_id).await?;
        self.patients.resolve(request.patient).await?;
        if let Some(session_id) = request.session_id.as_deref() {
            self.sessions.authorize_booking(session_id, request.patient).await?;
        }

        info!(
            "Booking doctor {} from {} to {} for {}",
            doctor.id, interval.start, interval.end, request.patient
        );

        let draft = NewAppointment {
            doctor_id: doctor.id,
            user_id: request.patient.user_id(),
            family_member_id: request.patient.family_member_id(),
            location_id: doctor.location_id,
            date_time: interval.start,
            duration_minutes: interval.duration_minutes() as i32,
            reason,
            status: AppointmentStatus::Confirmed,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
            confirmation_id: String::new(),
        };

        let appointment = self.commit(draft, interval).await?;
        info!(
            "Appointment {} booked with doctor {}",
            appointment.confirmation_id, appointment.doctor_id
        );

        if let Some(session_id) = request.session_id.as_deref() {
            self.record_in_session(session_id, &appointment).await;
        }

        Ok(appointment)
    }

    /// Moves an appointment by booking its replacement and marking the
    /// original RESCHEDULED, both under the doctor's lock.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: i64,
        request: RescheduleAppointmentRequest,
    ) -> Result<RescheduleOutcome, AppointmentError> {
        let existing = self
            .appointments
            .get(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;
        ensure_transition(existing.status, AppointmentStatus::Rescheduled)?;

        let start = parse_timestamp(&request.new_start)?;
        let duration = request.duration_minutes.unwrap_or(existing.duration_minutes);
        if duration <= 0 {
            return Err(AppointmentError::ValidationError(
                "Duration must be positive".to_string(),
            ));
        }
        let interval = BookingInterval {
            start,
            end: start + Duration::minutes(duration as i64),
        };
        validate_interval(interval, self.slot_minutes)?;
        self.directory.get_doctor(existing.doctor_id).await?;

        let _guard = self.locks.acquire(existing.doctor_id).await;

        // status may have changed while waiting for the lock
        let current = self
            .appointments
            .get(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;
        ensure_transition(current.status, AppointmentStatus::Rescheduled)?;

        self.conflict_service
            .ensure_free(current.doctor_id, interval.start, interval.end, Some(current.id))
            .await?;

        let draft = NewAppointment {
            doctor_id: current.doctor_id,
            user_id: current.user_id,
            family_member_id: current.family_member_id,
            location_id: current.location_id,
            date_time: interval.start,
            duration_minutes: duration,
            reason: current.reason.clone(),
            status: AppointmentStatus::Confirmed,
            notes: current.notes.clone(),
            confirmation_id: String::new(),
        };
        let replacement = self.insert_with_fresh_id(draft).await?;

        let note = append_note(
            current.notes.as_deref(),
            &format!("Rescheduled to {}", replacement.confirmation_id),
        );
        let previous = match self
            .appointments
            .update_status(current.id, AppointmentStatus::Rescheduled, Some(note))
            .await
        {
            Ok(previous) => previous,
            Err(e) => {
                error!(
                    "Failed to retire appointment {} after rescheduling, cancelling {}: {}",
                    current.confirmation_id, replacement.confirmation_id, e
                );
                if let Err(undo) = self
                    .appointments
                    .update_status(replacement.id, AppointmentStatus::Canceled, None)
                    .await
                {
                    error!("Failed to cancel replacement {}: {}", replacement.confirmation_id, undo);
                }
                return Err(e.into());
            }
        };

        info!(
            "Appointment {} rescheduled to {}",
            previous.confirmation_id, replacement.confirmation_id
        );

        Ok(RescheduleOutcome {
            previous,
            appointment: replacement,
        })
    }

    /// Conflict re-check and insert as one unit per doctor.
    async fn commit(&self, draft: NewAppointment, interval: BookingInterval) -> Result<Appointment, AppointmentError> {
        let _guard = self.locks.acquire(draft.doctor_id).await;
        debug!("Acquired booking lock for doctor {}", draft.doctor_id);

        self.conflict_service
            .ensure_free(draft.doctor_id, interval.start, interval.end, None)
            .await?;

        self.insert_with_fresh_id(draft).await
    }

    async fn insert_with_fresh_id(&self, draft: NewAppointment) -> Result<Appointment, AppointmentError> {
        for attempt in 1..=MAX_CONFIRMATION_ATTEMPTS {
            let candidate = NewAppointment {
                confirmation_id: generate_confirmation_id(),
                ..draft.clone()
            };

            match self.appointments.insert(candidate).await {
                Ok(appointment) => return Ok(appointment),
                Err(e) if e.is_unique_violation() && attempt < MAX_CONFIRMATION_ATTEMPTS => {
                    warn!("Confirmation id collision on attempt {}, retrying", attempt);
                }
                Err(e) => {
                    if e.is_exclusion_violation() {
                        warn!("Storage rejected overlapping appointment for doctor {}", draft.doctor_id);
                    } else {
                        error!("Failed to insert appointment for doctor {}: {}", draft.doctor_id, e);
                    }
                    return Err(e.into());
                }
            }
        }

        Err(AppointmentError::DatabaseError(
            "Could not allocate a unique confirmation id".to_string(),
        ))
    }

    async fn record_in_session(&self, session_id: &str, appointment: &Appointment) {
        let details = ConfirmationDetails {
            appointment_id: appointment.id,
            confirmation_id: appointment.confirmation_id.clone(),
            doctor_id: appointment.doctor_id,
            date_time: appointment.date_time,
            duration_minutes: appointment.duration_minutes,
        };

        if let Err(e) = self.sessions.record_confirmation(session_id, details).await {
            warn!(
                "Appointment {} booked but session {} was not updated: {}",
                appointment.confirmation_id, session_id, e
            );
        }
    }
}
