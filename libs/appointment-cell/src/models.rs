use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use doctor_cell::DoctorError;
use patient_cell::PatientError;
use session_cell::{SessionError, StoreError};
use shared_database::DbError;
use shared_models::error::AppError;
use shared_models::{Appointment, AppointmentStatus, PatientRef};

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Body of `POST /book`. Timestamps are RFC 3339, or ISO-8601 without an
/// offset, which is read as UTC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: i64,
    pub slot_start: String,
    pub slot_end: String,
    pub reason: String,
    pub notes: Option<String>,
    pub patient: PatientRef,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_start: String,
    pub duration_minutes: Option<i32>,
}

/// Validated booking interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BookingInterval {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RescheduleOutcome {
    pub previous: Appointment,
    pub appointment: Appointment,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Booking session not found: {0}")]
    SessionNotFound(String),

    #[error("Slot is no longer available")]
    ConflictDetected,

    #[error("Invalid appointment time: {0}")]
    InvalidTime(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Appointment cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DbError> for AppointmentError {
    fn from(err: DbError) -> Self {
        if err.is_exclusion_violation() {
            return AppointmentError::ConflictDetected;
        }
        match err {
            DbError::Unavailable(msg) => AppointmentError::StorageUnavailable(msg),
            DbError::NotFound(_) => AppointmentError::NotFound,
            other => AppointmentError::DatabaseError(other.to_string()),
        }
    }
}

impl From<DoctorError> for AppointmentError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppointmentError::DoctorNotFound,
            DoctorError::StorageUnavailable(msg) => AppointmentError::StorageUnavailable(msg),
            other => AppointmentError::DatabaseError(other.to_string()),
        }
    }
}

impl From<PatientError> for AppointmentError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::UserNotFound | PatientError::FamilyMemberNotFound => {
                AppointmentError::PatientNotFound(err.to_string())
            }
            PatientError::StorageUnavailable(msg) => AppointmentError::StorageUnavailable(msg),
            PatientError::DatabaseError(msg) => AppointmentError::DatabaseError(msg),
        }
    }
}

impl From<SessionError> for AppointmentError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(id) => AppointmentError::SessionNotFound(id),
            SessionError::Closed(_) => AppointmentError::ValidationError(err.to_string()),
            SessionError::Patient(e) => e.into(),
            SessionError::Store(StoreError::Unavailable(msg)) => AppointmentError::StorageUnavailable(msg),
            other => AppointmentError::DatabaseError(other.to_string()),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound
            | AppointmentError::DoctorNotFound
            | AppointmentError::PatientNotFound(_)
            | AppointmentError::SessionNotFound(_) => AppError::NotFound(err.to_string()),
            AppointmentError::ConflictDetected => AppError::Conflict(err.to_string()),
            AppointmentError::InvalidTime(_)
            | AppointmentError::ValidationError(_)
            | AppointmentError::InvalidStatusTransition { .. } => AppError::ValidationError(err.to_string()),
            AppointmentError::StorageUnavailable(msg) => AppError::StorageUnavailable(msg),
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
