use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use shared_models::PatientRef;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingSessionStatus {
    Initialized,
    InProgress,
    Completed,
    Failed,
    Abandoned,
}

impl BookingSessionStatus {
    /// No further updates are accepted once a session reaches one of these.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            BookingSessionStatus::Completed | BookingSessionStatus::Failed | BookingSessionStatus::Abandoned
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectedSlot {
    pub doctor_id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfirmationDetails {
    pub appointment_id: i64,
    pub confirmation_id: String,
    pub doctor_id: i64,
    pub date_time: DateTime<Utc>,
    pub duration_minutes: i32,
}

/// Conversation state of one booking flow, stored as JSON under
/// `booking_session:{session_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingState {
    pub session_id: String,
    pub user_id: i64,
    pub status: BookingSessionStatus,
    #[serde(default)]
    pub patient: Option<PatientRef>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub patient_dob: Option<NaiveDate>,
    #[serde(default)]
    pub is_self_booking: Option<bool>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub location_preference: Option<String>,
    #[serde(default)]
    pub specialty_preference: Option<String>,
    #[serde(default)]
    pub doctor_preference: Option<String>,
    #[serde(default)]
    pub selected_slot: Option<SelectedSlot>,
    #[serde(default)]
    pub confirmation: Option<ConfirmationDetails>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingState {
    pub fn new(session_id: String, user_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            session_id,
            user_id,
            status: BookingSessionStatus::Initialized,
            patient: None,
            patient_name: None,
            patient_dob: None,
            is_self_booking: None,
            reason: None,
            location_preference: None,
            specialty_preference: None,
            doctor_preference: None,
            selected_slot: None,
            confirmation: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the fields present in `update`; absent fields are kept.
    pub fn apply(&mut self, update: BookingStateUpdate) {
        if let Some(reason) = update.reason {
            self.reason = Some(reason);
        }
        if let Some(location) = update.location_preference {
            self.location_preference = Some(location);
        }
        if let Some(specialty) = update.specialty_preference {
            self.specialty_preference = Some(specialty);
        }
        if let Some(doctor) = update.doctor_preference {
            self.doctor_preference = Some(doctor);
        }
        if let Some(slot) = update.selected_slot {
            self.selected_slot = Some(slot);
        }
        if let Some(message) = update.error_message {
            self.error_message = Some(message);
        }
        if let Some(status) = update.status {
            self.status = status;
        }
    }
}

/// Partial update from the booking form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookingStateUpdate {
    pub reason: Option<String>,
    pub location_preference: Option<String>,
    pub specialty_preference: Option<String>,
    pub doctor_preference: Option<String>,
    pub selected_slot: Option<SelectedSlot>,
    pub error_message: Option<String>,
    pub status: Option<BookingSessionStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectPatientRequest {
    pub patient: PatientRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionStatus {
    pub session_id: String,
    pub valid: bool,
    pub ttl_seconds: Option<i64>,
    pub status: Option<BookingSessionStatus>,
}
