use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Open/open interval overlap: `[a_start, a_end)` and `[b_start, b_end)`
/// share at least one instant. Touching intervals do not overlap.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Requested,
    Confirmed,
    Canceled,
    Completed,
    Rescheduled,
}

impl AppointmentStatus {
    /// Statuses that hold the doctor's time.
    pub const OCCUPYING: [AppointmentStatus; 2] =
        [AppointmentStatus::Requested, AppointmentStatus::Confirmed];

    pub fn is_occupying(&self) -> bool {
        Self::OCCUPYING.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Requested => "REQUESTED",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Canceled => "CANCELED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Rescheduled => "RESCHEDULED",
        }
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;

        matches!(
            (self, next),
            (Requested, Confirmed)
                | (Requested, Canceled)
                | (Requested, Rescheduled)
                | (Confirmed, Canceled)
                | (Confirmed, Completed)
                | (Confirmed, Rescheduled)
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "REQUESTED" => Ok(AppointmentStatus::Requested),
            "CONFIRMED" => Ok(AppointmentStatus::Confirmed),
            "CANCELED" | "CANCELLED" => Ok(AppointmentStatus::Canceled),
            "COMPLETED" => Ok(AppointmentStatus::Completed),
            "RESCHEDULED" => Ok(AppointmentStatus::Rescheduled),
            other => Err(format!("Unknown appointment status: {}", other)),
        }
    }
}

/// Who the appointment is for. Exactly one of user or family member.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PatientRef {
    User(i64),
    FamilyMember(i64),
}

impl PatientRef {
    pub fn user_id(&self) -> Option<i64> {
        match self {
            PatientRef::User(id) => Some(*id),
            PatientRef::FamilyMember(_) => None,
        }
    }

    pub fn family_member_id(&self) -> Option<i64> {
        match self {
            PatientRef::User(_) => None,
            PatientRef::FamilyMember(id) => Some(*id),
        }
    }
}

impl fmt::Display for PatientRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatientRef::User(id) => write!(f, "user:{}", id),
            PatientRef::FamilyMember(id) => write!(f, "family_member:{}", id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: i64,
    pub doctor_id: i64,
    pub user_id: Option<i64>,
    pub family_member_id: Option<i64>,
    pub location_id: Option<i64>,
    pub date_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub reason: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub confirmation_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn start(&self) -> DateTime<Utc> {
        self.date_time
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.date_time + Duration::minutes(self.duration_minutes as i64)
    }

    pub fn patient(&self) -> Option<PatientRef> {
        match (self.user_id, self.family_member_id) {
            (Some(id), None) => Some(PatientRef::User(id)),
            (None, Some(id)) => Some(PatientRef::FamilyMember(id)),
            _ => None,
        }
    }

    /// True when this appointment holds time that intersects `[start, end)`.
    pub fn blocks(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.status.is_occupying() && intervals_overlap(self.start(), self.end(), start, end)
    }
}

/// Insert payload for a new appointment row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewAppointment {
    pub doctor_id: i64,
    pub user_id: Option<i64>,
    pub family_member_id: Option<i64>,
    pub location_id: Option<i64>,
    pub date_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub reason: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub confirmation_id: String,
}

impl NewAppointment {
    pub fn end(&self) -> DateTime<Utc> {
        self.date_time + Duration::minutes(self.duration_minutes as i64)
    }
}
