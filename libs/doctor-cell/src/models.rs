use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::DbError;
use shared_models::error::AppError;

// ==============================================================================
// DIRECTORY MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Specialty {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    pub id: i64,
    pub full_name: String,
    pub specialty: String,
    pub location_id: Option<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub location: Option<Location>,
}

impl Doctor {
    pub fn location_name(&self) -> &str {
        self.location.as_ref().map(|l| l.name.as_str()).unwrap_or("")
    }
}

fn default_true() -> bool {
    true
}

/// Filters for the doctor directory. Specialty and location match exactly,
/// the name matches as a case-insensitive substring.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DoctorFilter {
    pub specialty: Option<String>,
    pub location: Option<String>,
    pub doctor_name: Option<String>,
}

impl DoctorFilter {
    pub fn matches(&self, doctor: &Doctor) -> bool {
        if !doctor.is_active {
            return false;
        }
        if let Some(specialty) = self.specialty.as_deref() {
            if doctor.specialty != specialty {
                return false;
            }
        }
        if let Some(location) = self.location.as_deref() {
            if doctor.location_name() != location {
                return false;
            }
        }
        if let Some(name) = self.doctor_name.as_deref() {
            if !doctor.full_name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

// ==============================================================================
// AVAILABILITY MODELS
// ==============================================================================

/// One recurring weekly window. `day_of_week` counts from Monday = 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyAvailability {
    pub id: i64,
    pub doctor_id: i64,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

impl WeeklyAvailability {
    pub fn weekday(&self) -> Option<Weekday> {
        match self.day_of_week {
            0 => Some(Weekday::Mon),
            1 => Some(Weekday::Tue),
            2 => Some(Weekday::Wed),
            3 => Some(Weekday::Thu),
            4 => Some(Weekday::Fri),
            5 => Some(Weekday::Sat),
            6 => Some(Weekday::Sun),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), DoctorError> {
        if self.weekday().is_none() {
            return Err(DoctorError::InvalidSchedule(format!(
                "Day of week must be between 0 (Monday) and 6 (Sunday), got {}",
                self.day_of_week
            )));
        }
        if self.start_time >= self.end_time {
            return Err(DoctorError::InvalidSchedule(format!(
                "Start time {} must be before end time {}",
                self.start_time, self.end_time
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct CandidateSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilityQueryRequest {
    pub specialty: Option<String>,
    pub location: Option<String>,
    pub doctor_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl AvailabilityQueryRequest {
    pub fn filter(&self) -> DoctorFilter {
        DoctorFilter {
            specialty: self.specialty.clone(),
            location: self.location.clone(),
            doctor_name: self.doctor_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorAvailabilityResponse {
    pub doctor_id: i64,
    pub doctor_name: String,
    pub specialty: String,
    pub location: String,
    pub available_slots: Vec<CandidateSlot>,
}

/// Inclusive calendar range the generator walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DbError> for DoctorError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Unavailable(msg) => DoctorError::StorageUnavailable(msg),
            other => DoctorError::DatabaseError(other.to_string()),
        }
    }
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
            DoctorError::InvalidDateRange(msg) | DoctorError::InvalidSchedule(msg) => {
                AppError::ValidationError(msg)
            }
            DoctorError::StorageUnavailable(msg) => AppError::StorageUnavailable(msg),
            DoctorError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
