use chrono::{DateTime, NaiveDateTime, Utc};

use shared_database::appointments::MAX_APPOINTMENT_MINUTES;

use crate::models::{AppointmentError, BookingInterval};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// RFC 3339, or ISO-8601 without an offset read as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, AppointmentError> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppointmentError::InvalidTime(format!("Unrecognized timestamp '{}'", value)))
}

pub fn parse_interval(start: &str, end: &str) -> Result<BookingInterval, AppointmentError> {
    Ok(BookingInterval {
        start: parse_timestamp(start)?,
        end: parse_timestamp(end)?,
    })
}

/// The interval must be a whole number of slots, at most one day long.
pub fn validate_interval(interval: BookingInterval, slot_minutes: i64) -> Result<(), AppointmentError> {
    if interval.end <= interval.start {
        return Err(AppointmentError::InvalidTime(
            "Slot end must be after slot start".to_string(),
        ));
    }

    if (interval.end - interval.start).num_seconds() % 60 != 0 {
        return Err(AppointmentError::ValidationError(
            "Slot length must be a whole number of minutes".to_string(),
        ));
    }

    let minutes = interval.duration_minutes();
    if minutes > MAX_APPOINTMENT_MINUTES {
        return Err(AppointmentError::ValidationError(format!(
            "Appointments may last at most {} minutes",
            MAX_APPOINTMENT_MINUTES
        )));
    }
    if slot_minutes > 0 && minutes % slot_minutes != 0 {
        return Err(AppointmentError::ValidationError(format!(
            "Slot length of {} minutes is not a multiple of {} minutes",
            minutes, slot_minutes
        )));
    }

    Ok(())
}

pub fn validate_reason(reason: &str) -> Result<String, AppointmentError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(AppointmentError::ValidationError("Reason is required".to_string()));
    }
    Ok(reason.to_string())
}
