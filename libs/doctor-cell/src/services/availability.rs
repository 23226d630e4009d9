use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use shared_database::AppointmentRepository;

use crate::models::{
    AvailabilityQueryRequest, CandidateSlot, DateRange, Doctor, DoctorAvailabilityResponse, DoctorError,
};
use crate::services::repository::DoctorRepository;
use crate::services::slots::SlotGenerator;
use crate::state::DoctorState;

/// Longest range a single query may walk.
pub const MAX_QUERY_DAYS: i64 = 90;

pub struct AvailabilityService {
    doctors: Arc<dyn DoctorRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    generator: SlotGenerator,
    window_days: i64,
}

impl AvailabilityService {
    pub fn new(state: &DoctorState) -> Self {
        Self::with_parts(
            state.doctors.clone(),
            state.appointments.clone(),
            SlotGenerator::new(state.config.slot_minutes),
            state.config.availability_window_days,
        )
    }

    pub fn with_parts(
        doctors: Arc<dyn DoctorRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        generator: SlotGenerator,
        window_days: i64,
    ) -> Self {
        Self {
            doctors,
            appointments,
            generator,
            window_days,
        }
    }

    /// Fills in the default range: start defaults to today, end to
    /// `start + window_days`.
    pub fn resolve_range(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<DateRange, DoctorError> {
        let start = start_date.unwrap_or(today);
        let end = match end_date {
            Some(end) => end,
            None => start
                .checked_add_signed(Duration::days(self.window_days))
                .ok_or_else(|| out_of_calendar(start))?,
        };

        if end < start {
            return Err(DoctorError::InvalidDateRange(format!(
                "End date {} is before start date {}",
                end, start
            )));
        }
        if (end - start).num_days() > MAX_QUERY_DAYS {
            return Err(DoctorError::InvalidDateRange(format!(
                "Date range may span at most {} days",
                MAX_QUERY_DAYS
            )));
        }

        // Occupancy lookups reach a day past either end of the range.
        if start.pred_opt().is_none() {
            return Err(out_of_calendar(start));
        }
        let range = DateRange { start, end };
        range_bounds(range)?;

        Ok(range)
    }

    /// Bookable slots for every doctor matching the filter. Doctors without
    /// any free slot in range are left out.
    pub async fn query(
        &self,
        request: &AvailabilityQueryRequest,
        today: NaiveDate,
    ) -> Result<Vec<DoctorAvailabilityResponse>, DoctorError> {
        let range = self.resolve_range(request.start_date, request.end_date, today)?;
        let doctors = self.doctors.find_doctors(&request.filter()).await?;

        debug!(
            "Availability query matched {} doctors for {} to {}",
            doctors.len(),
            range.start,
            range.end
        );

        let mut results = Vec::new();
        for doctor in doctors {
            let slots = self.slots_for(&doctor, range).await?;
            if slots.is_empty() {
                continue;
            }

            results.push(DoctorAvailabilityResponse {
                doctor_id: doctor.id,
                doctor_name: doctor.full_name.clone(),
                specialty: doctor.specialty.clone(),
                location: doctor.location_name().to_string(),
                available_slots: slots,
            });
        }

        info!("Availability query returned {} doctors with free slots", results.len());
        Ok(results)
    }

    pub async fn doctor_slots(
        &self,
        doctor_id: i64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Vec<CandidateSlot>, DoctorError> {
        let range = self.resolve_range(start_date, end_date, today)?;

        let doctor = self
            .doctors
            .get_doctor(doctor_id)
            .await?
            .filter(|d| d.is_active)
            .ok_or(DoctorError::NotFound)?;

        self.slots_for(&doctor, range).await
    }

    async fn slots_for(&self, doctor: &Doctor, range: DateRange) -> Result<Vec<CandidateSlot>, DoctorError> {
        let schedules = self.doctors.get_weekly_availability(doctor.id).await?;
        if schedules.is_empty() {
            return Ok(Vec::new());
        }

        let (from, to) = range_bounds(range)?;
        let booked = self.appointments.find_occupying(doctor.id, from, to).await?;

        Ok(self.generator.generate(&schedules, &booked, range))
    }
}

/// `[start 00:00, end + 1 day 00:00)` in UTC.
pub fn range_bounds(range: DateRange) -> Result<(DateTime<Utc>, DateTime<Utc>), DoctorError> {
    let from = range.start.and_time(NaiveTime::MIN).and_utc();
    let to = range
        .end
        .succ_opt()
        .ok_or_else(|| out_of_calendar(range.end))?
        .and_time(NaiveTime::MIN)
        .and_utc();
    Ok((from, to))
}

fn out_of_calendar(date: NaiveDate) -> DoctorError {
    DoctorError::InvalidDateRange(format!("Date {} is outside the supported calendar", date))
}
