use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, warn};

use shared_models::Appointment;

use crate::models::{CandidateSlot, DateRange, WeeklyAvailability};

pub const DEFAULT_SLOT_MINUTES: i64 = 30;

/// Turns recurring weekly windows into fixed-length bookable slots.
///
/// Pure computation: callers supply the schedule rows and the occupying
/// appointments. Windows are processed independently, so overlapping source
/// windows yield overlapping (or duplicate) candidates. A trailing period
/// shorter than one slot is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGenerator {
    slot_minutes: i64,
}

impl Default for SlotGenerator {
    fn default() -> Self {
        Self {
            slot_minutes: DEFAULT_SLOT_MINUTES,
        }
    }
}

impl SlotGenerator {
    /// `AppConfig` only yields positive lengths. Other callers passing a
    /// non-positive length get the default.
    pub fn new(slot_minutes: i64) -> Self {
        if slot_minutes <= 0 {
            warn!("Slot length {} is not positive, using {}", slot_minutes, DEFAULT_SLOT_MINUTES);
            return Self::default();
        }
        Self { slot_minutes }
    }

    pub fn slot_minutes(&self) -> i64 {
        self.slot_minutes
    }

    pub fn slot_length(&self) -> Duration {
        Duration::minutes(self.slot_minutes)
    }

    /// Slots for every date in `range` (inclusive), ordered by date then start,
    /// with every slot intersecting an occupying appointment removed.
    pub fn generate(
        &self,
        schedules: &[WeeklyAvailability],
        booked: &[Appointment],
        range: DateRange,
    ) -> Vec<CandidateSlot> {
        let windows: Vec<&WeeklyAvailability> = schedules
            .iter()
            .filter(|schedule| schedule.is_available)
            .filter(|schedule| match schedule.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!("Skipping schedule {} of doctor {}: {}", schedule.id, schedule.doctor_id, e);
                    false
                }
            })
            .collect();

        let mut slots = Vec::new();

        for date in range.start.iter_days().take_while(|d| *d <= range.end) {
            let mut day_slots: Vec<CandidateSlot> = windows
                .iter()
                .filter(|window| window.weekday() == Some(date.weekday()))
                .flat_map(|window| self.window_slots(date, window))
                .filter(|slot| !booked.iter().any(|apt| apt.blocks(slot.start, slot.end)))
                .collect();

            // stable: duplicates from overlapping windows keep their relative order
            day_slots.sort_by_key(|slot| slot.start);
            slots.extend(day_slots);
        }

        debug!(
            "Generated {} slots between {} and {}",
            slots.len(),
            range.start,
            range.end
        );
        slots
    }

    /// Raw candidates of one window on one date, before conflict removal.
    pub fn window_slots(&self, date: NaiveDate, window: &WeeklyAvailability) -> Vec<CandidateSlot> {
        let step = self.slot_length();
        let window_end = date.and_time(window.end_time).and_utc();
        let mut current = date.and_time(window.start_time).and_utc();
        let mut slots = Vec::new();

        while current + step <= window_end {
            slots.push(CandidateSlot {
                start: current,
                end: current + step,
            });
            current += step;
        }

        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveTime, TimeZone, Utc};
    use shared_models::AppointmentStatus;

    // 2026-10-19 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn at(date: NaiveDate, h: u32, m: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_hms_opt(h, m, 0).unwrap())
    }

    fn window(id: i64, day: i16, start: (u32, u32), end: (u32, u32)) -> WeeklyAvailability {
        WeeklyAvailability {
            id,
            doctor_id: 1,
            day_of_week: day,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            is_available: true,
        }
    }

    fn booked(start: DateTime<Utc>, minutes: i32, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: 1,
            doctor_id: 1,
            user_id: Some(1),
            family_member_id: None,
            location_id: None,
            date_time: start,
            duration_minutes: minutes,
            reason: "existing".to_string(),
            status,
            notes: None,
            confirmation_id: "BK-AAAAAAAA".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    fn single_day(date: NaiveDate) -> DateRange {
        DateRange { start: date, end: date }
    }

    #[test]
    fn test_one_hour_window_yields_two_slots() {
        let slots = SlotGenerator::default().generate(&[window(1, 0, (9, 0), (10, 0))], &[], single_day(monday()));

        assert_eq!(
            slots,
            vec![
                CandidateSlot { start: at(monday(), 9, 0), end: at(monday(), 9, 30) },
                CandidateSlot { start: at(monday(), 9, 30), end: at(monday(), 10, 0) },
            ]
        );
    }

    #[test]
    fn test_straddling_appointment_removes_both_slots() {
        let existing = booked(at(monday(), 9, 15), 30, AppointmentStatus::Confirmed);
        let slots = SlotGenerator::default().generate(
            &[window(1, 0, (9, 0), (10, 0))],
            &[existing],
            single_day(monday()),
        );

        assert!(slots.is_empty());
    }

    #[test]
    fn test_adjacent_appointment_does_not_block() {
        let existing = booked(at(monday(), 10, 0), 30, AppointmentStatus::Confirmed);
        let slots = SlotGenerator::default().generate(
            &[window(1, 0, (9, 0), (10, 30))],
            &[existing],
            single_day(monday()),
        );

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].end, at(monday(), 10, 0));
    }

    #[test]
    fn test_free_statuses_do_not_block() {
        let canceled = booked(at(monday(), 9, 0), 60, AppointmentStatus::Canceled);
        let rescheduled = booked(at(monday(), 9, 0), 60, AppointmentStatus::Rescheduled);
        let slots = SlotGenerator::default().generate(
            &[window(1, 0, (9, 0), (10, 0))],
            &[canceled, rescheduled],
            single_day(monday()),
        );

        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn test_window_outside_range_is_empty() {
        // Tuesday-only availability, Monday-only range
        let slots = SlotGenerator::default().generate(&[window(1, 1, (9, 0), (17, 0))], &[], single_day(monday()));
        assert!(slots.is_empty());
    }

    #[test]
    fn test_partial_trailing_period_is_dropped() {
        let slots = SlotGenerator::default().generate(&[window(1, 0, (9, 0), (10, 45))], &[], single_day(monday()));

        assert_eq!(slots.len(), 3);
        assert_eq!(slots.last().unwrap().end, at(monday(), 10, 30));
    }

    #[test]
    fn test_overlapping_windows_keep_duplicates_in_start_order() {
        let slots = SlotGenerator::default().generate(
            &[window(1, 0, (9, 0), (10, 0)), window(2, 0, (8, 30), (9, 30))],
            &[],
            single_day(monday()),
        );

        let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
        assert_eq!(
            starts,
            vec![at(monday(), 8, 30), at(monday(), 9, 0), at(monday(), 9, 0), at(monday(), 9, 30)]
        );
    }

    #[test]
    fn test_inactive_and_invalid_windows_are_skipped() {
        let mut inactive = window(1, 0, (9, 0), (10, 0));
        inactive.is_available = false;
        let inverted = window(2, 0, (12, 0), (11, 0));
        let bad_day = window(3, 9, (9, 0), (10, 0));

        let slots = SlotGenerator::default().generate(&[inactive, inverted, bad_day], &[], single_day(monday()));
        assert!(slots.is_empty());
    }

    #[test]
    fn test_multi_day_ordering_and_idempotence() {
        let schedules = vec![
            window(1, 2, (14, 0), (15, 0)), // Wednesday
            window(2, 0, (9, 0), (10, 0)),  // Monday
        ];
        let range = DateRange {
            start: monday(),
            end: monday() + Duration::days(6),
        };
        let generator = SlotGenerator::default();

        let first = generator.generate(&schedules, &[], range);
        let second = generator.generate(&schedules, &[], range);

        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
        assert!(first.windows(2).all(|pair| pair[0].start <= pair[1].start));
        assert_eq!(first[2].start, at(monday() + Duration::days(2), 14, 0));
    }

    #[test]
    fn test_every_slot_has_fixed_length_inside_its_window() {
        let schedules = vec![
            window(1, 0, (8, 0), (12, 15)),
            window(2, 3, (13, 10), (17, 0)),
            window(3, 6, (0, 0), (2, 0)),
        ];
        let range = DateRange {
            start: monday(),
            end: monday() + Duration::days(13),
        };
        let generator = SlotGenerator::default();
        let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap();

        for slot in generator.generate(&schedules, &[], range) {
            assert_eq!(slot.end - slot.start, Duration::minutes(30));
            let date = slot.start.date_naive();
            assert!(schedules.iter().any(|w| {
                w.weekday() == Some(date.weekday())
                    && slot.start >= at(date, 0, 0) + (w.start_time - midnight)
                    && slot.end <= at(date, 0, 0) + (w.end_time - midnight)
            }));
        }
    }

    #[test]
    fn test_custom_slot_length() {
        let generator = SlotGenerator::new(20);
        let slots = generator.generate(&[window(1, 0, (9, 0), (10, 0))], &[], single_day(monday()));
        assert_eq!(slots.len(), 3);
        assert_eq!(SlotGenerator::new(0), SlotGenerator::default());
    }
}
