mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::Duration;

use appointment_cell::{
    is_valid_confirmation_id, AppointmentBookingService, AppointmentError, AppointmentLifecycleService,
    RescheduleAppointmentRequest,
};
use session_cell::{BookingSessionService, BookingSessionStatus, InMemoryStore};
use shared_database::{AppointmentRepository, InMemoryAppointmentRepository};
use shared_models::{AppointmentStatus, PatientRef};

use common::*;

// ==============================================================================
// BOOKING
// ==============================================================================

#[tokio::test]
async fn test_book_free_slot_is_confirmed() {
    let fixture = Fixture::new().await;

    let appointment = fixture
        .service()
        .book_appointment(request(monday_at(9, 0), monday_at(9, 30)))
        .await
        .unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Confirmed);
    assert_eq!(appointment.doctor_id, DOCTOR_ID);
    assert_eq!(appointment.user_id, Some(USER_ID));
    assert_eq!(appointment.family_member_id, None);
    assert_eq!(appointment.location_id, Some(1));
    assert_eq!(appointment.date_time, monday_at(9, 0));
    assert_eq!(appointment.duration_minutes, 30);
    assert!(is_valid_confirmation_id(&appointment.confirmation_id));
    assert_eq!(fixture.appointments.all().await.len(), 1);
}

#[tokio::test]
async fn test_book_for_family_member() {
    let fixture = Fixture::new().await;
    let mut req = request(monday_at(9, 0), monday_at(10, 0));
    req.patient = PatientRef::FamilyMember(CHILD_ID);
    req.notes = Some("Bring vaccination card".to_string());

    let appointment = fixture.service().book_appointment(req).await.unwrap();

    assert_eq!(appointment.user_id, None);
    assert_eq!(appointment.family_member_id, Some(CHILD_ID));
    assert_eq!(appointment.duration_minutes, 60);
    assert_eq!(appointment.notes.as_deref(), Some("Bring vaccination card"));
}

#[tokio::test]
async fn test_overlapping_booking_conflicts() {
    let fixture = Fixture::new().await;
    let service = fixture.service();

    service
        .book_appointment(request(monday_at(9, 15), monday_at(9, 45)))
        .await
        .unwrap();

    assert_matches!(
        service.book_appointment(request(monday_at(9, 0), monday_at(9, 30))).await,
        Err(AppointmentError::ConflictDetected)
    );
    assert_matches!(
        service.book_appointment(request(monday_at(9, 30), monday_at(10, 0))).await,
        Err(AppointmentError::ConflictDetected)
    );
    assert_eq!(fixture.appointments.all().await.len(), 1);
}

#[tokio::test]
async fn test_adjacent_slots_do_not_conflict() {
    let fixture = Fixture::new().await;
    let service = fixture.service();

    service
        .book_appointment(request(monday_at(9, 0), monday_at(9, 30)))
        .await
        .unwrap();
    let next = service
        .book_appointment(request(monday_at(9, 30), monday_at(10, 0)))
        .await
        .unwrap();

    assert_eq!(next.date_time, monday_at(9, 30));
}

#[tokio::test]
async fn test_cancelled_appointment_frees_the_slot() {
    let fixture = Fixture::new().await;
    let service = fixture.service();

    let first = service
        .book_appointment(request(monday_at(9, 0), monday_at(9, 30)))
        .await
        .unwrap();
    fixture.lifecycle()
        .cancel_appointment(first.id, None)
        .await
        .unwrap();

    let second = service
        .book_appointment(request(monday_at(9, 0), monday_at(9, 30)))
        .await
        .unwrap();
    assert_ne!(first.confirmation_id, second.confirmation_id);
}

#[tokio::test]
async fn test_inactive_doctor_cannot_be_booked() {
    let fixture = Fixture::new().await;
    let mut req = request(monday_at(9, 0), monday_at(9, 30));
    req.doctor_id = INACTIVE_DOCTOR_ID;

    assert_matches!(
        fixture.service().book_appointment(req).await,
        Err(AppointmentError::DoctorNotFound)
    );
}

// ==============================================================================
// REJECTIONS BEFORE THE CONFLICT CHECK
// ==============================================================================

#[tokio::test]
async fn test_unknown_doctor_is_not_found() {
    let fixture = Fixture::new().await;
    let mut req = request(monday_at(9, 0), monday_at(9, 30));
    req.doctor_id = 999;

    assert_matches!(
        fixture.service().book_appointment(req).await,
        Err(AppointmentError::DoctorNotFound)
    );
    assert!(fixture.appointments.all().await.is_empty());
}

#[tokio::test]
async fn test_unresolvable_patients_are_not_found() {
    let fixture = Fixture::new().await;
    let service = fixture.service();

    let mut unknown_user = request(monday_at(9, 0), monday_at(9, 30));
    unknown_user.patient = PatientRef::User(404);
    assert_matches!(
        service.book_appointment(unknown_user).await,
        Err(AppointmentError::PatientNotFound(_))
    );

    let mut unauthorized = request(monday_at(9, 0), monday_at(9, 30));
    unauthorized.patient = PatientRef::FamilyMember(UNAUTHORIZED_MEMBER_ID);
    assert_matches!(
        service.book_appointment(unauthorized).await,
        Err(AppointmentError::PatientNotFound(_))
    );
}

#[tokio::test]
async fn test_malformed_requests_are_rejected() {
    let fixture = Fixture::new().await;
    let service = fixture.service();

    let mut garbage = request(monday_at(9, 0), monday_at(9, 30));
    garbage.slot_start = "next monday".to_string();
    assert_matches!(service.book_appointment(garbage).await, Err(AppointmentError::InvalidTime(_)));

    assert_matches!(
        service.book_appointment(request(monday_at(9, 30), monday_at(9, 0))).await,
        Err(AppointmentError::InvalidTime(_))
    );
    assert_matches!(
        service.book_appointment(request(monday_at(9, 0), monday_at(9, 0))).await,
        Err(AppointmentError::InvalidTime(_))
    );
    assert_matches!(
        service.book_appointment(request(monday_at(9, 0), monday_at(9, 20))).await,
        Err(AppointmentError::ValidationError(_))
    );

    let mut no_reason = request(monday_at(9, 0), monday_at(9, 30));
    no_reason.reason = "   ".to_string();
    assert_matches!(service.book_appointment(no_reason).await, Err(AppointmentError::ValidationError(_)));

    assert!(fixture.appointments.all().await.is_empty());
}

#[tokio::test]
async fn test_naive_timestamps_are_utc() {
    let fixture = Fixture::new().await;
    let mut req = request(monday_at(9, 0), monday_at(9, 30));
    req.slot_start = "2026-10-19T09:00:00".to_string();
    req.slot_end = "2026-10-19T09:30:00".to_string();

    let appointment = fixture.service().book_appointment(req).await.unwrap();
    assert_eq!(appointment.date_time, monday_at(9, 0));
}

// ==============================================================================
// SESSIONS
// ==============================================================================

#[tokio::test]
async fn test_booking_completes_the_session() {
    let fixture = Fixture::new().await;
    let sessions = BookingSessionService::with_parts(fixture.sessions.clone(), patients().await, 3600);
    let session = sessions.create_session(USER_ID).await.unwrap();

    let mut req = request(monday_at(11, 0), monday_at(11, 30));
    req.session_id = Some(session.session_id.clone());
    let appointment = fixture.service().book_appointment(req).await.unwrap();

    let stored = sessions.get_session(&session.session_id).await.unwrap();
    assert_eq!(stored.status, BookingSessionStatus::Completed);
    let confirmation = stored.confirmation.unwrap();
    assert_eq!(confirmation.confirmation_id, appointment.confirmation_id);
    assert_eq!(confirmation.appointment_id, appointment.id);
}

#[tokio::test]
async fn test_unknown_session_is_rejected_before_booking() {
    let fixture = Fixture::new().await;
    let mut req = request(monday_at(11, 0), monday_at(11, 30));
    req.session_id = Some("no-such-session".to_string());

    assert_matches!(
        fixture.service().book_appointment(req).await,
        Err(AppointmentError::SessionNotFound(_))
    );
    assert!(fixture.appointments.all().await.is_empty());
}

#[tokio::test]
async fn test_completed_session_cannot_book_again() {
    let fixture = Fixture::new().await;
    let sessions = BookingSessionService::with_parts(fixture.sessions.clone(), patients().await, 3600);
    let session = sessions.create_session(USER_ID).await.unwrap();

    let mut first = request(monday_at(11, 0), monday_at(11, 30));
    first.session_id = Some(session.session_id.clone());
    let booked = fixture.service().book_appointment(first).await.unwrap();

    let mut second = request(monday_at(14, 0), monday_at(14, 30));
    second.session_id = Some(session.session_id.clone());
    assert_matches!(
        fixture.service().book_appointment(second).await,
        Err(AppointmentError::ValidationError(_))
    );

    assert_eq!(fixture.appointments.all().await.len(), 1);
    let stored = sessions.get_session(&session.session_id).await.unwrap();
    assert_eq!(stored.confirmation.unwrap().confirmation_id, booked.confirmation_id);
}

#[tokio::test]
async fn test_session_books_only_for_its_own_account() {
    let fixture = Fixture::new().await;
    let sessions = BookingSessionService::with_parts(fixture.sessions.clone(), patients().await, 3600);
    let foreign = sessions.create_session(OTHER_USER_ID).await.unwrap();

    let mut req = request(monday_at(11, 0), monday_at(11, 30));
    req.session_id = Some(foreign.session_id.clone());
    assert_matches!(
        fixture.service().book_appointment(req).await,
        Err(AppointmentError::PatientNotFound(_))
    );
    assert!(fixture.appointments.all().await.is_empty());
    let untouched = sessions.get_session(&foreign.session_id).await.unwrap();
    assert_eq!(untouched.status, BookingSessionStatus::Initialized);

    // a family member of the session's user is accepted
    let own = sessions.create_session(USER_ID).await.unwrap();
    let mut req = request(monday_at(11, 0), monday_at(11, 30));
    req.patient = PatientRef::FamilyMember(CHILD_ID);
    req.session_id = Some(own.session_id.clone());
    let appointment = fixture.service().book_appointment(req).await.unwrap();
    assert_eq!(appointment.family_member_id, Some(CHILD_ID));
}

// ==============================================================================
// LISTING
// ==============================================================================

#[tokio::test]
async fn test_user_listing_includes_family_bookings() {
    let fixture = Fixture::new().await;
    let service = fixture.service();

    let own = service
        .book_appointment(request(monday_at(9, 0), monday_at(9, 30)))
        .await
        .unwrap();
    let mut for_child = request(monday_at(10, 0), monday_at(10, 30));
    for_child.patient = PatientRef::FamilyMember(CHILD_ID);
    let child = service.book_appointment(for_child).await.unwrap();
    let mut for_other = request(monday_at(11, 0), monday_at(11, 30));
    for_other.patient = PatientRef::User(OTHER_USER_ID);
    service.book_appointment(for_other).await.unwrap();

    let listed = fixture.lifecycle().list_user_appointments(USER_ID).await.unwrap();
    let ids: Vec<i64> = listed.iter().map(|apt| apt.id).collect();
    assert_eq!(ids, vec![child.id, own.id]);

    let other = fixture.lifecycle().list_user_appointments(OTHER_USER_ID).await.unwrap();
    assert_eq!(other.len(), 1);
}

// ==============================================================================
// CONCURRENCY
// ==============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancel_waits_for_reschedule_in_flight() {
    let table = Arc::new(InMemoryAppointmentRepository::new());
    let original = Fixture::with_appointments(table.clone())
        .await
        .service()
        .book_appointment(request(monday_at(9, 0), monday_at(9, 30)))
        .await
        .unwrap();
    let original_id = original.id;

    let slow = Arc::new(SlowInserts {
        inner: table.clone(),
        delay: std::time::Duration::from_millis(100),
    });
    let state = state_with(slow, Arc::new(InMemoryStore::new())).await;

    let reschedule = {
        let booking = AppointmentBookingService::new(&state);
        tokio::spawn(async move {
            booking
                .reschedule_appointment(
                    original_id,
                    RescheduleAppointmentRequest {
                        new_start: monday_at(14, 0).to_rfc3339(),
                        duration_minutes: None,
                    },
                )
                .await
        })
    };

    tokio::time::sleep(std::time::Duration::from_millis(30)).await;
    let canceled = AppointmentLifecycleService::new(&state)
        .cancel_appointment(original_id, Some("Changed my mind".to_string()))
        .await;

    let outcome = reschedule.await.unwrap().unwrap();
    assert_matches!(
        canceled,
        Err(AppointmentError::InvalidStatusTransition {
            from: AppointmentStatus::Rescheduled,
            to: AppointmentStatus::Canceled,
        })
    );

    let previous = table.get(original_id).await.unwrap().unwrap();
    assert_eq!(previous.status, AppointmentStatus::Rescheduled);
    assert!(!previous.notes.unwrap_or_default().contains("Changed my mind"));
    let replacement = table.get(outcome.appointment.id).await.unwrap().unwrap();
    assert_eq!(replacement.status, AppointmentStatus::Confirmed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bookings_for_same_slot_have_one_winner() {
    let fixture = Fixture::new().await;
    let service = Arc::new(fixture.service());

    let attempts = 16;
    let handles: Vec<_> = (0..attempts)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .book_appointment(request(monday_at(9, 0), monday_at(9, 30)))
                    .await
            })
        })
        .collect();

    let mut confirmed = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(appointment) => {
                assert_eq!(appointment.status, AppointmentStatus::Confirmed);
                confirmed += 1;
            }
            Err(AppointmentError::ConflictDetected) => conflicts += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(confirmed, 1);
    assert_eq!(conflicts, attempts - 1);
    assert_eq!(fixture.appointments.all().await.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_overlapping_intervals_have_one_winner() {
    let fixture = Fixture::new().await;
    let service = Arc::new(fixture.service());

    // every pair of these intervals overlaps
    let intervals = [
        (monday_at(9, 0), monday_at(10, 0)),
        (monday_at(9, 30), monday_at(10, 0)),
        (monday_at(9, 0), monday_at(11, 0)),
        (monday_at(9, 30), monday_at(10, 30)),
    ];

    let handles: Vec<_> = intervals
        .iter()
        .map(|&(start, end)| {
            let service = service.clone();
            tokio::spawn(async move { service.book_appointment(request(start, end)).await })
        })
        .collect();

    let mut confirmed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => confirmed += 1,
            Err(e) => assert_matches!(e, AppointmentError::ConflictDetected),
        }
    }

    assert_eq!(confirmed, 1);
}

// ==============================================================================
// RESCHEDULING
// ==============================================================================

#[tokio::test]
async fn test_reschedule_moves_appointment() {
    let fixture = Fixture::new().await;
    let service = fixture.service();
    let original = service
        .book_appointment(request(monday_at(9, 0), monday_at(9, 30)))
        .await
        .unwrap();

    let outcome = service
        .reschedule_appointment(
            original.id,
            RescheduleAppointmentRequest {
                new_start: (monday_at(9, 0) + Duration::days(1)).to_rfc3339(),
                duration_minutes: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.previous.id, original.id);
    assert_eq!(outcome.previous.status, AppointmentStatus::Rescheduled);
    assert_eq!(
        outcome.previous.notes,
        Some(format!("Rescheduled to {}", outcome.appointment.confirmation_id))
    );
    assert_eq!(outcome.appointment.status, AppointmentStatus::Confirmed);
    assert_eq!(outcome.appointment.date_time, monday_at(9, 0) + Duration::days(1));
    assert_eq!(outcome.appointment.duration_minutes, 30);
    assert_eq!(outcome.appointment.reason, original.reason);
    assert_ne!(outcome.appointment.confirmation_id, original.confirmation_id);

    // the old time is free again
    service
        .book_appointment(request(monday_at(9, 0), monday_at(9, 30)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_reschedule_may_overlap_its_own_old_time() {
    let fixture = Fixture::new().await;
    let service = fixture.service();
    let original = service
        .book_appointment(request(monday_at(9, 0), monday_at(10, 0)))
        .await
        .unwrap();

    let outcome = service
        .reschedule_appointment(
            original.id,
            RescheduleAppointmentRequest {
                new_start: monday_at(9, 30).to_rfc3339(),
                duration_minutes: Some(60),
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.appointment.date_time, monday_at(9, 30));
}

#[tokio::test]
async fn test_reschedule_into_taken_slot_conflicts() {
    let fixture = Fixture::new().await;
    let service = fixture.service();
    let original = service
        .book_appointment(request(monday_at(9, 0), monday_at(9, 30)))
        .await
        .unwrap();
    service
        .book_appointment(request(monday_at(10, 0), monday_at(10, 30)))
        .await
        .unwrap();

    assert_matches!(
        service
            .reschedule_appointment(
                original.id,
                RescheduleAppointmentRequest {
                    new_start: monday_at(10, 0).to_rfc3339(),
                    duration_minutes: None,
                },
            )
            .await,
        Err(AppointmentError::ConflictDetected)
    );

    let unchanged = fixture.appointments.all().await;
    assert_eq!(unchanged.len(), 2);
    assert!(unchanged.iter().all(|apt| apt.status == AppointmentStatus::Confirmed));
}

#[tokio::test]
async fn test_cancelled_appointment_cannot_be_rescheduled() {
    let fixture = Fixture::new().await;
    let service = fixture.service();
    let original = service
        .book_appointment(request(monday_at(9, 0), monday_at(9, 30)))
        .await
        .unwrap();
    fixture.lifecycle()
        .cancel_appointment(original.id, Some("Feeling better".to_string()))
        .await
        .unwrap();

    assert_matches!(
        service
            .reschedule_appointment(
                original.id,
                RescheduleAppointmentRequest {
                    new_start: monday_at(11, 0).to_rfc3339(),
                    duration_minutes: None,
                },
            )
            .await,
        Err(AppointmentError::InvalidStatusTransition { .. })
    );
}
