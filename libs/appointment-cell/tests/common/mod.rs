#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use appointment_cell::{
    AppointmentBookingService, AppointmentLifecycleService, AppointmentState, BookAppointmentRequest, DoctorLocks,
};
use doctor_cell::{Doctor, InMemoryDoctorRepository, Location};
use patient_cell::{FamilyMember, InMemoryPatientRepository, RelationshipType, User};
use session_cell::{InMemoryStore, KeyValueStore};
use shared_database::{AppointmentRepository, DbError, InMemoryAppointmentRepository};
use shared_models::{Appointment, AppointmentStatus, NewAppointment, PatientRef};
use shared_utils::test_utils::TestConfig;

pub const DOCTOR_ID: i64 = 7;
pub const INACTIVE_DOCTOR_ID: i64 = 8;
pub const USER_ID: i64 = 1;
pub const OTHER_USER_ID: i64 = 2;
pub const CHILD_ID: i64 = 10;
pub const UNAUTHORIZED_MEMBER_ID: i64 = 11;

/// Monday 2026-10-19 at the given UTC time.
pub fn monday_at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, h, m, 0).unwrap()
}

pub async fn doctors() -> Arc<InMemoryDoctorRepository> {
    let repo = InMemoryDoctorRepository::new();
    repo.add_location(Location {
        id: 1,
        name: "Downtown Clinic".to_string(),
        address: "1 Main Street".to_string(),
        phone: None,
        is_active: true,
    })
    .await;
    repo.add_doctor(Doctor {
        id: DOCTOR_ID,
        full_name: "Dr. Ada Smith".to_string(),
        specialty: "Cardiology".to_string(),
        location_id: Some(1),
        is_active: true,
        location: None,
    })
    .await;
    repo.add_doctor(Doctor {
        id: INACTIVE_DOCTOR_ID,
        full_name: "Dr. Retired".to_string(),
        specialty: "Cardiology".to_string(),
        location_id: Some(1),
        is_active: false,
        location: None,
    })
    .await;
    Arc::new(repo)
}

pub async fn patients() -> Arc<InMemoryPatientRepository> {
    let repo = InMemoryPatientRepository::new();
    repo.add_user(User {
        id: USER_ID,
        username: Some("jane".to_string()),
        email: Some("jane@example.com".to_string()),
        full_name: "Jane Doe".to_string(),
        date_of_birth: None,
        phone_number: None,
        address: None,
        is_active: true,
    })
    .await;
    repo.add_user(User {
        id: OTHER_USER_ID,
        username: Some("john".to_string()),
        email: Some("john@example.com".to_string()),
        full_name: "John Roe".to_string(),
        date_of_birth: None,
        phone_number: None,
        address: None,
        is_active: true,
    })
    .await;
    repo.add_family_member(FamilyMember {
        id: CHILD_ID,
        user_id: USER_ID,
        full_name: "Tom Doe".to_string(),
        date_of_birth: None,
        relation_type: RelationshipType::Child,
        is_authorized: true,
    })
    .await;
    repo.add_family_member(FamilyMember {
        id: UNAUTHORIZED_MEMBER_ID,
        user_id: USER_ID,
        full_name: "Ann Doe".to_string(),
        date_of_birth: None,
        relation_type: RelationshipType::Sibling,
        is_authorized: false,
    })
    .await;
    Arc::new(repo)
}

pub struct Fixture {
    pub appointments: Arc<InMemoryAppointmentRepository>,
    pub sessions: Arc<InMemoryStore>,
    pub state: Arc<AppointmentState>,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_appointments(Arc::new(InMemoryAppointmentRepository::new())).await
    }

    pub async fn with_appointments(appointments: Arc<InMemoryAppointmentRepository>) -> Self {
        let sessions = Arc::new(InMemoryStore::new());
        let state = state_with(appointments.clone(), sessions.clone()).await;
        Self {
            appointments,
            sessions,
            state,
        }
    }

    pub fn service(&self) -> AppointmentBookingService {
        AppointmentBookingService::new(&self.state)
    }

    pub fn lifecycle(&self) -> AppointmentLifecycleService {
        AppointmentLifecycleService::new(&self.state)
    }
}

pub async fn state_with(
    appointments: Arc<dyn AppointmentRepository>,
    sessions: Arc<dyn KeyValueStore>,
) -> Arc<AppointmentState> {
    Arc::new(AppointmentState::new(
        TestConfig::default().to_arc(),
        doctors().await,
        patients().await,
        appointments,
        sessions,
    ))
}

/// Wraps the in-memory table and holds every insert for `delay`, widening
/// the window between a reschedule's insert and its status update.
pub struct SlowInserts {
    pub inner: Arc<InMemoryAppointmentRepository>,
    pub delay: Duration,
}

#[async_trait]
impl AppointmentRepository for SlowInserts {
    async fn find_occupying(
        &self,
        doctor_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, DbError> {
        self.inner.find_occupying(doctor_id, from, to).await
    }

    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, DbError> {
        tokio::time::sleep(self.delay).await;
        self.inner.insert(appointment).await
    }

    async fn get(&self, id: i64) -> Result<Option<Appointment>, DbError> {
        self.inner.get(id).await
    }

    async fn get_by_confirmation_id(&self, confirmation_id: &str) -> Result<Option<Appointment>, DbError> {
        self.inner.get_by_confirmation_id(confirmation_id).await
    }

    async fn list_for_user(&self, user_id: i64, family_member_ids: &[i64]) -> Result<Vec<Appointment>, DbError> {
        self.inner.list_for_user(user_id, family_member_ids).await
    }

    async fn update_status(
        &self,
        id: i64,
        status: AppointmentStatus,
        notes: Option<String>,
    ) -> Result<Appointment, DbError> {
        self.inner.update_status(id, status, notes).await
    }
}

/// Booking service over an arbitrary appointment repository.
pub async fn service_with(appointments: Arc<dyn AppointmentRepository>) -> AppointmentBookingService {
    let sessions: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
    AppointmentBookingService::with_parts(
        doctors().await,
        patients().await,
        appointments,
        sessions,
        Arc::new(DoctorLocks::new()),
        30,
        3600,
    )
}

pub fn request(start: DateTime<Utc>, end: DateTime<Utc>) -> BookAppointmentRequest {
    BookAppointmentRequest {
        doctor_id: DOCTOR_ID,
        slot_start: start.to_rfc3339(),
        slot_end: end.to_rfc3339(),
        reason: "Chest pain".to_string(),
        notes: None,
        patient: PatientRef::User(USER_ID),
        session_id: None,
    }
}
