use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use shared_models::{Appointment, AppointmentStatus, NewAppointment, PatientRef};

use crate::appointments::AppointmentRepository;
use crate::error::{DbError, UNIQUE_VIOLATION};

/// Process-local appointment table, used when no relational store is
/// configured and throughout the test suites.
#[derive(Default)]
pub struct InMemoryAppointmentRepository {
    rows: RwLock<Vec<Appointment>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_appointments(appointments: Vec<Appointment>) -> Self {
        Self {
            rows: RwLock::new(appointments),
        }
    }

    pub async fn all(&self) -> Vec<Appointment> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn find_occupying(
        &self,
        doctor_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, DbError> {
        let rows = self.rows.read().await;
        let mut found: Vec<Appointment> = rows
            .iter()
            .filter(|apt| apt.doctor_id == doctor_id && apt.blocks(from, to))
            .cloned()
            .collect();
        found.sort_by_key(|apt| apt.date_time);
        Ok(found)
    }

    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, DbError> {
        let mut rows = self.rows.write().await;

        if rows.iter().any(|apt| apt.confirmation_id == appointment.confirmation_id) {
            return Err(DbError::Constraint {
                code: UNIQUE_VIOLATION.to_string(),
                message: format!("duplicate confirmation_id {}", appointment.confirmation_id),
            });
        }

        let now = Utc::now();
        let id = rows.iter().map(|apt| apt.id).max().unwrap_or(0) + 1;
        let stored = Appointment {
            id,
            doctor_id: appointment.doctor_id,
            user_id: appointment.user_id,
            family_member_id: appointment.family_member_id,
            location_id: appointment.location_id,
            date_time: appointment.date_time,
            duration_minutes: appointment.duration_minutes,
            reason: appointment.reason,
            status: appointment.status,
            notes: appointment.notes,
            confirmation_id: appointment.confirmation_id,
            created_at: Some(now),
            updated_at: Some(now),
        };

        rows.push(stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: i64) -> Result<Option<Appointment>, DbError> {
        Ok(self.rows.read().await.iter().find(|apt| apt.id == id).cloned())
    }

    async fn get_by_confirmation_id(&self, confirmation_id: &str) -> Result<Option<Appointment>, DbError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|apt| apt.confirmation_id == confirmation_id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: i64, family_member_ids: &[i64]) -> Result<Vec<Appointment>, DbError> {
        let mut found: Vec<Appointment> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|apt| match apt.patient() {
                Some(PatientRef::User(id)) => id == user_id,
                Some(PatientRef::FamilyMember(id)) => family_member_ids.contains(&id),
                None => false,
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| b.date_time.cmp(&a.date_time));
        Ok(found)
    }

    async fn update_status(
        &self,
        id: i64,
        status: AppointmentStatus,
        notes: Option<String>,
    ) -> Result<Appointment, DbError> {
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|apt| apt.id == id)
            .ok_or_else(|| DbError::NotFound(format!("Appointment {}", id)))?;

        row.status = status;
        if notes.is_some() {
            row.notes = notes;
        }
        row.updated_at = Some(Utc::now());

        Ok(row.clone())
    }
}
