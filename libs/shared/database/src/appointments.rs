use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use shared_models::{Appointment, AppointmentStatus, NewAppointment};

use crate::error::DbError;
use crate::supabase::SupabaseClient;

/// Longest appointment the store accepts. Range reads look back this far so
/// that appointments starting before the window but running into it are seen.
pub const MAX_APPOINTMENT_MINUTES: i64 = 24 * 60;

#[cfg_attr(feature = "mocks", mockall::automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// REQUESTED or CONFIRMED appointments of the doctor intersecting `[from, to)`,
    /// ordered by start time.
    async fn find_occupying(
        &self,
        doctor_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, DbError>;

    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, DbError>;

    async fn get(&self, id: i64) -> Result<Option<Appointment>, DbError>;

    async fn get_by_confirmation_id(&self, confirmation_id: &str) -> Result<Option<Appointment>, DbError>;

    /// Appointments booked for the user or for one of `family_member_ids`,
    /// newest first.
    async fn list_for_user(&self, user_id: i64, family_member_ids: &[i64]) -> Result<Vec<Appointment>, DbError>;

    async fn update_status(
        &self,
        id: i64,
        status: AppointmentStatus,
        notes: Option<String>,
    ) -> Result<Appointment, DbError>;
}

pub(crate) fn ts(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub struct SupabaseAppointmentRepository {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentRepository {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn fetch(&self, path: &str) -> Result<Vec<Appointment>, DbError> {
        let result: Vec<Value> = self.supabase.request(Method::GET, path, None).await?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| DbError::Decode(format!("Failed to parse appointments: {}", e)))
    }
}

#[async_trait]
impl AppointmentRepository for SupabaseAppointmentRepository {
    async fn find_occupying(
        &self,
        doctor_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, DbError> {
        let lookback = from
            .checked_sub_signed(Duration::minutes(MAX_APPOINTMENT_MINUTES))
            .ok_or_else(|| DbError::InvalidRequest(format!("Occupancy window starting {} is out of range", from)))?;
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&status=in.(REQUESTED,CONFIRMED)&date_time=gte.{}&date_time=lt.{}&order=date_time.asc",
            doctor_id,
            ts(lookback),
            ts(to)
        );

        let appointments = self.fetch(&path).await?;
        debug!("Fetched {} candidate appointments for doctor {}", appointments.len(), doctor_id);

        Ok(appointments
            .into_iter()
            .filter(|apt| apt.blocks(from, to))
            .collect())
    }

    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, DbError> {
        let body = serde_json::to_value(&appointment)?;

        let mut rows: Vec<Appointment> = self
            .supabase
            .request_returning(Method::POST, "/rest/v1/appointments", body)
            .await?;

        if rows.is_empty() {
            return Err(DbError::Decode("Insert returned no rows".to_string()));
        }

        Ok(rows.swap_remove(0))
    }

    async fn get(&self, id: i64) -> Result<Option<Appointment>, DbError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        Ok(self.fetch(&path).await?.into_iter().next())
    }

    async fn get_by_confirmation_id(&self, confirmation_id: &str) -> Result<Option<Appointment>, DbError> {
        let path = format!(
            "/rest/v1/appointments?confirmation_id=eq.{}",
            urlencoding::encode(confirmation_id)
        );
        Ok(self.fetch(&path).await?.into_iter().next())
    }

    async fn list_for_user(&self, user_id: i64, family_member_ids: &[i64]) -> Result<Vec<Appointment>, DbError> {
        let filter = if family_member_ids.is_empty() {
            format!("user_id=eq.{}", user_id)
        } else {
            let members: Vec<String> = family_member_ids.iter().map(i64::to_string).collect();
            format!("or=(user_id.eq.{},family_member_id.in.({}))", user_id, members.join(","))
        };
        let path = format!("/rest/v1/appointments?{}&order=date_time.desc", filter);
        self.fetch(&path).await
    }

    async fn update_status(
        &self,
        id: i64,
        status: AppointmentStatus,
        notes: Option<String>,
    ) -> Result<Appointment, DbError> {
        let mut update = serde_json::Map::new();
        update.insert("status".to_string(), json!(status));
        if let Some(notes) = notes {
            update.insert("notes".to_string(), json!(notes));
        }
        update.insert("updated_at".to_string(), json!(ts(Utc::now())));

        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let mut rows: Vec<Appointment> = self
            .supabase
            .request_returning(Method::PATCH, &path, Value::Object(update))
            .await?;

        if rows.is_empty() {
            return Err(DbError::NotFound(format!("Appointment {}", id)));
        }

        Ok(rows.swap_remove(0))
    }
}
