use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use shared_database::{DbError, SupabaseClient};

use crate::models::{Doctor, DoctorFilter, Location, Specialty, WeeklyAvailability};

#[async_trait]
pub trait DoctorRepository: Send + Sync {
    async fn get_doctor(&self, doctor_id: i64) -> Result<Option<Doctor>, DbError>;

    /// Active doctors matching the filter, ordered by id.
    async fn find_doctors(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>, DbError>;

    async fn get_weekly_availability(&self, doctor_id: i64) -> Result<Vec<WeeklyAvailability>, DbError>;

    async fn list_locations(&self) -> Result<Vec<Location>, DbError>;

    async fn list_specialties(&self) -> Result<Vec<Specialty>, DbError>;
}

pub struct SupabaseDoctorRepository {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseDoctorRepository {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, DbError> {
        let result: Vec<Value> = self.supabase.request(Method::GET, path, None).await?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| DbError::Decode(e.to_string()))
    }
}

/// PostgREST path for the doctor directory. Filtering on the location name
/// needs an inner join on the embedded resource.
pub fn doctors_path(filter: &DoctorFilter) -> String {
    let embed = if filter.location.is_some() {
        "location:locations!inner(*)"
    } else {
        "location:locations(*)"
    };

    let mut query_parts = vec![format!("select=*,{}", embed), "is_active=eq.true".to_string()];

    if let Some(specialty) = filter.specialty.as_deref() {
        query_parts.push(format!("specialty=eq.{}", urlencoding::encode(specialty)));
    }
    if let Some(location) = filter.location.as_deref() {
        query_parts.push(format!("location.name=eq.{}", urlencoding::encode(location)));
    }
    if let Some(name) = filter.doctor_name.as_deref() {
        query_parts.push(format!("full_name=ilike.*{}*", urlencoding::encode(name)));
    }

    format!("/rest/v1/doctors?{}&order=id.asc", query_parts.join("&"))
}

#[async_trait]
impl DoctorRepository for SupabaseDoctorRepository {
    async fn get_doctor(&self, doctor_id: i64) -> Result<Option<Doctor>, DbError> {
        let path = format!("/rest/v1/doctors?select=*,location:locations(*)&id=eq.{}", doctor_id);
        Ok(self.fetch::<Doctor>(&path).await?.into_iter().next())
    }

    async fn find_doctors(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>, DbError> {
        let path = doctors_path(filter);
        debug!("Searching doctors: {}", path);
        self.fetch(&path).await
    }

    async fn get_weekly_availability(&self, doctor_id: i64) -> Result<Vec<WeeklyAvailability>, DbError> {
        let path = format!(
            "/rest/v1/doctor_schedules?doctor_id=eq.{}&order=day_of_week.asc,start_time.asc",
            doctor_id
        );
        self.fetch(&path).await
    }

    async fn list_locations(&self) -> Result<Vec<Location>, DbError> {
        self.fetch("/rest/v1/locations?is_active=eq.true&order=name.asc").await
    }

    async fn list_specialties(&self) -> Result<Vec<Specialty>, DbError> {
        self.fetch("/rest/v1/specialties?order=name.asc").await
    }
}

/// Directory kept in process memory.
#[derive(Default)]
pub struct InMemoryDoctorRepository {
    doctors: RwLock<Vec<Doctor>>,
    schedules: RwLock<Vec<WeeklyAvailability>>,
    locations: RwLock<Vec<Location>>,
    specialties: RwLock<Vec<Specialty>>,
}

impl InMemoryDoctorRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_location(&self, location: Location) {
        self.locations.write().await.push(location);
    }

    pub async fn add_specialty(&self, specialty: Specialty) {
        self.specialties.write().await.push(specialty);
    }

    /// Stores the doctor, embedding its location when one is known.
    pub async fn add_doctor(&self, mut doctor: Doctor) {
        if doctor.location.is_none() {
            if let Some(location_id) = doctor.location_id {
                doctor.location = self
                    .locations
                    .read()
                    .await
                    .iter()
                    .find(|l| l.id == location_id)
                    .cloned();
            }
        }
        self.doctors.write().await.push(doctor);
    }

    pub async fn add_schedule(&self, schedule: WeeklyAvailability) {
        self.schedules.write().await.push(schedule);
    }
}

#[async_trait]
impl DoctorRepository for InMemoryDoctorRepository {
    async fn get_doctor(&self, doctor_id: i64) -> Result<Option<Doctor>, DbError> {
        Ok(self.doctors.read().await.iter().find(|d| d.id == doctor_id).cloned())
    }

    async fn find_doctors(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>, DbError> {
        let mut found: Vec<Doctor> = self
            .doctors
            .read()
            .await
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        found.sort_by_key(|d| d.id);
        Ok(found)
    }

    async fn get_weekly_availability(&self, doctor_id: i64) -> Result<Vec<WeeklyAvailability>, DbError> {
        let mut found: Vec<WeeklyAvailability> = self
            .schedules
            .read()
            .await
            .iter()
            .filter(|s| s.doctor_id == doctor_id)
            .cloned()
            .collect();
        found.sort_by_key(|s| (s.day_of_week, s.start_time));
        Ok(found)
    }

    async fn list_locations(&self) -> Result<Vec<Location>, DbError> {
        let mut found: Vec<Location> = self
            .locations
            .read()
            .await
            .iter()
            .filter(|l| l.is_active)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn list_specialties(&self) -> Result<Vec<Specialty>, DbError> {
        let mut found = self.specialties.read().await.clone();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }
}
