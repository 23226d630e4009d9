use std::sync::Arc;
use tracing::debug;

use crate::models::{Doctor, DoctorError, DoctorFilter, Location, Specialty, WeeklyAvailability};
use crate::services::repository::DoctorRepository;
use crate::state::DoctorState;

pub struct DirectoryService {
    doctors: Arc<dyn DoctorRepository>,
}

impl DirectoryService {
    pub fn new(state: &DoctorState) -> Self {
        Self {
            doctors: state.doctors.clone(),
        }
    }

    pub fn with_repository(doctors: Arc<dyn DoctorRepository>) -> Self {
        Self { doctors }
    }

    pub async fn search_doctors(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Searching doctors with filter: {:?}", filter);
        Ok(self.doctors.find_doctors(filter).await?)
    }

    /// Active doctor by id.
    pub async fn get_doctor(&self, doctor_id: i64) -> Result<Doctor, DoctorError> {
        self.doctors
            .get_doctor(doctor_id)
            .await?
            .filter(|d| d.is_active)
            .ok_or(DoctorError::NotFound)
    }

    pub async fn get_schedule(&self, doctor_id: i64) -> Result<Vec<WeeklyAvailability>, DoctorError> {
        self.get_doctor(doctor_id).await?;
        Ok(self.doctors.get_weekly_availability(doctor_id).await?)
    }

    pub async fn list_locations(&self) -> Result<Vec<Location>, DoctorError> {
        Ok(self.doctors.list_locations().await?)
    }

    pub async fn list_specialties(&self) -> Result<Vec<Specialty>, DoctorError> {
        Ok(self.doctors.list_specialties().await?)
    }
}
