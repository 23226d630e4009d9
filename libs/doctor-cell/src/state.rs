use std::sync::Arc;

use shared_config::AppConfig;
use shared_database::AppointmentRepository;

use crate::services::repository::DoctorRepository;

/// Shared handles for the doctor routes.
#[derive(Clone)]
pub struct DoctorState {
    pub config: Arc<AppConfig>,
    pub doctors: Arc<dyn DoctorRepository>,
    pub appointments: Arc<dyn AppointmentRepository>,
}

impl DoctorState {
    pub fn new(
        config: Arc<AppConfig>,
        doctors: Arc<dyn DoctorRepository>,
        appointments: Arc<dyn AppointmentRepository>,
    ) -> Self {
        Self {
            config,
            doctors,
            appointments,
        }
    }
}
