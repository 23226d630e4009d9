use std::sync::Arc;

use doctor_cell::DoctorRepository;
use patient_cell::PatientRepository;
use session_cell::KeyValueStore;
use shared_config::AppConfig;
use shared_database::AppointmentRepository;

use crate::services::DoctorLocks;

/// Shared handles for the booking routes. `locks` must be the same instance
/// for every request so that bookings for one doctor are serialized.
#[derive(Clone)]
pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub doctors: Arc<dyn DoctorRepository>,
    pub patients: Arc<dyn PatientRepository>,
    pub appointments: Arc<dyn AppointmentRepository>,
    pub sessions: Arc<dyn KeyValueStore>,
    pub locks: Arc<DoctorLocks>,
}

impl AppointmentState {
    pub fn new(
        config: Arc<AppConfig>,
        doctors: Arc<dyn DoctorRepository>,
        patients: Arc<dyn PatientRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        sessions: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            config,
            doctors,
            patients,
            appointments,
            sessions,
            locks: Arc::new(DoctorLocks::new()),
        }
    }
}
