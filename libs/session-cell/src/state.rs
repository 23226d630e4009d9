use std::sync::Arc;

use patient_cell::PatientRepository;
use shared_config::AppConfig;

use crate::store::KeyValueStore;

#[derive(Clone)]
pub struct SessionState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn KeyValueStore>,
    pub patients: Arc<dyn PatientRepository>,
}

impl SessionState {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn KeyValueStore>,
        patients: Arc<dyn PatientRepository>,
    ) -> Self {
        Self {
            config,
            store,
            patients,
        }
    }
}
