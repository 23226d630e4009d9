use std::sync::Arc;

use crate::services::repository::PatientRepository;

#[derive(Clone)]
pub struct PatientState {
    pub patients: Arc<dyn PatientRepository>,
}

impl PatientState {
    pub fn new(patients: Arc<dyn PatientRepository>) -> Self {
        Self { patients }
    }
}
