use std::sync::Arc;
use axum::{routing::get, Router};

use crate::handlers::*;
use crate::state::PatientState;

pub fn patient_routes(state: Arc<PatientState>) -> Router {
    Router::new()
        .route("/users/{user_id}/context", get(get_user_context))
        .route("/users/{user_id}/patient-options", get(get_patient_options))
        .with_state(state)
}
