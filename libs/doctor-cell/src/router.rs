use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::DoctorState;

pub fn doctor_routes(state: Arc<DoctorState>) -> Router {
    Router::new()
        .route("/availability-query", post(handlers::query_availability))
        .route("/doctors", get(handlers::search_doctors))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor))
        .route("/doctors/{doctor_id}/slots", get(handlers::get_doctor_slots))
        .route("/specialties", get(handlers::list_specialties))
        .route("/locations", get(handlers::list_locations))
        .with_state(state)
}
