use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppointmentState;

pub fn appointment_routes(state: Arc<AppointmentState>) -> Router {
    Router::new()
        .route("/book", post(handlers::book_appointment))
        .route("/appointments/{id}", get(handlers::get_appointment))
        .route("/appointments/{id}/cancel", post(handlers::cancel_appointment))
        .route("/appointments/{id}/complete", post(handlers::complete_appointment))
        .route("/appointments/{id}/reschedule", post(handlers::reschedule_appointment))
        .route("/users/{user_id}/appointments", get(handlers::list_user_appointments))
        .with_state(state)
}
