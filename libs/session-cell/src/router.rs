use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::SessionState;

pub fn session_routes(state: Arc<SessionState>) -> Router {
    Router::new()
        .route("/session", post(handlers::create_session))
        .route(
            "/session/{session_id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/session/{session_id}/keep-alive", post(handlers::keep_alive))
        .route("/session/{session_id}/select-patient", post(handlers::select_patient))
        .route("/session/{session_id}/booking-form", post(handlers::update_booking_form))
        .route("/session-status/{session_id}", get(handlers::get_session_status))
        .with_state(state)
}
