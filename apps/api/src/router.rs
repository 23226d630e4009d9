use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::json;

use appointment_cell::{appointment_routes, AppointmentState};
use doctor_cell::{router::doctor_routes, DoctorState};
use patient_cell::{patient_routes, PatientState};
use session_cell::{session_routes, SessionState};

use crate::backends::AppBackends;

pub fn create_router(backends: AppBackends) -> Router {
    let doctor_state = Arc::new(DoctorState::new(
        backends.config.clone(),
        backends.doctors.clone(),
        backends.appointments.clone(),
    ));
    let patient_state = Arc::new(PatientState::new(backends.patients.clone()));
    let session_state = Arc::new(SessionState::new(
        backends.config.clone(),
        backends.sessions.clone(),
        backends.patients.clone(),
    ));
    let appointment_state = Arc::new(AppointmentState::new(
        backends.config.clone(),
        backends.doctors.clone(),
        backends.patients.clone(),
        backends.appointments.clone(),
        backends.sessions.clone(),
    ));

    Router::new()
        .route("/", get(|| async { "Clinic booking API is running!" }))
        .route("/health", get(|| async { Json(json!({"status": "ok"})) }))
        .merge(doctor_routes(doctor_state))
        .merge(patient_routes(patient_state))
        .merge(session_routes(session_state))
        .merge(appointment_routes(appointment_state))
}
