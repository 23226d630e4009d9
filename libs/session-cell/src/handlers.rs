use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::error::AppError;
use shared_utils::extractor::RequestUser;

use crate::models::{BookingStateUpdate, SelectPatientRequest};
use crate::services::BookingSessionService;
use crate::state::SessionState;

#[axum::debug_handler]
pub async fn create_session(
    State(state): State<Arc<SessionState>>,
    RequestUser(user_id): RequestUser,
) -> Result<Json<Value>, AppError> {
    let service = BookingSessionService::new(&state);

    let session = service.create_session(user_id).await?;

    Ok(Json(json!(session)))
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<Arc<SessionState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let session = BookingSessionService::new(&state).get_session(&session_id).await?;
    Ok(Json(json!(session)))
}

#[axum::debug_handler]
pub async fn delete_session(
    State(state): State<Arc<SessionState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    BookingSessionService::new(&state).delete_session(&session_id).await?;

    Ok(Json(json!({
        "session_id": session_id,
        "deleted": true
    })))
}

#[axum::debug_handler]
pub async fn get_session_status(
    State(state): State<Arc<SessionState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let status = BookingSessionService::new(&state).session_status(&session_id).await?;
    Ok(Json(json!(status)))
}

#[axum::debug_handler]
pub async fn keep_alive(
    State(state): State<Arc<SessionState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let status = BookingSessionService::new(&state).keep_alive(&session_id).await?;
    Ok(Json(json!(status)))
}

#[axum::debug_handler]
pub async fn select_patient(
    State(state): State<Arc<SessionState>>,
    Path(session_id): Path<String>,
    Json(request): Json<SelectPatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingSessionService::new(&state);

    let session = service.select_patient(&session_id, request.patient).await?;

    Ok(Json(json!({
        "session_id": session.session_id,
        "is_self_booking": session.is_self_booking,
        "patient": session.patient,
        "patient_name": session.patient_name,
        "patient_dob": session.patient_dob
    })))
}

#[axum::debug_handler]
pub async fn update_booking_form(
    State(state): State<Arc<SessionState>>,
    Path(session_id): Path<String>,
    Json(update): Json<BookingStateUpdate>,
) -> Result<Json<Value>, AppError> {
    let session = BookingSessionService::new(&state)
        .update_state(&session_id, update)
        .await?;

    Ok(Json(json!(session)))
}
