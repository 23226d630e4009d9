use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_models::error::AppError;

use crate::models::{BookAppointmentRequest, CancelAppointmentRequest, RescheduleAppointmentRequest};
use crate::services::{AppointmentBookingService, AppointmentLifecycleService};
use crate::state::AppointmentState;

// ==============================================================================
// BOOKING
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppointmentState>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Booking request for doctor {}", request.doctor_id);

    let booking_service = AppointmentBookingService::new(&state);
    let appointment = booking_service.book_appointment(request).await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<i64>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);
    let outcome = booking_service
        .reschedule_appointment(appointment_id, request)
        .await?;

    Ok(Json(json!(outcome)))
}

// ==============================================================================
// LIFECYCLE
// ==============================================================================

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(reference): Path<String>,
) -> Result<Json<Value>, AppError> {
    let lifecycle = AppointmentLifecycleService::new(&state);
    let appointment = lifecycle.get_appointment(&reference).await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn list_user_appointments(
    State(state): State<Arc<AppointmentState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let lifecycle = AppointmentLifecycleService::new(&state);
    let appointments = lifecycle.list_user_appointments(user_id).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<i64>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let lifecycle = AppointmentLifecycleService::new(&state);
    let appointment = lifecycle
        .cancel_appointment(appointment_id, request.reason)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let lifecycle = AppointmentLifecycleService::new(&state);
    let appointment = lifecycle.complete_appointment(appointment_id).await?;

    Ok(Json(json!(appointment)))
}
