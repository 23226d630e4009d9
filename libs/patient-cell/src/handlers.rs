use std::sync::Arc;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::services::PatientService;
use crate::state::PatientState;

#[axum::debug_handler]
pub async fn get_user_context(
    State(state): State<Arc<PatientState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(state.patients.clone());

    let context = service.user_context(user_id).await?;

    Ok(Json(json!(context)))
}

#[axum::debug_handler]
pub async fn get_patient_options(
    State(state): State<Arc<PatientState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(state.patients.clone());

    let options = service.patient_options(user_id).await?;

    Ok(Json(json!(options)))
}
