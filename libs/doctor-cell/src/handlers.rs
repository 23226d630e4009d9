use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{AvailabilityQueryRequest, DoctorFilter};
use crate::services::{AvailabilityService, DirectoryService};
use crate::state::DoctorState;

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

// ==============================================================================
// AVAILABILITY
// ==============================================================================

#[axum::debug_handler]
pub async fn query_availability(
    State(state): State<Arc<DoctorState>>,
    Json(request): Json<AvailabilityQueryRequest>,
) -> Result<Json<Value>, AppError> {
    let availability_service = AvailabilityService::new(&state);

    let results = availability_service
        .query(&request, Utc::now().date_naive())
        .await?;

    Ok(Json(json!(results)))
}

#[axum::debug_handler]
pub async fn get_doctor_slots(
    State(state): State<Arc<DoctorState>>,
    Path(doctor_id): Path<i64>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let availability_service = AvailabilityService::new(&state);

    let slots = availability_service
        .doctor_slots(doctor_id, query.start_date, query.end_date, Utc::now().date_naive())
        .await?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "available_slots": slots,
        "total": slots.len()
    })))
}

// ==============================================================================
// DIRECTORY
// ==============================================================================

#[axum::debug_handler]
pub async fn search_doctors(
    State(state): State<Arc<DoctorState>>,
    Query(filter): Query<DoctorFilter>,
) -> Result<Json<Value>, AppError> {
    let directory_service = DirectoryService::new(&state);

    let doctors = directory_service.search_doctors(&filter).await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<DoctorState>>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let directory_service = DirectoryService::new(&state);

    let doctor = directory_service.get_doctor(doctor_id).await?;
    let schedule = directory_service.get_schedule(doctor_id).await?;

    Ok(Json(json!({
        "doctor": doctor,
        "schedule": schedule
    })))
}

#[axum::debug_handler]
pub async fn list_specialties(
    State(state): State<Arc<DoctorState>>,
) -> Result<Json<Value>, AppError> {
    let specialties = DirectoryService::new(&state).list_specialties().await?;
    Ok(Json(json!(specialties)))
}

#[axum::debug_handler]
pub async fn list_locations(
    State(state): State<Arc<DoctorState>>,
) -> Result<Json<Value>, AppError> {
    let locations = DirectoryService::new(&state).list_locations().await?;
    Ok(Json(json!(locations)))
}
