use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::session::SessionContext;

use crate::models::UpdateAvailabilityRequest;
use crate::services::availability::AvailabilityService;
use crate::services::slots;

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: Option<NaiveDate>,
}

// ==============================================================================
// PUBLIC HANDLERS (NO SESSION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctors_public(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);

    let doctors = service
        .list_doctors(None)
        .await
        .map_err(|e| AppError::Records(e.to_string()))?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_public(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);

    let doctor = service
        .get_doctor(doctor_id, None)
        .await
        .map_err(|_| AppError::NotFound("Doctor not found".to_string()))?;

    let config = service
        .get_availability(doctor_id, None)
        .await
        .map_err(|e| AppError::Records(e.to_string()))?;

    Ok(Json(json!({
        "doctor": doctor,
        "availability": config
    })))
}

/// The selectable-times surface for the booking flow: gate the requested
/// calendar day first, then derive the slot sequence from the live config
/// and the current clock. Past or blocked dates and unresolved doctors all
/// yield an empty list rather than an error.
#[axum::debug_handler]
pub async fn get_bookable_slots_public(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);

    let config = match service.get_availability(doctor_id, None).await {
        Ok(config) => Some(config),
        Err(e) => {
            debug!("Availability unresolved for doctor {}: {}", doctor_id, e);
            None
        }
    };

    let now = Utc::now();
    let today = now.date_naive();

    let selectable = match (&config, query.date) {
        (Some(config), Some(date)) => {
            slots::is_selectable(date, &config.unavailable_dates, today)
        }
        _ => false,
    };

    let generated = if selectable {
        slots::bookable_slots(config.as_ref(), query.date, now)
    } else {
        Vec::new()
    };

    let slots: Vec<Value> = generated
        .iter()
        .map(|slot| {
            json!({
                "starts_at": slot.starts_at,
                "time": slot.time_label()
            })
        })
        .collect();

    Ok(Json(json!({
        "date": query.date,
        "selectable": selectable,
        "slots": slots
    })))
}

// ==============================================================================
// PROTECTED HANDLERS (SESSION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppConfig>>,
    Extension(session): Extension<SessionContext>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);

    let config = service
        .get_availability(doctor_id, Some(&session))
        .await
        .map_err(|e| AppError::Records(e.to_string()))?;

    Ok(Json(json!(config)))
}

#[axum::debug_handler]
pub async fn update_availability(
    State(state): State<Arc<AppConfig>>,
    Extension(session): Extension<SessionContext>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<UpdateAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);

    let config = service
        .save_availability(doctor_id, request, &session)
        .await
        .map_err(|e| AppError::Records(e.to_string()))?;

    Ok(Json(json!({
        "availability": config
    })))
}
