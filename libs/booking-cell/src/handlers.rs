use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use chrono::{NaiveTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use availability_cell::models::hhmm;
use availability_cell::services::availability::AvailabilityService;
use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::session::SessionContext;

use crate::models::{AppointmentStatus, BookAppointmentPayload, ReschedulePayload};
use crate::services::booking::{self, BookingService};
use crate::services::lifecycle::{self, LifecycleService};

fn parse_time(raw: Option<&str>) -> Result<Option<NaiveTime>, AppError> {
    match raw {
        None => Ok(None),
        Some(value) => NaiveTime::parse_from_str(value, hhmm::FORMAT)
            .map(Some)
            .map_err(|_| AppError::Validation("Invalid time format, expected HH:MM".to_string())),
    }
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(session): Extension<SessionContext>,
    Path(doctor_id): Path<Uuid>,
    Json(payload): Json<BookAppointmentPayload>,
) -> Result<Json<Value>, AppError> {
    let time = parse_time(payload.time.as_deref())?;

    let request = booking::assemble(doctor_id, payload.date, time, payload.reason.as_deref())
        .map_err(AppError::from)?;

    let service = BookingService::new(&state);
    let appointment = service
        .submit_booking(&request, &session)
        .await
        .map_err(|e| AppError::Records(e.to_string()))?;

    Ok(Json(json!({
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(session): Extension<SessionContext>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .get_appointment(appointment_id, &session)
        .await
        .map_err(|_| AppError::NotFound("Appointment not found".to_string()))?;

    Ok(Json(json!(appointment)))
}

/// Edit flow: the slot sequence is re-derived for the new date before the
/// new time is accepted, so a time the doctor no longer offers (or one the
/// lead-time window has moved past) is rejected instead of submitted.
#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(session): Extension<SessionContext>,
    Path(appointment_id): Path<Uuid>,
    Json(payload): Json<ReschedulePayload>,
) -> Result<Json<Value>, AppError> {
    let time = parse_time(payload.time.as_deref())?;

    let service = BookingService::new(&state);
    let appointment = service
        .get_appointment(appointment_id, &session)
        .await
        .map_err(|_| AppError::NotFound("Appointment not found".to_string()))?;

    let config = AvailabilityService::new(&state)
        .get_availability(appointment.doctor_id, Some(&session))
        .await
        .map_err(|e| AppError::Records(e.to_string()))?;

    let request = booking::reconcile(&appointment, payload.date, time, &config, Utc::now())
        .map_err(AppError::from)?;

    let updated = service
        .submit_reschedule(appointment_id, &request, &session)
        .await
        .map_err(|e| AppError::Records(e.to_string()))?;

    Ok(Json(json!({
        "appointment": updated
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(session): Extension<SessionContext>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    set_status(&state, &session, appointment_id, AppointmentStatus::Canceled).await
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(session): Extension<SessionContext>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    set_status(&state, &session, appointment_id, AppointmentStatus::Completed).await
}

async fn set_status(
    state: &Arc<AppConfig>,
    session: &SessionContext,
    appointment_id: Uuid,
    target: AppointmentStatus,
) -> Result<Json<Value>, AppError> {
    let booking_service = BookingService::new(state);

    let appointment = booking_service
        .get_appointment(appointment_id, session)
        .await
        .map_err(|_| AppError::NotFound("Appointment not found".to_string()))?;

    lifecycle::ensure_transition(&appointment, target).map_err(AppError::from)?;

    let updated = LifecycleService::new(state)
        .set_status(appointment_id, target, session)
        .await
        .map_err(|e| AppError::Records(e.to_string()))?;

    Ok(Json(json!({
        "appointment": updated
    })))
}
