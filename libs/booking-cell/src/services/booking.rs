// libs/booking-cell/src/services/booking.rs
//
// Booking assembly and its boundary submits. `assemble` and `reconcile` are
// the pure half: deterministic functions of their inputs and the supplied
// clock, surfacing validation failures synchronously before any request is
// sent. The service half hands finished requests to the records store and
// passes its failures through uninterpreted.

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use availability_cell::models::AvailabilityConfig;
use availability_cell::services::slots;
use shared_config::AppConfig;
use shared_database::records::RecordsClient;
use shared_models::session::SessionContext;

use crate::models::{Appointment, BookingError, BookingRequest};

/// Combine a chosen date, time and optional reason into a booking request.
/// Date and time are both mandatory; the reason is trimmed and blank input
/// becomes no reason at all.
pub fn assemble(
    doctor_id: Uuid,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    reason: Option<&str>,
) -> Result<BookingRequest, BookingError> {
    let date = date.ok_or(BookingError::MissingDate)?;
    let time = time.ok_or(BookingError::MissingTime)?;

    let reason = reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(String::from);

    Ok(BookingRequest {
        doctor_id,
        date,
        time,
        reason,
    })
}

/// The edit-flow counterpart: same validation as a new booking, then the new
/// date must pass the calendar gate and the slot sequence is regenerated for
/// it with the canonical engine, so the chosen time must still be on offer.
/// Guards against submitting a blocked or past date, a time the availability
/// no longer yields, or one the lead-time window has passed by.
pub fn reconcile(
    appointment: &Appointment,
    new_date: Option<NaiveDate>,
    new_time: Option<NaiveTime>,
    config: &AvailabilityConfig,
    now: DateTime<Utc>,
) -> Result<BookingRequest, BookingError> {
    let request = assemble(
        appointment.doctor_id,
        new_date,
        new_time,
        appointment.reason.as_deref(),
    )?;

    if !slots::is_selectable(request.date, &config.unavailable_dates, now.date_naive()) {
        return Err(BookingError::ClosedDate);
    }

    let fresh = slots::bookable_slots(Some(config), Some(request.date), now);
    if !fresh.iter().any(|slot| slot.time() == request.time) {
        return Err(BookingError::StaleSlot);
    }

    Ok(request)
}

pub struct BookingService {
    records: RecordsClient,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            records: RecordsClient::new(config),
        }
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        session: &SessionContext,
    ) -> Result<Appointment> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .records
            .request(Method::GET, &path, Some(session.token()), None)
            .await?;

        if result.is_empty() {
            return Err(anyhow!("Appointment not found"));
        }

        let appointment: Appointment = serde_json::from_value(result[0].clone())?;
        Ok(appointment)
    }

    pub async fn submit_booking(
        &self,
        request: &BookingRequest,
        session: &SessionContext,
    ) -> Result<Appointment> {
        info!(
            "Submitting booking for doctor {} on {} at {}",
            request.doctor_id,
            request.date,
            request.time.format("%H:%M")
        );

        let mut row = serde_json::to_value(request)?;
        row["status"] = json!("booked");
        row["created_at"] = json!(Utc::now().to_rfc3339());

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .records
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(session.token()),
                Some(row),
                Some(headers),
            )
            .await?;

        if result.is_empty() {
            return Err(anyhow!("Failed to book appointment"));
        }

        let appointment: Appointment = serde_json::from_value(result[0].clone())?;
        info!("Appointment booked with ID: {}", appointment.id);

        Ok(appointment)
    }

    pub async fn submit_reschedule(
        &self,
        appointment_id: Uuid,
        request: &BookingRequest,
        session: &SessionContext,
    ) -> Result<Appointment> {
        info!(
            "Rescheduling appointment {} to {} at {}",
            appointment_id,
            request.date,
            request.time.format("%H:%M")
        );

        let update = json!({
            "date": request.date,
            "time": request.time.format("%H:%M").to_string(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .records
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(session.token()),
                Some(update),
                Some(headers),
            )
            .await?;

        if result.is_empty() {
            return Err(anyhow!("Failed to reschedule appointment"));
        }

        let appointment: Appointment = serde_json::from_value(result[0].clone())?;
        Ok(appointment)
    }
}
