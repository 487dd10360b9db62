// libs/booking-cell/src/services/lifecycle.rs

use anyhow::{anyhow, Result};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::records::RecordsClient;
use shared_models::session::SessionContext;

use crate::models::{Appointment, AppointmentStatus, LifecycleError};

/// An appointment only ever moves booked -> completed or booked -> canceled.
pub fn ensure_transition(
    appointment: &Appointment,
    target: AppointmentStatus,
) -> Result<(), LifecycleError> {
    if appointment.status != AppointmentStatus::Booked {
        return Err(LifecycleError::InvalidTransition {
            current: appointment.status,
            target,
        });
    }
    Ok(())
}

pub struct LifecycleService {
    records: RecordsClient,
}

impl LifecycleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            records: RecordsClient::new(config),
        }
    }

    pub async fn set_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
        session: &SessionContext,
    ) -> Result<Appointment> {
        info!("Marking appointment {} as {}", appointment_id, status);

        let update = json!({
            "status": status,
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
            return Err(anyhow!("Failed to update appointment status"));
        }

        let appointment: Appointment = serde_json::from_value(result[0].clone())?;
        Ok(appointment)
    }
}
