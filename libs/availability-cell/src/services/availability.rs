// libs/availability-cell/src/services/availability.rs

use anyhow::{anyhow, Result};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::records::RecordsClient;
use shared_models::session::SessionContext;

use crate::models::{AvailabilityConfig, Doctor, UpdateAvailabilityRequest};
use crate::services::slots::{self, DEFAULT_SLOTS_PER_DAY};

pub struct AvailabilityService {
    records: RecordsClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            records: RecordsClient::new(config),
        }
    }

    pub async fn list_doctors(&self, session: Option<&SessionContext>) -> Result<Vec<Doctor>> {
        debug!("Fetching doctor directory");

        let result: Vec<Value> = self
            .records
            .request(
                Method::GET,
                "/rest/v1/doctors?order=full_name.asc",
                session.map(SessionContext::token),
                None,
            )
            .await?;

        let doctors = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Doctor>, _>>()?;

        Ok(doctors)
    }

    pub async fn get_doctor(
        &self,
        doctor_id: Uuid,
        session: Option<&SessionContext>,
    ) -> Result<Doctor> {
        debug!("Fetching doctor: {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self
            .records
            .request(
                Method::GET,
                &path,
                session.map(SessionContext::token),
                None,
            )
            .await?;

        if result.is_empty() {
            return Err(anyhow!("Doctor not found"));
        }

        let doctor: Doctor = serde_json::from_value(result[0].clone())?;
        Ok(doctor)
    }

    /// Read a doctor's availability configuration. A missing or unreadable
    /// row is not an error: the engine's defaults apply instead.
    pub async fn get_availability(
        &self,
        doctor_id: Uuid,
        session: Option<&SessionContext>,
    ) -> Result<AvailabilityConfig> {
        debug!("Fetching availability for doctor: {}", doctor_id);

        let path = format!("/rest/v1/doctor_availability?doctor_id=eq.{}", doctor_id);
        let result: Vec<Value> = self
            .records
            .request(
                Method::GET,
                &path,
                session.map(SessionContext::token),
                None,
            )
            .await?;

        let raw = result.into_iter().next().unwrap_or_else(|| json!({}));
        Ok(slots::parse_config(&raw))
    }

    /// Replace a doctor's availability configuration. Raw ranges go through
    /// the normalizer, so a save can only ever land a valid config.
    pub async fn save_availability(
        &self,
        doctor_id: Uuid,
        request: UpdateAvailabilityRequest,
        session: &SessionContext,
    ) -> Result<AvailabilityConfig> {
        debug!("Saving availability for doctor: {}", doctor_id);

        let config = AvailabilityConfig {
            time_ranges: slots::normalize_ranges(Some(&request.time_ranges)),
            slots_per_day: request
                .slots_per_day
                .filter(|n| *n >= 1)
                .unwrap_or(DEFAULT_SLOTS_PER_DAY),
            unavailable_dates: request.unavailable_dates,
        };

        let row = json!({
            "doctor_id": doctor_id,
            "time_ranges": config.time_ranges,
            "slots_per_day": config.slots_per_day,
            "unavailable_dates": config.unavailable_dates,
            "updated_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static(
                "return=representation,resolution=merge-duplicates",
            ),
        );

        let result: Vec<Value> = self
            .records
            .request_with_headers(
                Method::POST,
                "/rest/v1/doctor_availability?on_conflict=doctor_id",
                Some(session.token()),
                Some(row),
                Some(headers),
            )
            .await?;

        if result.is_empty() {
            return Err(anyhow!("Failed to save availability"));
        }

        Ok(config)
    }
}
