// libs/booking-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use availability_cell::models::hhmm;
use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    #[serde(default)]
    pub patient_id: Option<Uuid>,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(default)]
    pub reason: Option<String>,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.date.and_time(self.time).and_utc()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Booked,
    Completed,
    Canceled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Booked => write!(f, "booked"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Canceled => write!(f, "canceled"),
        }
    }
}

/// Single-use payload handed to the records store. Built transiently by the
/// assembler and never persisted by this side. The date carries calendar-day
/// semantics: serialized as the day the user picked, never a UTC-shifted
/// instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingRequest {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub reason: Option<String>,
}

/// Incoming booking body. Date and time stay optional so their absence
/// surfaces as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentPayload {
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReschedulePayload {
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Please select a date")]
    MissingDate,

    #[error("Please select a time slot")]
    MissingTime,

    #[error("The selected date is not open for booking")]
    ClosedDate,

    #[error("The selected time is no longer offered for this date")]
    StaleSlot,
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Appointment is {current}; only booked appointments can become {target}")]
    InvalidTransition {
        current: AppointmentStatus,
        target: AppointmentStatus,
    },
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        AppError::Conflict(err.to_string())
    }
}
