use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Serde adapter for clock times carried on the wire as "HH:MM".
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// A contiguous working window on a given day. Invariant: `end` is strictly
/// after `start`; the normalizer discards anything that breaks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        if end > start {
            Some(Self { start, end })
        } else {
            None
        }
    }

    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// A doctor's availability configuration. Long-lived, edited rarely, read by
/// the slot engine on every booking or edit attempt. Range order determines
/// generation order, not priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityConfig {
    pub time_ranges: Vec<TimeRange>,
    pub slots_per_day: u32,
    pub unavailable_dates: Vec<NaiveDate>,
}

/// A single bookable instant. Derived, never stored: recomputed from the
/// current config and wall clock on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookableSlot {
    pub starts_at: DateTime<Utc>,
}

impl BookableSlot {
    pub fn date(&self) -> NaiveDate {
        self.starts_at.date_naive()
    }

    pub fn time(&self) -> NaiveTime {
        self.starts_at.time()
    }

    pub fn time_label(&self) -> String {
        self.starts_at.format(hhmm::FORMAT).to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub full_name: String,
    pub specialization: Option<String>,
    pub email: Option<String>,
}

/// Save payload for a doctor's availability. `time_ranges` is taken as raw
/// JSON on purpose: malformed entries are repaired by the normalizer rather
/// than rejected wholesale.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAvailabilityRequest {
    #[serde(default)]
    pub time_ranges: Value,
    pub slots_per_day: Option<u32>,
    #[serde(default)]
    pub unavailable_dates: Vec<NaiveDate>,
}
