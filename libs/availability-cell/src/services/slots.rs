// libs/availability-cell/src/services/slots.rs
//
// The slot engine: turns a doctor's configured working windows into the
// concrete sequence of bookable start times offered to patients. Every
// function here is a pure, synchronous computation over its inputs and the
// wall-clock reading the caller supplies; regeneration on a new date
// selection simply supersedes the previous result.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use serde_json::Value;
use tracing::debug;

use crate::models::{hhmm, AvailabilityConfig, BookableSlot, TimeRange};

/// Target slot count used when a doctor never configured one (or set 0).
pub const DEFAULT_SLOTS_PER_DAY: u32 = 6;

/// Slot boundaries land on these clean minute marks.
pub const SLOT_GRANULARITY_MINUTES: i64 = 10;

/// Minimum lead time between "now" and a slot for it to be offered.
pub const MIN_LEAD_MINUTES: i64 = 60;

/// Fixed fallback used when a doctor has no usable ranges at all, so the
/// generator always has at least one valid window to work with.
pub fn fallback_ranges() -> Vec<TimeRange> {
    vec![
        TimeRange {
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        },
        TimeRange {
            start: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        },
    ]
}

/// Validate and repair raw range configuration. Entries must be objects with
/// string `start`/`end` fields parsing as HH:MM with end strictly after
/// start; anything else is discarded and the survivors keep their original
/// order. Overlapping or unsorted ranges are accepted as-is.
pub fn normalize_ranges(raw: Option<&Value>) -> Vec<TimeRange> {
    let entries: &[Value] = raw
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let mut ranges = Vec::new();
    for entry in entries {
        let (Some(start), Some(end)) = (
            entry.get("start").and_then(Value::as_str),
            entry.get("end").and_then(Value::as_str),
        ) else {
            continue;
        };
        let (Ok(start), Ok(end)) = (
            NaiveTime::parse_from_str(start, hhmm::FORMAT),
            NaiveTime::parse_from_str(end, hhmm::FORMAT),
        ) else {
            continue;
        };
        let Some(range) = TimeRange::new(start, end) else {
            continue;
        };
        ranges.push(range);
    }

    if ranges.is_empty() {
        debug!("No usable time ranges configured, falling back to defaults");
        return fallback_ranges();
    }

    ranges
}

/// Build a full config from whatever the records store returned, repairing
/// each field independently so one bad value never poisons the rest.
pub fn parse_config(raw: &Value) -> AvailabilityConfig {
    AvailabilityConfig {
        time_ranges: normalize_ranges(raw.get("time_ranges")),
        slots_per_day: raw
            .get("slots_per_day")
            .and_then(Value::as_u64)
            .map(|n| n as u32)
            .filter(|n| *n >= 1)
            .unwrap_or(DEFAULT_SLOTS_PER_DAY),
        unavailable_dates: raw
            .get("unavailable_dates")
            .and_then(Value::as_array)
            .map(|dates| {
                dates
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
                    .collect()
            })
            .unwrap_or_default(),
    }
}

pub fn effective_slot_target(slots_per_day: u32) -> u32 {
    if slots_per_day == 0 {
        DEFAULT_SLOTS_PER_DAY
    } else {
        slots_per_day
    }
}

/// Uniform per-slot duration shared by all ranges: total configured minutes
/// split across the target count, then rounded up to the next 10-minute mark
/// with a hard floor of 10 so a degenerate target never yields a zero or
/// negative duration.
pub fn plan_slot_duration(ranges: &[TimeRange], slots_per_day: u32) -> i64 {
    let target = effective_slot_target(slots_per_day) as i64;
    let total_minutes: i64 = ranges.iter().map(TimeRange::minutes).sum();
    let raw = total_minutes / target;

    let adjusted =
        (raw + SLOT_GRANULARITY_MINUTES - 1) / SLOT_GRANULARITY_MINUTES * SLOT_GRANULARITY_MINUTES;
    adjusted.max(SLOT_GRANULARITY_MINUTES)
}

fn minutes_from_midnight(time: NaiveTime) -> i64 {
    (time.hour() * 60 + time.minute()) as i64
}

fn round_up_to_granularity(minutes: i64) -> i64 {
    (minutes + SLOT_GRANULARITY_MINUTES - 1) / SLOT_GRANULARITY_MINUTES * SLOT_GRANULARITY_MINUTES
}

/// Walk each range in configured order, emitting slot start times at the
/// planned stride. A slot is placed only strictly before the range's
/// configured end instant, and only if it is at least MIN_LEAD_MINUTES ahead
/// of `now`; a slot failing the lead-time check is skipped without counting
/// toward the target and without ending the walk. Generation stops globally
/// once the target count is reached, so earlier ranges fill first.
pub fn generate_slots(
    date: NaiveDate,
    ranges: &[TimeRange],
    minutes_per_slot: i64,
    slots_per_day: u32,
    now: DateTime<Utc>,
) -> Vec<BookableSlot> {
    let target = effective_slot_target(slots_per_day) as usize;
    if minutes_per_slot <= 0 {
        return Vec::new();
    }

    let day_start = date.and_time(NaiveTime::MIN).and_utc();
    let mut slots = Vec::new();

    for range in ranges {
        if slots.len() >= target {
            break;
        }

        // First slot lands on a clean boundary even if the range does not.
        let first = round_up_to_granularity(minutes_from_midnight(range.start));
        let range_end = day_start + Duration::minutes(minutes_from_midnight(range.end));

        let mut current = day_start + Duration::minutes(first);
        while current < range_end && slots.len() < target {
            if current.signed_duration_since(now) >= Duration::minutes(MIN_LEAD_MINUTES) {
                slots.push(BookableSlot { starts_at: current });
            }
            current += Duration::minutes(minutes_per_slot);
        }
    }

    slots
}

/// The composed engine used by both booking and edit flows. An unresolved
/// config or missing date selection yields an empty sequence, never an
/// error.
pub fn bookable_slots(
    config: Option<&AvailabilityConfig>,
    date: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> Vec<BookableSlot> {
    let (Some(config), Some(date)) = (config, date) else {
        return Vec::new();
    };

    let minutes_per_slot = plan_slot_duration(&config.time_ranges, config.slots_per_day);
    generate_slots(
        date,
        &config.time_ranges,
        minutes_per_slot,
        config.slots_per_day,
        now,
    )
}

/// Calendar gate consulted before any slot generation: a date is selectable
/// iff it is not before today (same-day booking is allowed) and its calendar
/// day is not explicitly blocked. Time of day plays no part.
pub fn is_selectable(date: NaiveDate, unavailable_dates: &[NaiveDate], today: NaiveDate) -> bool {
    date >= today && !unavailable_dates.contains(&date)
}
