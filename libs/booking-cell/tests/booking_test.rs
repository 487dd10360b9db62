// libs/booking-cell/tests/booking_test.rs
//
// Tests for booking assembly, edit reconciliation, and the appointment
// lifecycle rules, plus the records-store submits behind a mock server.

use assert_matches::assert_matches;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use availability_cell::models::{AvailabilityConfig, TimeRange};
use availability_cell::services::slots::fallback_ranges;
use booking_cell::models::{Appointment, AppointmentStatus, BookingError, LifecycleError};
use booking_cell::services::booking::{assemble, reconcile, BookingService};
use booking_cell::services::lifecycle::ensure_transition;
use shared_config::AppConfig;
use shared_models::session::SessionContext;

// ==============================================================================
// TEST FIXTURES AND UTILITIES
// ==============================================================================

fn t(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn d(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn at(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(t(hour, minute)))
}

fn doctor_id() -> Uuid {
    Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap()
}

fn booked_appointment(date: NaiveDate, time: NaiveTime) -> Appointment {
    Appointment {
        id: Uuid::parse_str("6f9619ff-8b86-d011-b42d-00c04fc964ff").unwrap(),
        doctor_id: doctor_id(),
        patient_id: None,
        date,
        time,
        reason: Some("Follow-up".to_string()),
        status: AppointmentStatus::Booked,
        created_at: None,
        updated_at: None,
    }
}

fn default_config() -> AvailabilityConfig {
    AvailabilityConfig {
        time_ranges: fallback_ranges(),
        slots_per_day: 6,
        unavailable_dates: vec![],
    }
}

fn test_date() -> NaiveDate {
    d(2031, 3, 5)
}

fn night_before() -> DateTime<Utc> {
    at(d(2031, 3, 4), 0, 0)
}

// ==============================================================================
// BOOKING ASSEMBLY
// ==============================================================================

#[test]
fn assemble_requires_a_date() {
    let result = assemble(doctor_id(), None, Some(t(9, 10)), Some("checkup"));
    assert_matches!(result, Err(BookingError::MissingDate));
}

#[test]
fn assemble_requires_a_time() {
    let result = assemble(doctor_id(), Some(test_date()), None, None);
    assert_matches!(result, Err(BookingError::MissingTime));
}

#[test]
fn assemble_trims_the_reason_and_drops_blank_input() {
    let request = assemble(
        doctor_id(),
        Some(test_date()),
        Some(t(9, 10)),
        Some("  persistent cough  "),
    )
    .unwrap();
    assert_eq!(request.reason.as_deref(), Some("persistent cough"));

    let request = assemble(doctor_id(), Some(test_date()), Some(t(9, 10)), Some("   ")).unwrap();
    assert_eq!(request.reason, None);

    let request = assemble(doctor_id(), Some(test_date()), Some(t(9, 10)), None).unwrap();
    assert_eq!(request.reason, None);
}

#[test]
fn booking_request_serializes_calendar_day_and_clock_time() {
    let request = assemble(
        doctor_id(),
        Some(test_date()),
        Some(t(9, 10)),
        Some("checkup"),
    )
    .unwrap();

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["date"], json!("2031-03-05"));
    assert_eq!(value["time"], json!("09:10"));
    assert_eq!(value["reason"], json!("checkup"));
}

// ==============================================================================
// EDIT RECONCILIATION
// ==============================================================================

#[test]
fn reconcile_accepts_a_time_still_on_offer() {
    let appointment = booked_appointment(test_date(), t(8, 0));
    let config = default_config();

    // 09:10 is part of the regenerated sequence for the default config
    let request = reconcile(
        &appointment,
        Some(test_date()),
        Some(t(9, 10)),
        &config,
        night_before(),
    )
    .unwrap();

    assert_eq!(request.time, t(9, 10));
    assert_eq!(request.reason.as_deref(), Some("Follow-up"));
}

#[test]
fn reconcile_rejects_a_time_no_longer_offered() {
    // Scenario: appointment was booked at 14:00, but the regenerated
    // sequence for the default ranges never contains 14:00.
    let appointment = booked_appointment(test_date(), t(14, 0));
    let config = default_config();

    let result = reconcile(
        &appointment,
        Some(test_date()),
        Some(t(14, 0)),
        &config,
        night_before(),
    );

    assert_matches!(result, Err(BookingError::StaleSlot));
}

#[test]
fn reconcile_rejects_a_slot_the_lead_time_window_passed_by() {
    let appointment = booked_appointment(test_date(), t(8, 0));
    let config = default_config();

    // 08:00 is offered the night before, but not 30 minutes ahead of it
    let result = reconcile(
        &appointment,
        Some(test_date()),
        Some(t(8, 0)),
        &config,
        at(test_date(), 7, 30),
    );

    assert_matches!(result, Err(BookingError::StaleSlot));
}

#[test]
fn reconcile_validates_missing_fields_first() {
    let appointment = booked_appointment(test_date(), t(8, 0));
    let config = default_config();

    let result = reconcile(&appointment, None, Some(t(9, 10)), &config, night_before());
    assert_matches!(result, Err(BookingError::MissingDate));

    let result = reconcile(&appointment, Some(test_date()), None, &config, night_before());
    assert_matches!(result, Err(BookingError::MissingTime));
}

#[test]
fn reconcile_rejects_a_blocked_calendar_day() {
    let appointment = booked_appointment(test_date(), t(8, 0));
    let mut config = default_config();
    config.unavailable_dates = vec![test_date()];

    // 09:10 would be on offer, but the day itself is blocked
    let result = reconcile(
        &appointment,
        Some(test_date()),
        Some(t(9, 10)),
        &config,
        night_before(),
    );

    assert_matches!(result, Err(BookingError::ClosedDate));
}

#[test]
fn reconcile_rejects_a_date_in_the_past() {
    let appointment = booked_appointment(test_date(), t(8, 0));
    let config = default_config();

    let result = reconcile(
        &appointment,
        Some(d(2031, 3, 4)),
        Some(t(9, 10)),
        &config,
        at(d(2031, 3, 5), 0, 0),
    );

    assert_matches!(result, Err(BookingError::ClosedDate));
}

#[test]
fn reconcile_respects_an_availability_change() {
    // Doctor moved to an afternoon-only window; the old morning time dies.
    let appointment = booked_appointment(test_date(), t(9, 10));
    let config = AvailabilityConfig {
        time_ranges: vec![TimeRange::new(t(13, 0), t(17, 0)).unwrap()],
        slots_per_day: 4,
        unavailable_dates: vec![],
    };

    let result = reconcile(
        &appointment,
        Some(test_date()),
        Some(t(9, 10)),
        &config,
        night_before(),
    );
    assert_matches!(result, Err(BookingError::StaleSlot));

    // 13:00 is the first slot of the new window
    let request = reconcile(
        &appointment,
        Some(test_date()),
        Some(t(13, 0)),
        &config,
        night_before(),
    )
    .unwrap();
    assert_eq!(request.time, t(13, 0));
}

// ==============================================================================
// LIFECYCLE RULES
// ==============================================================================

#[test]
fn lifecycle_allows_leaving_booked() {
    let appointment = booked_appointment(test_date(), t(9, 10));

    assert!(ensure_transition(&appointment, AppointmentStatus::Canceled).is_ok());
    assert!(ensure_transition(&appointment, AppointmentStatus::Completed).is_ok());
}

#[test]
fn lifecycle_rejects_moves_out_of_terminal_states() {
    let mut appointment = booked_appointment(test_date(), t(9, 10));

    appointment.status = AppointmentStatus::Completed;
    assert_matches!(
        ensure_transition(&appointment, AppointmentStatus::Canceled),
        Err(LifecycleError::InvalidTransition { .. })
    );

    appointment.status = AppointmentStatus::Canceled;
    assert_matches!(
        ensure_transition(&appointment, AppointmentStatus::Completed),
        Err(LifecycleError::InvalidTransition { .. })
    );
}

// ==============================================================================
// RECORDS STORE SUBMITS
// ==============================================================================

fn test_config(mock_server: &MockServer) -> AppConfig {
    AppConfig {
        records_api_url: mock_server.uri(),
        records_service_key: "test-key".to_string(),
    }
}

fn appointment_row() -> serde_json::Value {
    json!({
        "id": "6f9619ff-8b86-d011-b42d-00c04fc964ff",
        "doctor_id": "550e8400-e29b-41d4-a716-446655440000",
        "patient_id": null,
        "date": "2031-03-05",
        "time": "09:10",
        "reason": "checkup",
        "status": "booked",
        "created_at": null,
        "updated_at": null
    })
}

#[tokio::test]
async fn submit_booking_posts_and_parses_the_stored_row() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(vec![appointment_row()]))
        .mount(&mock_server)
        .await;

    let service = BookingService::new(&test_config(&mock_server));
    let session = SessionContext::new("patient-token");

    let request = assemble(
        doctor_id(),
        Some(test_date()),
        Some(t(9, 10)),
        Some("checkup"),
    )
    .unwrap();

    let appointment = service.submit_booking(&request, &session).await.unwrap();

    assert_eq!(appointment.doctor_id, doctor_id());
    assert_eq!(appointment.time, t(9, 10));
    assert_eq!(appointment.status, AppointmentStatus::Booked);
}

#[tokio::test]
async fn get_appointment_surfaces_missing_rows() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<serde_json::Value>::new()))
        .mount(&mock_server)
        .await;

    let service = BookingService::new(&test_config(&mock_server));
    let session = SessionContext::new("patient-token");

    let result = service
        .get_appointment(Uuid::new_v4(), &session)
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn boundary_failures_pass_through_uninterpreted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_string("slot already taken"))
        .mount(&mock_server)
        .await;

    let service = BookingService::new(&test_config(&mock_server));
    let session = SessionContext::new("patient-token");

    let request = assemble(doctor_id(), Some(test_date()), Some(t(9, 10)), None).unwrap();
    let err = service.submit_booking(&request, &session).await.unwrap_err();

    assert!(err.to_string().contains("slot already taken"));
}
