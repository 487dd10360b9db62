use std::sync::Arc;

use axum::{routing::get, Router};

use availability_cell::router::doctor_routes;
use booking_cell::router::booking_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Appointment portal API is running!" }))
        .merge(doctor_routes(state.clone()))
        .merge(booking_routes(state))
}
