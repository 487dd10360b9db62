use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::session_middleware;

use crate::handlers;

/// Booking and appointment lifecycle routes. All of them act on behalf of a
/// caller, so the whole router sits behind the session middleware.
pub fn booking_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route(
            "/doctors/{doctor_id}/appointments",
            post(handlers::book_appointment),
        )
        .route(
            "/appointments/{appointment_id}",
            get(handlers::get_appointment)
                .put(handlers::reschedule_appointment)
                .delete(handlers::cancel_appointment),
        )
        .route(
            "/appointments/{appointment_id}/complete",
            put(handlers::complete_appointment),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .with_state(state)
}
