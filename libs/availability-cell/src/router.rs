use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::session_middleware;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/doctors", get(handlers::list_doctors_public))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor_public))
        .route(
            "/doctors/{doctor_id}/slots",
            get(handlers::get_bookable_slots_public),
        );

    // Protected routes (session required)
    let protected_routes = Router::new()
        .route(
            "/doctors/{doctor_id}/availability",
            get(handlers::get_availability).put(handlers::update_availability),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
