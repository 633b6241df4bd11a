pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/catalog", get(handlers::catalog::list_catalog))
        .route(
            "/api/catalog/sessions",
            post(handlers::catalog::upsert_session),
        )
        .route("/api/catalog/classes", post(handlers::catalog::upsert_class))
        .route(
            "/api/catalog/appointment-types",
            post(handlers::catalog::upsert_appointment_type),
        )
        .route(
            "/api/catalog/:kind/:id/toggle",
            post(handlers::catalog::toggle_status),
        )
        .route(
            "/api/catalog/:kind/:id",
            axum::routing::delete(handlers::catalog::delete_service),
        )
        .route(
            "/api/classes/:id/occurrences",
            get(handlers::availability::class_occurrences),
        )
        .route(
            "/api/appointments/:id/slots",
            get(handlers::availability::appointment_slots),
        )
        .route(
            "/api/appointments/:id/dates",
            get(handlers::availability::appointment_dates),
        )
        .route(
            "/api/bookings",
            get(handlers::bookings::list_bookings).post(handlers::bookings::create_booking),
        )
        .route(
            "/api/bookings/:id/cancel",
            post(handlers::bookings::cancel_booking),
        )
        .route(
            "/api/bookings/:id/reschedule",
            post(handlers::bookings::reschedule_booking),
        )
        .route(
            "/api/bookings/:id/reschedulable",
            get(handlers::bookings::reschedulable),
        )
        .route("/api/calendar", get(handlers::calendar::calendar_feed))
        .route(
            "/calendar/:booking_id",
            get(handlers::calendar::download_ics),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
