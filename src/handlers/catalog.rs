use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use super::check_auth;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::availability::{validate_days, validate_weekly};
use crate::models::{AppointmentType, Class, ServiceKind, ServiceRef, ServiceStatus, Session};
use crate::state::AppState;
use crate::store::CatalogStore;

// GET /api/catalog
#[derive(Serialize)]
pub struct CatalogResponse {
    sessions: Vec<Session>,
    classes: Vec<Class>,
    appointment_types: Vec<AppointmentType>,
}

pub async fn list_catalog(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CatalogResponse>, AppError> {
    let db = state.conn()?;
    Ok(Json(CatalogResponse {
        sessions: db.sessions()?,
        classes: db.classes()?,
        appointment_types: db.appointment_types()?,
    }))
}

const MAX_DURATION_MINUTES: i64 = 24 * 60;
const MAX_DATE_RANGE_DAYS: i64 = 366;

fn require_basics(title: &str, duration: i64) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::InvalidInput("title is required".to_string()));
    }
    if !(1..=MAX_DURATION_MINUTES).contains(&duration) {
        return Err(AppError::InvalidInput(format!(
            "duration must be between 1 and {MAX_DURATION_MINUTES} minutes"
        )));
    }
    Ok(())
}

fn invalid(err: anyhow::Error) -> AppError {
    AppError::InvalidInput(err.to_string())
}

// POST /api/catalog/sessions
pub async fn upsert_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(mut session): Json<Session>,
) -> Result<Json<Session>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    require_basics(&session.title, session.duration)?;

    let db = state.conn()?;
    if session.id > 0 {
        if !queries::update_session(&db, &session)? {
            return Err(AppError::NotFound(format!("session {}", session.id)));
        }
    } else {
        session.id = queries::insert_session(&db, &session)?;
    }

    tracing::info!(session_id = session.id, title = %session.title, "session saved");
    Ok(Json(session))
}

// POST /api/catalog/classes
pub async fn upsert_class(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(mut class): Json<Class>,
) -> Result<Json<Class>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    require_basics(&class.title, class.duration)?;
    validate_days(&class.schedule.days).map_err(invalid)?;
    if let (Some(start), Some(end)) = (class.schedule.start_date, class.schedule.end_date) {
        if end < start {
            return Err(AppError::InvalidInput(
                "end_date must not be before start_date".to_string(),
            ));
        }
    }

    let db = state.conn()?;
    if class.id > 0 {
        if !queries::update_class(&db, &class)? {
            return Err(AppError::NotFound(format!("class {}", class.id)));
        }
    } else {
        class.id = queries::insert_class(&db, &class)?;
    }

    tracing::info!(class_id = class.id, title = %class.title, "class saved");
    Ok(Json(class))
}

// POST /api/catalog/appointment-types
pub async fn upsert_appointment_type(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(mut appt): Json<AppointmentType>,
) -> Result<Json<AppointmentType>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    require_basics(&appt.title, appt.duration)?;
    validate_weekly(&appt.weekly_availability).map_err(invalid)?;
    if !(1..=MAX_DATE_RANGE_DAYS).contains(&appt.date_range_days) {
        return Err(AppError::InvalidInput(format!(
            "date_range_days must be between 1 and {MAX_DATE_RANGE_DAYS}"
        )));
    }

    let db = state.conn()?;
    if appt.id > 0 {
        if !queries::update_appointment_type(&db, &appt)? {
            return Err(AppError::NotFound(format!("appointment type {}", appt.id)));
        }
    } else {
        appt.id = queries::insert_appointment_type(&db, &appt)?;
    }

    tracing::info!(appointment_id = appt.id, title = %appt.title, "appointment type saved");
    Ok(Json(appt))
}

fn parse_kind(raw: &str) -> Result<ServiceKind, AppError> {
    ServiceKind::parse(raw)
        .ok_or_else(|| AppError::InvalidInput(format!("unknown service kind: {raw}")))
}

// POST /api/catalog/:kind/:id/toggle
#[derive(Serialize)]
pub struct ToggleResponse {
    kind: ServiceKind,
    id: i64,
    status: ServiceStatus,
}

pub async fn toggle_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((kind, id)): Path<(String, i64)>,
) -> Result<Json<ToggleResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let kind = parse_kind(&kind)?;

    let db = state.conn()?;
    let service = db
        .find_service(ServiceRef { kind, id })?
        .ok_or_else(|| AppError::NotFound(format!("{kind} {id}")))?;

    let status = service.status().toggled();
    queries::set_service_status(&db, kind, id, status)?;

    tracing::info!(service = %kind, service_id = id, status = status.as_str(), "service status changed");
    Ok(Json(ToggleResponse { kind, id, status }))
}

// DELETE /api/catalog/:kind/:id
pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((kind, id)): Path<(String, i64)>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let kind = parse_kind(&kind)?;

    let removed = {
        let db = state.conn()?;
        queries::delete_service(&db, kind, id)?
    };

    if removed {
        tracing::info!(service = %kind, service_id = id, "service deleted");
        Ok(Json(serde_json::json!({"ok": true})))
    } else {
        Err(AppError::NotFound(format!("{kind} {id}")))
    }
}
