use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::availability::to_human_readable;
use crate::models::{hhmm, ServiceKind, ServiceRef};
use crate::services::availability::{available_slots, available_slots_excluding, bookable_dates};
use crate::services::occurrence::occurrences;
use crate::state::AppState;
use crate::store::BookingStore;

// GET /api/classes/:id/occurrences
#[derive(Deserialize)]
pub struct OccurrencesQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct OccurrencesResponse {
    class_id: i64,
    #[serde(with = "hhmm")]
    start_time: chrono::NaiveTime,
    dates: Vec<NaiveDate>,
}

pub async fn class_occurrences(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<OccurrencesQuery>,
) -> Result<Json<OccurrencesResponse>, AppError> {
    let class = {
        let db = state.conn()?;
        queries::get_class(&db, id)?.ok_or_else(|| AppError::NotFound(format!("class {id}")))?
    };

    Ok(Json(OccurrencesResponse {
        class_id: class.id,
        start_time: class.schedule.start_time,
        dates: occurrences(&class, query.from, query.to),
    }))
}

// GET /api/appointments/:id/slots
#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
    pub exclude_booking: Option<i64>,
}

#[derive(Serialize)]
pub struct SlotsResponse {
    appointment_id: i64,
    date: NaiveDate,
    slots: Vec<String>,
}

pub async fn appointment_slots(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, AppError> {
    let (appt, existing) = {
        let db = state.conn()?;
        let appt = queries::get_appointment_type(&db, id)?
            .ok_or_else(|| AppError::NotFound(format!("appointment type {id}")))?;
        let service = ServiceRef {
            kind: ServiceKind::Appointment,
            id,
        };
        let existing = db.bookings_for_service_on(service, query.date)?;
        (appt, existing)
    };

    let slots = match query.exclude_booking {
        Some(booking_id) => available_slots_excluding(&appt, &existing, query.date, booking_id),
        None => available_slots(&appt, &existing, query.date),
    };

    Ok(Json(SlotsResponse {
        appointment_id: id,
        date: query.date,
        slots,
    }))
}

// GET /api/appointments/:id/dates
#[derive(Serialize)]
pub struct DatesResponse {
    appointment_id: i64,
    availability: String,
    dates: Vec<NaiveDate>,
}

pub async fn appointment_dates(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DatesResponse>, AppError> {
    let today = super::now().date();

    let (appt, existing) = {
        let db = state.conn()?;
        let appt = queries::get_appointment_type(&db, id)?
            .ok_or_else(|| AppError::NotFound(format!("appointment type {id}")))?;
        let horizon = Days::new(u64::try_from(appt.date_range_days).unwrap_or(0));
        let last = today.checked_add_days(horizon).unwrap_or(NaiveDate::MAX);
        let existing = db.bookings_between(today, last)?;
        (appt, existing)
    };

    Ok(Json(DatesResponse {
        appointment_id: id,
        availability: to_human_readable(&appt.weekly_availability),
        dates: bookable_dates(&appt, &existing, today),
    }))
}
