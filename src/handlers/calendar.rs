use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use super::{check_auth, now};
use crate::errors::AppError;
use crate::models::{CalendarEvent, EventFilters};
use crate::services::calendar::{events, generate_ics};
use crate::state::AppState;
use crate::store::{BookingStore, CatalogStore};

// GET /api/calendar
#[derive(Deserialize)]
pub struct FeedQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub sessions: Option<bool>,
    pub classes: Option<bool>,
    pub bookings: Option<bool>,
    #[serde(default)]
    pub only_booked: bool,
}

pub async fn calendar_feed(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<CalendarEvent>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let days = (query.end - query.start).num_days() + 1;
    if days > state.config.max_calendar_days {
        return Err(AppError::InvalidInput(format!(
            "calendar range is limited to {} days",
            state.config.max_calendar_days
        )));
    }

    let filters = EventFilters {
        include_sessions: query.sessions.unwrap_or(true),
        include_classes: query.classes.unwrap_or(true),
        include_appointment_bookings: query.bookings.unwrap_or(true),
    };

    let feed = {
        let db = state.conn()?;
        events(&*db, &*db, query.start, query.end, filters, query.only_booked)?
    };
    Ok(Json(feed))
}

// GET /calendar/:booking_id (accepts a trailing .ics)
pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let raw = raw_id.strip_suffix(".ics").unwrap_or(&raw_id);
    let booking_id: i64 = raw
        .parse()
        .map_err(|_| AppError::NotFound(format!("booking {raw}")))?;

    let (booking, service) = {
        let db = state.conn()?;
        let booking = db
            .booking(booking_id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;
        let service = db.find_service(booking.service_ref())?;
        (booking, service)
    };

    let ics = generate_ics(
        &booking,
        service.as_ref(),
        &state.config.business_name,
        now(),
    );
    let filename = format!("booking-{booking_id}.ics");

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response())
}
