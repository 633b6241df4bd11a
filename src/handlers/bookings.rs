use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{check_auth, now};
use crate::errors::AppError;
use crate::models::{Booking, NewBooking, ServiceKind, ServiceRef};
use crate::services::booking::{
    cancel_booking as cancel, create_booking as create, customer_bookings, is_reschedulable,
    reschedule_booking as reschedule, resolve_booking_time,
};
use crate::state::AppState;
use crate::store::{BookingStore, CatalogStore};

// GET /api/bookings?customer_id=
#[derive(Deserialize)]
pub struct CustomerQuery {
    pub customer_id: i64,
}

#[derive(Serialize)]
pub struct CustomerBookingsResponse {
    upcoming: Vec<Booking>,
    past: Vec<Booking>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CustomerQuery>,
) -> Result<Json<CustomerBookingsResponse>, AppError> {
    let (upcoming, past) = {
        let db = state.conn()?;
        customer_bookings(&*db, query.customer_id, now().date())?
    };
    Ok(Json(CustomerBookingsResponse { upcoming, past }))
}

// POST /api/bookings
#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub customer_id: i64,
    pub service_type: ServiceKind,
    pub service_id: i64,
    /// Required for classes and appointments; sessions book their own date.
    pub date: Option<NaiveDate>,
    /// Appointment slot, as a label ("9:30 AM") or `HH:MM`.
    pub slot: Option<String>,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let service_ref = ServiceRef {
        kind: body.service_type,
        id: body.service_id,
    };

    // Availability check and insert share one guard.
    let db = state.conn()?;
    let service = db
        .find_service(service_ref)?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", service_ref.kind, service_ref.id)))?;
    let existing = match body.date {
        Some(date) => db.bookings_for_service_on(service_ref, date)?,
        None => vec![],
    };

    let (event_date, event_time) =
        resolve_booking_time(&service, &existing, body.date, body.slot.as_deref(), None)?;

    let booking = create(
        &*db,
        &*db,
        NewBooking {
            customer_id: body.customer_id,
            service: service_ref,
            event_date,
            event_time,
        },
        now(),
    )?;

    Ok((StatusCode::CREATED, Json(booking)))
}

// POST /api/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Booking>, AppError> {
    let cancelled = {
        let db = state.conn()?;
        cancel(&*db, id, now())?
    };
    cancelled
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}

// POST /api/bookings/:id/reschedule
#[derive(Deserialize)]
pub struct RescheduleRequest {
    pub date: Option<NaiveDate>,
    pub slot: Option<String>,
    /// Skip the reschedule window check. Admin only.
    #[serde(default)]
    pub force: bool,
}

pub async fn reschedule_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<RescheduleRequest>,
) -> Result<Json<Booking>, AppError> {
    if body.force {
        check_auth(&headers, &state.config.admin_token)?;
    }
    let at = now();

    let db = state.conn()?;
    let booking = db
        .booking(id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;
    if booking.is_cancelled() {
        return Err(AppError::Conflict(format!(
            "booking {id} is cancelled and cannot be rescheduled"
        )));
    }
    let service = db.find_service(booking.service_ref())?.ok_or_else(|| {
        AppError::NotFound(format!(
            "{} {} is no longer offered",
            booking.service_type, booking.service_id
        ))
    })?;

    if !body.force && !is_reschedulable(&booking, Some(&service), at) {
        let policy = service.reschedule_policy();
        let reason = if policy.allow_rescheduling {
            format!(
                "booking {id} can no longer be rescheduled (less than {} hours before start)",
                policy.reschedule_hours
            )
        } else {
            format!("{} does not allow rescheduling", service.title())
        };
        return Err(AppError::PolicyViolation(reason));
    }

    let existing = match body.date {
        Some(date) => db.bookings_for_service_on(booking.service_ref(), date)?,
        None => vec![],
    };
    let (new_date, new_time) =
        resolve_booking_time(&service, &existing, body.date, body.slot.as_deref(), Some(id))?;

    reschedule(&*db, id, new_date, new_time, at)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}

// GET /api/bookings/:id/reschedulable
#[derive(Serialize)]
pub struct ReschedulableResponse {
    booking_id: i64,
    reschedulable: bool,
    allow_rescheduling: bool,
    reschedule_hours: Option<i64>,
}

pub async fn reschedulable(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ReschedulableResponse>, AppError> {
    let (booking, service) = {
        let db = state.conn()?;
        let booking = db
            .booking(id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;
        let service = db.find_service(booking.service_ref())?;
        (booking, service)
    };

    let policy = service.as_ref().map(|s| s.reschedule_policy());
    Ok(Json(ReschedulableResponse {
        booking_id: booking.id,
        reschedulable: is_reschedulable(&booking, service.as_ref(), now()),
        allow_rescheduling: policy.is_some_and(|p| p.allow_rescheduling),
        reschedule_hours: policy.map(|p| p.reschedule_hours),
    }))
}
