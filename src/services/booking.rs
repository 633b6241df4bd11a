use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::{Booking, BookingStatus, NewBooking, Service, ServiceKind};
use crate::services::availability::{available_slots_excluding, parse_time_label, time_label};
use crate::services::occurrence::occurs_on;
use crate::store::{BookingStore, CatalogStore};

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{kind} {id} does not exist")]
    ServiceNotFound { kind: ServiceKind, id: i64 },

    #[error("{title} is not currently bookable")]
    NotBookable { title: String },

    #[error("{title} cannot be moved to another time")]
    FixedTime { title: String },

    #[error("{title} does not take place on {date}")]
    DateNotOffered { title: String, date: NaiveDate },

    #[error("the {slot} slot on {date} is no longer available")]
    SlotUnavailable { date: NaiveDate, slot: String },

    #[error("missing selection: {0}")]
    MissingSelection(&'static str),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Records a confirmed booking against an existing catalog item.
///
/// The service title is copied onto the booking so later catalog edits leave
/// booking history untouched. Slot availability is not re-checked here; the
/// caller does that under the same store lock before calling in.
pub fn create_booking<C, B>(
    catalog: &C,
    bookings: &B,
    new: NewBooking,
    now: NaiveDateTime,
) -> Result<Booking, BookingError>
where
    C: CatalogStore + ?Sized,
    B: BookingStore + ?Sized,
{
    let service = catalog
        .find_service(new.service)?
        .ok_or(BookingError::ServiceNotFound {
            kind: new.service.kind,
            id: new.service.id,
        })?;

    let booking = bookings.insert_booking(&new, service.title(), now)?;

    tracing::info!(
        booking_id = booking.id,
        customer_id = booking.customer_id,
        service = %booking.service_type,
        service_id = booking.service_id,
        date = %booking.event_date,
        "booking created"
    );
    Ok(booking)
}

/// Marks a booking cancelled. Cancelling twice, or cancelling an unknown id,
/// changes nothing. Returns the booking as it now stands.
pub fn cancel_booking<B>(
    bookings: &B,
    booking_id: i64,
    now: NaiveDateTime,
) -> anyhow::Result<Option<Booking>>
where
    B: BookingStore + ?Sized,
{
    let Some(mut booking) = bookings.booking(booking_id)? else {
        tracing::info!(booking_id, "cancel requested for unknown booking, ignoring");
        return Ok(None);
    };

    if booking.is_cancelled() {
        return Ok(Some(booking));
    }

    booking.status = BookingStatus::Cancelled;
    booking.updated_at = now;
    bookings.update_booking(&booking)?;

    tracing::info!(booking_id, "booking cancelled");
    Ok(Some(booking))
}

/// Moves a booking and marks it confirmed. The reschedule window is not
/// checked here; see [`is_reschedulable`].
pub fn reschedule_booking<B>(
    bookings: &B,
    booking_id: i64,
    new_date: NaiveDate,
    new_time: Option<NaiveTime>,
    now: NaiveDateTime,
) -> anyhow::Result<Option<Booking>>
where
    B: BookingStore + ?Sized,
{
    let Some(mut booking) = bookings.booking(booking_id)? else {
        tracing::info!(booking_id, "reschedule requested for unknown booking, ignoring");
        return Ok(None);
    };

    let previous = booking.starts_at();
    booking.event_date = new_date;
    booking.event_time = new_time;
    booking.status = BookingStatus::Confirmed;
    booking.updated_at = now;
    bookings.update_booking(&booking)?;

    tracing::info!(
        booking_id,
        from = %previous,
        to = %booking.starts_at(),
        "booking rescheduled"
    );
    Ok(Some(booking))
}

/// Whether a booking may still be moved at `now`.
///
/// False when the booking is cancelled, its service is gone or disallows
/// rescheduling, the event has started, or it is `reschedule_hours` or fewer
/// away. Exactly at the cutoff the answer is false.
pub fn is_reschedulable(booking: &Booking, service: Option<&Service>, now: NaiveDateTime) -> bool {
    let Some(service) = service else {
        return false;
    };
    if booking.is_cancelled() {
        return false;
    }

    let policy = service.reschedule_policy();
    if !policy.allow_rescheduling {
        return false;
    }

    let event = booking.starts_at();
    if event < now {
        return false;
    }

    Duration::try_hours(policy.reschedule_hours).is_some_and(|window| event - now > window)
}

/// Works out the concrete date and time a booking request refers to.
///
/// Sessions always book their own date and time, so a session booking cannot
/// be moved (`exclude_booking` set). Classes need a date the
/// class meets on and use its start time. Appointments need a date and a slot
/// label that is still open; `exclude_booking` lets a booking being moved
/// ignore its own current slot.
pub fn resolve_booking_time(
    service: &Service,
    existing: &[Booking],
    requested_date: Option<NaiveDate>,
    requested_slot: Option<&str>,
    exclude_booking: Option<i64>,
) -> Result<(NaiveDate, Option<NaiveTime>), BookingError> {
    if !service.is_active() {
        return Err(BookingError::NotBookable {
            title: service.title().to_string(),
        });
    }

    match service {
        Service::Session(session) if exclude_booking.is_some() => Err(BookingError::FixedTime {
            title: session.title.clone(),
        }),
        Service::Session(session) => Ok((session.date, Some(session.time))),
        Service::Class(class) => {
            let date = requested_date.ok_or(BookingError::MissingSelection("date"))?;
            if !occurs_on(class, date) {
                return Err(BookingError::DateNotOffered {
                    title: class.title.clone(),
                    date,
                });
            }
            Ok((date, Some(class.schedule.start_time)))
        }
        Service::Appointment(appointment) => {
            let date = requested_date.ok_or(BookingError::MissingSelection("date"))?;
            let slot = requested_slot.ok_or(BookingError::MissingSelection("slot"))?;
            let time = parse_time_label(slot)
                .or_else(|| crate::models::hhmm::parse(slot))
                .ok_or(BookingError::MissingSelection("slot"))?;

            let label = time_label(time);
            let open = available_slots_excluding(
                appointment,
                existing,
                date,
                exclude_booking.unwrap_or(-1),
            );
            if !open.contains(&label) {
                return Err(BookingError::SlotUnavailable { date, slot: label });
            }
            Ok((date, Some(time)))
        }
    }
}

/// A customer's bookings split around `today`: upcoming soonest first, past
/// most recent first.
pub fn customer_bookings<B>(
    bookings: &B,
    customer_id: i64,
    today: NaiveDate,
) -> anyhow::Result<(Vec<Booking>, Vec<Booking>)>
where
    B: BookingStore + ?Sized,
{
    let mut all = bookings.bookings_for_customer(customer_id)?;
    all.sort_by_key(|b| (b.starts_at(), b.id));

    let (upcoming, mut past): (Vec<Booking>, Vec<Booking>) =
        all.into_iter().partition(|b| b.event_date >= today);
    past.reverse();
    Ok((upcoming, past))
}
