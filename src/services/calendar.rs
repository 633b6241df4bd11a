use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::models::{
    Booking, CalendarEvent, EventFilters, EventKind, Service, ServiceRef,
};
use crate::services::occurrence::occurrences;
use crate::store::{BookingStore, CatalogStore};

/// Duration used for bookings whose catalog item no longer exists.
pub const FALLBACK_DURATION_MINUTES: i64 = 60;

/// Sessions, class occurrences and bookings in `[range_start, range_end]`,
/// ordered by day and then by start time.
///
/// With `show_only_booked` the feed drops sessions and classes but still lists
/// bookings. Cancelled bookings are included and carry their status.
pub fn events<C, B>(
    catalog: &C,
    bookings: &B,
    range_start: NaiveDate,
    range_end: NaiveDate,
    filters: EventFilters,
    show_only_booked: bool,
) -> anyhow::Result<Vec<CalendarEvent>>
where
    C: CatalogStore + ?Sized,
    B: BookingStore + ?Sized,
{
    if range_end < range_start {
        return Ok(vec![]);
    }

    let mut feed = vec![];

    if !show_only_booked {
        if filters.include_sessions {
            for session in catalog.sessions()? {
                if session.date < range_start || session.date > range_end {
                    continue;
                }
                let start = session.date.and_time(session.time);
                feed.push(CalendarEvent {
                    id: format!("s-{}", session.id),
                    kind: EventKind::Session,
                    title: session.title,
                    date: session.date,
                    start,
                    end: event_end(start, session.duration),
                    service_id: session.id,
                    customer_id: None,
                    booking_status: None,
                });
            }
        }

        if filters.include_classes {
            for class in catalog.classes()? {
                for day in occurrences(&class, Some(range_start), Some(range_end)) {
                    let start = day.and_time(class.schedule.start_time);
                    feed.push(CalendarEvent {
                        id: format!("c-{}-{}", class.id, day.format("%Y-%m-%d")),
                        kind: EventKind::Class,
                        title: class.title.clone(),
                        date: day,
                        start,
                        end: event_end(start, class.duration),
                        service_id: class.id,
                        customer_id: None,
                        booking_status: None,
                    });
                }
            }
        }
    }

    if filters.include_appointment_bookings {
        let booked = bookings.bookings_between(range_start, range_end)?;
        let durations = booking_durations(catalog, &booked)?;

        for booking in booked {
            let duration = durations
                .get(&booking.service_ref())
                .copied()
                .unwrap_or(FALLBACK_DURATION_MINUTES);
            let start = booking.starts_at();
            feed.push(CalendarEvent {
                id: format!("b-{}", booking.id),
                kind: EventKind::Booking,
                title: booking.service_title,
                date: booking.event_date,
                start,
                end: event_end(start, duration),
                service_id: booking.service_id,
                customer_id: Some(booking.customer_id),
                booking_status: Some(booking.status),
            });
        }
    }

    feed.sort_by_key(|e| (e.date, e.start));
    Ok(feed)
}

/// `start` plus `minutes`. Durations that overflow the calendar fall back to
/// [`FALLBACK_DURATION_MINUTES`].
fn event_end(start: NaiveDateTime, minutes: i64) -> NaiveDateTime {
    let add = |m: i64| Duration::try_minutes(m).and_then(|d| start.checked_add_signed(d));
    add(minutes)
        .or_else(|| {
            tracing::warn!(%start, minutes, "event duration out of range, using fallback");
            add(FALLBACK_DURATION_MINUTES)
        })
        .unwrap_or(start)
}

/// Durations of the services the given bookings reference, one lookup per
/// distinct service. Services that no longer exist are absent.
fn booking_durations<C>(
    catalog: &C,
    bookings: &[Booking],
) -> anyhow::Result<HashMap<ServiceRef, i64>>
where
    C: CatalogStore + ?Sized,
{
    let mut durations = HashMap::new();
    let mut missing = vec![];
    for booking in bookings {
        let key = booking.service_ref();
        if durations.contains_key(&key) || missing.contains(&key) {
            continue;
        }
        match catalog.find_service(key)? {
            Some(service) => {
                durations.insert(key, service.duration_minutes());
            }
            None => {
                tracing::debug!(
                    booking_id = booking.id,
                    service = %key.kind,
                    service_id = key.id,
                    "booked service no longer in catalog, using fallback duration"
                );
                missing.push(key);
            }
        }
    }
    Ok(durations)
}

pub fn generate_ics(
    booking: &Booking,
    service: Option<&Service>,
    business_name: &str,
    stamp: NaiveDateTime,
) -> String {
    let duration = service
        .map(Service::duration_minutes)
        .unwrap_or(FALLBACK_DURATION_MINUTES);
    let start = booking.starts_at();
    let dtstart = start.format("%Y%m%dT%H%M%SZ").to_string();
    let dtend = event_end(start, duration)
        .format("%Y%m%dT%H%M%SZ")
        .to_string();
    let dtstamp = stamp.format("%Y%m%dT%H%M%SZ").to_string();
    let uid = format!("booking-{}@coachbook", booking.id);
    let status = if booking.is_cancelled() {
        "CANCELLED"
    } else {
        "CONFIRMED"
    };
    let summary = format!("{} with {business_name}", booking.service_title);

    format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Coachbook//Scheduling//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         STATUS:{status}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    )
}
