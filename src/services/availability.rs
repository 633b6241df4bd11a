use chrono::{Duration, NaiveDate, NaiveTime, Timelike};

use crate::models::availability::day_entry;
use crate::models::{AppointmentType, Booking, ServiceKind};

/// 12-hour label used for slots on the wire, e.g. "9:00 AM", "12:30 PM".
pub fn time_label(time: NaiveTime) -> String {
    let (pm, hour) = time.hour12();
    format!(
        "{hour}:{:02} {}",
        time.minute(),
        if pm { "PM" } else { "AM" }
    )
}

/// Inverse of [`time_label`]. Accepts either case for the AM/PM marker.
pub fn parse_time_label(label: &str) -> Option<NaiveTime> {
    let (clock, period) = label.trim().split_once(' ')?;
    let (hours, minutes) = clock.split_once(':')?;
    let mut hour: u32 = hours.parse().ok()?;
    let minute: u32 = minutes.parse().ok()?;
    if !(1..=12).contains(&hour) || minutes.len() != 2 {
        return None;
    }

    match period.trim().to_ascii_uppercase().as_str() {
        "AM" if hour == 12 => hour = 0,
        "AM" => {}
        "PM" if hour < 12 => hour += 12,
        "PM" => {}
        _ => return None,
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Open slot labels for one appointment type on `target_date`.
///
/// Candidates are taken from the weekday's availability windows in order,
/// stepping by the appointment duration while the whole appointment still fits.
/// A candidate is dropped when a non-cancelled booking of this appointment type
/// on the same date carries the same label. Overlapping windows yield repeated
/// labels; they are not collapsed.
pub fn available_slots(
    appointment: &AppointmentType,
    existing: &[Booking],
    target_date: NaiveDate,
) -> Vec<String> {
    let Some(day) = day_entry(&appointment.weekly_availability, target_date) else {
        return vec![];
    };
    if !day.enabled {
        return vec![];
    }
    if appointment.duration <= 0 {
        tracing::warn!(
            appointment_id = appointment.id,
            duration = appointment.duration,
            "appointment type has no positive duration, offering no slots"
        );
        return vec![];
    }

    let taken: Vec<String> = existing
        .iter()
        .filter(|b| {
            b.service_type == ServiceKind::Appointment
                && b.service_id == appointment.id
                && b.event_date == target_date
                && !b.is_cancelled()
        })
        .filter_map(|b| b.event_time.map(time_label))
        .collect();

    let mut slots = vec![];
    for window in &day.slots {
        let Some((from, to)) = window.minutes() else {
            tracing::warn!(
                appointment_id = appointment.id,
                from = %window.from,
                to = %window.to,
                "skipping malformed availability window"
            );
            continue;
        };

        let mut start = from;
        while start
            .checked_add(appointment.duration)
            .is_some_and(|end| end <= to)
        {
            let label = time_label(NaiveTime::MIN + Duration::minutes(start));
            if !taken.contains(&label) {
                slots.push(label);
            }
            start += appointment.duration;
        }
    }
    slots
}

/// Slots for moving `booking_id` elsewhere: the booking being moved does not
/// block its own current slot.
pub fn available_slots_excluding(
    appointment: &AppointmentType,
    existing: &[Booking],
    target_date: NaiveDate,
    booking_id: i64,
) -> Vec<String> {
    let others: Vec<Booking> = existing
        .iter()
        .filter(|b| b.id != booking_id)
        .cloned()
        .collect();
    available_slots(appointment, &others, target_date)
}

/// Dates in `[today, today + date_range_days)` that still have an open slot.
/// `existing` should cover that whole window.
pub fn bookable_dates(
    appointment: &AppointmentType,
    existing: &[Booking],
    today: NaiveDate,
) -> Vec<NaiveDate> {
    let horizon = usize::try_from(appointment.date_range_days).unwrap_or(0);
    today
        .iter_days()
        .take(horizon)
        .filter(|day| !available_slots(appointment, existing, *day).is_empty())
        .collect()
}
