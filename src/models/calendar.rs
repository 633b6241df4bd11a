use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::BookingStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Session,
    Class,
    Booking,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub kind: EventKind,
    pub title: String,
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub service_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_status: Option<BookingStatus>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventFilters {
    pub include_sessions: bool,
    pub include_classes: bool,
    pub include_appointment_bookings: bool,
}

impl Default for EventFilters {
    fn default() -> Self {
        Self {
            include_sessions: true,
            include_classes: true,
            include_appointment_bookings: true,
        }
    }
}
