use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{option_hhmm, ServiceKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub customer_id: i64,
    pub service_id: i64,
    pub service_type: ServiceKind,
    /// Title of the service at the time of booking.
    pub service_title: String,
    pub event_date: NaiveDate,
    #[serde(default, with = "option_hhmm")]
    pub event_time: Option<NaiveTime>,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    pub fn service_ref(&self) -> ServiceRef {
        ServiceRef {
            kind: self.service_type,
            id: self.service_id,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }

    /// Start of the event in UTC; bookings without a time start at midnight.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.event_date
            .and_time(self.event_time.unwrap_or(NaiveTime::MIN))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Confirmed,
        }
    }
}

/// Typed reference from a booking to the catalog item it was made against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ServiceRef {
    pub kind: ServiceKind,
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub customer_id: i64,
    pub service: ServiceRef,
    pub event_date: NaiveDate,
    #[serde(default, with = "option_hhmm")]
    pub event_time: Option<NaiveTime>,
}
