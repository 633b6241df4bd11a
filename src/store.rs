//! Storage seams for the engine. The services never talk to SQL directly;
//! they read the catalog and read/write bookings through these traits.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;

use crate::db::queries;
use crate::models::{
    AppointmentType, Booking, Class, NewBooking, Service, ServiceKind, ServiceRef, Session,
};

/// Read access to sellable service definitions.
pub trait CatalogStore {
    fn sessions(&self) -> anyhow::Result<Vec<Session>>;
    fn classes(&self) -> anyhow::Result<Vec<Class>>;
    fn appointment_types(&self) -> anyhow::Result<Vec<AppointmentType>>;
    fn find_service(&self, service: ServiceRef) -> anyhow::Result<Option<Service>>;
}

/// Booking records. Reads return bookings of every status; callers decide
/// which statuses matter to them.
pub trait BookingStore {
    fn booking(&self, id: i64) -> anyhow::Result<Option<Booking>>;
    fn bookings_for_service_on(
        &self,
        service: ServiceRef,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<Booking>>;
    fn bookings_for_customer(&self, customer_id: i64) -> anyhow::Result<Vec<Booking>>;
    fn bookings_between(&self, start: NaiveDate, end: NaiveDate) -> anyhow::Result<Vec<Booking>>;
    /// Persists a new confirmed booking and returns it with its assigned id.
    fn insert_booking(
        &self,
        new: &NewBooking,
        service_title: &str,
        now: NaiveDateTime,
    ) -> anyhow::Result<Booking>;
    /// Writes date, time and status back. Returns false if the id is unknown.
    fn update_booking(&self, booking: &Booking) -> anyhow::Result<bool>;
}

impl CatalogStore for Connection {
    fn sessions(&self) -> anyhow::Result<Vec<Session>> {
        queries::list_sessions(self)
    }

    fn classes(&self) -> anyhow::Result<Vec<Class>> {
        queries::list_classes(self)
    }

    fn appointment_types(&self) -> anyhow::Result<Vec<AppointmentType>> {
        queries::list_appointment_types(self)
    }

    fn find_service(&self, service: ServiceRef) -> anyhow::Result<Option<Service>> {
        Ok(match service.kind {
            ServiceKind::Session => queries::get_session(self, service.id)?.map(Service::Session),
            ServiceKind::Class => queries::get_class(self, service.id)?.map(Service::Class),
            ServiceKind::Appointment => {
                queries::get_appointment_type(self, service.id)?.map(Service::Appointment)
            }
        })
    }
}

impl BookingStore for Connection {
    fn booking(&self, id: i64) -> anyhow::Result<Option<Booking>> {
        queries::get_booking_by_id(self, id)
    }

    fn bookings_for_service_on(
        &self,
        service: ServiceRef,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<Booking>> {
        queries::get_bookings_for_service_on(self, service, date)
    }

    fn bookings_for_customer(&self, customer_id: i64) -> anyhow::Result<Vec<Booking>> {
        queries::get_bookings_for_customer(self, customer_id)
    }

    fn bookings_between(&self, start: NaiveDate, end: NaiveDate) -> anyhow::Result<Vec<Booking>> {
        queries::get_bookings_in_range(self, start, end)
    }

    fn insert_booking(
        &self,
        new: &NewBooking,
        service_title: &str,
        now: NaiveDateTime,
    ) -> anyhow::Result<Booking> {
        queries::create_booking(self, new, service_title, now)
    }

    fn update_booking(&self, booking: &Booking) -> anyhow::Result<bool> {
        queries::update_booking(self, booking)
    }
}
