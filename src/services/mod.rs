pub mod availability;
pub mod booking;
pub mod calendar;
pub mod occurrence;
