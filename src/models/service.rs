use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::availability::DayAvailability;
use super::hhmm;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    #[default]
    Active,
    Paused,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Active => "active",
            ServiceStatus::Paused => "paused",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "paused" => ServiceStatus::Paused,
            _ => ServiceStatus::Active,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ServiceStatus::Active => ServiceStatus::Paused,
            ServiceStatus::Paused => ServiceStatus::Active,
        }
    }
}

/// Discriminant shared by catalog items and the bookings that reference them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Session,
    Class,
    Appointment,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Session => "session",
            ServiceKind::Class => "class",
            ServiceKind::Appointment => "appointment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "session" | "sessions" => Some(ServiceKind::Session),
            "class" | "classes" => Some(ServiceKind::Class),
            "appointment" | "appointments" | "appointment-types" => Some(ServiceKind::Appointment),
            _ => None,
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SessionType {
    #[default]
    #[serde(rename = "1-on-1")]
    OneOnOne,
    #[serde(rename = "Group")]
    Group,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::OneOnOne => "1-on-1",
            SessionType::Group => "Group",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Group" | "group" => SessionType::Group,
            _ => SessionType::OneOnOne,
        }
    }
}

/// A single, fixed-time occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub status: ServiceStatus,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub duration: i64,
    #[serde(default)]
    pub session_type: SessionType,
    #[serde(default = "default_max_entries")]
    pub max_entries: i64,
    #[serde(default)]
    pub allow_rescheduling: bool,
    #[serde(default = "default_reschedule_hours")]
    pub reschedule_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSchedule {
    /// Weekday names ("Mon".."Sun"), matched case-insensitively.
    pub days: Vec<String>,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// A weekly-recurring group class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub status: ServiceStatus,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: String,
    pub duration: i64,
    #[serde(default = "default_max_entries")]
    pub max_entries: i64,
    pub schedule: ClassSchedule,
    #[serde(default)]
    pub allow_rescheduling: bool,
    #[serde(default = "default_reschedule_hours")]
    pub reschedule_hours: i64,
}

/// A template-driven appointment: slots come from the weekly availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentType {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub status: ServiceStatus,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: String,
    pub duration: i64,
    #[serde(default = "default_date_range_days")]
    pub date_range_days: i64,
    #[serde(default)]
    pub weekly_availability: Vec<DayAvailability>,
    #[serde(default)]
    pub allow_rescheduling: bool,
    #[serde(default = "default_reschedule_hours")]
    pub reschedule_hours: i64,
}

fn default_max_entries() -> i64 {
    1
}

fn default_reschedule_hours() -> i64 {
    24
}

fn default_date_range_days() -> i64 {
    60
}

/// Any sellable catalog item, tagged by kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Service {
    Session(Session),
    Class(Class),
    Appointment(AppointmentType),
}

/// Reschedule settings shared by every service kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReschedulePolicy {
    pub allow_rescheduling: bool,
    pub reschedule_hours: i64,
}

impl Service {
    pub fn kind(&self) -> ServiceKind {
        match self {
            Service::Session(_) => ServiceKind::Session,
            Service::Class(_) => ServiceKind::Class,
            Service::Appointment(_) => ServiceKind::Appointment,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Service::Session(s) => s.id,
            Service::Class(c) => c.id,
            Service::Appointment(a) => a.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Service::Session(s) => &s.title,
            Service::Class(c) => &c.title,
            Service::Appointment(a) => &a.title,
        }
    }

    pub fn status(&self) -> ServiceStatus {
        match self {
            Service::Session(s) => s.status,
            Service::Class(c) => c.status,
            Service::Appointment(a) => a.status,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status() == ServiceStatus::Active
    }

    pub fn duration_minutes(&self) -> i64 {
        match self {
            Service::Session(s) => s.duration,
            Service::Class(c) => c.duration,
            Service::Appointment(a) => a.duration,
        }
    }

    pub fn reschedule_policy(&self) -> ReschedulePolicy {
        let (allow_rescheduling, reschedule_hours) = match self {
            Service::Session(s) => (s.allow_rescheduling, s.reschedule_hours),
            Service::Class(c) => (c.allow_rescheduling, c.reschedule_hours),
            Service::Appointment(a) => (a.allow_rescheduling, a.reschedule_hours),
        };
        ReschedulePolicy {
            allow_rescheduling,
            reschedule_hours,
        }
    }
}
