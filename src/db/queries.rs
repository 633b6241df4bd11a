use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{
    AppointmentType, Booking, BookingStatus, Class, ClassSchedule, NewBooking, ServiceKind,
    ServiceRef, ServiceStatus, Session, SessionType,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn fmt_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn fmt_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).with_context(|| format!("invalid stored date: {s}"))
}

fn parse_time(s: &str) -> anyhow::Result<NaiveTime> {
    crate::models::hhmm::parse(s).with_context(|| format!("invalid stored time: {s}"))
}

fn parse_timestamp(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .with_context(|| format!("invalid stored timestamp: {s}"))
}

fn collect<T>(
    rows: impl Iterator<Item = rusqlite::Result<anyhow::Result<T>>>,
) -> anyhow::Result<Vec<T>> {
    let mut items = vec![];
    for row in rows {
        items.push(row??);
    }
    Ok(items)
}

fn table_for(kind: ServiceKind) -> &'static str {
    match kind {
        ServiceKind::Session => "sessions",
        ServiceKind::Class => "classes",
        ServiceKind::Appointment => "appointment_types",
    }
}

// ── Catalog: shared ──

pub fn set_service_status(
    conn: &Connection,
    kind: ServiceKind,
    id: i64,
    status: ServiceStatus,
) -> anyhow::Result<bool> {
    let sql = format!("UPDATE {} SET status = ?1 WHERE id = ?2", table_for(kind));
    let count = conn.execute(&sql, params![status.as_str(), id])?;
    Ok(count > 0)
}

pub fn delete_service(conn: &Connection, kind: ServiceKind, id: i64) -> anyhow::Result<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", table_for(kind));
    let count = conn.execute(&sql, params![id])?;
    Ok(count > 0)
}

// ── Sessions ──

const SESSION_COLUMNS: &str = "id, status, title, description, price, date, time, duration_minutes, \
     session_type, max_entries, allow_rescheduling, reschedule_hours";

pub fn insert_session(conn: &Connection, session: &Session) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO sessions (status, title, description, price, date, time, duration_minutes,
                               session_type, max_entries, allow_rescheduling, reschedule_hours)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            session.status.as_str(),
            session.title,
            session.description,
            session.price,
            fmt_date(session.date),
            fmt_time(session.time),
            session.duration,
            session.session_type.as_str(),
            session.max_entries,
            session.allow_rescheduling,
            session.reschedule_hours,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_session(conn: &Connection, session: &Session) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE sessions SET status = ?1, title = ?2, description = ?3, price = ?4, date = ?5,
                time = ?6, duration_minutes = ?7, session_type = ?8, max_entries = ?9,
                allow_rescheduling = ?10, reschedule_hours = ?11
         WHERE id = ?12",
        params![
            session.status.as_str(),
            session.title,
            session.description,
            session.price,
            fmt_date(session.date),
            fmt_time(session.time),
            session.duration,
            session.session_type.as_str(),
            session.max_entries,
            session.allow_rescheduling,
            session.reschedule_hours,
            session.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn list_sessions(conn: &Connection) -> anyhow::Result<Vec<Session>> {
    let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions ORDER BY date ASC, time ASC, id ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| Ok(parse_session_row(row)))?;
    collect(rows)
}

pub fn get_session(conn: &Connection, id: i64) -> anyhow::Result<Option<Session>> {
    let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1");
    let result = conn
        .query_row(&sql, params![id], |row| Ok(parse_session_row(row)))
        .optional()?;
    result.transpose()
}

fn parse_session_row(row: &rusqlite::Row) -> anyhow::Result<Session> {
    let status: String = row.get(1)?;
    let date: String = row.get(5)?;
    let time: String = row.get(6)?;
    let session_type: String = row.get(8)?;

    Ok(Session {
        id: row.get(0)?,
        status: ServiceStatus::parse(&status),
        title: row.get(2)?,
        description: row.get(3)?,
        price: row.get(4)?,
        date: parse_date(&date)?,
        time: parse_time(&time)?,
        duration: row.get(7)?,
        session_type: SessionType::parse(&session_type),
        max_entries: row.get(9)?,
        allow_rescheduling: row.get(10)?,
        reschedule_hours: row.get(11)?,
    })
}

// ── Classes ──

const CLASS_COLUMNS: &str = "id, status, title, description, price, duration_minutes, max_entries, \
     days, start_time, start_date, end_date, allow_rescheduling, reschedule_hours";

pub fn insert_class(conn: &Connection, class: &Class) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO classes (status, title, description, price, duration_minutes, max_entries,
                              days, start_time, start_date, end_date, allow_rescheduling, reschedule_hours)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            class.status.as_str(),
            class.title,
            class.description,
            class.price,
            class.duration,
            class.max_entries,
            class.schedule.days.join(","),
            fmt_time(class.schedule.start_time),
            class.schedule.start_date.map(fmt_date),
            class.schedule.end_date.map(fmt_date),
            class.allow_rescheduling,
            class.reschedule_hours,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_class(conn: &Connection, class: &Class) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE classes SET status = ?1, title = ?2, description = ?3, price = ?4,
                duration_minutes = ?5, max_entries = ?6, days = ?7, start_time = ?8,
                start_date = ?9, end_date = ?10, allow_rescheduling = ?11, reschedule_hours = ?12
         WHERE id = ?13",
        params![
            class.status.as_str(),
            class.title,
            class.description,
            class.price,
            class.duration,
            class.max_entries,
            class.schedule.days.join(","),
            fmt_time(class.schedule.start_time),
            class.schedule.start_date.map(fmt_date),
            class.schedule.end_date.map(fmt_date),
            class.allow_rescheduling,
            class.reschedule_hours,
            class.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn list_classes(conn: &Connection) -> anyhow::Result<Vec<Class>> {
    let sql = format!("SELECT {CLASS_COLUMNS} FROM classes ORDER BY id ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| Ok(parse_class_row(row)))?;
    collect(rows)
}

pub fn get_class(conn: &Connection, id: i64) -> anyhow::Result<Option<Class>> {
    let sql = format!("SELECT {CLASS_COLUMNS} FROM classes WHERE id = ?1");
    let result = conn
        .query_row(&sql, params![id], |row| Ok(parse_class_row(row)))
        .optional()?;
    result.transpose()
}

fn parse_class_row(row: &rusqlite::Row) -> anyhow::Result<Class> {
    let status: String = row.get(1)?;
    let days: String = row.get(7)?;
    let start_time: String = row.get(8)?;
    let start_date: Option<String> = row.get(9)?;
    let end_date: Option<String> = row.get(10)?;

    Ok(Class {
        id: row.get(0)?,
        status: ServiceStatus::parse(&status),
        title: row.get(2)?,
        description: row.get(3)?,
        price: row.get(4)?,
        duration: row.get(5)?,
        max_entries: row.get(6)?,
        schedule: ClassSchedule {
            days: days
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from)
                .collect(),
            start_time: parse_time(&start_time)?,
            start_date: start_date.as_deref().map(parse_date).transpose()?,
            end_date: end_date.as_deref().map(parse_date).transpose()?,
        },
        allow_rescheduling: row.get(11)?,
        reschedule_hours: row.get(12)?,
    })
}

// ── Appointment Types ──

const APPOINTMENT_COLUMNS: &str = "id, status, title, description, price, duration_minutes, \
     date_range_days, weekly_availability, allow_rescheduling, reschedule_hours";

pub fn insert_appointment_type(conn: &Connection, appt: &AppointmentType) -> anyhow::Result<i64> {
    let weekly = serde_json::to_string(&appt.weekly_availability)?;
    conn.execute(
        "INSERT INTO appointment_types (status, title, description, price, duration_minutes,
                                        date_range_days, weekly_availability, allow_rescheduling,
                                        reschedule_hours)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            appt.status.as_str(),
            appt.title,
            appt.description,
            appt.price,
            appt.duration,
            appt.date_range_days,
            weekly,
            appt.allow_rescheduling,
            appt.reschedule_hours,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_appointment_type(conn: &Connection, appt: &AppointmentType) -> anyhow::Result<bool> {
    let weekly = serde_json::to_string(&appt.weekly_availability)?;
    let count = conn.execute(
        "UPDATE appointment_types SET status = ?1, title = ?2, description = ?3, price = ?4,
                duration_minutes = ?5, date_range_days = ?6, weekly_availability = ?7,
                allow_rescheduling = ?8, reschedule_hours = ?9
         WHERE id = ?10",
        params![
            appt.status.as_str(),
            appt.title,
            appt.description,
            appt.price,
            appt.duration,
            appt.date_range_days,
            weekly,
            appt.allow_rescheduling,
            appt.reschedule_hours,
            appt.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn list_appointment_types(conn: &Connection) -> anyhow::Result<Vec<AppointmentType>> {
    let sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointment_types ORDER BY id ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| Ok(parse_appointment_row(row)))?;
    collect(rows)
}

pub fn get_appointment_type(conn: &Connection, id: i64) -> anyhow::Result<Option<AppointmentType>> {
    let sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointment_types WHERE id = ?1");
    let result = conn
        .query_row(&sql, params![id], |row| Ok(parse_appointment_row(row)))
        .optional()?;
    result.transpose()
}

fn parse_appointment_row(row: &rusqlite::Row) -> anyhow::Result<AppointmentType> {
    let status: String = row.get(1)?;
    let weekly_json: String = row.get(7)?;
    let weekly_availability = serde_json::from_str(&weekly_json)
        .context("invalid stored weekly availability")?;

    Ok(AppointmentType {
        id: row.get(0)?,
        status: ServiceStatus::parse(&status),
        title: row.get(2)?,
        description: row.get(3)?,
        price: row.get(4)?,
        duration: row.get(5)?,
        date_range_days: row.get(6)?,
        weekly_availability,
        allow_rescheduling: row.get(8)?,
        reschedule_hours: row.get(9)?,
    })
}

// ── Bookings ──

const BOOKING_COLUMNS: &str = "id, customer_id, service_id, service_type, service_title, event_date, \
     event_time, status, created_at, updated_at";

/// Inserts a confirmed booking. Ids come from an AUTOINCREMENT key, so they
/// only ever grow and are never reused after deletes.
pub fn create_booking(
    conn: &Connection,
    new: &NewBooking,
    service_title: &str,
    now: NaiveDateTime,
) -> anyhow::Result<Booking> {
    let ts = now.format(TIMESTAMP_FORMAT).to_string();
    conn.execute(
        "INSERT INTO bookings (customer_id, service_id, service_type, service_title, event_date,
                               event_time, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            new.customer_id,
            new.service.id,
            new.service.kind.as_str(),
            service_title,
            fmt_date(new.event_date),
            new.event_time.map(fmt_time),
            BookingStatus::Confirmed.as_str(),
            ts,
        ],
    )?;

    let id = conn.last_insert_rowid();
    get_booking_by_id(conn, id)?.with_context(|| format!("booking {id} missing after insert"))
}

pub fn update_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET event_date = ?1, event_time = ?2, status = ?3, updated_at = ?4
         WHERE id = ?5",
        params![
            fmt_date(booking.event_date),
            booking.event_time.map(fmt_time),
            booking.status.as_str(),
            booking.updated_at.format(TIMESTAMP_FORMAT).to_string(),
            booking.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn get_booking_by_id(conn: &Connection, id: i64) -> anyhow::Result<Option<Booking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1");
    let result = conn
        .query_row(&sql, params![id], |row| Ok(parse_booking_row(row)))
        .optional()?;
    result.transpose()
}

pub fn get_bookings_for_customer(conn: &Connection, customer_id: i64) -> anyhow::Result<Vec<Booking>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE customer_id = ?1
         ORDER BY event_date ASC, event_time ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![customer_id], |row| Ok(parse_booking_row(row)))?;
    collect(rows)
}

pub fn get_bookings_for_service_on(
    conn: &Connection,
    service: ServiceRef,
    date: NaiveDate,
) -> anyhow::Result<Vec<Booking>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE service_type = ?1 AND service_id = ?2 AND event_date = ?3
         ORDER BY event_time ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![service.kind.as_str(), service.id, fmt_date(date)],
        |row| Ok(parse_booking_row(row)),
    )?;
    collect(rows)
}

/// Bookings of any status whose event date lies in `[start, end]`.
pub fn get_bookings_in_range(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> anyhow::Result<Vec<Booking>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE event_date >= ?1 AND event_date <= ?2
         ORDER BY event_date ASC, event_time ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![fmt_date(start), fmt_date(end)], |row| {
        Ok(parse_booking_row(row))
    })?;
    collect(rows)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let service_type: String = row.get(3)?;
    let event_date: String = row.get(5)?;
    let event_time: Option<String> = row.get(6)?;
    let status: String = row.get(7)?;
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;

    Ok(Booking {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        service_id: row.get(2)?,
        service_type: ServiceKind::parse(&service_type)
            .with_context(|| format!("invalid stored service type: {service_type}"))?,
        service_title: row.get(4)?,
        event_date: parse_date(&event_date)?,
        event_time: event_time.as_deref().map(parse_time).transpose()?,
        status: BookingStatus::parse(&status),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
