use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DAY_ORDER: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// One bookable window within a day, `from`/`to` as `HH:MM`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityWindow {
    pub from: String,
    pub to: String,
}

impl AvailabilityWindow {
    /// Window bounds in minutes after midnight, `None` when either bound is malformed.
    pub fn minutes(&self) -> Option<(i64, i64)> {
        Some((minutes_of_day(&self.from)?, minutes_of_day(&self.to)?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayAvailability {
    pub day: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub slots: Vec<AvailabilityWindow>,
}

/// Short weekday name of a UTC calendar day, e.g. "Mon".
pub fn weekday_name(date: NaiveDate) -> String {
    date.weekday().to_string()
}

pub fn same_day(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// The template entry for the weekday `date` falls on.
pub fn day_entry(weekly: &[DayAvailability], date: NaiveDate) -> Option<&DayAvailability> {
    let name = weekday_name(date);
    weekly.iter().find(|d| same_day(&d.day, &name))
}

/// Rejects unknown day names, malformed times and empty or inverted windows.
pub fn validate_weekly(weekly: &[DayAvailability]) -> anyhow::Result<()> {
    for entry in weekly {
        parse_weekday(&entry.day)?;
        for slot in &entry.slots {
            let from = parse_time(&slot.from)?;
            let to = parse_time(&slot.to)?;
            if from >= to {
                return Err(anyhow::anyhow!(
                    "window must end after it starts: {}-{}",
                    slot.from,
                    slot.to
                ));
            }
        }
    }
    Ok(())
}

pub fn validate_days(days: &[String]) -> anyhow::Result<()> {
    for day in days {
        parse_weekday(day)?;
    }
    Ok(())
}

pub fn to_human_readable(weekly: &[DayAvailability]) -> String {
    let mut enabled: Vec<&DayAvailability> = weekly
        .iter()
        .filter(|d| d.enabled && !d.slots.is_empty())
        .collect();

    enabled.sort_by_key(|d| {
        DAY_ORDER
            .iter()
            .position(|name| *name == d.day.to_lowercase())
            .unwrap_or(DAY_ORDER.len())
    });

    enabled
        .iter()
        .map(|d| {
            let windows = d
                .slots
                .iter()
                .map(|s| format!("{}-{}", s.from, s.to))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}: {windows}", capitalize(&d.day))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn minutes_of_day(s: &str) -> Option<i64> {
    parse_time(s).ok()
}

fn capitalize(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().to_string() + &c.as_str().to_lowercase(),
    }
}

fn parse_weekday(s: &str) -> anyhow::Result<()> {
    if DAY_ORDER.contains(&s.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(anyhow::anyhow!("invalid weekday: {s}"))
    }
}

/// Parses `HH:MM` into minutes after midnight.
fn parse_time(s: &str) -> anyhow::Result<i64> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 || parts[1].len() != 2 {
        return Err(anyhow::anyhow!("invalid time format: {s}"));
    }
    let hour: u32 = parts[0]
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid hour in: {s}"))?;
    let minute: u32 = parts[1]
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid minute in: {s}"))?;
    if hour > 23 || minute > 59 {
        return Err(anyhow::anyhow!("time out of range: {s}"));
    }
    Ok(i64::from(hour) * 60 + i64::from(minute))
}
