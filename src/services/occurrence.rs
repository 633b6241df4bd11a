use chrono::{Months, NaiveDate};

use crate::models::availability::{same_day, weekday_name};
use crate::models::Class;

/// How far an open-ended class recurs past its start date.
pub const OPEN_ENDED_HORIZON: Months = Months::new(3);

/// Last day (inclusive) a class can occur on.
pub fn last_occurrence_day(class: &Class) -> Option<NaiveDate> {
    let start = class.schedule.start_date?;
    match class.schedule.end_date {
        Some(end) => Some(end),
        None => start.checked_add_months(OPEN_ENDED_HORIZON),
    }
}

/// Every date the class meets on, ascending, optionally clipped to
/// `[range_start, range_end]`. A class with no days or no start date has no
/// occurrences.
pub fn occurrences(
    class: &Class,
    range_start: Option<NaiveDate>,
    range_end: Option<NaiveDate>,
) -> Vec<NaiveDate> {
    let schedule = &class.schedule;
    let (Some(start), Some(last)) = (schedule.start_date, last_occurrence_day(class)) else {
        return vec![];
    };
    if schedule.days.is_empty() {
        return vec![];
    }

    let from = range_start.map_or(start, |r| r.max(start));
    let to = range_end.map_or(last, |r| r.min(last));

    from.iter_days()
        .take_while(|day| *day <= to)
        .filter(|day| {
            let name = weekday_name(*day);
            schedule.days.iter().any(|d| same_day(d, &name))
        })
        .collect()
}

pub fn occurs_on(class: &Class, date: NaiveDate) -> bool {
    !occurrences(class, Some(date), Some(date)).is_empty()
}
