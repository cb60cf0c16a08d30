//! Some date utility functions shared by the task and event engines

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

/// Format of the `dateString` field cached in task records (e.g. `Feb 09 2023`).
/// It is written at save time so that later loads can display a date without re-deriving it.
pub const DATE_STRING_FORMAT: &str = "%b %d %Y";

/// The calendar date all "overdue" comparisons are made against
pub fn today() -> DateTime<Utc> {
    Utc::now()
}

/// Convert the epoch seconds stored in the remote schema back to a date.
/// Returns `None` for timestamps outside the representable range
pub fn from_epoch(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

/// Render the cached display string for a date
pub fn date_string(date: &DateTime<Utc>) -> String {
    date.format(DATE_STRING_FORMAT).to_string()
}

/// `true` when `date` falls in a calendar month strictly before the month of `reference`
pub fn is_before_month(date: &DateTime<Utc>, reference: &DateTime<Utc>) -> bool {
    (date.year(), date.month0()) < (reference.year(), reference.month0())
}

/// `true` when `date` falls on a calendar day strictly before the day of `reference`
pub fn is_before_day(date: &DateTime<Utc>, reference: &DateTime<Utc>) -> bool {
    date.date_naive() < reference.date_naive()
}

/// `true` when both dates fall in the same calendar month
pub fn same_month(left: &DateTime<Utc>, right: &DateTime<Utc>) -> bool {
    (left.year(), left.month0()) == (right.year(), right.month0())
}

/// The `(month, day)` bucket an incomplete task is *viewed* under.
///
/// Tasks due today or later bucket at their true month and day. Tasks due in the
/// past bucket under `today` instead (the overdue rollover): their stored due
/// date is untouched, only the view bucket moves.
pub fn view_bucket(date: &DateTime<Utc>, today: &DateTime<Utc>) -> (u32, u32) {
    let month = if is_before_month(date, today) { today.month0() } else { date.month0() };
    let day = if is_before_day(date, today) { today.day() } else { date.day() };
    (month, day)
}

/// The same calendar day-of-month, `months` months earlier.
/// Days past the end of the target month are clamped to its last day
pub fn months_back(date: &DateTime<Utc>, months: u32) -> DateTime<Utc> {
    let total = date.year() * 12 + date.month0() as i32 - months as i32;
    let year = total.div_euclid(12);
    let month0 = total.rem_euclid(12) as u32;
    let day = date.day().min(last_day_of_month(year, month0));
    match Utc.with_ymd_and_hms(year, month0 + 1, day, 12, 0, 0).single() {
        Some(d) => d,
        None => *date,
    }
}

fn last_day_of_month(year: i32, month0: u32) -> u32 {
    match month0 {
        0 | 2 | 4 | 6 | 7 | 9 | 11 => 31,
        3 | 5 | 8 | 10 => 30,
        _ => {
            if NaiveDate::from_ymd_opt(year, 2, 29).is_some() { 29 } else { 28 }
        }
    }
}
