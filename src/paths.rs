//! Builders for every path of the remote store schema.
//!
//! The layout is deliberately split between flat object trees (`tasks/`,
//! `events/`) and per-user pointer trees, so that a client can load one
//! calendar date without pulling every record under the user node.
//!
//! ```text
//! users/{uid}/userinfo
//! users/{uid}/tasks/incomplete/{taskID}                      -> { taskID }
//! users/{uid}/tasks/completed/{year}/{month}/{day}/{taskID}  -> { taskID }
//! users/{uid}/events/{year}/{month}/{day}/{eventID}          -> { eventID }
//! tasks/{taskID}                                             -> full task record
//! events/{eventID}                                           -> full event record
//! ```
//!
//! Months are zero-based (`0` = January) on both the write and the read path.

use chrono::{DateTime, Datelike, Utc};

/// Root of the flat event record tree
pub const EVENTS_ROOT: &str = "events";

pub fn task(task_id: &str) -> String {
    format!("tasks/{}", task_id)
}

pub fn event(event_id: &str) -> String {
    format!("{}/{}", EVENTS_ROOT, event_id)
}

pub fn userinfo(user_id: &str) -> String {
    format!("users/{}/userinfo", user_id)
}

pub fn incomplete_index(user_id: &str) -> String {
    format!("users/{}/tasks/incomplete", user_id)
}

pub fn incomplete_task(user_id: &str, task_id: &str) -> String {
    format!("{}/{}", incomplete_index(user_id), task_id)
}

pub fn completed_month(user_id: &str, year: i32, month0: u32) -> String {
    format!("users/{}/tasks/completed/{}/{}", user_id, year, month0)
}

pub fn completed_task(user_id: &str, date: &DateTime<Utc>, task_id: &str) -> String {
    format!(
        "{}/{}/{}",
        completed_month(user_id, date.year(), date.month0()),
        date.day(),
        task_id
    )
}

pub fn event_day(user_id: &str, date: &DateTime<Utc>) -> String {
    format!(
        "users/{}/events/{}/{}/{}",
        user_id,
        date.year(),
        date.month0(),
        date.day()
    )
}

pub fn event_index(user_id: &str, date: &DateTime<Utc>, event_id: &str) -> String {
    format!("{}/{}", event_day(user_id, date), event_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn months_are_zero_based() {
        let date = Utc.with_ymd_and_hms(2023, 2, 9, 12, 0, 0).single().unwrap();
        assert_eq!(completed_task("u1", &date, "t1"), "users/u1/tasks/completed/2023/1/9/t1");
        assert_eq!(event_day("u1", &date), "users/u1/events/2023/1/9");
        assert_eq!(event_index("u1", &date, "e1"), "users/u1/events/2023/1/9/e1");
    }

    #[test]
    fn record_paths() {
        assert_eq!(task("abc"), "tasks/abc");
        assert_eq!(event("abc"), "events/abc");
        assert_eq!(incomplete_task("u1", "abc"), "users/u1/tasks/incomplete/abc");
        assert_eq!(userinfo("u1"), "users/u1/userinfo");
    }
}
