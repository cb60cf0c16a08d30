//! To-do tasks and their remote record form

use std::error::Error;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::utils;

pub type TaskId = String;

/// The remote schema stores completion as a `comp` flag plus an optional
/// `compDate` timestamp, and a completed task missing its completion date is a
/// real (degraded) state: the completed-index entry for it can no longer be
/// located. This enum keeps that one degraded state representable while making
/// "incomplete but has a completion date" impossible.
#[derive(Clone, Debug, PartialEq)]
pub enum CompletionStatus {
    Completed(Option<DateTime<Utc>>),
    Uncompleted,
}

impl CompletionStatus {
    pub fn is_completed(&self) -> bool {
        match self {
            CompletionStatus::Completed(_) => true,
            _ => false,
        }
    }
}

/// A to-do task.
///
/// The identifier is assigned by the store when the task is first created,
/// so a brand-new task carries `None` until then.
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    id: Option<TaskId>,
    title: String,
    desc: String,
    /// The current due date. Completing a task advances it to the completion day
    date: DateTime<Utc>,
    /// The due date the task was created with; never rewritten afterwards
    date_original: DateTime<Utc>,
    completion_status: CompletionStatus,
}

impl Task {
    /// Create a brand new task that is not on the store yet
    pub fn new<S: ToString, T: ToString>(title: S, desc: T, date: DateTime<Utc>) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            desc: desc.to_string(),
            date,
            date_original: date,
            completion_status: CompletionStatus::Uncompleted,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn desc(&self) -> &str {
        &self.desc
    }
    pub fn date(&self) -> &DateTime<Utc> {
        &self.date
    }
    pub fn date_original(&self) -> &DateTime<Utc> {
        &self.date_original
    }
    pub fn completion_status(&self) -> &CompletionStatus {
        &self.completion_status
    }
    pub fn completed(&self) -> bool {
        self.completion_status.is_completed()
    }
    pub fn comp_date(&self) -> Option<DateTime<Utc>> {
        match &self.completion_status {
            CompletionStatus::Completed(date) => *date,
            CompletionStatus::Uncompleted => None,
        }
    }

    pub fn set_title<S: ToString>(&mut self, title: S) {
        self.title = title.to_string();
    }
    pub fn set_desc<S: ToString>(&mut self, desc: S) {
        self.desc = desc.to_string();
    }
    pub fn set_date(&mut self, date: DateTime<Utc>) {
        self.date = date;
    }

    pub(crate) fn set_id(&mut self, id: TaskId) {
        self.id = Some(id);
    }

    /// Mark complete as of `when`: the due date advances to the completion day,
    /// so subsequent loads show the task under the day it was finished
    pub(crate) fn complete_on(&mut self, when: DateTime<Utc>) {
        self.completion_status = CompletionStatus::Completed(Some(when));
        self.date = when;
    }

    pub(crate) fn reopen(&mut self) {
        self.completion_status = CompletionStatus::Uncompleted;
    }

    /// The `(month, day)` bucket this task nominally belongs to: the completion
    /// day when complete, the due day otherwise. Overdue rollover is a view
    /// concern and is applied by the caller, not here
    pub fn bucket_key(&self) -> (u32, u32) {
        let date = match &self.completion_status {
            CompletionStatus::Completed(Some(date)) => *date,
            _ => self.date,
        };
        (date.month0(), date.day())
    }

    pub fn to_record(&self, task_id: &str) -> TaskRecord {
        TaskRecord {
            task_id: task_id.to_string(),
            title: self.title.clone(),
            desc: self.desc.clone(),
            date: self.date.timestamp(),
            date_original: self.date_original.timestamp(),
            date_string: utils::date_string(&self.date),
            comp: self.completed(),
            comp_date: self.comp_date().map(|d| d.timestamp()),
        }
    }

    pub fn from_record(record: TaskRecord) -> Result<Self, Box<dyn Error>> {
        let date = utils::from_epoch(record.date)
            .ok_or_else(|| format!("task {}: invalid due date timestamp", record.task_id))?;
        let date_original = utils::from_epoch(record.date_original)
            .ok_or_else(|| format!("task {}: invalid original date timestamp", record.task_id))?;
        let completion_status = if record.comp {
            CompletionStatus::Completed(record.comp_date.and_then(utils::from_epoch))
        } else {
            CompletionStatus::Uncompleted
        };
        Ok(Self {
            id: Some(record.task_id),
            title: record.title,
            desc: record.desc,
            date,
            date_original,
            completion_status,
        })
    }
}

/// The wire form of a task, written at `tasks/{taskID}`.
/// Dates travel as epoch seconds, plus a pre-formatted display string
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(rename = "taskID")]
    pub task_id: String,
    pub title: String,
    #[serde(default)]
    pub desc: String,
    pub date: i64,
    #[serde(rename = "dateOriginal")]
    pub date_original: i64,
    #[serde(rename = "dateString")]
    pub date_string: String,
    pub comp: bool,
    #[serde(rename = "compDate", default, skip_serializing_if = "Option::is_none")]
    pub comp_date: Option<i64>,
}

impl TaskRecord {
    /// Warn about suspicious records coming back from the store.
    /// Returns `true` when something was off
    pub fn confirm_integrity(&self) -> bool {
        let id_str = format!("[{}]", self.task_id);
        if self.title.is_empty() {
            log::warn!("{} task record has no title", id_str);
            return true;
        }
        if self.date_string.is_empty() {
            log::warn!("{} task record is missing its cached date string", id_str);
            return true;
        }
        if self.comp && self.comp_date.is_none() {
            log::warn!("{} completed task record has no completion date; its completed pointer is unreachable", id_str);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn record_round_trip() {
        let task = Task::new("water the plants", "the ones on the balcony", date(2023, 2, 9));
        let record = task.to_record("t1");
        assert_eq!(record.date_string, "Feb 09 2023");
        assert_eq!(record.comp, false);
        assert_eq!(record.comp_date, None);

        let back = Task::from_record(record).unwrap();
        assert_eq!(back.id(), Some("t1"));
        assert_eq!(back.title(), "water the plants");
        assert_eq!(back.date(), &date(2023, 2, 9));
        assert_eq!(back.date_original(), &date(2023, 2, 9));
        assert!(!back.completed());
    }

    #[test]
    fn completion_advances_the_due_date() {
        let mut task = Task::new("t", "", date(2023, 2, 1));
        task.complete_on(date(2023, 2, 9));
        assert!(task.completed());
        assert_eq!(task.date(), &date(2023, 2, 9));
        assert_eq!(task.comp_date(), Some(date(2023, 2, 9)));
        assert_eq!(task.bucket_key(), (1, 9));
        // the original due date survives
        assert_eq!(task.date_original(), &date(2023, 2, 1));

        task.reopen();
        assert!(!task.completed());
        assert_eq!(task.comp_date(), None);
    }

    #[test]
    fn incomplete_record_drops_a_stray_completion_date() {
        let mut record = Task::new("t", "", date(2023, 2, 1)).to_record("t1");
        record.comp_date = Some(date(2023, 2, 2).timestamp());
        let task = Task::from_record(record).unwrap();
        assert_eq!(task.completion_status(), &CompletionStatus::Uncompleted);
    }

    #[test]
    fn integrity_check_flags_bad_records() {
        let good = Task::new("t", "", date(2023, 2, 1)).to_record("t1");
        assert!(!good.confirm_integrity());

        let mut untitled = good.clone();
        untitled.title.clear();
        assert!(untitled.confirm_integrity());

        let mut dateless_completion = good;
        dateless_completion.comp = true;
        assert!(dateless_completion.confirm_integrity());
    }
}
