//! The denormalized month→day view of tasks that the calendar and summary
//! screens read from.
//!
//! The remote store keeps tasks flat (keyed by ID, indexed by completion
//! status and date path); this structure is the client-side projection of that
//! data, bucketed by `(month, day)`. A secondary index maps each task ID to
//! its current bucket, so relocating or removing a task never has to scan the
//! months or guess between a task's due date and today's overdue slot.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::task::{Task, TaskId};

/// `(month, day)` with a zero-based month, matching the remote schema
pub type BucketKey = (u32, u32);

/// The tasks of one calendar day
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DayBucket {
    date: Option<DateTime<Utc>>,
    tasks: Vec<Task>,
}

impl DayBucket {
    /// A date representative of this day, kept for formatting the day header
    pub fn date(&self) -> Option<&DateTime<Utc>> {
        self.date.as_ref()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }
}

/// The days of one calendar month
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MonthBucket {
    date: Option<DateTime<Utc>>,
    days: BTreeMap<u32, DayBucket>,
}

impl MonthBucket {
    /// A date representative of this month
    pub fn date(&self) -> Option<&DateTime<Utc>> {
        self.date.as_ref()
    }

    pub fn days(&self) -> &BTreeMap<u32, DayBucket> {
        &self.days
    }

    pub fn day(&self, day: u32) -> Option<&DayBucket> {
        self.days.get(&day)
    }
}

/// All loaded tasks, bucketed by zero-based month then day of month
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MonthlyTasks {
    months: BTreeMap<u32, MonthBucket>,
    /// Where each task currently sits. Kept in lockstep with `months`
    locations: HashMap<TaskId, BucketKey>,
}

impl MonthlyTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn months(&self) -> &BTreeMap<u32, MonthBucket> {
        &self.months
    }

    pub fn month(&self, month: u32) -> Option<&MonthBucket> {
        self.months.get(&month)
    }

    pub fn day(&self, key: BucketKey) -> Option<&DayBucket> {
        self.months.get(&key.0).and_then(|m| m.days.get(&key.1))
    }

    /// The bucket a task currently sits in, if it is loaded at all
    pub fn location_of(&self, task_id: &str) -> Option<BucketKey> {
        self.locations.get(task_id).copied()
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        let key = self.location_of(task_id)?;
        self.day(key)?.tasks.iter().find(|t| t.id() == Some(task_id))
    }

    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        let key = self.location_of(task_id)?;
        self.months
            .get_mut(&key.0)?
            .days
            .get_mut(&key.1)?
            .tasks
            .iter_mut()
            .find(|t| t.id() == Some(task_id))
    }

    pub fn task_count(&self) -> usize {
        self.months
            .values()
            .flat_map(|m| m.days.values())
            .map(|d| d.tasks.len())
            .sum()
    }

    pub fn iter_tasks(&self) -> impl Iterator<Item = &Task> {
        self.months
            .values()
            .flat_map(|m| m.days.values())
            .flat_map(|d| d.tasks.iter())
    }

    /// Make sure a month entry exists, seeding its representative date on creation
    pub fn ensure_month(&mut self, month: u32, date: DateTime<Utc>) {
        let bucket = self.months.entry(month).or_default();
        if bucket.date.is_none() {
            bucket.date = Some(date);
        }
    }

    /// Make sure a day entry exists (empty if new), seeding representative dates on creation
    pub fn ensure_day(&mut self, key: BucketKey, date: DateTime<Utc>) {
        self.ensure_month(key.0, date);
        if let Some(month) = self.months.get_mut(&key.0) {
            let day = month.days.entry(key.1).or_default();
            if day.date.is_none() {
                day.date = Some(date);
            }
        }
    }

    /// Insert a task at `key`, creating the month and day entries if absent.
    ///
    /// A task ID lives in at most one bucket: if the task is already present
    /// somewhere, that older occurrence is removed first.
    pub fn insert(&mut self, key: BucketKey, date_hint: DateTime<Utc>, task: Task) {
        match task.id() {
            Some(id) => {
                if self.locations.contains_key(id) {
                    let id = id.to_string();
                    self.remove(&id);
                }
            }
            None => {
                log::warn!("inserting a task with no ID into the projection; it will not be relocatable");
            }
        }

        self.ensure_day(key, date_hint);
        if let Some(id) = task.id() {
            self.locations.insert(id.to_string(), key);
        }
        if let Some(month) = self.months.get_mut(&key.0) {
            if let Some(day) = month.days.get_mut(&key.1) {
                day.tasks.push(task);
            }
        }
    }

    /// Remove a task wherever it currently sits. Empty day entries are left in
    /// place (today's slot stays visible even when its last task goes)
    pub fn remove(&mut self, task_id: &str) -> Option<Task> {
        let key = self.locations.remove(task_id)?;
        let day = match self.months.get_mut(&key.0).and_then(|m| m.days.get_mut(&key.1)) {
            Some(day) => day,
            None => {
                log::warn!("task {} was indexed at ({}, {}) but that bucket does not exist", task_id, key.0, key.1);
                return None;
            }
        };
        let position = day.tasks.iter().position(|t| t.id() == Some(task_id))?;
        Some(day.tasks.remove(position))
    }
}
