//! The task reconciliation engine.
//!
//! Tasks live in the store three times over: the full record at
//! `tasks/{taskID}`, a pointer in the user's incomplete index, and (once
//! completed) a pointer under `completed/{year}/{month}/{day}`. This engine
//! loads all of that into the month→day projection and keeps every copy in
//! step through create/update/delete and the completion migration.

use std::error::Error;

use chrono::{DateTime, Datelike, Utc};
use serde_json::{json, Value};

use crate::paths;
use crate::projection::MonthlyTasks;
use crate::task::{Task, TaskId, TaskRecord};
use crate::traits::DataStore;
use crate::utils;

use super::FailurePolicy;

fn task_pointer(task_id: &str) -> Value {
    json!({ "taskID": task_id })
}

/// Reconciles the user's tasks between the remote store and the bucketed
/// projection it owns
pub struct TaskPlanner<S: DataStore> {
    store: S,
    user_id: String,
    policy: FailurePolicy,
    tasks: MonthlyTasks,
}

impl<S: DataStore> TaskPlanner<S> {
    pub fn new<U: ToString>(store: S, user_id: U) -> Self {
        Self::new_with_policy(store, user_id, FailurePolicy::default())
    }

    pub fn new_with_policy<U: ToString>(store: S, user_id: U, policy: FailurePolicy) -> Self {
        Self {
            store,
            user_id: user_id.to_string(),
            policy,
            tasks: MonthlyTasks::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The current projection. Rebuilt by [`Self::load_all_task_data`],
    /// incrementally updated by every other operation
    pub fn tasks(&self) -> &MonthlyTasks {
        &self.tasks
    }

    pub fn set_policy(&mut self, policy: FailurePolicy) {
        self.policy = policy;
    }

    /// Rebuild the projection from the store: completed tasks for the current
    /// month and `lookback_months` months before it (0 = current month only),
    /// merged with every incomplete task.
    ///
    /// Incomplete tasks due in the past land in today's bucket (overdue
    /// rollover); today's slot exists afterwards even if nothing is in it.
    pub async fn load_all_task_data(&mut self, lookback_months: u32) -> Result<&MonthlyTasks, Box<dyn Error>> {
        let today = utils::today();
        let mut monthly = MonthlyTasks::new();

        // completed months first, so a merged day lists completed tasks ahead
        // of the incomplete ones
        for i in 0..=lookback_months {
            let month_date = utils::months_back(&today, i);
            self.load_completed_month(&mut monthly, &month_date).await?;
        }

        monthly.ensure_day((today.month0(), today.day()), today);

        for task in self.load_incomplete_tasks().await? {
            let key = utils::view_bucket(task.date(), &today);
            let date_hint = *task.date();
            monthly.insert(key, date_hint, task);
        }

        self.tasks = monthly;
        Ok(&self.tasks)
    }

    /// Load every incomplete task the user has.
    ///
    /// A pointer whose record no longer exists (a ghost) is dropped from the
    /// index as a self-healing side effect and excluded from the result;
    /// it never fails the load.
    pub async fn load_incomplete_tasks(&self) -> Result<Vec<Task>, Box<dyn Error>> {
        let index_path = paths::incomplete_index(&self.user_id);
        let mut tasks = Vec::new();
        let entries = match self.store.get(&index_path).await? {
            Some(Value::Object(map)) => map,
            _ => return Ok(tasks),
        };

        for task_id in entries.keys() {
            match self.load_task_by_id(task_id).await {
                Ok(Some(task)) => tasks.push(task),
                Ok(None) => {
                    log::warn!("task {} has an incomplete pointer but no record, removing the pointer", task_id);
                    if let Err(err) = self.store.delete(&format!("{}/{}", index_path, task_id)).await {
                        log::warn!("could not remove the ghost pointer for task {}: {}", task_id, err);
                    }
                }
                Err(err) => {
                    log::warn!("skipping incomplete task {}: {}", task_id, err);
                }
            }
        }
        Ok(tasks)
    }

    /// Load the completed tasks of one month into the projection, keyed by the
    /// day component of their completed-index path. Ghost pointers are
    /// dropped, same as on the incomplete side
    async fn load_completed_month(&self, monthly: &mut MonthlyTasks, month_date: &DateTime<Utc>) -> Result<(), Box<dyn Error>> {
        let month_path = paths::completed_month(&self.user_id, month_date.year(), month_date.month0());
        monthly.ensure_month(month_date.month0(), *month_date);

        let days = match self.store.get(&month_path).await? {
            Some(Value::Object(map)) => map,
            _ => return Ok(()),
        };

        for (day_key, entries) in &days {
            let day: u32 = match day_key.parse() {
                Ok(day) => day,
                Err(_) => {
                    log::warn!("ignoring non-numeric day {:?} under {}", day_key, month_path);
                    continue;
                }
            };
            let entries = match entries.as_object() {
                Some(map) => map,
                None => continue,
            };

            for task_id in entries.keys() {
                match self.load_task_by_id(task_id).await {
                    Ok(Some(task)) => {
                        let date_hint = *task.date();
                        monthly.insert((month_date.month0(), day), date_hint, task);
                    }
                    Ok(None) => {
                        log::warn!("task {} has a completed pointer but no record, removing the pointer", task_id);
                        let pointer_path = format!("{}/{}/{}", month_path, day, task_id);
                        if let Err(err) = self.store.delete(&pointer_path).await {
                            log::warn!("could not remove the ghost pointer for task {}: {}", task_id, err);
                        }
                    }
                    Err(err) => {
                        log::warn!("skipping completed task {}: {}", task_id, err);
                    }
                }
            }
        }
        Ok(())
    }

    /// Fetch one task record by ID. `Ok(None)` means the record is absent
    async fn load_task_by_id(&self, task_id: &str) -> Result<Option<Task>, Box<dyn Error>> {
        let value = match self.store.get(&paths::task(task_id)).await? {
            Some(value) => value,
            None => return Ok(None),
        };
        let record: TaskRecord = serde_json::from_value(value)?;
        record.confirm_integrity();
        Ok(Some(Task::from_record(record)?))
    }

    /// Create a task: the push into the incomplete index allocates its ID,
    /// then the full record and the index pointer are written, and the task
    /// joins the projection at its due date's bucket.
    ///
    /// Returns `Ok(None)` when a fail-soft policy skipped a titleless task.
    pub async fn create_task(&mut self, mut task: Task) -> Result<Option<TaskId>, Box<dyn Error>> {
        if task.title().is_empty() {
            self.policy.report("create task: refusing a task with no title")?;
            return Ok(None);
        }

        let index_path = paths::incomplete_index(&self.user_id);
        let task_id = self.store.push(&index_path, json!(true)).await?;
        task.set_id(task_id.clone());

        // the record is the primary copy; a failure here aborts the operation
        self.save_task(&task).await?;

        let pointer_path = paths::incomplete_task(&self.user_id, &task_id);
        if let Err(err) = self.store.set(&pointer_path, task_pointer(&task_id)).await {
            self.policy.report(&format!("create task {}: could not finalize the index pointer: {}", task_id, err))?;
        }

        let key = (task.date().month0(), task.date().day());
        let date_hint = *task.date();
        self.tasks.insert(key, date_hint, task);
        Ok(Some(task_id))
    }

    /// Rewrite a task's record and move it to the bucket its new state implies.
    ///
    /// The caller only hands over the new desired state; the projection's
    /// location index finds where the old version sits. A task that cannot be
    /// found is reported, but the new record is still written and inserted.
    pub async fn update_task(&mut self, task: Task) -> Result<(), Box<dyn Error>> {
        let task_id = match task.id() {
            Some(id) => id.to_string(),
            None => return self.policy.report("update task: no task ID provided"),
        };

        self.save_task(&task).await?;

        if self.tasks.remove(&task_id).is_none() {
            self.policy.report(&format!("update task {}: the existing task was not found in the projection", task_id))?;
        }
        let key = task.bucket_key();
        let date_hint = *task.date();
        self.tasks.insert(key, date_hint, task);
        Ok(())
    }

    /// Delete an incomplete task: the index pointer and the record both go.
    /// Completed tasks are immutable and cannot be deleted.
    ///
    /// Deleting a task that is already gone from the store is a no-op.
    pub async fn delete_task(&mut self, task: &Task) -> Result<(), Box<dyn Error>> {
        let task_id = match task.id() {
            Some(id) => id.to_string(),
            None => return self.policy.report("delete task: no task ID provided"),
        };
        if task.completed() {
            return self.policy.report(&format!("delete task {}: completed tasks cannot be deleted", task_id));
        }

        self.store.delete(&paths::incomplete_task(&self.user_id, &task_id)).await?;
        self.store.delete(&paths::task(&task_id)).await?;
        log::info!("deleted task {}", task_id);

        if self.tasks.remove(&task_id).is_none() {
            // the remote copies are gone either way
            self.policy.report(&format!("delete task {}: not found in the projection", task_id))?;
        }
        Ok(())
    }

    /// Flip a task between complete and incomplete, migrating its index
    /// entries. Toggling to the state the task is already in is a no-op
    pub async fn set_completed(&mut self, task_id: &str, completed: bool) -> Result<(), Box<dyn Error>> {
        let task = match self.tasks.task(task_id) {
            Some(task) => task.clone(),
            None => {
                return self.policy.report(&format!("toggle complete: task {} is not in the projection", task_id));
            }
        };
        if task.completed() == completed {
            return Ok(());
        }
        if completed {
            self.complete_task(task_id, task).await
        } else {
            self.reopen_task(task_id, task).await
        }
    }

    /// incomplete -> complete: stamp today as the completion date, rewrite the
    /// record, move the pointer from the incomplete index to today's completed
    /// path, and relocate the task to today's bucket
    async fn complete_task(&mut self, task_id: &str, mut task: Task) -> Result<(), Box<dyn Error>> {
        let today = utils::today();
        task.complete_on(today);

        self.save_task(&task).await?;

        if let Err(err) = self.store.delete(&paths::incomplete_task(&self.user_id, task_id)).await {
            self.policy.report(&format!("complete task {}: could not remove the incomplete pointer: {}", task_id, err))?;
        }
        let completed_path = paths::completed_task(&self.user_id, &today, task_id);
        if let Err(err) = self.store.set(&completed_path, task_pointer(task_id)).await {
            self.policy.report(&format!("complete task {}: could not add the completed pointer: {}", task_id, err))?;
        }

        // completing always relocates the task to today, wherever it was due
        self.tasks.remove(task_id);
        self.tasks.insert((today.month0(), today.day()), today, task);
        Ok(())
    }

    /// complete -> incomplete: the stored completion date locates the
    /// completed pointer to remove. Without it that pointer is orphaned, which
    /// is reported; the rest of the migration still runs. The task keeps its
    /// current bucket, only the flag flips
    async fn reopen_task(&mut self, task_id: &str, mut task: Task) -> Result<(), Box<dyn Error>> {
        match task.comp_date() {
            Some(comp_date) => {
                let completed_path = paths::completed_task(&self.user_id, &comp_date, task_id);
                if let Err(err) = self.store.delete(&completed_path).await {
                    self.policy.report(&format!("reopen task {}: could not remove the completed pointer: {}", task_id, err))?;
                }
            }
            None => {
                self.policy.report(&format!(
                    "reopen task {}: no completion date on record, its completed pointer cannot be removed",
                    task_id
                ))?;
            }
        }

        let pointer_path = paths::incomplete_task(&self.user_id, task_id);
        if let Err(err) = self.store.set(&pointer_path, task_pointer(task_id)).await {
            self.policy.report(&format!("reopen task {}: could not add the incomplete pointer: {}", task_id, err))?;
        }

        task.reopen();
        self.save_task(&task).await?;

        if let Some(current) = self.tasks.task_mut(task_id) {
            current.reopen();
        }
        Ok(())
    }

    /// Rewrite the full record at `tasks/{taskID}`
    async fn save_task(&self, task: &Task) -> Result<(), Box<dyn Error>> {
        let task_id = match task.id() {
            Some(id) => id,
            None => return self.policy.report("save task: no task ID provided"),
        };
        let record = serde_json::to_value(task.to_record(task_id))?;
        self.store.set(&paths::task(task_id), record).await
    }
}
