//! The event reconciliation engine.
//!
//! Events are indexed by their date: the full record lives at
//! `events/{eventID}` and a pointer sits under the user's
//! `events/{year}/{month}/{day}` path. The invariant to protect is that the
//! pointer's date path always matches the record's `date` field, so an update
//! that moves an event to another day must relocate the pointer in the same
//! operation.

use std::error::Error;

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};

use crate::event::{Event, EventId, EventRecord};
use crate::paths;
use crate::traits::DataStore;

use super::FailurePolicy;

/// How many days of events a single load covers, starting at the reference date
pub const LOAD_WINDOW_DAYS: i64 = 5;

fn event_pointer(event_id: &str) -> Value {
    json!({ "eventID": event_id })
}

/// Reconciles the user's events between the remote store and the flat list of
/// currently loaded events it owns
pub struct EventPlanner<S: DataStore> {
    store: S,
    user_id: String,
    policy: FailurePolicy,
    events: Vec<Event>,
}

impl<S: DataStore> EventPlanner<S> {
    pub fn new<U: ToString>(store: S, user_id: U) -> Self {
        Self::new_with_policy(store, user_id, FailurePolicy::default())
    }

    pub fn new_with_policy<U: ToString>(store: S, user_id: U, policy: FailurePolicy) -> Self {
        Self {
            store,
            user_id: user_id.to_string(),
            policy,
            events: Vec::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The currently loaded window of events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn set_policy(&mut self, policy: FailurePolicy) {
        self.policy = policy;
    }

    /// Load the events of the [`LOAD_WINDOW_DAYS`]-day window starting at
    /// `reference`, replacing the current window.
    ///
    /// Like tasks, a date-index pointer whose record is gone is dropped from
    /// the index and excluded from the result.
    pub async fn load_events(&mut self, reference: DateTime<Utc>) -> Result<&[Event], Box<dyn Error>> {
        let mut events = Vec::new();

        for offset in 0..LOAD_WINDOW_DAYS {
            let date = reference + Duration::days(offset);
            let day_path = paths::event_day(&self.user_id, &date);
            let entries = match self.store.get(&day_path).await? {
                Some(Value::Object(map)) => map,
                _ => continue,
            };

            for event_id in entries.keys() {
                match self.load_event_by_id(event_id).await {
                    Ok(Some(event)) => events.push(event),
                    Ok(None) => {
                        log::warn!("event {} has a date pointer but no record, removing the pointer", event_id);
                        if let Err(err) = self.store.delete(&format!("{}/{}", day_path, event_id)).await {
                            log::warn!("could not remove the ghost pointer for event {}: {}", event_id, err);
                        }
                    }
                    Err(err) => {
                        log::warn!("skipping event {}: {}", event_id, err);
                    }
                }
            }
        }

        self.events = events;
        Ok(&self.events)
    }

    /// Fetch one event record by ID. `Ok(None)` means the record is absent
    async fn load_event_by_id(&self, event_id: &str) -> Result<Option<Event>, Box<dyn Error>> {
        let value = match self.store.get(&paths::event(event_id)).await? {
            Some(value) => value,
            None => return Ok(None),
        };
        let record: EventRecord = serde_json::from_value(value)?;
        Ok(Some(Event::from_record(record)?))
    }

    /// Create an event: the push into the flat event tree allocates its ID,
    /// then the record and the date-index pointer are written
    pub async fn create_event(&mut self, mut event: Event) -> Result<EventId, Box<dyn Error>> {
        let event_id = self.store.push(paths::EVENTS_ROOT, json!(true)).await?;
        event.set_id(event_id.clone());

        let record = serde_json::to_value(event.to_record(&event_id))?;
        self.store.set(&paths::event(&event_id), record).await?;

        let index_path = paths::event_index(&self.user_id, event.date(), &event_id);
        if let Err(err) = self.store.set(&index_path, event_pointer(&event_id)).await {
            self.policy.report(&format!("create event {}: could not write the date pointer: {}", event_id, err))?;
        }

        self.events.push(event);
        Ok(event_id)
    }

    /// Rewrite an event's record; if its date changed, delete the pointer at
    /// the old date and create one at the new date in the same operation.
    /// Skipping either half would leave the event invisible on its real day or
    /// falsely visible on the old one
    pub async fn update_event(&mut self, event: Event) -> Result<(), Box<dyn Error>> {
        let event_id = match event.id() {
            Some(id) => id.to_string(),
            None => return self.policy.report("update event: no event ID provided"),
        };

        match self.load_event_by_id(&event_id).await? {
            Some(old_event) => {
                if old_event.date().timestamp() != event.date().timestamp() {
                    let old_index = paths::event_index(&self.user_id, old_event.date(), &event_id);
                    self.store.delete(&old_index).await?;
                    let new_index = paths::event_index(&self.user_id, event.date(), &event_id);
                    self.store.set(&new_index, event_pointer(&event_id)).await?;
                }
            }
            None => {
                self.policy.report(&format!("update event {}: no stored record found, writing it fresh", event_id))?;
                let index_path = paths::event_index(&self.user_id, event.date(), &event_id);
                self.store.set(&index_path, event_pointer(&event_id)).await?;
            }
        }

        let record = serde_json::to_value(event.to_record(&event_id))?;
        self.store.set(&paths::event(&event_id), record).await?;

        match self.events.iter_mut().find(|e| e.id() == Some(event_id.as_str())) {
            Some(slot) => *slot = event,
            None => {
                self.policy.report(&format!("update event {}: not found in the loaded window", event_id))?;
            }
        }
        Ok(())
    }

    /// Delete an event's record and its date-index pointer.
    /// Deleting an event that is already gone is a no-op
    pub async fn delete_event(&mut self, event: &Event) -> Result<(), Box<dyn Error>> {
        let event_id = match event.id() {
            Some(id) => id.to_string(),
            None => return self.policy.report("delete event: no event ID provided"),
        };

        self.store.delete(&paths::event(&event_id)).await?;
        self.store.delete(&paths::event_index(&self.user_id, event.date(), &event_id)).await?;

        self.events.retain(|e| e.id() != Some(event_id.as_str()));
        Ok(())
    }
}
