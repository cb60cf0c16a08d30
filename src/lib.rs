//! This crate provides the data layer of a personal task-and-calendar manager.
//!
//! The remote store keeps tasks and events in a flat, path-addressed layout
//! (records keyed by ID, separately indexed by completion status and by date
//! path), while the screens want a denormalized view: a month→day bucketed
//! projection of tasks and a rolling window of events. The reconciliation
//! engines in [`planner`] bridge the two, applying every create, edit,
//! complete and delete to both sides in a consistent order.
//!
//! The store itself is abstracted behind [`traits::DataStore`]: use
//! [`RestStore`](client::RestStore) against a real remote database, or
//! [`MemoryStore`](memory::MemoryStore) for tests and offline tinkering.

pub mod traits;

pub mod client;
pub use client::RestStore;
pub mod memory;
pub use memory::MemoryStore;
pub mod mock_behaviour;

mod task;
pub use task::{CompletionStatus, Task, TaskId, TaskRecord};
mod event;
pub use event::{Event, EventId, EventRecord};
pub mod projection;
pub use projection::MonthlyTasks;

pub mod planner;
pub use planner::{EventPlanner, FailurePolicy, TaskPlanner};

pub mod paths;
pub mod user;
pub mod weather;

pub mod config;
pub mod utils;
