//! The reconciliation engines.
//!
//! They keep two copies of the user's data in agreement: the remote store
//! (path-addressed, flat records plus pointer indexes) and the in-memory view
//! state (the month→day projection for tasks, a flat window for events).
//! Every user-initiated operation writes the store first, then updates the
//! view state it exclusively owns. There is no background sync: the only
//! mutator is the signed-in user's own actions.

use std::error::Error;

pub mod tasks;
pub mod events;

pub use tasks::TaskPlanner;
pub use events::EventPlanner;

/// What to do when an operation hits a recoverable problem: a missing task ID,
/// a record absent from the projection, a failed secondary write.
///
/// `FailSoft` logs a warning and carries on best-effort, accepting that the
/// view and the store may diverge until the next full load. `FailFast` turns
/// the same conditions into errors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FailurePolicy {
    FailSoft,
    FailFast,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::FailSoft
    }
}

impl FailurePolicy {
    pub(crate) fn report(&self, message: &str) -> Result<(), Box<dyn Error>> {
        match self {
            FailurePolicy::FailSoft => {
                log::warn!("{}", message);
                Ok(())
            }
            FailurePolicy::FailFast => Err(message.into()),
        }
    }
}
