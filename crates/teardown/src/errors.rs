//! Error types for the teardown domain.
//!
//! [`HostError`] is what a host port returns when the platform itself fails:
//! a lookup that could not be answered or a build that could not be queued.
//! [`TeardownError`] is what [`crate::TeardownListener::process`] returns.
//!
//! Neither ever crosses the event-handler boundary. Teardown is an auxiliary
//! action; [`crate::TeardownListener`] logs these errors and drops them, and
//! nothing is retried.

use thiserror::Error;

use crate::ItemName;

// ---------------------------------------------------------------------------
// Host collaborator errors
// ---------------------------------------------------------------------------

/// A failure reported by one of the host ports in [`crate::ports`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// A registry could not answer a lookup.
    ///
    /// This is distinct from "not found", which ports report as `Ok(None)`.
    #[error("Lookup of {what} failed: {message}")]
    Lookup {
        /// What was being looked up (e.g. `"item 'team/app'"`, `"global libraries"`).
        what: String,
        message: String,
    },

    /// The scheduler refused or failed to queue a build.
    #[error("Could not enqueue a build of '{target}': {message}")]
    Enqueue { target: ItemName, message: String },

    /// The host is not in a state to serve any request.
    #[error("Host unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// Listener errors
// ---------------------------------------------------------------------------

/// Errors produced while handling a single item event.
#[derive(Debug, Error)]
pub enum TeardownError {
    /// A host port failed while the event was being handled.
    #[error(transparent)]
    Host(#[from] HostError),
}
