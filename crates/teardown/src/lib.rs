//! Job teardown domain.
//!
//! When a job in the host automation platform is updated while disabled, the
//! environment it deployed should be torn down. This crate decides whether
//! that applies to a given update, works out which Git remote and branch
//! identify the environment, picks the teardown job to run, and queues it with
//! `git_url` and `branch_name` parameters.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! The host platform is reached only through the traits in [`ports`];
//! infrastructure crates supply the implementations.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ItemName`, `RemoteUrl`, `BranchName`, ...) |
//! | [`types`] | Item model, library sources, configuration, dispatch requests |
//! | [`errors`] | Host and handler error types |
//! | [`ports`] | Host port traits and the exposed [`ItemListener`] capability |
//! | [`gate`] | Event eligibility |
//! | [`remote`] | Remote resolution with shared-library exclusion |
//! | [`branch`] | Branch resolution for multi-branch projections |
//! | [`target`] | Three-tier teardown job resolution |
//! | [`dispatch`] | Request construction and enqueue |
//! | [`handler`] | [`TeardownListener`], the event handler tying it together |

pub mod branch;
pub mod dispatch;
pub mod errors;
pub mod gate;
pub mod handler;
pub mod identifiers;
pub mod ports;
pub mod remote;
pub mod target;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{HostError, TeardownError};
pub use handler::{EventOutcome, SkipReason, TeardownListener};
pub use identifiers::{BlankIdentifier, BranchName, BuildNumber, EventId, ItemName, RemoteUrl};
pub use ports::{BuildQueue, ConfigStore, HostPorts, ItemListener, ItemRegistry, LibraryRegistry};
pub use target::{TargetSource, TeardownTarget, FALLBACK_TEARDOWN_JOB};
pub use types::{
    Causation, ContainerKind, DispatchRequest, Item, ItemEvent, ItemEventKind, ItemHandle,
    ItemKind, JobItem, JobShape, LibraryRetriever, LibrarySource, MultiBranchContainer, ParentRef,
    ScmBinding, ScmKind, ScmSource, StringParameter, TeardownConfig, Timestamp,
};
