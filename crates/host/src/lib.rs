//! In-memory host infrastructure.
//!
//! Implements the [`teardown::ports`] traits over a [`HostSnapshot`]: a JSON
//! description of the host's items and globally registered shared libraries.
//! The CLI uses it to replay item events against a captured host state; tests
//! use it to drive [`teardown::TeardownListener`] end to end.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** No teardown rules live here. The host only answers
//! lookups and records the builds it is asked to queue.

pub mod memory;
pub mod snapshot;

pub use memory::{EnqueuedBuild, InMemoryHost};
pub use snapshot::{HostSnapshot, SnapshotError};
