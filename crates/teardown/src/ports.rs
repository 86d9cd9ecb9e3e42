//! Port traits: what the teardown listener needs from its host.
//!
//! The listener consumes four host capabilities and exposes one. All calls
//! are synchronous; the listener runs on whichever thread the host delivers
//! the event on and never spawns work of its own. Every consumed port is
//! read-only from the listener's point of view except [`BuildQueue`], whose
//! only operation is a fire-and-forget enqueue.
//!
//! | Port | Direction | Used by |
//! |------|-----------|---------|
//! | [`ItemRegistry`] | consumed | branch and target resolution |
//! | [`LibraryRegistry`] | consumed | remote resolution |
//! | [`BuildQueue`] | consumed | dispatch |
//! | [`ConfigStore`] | consumed | target resolution |
//! | [`ItemListener`] | exposed | host event delivery |

use std::sync::Arc;

use crate::{
    BuildNumber, DispatchRequest, HostError, Item, ItemEvent, ItemEventKind, ItemHandle,
    ItemName, LibrarySource, MultiBranchContainer, TeardownConfig,
};

// ---------------------------------------------------------------------------
// Consumed
// ---------------------------------------------------------------------------

/// Name-based access to the host's items.
pub trait ItemRegistry: Send + Sync {
    /// Looks up an item by fully qualified name. `Ok(None)` if no such item exists.
    fn lookup(&self, name: &ItemName) -> Result<Option<ItemHandle>, HostError>;

    /// Returns the multi-branch container with the given name.
    ///
    /// `Ok(None)` if the name does not exist or names some other kind of item.
    fn multi_branch_container(
        &self,
        name: &ItemName,
    ) -> Result<Option<MultiBranchContainer>, HostError>;
}

/// The host's globally registered shared libraries.
///
/// Folder-scoped libraries are not part of this port: a library registered
/// on a folder is not excluded from remote resolution.
pub trait LibraryRegistry: Send + Sync {
    fn global_libraries(&self) -> Result<Vec<LibrarySource>, HostError>;
}

/// The host scheduler.
pub trait BuildQueue: Send + Sync {
    /// Queues one build of `request.target` and returns its build number
    /// without waiting for it to start.
    fn enqueue(&self, request: &DispatchRequest) -> Result<BuildNumber, HostError>;
}

/// Read access to the host-owned global teardown configuration.
///
/// Read once per event so a configuration change applies to the next event.
pub trait ConfigStore: Send + Sync {
    fn teardown_config(&self) -> TeardownConfig;
}

impl ConfigStore for TeardownConfig {
    fn teardown_config(&self) -> TeardownConfig {
        self.clone()
    }
}

/// The set of host ports a [`crate::TeardownListener`] is wired to.
#[derive(Clone)]
pub struct HostPorts {
    pub items: Arc<dyn ItemRegistry>,
    pub libraries: Arc<dyn LibraryRegistry>,
    pub queue: Arc<dyn BuildQueue>,
    pub config: Arc<dyn ConfigStore>,
}

impl std::fmt::Debug for HostPorts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostPorts").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Exposed
// ---------------------------------------------------------------------------

/// A callback the host invokes for item lifecycle events.
///
/// Implementations must not fail: whatever goes wrong while handling an event
/// is the listener's to log, never the host's to handle. All methods default to
/// doing nothing so a listener only implements the transitions it cares about.
pub trait ItemListener: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn on_created(&self, _item: &Item) {}

    fn on_updated(&self, _item: &Item) {}

    fn on_deleted(&self, _item: &Item) {}

    /// Routes an event to the matching `on_*` method.
    fn on_event(&self, event: &ItemEvent) {
        match event.kind {
            ItemEventKind::Created => self.on_created(&event.item),
            ItemEventKind::Updated => self.on_updated(&event.item),
            ItemEventKind::Deleted => self.on_deleted(&event.item),
        }
    }
}
