//! [`InMemoryHost`]: the teardown ports over a [`HostSnapshot`].

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use teardown::{
    BuildNumber, BuildQueue, DispatchRequest, HostError, Item, ItemHandle, ItemName,
    ItemRegistry, LibraryRegistry, LibrarySource, MultiBranchContainer,
};
use tracing::debug;

use crate::snapshot::{HostSnapshot, SnapshotError};

/// A build accepted by the in-memory queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnqueuedBuild {
    pub build: BuildNumber,
    pub request: DispatchRequest,
}

#[derive(Debug, Default)]
struct QueueState {
    next_build_numbers: BTreeMap<ItemName, u64>,
    enqueued: Vec<EnqueuedBuild>,
}

/// Host state held in memory.
///
/// Items and libraries are fixed at construction. The build queue accepts
/// builds of enabled jobs, numbering them per job, and keeps every accepted
/// request for inspection.
#[derive(Debug)]
pub struct InMemoryHost {
    items: BTreeMap<ItemName, Item>,
    libraries: Vec<LibrarySource>,
    queue: Mutex<QueueState>,
}

impl InMemoryHost {
    pub fn from_snapshot(snapshot: HostSnapshot) -> Result<Self, SnapshotError> {
        let mut items = BTreeMap::new();
        for item in snapshot.items {
            let name = item.name().clone();
            if items.insert(name.clone(), item).is_some() {
                return Err(SnapshotError::DuplicateItem(name));
            }
        }

        Ok(Self {
            items,
            libraries: snapshot.libraries,
            queue: Mutex::new(QueueState {
                next_build_numbers: snapshot.next_build_numbers,
                enqueued: Vec::new(),
            }),
        })
    }

    /// Loads a snapshot file and builds a host from it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        Self::from_snapshot(HostSnapshot::load(path)?)
    }

    pub fn item(&self, name: &ItemName) -> Option<&Item> {
        self.items.get(name)
    }

    /// Every build accepted so far, in the order it was queued.
    pub fn enqueued(&self) -> Result<Vec<EnqueuedBuild>, HostError> {
        Ok(self.queue()?.enqueued.clone())
    }

    fn queue(&self) -> Result<MutexGuard<'_, QueueState>, HostError> {
        self.queue
            .lock()
            .map_err(|_| HostError::Unavailable("build queue lock poisoned".to_string()))
    }
}

impl ItemRegistry for InMemoryHost {
    fn lookup(&self, name: &ItemName) -> Result<Option<ItemHandle>, HostError> {
        Ok(self.items.get(name).map(Item::handle))
    }

    fn multi_branch_container(
        &self,
        name: &ItemName,
    ) -> Result<Option<MultiBranchContainer>, HostError> {
        Ok(match self.items.get(name) {
            Some(Item::MultiBranch(container)) => Some(container.clone()),
            _ => None,
        })
    }
}

impl LibraryRegistry for InMemoryHost {
    fn global_libraries(&self) -> Result<Vec<LibrarySource>, HostError> {
        Ok(self.libraries.clone())
    }
}

impl BuildQueue for InMemoryHost {
    fn enqueue(&self, request: &DispatchRequest) -> Result<BuildNumber, HostError> {
        let refuse = |message: &str| HostError::Enqueue {
            target: request.target.clone(),
            message: message.to_string(),
        };
        match self.items.get(&request.target) {
            Some(Item::Job(job)) if job.disabled => return Err(refuse("job is disabled")),
            Some(Item::Job(_)) => {}
            Some(_) => return Err(refuse("item is not a job")),
            None => return Err(refuse("no such job")),
        }

        let mut queue = self.queue()?;
        let next = queue
            .next_build_numbers
            .entry(request.target.clone())
            .or_insert(1);
        let build = BuildNumber::new(*next);
        *next = next
            .checked_add(1)
            .ok_or_else(|| refuse("build numbers exhausted"))?;

        queue.enqueued.push(EnqueuedBuild {
            build,
            request: request.clone(),
        });
        debug!(teardown_job = %request.target, build = %build, "Build queued");
        Ok(build)
    }
}
