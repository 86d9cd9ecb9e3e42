//! Teardown job resolution.
//!
//! The job to run is chosen by name, first match wins:
//!
//! 1. the item's own override property;
//! 2. the global default from [`TeardownConfig`], when it is not blank;
//! 3. [`FALLBACK_TEARDOWN_JOB`].
//!
//! The chosen name is then looked up. If nothing by that name exists, or it
//! cannot be scheduled with parameters, there is no target. Lower tiers are
//! not tried in that case: an override naming a missing job means no teardown.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ports::ItemRegistry;
use crate::{HostError, ItemName, JobItem, TeardownConfig};

/// Job name used when neither the item nor the global configuration names one.
pub const FALLBACK_TEARDOWN_JOB: &str = "job-tear-down-executor";

/// Which tier supplied the teardown job name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSource {
    ItemOverride,
    GlobalDefault,
    Fallback,
}

/// A resolved, dispatchable teardown job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeardownTarget {
    pub name: ItemName,
    pub source: TargetSource,
}

/// Picks the teardown job name for `job` without consulting the registry.
pub fn select_target_name(job: &JobItem, config: &TeardownConfig) -> (ItemName, TargetSource) {
    if let Some(name) = &job.teardown_job {
        return (name.clone(), TargetSource::ItemOverride);
    }
    if let Some(name) = config.default_job() {
        return (name, TargetSource::GlobalDefault);
    }
    (
        ItemName::from_static(FALLBACK_TEARDOWN_JOB),
        TargetSource::Fallback,
    )
}

/// Resolves the teardown job for `job`, or `None` if the selected name does
/// not refer to a parameterized job.
pub fn resolve_target(
    job: &JobItem,
    config: &TeardownConfig,
    items: &dyn ItemRegistry,
) -> Result<Option<TeardownTarget>, HostError> {
    let (name, source) = select_target_name(job, config);
    debug!(item = %job.name, teardown_job = %name, source = ?source, "Selected teardown job");

    match items.lookup(&name)? {
        Some(handle) if handle.is_parameterized() => Ok(Some(TeardownTarget {
            name: handle.name,
            source,
        })),
        Some(handle) => {
            debug!(teardown_job = %name, kind = ?handle.kind, "Teardown job cannot take parameters");
            Ok(None)
        }
        None => {
            debug!(teardown_job = %name, "Teardown job does not exist");
            Ok(None)
        }
    }
}
