//! Branch resolution.
//!
//! Only pipeline jobs projected by a multi-branch container have a branch. The
//! container is asked twice: whether the job is one of its current
//! projections, and if so which branch it was projected from. A job that
//! still sits in the container but is no longer a current projection has no
//! branch.

use tracing::debug;

use crate::ports::ItemRegistry;
use crate::{BranchName, HostError, JobItem, JobShape};

/// Returns the branch `job` was projected from, or `None` if it is not a
/// current branch projection.
pub fn resolve_branch(
    job: &JobItem,
    items: &dyn ItemRegistry,
) -> Result<Option<BranchName>, HostError> {
    if matches!(job.shape, JobShape::Simple { .. }) {
        return Ok(None);
    }
    let Some(parent) = job.multi_branch_parent() else {
        return Ok(None);
    };

    let Some(container) = items.multi_branch_container(parent)? else {
        debug!(item = %job.name, parent = %parent, "Parent is not a multi-branch container");
        return Ok(None);
    };
    if !container.is_branch_projection(&job.name) {
        debug!(item = %job.name, parent = %parent, "Job is not a current branch projection");
        return Ok(None);
    }
    Ok(container.branch_for(&job.name).cloned())
}
