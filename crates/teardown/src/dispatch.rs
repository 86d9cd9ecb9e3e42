//! Dispatch: queue one teardown build and move on.
//!
//! The build is queued with `git_url` and `branch_name` parameters and a
//! causation record pointing back at the job that triggered it. Its outcome
//! is never awaited, and a failed enqueue is returned to the caller to log;
//! it is not retried.

use tracing::info;

use crate::ports::BuildQueue;
use crate::{
    BranchName, BuildNumber, Causation, DispatchRequest, EventId, HostError, JobItem, RemoteUrl,
    TeardownTarget, Timestamp,
};

/// Builds the causation record for a teardown triggered by `job`.
pub fn causation_for(job: &JobItem, event_id: EventId) -> Causation {
    Causation {
        event_id,
        upstream_item: job.name.clone(),
        upstream_build: job.last_build,
        recorded_at: Timestamp::now(),
    }
}

/// Queues exactly one build of `target` for the given remote and branch.
pub fn dispatch(
    queue: &dyn BuildQueue,
    target: &TeardownTarget,
    remote: &RemoteUrl,
    branch: &BranchName,
    causation: Causation,
) -> Result<BuildNumber, HostError> {
    let request = DispatchRequest::teardown(target.name.clone(), remote, branch, causation);
    let build = queue.enqueue(&request)?;
    info!(
        teardown_job = %target.name,
        build = %build,
        git_url = %remote,
        branch_name = %branch,
        upstream = %request.causation.upstream_item,
        "Queued teardown build"
    );
    Ok(build)
}
