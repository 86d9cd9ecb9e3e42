//! Event eligibility.
//!
//! An update is eligible for teardown when the item is a job and that job is
//! disabled at the time of the update. The check is level-triggered: every
//! update delivered while a job stays disabled is eligible, not only the one
//! that disabled it.

use crate::{Item, JobItem};

/// Returns the job if `item` is a disabled job, otherwise `None`.
pub fn eligible_job(item: &Item) -> Option<&JobItem> {
    match item {
        Item::Job(job) if job.disabled => Some(job),
        _ => None,
    }
}

/// Returns `true` if an update to `item` should trigger a teardown.
pub fn is_eligible(item: &Item) -> bool {
    eligible_job(item).is_some()
}
