//! Remote resolution: which Git repository does a job build from?
//!
//! A job may check out more than one repository, and pipelines routinely pull
//! in shared libraries from their own repositories. The remote that names the
//! job's environment is found by:
//!
//! 1. taking the canonical (first) remote of every Git binding on the job, in
//!    declaration order, duplicates included;
//! 2. removing, for each globally registered shared library, the first
//!    remaining candidate equal to that library's backing URL;
//! 3. picking the first candidate left.
//!
//! Library exclusion is a multiset difference, not a filter: a job that checks
//! out a library repository twice keeps one occurrence after one library
//! entry. Matching is exact string equality.
//!
//! Libraries registered on folders are not consulted; see
//! [`crate::ports::LibraryRegistry`].

use tracing::debug;

use crate::ports::LibraryRegistry;
use crate::{HostError, JobItem, RemoteUrl};

/// Returns the canonical remote of each Git binding on `job`, in order.
pub fn candidate_remotes(job: &JobItem) -> Vec<RemoteUrl> {
    job.shape
        .scm_bindings()
        .iter()
        .filter_map(|binding| binding.canonical_remote())
        .cloned()
        .collect()
}

/// Removes one occurrence of each library URL from `candidates`.
///
/// Each library URL consumes the first candidate equal to it that an earlier
/// library URL has not already consumed. Relative order of the survivors is
/// preserved.
pub fn exclude_library_remotes(
    candidates: &[RemoteUrl],
    library_urls: &[RemoteUrl],
) -> Vec<RemoteUrl> {
    let mut consumed = vec![false; candidates.len()];
    for library_url in library_urls {
        let hit = candidates
            .iter()
            .zip(&consumed)
            .position(|(candidate, taken)| !*taken && candidate == library_url);
        if let Some(index) = hit {
            consumed[index] = true;
        }
    }

    candidates
        .iter()
        .zip(consumed)
        .filter(|(_, taken)| !taken)
        .map(|(candidate, _)| candidate.clone())
        .collect()
}

/// Resolves the single remote identifying `job`'s environment.
///
/// Returns `Ok(None)` when no candidate survives library exclusion. When more
/// than one survives, the first is returned.
pub fn resolve_remote(
    job: &JobItem,
    libraries: &dyn LibraryRegistry,
) -> Result<Option<RemoteUrl>, HostError> {
    let candidates = candidate_remotes(job);
    debug!(item = %job.name, candidates = ?candidates, "Collected SCM remotes");
    if candidates.is_empty() {
        return Ok(None);
    }

    let library_urls: Vec<RemoteUrl> = libraries
        .global_libraries()?
        .iter()
        .filter_map(|library| library.backing_url())
        .cloned()
        .collect();

    let remaining = exclude_library_remotes(&candidates, &library_urls);
    if remaining.len() > 1 {
        debug!(
            item = %job.name,
            remaining = ?remaining,
            "Several remotes survive library exclusion; using the first"
        );
    }
    Ok(remaining.into_iter().next())
}
