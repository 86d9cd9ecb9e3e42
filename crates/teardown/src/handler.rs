//! The teardown event handler.
//!
//! [`TeardownListener`] is registered with the host as an [`ItemListener`].
//! For each update it walks one event through:
//!
//! ```text
//! RECEIVED ─▶ not a disabled job ─────────────▶ NOT_ELIGIBLE
//!    │
//!    ▼
//! ELIGIBLE ─▶ remote or branch unresolved ────▶ SKIPPED
//!    │
//!    ├──────▶ teardown job unresolved ────────▶ SKIPPED
//!    │
//!    └──────▶ enqueue ────────────────────────▶ DISPATCHED
//! ```
//!
//! Nothing is stored between events. Each event is handled to completion on
//! the calling thread.

use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, warn};

use crate::branch::resolve_branch;
use crate::dispatch::{causation_for, dispatch};
use crate::gate::eligible_job;
use crate::ports::{HostPorts, ItemListener};
use crate::remote::resolve_remote;
use crate::target::{resolve_target, TeardownTarget};
use crate::{BuildNumber, EventId, Item, TeardownError};

/// Why an eligible event did not dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoRemote,
    NoBranch,
    NoTarget,
}

/// Terminal state of one handled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EventOutcome {
    NotEligible,
    Skipped { reason: SkipReason },
    Dispatched { target: TeardownTarget, build: BuildNumber },
}

/// Queues a teardown build when a disabled job is updated.
#[derive(Debug, Clone)]
pub struct TeardownListener {
    ports: HostPorts,
}

impl TeardownListener {
    pub const NAME: &'static str = "job-teardown";

    pub fn new(ports: HostPorts) -> Self {
        Self { ports }
    }

    /// Handles one updated item and reports where it ended up.
    ///
    /// Host failures are returned; [`ItemListener::on_updated`] is the
    /// boundary that logs and drops them.
    pub fn process(&self, item: &Item, event_id: EventId) -> Result<EventOutcome, TeardownError> {
        let Some(job) = eligible_job(item) else {
            return Ok(EventOutcome::NotEligible);
        };

        let branch = resolve_branch(job, self.ports.items.as_ref())?;
        let remote = resolve_remote(job, self.ports.libraries.as_ref())?;
        debug!(item = %job.name, branch = ?branch, remote = ?remote, "Resolved job coordinates");

        let Some(remote) = remote else {
            return Ok(EventOutcome::Skipped {
                reason: SkipReason::NoRemote,
            });
        };
        let Some(branch) = branch else {
            return Ok(EventOutcome::Skipped {
                reason: SkipReason::NoBranch,
            });
        };

        let config = self.ports.config.teardown_config();
        let Some(target) = resolve_target(job, &config, self.ports.items.as_ref())? else {
            return Ok(EventOutcome::Skipped {
                reason: SkipReason::NoTarget,
            });
        };

        let build = dispatch(
            self.ports.queue.as_ref(),
            &target,
            &remote,
            &branch,
            causation_for(job, event_id),
        )?;
        Ok(EventOutcome::Dispatched { target, build })
    }
}

impl ItemListener for TeardownListener {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_updated(&self, item: &Item) {
        let event_id = EventId::new_random();
        let span = info_span!("teardown.event", event_id = %event_id, item = %item.name());
        let _entered = span.enter();

        match self.process(item, event_id) {
            Ok(EventOutcome::NotEligible) => {}
            Ok(EventOutcome::Skipped { reason }) => {
                debug!(reason = ?reason, "Teardown skipped");
            }
            Ok(EventOutcome::Dispatched { .. }) => {}
            Err(error) => {
                warn!(error = %error, "Teardown failed; the event is dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{branch_job, git_library, job_item, multi_branch, name, FakeHost};
    use crate::{ItemEvent, ItemEventKind, TargetSource, TeardownConfig, FALLBACK_TEARDOWN_JOB};
    use tracing_test::traced_test;

    const REPO: &str = "https://example.com/repo.git";

    fn disabled_branch_job() -> Item {
        let mut job = branch_job("p", "feature", REPO);
        job.disabled = true;
        Item::Job(job)
    }

    fn host_with_fallback() -> FakeHost {
        FakeHost {
            items: vec![
                Item::MultiBranch(multi_branch("p", &[("feature", "p/feature")])),
                job_item(FALLBACK_TEARDOWN_JOB),
            ],
            ..FakeHost::default()
        }
    }

    fn listener_for(host: &Arc<FakeHost>, config: TeardownConfig) -> TeardownListener {
        TeardownListener::new(HostPorts {
            items: host.clone(),
            libraries: host.clone(),
            queue: host.clone(),
            config: Arc::new(config),
        })
    }

    #[test]
    fn disabled_branch_job_dispatches_to_fallback() {
        let host = Arc::new(host_with_fallback());
        let listener = listener_for(&host, TeardownConfig::default());

        let outcome = listener
            .process(&disabled_branch_job(), EventId::new_random())
            .unwrap();

        assert_eq!(
            outcome,
            EventOutcome::Dispatched {
                target: TeardownTarget {
                    name: name(FALLBACK_TEARDOWN_JOB),
                    source: TargetSource::Fallback,
                },
                build: BuildNumber::new(1),
            }
        );
        let enqueued = host.enqueued();
        assert_eq!(enqueued.len(), 1);
        assert_eq!(enqueued[0].parameter("git_url"), Some(REPO));
        assert_eq!(enqueued[0].parameter("branch_name"), Some("feature"));
    }

    #[test]
    fn enabled_job_is_not_eligible_and_enqueues_nothing() {
        let host = Arc::new(host_with_fallback());
        let listener = listener_for(&host, TeardownConfig::default());
        let item = Item::Job(branch_job("p", "feature", REPO));

        let outcome = listener.process(&item, EventId::new_random()).unwrap();

        assert_eq!(outcome, EventOutcome::NotEligible);
        assert!(host.enqueued().is_empty());
    }

    #[test]
    fn library_only_remote_is_skipped() {
        let mut host = host_with_fallback();
        host.libraries = vec![git_library("shared", REPO)];
        let host = Arc::new(host);
        let listener = listener_for(&host, TeardownConfig::default());

        let outcome = listener
            .process(&disabled_branch_job(), EventId::new_random())
            .unwrap();

        assert_eq!(
            outcome,
            EventOutcome::Skipped {
                reason: SkipReason::NoRemote
            }
        );
        assert!(host.enqueued().is_empty());
    }

    #[test]
    fn missing_branch_blocks_dispatch() {
        let host = Arc::new(FakeHost {
            items: vec![job_item(FALLBACK_TEARDOWN_JOB)],
            ..FakeHost::default()
        });
        let listener = listener_for(&host, TeardownConfig::default());

        let outcome = listener
            .process(&disabled_branch_job(), EventId::new_random())
            .unwrap();

        assert_eq!(
            outcome,
            EventOutcome::Skipped {
                reason: SkipReason::NoBranch
            }
        );
        assert!(host.enqueued().is_empty());
    }

    #[test]
    fn missing_target_is_skipped() {
        let host = Arc::new(FakeHost {
            items: vec![Item::MultiBranch(multi_branch("p", &[("feature", "p/feature")]))],
            ..FakeHost::default()
        });
        let listener = listener_for(&host, TeardownConfig::default());

        let outcome = listener
            .process(&disabled_branch_job(), EventId::new_random())
            .unwrap();

        assert_eq!(
            outcome,
            EventOutcome::Skipped {
                reason: SkipReason::NoTarget
            }
        );
    }

    #[test]
    fn repeated_updates_while_disabled_dispatch_each_time() {
        let host = Arc::new(host_with_fallback());
        let listener = listener_for(&host, TeardownConfig::default());
        let item = disabled_branch_job();

        listener.on_updated(&item);
        listener.on_updated(&item);

        assert_eq!(host.enqueued().len(), 2);
    }

    #[test]
    fn created_and_deleted_events_are_ignored() {
        let host = Arc::new(host_with_fallback());
        let listener = listener_for(&host, TeardownConfig::default());
        let item = disabled_branch_job();

        listener.on_event(&ItemEvent {
            kind: ItemEventKind::Created,
            item: item.clone(),
        });
        listener.on_event(&ItemEvent {
            kind: ItemEventKind::Deleted,
            item,
        });

        assert!(host.enqueued().is_empty());
    }

    #[traced_test]
    #[test]
    fn registry_failure_is_logged_not_raised() {
        let mut host = host_with_fallback();
        host.fail_lookups = true;
        let host = Arc::new(host);
        let listener = listener_for(&host, TeardownConfig::default());

        listener.on_updated(&disabled_branch_job());

        assert!(host.enqueued().is_empty());
        assert!(logs_contain("Teardown failed"));
    }

    #[traced_test]
    #[test]
    fn enqueue_failure_is_logged_not_raised() {
        let mut host = host_with_fallback();
        host.fail_enqueue = true;
        let host = Arc::new(host);
        let listener = listener_for(&host, TeardownConfig::default());

        listener.on_updated(&disabled_branch_job());

        assert!(host.enqueued().is_empty());
        assert!(logs_contain("Could not enqueue"));
    }
}
