//! Shared value types for the teardown domain.
//!
//! These types mirror the slice of the host platform's item model that the
//! teardown listener reads: jobs and their SCM bindings, the containers they
//! live in, globally registered shared libraries, and the read-only global
//! configuration. The listener never mutates any of them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BranchName, BuildNumber, EventId, ItemName, RemoteUrl};

// ---------------------------------------------------------------------------
// Source control
// ---------------------------------------------------------------------------

/// The kind of source-control system an SCM binding talks to.
///
/// Only Git remotes identify a teardown environment; everything else is kept
/// as [`ScmKind::Other`] so it can be recognised and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScmKind {
    Git,
    Other,
}

/// An SCM configuration attached to a job or a library retriever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScmBinding {
    pub kind: ScmKind,

    /// Configured remotes in declaration order. Only the first is canonical.
    #[serde(default)]
    pub remotes: Vec<RemoteUrl>,
}

impl ScmBinding {
    /// Creates a Git binding with the given remotes.
    pub fn git(remotes: impl IntoIterator<Item = RemoteUrl>) -> Self {
        Self {
            kind: ScmKind::Git,
            remotes: remotes.into_iter().collect(),
        }
    }

    /// Returns the first configured remote of a Git binding.
    ///
    /// `None` for non-Git bindings and for Git bindings with no remotes.
    pub fn canonical_remote(&self) -> Option<&RemoteUrl> {
        match self.kind {
            ScmKind::Git => self.remotes.first(),
            ScmKind::Other => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Per-shape job data. Simple jobs carry at most one SCM; pipeline jobs may
/// check out several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobShape {
    Simple {
        #[serde(default)]
        scm: Option<ScmBinding>,
    },
    Pipeline {
        #[serde(default)]
        scms: Vec<ScmBinding>,
    },
}

impl JobShape {
    /// Returns every SCM binding attached to the job, in declaration order.
    pub fn scm_bindings(&self) -> &[ScmBinding] {
        match self {
            JobShape::Simple { scm } => scm.as_slice(),
            JobShape::Pipeline { scms } => scms,
        }
    }
}

/// The kind of container an item lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    Folder,
    MultiBranch,
}

/// Reference from an item to the container that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub name: ItemName,
    pub kind: ContainerKind,
}

/// A configured job in the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobItem {
    /// Fully qualified name.
    pub name: ItemName,

    pub shape: JobShape,

    #[serde(default)]
    pub disabled: bool,

    /// `None` for top-level items.
    #[serde(default)]
    pub parent: Option<ParentRef>,

    /// Item-level teardown job override, set through a job property.
    #[serde(default)]
    pub teardown_job: Option<ItemName>,

    /// The job's most recent build, if it has ever run.
    #[serde(default)]
    pub last_build: Option<BuildNumber>,
}

impl JobItem {
    /// Returns the name of the multi-branch container holding this job, if any.
    pub fn multi_branch_parent(&self) -> Option<&ItemName> {
        self.parent
            .as_ref()
            .filter(|p| p.kind == ContainerKind::MultiBranch)
            .map(|p| &p.name)
    }
}

/// A container that projects one job per discovered source-control branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiBranchContainer {
    pub name: ItemName,

    /// Current branch projections: branch name to projected job name.
    #[serde(default)]
    pub branches: BTreeMap<BranchName, ItemName>,
}

impl MultiBranchContainer {
    /// Returns `true` if `item` is one of this container's current branch projections.
    pub fn is_branch_projection(&self, item: &ItemName) -> bool {
        self.branches.values().any(|projected| projected == item)
    }

    /// Returns the branch `item` was projected from.
    pub fn branch_for(&self, item: &ItemName) -> Option<&BranchName> {
        self.branches
            .iter()
            .find(|(_, projected)| *projected == item)
            .map(|(branch, _)| branch)
    }
}

/// Any item the host can deliver an event for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Item {
    Job(JobItem),
    Folder { name: ItemName },
    MultiBranch(MultiBranchContainer),
}

impl Item {
    /// Returns the item's fully qualified name.
    pub fn name(&self) -> &ItemName {
        match self {
            Item::Job(job) => &job.name,
            Item::Folder { name } => name,
            Item::MultiBranch(container) => &container.name,
        }
    }

    /// Returns the handle a registry lookup would yield for this item.
    pub fn handle(&self) -> ItemHandle {
        let kind = match self {
            Item::Job(_) => ItemKind::Job,
            Item::Folder { .. } => ItemKind::Folder,
            Item::MultiBranch(_) => ItemKind::MultiBranch,
        };
        ItemHandle {
            name: self.name().clone(),
            kind,
        }
    }
}

/// Coarse item classification returned by registry lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Job,
    Folder,
    MultiBranch,
}

/// The result of looking an item up by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemHandle {
    pub name: ItemName,
    pub kind: ItemKind,
}

impl ItemHandle {
    /// Only jobs can be scheduled with build parameters.
    pub fn is_parameterized(&self) -> bool {
        self.kind == ItemKind::Job
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Lifecycle transition reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemEventKind {
    Created,
    Updated,
    Deleted,
}

/// One item lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEvent {
    pub kind: ItemEventKind,
    pub item: Item,
}

impl ItemEvent {
    pub fn updated(item: Item) -> Self {
        Self {
            kind: ItemEventKind::Updated,
            item,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared libraries
// ---------------------------------------------------------------------------

/// An SCM source, as used by source-based library retrievers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScmSource {
    pub kind: ScmKind,
    pub remote: RemoteUrl,
}

/// How a shared library is fetched. The two retriever kinds expose their
/// backing remote differently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "retriever", rename_all = "snake_case")]
pub enum LibraryRetriever {
    /// A direct SCM configuration; the canonical remote of a Git binding.
    Scm {
        #[serde(default)]
        scm: Option<ScmBinding>,
    },
    /// An SCM source; the `remote` of a Git source.
    ScmSource {
        #[serde(default)]
        source: Option<ScmSource>,
    },
}

/// A globally registered shared library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySource {
    pub name: String,
    #[serde(flatten)]
    pub retriever: LibraryRetriever,
}

impl LibrarySource {
    /// Returns the Git remote backing this library, if it has one.
    pub fn backing_url(&self) -> Option<&RemoteUrl> {
        match &self.retriever {
            LibraryRetriever::Scm { scm } => scm.as_ref().and_then(ScmBinding::canonical_remote),
            LibraryRetriever::ScmSource { source } => source
                .as_ref()
                .filter(|s| s.kind == ScmKind::Git)
                .map(|s| &s.remote),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Global teardown settings, owned and persisted by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeardownConfig {
    /// Name of the job to run when an item has no override of its own.
    #[serde(default)]
    pub default_job: Option<String>,
}

impl TeardownConfig {
    pub fn with_default_job(name: impl Into<String>) -> Self {
        Self {
            default_job: Some(name.into()),
        }
    }

    /// Returns the configured default job, ignoring a blank value.
    pub fn default_job(&self) -> Option<ItemName> {
        self.default_job.as_deref().and_then(ItemName::new)
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// A named string build parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringParameter {
    pub name: String,
    pub value: String,
}

/// Links a dispatched build to the item and build that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Causation {
    pub event_id: EventId,
    pub upstream_item: ItemName,

    /// `None` when the upstream job has never been built.
    pub upstream_build: Option<BuildNumber>,

    pub recorded_at: Timestamp,
}

/// A request to run the teardown job once.
///
/// Built while handling a single event and handed to the build queue; never
/// stored by the listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub target: ItemName,
    pub parameters: Vec<StringParameter>,
    pub causation: Causation,
}

impl DispatchRequest {
    /// Parameter carrying the remote URL of the environment to tear down.
    pub const GIT_URL: &'static str = "git_url";
    /// Parameter carrying the branch name of the environment to tear down.
    pub const BRANCH_NAME: &'static str = "branch_name";

    /// Builds a teardown request carrying exactly `git_url` and `branch_name`.
    pub fn teardown(
        target: ItemName,
        remote: &RemoteUrl,
        branch: &BranchName,
        causation: Causation,
    ) -> Self {
        Self {
            target,
            parameters: vec![
                StringParameter {
                    name: Self::GIT_URL.to_string(),
                    value: remote.as_str().to_string(),
                },
                StringParameter {
                    name: Self::BRANCH_NAME.to_string(),
                    value: branch.as_str().to_string(),
                },
            ],
            causation,
        }
    }

    /// Looks up a parameter value by name.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> RemoteUrl {
        RemoteUrl::new(s).unwrap()
    }

    fn name(s: &str) -> ItemName {
        ItemName::new(s).unwrap()
    }

    #[test]
    fn canonical_remote_is_first_git_remote() {
        let binding = ScmBinding::git([url("https://a/one.git"), url("https://a/two.git")]);
        assert_eq!(binding.canonical_remote(), Some(&url("https://a/one.git")));

        let other = ScmBinding {
            kind: ScmKind::Other,
            remotes: vec![url("svn://a/trunk")],
        };
        assert_eq!(other.canonical_remote(), None);
        assert_eq!(ScmBinding::git([]).canonical_remote(), None);
    }

    #[test]
    fn simple_job_without_scm_has_no_bindings() {
        let shape = JobShape::Simple { scm: None };
        assert!(shape.scm_bindings().is_empty());
    }

    #[test]
    fn library_backing_url_handles_both_retrievers() {
        let direct = LibrarySource {
            name: "direct".into(),
            retriever: LibraryRetriever::Scm {
                scm: Some(ScmBinding::git([url("https://lib/direct.git")])),
            },
        };
        let sourced = LibrarySource {
            name: "sourced".into(),
            retriever: LibraryRetriever::ScmSource {
                source: Some(ScmSource {
                    kind: ScmKind::Git,
                    remote: url("https://lib/sourced.git"),
                }),
            },
        };
        let non_git = LibrarySource {
            name: "non-git".into(),
            retriever: LibraryRetriever::ScmSource {
                source: Some(ScmSource {
                    kind: ScmKind::Other,
                    remote: url("svn://lib/trunk"),
                }),
            },
        };

        assert_eq!(direct.backing_url(), Some(&url("https://lib/direct.git")));
        assert_eq!(sourced.backing_url(), Some(&url("https://lib/sourced.git")));
        assert_eq!(non_git.backing_url(), None);
    }

    #[test]
    fn blank_default_job_is_ignored() {
        assert_eq!(TeardownConfig::default().default_job(), None);
        assert_eq!(TeardownConfig::with_default_job("  ").default_job(), None);
        assert_eq!(
            TeardownConfig::with_default_job("global-teardown").default_job(),
            Some(name("global-teardown"))
        );
    }

    #[test]
    fn container_reports_branch_projections() {
        let container = MultiBranchContainer {
            name: name("p"),
            branches: BTreeMap::from([(BranchName::new("feature").unwrap(), name("p/feature"))]),
        };

        assert!(container.is_branch_projection(&name("p/feature")));
        assert!(!container.is_branch_projection(&name("p/main")));
        assert_eq!(
            container.branch_for(&name("p/feature")).map(BranchName::as_str),
            Some("feature")
        );
    }

    #[test]
    fn job_item_deserializes_from_host_json() {
        let item: Item = serde_json::from_value(serde_json::json!({
            "type": "job",
            "name": "p/feature",
            "disabled": true,
            "parent": { "name": "p", "kind": "multi_branch" },
            "shape": {
                "kind": "pipeline",
                "scms": [{ "kind": "git", "remotes": ["https://example.com/repo.git"] }]
            }
        }))
        .unwrap();

        let Item::Job(job) = item else {
            panic!("expected a job");
        };
        assert!(job.disabled);
        assert_eq!(job.multi_branch_parent(), Some(&name("p")));
        assert_eq!(job.shape.scm_bindings().len(), 1);
        assert_eq!(job.teardown_job, None);
    }

    #[test]
    fn library_source_deserializes_flattened_retriever() {
        let lib: LibrarySource = serde_json::from_value(serde_json::json!({
            "name": "shared",
            "retriever": "scm_source",
            "source": { "kind": "git", "remote": "https://lib/shared.git" }
        }))
        .unwrap();

        assert_eq!(lib.backing_url(), Some(&url("https://lib/shared.git")));
    }

    #[test]
    fn teardown_request_carries_exactly_two_parameters() {
        let causation = Causation {
            event_id: EventId::new_random(),
            upstream_item: name("p/feature"),
            upstream_build: Some(BuildNumber::new(3)),
            recorded_at: Timestamp::now(),
        };
        let request = DispatchRequest::teardown(
            name("job-tear-down-executor"),
            &url("https://example.com/repo.git"),
            &BranchName::new("feature").unwrap(),
            causation,
        );

        let names: Vec<_> = request.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["git_url", "branch_name"]);
        assert_eq!(
            request.parameter(DispatchRequest::GIT_URL),
            Some("https://example.com/repo.git")
        );
        assert_eq!(request.parameter(DispatchRequest::BRANCH_NAME), Some("feature"));
    }
}
