//! Test fixtures: item builders and a recording fake host.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::ports::{BuildQueue, ItemRegistry, LibraryRegistry};
use crate::{
    BranchName, BuildNumber, ContainerKind, DispatchRequest, HostError, Item, ItemHandle,
    ItemName, JobItem, JobShape, LibraryRetriever, LibrarySource, MultiBranchContainer,
    ParentRef, RemoteUrl, ScmBinding,
};

pub fn name(value: &str) -> ItemName {
    ItemName::new(value).unwrap()
}

pub fn remote(value: &str) -> RemoteUrl {
    RemoteUrl::new(value).unwrap()
}

/// An enabled, top-level pipeline job with one Git binding per remote.
pub fn pipeline_job(job_name: &str, remotes: &[&str]) -> JobItem {
    JobItem {
        name: name(job_name),
        shape: JobShape::Pipeline {
            scms: remotes.iter().map(|r| ScmBinding::git([remote(r)])).collect(),
        },
        disabled: false,
        parent: None,
        teardown_job: None,
        last_build: None,
    }
}

/// An enabled pipeline job projected as `<container>/<branch>`.
pub fn branch_job(container: &str, branch: &str, repo: &str) -> JobItem {
    let mut job = pipeline_job(&format!("{container}/{branch}"), &[repo]);
    job.parent = Some(ParentRef {
        name: name(container),
        kind: ContainerKind::MultiBranch,
    });
    job
}

/// A registered job usable as a teardown target.
pub fn job_item(job_name: &str) -> Item {
    Item::Job(pipeline_job(job_name, &[]))
}

pub fn multi_branch(container: &str, branches: &[(&str, &str)]) -> MultiBranchContainer {
    MultiBranchContainer {
        name: name(container),
        branches: branches
            .iter()
            .map(|(branch, job)| (BranchName::new(*branch).unwrap(), name(job)))
            .collect::<BTreeMap<_, _>>(),
    }
}

pub fn git_library(library: &str, url: &str) -> LibrarySource {
    LibrarySource {
        name: library.to_string(),
        retriever: LibraryRetriever::Scm {
            scm: Some(ScmBinding::git([remote(url)])),
        },
    }
}

/// In-memory host that records every accepted enqueue.
#[derive(Debug, Default)]
pub struct FakeHost {
    pub items: Vec<Item>,
    pub libraries: Vec<LibrarySource>,
    pub fail_lookups: bool,
    pub fail_enqueue: bool,
    pub enqueued: Mutex<Vec<DispatchRequest>>,
}

impl FakeHost {
    pub fn enqueued(&self) -> Vec<DispatchRequest> {
        self.enqueued.lock().unwrap().clone()
    }

    fn lookup_failure(&self, what: &str) -> HostError {
        HostError::Lookup {
            what: what.to_string(),
            message: "registry offline".to_string(),
        }
    }
}

impl ItemRegistry for FakeHost {
    fn lookup(&self, item: &ItemName) -> Result<Option<ItemHandle>, HostError> {
        if self.fail_lookups {
            return Err(self.lookup_failure(item.as_str()));
        }
        Ok(self.items.iter().find(|i| i.name() == item).map(Item::handle))
    }

    fn multi_branch_container(
        &self,
        container: &ItemName,
    ) -> Result<Option<MultiBranchContainer>, HostError> {
        if self.fail_lookups {
            return Err(self.lookup_failure(container.as_str()));
        }
        Ok(self.items.iter().find_map(|i| match i {
            Item::MultiBranch(c) if &c.name == container => Some(c.clone()),
            _ => None,
        }))
    }
}

impl LibraryRegistry for FakeHost {
    fn global_libraries(&self) -> Result<Vec<LibrarySource>, HostError> {
        if self.fail_lookups {
            return Err(self.lookup_failure("global libraries"));
        }
        Ok(self.libraries.clone())
    }
}

impl BuildQueue for FakeHost {
    fn enqueue(&self, request: &DispatchRequest) -> Result<BuildNumber, HostError> {
        if self.fail_enqueue {
            return Err(HostError::Enqueue {
                target: request.target.clone(),
                message: "queue rejected the build".to_string(),
            });
        }
        let mut enqueued = self.enqueued.lock().unwrap();
        enqueued.push(request.clone());
        Ok(BuildNumber::new(enqueued.len() as u64))
    }
}
