//! Serialised host state.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use teardown::{Item, ItemName, LibrarySource};
use thiserror::Error;

/// Errors raised while loading a [`HostSnapshot`].
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Could not read host snapshot '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Host snapshot '{path}' is not valid")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Host snapshot lists item '{0}' more than once")]
    DuplicateItem(ItemName),
}

/// A point-in-time description of the host.
///
/// ```json
/// {
///   "items": [
///     { "type": "job", "name": "job-tear-down-executor",
///       "shape": { "kind": "pipeline" } }
///   ],
///   "libraries": [
///     { "name": "shared", "retriever": "scm_source",
///       "source": { "kind": "git", "remote": "https://git.example.com/shared.git" } }
///   ],
///   "next_build_numbers": { "job-tear-down-executor": 12 }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSnapshot {
    #[serde(default)]
    pub items: Vec<Item>,

    /// Globally registered shared libraries.
    #[serde(default)]
    pub libraries: Vec<LibrarySource>,

    /// Next build number per job; jobs not listed start at 1.
    #[serde(default)]
    pub next_build_numbers: BTreeMap<ItemName, u64>,
}

impl HostSnapshot {
    /// Reads a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SnapshotError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Finds an item by name.
    pub fn item(&self, name: &ItemName) -> Option<&Item> {
        self.items.iter().find(|item| item.name() == name)
    }
}
