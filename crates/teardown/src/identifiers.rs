//! Newtype domain identifiers.
//!
//! Item names, remote URLs, and branch names are all plain strings in the host
//! platform. Wrapping each in its own type keeps a [`RemoteUrl`] from being
//! passed where a [`BranchName`] is expected when the two are assembled into
//! build parameters.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Returned when a string identifier is built from a blank value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} must not be blank")]
pub struct BlankIdentifier {
    /// Name of the identifier type that rejected the value.
    pub kind: &'static str,
}

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display, AsRef<str>,
// and String conversions so deserialisation enforces the same non-blank rule.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty
            /// or consists only of whitespace.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.trim().is_empty() { None } else { Some(Self(v)) }
            }

            /// Wraps a compile-time constant known not to be blank.
            #[allow(dead_code)]
            pub(crate) fn from_static(value: &'static str) -> Self {
                debug_assert!(!value.trim().is_empty());
                Self(value.to_string())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = BlankIdentifier;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value).ok_or(BlankIdentifier { kind: stringify!($name) })
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — String-backed (host names, Git coordinates)
// ---------------------------------------------------------------------------

string_id! {
    /// Fully qualified name of an item in the host platform
    /// (e.g. `"team/service/feature"`).
    ///
    /// This is the key used by [`crate::ports::ItemRegistry::lookup`].
    ItemName
}

string_id! {
    /// A source-control remote URL, compared by exact string equality.
    ///
    /// No normalisation is applied: `https://host/repo` and
    /// `https://host/repo.git` are different remotes.
    RemoteUrl
}

string_id! {
    /// A Git branch name as displayed by a multi-branch container
    /// (e.g. `"main"`, `"feature"`).
    BranchName
}

// ---------------------------------------------------------------------------
// Identifiers — integer-backed (host-assigned)
// ---------------------------------------------------------------------------

/// A build number assigned by the host scheduler, unique per job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildNumber(u64);

impl BuildNumber {
    /// Creates a build number from a raw integer.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BuildNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers — UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies the handling of one item event.
///
/// Generated fresh for every event the listener processes; carried on the
/// tracing span and in the causation record of any build it dispatches so the
/// downstream build can be correlated with the log lines that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Generates a new random event identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
