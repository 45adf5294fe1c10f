use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version number of an event within its aggregate's history.
///
/// Histories are ordered by version. The store does not require versions to
/// be contiguous.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the initial version (0).
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the first version after the initial one (1).
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version, saturating at `i64::MAX`.
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Version> for i64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// Serialized, storage-ready form of one event.
///
/// `data` is produced and interpreted only by a serializer; stores treat it
/// as opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Version of the event within its aggregate.
    pub version: Version,

    /// When the event happened.
    pub at: DateTime<Utc>,

    /// Self-describing encoded event.
    pub data: Vec<u8>,
}

impl Record {
    /// Creates a record.
    pub fn new(version: Version, at: DateTime<Utc>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            version,
            at,
            data: data.into(),
        }
    }
}

/// Ordered records of a single aggregate, oldest first.
pub type History = Vec<Record>;
