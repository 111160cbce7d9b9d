//! Core data types shared by the client, cache, tracker and processor.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder used for revision fields that could not be fetched.
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid repository reference {input:?}: expected \"owner/name\"")]
pub struct RepositoryRefError {
    pub input: String,
}

/// A repository identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// `owner/name`, as used in tracker records and log fields.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryRef {
    type Err = RepositoryRefError;

    /// Parse `owner/name`. Segments after the name are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut parts = trimmed.split('/').map(str::trim);

        match (parts.next(), parts.next()) {
            (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self::new(owner, name))
            }
            _ => Err(RepositoryRefError {
                input: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A revision summary as returned by the commit listing.
#[derive(Debug, Clone, PartialEq)]
pub struct RevisionSummary {
    pub sha: String,
    /// The raw listing entry, kept for callers that want more than the hash.
    pub raw: serde_json::Value,
}

/// Authorship metadata for one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub sha: String,
    pub author_name: String,
    pub author_email: String,
    pub timestamp: String,
    pub patch_url: String,
}

impl Revision {
    /// The sentinel used when metadata could not be fetched.
    #[must_use]
    pub fn unknown(sha: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            author_name: UNKNOWN.to_string(),
            author_email: UNKNOWN.to_string(),
            timestamp: UNKNOWN.to_string(),
            patch_url: String::new(),
        }
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.timestamp == UNKNOWN && self.patch_url.is_empty()
    }
}

/// One file's decoded content at one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSnapshot {
    pub repository: RepositoryRef,
    pub revision: String,
    /// Path relative to the repository root, e.g. `.github/workflows/ci.yml`.
    pub path: String,
    pub name: String,
    pub content: String,
    /// Browser URL of the file at this revision.
    pub url: String,
}

/// One line of the provenance tracker.
///
/// Field order is the on-disk key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerRecord {
    pub timestamp: String,
    pub author_name: String,
    pub author_email: String,
    pub patch_url: String,
    pub repo: String,
    pub commit: String,
    pub file_name: String,
    pub url: String,
    pub cache_path: String,
}

impl TrackerRecord {
    pub fn new(revision: &Revision, snapshot: &FileSnapshot, cache_path: &Path) -> Self {
        Self {
            timestamp: revision.timestamp.clone(),
            author_name: revision.author_name.clone(),
            author_email: revision.author_email.clone(),
            patch_url: revision.patch_url.clone(),
            repo: snapshot.repository.full_name(),
            commit: snapshot.revision.clone(),
            file_name: snapshot.name.clone(),
            url: snapshot.url.clone(),
            cache_path: cache_path.display().to_string(),
        }
    }
}
