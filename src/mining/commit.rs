//! Commit and file-change value types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque commit handle.
///
/// Commits are only ever ordered through a [`CommitHistoryIndex`](super::history::CommitHistoryIndex),
/// so this type has no `Ord` implementation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for log output
    pub fn short(&self) -> &str {
        let end = self.0.char_indices().nth(8).map(|(i, _)| i).unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommitId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CommitId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<git2::Oid> for CommitId {
    fn from(oid: git2::Oid) -> Self {
        Self(oid.to_string())
    }
}

/// Type of file change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    Unknown,
}

impl From<git2::Delta> for ChangeType {
    fn from(delta: git2::Delta) -> Self {
        match delta {
            git2::Delta::Added => ChangeType::Added,
            git2::Delta::Deleted => ChangeType::Deleted,
            git2::Delta::Modified => ChangeType::Modified,
            git2::Delta::Renamed => ChangeType::Renamed,
            git2::Delta::Copied => ChangeType::Copied,
            _ => ChangeType::Unknown,
        }
    }
}

/// A file touched by a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedFile {
    /// Path before the change (`None` for additions)
    pub old_path: Option<String>,
    /// Path after the change (`None` for deletions)
    pub new_path: Option<String>,
    pub change_type: ChangeType,
}

impl ModifiedFile {
    pub fn added(path: impl Into<String>) -> Self {
        Self {
            old_path: None,
            new_path: Some(path.into()),
            change_type: ChangeType::Added,
        }
    }

    pub fn modified(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            old_path: Some(path.clone()),
            new_path: Some(path),
            change_type: ChangeType::Modified,
        }
    }

    pub fn deleted(path: impl Into<String>) -> Self {
        Self {
            old_path: Some(path.into()),
            new_path: None,
            change_type: ChangeType::Deleted,
        }
    }

    pub fn renamed(old_path: impl Into<String>, new_path: impl Into<String>) -> Self {
        Self {
            old_path: Some(old_path.into()),
            new_path: Some(new_path.into()),
            change_type: ChangeType::Renamed,
        }
    }

    /// Whether this change can carry a pre-existing defect lineage
    pub fn is_modify_or_rename(&self) -> bool {
        matches!(self.change_type, ChangeType::Modified | ChangeType::Renamed)
    }
}
