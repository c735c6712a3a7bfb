//! Fixing files and labeled files

use serde::{Deserialize, Serialize};
use std::fmt;

use super::commit::CommitId;

/// A file modified by a fixing commit, together with the commit that
/// introduced the defect it fixed.
///
/// `filepath` is the newest name the extraction saw for the file, which is
/// its name at the newest fix of the run. Several entries can share a
/// `filepath` when a file went through temporally disjoint defect episodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixingFile {
    pub filepath: String,
    pub fic: CommitId,
    pub bic: CommitId,
}

impl FixingFile {
    pub fn new(filepath: impl Into<String>, bic: CommitId, fic: CommitId) -> Self {
        Self {
            filepath: filepath.into(),
            fic,
            bic,
        }
    }
}

impl fmt::Display for FixingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (bic {}, fic {})", self.filepath, self.bic.short(), self.fic.short())
    }
}

/// Label assigned to a historical file revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "failure-prone")]
    FailureProne,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::FailureProne => f.write_str("failure-prone"),
        }
    }
}

/// One historical revision of a file known, in hindsight, to contain the
/// defect later fixed by `fixing_commit`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabeledFile {
    /// Path of the file as of `commit`
    pub filepath: String,
    pub commit: CommitId,
    pub label: Label,
    pub fixing_commit: CommitId,
}

impl LabeledFile {
    pub fn failure_prone(filepath: impl Into<String>, commit: CommitId, fixing_commit: CommitId) -> Self {
        Self {
            filepath: filepath.into(),
            commit,
            label: Label::FailureProne,
            fixing_commit,
        }
    }
}
