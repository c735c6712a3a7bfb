//! Commit source seam
//!
//! The mining core never talks to a version control system directly. It reads
//! commits through [`CommitSource`], which the git backend
//! ([`crate::git::GitCommitSource`]) and the in-memory replay
//! ([`super::memory::MemoryRepository`]) both implement.

use super::commit::{CommitId, ModifiedFile};
use super::error::MiningResult;

/// Read access to the commits of one branch
pub trait CommitSource {
    /// Branch name the source was opened on
    fn branch(&self) -> &str;

    /// All commit ids on the branch, oldest first
    fn commit_ids(&self) -> MiningResult<Vec<CommitId>>;

    /// Full commit message
    fn message(&self, commit: &CommitId) -> MiningResult<String>;

    /// Files touched by the commit. Merge commits report no modifications.
    fn modifications(&self, commit: &CommitId) -> MiningResult<Vec<ModifiedFile>>;
}
