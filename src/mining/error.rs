//! Mining Error Types
//!
//! Error types shared by the mining core and its collaborators.

use thiserror::Error;
use super::commit::CommitId;

/// Errors that can occur while mining a repository
#[derive(Debug, Error)]
pub enum MiningError {
    /// A commit referenced during ordering is not part of the indexed branch
    #[error("Unknown commit: {0} is not part of the indexed branch")]
    UnknownCommit(CommitId),

    /// Repository access error
    #[error("Repository error: {0}")]
    Repository(String),

    /// Issue tracker collaborator failure
    #[error("Issue tracker error: {0}")]
    IssueTracker(String),

    /// Blame attribution failure for one modified file
    #[error("Blame failed for {path} at {commit}: {message}")]
    Blame {
        commit: CommitId,
        path: String,
        message: String,
    },

    /// Fixing-message pattern does not compile
    #[error("Invalid fixing-commit pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Wrapped errors from other sources
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MiningError {
    /// Create a repository error
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Create an issue tracker error
    pub fn issue_tracker(msg: impl Into<String>) -> Self {
        Self::IssueTracker(msg.into())
    }

    /// Create a blame error for a commit and path
    pub fn blame(commit: &CommitId, path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Blame {
            commit: commit.clone(),
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn unknown_commit(commit: &CommitId) -> Self {
        Self::UnknownCommit(commit.clone())
    }
}

impl From<git2::Error> for MiningError {
    fn from(error: git2::Error) -> Self {
        Self::Repository(error.message().to_string())
    }
}

/// Result type for mining operations
pub type MiningResult<T> = Result<T, MiningError>;
