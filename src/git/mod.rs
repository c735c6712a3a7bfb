//! Git backend
//!
//! Repository discovery and the git2 implementations of the mining
//! collaborators: [`GitCommitSource`] walks a branch, [`GitBlameAttributor`]
//! blames the lines a fix removed.

mod blame;
mod walker;

pub use blame::GitBlameAttributor;
pub use walker::GitCommitSource;

use anyhow::{Context, Result};
use git2::Repository;
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Check if the given path is a git repository
pub fn is_git_repository<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    debug!("Checking if path is git repository: {}", path.display());

    match Repository::open(path) {
        Ok(_) => true,
        Err(e) => {
            debug!("Not a git repository at {}: {}", path.display(), e);
            false
        }
    }
}

/// Shared, read-only handle on an opened repository
#[derive(Clone)]
pub struct RepositoryHandle {
    repository: Arc<Repository>,
    path: PathBuf,
}

impl RepositoryHandle {
    /// Open a repository from a path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = validate_git_repository_handle(path)?;
        Ok(Self::from_repository(repo))
    }

    /// Create a handle from an existing Repository
    pub fn from_repository(repository: Repository) -> Self {
        let path = repository
            .workdir()
            .unwrap_or_else(|| repository.path())
            .to_path_buf();

        Self {
            repository: Arc::new(repository),
            path,
        }
    }

    /// Repository path as a string
    pub fn path(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.repository.workdir()
    }

    pub fn is_bare(&self) -> bool {
        self.repository.is_bare()
    }

    /// Name of the branch HEAD points to, if any
    pub fn current_branch(&self) -> Option<String> {
        let head = self.repository.head().ok()?;
        if !head.is_branch() {
            return None;
        }
        head.shorthand().map(|name| name.to_string())
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }
}

/// Validate that the given path is an accessible git repository
pub fn validate_git_repository_handle<P: AsRef<Path>>(path: P) -> Result<Repository> {
    let path = path.as_ref();
    debug!("Validating git repository at: {}", path.display());

    if !path.exists() {
        error!("Path does not exist: {}", path.display());
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    let repo = Repository::open(path)
        .with_context(|| format!("Failed to open repository at: {}", path.display()))?;

    if repo.is_bare() {
        debug!("Repository is bare: {}", path.display());
    }

    Ok(repo)
}

/// Resolve the repository to mine; defaults to the current directory
pub fn resolve_repository_handle(repository_arg: Option<String>) -> Result<RepositoryHandle> {
    match repository_arg {
        Some(path) => {
            debug!("Repository path provided: {}", path);
            let repo = validate_git_repository_handle(&path)?;
            Ok(RepositoryHandle::from_repository(repo))
        }
        None => {
            let current_dir = std::env::current_dir().context("Failed to get current directory")?;

            let repo = Repository::open(&current_dir).with_context(|| {
                format!(
                    "Current directory '{}' is not a git repository. Please run this command from within a git repository or specify a repository path.",
                    current_dir.display()
                )
            })?;

            info!("Using current directory as git repository: {}", current_dir.display());
            Ok(RepositoryHandle::from_repository(repo))
        }
    }
}
