//! Repository and branch resolution

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;

use crate::git::{self, RepositoryHandle};

/// Branch mined when neither the command line, the configuration nor HEAD names one
pub const DEFAULT_BRANCH: &str = "master";

/// Open the repository named on the command line, or the current directory
pub fn resolve_repository(repository_arg: Option<String>) -> Result<RepositoryHandle> {
    let repository_arg = repository_arg.map(|path| expand_home(&path).to_string_lossy().into_owned());
    let handle = git::resolve_repository_handle(repository_arg)
        .context("Not a valid git repository")?;

    info!("Mining repository at {}", handle.path());
    Ok(handle)
}

/// Branch to mine: command line, then configuration, then the checked-out branch
pub fn resolve_branch(
    handle: &RepositoryHandle,
    cli_branch: Option<&str>,
    config_branch: Option<&str>,
) -> String {
    if let Some(branch) = cli_branch.or(config_branch) {
        return branch.to_string();
    }

    match handle.current_branch() {
        Some(branch) => {
            debug!("Using checked-out branch '{}'", branch);
            branch
        }
        None => {
            debug!("HEAD is detached or unborn, using '{}'", DEFAULT_BRANCH);
            DEFAULT_BRANCH.to_string()
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
