//! JSON artifacts of the mining phases
//!
//! One file per phase in the destination directory. The same formats are read
//! back for the include/exclude lists, so a previous run's output can steer
//! the next one.

use anyhow::{Context, Result};
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::mining::{CommitId, FixingFile, LabeledFile};

pub const FIXING_COMMITS_FILE: &str = "fixing-commits.json";
pub const FIXED_FILES_FILE: &str = "fixed-files.json";
pub const FAILURE_PRONE_FILES_FILE: &str = "failure-prone-files.json";

fn write_json<T: Serialize + ?Sized>(dest: &Path, file_name: &str, value: &T) -> Result<PathBuf> {
    fs::create_dir_all(dest)
        .with_context(|| format!("Failed to create destination directory: {}", dest.display()))?;

    let path = dest.join(file_name);
    let content = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    info!("JSON created at {}", path.display());
    Ok(path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

/// Write `fixing-commits.json`: commit ids, oldest first
pub fn write_fixing_commits(dest: &Path, commits: &[CommitId]) -> Result<PathBuf> {
    write_json(dest, FIXING_COMMITS_FILE, commits)
}

/// Write `fixed-files.json`: `{filepath, fic, bic}` objects
pub fn write_fixed_files(dest: &Path, files: &[FixingFile]) -> Result<PathBuf> {
    write_json(dest, FIXED_FILES_FILE, files)
}

/// Write `failure-prone-files.json`: `{filepath, commit, label, fixing_commit}` objects
pub fn write_failure_prone_files(dest: &Path, files: &[LabeledFile]) -> Result<PathBuf> {
    write_json(dest, FAILURE_PRONE_FILES_FILE, files)
}

/// Read a JSON array of commit ids
pub fn read_commit_list(path: &Path) -> Result<Vec<CommitId>> {
    read_json(path)
}

/// Read a JSON array of fixed files
pub fn read_fixed_files(path: &Path) -> Result<Vec<FixingFile>> {
    read_json(path)
}
