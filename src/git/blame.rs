//! Blame on the pre-image of a fix
//!
//! The lines a fix deleted or rewrote are blamed in the fix's first parent,
//! at the file's path before the fix. Blank and comment-only lines carry no
//! defect and are ignored.

use git2::{BlameOptions, DiffLine, Oid};
use log::trace;
use std::collections::HashSet;
use std::path::Path;

use super::RepositoryHandle;
use crate::mining::blame::{Attribution, BlameAttributor};
use crate::mining::commit::{CommitId, ModifiedFile};
use crate::mining::error::{MiningError, MiningResult};

const COMMENT_PREFIXES: &[&str] = &["//", "#", "/*", "'''", "\"\"\"", "*"];

/// Whether a removed line could have carried the defect
fn is_meaningful_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !COMMENT_PREFIXES.iter().any(|prefix| trimmed.starts_with(prefix))
}

/// git2-backed [`BlameAttributor`]
pub struct GitBlameAttributor {
    handle: RepositoryHandle,
}

impl GitBlameAttributor {
    pub fn new(handle: RepositoryHandle) -> Self {
        Self { handle }
    }

    /// Line numbers (1-based, in the parent's version) of the meaningful
    /// lines the fix removed from `old_path`
    fn deleted_lines(&self, fix: &git2::Commit<'_>, old_path: &str, new_path: &str) -> Result<Vec<usize>, git2::Error> {
        let repo = self.handle.repository();
        let old_blob = repo.find_blob(fix.parent(0)?.tree()?.get_path(Path::new(old_path))?.id())?;
        let new_blob = repo.find_blob(fix.tree()?.get_path(Path::new(new_path))?.id())?;

        let mut deleted = Vec::new();
        repo.diff_blobs(
            Some(&old_blob),
            Some(old_path),
            Some(&new_blob),
            Some(new_path),
            None,
            None,
            None,
            None,
            Some(&mut |_delta, _hunk, line: DiffLine<'_>| {
                if line.origin() == '-' {
                    if let Some(lineno) = line.old_lineno() {
                        if is_meaningful_line(&String::from_utf8_lossy(line.content())) {
                            deleted.push(lineno as usize);
                        }
                    }
                }
                true
            }),
        )?;

        Ok(deleted)
    }
}

impl BlameAttributor for GitBlameAttributor {
    fn last_touched_by(&self, commit: &CommitId, file: &ModifiedFile) -> MiningResult<Attribution> {
        let mut attribution = Attribution::new();
        let (Some(old_path), Some(new_path)) = (file.old_path.as_deref(), file.new_path.as_deref()) else {
            return Ok(attribution);
        };

        let repo = self.handle.repository();
        let fix = repo.find_commit(Oid::from_str(commit.as_str())?)?;
        if fix.parent_count() == 0 {
            return Ok(attribution);
        }
        let parent = fix.parent_id(0)?;

        let to_blame_error = |e: git2::Error| MiningError::blame(commit, old_path, e.message());
        let deleted = self.deleted_lines(&fix, old_path, new_path).map_err(to_blame_error)?;
        if deleted.is_empty() {
            trace!("No meaningful lines removed from {} at {}", old_path, commit.short());
            return Ok(attribution);
        }

        let mut options = BlameOptions::new();
        options.newest_commit(parent);
        let blame = repo
            .blame_file(Path::new(old_path), Some(&mut options))
            .map_err(to_blame_error)?;

        let origins: HashSet<CommitId> = deleted
            .into_iter()
            .filter_map(|lineno| blame.get_line(lineno))
            .map(|hunk| CommitId::from(hunk.final_commit_id()))
            .collect();

        trace!("{} at {} last touched by {} commits", new_path, commit.short(), origins.len());
        attribution.insert(new_path.to_string(), origins);
        Ok(attribution)
    }
}
