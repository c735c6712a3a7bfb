//! Branch walker
//!
//! Lists a branch's commits in date order and reports the files each commit
//! touched, with rename detection against the first parent.

use git2::{Commit, Delta, DiffFindOptions, Oid, Sort};
use log::{debug, trace};

use super::RepositoryHandle;
use crate::mining::commit::{ChangeType, CommitId, ModifiedFile};
use crate::mining::error::{MiningError, MiningResult};
use crate::mining::source::CommitSource;

/// [`CommitSource`] over one branch of a git repository
pub struct GitCommitSource {
    handle: RepositoryHandle,
    branch: String,
    tip: Oid,
}

impl GitCommitSource {
    /// Open a source on `branch`; fails if the branch does not resolve to a commit
    pub fn new(handle: RepositoryHandle, branch: impl Into<String>) -> MiningResult<Self> {
        let branch = branch.into();
        let tip = handle
            .repository()
            .resolve_reference_from_short_name(&branch)
            .and_then(|reference| reference.peel_to_commit())
            .map(|commit| commit.id())
            .map_err(|e| MiningError::repository(format!("Cannot resolve branch '{}': {}", branch, e.message())))?;

        debug!("Branch '{}' resolves to {}", branch, tip);
        Ok(Self { handle, branch, tip })
    }

    pub fn handle(&self) -> &RepositoryHandle {
        &self.handle
    }

    fn find_commit(&self, commit: &CommitId) -> MiningResult<Commit<'_>> {
        let oid = Oid::from_str(commit.as_str())?;
        Ok(self.handle.repository().find_commit(oid)?)
    }
}

fn path_string(path: Option<&std::path::Path>) -> Option<String> {
    path.map(|p| p.to_string_lossy().into_owned())
}

impl CommitSource for GitCommitSource {
    fn branch(&self) -> &str {
        &self.branch
    }

    fn commit_ids(&self) -> MiningResult<Vec<CommitId>> {
        let mut revwalk = self.handle.repository().revwalk()?;
        revwalk.push(self.tip)?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME | Sort::REVERSE)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            commits.push(CommitId::from(oid?));
        }
        Ok(commits)
    }

    fn message(&self, commit: &CommitId) -> MiningResult<String> {
        let commit = self.find_commit(commit)?;
        Ok(String::from_utf8_lossy(commit.message_bytes()).into_owned())
    }

    fn modifications(&self, commit: &CommitId) -> MiningResult<Vec<ModifiedFile>> {
        let found = self.find_commit(commit)?;
        if found.parent_count() > 1 {
            trace!("Skipping merge commit {}", commit.short());
            return Ok(Vec::new());
        }

        let repo = self.handle.repository();
        let new_tree = found.tree()?;
        let old_tree = match found.parent_count() {
            0 => None,
            _ => Some(found.parent(0)?.tree()?),
        };

        let mut diff = repo.diff_tree_to_tree(old_tree.as_ref(), Some(&new_tree), None)?;
        let mut find_options = DiffFindOptions::new();
        find_options.renames(true);
        diff.find_similar(Some(&mut find_options))?;

        let modifications = diff
            .deltas()
            .map(|delta| {
                let change_type = ChangeType::from(delta.status());
                let old_path = match delta.status() {
                    Delta::Added | Delta::Untracked => None,
                    _ => path_string(delta.old_file().path()),
                };
                let new_path = match delta.status() {
                    Delta::Deleted => None,
                    _ => path_string(delta.new_file().path()),
                };
                ModifiedFile {
                    old_path,
                    new_path,
                    change_type,
                }
            })
            .collect();

        Ok(modifications)
    }
}
