//! In-memory commit history
//!
//! A [`CommitSource`] and [`BlameAttributor`] pair backed by plain vectors.
//! Useful for replaying a history exported from another system and for
//! exercising the traversals without a git repository on disk.

use std::collections::{HashMap, HashSet};

use super::blame::{Attribution, BlameAttributor};
use super::commit::{CommitId, ModifiedFile};
use super::error::{MiningError, MiningResult};
use super::source::CommitSource;

#[derive(Debug, Clone)]
struct MemoryCommit {
    id: CommitId,
    message: String,
    modifications: Vec<ModifiedFile>,
}

/// Linear history held in memory, oldest commit first
#[derive(Debug, Clone)]
pub struct MemoryRepository {
    branch: String,
    commits: Vec<MemoryCommit>,
    lookup: HashMap<CommitId, usize>,
}

impl MemoryRepository {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            commits: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Append a commit newer than every commit already added
    pub fn commit(mut self, id: &str, message: &str, modifications: Vec<ModifiedFile>) -> Self {
        let id = CommitId::from(id);
        self.lookup.insert(id.clone(), self.commits.len());
        self.commits.push(MemoryCommit {
            id,
            message: message.to_string(),
            modifications,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    fn find(&self, commit: &CommitId) -> MiningResult<&MemoryCommit> {
        self.lookup
            .get(commit)
            .map(|&index| &self.commits[index])
            .ok_or_else(|| MiningError::repository(format!("Commit {} not found", commit)))
    }
}

impl CommitSource for MemoryRepository {
    fn branch(&self) -> &str {
        &self.branch
    }

    fn commit_ids(&self) -> MiningResult<Vec<CommitId>> {
        Ok(self.commits.iter().map(|c| c.id.clone()).collect())
    }

    fn message(&self, commit: &CommitId) -> MiningResult<String> {
        Ok(self.find(commit)?.message.clone())
    }

    fn modifications(&self, commit: &CommitId) -> MiningResult<Vec<ModifiedFile>> {
        Ok(self.find(commit)?.modifications.clone())
    }
}

/// Fixed blame answers keyed by (fixing commit, path after the fix)
#[derive(Debug, Clone, Default)]
pub struct MemoryBlame {
    answers: HashMap<(CommitId, String), HashSet<CommitId>>,
}

impl MemoryBlame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that the lines `commit` changed in `path` were last touched by `origins`
    pub fn attribute(mut self, commit: &str, path: &str, origins: &[&str]) -> Self {
        self.answers
            .entry((CommitId::from(commit), path.to_string()))
            .or_default()
            .extend(origins.iter().map(|origin| CommitId::from(*origin)));
        self
    }
}

impl BlameAttributor for MemoryBlame {
    fn last_touched_by(&self, commit: &CommitId, file: &ModifiedFile) -> MiningResult<Attribution> {
        let mut attribution = Attribution::new();
        if let Some(path) = &file.new_path {
            if let Some(origins) = self.answers.get(&(commit.clone(), path.clone())) {
                attribution.insert(path.clone(), origins.clone());
            }
        }
        Ok(attribution)
    }
}
