//! Commit History Index
//!
//! Immutable, date-ordered list of the commits of one branch. Every
//! "earlier/later" decision in the miner is made by comparing positions in
//! this index, never by comparing dates or ids.

use std::collections::{HashMap, HashSet};
use log::{debug, warn};

use super::commit::CommitId;
use super::error::{MiningError, MiningResult};
use super::source::CommitSource;

/// Date-ordered commit list for one branch, oldest first
#[derive(Debug, Clone, Default)]
pub struct CommitHistoryIndex {
    commits: Vec<CommitId>,
    positions: HashMap<CommitId, usize>,
}

impl CommitHistoryIndex {
    /// Build an index from commits listed oldest first
    pub fn new(commits: Vec<CommitId>) -> Self {
        let mut positions = HashMap::with_capacity(commits.len());
        for (position, commit) in commits.iter().enumerate() {
            // Keep the first position if a source lists a commit twice
            positions.entry(commit.clone()).or_insert(position);
        }

        Self { commits, positions }
    }

    /// Build the index for the branch a source was opened on
    pub fn from_source(source: &dyn CommitSource) -> MiningResult<Self> {
        let commits = source.commit_ids()?;
        debug!("Indexed {} commits on branch '{}'", commits.len(), source.branch());
        Ok(Self::new(commits))
    }

    /// Position of a commit, oldest = 0
    pub fn position_of(&self, commit: &CommitId) -> MiningResult<usize> {
        self.positions
            .get(commit)
            .copied()
            .ok_or_else(|| MiningError::unknown_commit(commit))
    }

    pub fn contains(&self, commit: &CommitId) -> bool {
        self.positions.contains_key(commit)
    }

    pub fn get(&self, position: usize) -> Option<&CommitId> {
        self.commits.get(position)
    }

    pub fn first(&self) -> Option<&CommitId> {
        self.commits.first()
    }

    pub fn last(&self) -> Option<&CommitId> {
        self.commits.last()
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CommitId> {
        self.commits.iter()
    }

    /// Inclusive slice of commits between two commits, in chronological order
    pub fn range(&self, oldest: &CommitId, newest: &CommitId) -> MiningResult<&[CommitId]> {
        let from = self.position_of(oldest)?;
        let to = self.position_of(newest)?;
        if from > to {
            return Ok(&[]);
        }
        Ok(&self.commits[from..=to])
    }

    /// Deduplicate and order commits chronologically.
    ///
    /// Commits that are not on the indexed branch are dropped: issue events
    /// can point at commits that only exist on other branches.
    pub fn sort_known<I>(&self, commits: I) -> Vec<CommitId>
    where
        I: IntoIterator<Item = CommitId>,
    {
        let mut seen = HashSet::new();
        let mut positioned: Vec<(usize, CommitId)> = Vec::new();

        for commit in commits {
            if !seen.insert(commit.clone()) {
                continue;
            }
            match self.positions.get(&commit) {
                Some(&position) => positioned.push((position, commit)),
                None => warn!("Ignoring commit {} not found on the indexed branch", commit),
            }
        }

        positioned.sort_by_key(|(position, _)| *position);
        positioned.into_iter().map(|(_, commit)| commit).collect()
    }
}
