//! Fixing-commit discovery
//!
//! Two independent sources of fixing commits:
//!
//! - **Issues**: commits that closed or merged an issue carrying a bug label,
//!   provided by an [`IssueFixFinder`] collaborator
//! - **Messages**: commits whose message matches a fixing pattern, decided by
//!   [`MessageFixFinder`]
//!
//! Both produce unordered candidate sets; the miner orders them through the
//! commit history index and filters them for relevance.

use log::{debug, info};
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::commit::CommitId;
use super::error::{MiningError, MiningResult};
use super::history::CommitHistoryIndex;
use super::source::CommitSource;

/// Issue labels that commonly mark a bug across trackers
pub const BUG_RELATED_LABELS: &[&str] = &[
    "bug",
    "Bug",
    "bug :bug:",
    "Bug - Medium",
    "Bug - Low",
    "Bug - Critical",
    "ansible_bug",
    "Type: Bug",
    "Type: bug",
    "Type/Bug",
    "type: bug 🐛",
    "type:bug",
    "type: bug",
    "type/bug",
    "kind/bug",
    "kind/bugs",
    "bug/bugfix",
    "bugfix",
    "critical-bug",
    "01 type: bug",
    "bug_report",
    "minor-bug",
];

/// Default pattern for fixing-commit messages
pub const DEFAULT_FIX_REGEX: &str = r"(bug|fix|error|crash|problem|fail|defect|patch)";

/// Leading words ending in "bug"/"fix" that are not fixes ("debugs", "prefixe")
const FALSE_POSITIVE_PREFIX: &str = r"(?i)^(\w+(bug|fix)\w)*";

/// Default label vocabulary as an owned set
pub fn default_bug_labels() -> HashSet<String> {
    BUG_RELATED_LABELS.iter().map(|label| label.to_string()).collect()
}

/// Source of commits that closed bug-labelled issues
pub trait IssueFixFinder {
    /// Commit ids attached to close/merge events of closed issues carrying any of `labels`
    fn closed_issue_commits(&self, labels: &HashSet<String>) -> MiningResult<HashSet<CommitId>>;
}

impl<I: IssueFixFinder + ?Sized> IssueFixFinder for Box<I> {
    fn closed_issue_commits(&self, labels: &HashSet<String>) -> MiningResult<HashSet<CommitId>> {
        (**self).closed_issue_commits(labels)
    }
}

/// Issue finder for repositories without a tracker
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIssueTracker;

impl IssueFixFinder for NoIssueTracker {
    fn closed_issue_commits(&self, _labels: &HashSet<String>) -> MiningResult<HashSet<CommitId>> {
        Ok(HashSet::new())
    }
}

/// One event on an exported issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueEvent {
    pub event: String,
    #[serde(default)]
    pub commit_id: Option<CommitId>,
}

/// One exported issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRecord {
    pub number: u64,
    pub state: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub events: Vec<IssueEvent>,
}

impl IssueRecord {
    fn is_closed(&self) -> bool {
        self.state.eq_ignore_ascii_case("closed")
    }
}

/// Issue finder backed by a JSON export of the tracker's issues
#[derive(Debug, Clone, Default)]
pub struct IssueExport {
    issues: Vec<IssueRecord>,
}

impl IssueExport {
    pub fn new(issues: Vec<IssueRecord>) -> Self {
        Self { issues }
    }

    /// Load an export: a JSON array of issues with their labels and events
    pub fn load(path: &Path) -> MiningResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MiningError::issue_tracker(format!("Failed to read issue export {}: {}", path.display(), e))
        })?;
        let issues: Vec<IssueRecord> = serde_json::from_str(&content).map_err(|e| {
            MiningError::issue_tracker(format!("Failed to parse issue export {}: {}", path.display(), e))
        })?;
        info!("Loaded {} issues from {}", issues.len(), path.display());
        Ok(Self::new(issues))
    }

    /// Labels that occur anywhere in the export
    pub fn labels(&self) -> HashSet<String> {
        self.issues
            .iter()
            .flat_map(|issue| issue.labels.iter().cloned())
            .collect()
    }
}

impl IssueFixFinder for IssueExport {
    fn closed_issue_commits(&self, labels: &HashSet<String>) -> MiningResult<HashSet<CommitId>> {
        // Only query labels the tracker actually uses
        let available = self.labels();
        let wanted: HashSet<&String> = labels.intersection(&available).collect();
        debug!("Querying closed issues for labels: {:?}", wanted);

        let mut commits = HashSet::new();
        for issue in self.issues.iter().filter(|issue| issue.is_closed()) {
            if !issue.labels.iter().any(|label| wanted.contains(label)) {
                continue;
            }

            for event in &issue.events {
                let kind = event.event.to_lowercase();
                if kind != "closed" && kind != "merged" {
                    continue;
                }
                if let Some(commit) = &event.commit_id {
                    commits.insert(commit.clone());
                }
            }
        }

        Ok(commits)
    }
}

/// Matches commit messages against a fixing pattern
#[derive(Debug, Clone)]
pub struct MessageFixFinder {
    false_positives: Regex,
    pattern: Regex,
}

impl MessageFixFinder {
    /// Compile a finder; the pattern is matched case-insensitively at the
    /// start of the cleaned message
    pub fn new(regex: &str) -> MiningResult<Self> {
        Ok(Self {
            false_positives: Regex::new(FALSE_POSITIVE_PREFIX)?,
            pattern: Regex::new(&format!("(?i)^(?:{})", regex))?,
        })
    }

    /// Remove the leading run of "...bug?"/"...fix?" words, wherever it reoccurs
    pub fn clean_message(&self, message: &str) -> String {
        match self.false_positives.find(message) {
            Some(prefix) if !prefix.as_str().is_empty() => message.replace(prefix.as_str(), ""),
            _ => message.to_string(),
        }
    }

    pub fn is_fixing_message(&self, message: &str) -> bool {
        self.pattern.is_match(&self.clean_message(message))
    }

    /// Fixing commits among every commit of the index, in chronological order.
    ///
    /// Messages are read sequentially and matched in parallel.
    pub fn find(&self, history: &CommitHistoryIndex, source: &dyn CommitSource) -> MiningResult<Vec<CommitId>> {
        let messages = history
            .iter()
            .map(|commit| source.message(commit).map(|message| (commit.clone(), message)))
            .collect::<MiningResult<Vec<_>>>()?;

        let matches: Vec<CommitId> = messages
            .par_iter()
            .filter(|(_, message)| self.is_fixing_message(message))
            .map(|(commit, _)| commit.clone())
            .collect();

        debug!("{} of {} commit messages match the fixing pattern", matches.len(), messages.len());
        Ok(history.sort_known(matches))
    }
}
