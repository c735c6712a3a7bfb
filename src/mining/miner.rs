//! Repository Miner
//!
//! Orchestrates the mining phases over one branch:
//!
//! 1. fixing commits from closed issues and from commit messages
//! 2. fixing files with their bug-inducing commits
//! 3. the lazy failure-prone timeline
//!
//! Each phase can be run on its own; [`RepositoryMiner::mine`] runs them all
//! from a clean state.

use log::{debug, info};
use std::collections::HashSet;

use super::blame::BlameAttributor;
use super::commit::CommitId;
use super::error::MiningResult;
use super::extractor::FixingFileExtractor;
use super::files::FixingFile;
use super::fix_finder::{default_bug_labels, IssueFixFinder, MessageFixFinder, DEFAULT_FIX_REGEX};
use super::history::CommitHistoryIndex;
use super::labeler::LabelTimeline;
use super::relevance::RelevanceFilter;
use super::source::CommitSource;

/// Caller-controlled knobs of a mining run
#[derive(Debug, Clone)]
pub struct MinerSettings {
    pub branch: String,
    /// Issue labels that mark a bug
    pub labels: HashSet<String>,
    /// Fixing-message pattern
    pub regex: String,
    /// Never treated as fixing commits
    pub exclude_commits: HashSet<CommitId>,
    /// Fixing commits known up front
    pub include_commits: Vec<CommitId>,
    /// Removed from the extracted fixing files
    pub exclude_fixing_files: Vec<FixingFile>,
}

impl Default for MinerSettings {
    fn default() -> Self {
        Self {
            branch: "master".to_string(),
            labels: default_bug_labels(),
            regex: DEFAULT_FIX_REGEX.to_string(),
            exclude_commits: HashSet::new(),
            include_commits: Vec::new(),
            exclude_fixing_files: Vec::new(),
        }
    }
}

impl MinerSettings {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            ..Self::default()
        }
    }
}

/// Mines fixing commits, fixing files and failure-prone files
pub struct RepositoryMiner {
    source: Box<dyn CommitSource>,
    relevance: Box<dyn RelevanceFilter>,
    blame: Box<dyn BlameAttributor>,
    issues: Box<dyn IssueFixFinder>,
    settings: MinerSettings,
    history: CommitHistoryIndex,
    fixing_commits: Vec<CommitId>,
    fixing_files: Vec<FixingFile>,
}

impl RepositoryMiner {
    /// Index the source's branch and seed the fixing commits with the
    /// included ones
    pub fn new(
        source: Box<dyn CommitSource>,
        relevance: Box<dyn RelevanceFilter>,
        blame: Box<dyn BlameAttributor>,
        issues: Box<dyn IssueFixFinder>,
        settings: MinerSettings,
    ) -> MiningResult<Self> {
        let history = CommitHistoryIndex::from_source(source.as_ref())?;
        let fixing_commits = history.sort_known(settings.include_commits.iter().cloned());

        Ok(Self {
            source,
            relevance,
            blame,
            issues,
            settings,
            history,
            fixing_commits,
            fixing_files: Vec::new(),
        })
    }

    pub fn history(&self) -> &CommitHistoryIndex {
        &self.history
    }

    pub fn settings(&self) -> &MinerSettings {
        &self.settings
    }

    /// Fixing commits found so far, oldest first
    pub fn fixing_commits(&self) -> &[CommitId] {
        &self.fixing_commits
    }

    /// Fixing files of the last extraction
    pub fn extracted_files(&self) -> &[FixingFile] {
        &self.fixing_files
    }

    /// Fixing commits that closed issues labelled with any of `labels`
    /// (configured labels when `None`).
    ///
    /// Returns the newly found commits after exclusion and relevance filtering.
    pub fn fixing_commits_from_closed_issues(&mut self, labels: Option<&HashSet<String>>) -> MiningResult<Vec<CommitId>> {
        let labels = labels.cloned().unwrap_or_else(|| self.settings.labels.clone());
        let candidates = self.issues.closed_issue_commits(&labels)?;
        info!("Found {} candidate fixing commits from closed issues", candidates.len());

        self.record_fixing_commits(candidates.into_iter().collect())
    }

    /// Fixing commits whose message matches `regex` (configured pattern when
    /// `None`).
    ///
    /// Returns the newly found commits after exclusion and relevance filtering.
    pub fn fixing_commits_from_commit_messages(&mut self, regex: Option<&str>) -> MiningResult<Vec<CommitId>> {
        let finder = MessageFixFinder::new(regex.unwrap_or(&self.settings.regex))?;
        let candidates = finder.find(&self.history, self.source.as_ref())?;
        info!("Found {} candidate fixing commits from commit messages", candidates.len());

        self.record_fixing_commits(candidates)
    }

    fn record_fixing_commits(&mut self, candidates: Vec<CommitId>) -> MiningResult<Vec<CommitId>> {
        let candidates: Vec<CommitId> = candidates
            .into_iter()
            .filter(|commit| !self.settings.exclude_commits.contains(commit))
            .collect();
        if candidates.is_empty() {
            return Ok(candidates);
        }

        let kept = self.discard_undesired_fixing_commits(candidates)?;
        self.fixing_commits = self
            .history
            .sort_known(self.fixing_commits.iter().chain(kept.iter()).cloned());
        debug!("{} fixing commits after merge", self.fixing_commits.len());

        Ok(kept)
    }

    /// Order candidates chronologically and drop those that modify no
    /// relevant file
    pub fn discard_undesired_fixing_commits(&self, commits: Vec<CommitId>) -> MiningResult<Vec<CommitId>> {
        let sorted = self.history.sort_known(commits);
        let mut kept = Vec::with_capacity(sorted.len());

        for commit in sorted {
            let modifications = self.source.modifications(&commit)?;
            let relevant = modifications.iter().any(|file| {
                file.new_path
                    .as_deref()
                    .map_or(false, |path| self.relevance.is_relevant(path))
            });

            if relevant {
                kept.push(commit);
            } else {
                debug!("Discarding {}: no relevant file modified", commit.short());
            }
        }

        Ok(kept)
    }

    /// Extract fixing files from the current fixing commits, minus the
    /// excluded ones
    pub fn fixing_files(&mut self) -> MiningResult<Vec<FixingFile>> {
        let extractor = FixingFileExtractor::new(
            &self.history,
            self.source.as_ref(),
            self.relevance.as_ref(),
            self.blame.as_ref(),
        );
        let mut files = extractor.extract(&self.fixing_commits)?;

        let excluded = &self.settings.exclude_fixing_files;
        files.retain(|file| !excluded.contains(file));
        info!("Identified {} fixing files", files.len());

        self.fixing_files = files.clone();
        Ok(files)
    }

    /// Lazy failure-prone timeline over the last extracted fixing files
    pub fn label(&self) -> MiningResult<LabelTimeline<'_>> {
        LabelTimeline::new(&self.history, self.source.as_ref(), &self.fixing_files)
    }

    /// Run every phase from a clean state and return the timeline
    pub fn mine(&mut self, labels: Option<&HashSet<String>>, regex: Option<&str>) -> MiningResult<LabelTimeline<'_>> {
        self.fixing_commits = self
            .history
            .sort_known(self.settings.include_commits.iter().cloned());
        self.fixing_files.clear();

        self.fixing_commits_from_closed_issues(labels)?;
        self.fixing_commits_from_commit_messages(regex)?;
        self.fixing_files()?;

        self.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mining::blame::CachedAttributor;
    use crate::mining::commit::ModifiedFile;
    use crate::mining::files::LabeledFile;
    use crate::mining::fix_finder::{IssueEvent, IssueExport, IssueRecord, NoIssueTracker};
    use crate::mining::memory::{MemoryBlame, MemoryRepository};
    use crate::mining::relevance::Language;

    fn ids(values: &[&str]) -> Vec<CommitId> {
        values.iter().map(|id| CommitId::from(*id)).collect()
    }

    fn role_repository() -> (MemoryRepository, MemoryBlame) {
        let repo = MemoryRepository::new("master")
            .commit(
                "c033",
                "Initial commit",
                vec![ModifiedFile::added("meta/main.yml"), ModifiedFile::added("tasks/main.yml")],
            )
            .commit("c723", "Fix meta dependencies", vec![ModifiedFile::modified("meta/main.yml")])
            .commit("ce3a", "Update galaxy info", vec![ModifiedFile::modified("meta/main.yml")])
            .commit("cdoc", "Add readme", vec![ModifiedFile::added("README.md")])
            .commit("cfxr", "fix typo in readme", vec![ModifiedFile::modified("README.md")])
            .commit("cbe3", "Fix task ordering", vec![ModifiedFile::modified("tasks/main.yml")])
            .commit("cf9a", "fix meta platforms", vec![ModifiedFile::modified("meta/main.yml")]);

        let blame = MemoryBlame::new()
            .attribute("c723", "meta/main.yml", &["c033"])
            .attribute("cfxr", "README.md", &["cdoc"])
            .attribute("cbe3", "tasks/main.yml", &["c033"])
            .attribute("cf9a", "meta/main.yml", &["ce3a"]);

        (repo, blame)
    }

    fn miner_with(settings: MinerSettings, issues: Box<dyn IssueFixFinder>) -> RepositoryMiner {
        let (repo, blame) = role_repository();
        RepositoryMiner::new(
            Box::new(repo),
            Box::new(Language::Ansible),
            Box::new(CachedAttributor::new(blame)),
            issues,
            settings,
        )
        .unwrap()
    }

    fn miner(settings: MinerSettings) -> RepositoryMiner {
        miner_with(settings, Box::new(NoIssueTracker))
    }

    fn fixing(path: &str, bic: &str, fic: &str) -> FixingFile {
        FixingFile::new(path, CommitId::from(bic), CommitId::from(fic))
    }

    #[test]
    fn test_fixing_commits_from_commit_messages() {
        let mut miner = miner(MinerSettings::default());
        let found = miner.fixing_commits_from_commit_messages(None).unwrap();

        // "fix typo in readme" touches no Ansible file
        assert_eq!(found, ids(&["c723", "cbe3", "cf9a"]));
        assert_eq!(miner.fixing_commits(), ids(&["c723", "cbe3", "cf9a"]).as_slice());
    }

    #[test]
    fn test_fixing_commits_with_custom_regex() {
        let mut miner = miner(MinerSettings::default());
        let found = miner.fixing_commits_from_commit_messages(Some("update")).unwrap();
        assert_eq!(found, ids(&["ce3a"]));
    }

    #[test]
    fn test_fixing_commits_with_exclude_commits() {
        let settings = MinerSettings {
            exclude_commits: ids(&["cf9a"]).into_iter().collect(),
            ..MinerSettings::default()
        };
        let mut miner = miner(settings);

        let found = miner.fixing_commits_from_commit_messages(None).unwrap();
        assert_eq!(found, ids(&["c723", "cbe3"]));
    }

    #[test]
    fn test_include_commits_seed_fixing_commits() {
        let settings = MinerSettings {
            include_commits: ids(&["ce3a", "c033"]),
            ..MinerSettings::default()
        };
        let mut miner = miner(settings);
        assert_eq!(miner.fixing_commits(), ids(&["c033", "ce3a"]).as_slice());

        miner.fixing_commits_from_commit_messages(None).unwrap();
        assert_eq!(miner.fixing_commits(), ids(&["c033", "c723", "ce3a", "cbe3", "cf9a"]).as_slice());
    }

    #[test]
    fn test_fixing_commits_from_closed_issues() {
        let export = IssueExport::new(vec![IssueRecord {
            number: 12,
            state: "closed".to_string(),
            labels: vec!["bug".to_string()],
            events: vec![
                IssueEvent {
                    event: "closed".to_string(),
                    commit_id: Some(CommitId::from("cbe3")),
                },
                IssueEvent {
                    event: "merged".to_string(),
                    commit_id: Some(CommitId::from("on-another-branch")),
                },
                IssueEvent {
                    event: "closed".to_string(),
                    commit_id: Some(CommitId::from("cfxr")),
                },
            ],
        }]);
        let mut miner = miner_with(MinerSettings::default(), Box::new(export));

        let found = miner.fixing_commits_from_closed_issues(None).unwrap();
        assert_eq!(found, ids(&["cbe3"]));

        let wrong_labels: HashSet<String> = ["enhancement".to_string()].into();
        assert!(miner.fixing_commits_from_closed_issues(Some(&wrong_labels)).unwrap().is_empty());
    }

    #[test]
    fn test_discard_undesired_fixing_commits() {
        let miner = miner(MinerSettings::default());
        let kept = miner
            .discard_undesired_fixing_commits(ids(&["cfxr", "cf9a", "cdoc", "c723"]))
            .unwrap();
        assert_eq!(kept, ids(&["c723", "cf9a"]));
    }

    #[test]
    fn test_fixing_files() {
        let mut miner = miner(MinerSettings::default());
        miner.fixing_commits_from_commit_messages(None).unwrap();
        let files = miner.fixing_files().unwrap();

        assert_eq!(
            files,
            vec![
                fixing("meta/main.yml", "ce3a", "cf9a"),
                fixing("tasks/main.yml", "c033", "cbe3"),
                fixing("meta/main.yml", "c033", "c723"),
            ]
        );
        assert_eq!(miner.extracted_files(), files.as_slice());
    }

    #[test]
    fn test_fixing_files_with_exclude_commits() {
        let settings = MinerSettings {
            exclude_commits: ids(&["cf9a"]).into_iter().collect(),
            ..MinerSettings::default()
        };
        let mut miner = miner(settings);
        miner.fixing_commits_from_commit_messages(None).unwrap();

        assert_eq!(
            miner.fixing_files().unwrap(),
            vec![
                fixing("tasks/main.yml", "c033", "cbe3"),
                fixing("meta/main.yml", "c033", "c723"),
            ]
        );
    }

    #[test]
    fn test_fixing_files_with_exclude_files() {
        let settings = MinerSettings {
            exclude_fixing_files: vec![fixing("meta/main.yml", "ce3a", "cf9a")],
            ..MinerSettings::default()
        };
        let mut miner = miner(settings);
        miner.fixing_commits_from_commit_messages(None).unwrap();

        assert_eq!(
            miner.fixing_files().unwrap(),
            vec![
                fixing("tasks/main.yml", "c033", "cbe3"),
                fixing("meta/main.yml", "c033", "c723"),
            ]
        );
    }

    #[test]
    fn test_no_fixing_commits_means_no_labels() {
        let mut miner = miner(MinerSettings::default());
        let labeled: Vec<_> = miner.mine(None, Some("nothing matches this")).unwrap().collect();
        assert!(labeled.is_empty());
        assert!(miner.extracted_files().is_empty());
    }

    #[test]
    fn test_mine_labels_failure_prone_files() {
        let mut miner = miner(MinerSettings::default());
        let labeled: Vec<LabeledFile> = miner
            .mine(None, None)
            .unwrap()
            .collect::<MiningResult<_>>()
            .unwrap();

        let expected = [
            ("meta/main.yml", "cbe3", "cf9a"),
            ("meta/main.yml", "cfxr", "cf9a"),
            ("tasks/main.yml", "cfxr", "cbe3"),
            ("meta/main.yml", "cdoc", "cf9a"),
            ("tasks/main.yml", "cdoc", "cbe3"),
            ("meta/main.yml", "ce3a", "cf9a"),
            ("tasks/main.yml", "ce3a", "cbe3"),
            ("tasks/main.yml", "c723", "cbe3"),
            ("meta/main.yml", "c033", "c723"),
            ("tasks/main.yml", "c033", "cbe3"),
        ];
        let expected: Vec<LabeledFile> = expected
            .iter()
            .map(|(path, commit, fic)| LabeledFile::failure_prone(*path, CommitId::from(*commit), CommitId::from(*fic)))
            .collect();
        assert_eq!(labeled, expected);

        let episode = |path: &str, fic: &str| -> Vec<&str> {
            labeled
                .iter()
                .filter(|l| l.filepath == path && l.fixing_commit.as_str() == fic)
                .map(|l| l.commit.as_str())
                .collect()
        };
        assert_eq!(episode("meta/main.yml", "cf9a"), vec!["cbe3", "cfxr", "cdoc", "ce3a"]);
        assert_eq!(episode("tasks/main.yml", "cbe3"), vec!["cfxr", "cdoc", "ce3a", "c723", "c033"]);
        assert_eq!(episode("meta/main.yml", "c723"), vec!["c033"]);
    }

    #[test]
    fn test_mine_is_idempotent() {
        let mut miner = miner(MinerSettings::default());
        let first: Vec<LabeledFile> = miner.mine(None, None).unwrap().collect::<MiningResult<_>>().unwrap();
        let second: Vec<LabeledFile> = miner.mine(None, None).unwrap().collect::<MiningResult<_>>().unwrap();

        assert!(!first.is_empty());
        assert_eq!(first, second);
        assert_eq!(miner.fixing_commits(), ids(&["c723", "cbe3", "cf9a"]).as_slice());
    }
}
