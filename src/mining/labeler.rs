//! Failure-prone timeline
//!
//! Walks the history backwards, from the newest fixing commit among the fixed
//! files down to the first indexed commit, and labels every revision of a fixed
//! file that lies inside its defect window `[bic, fic)`.
//!
//! Fixed files are tracked in groups keyed by their path at the commit being
//! visited. After a commit's labels are emitted, its own modifications update
//! the tracking:
//!
//! - an addition of a tracked path ends the active windows of that path;
//! - a rename moves a group whose window continues below that commit to its
//!   older name, merging with an existing group of that name. Groups waiting
//!   for an older episode keep their path.

use log::{debug, trace};
use std::collections::{HashMap, VecDeque};

use super::commit::{ChangeType, CommitId};
use super::error::{MiningError, MiningResult};
use super::files::{FixingFile, LabeledFile};
use super::history::CommitHistoryIndex;
use super::source::CommitSource;

#[derive(Debug, Clone)]
struct TrackedEntry {
    fic: CommitId,
    fic_position: usize,
    bic_position: usize,
}

impl TrackedEntry {
    fn covers(&self, position: usize) -> bool {
        self.fic_position > position && position >= self.bic_position
    }

    /// Window still has revisions older than `position`, which may be the fix itself
    fn continues_below(&self, position: usize) -> bool {
        self.fic_position >= position && position > self.bic_position
    }
}

#[derive(Debug, Clone)]
struct TrackedGroup {
    path: String,
    entries: Vec<TrackedEntry>,
}

/// Lazy sequence of failure-prone labels, newest commit first.
///
/// Each call to `next` visits at most as many commits as needed to produce
/// one label. After an error the timeline is exhausted.
pub struct LabelTimeline<'a> {
    history: &'a CommitHistoryIndex,
    source: &'a dyn CommitSource,
    groups: Vec<TrackedGroup>,
    next_position: Option<usize>,
    buffer: VecDeque<LabeledFile>,
}

impl<'a> LabelTimeline<'a> {
    /// Prepare a timeline; fails when a fixing file names a commit outside
    /// the index
    pub fn new(
        history: &'a CommitHistoryIndex,
        source: &'a dyn CommitSource,
        fixing_files: &[FixingFile],
    ) -> MiningResult<Self> {
        let mut groups: Vec<TrackedGroup> = Vec::new();
        let mut newest_fix: Option<usize> = None;

        for file in fixing_files {
            let entry = TrackedEntry {
                fic: file.fic.clone(),
                fic_position: history.position_of(&file.fic)?,
                bic_position: history.position_of(&file.bic)?,
            };
            newest_fix = newest_fix.max(Some(entry.fic_position));

            match groups.iter_mut().find(|group| group.path == file.filepath) {
                Some(group) => group.entries.push(entry),
                None => groups.push(TrackedGroup {
                    path: file.filepath.clone(),
                    entries: vec![entry],
                }),
            }
        }

        debug!(
            "Labeling {} fixing files across {} paths",
            fixing_files.len(),
            groups.len()
        );

        Ok(Self {
            history,
            source,
            groups,
            next_position: newest_fix,
            buffer: VecDeque::new(),
        })
    }

    /// Paths currently tracked, in first-appearance order
    pub fn tracked_paths(&self) -> Vec<&str> {
        self.groups.iter().map(|group| group.path.as_str()).collect()
    }

    fn visit(&mut self, position: usize) -> MiningResult<()> {
        let commit = self
            .history
            .get(position)
            .cloned()
            .ok_or_else(|| MiningError::repository(format!("No commit at position {}", position)))?;

        let buffer = &mut self.buffer;
        for TrackedGroup { path, entries } in self.groups.iter_mut() {
            entries.retain(|entry| {
                if entry.covers(position) {
                    buffer.push_back(LabeledFile::failure_prone(
                        path.clone(),
                        commit.clone(),
                        entry.fic.clone(),
                    ));
                }
                position != entry.bic_position
            });
        }
        self.groups.retain(|group| !group.entries.is_empty());

        if self.groups.is_empty() {
            return Ok(());
        }

        let mut renamed_to: HashMap<usize, String> = HashMap::new();
        for file in self.source.modifications(&commit)? {
            let Some(new_path) = file.new_path.as_deref() else {
                continue;
            };
            let Some(index) = self.groups.iter().position(|group| group.path == new_path) else {
                continue;
            };

            match file.change_type {
                ChangeType::Added => {
                    trace!("{} added at {}", new_path, commit.short());
                    self.groups[index]
                        .entries
                        .retain(|entry| entry.fic_position <= position);
                }
                ChangeType::Renamed => {
                    let live = self.groups[index]
                        .entries
                        .iter()
                        .any(|entry| entry.continues_below(position));
                    if !live {
                        trace!("{} renamed at {} outside its windows", new_path, commit.short());
                        continue;
                    }
                    if let Some(old_path) = file.old_path {
                        trace!("{} was {} before {}", new_path, old_path, commit.short());
                        renamed_to.insert(index, old_path);
                    }
                }
                _ => {}
            }
        }

        if !renamed_to.is_empty() {
            let mut regrouped: Vec<TrackedGroup> = Vec::with_capacity(self.groups.len());
            for (index, mut group) in self.groups.drain(..).enumerate() {
                if let Some(old_path) = renamed_to.remove(&index) {
                    group.path = old_path;
                }
                match regrouped.iter_mut().find(|existing| existing.path == group.path) {
                    Some(existing) => existing.entries.extend(group.entries),
                    None => regrouped.push(group),
                }
            }
            self.groups = regrouped;
        }
        self.groups.retain(|group| !group.entries.is_empty());

        Ok(())
    }
}

impl Iterator for LabelTimeline<'_> {
    type Item = MiningResult<LabeledFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(labeled) = self.buffer.pop_front() {
                return Some(Ok(labeled));
            }

            if self.groups.is_empty() {
                self.next_position = None;
            }
            let position = self.next_position?;
            self.next_position = position.checked_sub(1);

            if let Err(e) = self.visit(position) {
                self.next_position = None;
                self.groups.clear();
                return Some(Err(e));
            }
        }
    }
}
