//! Fixing File Extraction
//!
//! Turns a set of fixing commits into [`FixingFile`] records, one bug-inducing
//! commit per fixed file and defect episode.
//!
//! ## Traversal
//!
//! Commits are visited backwards, from the newest to the oldest fixing commit
//! (both inclusive), so that a file's newest name is known before its older
//! names are met:
//!
//! ```text
//! newest fix ──► ... ──► rename a→b ──► ... ──► oldest fix
//!      b.yml                 renames[a] = b         a.yml reported as b.yml
//! ```
//!
//! ## Merge rule
//!
//! When a file already has an entry, the new fix is compared with the file's
//! first entry, the one opened by its newest fix. It either opens a separate,
//! older episode (its fix predates that entry's origin) or refines that
//! entry's origin to an earlier commit.

use log::{debug, trace, warn};
use std::collections::{HashMap, HashSet};

use super::blame::BlameAttributor;
use super::commit::{ChangeType, CommitId};
use super::error::MiningResult;
use super::files::FixingFile;
use super::history::CommitHistoryIndex;
use super::relevance::RelevanceFilter;
use super::source::CommitSource;

/// Fixing file whose origin may still move to an older commit
#[derive(Debug, Clone)]
struct PendingFix {
    filepath: String,
    bic: CommitId,
    bic_position: usize,
    fic: CommitId,
    fic_position: usize,
}

impl PendingFix {
    fn finalize(self) -> FixingFile {
        FixingFile::new(self.filepath, self.bic, self.fic)
    }
}

/// What happened to a candidate fix when merged into the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeOutcome {
    Appended,
    NewEpisode,
    Refined,
    Unchanged,
}

/// Index-addressable store of pending fixes, valid for one extraction pass
#[derive(Debug, Default)]
struct FixArena {
    entries: Vec<PendingFix>,
    /// First entry appended per path, i.e. its newest episode
    first_by_path: HashMap<String, usize>,
}

impl FixArena {
    fn push(&mut self, fix: PendingFix) {
        self.first_by_path
            .entry(fix.filepath.clone())
            .or_insert(self.entries.len());
        self.entries.push(fix);
    }

    fn merge(&mut self, current: PendingFix) -> MergeOutcome {
        let Some(&index) = self.first_by_path.get(&current.filepath) else {
            self.push(current);
            return MergeOutcome::Appended;
        };

        let existing = &mut self.entries[index];
        if current.fic_position < existing.bic_position {
            self.push(current);
            MergeOutcome::NewEpisode
        } else if current.bic_position < existing.bic_position {
            existing.bic = current.bic;
            existing.bic_position = current.bic_position;
            MergeOutcome::Refined
        } else {
            MergeOutcome::Unchanged
        }
    }

    fn finalize(self) -> Vec<FixingFile> {
        self.entries.into_iter().map(PendingFix::finalize).collect()
    }
}

/// Backward traversal from fixing commits to fixing files
pub struct FixingFileExtractor<'a> {
    history: &'a CommitHistoryIndex,
    source: &'a dyn CommitSource,
    relevance: &'a dyn RelevanceFilter,
    blame: &'a dyn BlameAttributor,
}

impl<'a> FixingFileExtractor<'a> {
    pub fn new(
        history: &'a CommitHistoryIndex,
        source: &'a dyn CommitSource,
        relevance: &'a dyn RelevanceFilter,
        blame: &'a dyn BlameAttributor,
    ) -> Self {
        Self {
            history,
            source,
            relevance,
            blame,
        }
    }

    /// Extract fixing files, newest fix first
    pub fn extract(&self, fixing_commits: &[CommitId]) -> MiningResult<Vec<FixingFile>> {
        let sorted = self.history.sort_known(fixing_commits.iter().cloned());
        let (Some(oldest), Some(newest)) = (sorted.first(), sorted.last()) else {
            debug!("No fixing commits to extract files from");
            return Ok(Vec::new());
        };

        let fixing: HashSet<&CommitId> = sorted.iter().collect();
        let first_position = self.history.position_of(oldest)?;
        let range = self.history.range(oldest, newest)?;

        let mut renames: HashMap<String, String> = HashMap::new();
        let mut arena = FixArena::default();

        for (offset, commit) in range.iter().enumerate().rev() {
            let position = first_position + offset;
            let is_fixing = fixing.contains(commit);

            for file in self.source.modifications(commit)? {
                if !file.is_modify_or_rename() {
                    continue;
                }
                let Some(new_path) = file.new_path.as_deref() else {
                    continue;
                };

                if file.change_type == ChangeType::Renamed {
                    if let Some(old_path) = file.old_path.as_deref() {
                        track_rename(&mut renames, old_path, new_path, is_fixing);
                    }
                }

                if !is_fixing || !self.relevance.is_relevant(new_path) {
                    continue;
                }

                let attribution = self.blame.last_touched_by(commit, &file)?;
                let candidates = match attribution.get(new_path) {
                    Some(candidates) if !candidates.is_empty() => candidates,
                    _ => {
                        trace!("No origin found for {} at {}", new_path, commit.short());
                        continue;
                    }
                };

                let mut oldest_candidate: Option<(usize, &CommitId)> = None;
                for candidate in candidates {
                    let candidate_position = self.history.position_of(candidate)?;
                    if oldest_candidate.map_or(true, |(p, _)| candidate_position < p) {
                        oldest_candidate = Some((candidate_position, candidate));
                    }
                }
                let Some((bic_position, bic)) = oldest_candidate else {
                    continue;
                };

                if bic_position > position {
                    warn!(
                        "Ignoring origin {} of {} newer than its fix {}",
                        bic.short(),
                        new_path,
                        commit.short()
                    );
                    continue;
                }

                let filepath = renames
                    .get(new_path)
                    .cloned()
                    .unwrap_or_else(|| new_path.to_string());

                let current = PendingFix {
                    filepath,
                    bic: bic.clone(),
                    bic_position,
                    fic: commit.clone(),
                    fic_position: position,
                };
                let outcome = arena.merge(current);
                debug!("{:?}: {} fixed at {}", outcome, new_path, commit.short());
            }
        }

        let fixing_files = arena.finalize();
        debug!("Extracted {} fixing files", fixing_files.len());
        Ok(fixing_files)
    }
}

/// Record that `old_path` is an older name of a tracked file.
///
/// Names already known to the map keep pointing at the newest name, whether
/// or not the renaming commit is a fix.
fn track_rename(renames: &mut HashMap<String, String>, old_path: &str, new_path: &str, is_fixing: bool) {
    let canonical = match renames.get(new_path) {
        Some(newest) => Some(newest.clone()),
        None if renames.values().any(|newest| newest == new_path) => Some(new_path.to_string()),
        None if is_fixing => Some(new_path.to_string()),
        None => None,
    };

    if let Some(canonical) = canonical {
        trace!("Tracking {} as {}", old_path, canonical);
        renames.insert(old_path.to_string(), canonical);
    }
}
