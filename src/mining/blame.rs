//! Blame attribution seam and result cache

use dashmap::DashMap;
use log::trace;
use std::collections::{HashMap, HashSet};

use super::commit::{CommitId, ModifiedFile};
use super::error::MiningResult;

/// Commits that last touched the lines a fix changed, keyed by the file's
/// path after the fix
pub type Attribution = HashMap<String, HashSet<CommitId>>;

/// Blame-equivalent attribution for the lines changed by a commit
pub trait BlameAttributor {
    fn last_touched_by(&self, commit: &CommitId, file: &ModifiedFile) -> MiningResult<Attribution>;
}

impl<A: BlameAttributor + ?Sized> BlameAttributor for Box<A> {
    fn last_touched_by(&self, commit: &CommitId, file: &ModifiedFile) -> MiningResult<Attribution> {
        (**self).last_touched_by(commit, file)
    }
}

/// Memoizes attributions by (commit, path).
///
/// Extraction runs again for every `mine()` call and every phase of the
/// command line tool; blame is by far its most expensive step.
pub struct CachedAttributor<A> {
    inner: A,
    cache: DashMap<(CommitId, String), Attribution>,
}

impl<A: BlameAttributor> CachedAttributor<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

impl<A: BlameAttributor> BlameAttributor for CachedAttributor<A> {
    fn last_touched_by(&self, commit: &CommitId, file: &ModifiedFile) -> MiningResult<Attribution> {
        let path = file
            .new_path
            .clone()
            .or_else(|| file.old_path.clone())
            .unwrap_or_default();
        let key = (commit.clone(), path);

        if let Some(hit) = self.cache.get(&key) {
            trace!("Blame cache hit for {} at {}", key.1, commit.short());
            return Ok(hit.value().clone());
        }

        let attribution = self.inner.last_touched_by(commit, file)?;
        self.cache.insert(key, attribution.clone());
        Ok(attribution)
    }
}
