//! Mining Core
//!
//! Version-control-agnostic algorithms that turn a branch history into a
//! defect-labeling dataset. Repository access, blame and issue lookups are
//! collaborators behind the [`CommitSource`], [`BlameAttributor`] and
//! [`IssueFixFinder`] traits.

pub mod blame;
pub mod commit;
pub mod error;
pub mod extractor;
pub mod files;
pub mod fix_finder;
pub mod history;
pub mod labeler;
pub mod memory;
pub mod miner;
pub mod relevance;
pub mod source;

pub use blame::{Attribution, BlameAttributor, CachedAttributor};
pub use commit::{ChangeType, CommitId, ModifiedFile};
pub use error::{MiningError, MiningResult};
pub use extractor::FixingFileExtractor;
pub use files::{FixingFile, Label, LabeledFile};
pub use fix_finder::{
    default_bug_labels, IssueExport, IssueFixFinder, MessageFixFinder, NoIssueTracker,
    BUG_RELATED_LABELS, DEFAULT_FIX_REGEX,
};
pub use history::CommitHistoryIndex;
pub use labeler::LabelTimeline;
pub use memory::{MemoryBlame, MemoryRepository};
pub use miner::{MinerSettings, RepositoryMiner};
pub use relevance::{Language, PatternFilter, RelevanceFilter};
pub use source::CommitSource;
