//! Output artifacts

pub mod reports;

pub use reports::{
    read_commit_list,
    read_fixed_files,
    write_failure_prone_files,
    write_fixed_files,
    write_fixing_commits,
    FAILURE_PRONE_FILES_FILE,
    FIXED_FILES_FILE,
    FIXING_COMMITS_FILE,
};
