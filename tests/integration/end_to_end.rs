//! End-to-End Integration Tests
//!
//! Complete runs from parsed command line to JSON artifacts on real
//! repositories: CLI → Config → Miner → Output.

#[path = "../common/mod.rs"]
mod common;

use clap::Parser;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use common::{nginx_role, NginxRole};
use failprone::app;
use failprone::cli::Args;
use failprone::config::{ConfigManager, Configuration};
use failprone::git::RepositoryHandle;
use failprone::mining::{CommitId, LabeledFile};
use failprone::output::{FAILURE_PRONE_FILES_FILE, FIXED_FILES_FILE, FIXING_COMMITS_FILE};

fn empty_config() -> ConfigManager {
    ConfigManager::from_config(Configuration::new())
}

fn args(role: &NginxRole, dest: &Path, extra: &[&str]) -> Args {
    let repository = role.repo.path().to_string_lossy().into_owned();
    let dest = dest.to_string_lossy().into_owned();
    let mut argv = vec!["failprone", "failure-prone-files", "-r", repository.as_str(), "-d", dest.as_str()];
    argv.extend_from_slice(extra);
    Args::try_parse_from(argv).expect("Failed to parse arguments").apply_enhanced_parsing()
}

fn read(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("Failed to read artifact")).expect("Invalid JSON")
}

fn s(oid: git2::Oid) -> String {
    oid.to_string()
}

#[test]
fn test_failure_prone_files_end_to_end() {
    let role = nginx_role();
    let dest = TempDir::new().unwrap();

    let artifacts = app::run_mining(&args(&role, dest.path(), &[]), &empty_config()).unwrap();
    assert_eq!(artifacts.len(), 3);

    assert_eq!(
        read(&dest.path().join(FIXING_COMMITS_FILE)),
        json!([s(role.c2), s(role.c5)])
    );

    // Both episodes are reported under the file's newest name
    assert_eq!(
        read(&dest.path().join(FIXED_FILES_FILE)),
        json!([
            {"filepath": "tasks/web.yml", "fic": s(role.c5), "bic": s(role.c3)},
            {"filepath": "tasks/web.yml", "fic": s(role.c2), "bic": s(role.c1)},
        ])
    );

    // Revisions carry the file's name at each commit
    assert_eq!(
        read(&dest.path().join(FAILURE_PRONE_FILES_FILE)),
        json!([
            {"filepath": "tasks/main.yml", "commit": s(role.c4), "label": "failure-prone", "fixing_commit": s(role.c5)},
            {"filepath": "tasks/main.yml", "commit": s(role.c3), "label": "failure-prone", "fixing_commit": s(role.c5)},
            {"filepath": "tasks/main.yml", "commit": s(role.c1), "label": "failure-prone", "fixing_commit": s(role.c2)},
        ])
    );
}

#[test]
fn test_fixing_commits_phase_writes_one_artifact() {
    let role = nginx_role();
    let dest = TempDir::new().unwrap();
    let repository = role.repo.path().to_string_lossy().into_owned();
    let dest_arg = dest.path().to_string_lossy().into_owned();

    let args = Args::try_parse_from(["failprone", "fixing-commits", "-r", repository.as_str(), "-d", dest_arg.as_str()]).unwrap();
    let artifacts = app::run_mining(&args, &empty_config()).unwrap();

    assert_eq!(artifacts, vec![dest.path().join(FIXING_COMMITS_FILE)]);
    assert!(!dest.path().join(FIXED_FILES_FILE).exists());
    assert!(!dest.path().join(FAILURE_PRONE_FILES_FILE).exists());
}

#[test]
fn test_excluded_commit_removes_its_episode() {
    let role = nginx_role();
    let lists = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    let exclude = lists.path().join("exclude.json");
    fs::write(&exclude, json!([s(role.c2)]).to_string()).unwrap();
    let exclude_arg = exclude.to_string_lossy().into_owned();

    app::run_mining(&args(&role, dest.path(), &["--exclude-commits", exclude_arg.as_str()]), &empty_config()).unwrap();

    assert_eq!(read(&dest.path().join(FIXING_COMMITS_FILE)), json!([s(role.c5)]));
    assert_eq!(
        read(&dest.path().join(FAILURE_PRONE_FILES_FILE)),
        json!([
            {"filepath": "tasks/main.yml", "commit": s(role.c4), "label": "failure-prone", "fixing_commit": s(role.c5)},
            {"filepath": "tasks/main.yml", "commit": s(role.c3), "label": "failure-prone", "fixing_commit": s(role.c5)},
        ])
    );
}

#[test]
fn test_excluded_fixed_file_is_not_labeled() {
    let role = nginx_role();
    let lists = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    let exclude = lists.path().join("fixed-files.json");
    fs::write(
        &exclude,
        json!([{"filepath": "tasks/web.yml", "fic": s(role.c5), "bic": s(role.c3)}]).to_string(),
    )
    .unwrap();
    let exclude_arg = exclude.to_string_lossy().into_owned();

    app::run_mining(&args(&role, dest.path(), &["--exclude-files", exclude_arg.as_str()]), &empty_config()).unwrap();

    assert_eq!(
        read(&dest.path().join(FIXED_FILES_FILE)),
        json!([{"filepath": "tasks/web.yml", "fic": s(role.c2), "bic": s(role.c1)}])
    );
    // The walk starts at c2 and never sees the rename at c5
    assert_eq!(
        read(&dest.path().join(FAILURE_PRONE_FILES_FILE)),
        json!([
            {"filepath": "tasks/web.yml", "commit": s(role.c1), "label": "failure-prone", "fixing_commit": s(role.c2)},
        ])
    );
}

#[test]
fn test_closed_issues_add_fixing_commits() {
    let role = nginx_role();
    let lists = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    let issues = lists.path().join("issues.json");
    fs::write(
        &issues,
        json!([
            {"number": 7, "state": "closed", "labels": ["bug"], "events": [{"event": "closed", "commit_id": s(role.c3)}]},
            {"number": 8, "state": "closed", "labels": ["bug"], "events": [{"event": "closed", "commit_id": s(role.c4)}]},
            {"number": 9, "state": "open", "labels": ["bug"], "events": [{"event": "referenced", "commit_id": s(role.c1)}]},
        ])
        .to_string(),
    )
    .unwrap();
    let issues_arg = issues.to_string_lossy().into_owned();

    app::run_mining(&args(&role, dest.path(), &["--issues", issues_arg.as_str()]), &empty_config()).unwrap();

    // c4 only touches the README and is discarded
    assert_eq!(
        read(&dest.path().join(FIXING_COMMITS_FILE)),
        json!([s(role.c2), s(role.c3), s(role.c5)])
    );
    // c3 only adds lines, so it has no origin and adds no fixed file
    assert_eq!(read(&dest.path().join(FIXED_FILES_FILE)).as_array().map(Vec::len), Some(2));
}

#[test]
fn test_custom_regex_from_configuration() {
    let role = nginx_role();
    let dest = TempDir::new().unwrap();

    let config = ConfigManager::from_config(Configuration::from([(
        "mining".to_string(),
        [("regex".to_string(), "add".to_string())].into_iter().collect(),
    )]));
    let repository = role.repo.path().to_string_lossy().into_owned();
    let dest_arg = dest.path().to_string_lossy().into_owned();
    let args = Args::try_parse_from(["failprone", "fixing-commits", "-r", repository.as_str(), "-d", dest_arg.as_str()]).unwrap();

    app::run_mining(&args, &config).unwrap();
    assert_eq!(read(&dest.path().join(FIXING_COMMITS_FILE)), json!([s(role.c3)]));
}

#[test]
fn test_mining_twice_gives_same_labels() {
    let role = nginx_role();
    let handle = RepositoryHandle::open(role.repo.path()).unwrap();
    let args = args(&role, Path::new("unused"), &[]);
    let mining = app::effective_mining_config(&args, &empty_config()).unwrap();
    let mut miner = app::build_miner(&handle, &args, &mining).unwrap();

    let first: Vec<LabeledFile> = miner.mine(None, None).unwrap().collect::<Result<_, _>>().unwrap();
    let second: Vec<LabeledFile> = miner.mine(None, None).unwrap().collect::<Result<_, _>>().unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
    assert_eq!(first[0].commit, CommitId::from(role.c4));
}

#[test]
fn test_not_a_repository() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().to_string_lossy().into_owned();
    let args = Args::try_parse_from(["failprone", "fixing-commits", "-r", path.as_str(), "-d", path.as_str()]).unwrap();

    let err = app::run_mining(&args, &empty_config()).unwrap_err();
    assert!(format!("{:#}", err).contains("Not a valid git repository"));
}
