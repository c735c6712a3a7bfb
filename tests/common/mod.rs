//! Scratch git repositories for integration tests

#![allow(dead_code)]

use git2::{Commit, Oid, Repository, Signature, Time};
use std::cell::Cell;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A linear-history repository in a temporary directory, one minute between commits
pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
    clock: Cell<i64>,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let repo = Repository::init(dir.path()).expect("Failed to init test repository");
        repo.set_head("refs/heads/master").expect("Failed to point HEAD at master");

        Self {
            dir,
            repo,
            clock: Cell::new(1_600_000_000),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn signature(&self) -> Signature<'static> {
        let now = self.clock.get() + 60;
        self.clock.set(now);
        Signature::new("Dev", "dev@example.com", &Time::new(now, 0)).expect("Failed to build signature")
    }

    fn head_commit(&self) -> Option<Commit<'_>> {
        self.repo.head().ok().and_then(|head| head.peel_to_commit().ok())
    }

    /// Write (`Some`) or delete (`None`) files, then commit on HEAD
    pub fn commit(&self, message: &str, files: &[(&str, Option<&str>)]) -> Oid {
        let mut index = self.repo.index().expect("Failed to open index");
        for (path, content) in files {
            let full_path = self.path().join(path);
            match content {
                Some(content) => {
                    if let Some(parent) = full_path.parent() {
                        fs::create_dir_all(parent).expect("Failed to create directories");
                    }
                    fs::write(&full_path, content).expect("Failed to write file");
                    index.add_path(Path::new(path)).expect("Failed to stage file");
                }
                None => {
                    fs::remove_file(&full_path).expect("Failed to delete file");
                    index.remove_path(Path::new(path)).expect("Failed to unstage file");
                }
            }
        }
        self.commit_index(&mut index, message)
    }

    /// Move a file, optionally rewriting its content, then commit on HEAD
    pub fn rename(&self, message: &str, from: &str, to: &str, content: Option<&str>) -> Oid {
        let mut index = self.repo.index().expect("Failed to open index");
        let to_path = self.path().join(to);
        if let Some(parent) = to_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directories");
        }
        fs::rename(self.path().join(from), &to_path).expect("Failed to move file");
        if let Some(content) = content {
            fs::write(&to_path, content).expect("Failed to write file");
        }
        index.remove_path(Path::new(from)).expect("Failed to unstage file");
        index.add_path(Path::new(to)).expect("Failed to stage file");
        self.commit_index(&mut index, message)
    }

    fn commit_index(&self, index: &mut git2::Index, message: &str) -> Oid {
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
        let signature = self.signature();

        let parent = self.head_commit();
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .expect("Failed to commit")
    }

    /// Commit a side change off `base` and merge it into HEAD without touching the tree
    pub fn merge_side_commit(&self, base: Oid, path: &str, content: &str, message: &str) -> (Oid, Oid) {
        let base_commit = self.repo.find_commit(base).expect("Failed to find base commit");
        let blob = self.repo.blob(content.as_bytes()).expect("Failed to write blob");

        let mut builder = self.repo.treebuilder(None).expect("Failed to create tree builder");
        builder.insert(path, blob, 0o100644).expect("Failed to insert blob");
        let side_tree = self.repo.find_tree(builder.write().expect("Failed to write tree")).expect("Failed to find tree");

        let signature = self.signature();
        let side = self
            .repo
            .commit(None, &signature, &signature, "Side change", &side_tree, &[&base_commit])
            .expect("Failed to commit side change");
        let side_commit = self.repo.find_commit(side).expect("Failed to find side commit");

        let head = self.head_commit().expect("HEAD has no commit");
        let head_tree = head.tree().expect("Failed to read HEAD tree");
        let signature = self.signature();
        let merge = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &head_tree, &[&head, &side_commit])
            .expect("Failed to commit merge");

        (side, merge)
    }
}

pub const TASKS_V1: &str = "\
- name: install nginx
  apt:
    name: nginx
    state: present
- name: start nginx
  service:
    name: nginx
    state: started
";

pub const TASKS_V2: &str = "\
- name: install nginx
  apt:
    name: nginx
    state: present
- name: start nginx
  service:
    name: nginx
    state: restarted
";

pub const TASKS_V3: &str = "\
- name: install nginx
  apt:
    name: nginx
    state: present
- name: start nginx
  service:
    name: nginx
    state: restarted
- name: deploy site config
  template:
    src: site.conf.j2
    dest: /etc/nginx/site.conf
";

pub const TASKS_V4: &str = "\
- name: install nginx
  apt:
    name: nginx
    state: present
- name: start nginx
  service:
    name: nginx
    state: restarted
- name: deploy site config
  template:
    src: site.conf.j2
    dest: /etc/nginx/conf.d/site.conf
";

pub const META: &str = "\
galaxy_info:
  author: dev
  min_ansible_version: 2.9
";

/// Commits of [`nginx_role`]
pub struct NginxRole {
    pub repo: TestRepo,
    /// Initial role
    pub c1: Oid,
    /// Fixes the service state written in c1
    pub c2: Oid,
    /// Adds the template task
    pub c3: Oid,
    /// README only
    pub c4: Oid,
    /// Moves the tasks to tasks/web.yml and fixes the destination written in c3
    pub c5: Oid,
}

/// A role with two disjoint defect episodes on the same file, the second
/// fixed while renaming it
pub fn nginx_role() -> NginxRole {
    let repo = TestRepo::new();
    let c1 = repo.commit(
        "Initial role",
        &[
            ("tasks/main.yml", Some(TASKS_V1)),
            ("meta/main.yml", Some(META)),
            ("README.md", Some("nginx role\n")),
        ],
    );
    let c2 = repo.commit("fix nginx restart", &[("tasks/main.yml", Some(TASKS_V2))]);
    let c3 = repo.commit("Add template task", &[("tasks/main.yml", Some(TASKS_V3))]);
    let c4 = repo.commit("Update README", &[("README.md", Some("nginx role\n\nServes a site.\n"))]);
    let c5 = repo.rename(
        "Fix template destination and move tasks",
        "tasks/main.yml",
        "tasks/web.yml",
        Some(TASKS_V4),
    );

    NginxRole { repo, c1, c2, c3, c4, c5 }
}
