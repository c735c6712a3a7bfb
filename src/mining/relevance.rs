//! Relevance filtering
//!
//! Decides whether a path belongs to the artifact language being mined.
//! Fixing-commit candidates that touch no relevant file are discarded, and
//! only relevant files are attributed to a bug-inducing commit.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use super::error::MiningResult;

/// Path predicate used to scope mining to one artifact language
pub trait RelevanceFilter {
    fn is_relevant(&self, path: &str) -> bool;
}

impl<F> RelevanceFilter for F
where
    F: Fn(&str) -> bool,
{
    fn is_relevant(&self, path: &str) -> bool {
        self(path)
    }
}

/// Directory names that mark a YAML file as part of an Ansible project
const ANSIBLE_DIRS: &[&str] = &[
    "ansible",
    "playbooks",
    "roles",
    "tasks",
    "handlers",
    "meta",
    "defaults",
    "vars",
    "group_vars",
    "host_vars",
];

/// Built-in artifact languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ansible,
    Tosca,
}

impl Language {
    pub fn name(&self) -> &'static str {
        match self {
            Language::Ansible => "ansible",
            Language::Tosca => "tosca",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ansible" => Ok(Language::Ansible),
            "tosca" => Ok(Language::Tosca),
            _ => Err(format!("Invalid language: {}. Valid options: ansible, tosca", s)),
        }
    }
}

impl RelevanceFilter for Language {
    fn is_relevant(&self, path: &str) -> bool {
        match self {
            Language::Ansible => is_ansible_file(path),
            Language::Tosca => is_tosca_file(path),
        }
    }
}

fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// YAML file inside an Ansible directory layout, excluding test fixtures
pub fn is_ansible_file(path: &str) -> bool {
    if !matches!(extension(path).as_deref(), Some("yml") | Some("yaml")) {
        return false;
    }

    let lowered = path.to_lowercase();
    if lowered.contains("test") {
        return false;
    }

    let mut components = lowered.split('/').collect::<Vec<_>>();
    let file_name = components.pop().unwrap_or_default();

    file_name.starts_with("playbook")
        || file_name.starts_with("site.")
        || components.iter().any(|dir| ANSIBLE_DIRS.contains(dir))
}

/// TOSCA service template or archive
pub fn is_tosca_file(path: &str) -> bool {
    match extension(path).as_deref() {
        Some("tosca") | Some("csar") => true,
        Some("yml") | Some("yaml") => {
            let lowered = path.to_lowercase();
            !lowered.contains("test") && (lowered.contains("tosca") || lowered.contains("_types"))
        }
        _ => false,
    }
}

/// Relevance defined by a list of path patterns; a path is relevant when any
/// pattern matches it
#[derive(Debug, Clone)]
pub struct PatternFilter {
    patterns: Vec<Regex>,
}

impl PatternFilter {
    pub fn new<I, S>(patterns: I) -> MiningResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }
}

impl RelevanceFilter for PatternFilter {
    fn is_relevant(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(path))
    }
}
