use clap::{ArgAction, Parser, ValueEnum};
use anyhow::Result;
use std::path::PathBuf;
use log::{debug, info};

use super::enhanced_parser::EnhancedParser;
use crate::mining::Language;

/// Information to mine; every phase also writes the artifacts of the phases before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum InfoType {
    /// Commits that fix a defect
    FixingCommits,
    /// Files changed by fixing commits, with their bug-inducing commits
    FixedFiles,
    /// Snapshots of files inside a defect window
    FailureProneFiles,
}

impl InfoType {
    pub fn name(&self) -> &'static str {
        match self {
            InfoType::FixingCommits => "fixing-commits",
            InfoType::FixedFiles => "fixed-files",
            InfoType::FailureProneFiles => "failure-prone-files",
        }
    }
}

/// Failure-prone file miner for infrastructure-as-code repositories
#[derive(Parser, Debug)]
#[command(name = "failprone")]
#[command(about = "Mine fixing commits, fixed files and failure-prone files from a git repository")]
#[command(version)]
pub struct Args {
    /// Information to mine
    #[arg(value_enum, value_name = "INFO")]
    pub info: InfoType,

    /// Path to git repository (defaults to current directory if it's a git repository)
    #[arg(short = 'r', long = "repository", alias = "repo", value_name = "PATH")]
    pub repository: Option<String>,

    /// Destination directory for the JSON artifacts
    #[arg(short = 'd', long = "dest", value_name = "DIR", default_value = ".")]
    pub dest: PathBuf,

    /// Artifact language: ansible or tosca
    #[arg(short = 'l', long = "language", value_name = "LANG")]
    pub language: Option<String>,

    /// Branch to mine (defaults to the repository's current branch)
    #[arg(short = 'b', long = "branch", value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Issue labels marking a bug - supports comma-separated values
    #[arg(long = "labels", value_name = "LABEL", action = ArgAction::Append)]
    pub labels: Vec<String>,

    /// Pattern a fixing commit message starts with
    #[arg(long = "regex", value_name = "REGEX")]
    pub regex: Option<String>,

    /// JSON export of the repository's issues
    #[arg(long = "issues", value_name = "FILE")]
    pub issues: Option<PathBuf>,

    /// JSON array of commits never considered fixing
    #[arg(long = "exclude-commits", value_name = "FILE")]
    pub exclude_commits: Option<PathBuf>,

    /// JSON array of commits always considered fixing
    #[arg(long = "include-commits", value_name = "FILE")]
    pub include_commits: Option<PathBuf>,

    /// JSON array of fixed files to drop from the results
    #[arg(long = "exclude-files", value_name = "FILE")]
    pub exclude_files: Option<PathBuf>,

    /// Verbose output (debug level logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (error level logging only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug output (trace level logging)
    #[arg(long)]
    pub debug: bool,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log file path for file output
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level for file output (independent of console level)
    #[arg(long, value_name = "LEVEL")]
    pub log_file_level: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Configuration section name
    #[arg(long, value_name = "SECTION")]
    pub config_name: Option<String>,

    /// Worker threads for message matching
    #[arg(long = "max-threads", value_name = "N")]
    pub max_threads: Option<usize>,
}

impl Args {
    /// Apply enhanced parsing to vector fields that support comma-separated values
    pub fn apply_enhanced_parsing(mut self) -> Self {
        self.labels = EnhancedParser::parse_list(self.labels);
        self
    }
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    debug!("Parsing command line arguments");
    let args = Args::parse().apply_enhanced_parsing();
    debug!("Parsed CLI arguments with enhanced parsing: {:?}", args);
    args
}

/// Validate CLI argument combinations
pub fn validate_args(args: &Args) -> Result<()> {
    debug!("Validating CLI argument combinations");

    let log_flags_count = [args.verbose, args.quiet, args.debug]
        .iter()
        .filter(|&&flag| flag)
        .count();

    if log_flags_count > 1 {
        return Err(anyhow::anyhow!(
            "Conflicting log level flags: only one of --verbose, --quiet, or --debug may be specified"
        ));
    }

    match args.log_format.to_lowercase().as_str() {
        "text" | "json" => {},
        _ => return Err(anyhow::anyhow!(
            "Invalid log format '{}'. Valid options: text, json", args.log_format
        )),
    }

    if let Some(ref level) = args.log_file_level {
        match level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {},
            _ => return Err(anyhow::anyhow!(
                "Invalid log file level '{}'. Valid levels: error, warn, info, debug, trace", level
            )),
        }
    }

    if args.log_file_level.is_some() && args.log_file.is_none() {
        return Err(anyhow::anyhow!(
            "--log-file-level requires --log-file to be specified"
        ));
    }

    if let Some(ref language) = args.language {
        language.parse::<Language>().map_err(|e| anyhow::anyhow!(e))?;
    }

    if let Some(ref regex) = args.regex {
        regex::Regex::new(regex)
            .map_err(|e| anyhow::anyhow!("Invalid regex '{}': {}", regex, e))?;
    }

    if args.max_threads == Some(0) {
        return Err(anyhow::anyhow!("--max-threads must be greater than 0"));
    }

    info!("CLI arguments validated successfully");
    Ok(())
}

#[cfg(test)]
pub(crate) fn create_test_args() -> Args {
    Args {
        info: InfoType::FixingCommits,
        repository: None,
        dest: PathBuf::from("."),
        language: None,
        branch: None,
        labels: Vec::new(),
        regex: None,
        issues: None,
        exclude_commits: None,
        include_commits: None,
        exclude_files: None,
        verbose: false,
        quiet: false,
        debug: false,
        log_format: "text".to_string(),
        log_file: None,
        log_file_level: None,
        config_file: None,
        config_name: None,
        max_threads: None,
    }
}
