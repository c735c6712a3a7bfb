//! Mining run: settings, collaborators and the cumulative phases

use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::cli::{Args, InfoType};
use crate::config::{ConfigManager, MiningConfig};
use crate::git::{GitBlameAttributor, GitCommitSource, RepositoryHandle};
use crate::mining::{
    CachedAttributor, IssueExport, IssueFixFinder, LabeledFile, Language, MinerSettings, NoIssueTracker,
    RepositoryMiner,
};
use crate::output;

use super::repository::{resolve_branch, resolve_repository};

/// Mining configuration with command line values applied over the configuration file
pub fn effective_mining_config(args: &Args, config: &ConfigManager) -> Result<MiningConfig> {
    let mut mining = config.get_mining_config()?;

    if let Some(language) = &args.language {
        mining.language = language.parse::<Language>().map_err(|e: String| anyhow::anyhow!(e))?;
    }
    if !args.labels.is_empty() {
        mining.labels = args.labels.iter().cloned().collect();
    }
    if let Some(regex) = &args.regex {
        mining.regex = regex.clone();
    }
    if let Some(max_threads) = args.max_threads {
        mining.max_threads = max_threads;
    }
    if args.branch.is_some() {
        mining.branch = args.branch.clone();
    }

    mining.validate()?;
    Ok(mining)
}

/// Settings for the miner, reading the include/exclude lists named on the command line
pub fn build_settings(args: &Args, mining: &MiningConfig, branch: String) -> Result<MinerSettings> {
    let mut settings = MinerSettings::new(branch);
    settings.labels = mining.labels.clone();
    settings.regex = mining.regex.clone();

    if let Some(path) = &args.exclude_commits {
        settings.exclude_commits = output::read_commit_list(path)?.into_iter().collect::<HashSet<_>>();
        debug!("Excluding {} commits", settings.exclude_commits.len());
    }
    if let Some(path) = &args.include_commits {
        settings.include_commits = output::read_commit_list(path)?;
        debug!("Including {} commits", settings.include_commits.len());
    }
    if let Some(path) = &args.exclude_files {
        settings.exclude_fixing_files = output::read_fixed_files(path)?;
        debug!("Excluding {} fixed files", settings.exclude_fixing_files.len());
    }

    Ok(settings)
}

/// Wire the git backend into a miner
pub fn build_miner(handle: &RepositoryHandle, args: &Args, mining: &MiningConfig) -> Result<RepositoryMiner> {
    let branch = resolve_branch(handle, args.branch.as_deref(), mining.branch.as_deref());
    let settings = build_settings(args, mining, branch.clone())?;

    let source = GitCommitSource::new(handle.clone(), branch)?;
    let blame = CachedAttributor::new(GitBlameAttributor::new(handle.clone()));
    let issues: Box<dyn IssueFixFinder> = match &args.issues {
        Some(path) => Box::new(IssueExport::load(path)?),
        None => Box::new(NoIssueTracker),
    };

    let miner = RepositoryMiner::new(
        Box::new(source),
        Box::new(mining.language),
        Box::new(blame),
        issues,
        settings,
    )?;

    info!(
        "Indexed {} commits of branch '{}' ({} files)",
        miner.history().len(),
        miner.settings().branch,
        mining.language.name()
    );
    Ok(miner)
}

/// Run every phase up to `info`, writing one artifact per phase
pub fn mine_phases(miner: &mut RepositoryMiner, info: InfoType, dest: &std::path::Path) -> Result<Vec<PathBuf>> {
    let mut artifacts = Vec::new();

    miner.fixing_commits_from_closed_issues(None)?;
    miner.fixing_commits_from_commit_messages(None)?;
    info!("Found {} fixing commits", miner.fixing_commits().len());
    artifacts.push(output::write_fixing_commits(dest, miner.fixing_commits())?);

    if info == InfoType::FixingCommits {
        return Ok(artifacts);
    }

    let fixing_files = miner.fixing_files()?;
    info!("Found {} fixed files", fixing_files.len());
    artifacts.push(output::write_fixed_files(dest, &fixing_files)?);

    if info == InfoType::FixedFiles {
        return Ok(artifacts);
    }

    let labeled = miner
        .label()?
        .collect::<Result<Vec<LabeledFile>, _>>()
        .context("Labeling failure-prone files failed")?;
    info!("Found {} failure-prone files", labeled.len());
    artifacts.push(output::write_failure_prone_files(dest, &labeled)?);

    Ok(artifacts)
}

/// Full run for the parsed command line
pub fn run_mining(args: &Args, config: &ConfigManager) -> Result<Vec<PathBuf>> {
    let mining = effective_mining_config(args, config)?;

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(mining.max_threads)
        .build_global()
    {
        debug!("Worker pool already configured: {}", e);
    }

    let handle = resolve_repository(args.repository.clone())?;
    let mut miner = build_miner(&handle, args, &mining)?;

    info!("Mining {}", args.info.name());
    mine_phases(&mut miner, args.info, &args.dest)
}
