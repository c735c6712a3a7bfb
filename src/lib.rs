//! Failure-prone file mining for infrastructure-as-code repositories
//!
//! [`mining`] holds the history algorithms behind collaborator traits,
//! [`git`] implements those traits with git2, and the remaining modules make
//! up the `failprone` command line tool.

pub mod app;
pub mod cli;
pub mod config;
pub mod git;
pub mod logging;
pub mod mining;
pub mod output;
