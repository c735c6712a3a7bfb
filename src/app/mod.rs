//! Application orchestration module

pub mod initialization;
pub mod execution;
pub mod repository;

pub use repository::{resolve_branch, resolve_repository};
pub use initialization::{load_configuration, configure_logging};
pub use execution::{build_miner, effective_mining_config, mine_phases, run_mining};
