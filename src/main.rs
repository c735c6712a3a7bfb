use anyhow::Result;
use std::process;
use log::{error, info};

use failprone::{app, cli, logging};

fn main() {
    if let Err(e) = run() {
        let error_msg = e.to_string();

        // User errors go to stderr only
        let is_user_error = error_msg.contains("Not a valid git repository")
            || error_msg.contains("is not a git repository")
            || error_msg.contains("Path does not exist")
            || error_msg.contains("Cannot resolve branch");

        if is_user_error {
            eprintln!("{:#}", e);
        } else {
            error!("Application error: {:#}", e);
            eprintln!("Error: {:#}", e);
        }

        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::args::parse_args();

    cli::args::validate_args(&args)?;

    let config_manager = app::load_configuration(&args)?;

    let log_config = app::configure_logging(&args, &config_manager)?;
    logging::init_logger(log_config)?;

    let artifacts = app::run_mining(&args, &config_manager)?;
    info!("Mining finished, {} artifacts written", artifacts.len());

    Ok(())
}
