//! sitecfg: inspect the effective site configuration of a repository tree
//!
//! Serves a directory through the filesystem repository and answers
//! configuration queries as JSON. `sitecfg watch` keeps the caches live and
//! reports every refresh.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Command};
use sitecfg_utils::{init_logging_with_config, LogConfig};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_config = match cli.command {
        Command::Watch => LogConfig::watcher(),
        _ => LogConfig::cli(),
    };
    if let Err(e) = init_logging_with_config(log_config) {
        eprintln!("warning: logging disabled: {}", e);
    }

    let exit_code = match commands::execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            1
        }
    };

    std::process::exit(exit_code);
}
