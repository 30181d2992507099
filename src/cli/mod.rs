//! CLI module for Research Crew
//!
//! Provides commands:
//! - `serve`: Start the web server (default)
//! - `run`: Run the crew once for a goal
//! - `check`: Validate configuration and credentials

use crate::server::config::AppConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod check;
pub mod run;

/// Research Crew CLI
#[derive(Parser, Debug)]
#[command(name = "research-crew")]
#[command(about = "Research, write and code with a three-agent crew")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server (default)
    Serve,
    /// Run the crew once and print the result
    Run {
        /// Research goal, e.g. "AI trends 2026"
        #[arg(short, long)]
        goal: String,
        /// Also write the result to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate configuration without network calls
    Check,
}

/// Run the CLI command
pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Run { goal, output }) => run::run(&config, &goal, output).await,
        Some(Commands::Check) => check::run(&config),
        Some(Commands::Serve) | None => crate::server::run(config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "research-crew",
            "run",
            "--goal",
            "AI trends 2026",
            "--output",
            "out.txt",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Run { goal, output }) => {
                assert_eq!(goal, "AI trends 2026");
                assert_eq!(output, Some(PathBuf::from("out.txt")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_no_subcommand_serves() {
        let cli = Cli::try_parse_from(["research-crew"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_requires_goal() {
        assert!(Cli::try_parse_from(["research-crew", "run"]).is_err());
    }
}
