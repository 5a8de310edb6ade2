//! Command-line interface.

pub mod serve;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use toneshift::config::Config;

#[derive(Parser, Debug)]
#[command(name = "toneshift", version, about = "Formality rewriting API with undo/redo history")]
pub struct Cli {
    /// Path to a JSON config file (default: ~/.toneshift/config.json if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API (default)
    Serve {
        /// Override the bind address
        #[arg(long)]
        bind: Option<String>,
        /// Override the listen port
        #[arg(long)]
        port: Option<u16>,
        /// Use the in-process store instead of Redis
        #[arg(long)]
        memory_store: bool,
    },
    /// Print the effective configuration (API key redacted)
    Config,
}

/// Dispatch the parsed command.
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Some(Commands::Config) => {
            println!("{}", config.to_redacted_json()?);
            Ok(())
        }
        Some(Commands::Serve {
            bind,
            port,
            memory_store,
        }) => serve::cmd_serve(config, bind, port, memory_store).await,
        None => serve::cmd_serve(config, None, None, false).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::parse_from([
            "toneshift",
            "--log-json",
            "serve",
            "--port",
            "8080",
            "--memory-store",
        ]);
        assert!(cli.log_json);
        match cli.command {
            Some(Commands::Serve {
                port, memory_store, ..
            }) => {
                assert_eq!(port, Some(8080));
                assert!(memory_store);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::parse_from(["toneshift"]);
        assert!(cli.command.is_none());
    }
}
