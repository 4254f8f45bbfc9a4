//! Command-line entry points
//!
//! - `serve`: run the admin HTTP API
//! - `migrate`: manage the PostgreSQL schema

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Tenant registry: spaces, projects, users and API keys
#[derive(Parser)]
#[command(name = "tenant-registry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(serve::ServeArgs),

    /// Apply, revert or inspect schema migrations
    Migrate(migrate::MigrateArgs),
}

/// Load `.env`, configuration files and the environment, then start logging
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_in_memory() {
        let cli = Cli::try_parse_from(["tenant-registry", "serve", "--in-memory"]).unwrap();
        assert!(matches!(cli.command, Command::Serve(args) if args.in_memory));
    }

    #[test]
    fn test_parse_migrate_actions() {
        let cli = Cli::try_parse_from(["tenant-registry", "migrate", "down"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Migrate(migrate::MigrateArgs {
                action: migrate::MigrateAction::Down
            })
        ));

        assert!(Cli::try_parse_from(["tenant-registry", "migrate", "sideways"]).is_err());
    }
}
