//! Migrate command - manages the PostgreSQL schema

use clap::{Args, ValueEnum};
use tracing::info;

use crate::infrastructure::postgres::{migrations::Migrator, PostgresMigrator, PostgresQuerier};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    #[arg(value_enum)]
    pub action: MigrateAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Revert the latest migration
    Down,
    /// Print the current schema version
    Status,
}

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    let querier = PostgresQuerier::connect(&config.database).await?;
    let migrator = PostgresMigrator::new(querier.pool().clone());

    match args.action {
        MigrateAction::Up => {
            let applied = migrator.run().await?;
            info!(applied, "Migrations complete");
        }
        MigrateAction::Down => match migrator.revert().await? {
            Some(version) => info!(version, "Reverted migration"),
            None => info!("No migrations to revert"),
        },
        MigrateAction::Status => {
            let version = migrator.version().await?;
            match version {
                Some(version) => println!("Schema version: {}", version),
                None => println!("Schema version: none (no migrations applied)"),
            }
        }
    }

    Ok(())
}
