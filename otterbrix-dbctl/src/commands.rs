//! Database maintenance subcommands.
//!
//! Provides `clean`, `status`, and `migrate`.

use anyhow::{anyhow, Result};
use sqlx::PgPool;
use std::env;
use tracing::info;

use otterbrix_db::{CleanMode, CleanerConfig, DatabaseFacadeExt, PgDatabaseCleaner, migrate, status};

pub const USAGE: &str =
    "Usage: otterbrix-dbctl <clean|status|migrate> [--mode drop|truncate] [--schema NAME]...";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Reset the database with the PostgreSQL cleaner
    Clean {
        mode: Option<CleanMode>,
        schemas: Vec<String>,
    },
    /// Report tables and row counts
    Status { schemas: Vec<String> },
    /// Apply pending migrations
    Migrate,
}

/// Parse `argv` (program name first).
///
/// Supported commands:
/// - `otterbrix-dbctl clean [--mode drop|truncate] [--schema NAME]...`
/// - `otterbrix-dbctl status [--schema NAME]...`
/// - `otterbrix-dbctl migrate`
pub fn parse_args(args: &[String]) -> Result<Command> {
    if args.len() < 2 {
        return Err(anyhow!(USAGE));
    }

    let command = args[1].as_str();
    let mut mode = None;
    let mut schemas = Vec::new();

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--mode" if command == "clean" => {
                let value = args.get(i + 1).ok_or_else(|| anyhow!("--mode requires a value"))?;
                mode = Some(value.parse::<CleanMode>()?);
                i += 2;
            },
            "--schema" if command != "migrate" => {
                let value = args.get(i + 1).ok_or_else(|| anyhow!("--schema requires a value"))?;
                schemas.push(value.clone());
                i += 2;
            },
            other => {
                return Err(anyhow!("Unknown option for {}: {}", command, other));
            },
        }
    }

    match command {
        "clean" => Ok(Command::Clean { mode, schemas }),
        "status" => Ok(Command::Status { schemas }),
        "migrate" => Ok(Command::Migrate),
        other => Err(anyhow!("Unknown command: {}. {}", other, USAGE)),
    }
}

/// Resolve cleaner configuration: environment first, flags on top.
pub fn resolve_config(
    base: CleanerConfig,
    mode: Option<CleanMode>,
    schemas: Vec<String>,
) -> CleanerConfig {
    let config = match mode {
        Some(mode) => base.with_mode(mode),
        None => base,
    };

    if schemas.is_empty() {
        config
    } else {
        config.with_schemas(schemas)
    }
}

/// Execute a command against `DATABASE_URL`.
pub async fn run(command: Command) -> Result<()> {
    let database_url = env::var("DATABASE_URL")
        .map_err(|_| anyhow!("DATABASE_URL environment variable is required"))?;

    let pool = PgPool::connect(&database_url).await?;

    match command {
        Command::Clean { mode, schemas } => {
            let config = resolve_config(CleanerConfig::from_env()?, mode, schemas);
            info!(mode = %config.mode, schemas = ?config.schemas, "Cleaning database");

            pool.ensure_clean_with(&PgDatabaseCleaner::new(config)).await?;
        },
        Command::Status { schemas } => {
            let config = resolve_config(CleanerConfig::from_env()?, None, schemas);
            let report = status(&pool, &config.schemas).await?;
            info!(tables = report.len(), "Status complete");
        },
        Command::Migrate => {
            migrate(&pool).await?;
        },
    }

    pool.close().await;
    Ok(())
}
