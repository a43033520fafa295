//! Otterbrix test database maintenance tool
//!
//! Resets, inspects, and migrates a functional-test database outside a test
//! run.
//!
//! # Usage
//!
//! ```bash
//! # Drop everything in `public`
//! DATABASE_URL=postgresql://... cargo run -p otterbrix-dbctl -- clean
//!
//! # Empty tables but keep the schema
//! cargo run -p otterbrix-dbctl -- clean --mode truncate --schema public
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `OTTERBRIX_CLEAN_MODE`: drop or truncate (default: drop)
//! - `OTTERBRIX_CLEAN_SCHEMAS`: comma-separated schemas (default: public)
//! - `OTTERBRIX_CLEAN_EXCLUDE`: tables truncate keeps (default: _sqlx_migrations)

mod commands;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (ignore errors)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("otterbrix_db=info".parse()?)
                .add_directive("otterbrix_dbctl=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = commands::parse_args(&args)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), ?command, "otterbrix-dbctl");

    commands::run(command).await
}
