//! Database cleaning for otterbrix functional tests.
//!
//! Resets a test database to a clean baseline before or after a test run.
//!
//! # Architecture
//!
//! - **`DatabaseCleaner`**: port for "reset the database behind this handle"
//! - **`DatabaseFacadeExt`**: `ensure_clean` / `ensure_clean_with` on handle types
//! - **`PgDatabaseCleaner`**: default cleaner for `sqlx::PgPool` (feature `postgres`)
//! - **`CleanerConfig`**: strategy and schema selection, from defaults or env
//!
//! # Usage
//!
//! ```rust,no_run
//! use otterbrix_db::DatabaseFacadeExt;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = sqlx::PgPool::connect("postgresql://...").await?;
//!
//! // Drop everything in `public` with the default cleaner
//! pool.ensure_clean().await?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

// Modules
mod cleaner;
mod config;
mod error;
mod facade;
#[cfg(feature = "postgres")]
mod postgres;

// Re-exports
pub use cleaner::DatabaseCleaner;
pub use config::{CleanMode, CleanerConfig, EXCLUDE_VAR, MIGRATIONS_TABLE, MODE_VAR, SCHEMAS_VAR};
pub use error::ConfigError;
pub use facade::DatabaseFacadeExt;
#[cfg(feature = "postgres")]
pub use postgres::{
    CatalogObject, ObjectKind, PgDatabaseCleaner, TableRef, drop_statements, list_tables, migrate,
    quote_ident, status, truncate_statement,
};
