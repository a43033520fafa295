//! Test helpers for otterbrix database-backed tests.
//!
//! Provides clean-database setup, seeding helpers for the functional-test
//! schema, and a recording cleaner double.

mod helpers;
mod recording;

pub use helpers::{
    SeedCustomerOptions, count_rows, count_user_types, seed_customer, seed_customers, seed_order,
};
pub use recording::{RecordingCleaner, TestCleanError};

pub use anyhow::Result;
use otterbrix_db::DatabaseFacadeExt;
use sqlx::PgPool;

/// Setup a clean test database: reset it with the default cleaner, then run
/// migrations.
///
/// Note: migrations are located at `migrations/` relative to workspace root.
pub async fn setup_test_db(pool: &PgPool) -> Result<()> {
    pool.ensure_clean().await?;
    otterbrix_db::migrate(pool).await?;
    Ok(())
}
