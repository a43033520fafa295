//! Cleaner port.
//!
//! A cleaner resets whatever a database handle points at to a known baseline.
//! Implementations decide what "clean" means (drop, truncate, rollback);
//! callers only rely on the success/failure outcome.

use async_trait::async_trait;

/// Capability that resets the database behind a handle of type `H`.
///
/// Implementations:
/// - `PgDatabaseCleaner` - PostgreSQL pools (feature `postgres`)
/// - `RecordingCleaner` - test double in `otterbrix-testkit`
#[async_trait]
pub trait DatabaseCleaner<H: ?Sized + Sync>: Send + Sync {
    /// Failure reported by the cleaner or the driver beneath it.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reset the database reachable through `handle`.
    ///
    /// The handle is borrowed for the duration of the call and must refer to
    /// a live session. Destructive.
    async fn clean(&self, handle: &H) -> Result<(), Self::Error>;
}

