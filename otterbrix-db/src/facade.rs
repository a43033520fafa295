//! `ensure_clean` extension for database handles.
//!
//! Attaches the cleaning operation to handle types defined elsewhere
//! (`sqlx::PgPool` and friends) so fixtures can write
//! `pool.ensure_clean().await?` before or after a test.
//!
//! The extension only delegates. It does not log, retry, translate errors, or
//! serialize concurrent callers; any of that belongs to the cleaner or to the
//! test orchestration.

use async_trait::async_trait;

use crate::cleaner::DatabaseCleaner;

/// Extension trait adding `ensure_clean` to a database handle type.
///
/// Implementors only pick the cleaner used by [`ensure_clean`]; both methods
/// are provided.
///
/// [`ensure_clean`]: DatabaseFacadeExt::ensure_clean
#[async_trait]
pub trait DatabaseFacadeExt: Sync {
    /// Cleaner instantiated on every `ensure_clean` call.
    type DefaultCleaner: DatabaseCleaner<Self> + Default;

    /// Reset the database behind this handle with a fresh default cleaner.
    ///
    /// Calls the cleaner exactly once with `self`. The cleaner's error is
    /// returned unchanged.
    async fn ensure_clean(
        &self,
    ) -> Result<(), <Self::DefaultCleaner as DatabaseCleaner<Self>>::Error> {
        let cleaner = <Self::DefaultCleaner as Default>::default();
        cleaner.clean(self).await
    }

    /// Reset the database behind this handle with an injected cleaner.
    ///
    /// Same contract as `ensure_clean`. Accepts trait objects.
    async fn ensure_clean_with<C>(&self, cleaner: &C) -> Result<(), C::Error>
    where
        C: DatabaseCleaner<Self> + ?Sized,
    {
        cleaner.clean(self).await
    }
}
