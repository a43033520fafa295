//! Recording cleaner for testing.
//!
//! Records every invocation without touching a database, and can be armed to
//! fail so error propagation can be asserted.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use thiserror::Error;

use otterbrix_db::DatabaseCleaner;

/// Failure returned by an armed `RecordingCleaner`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Simulated clean failure: {0}")]
pub struct TestCleanError(pub String);

/// Cleaner double usable with any handle type.
#[derive(Debug, Default)]
pub struct RecordingCleaner {
    /// Number of `clean` calls
    calls: AtomicUsize,
    /// Address of the handle passed to the latest call
    last_handle: RwLock<Option<usize>>,
    /// Error message returned by every call when set
    failure: Option<String>,
}

impl RecordingCleaner {
    /// Create a cleaner that always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cleaner that records the call, then fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Number of times `clean` was invoked.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Whether the latest call received exactly this handle (same instance).
    pub fn last_called_with<H: ?Sized>(&self, handle: &H) -> bool {
        *self.last_handle.read().unwrap() == Some(address_of(handle))
    }

    /// Whether `clean` has never been invoked.
    pub fn is_untouched(&self) -> bool {
        self.call_count() == 0 && self.last_handle.read().unwrap().is_none()
    }
}

fn address_of<H: ?Sized>(handle: &H) -> usize {
    handle as *const H as *const () as usize
}

#[async_trait]
impl<H: ?Sized + Sync> DatabaseCleaner<H> for RecordingCleaner {
    type Error = TestCleanError;

    async fn clean(&self, handle: &H) -> Result<(), Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_handle.write().unwrap() = Some(address_of(handle));

        match &self.failure {
            Some(message) => Err(TestCleanError(message.clone())),
            None => Ok(()),
        }
    }
}
