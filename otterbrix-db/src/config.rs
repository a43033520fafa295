//! Cleaner configuration.
//!
//! Built-in defaults, or loaded from environment variables (and a `.env` file
//! when present).

use crate::error::ConfigError;
use std::env;
use std::fmt;
use std::str::FromStr;

/// Strategy selector variable.
pub const MODE_VAR: &str = "OTTERBRIX_CLEAN_MODE";
/// Comma-separated schema list variable.
pub const SCHEMAS_VAR: &str = "OTTERBRIX_CLEAN_SCHEMAS";
/// Comma-separated list of tables `Truncate` leaves alone, each either a
/// bare name (any cleaned schema) or `schema.table`.
pub const EXCLUDE_VAR: &str = "OTTERBRIX_CLEAN_EXCLUDE";

/// Bookkeeping table written by `sqlx migrate`.
pub const MIGRATIONS_TABLE: &str = "_sqlx_migrations";

// =============================================================================
// Configuration
// =============================================================================

/// How the database is brought back to a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanMode {
    /// Drop every relation, user type and routine in the target schemas.
    #[default]
    Drop,
    /// Empty every table but keep the schema.
    Truncate,
}

/// Cleaner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanerConfig {
    /// Cleaning strategy
    pub mode: CleanMode,
    /// Schemas whose objects are cleaned
    pub schemas: Vec<String>,
    /// Tables kept intact by `Truncate`.
    ///
    /// A bare name matches that table in every cleaned schema; a
    /// `schema.table` entry matches only there.
    pub excluded_tables: Vec<String>,
}

impl CleanerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, falling back to
    /// defaults for missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let mode = match lookup(MODE_VAR) {
            Some(raw) => raw.parse()?,
            None => defaults.mode,
        };

        let schemas = match lookup(SCHEMAS_VAR) {
            Some(raw) => {
                let schemas = split_list(&raw);
                if schemas.is_empty() {
                    return Err(ConfigError::empty(SCHEMAS_VAR));
                }
                schemas
            },
            None => defaults.schemas,
        };

        // An empty exclusion list is legitimate: truncate everything.
        let excluded_tables = lookup(EXCLUDE_VAR)
            .map(|raw| split_list(&raw))
            .unwrap_or(defaults.excluded_tables);

        Ok(Self {
            mode,
            schemas,
            excluded_tables,
        })
    }

    /// Replace the strategy.
    pub fn with_mode(mut self, mode: CleanMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace the target schemas.
    pub fn with_schemas<I, S>(mut self, schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schemas = schemas.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `Truncate` must skip `schema.table`.
    pub fn is_excluded(&self, schema: &str, table: &str) -> bool {
        self.excluded_tables.iter().any(|entry| match entry.split_once('.') {
            Some((s, t)) => s == schema && t == table,
            None => entry == table,
        })
    }
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            mode: CleanMode::Drop,
            schemas: vec!["public".to_string()],
            excluded_tables: vec![MIGRATIONS_TABLE.to_string()],
        }
    }
}

impl FromStr for CleanMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drop" => Ok(CleanMode::Drop),
            "truncate" => Ok(CleanMode::Truncate),
            _ => Err(ConfigError::invalid(MODE_VAR, s, "drop, truncate")),
        }
    }
}

impl fmt::Display for CleanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanMode::Drop => write!(f, "drop"),
            CleanMode::Truncate => write!(f, "truncate"),
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
