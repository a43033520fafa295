//! PostgreSQL cleaner and schema lifecycle helpers.
//!
//! Provides:
//! - `PgDatabaseCleaner`, the default cleaner behind `PgPool::ensure_clean`
//! - `migrate` for the functional-test schema in `migrations/`
//! - `status` / `list_tables` for inspecting what a clean would touch
//!
//! Dynamic queries (`sqlx::query`) are used throughout so the crate compiles
//! without a `DATABASE_URL`.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Row};
use tracing::{debug, info, warn};

use crate::cleaner::DatabaseCleaner;
use crate::config::{CleanMode, CleanerConfig};
use crate::error::ConfigError;
use crate::facade::DatabaseFacadeExt;

/// Result type for lifecycle operations.
pub type Result<T> = std::result::Result<T, anyhow::Error>;

// =============================================================================
// Catalog model
// =============================================================================

/// Schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Quoted `"schema"."name"` form, safe to splice into SQL.
    pub fn qualified(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.name))
    }
}

/// Kinds of schema objects removed by `CleanMode::Drop`.
///
/// Variant order is drop order: dependents first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ObjectKind {
    View,
    MaterializedView,
    ForeignTable,
    Table,
    Sequence,
    Routine,
    Composite,
    Range,
    Domain,
    Enum,
}

impl ObjectKind {
    /// Parse the kind label produced by the catalog query.
    pub fn from_catalog(label: &str) -> Option<Self> {
        match label {
            "view" => Some(ObjectKind::View),
            "materialized_view" => Some(ObjectKind::MaterializedView),
            "foreign_table" => Some(ObjectKind::ForeignTable),
            "table" => Some(ObjectKind::Table),
            "sequence" => Some(ObjectKind::Sequence),
            "routine" => Some(ObjectKind::Routine),
            "composite" => Some(ObjectKind::Composite),
            "range" => Some(ObjectKind::Range),
            "domain" => Some(ObjectKind::Domain),
            "enum" => Some(ObjectKind::Enum),
            _ => None,
        }
    }

    fn drop_keyword(self) -> &'static str {
        match self {
            ObjectKind::View => "VIEW",
            ObjectKind::MaterializedView => "MATERIALIZED VIEW",
            ObjectKind::ForeignTable => "FOREIGN TABLE",
            ObjectKind::Table => "TABLE",
            ObjectKind::Sequence => "SEQUENCE",
            ObjectKind::Routine => "ROUTINE",
            ObjectKind::Composite | ObjectKind::Range | ObjectKind::Enum => "TYPE",
            ObjectKind::Domain => "DOMAIN",
        }
    }
}

/// A user-owned object found in one of the cleaned schemas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogObject {
    pub kind: ObjectKind,
    pub table: TableRef,
    /// Identity argument list of a routine (`integer, text`); `None` otherwise.
    pub arguments: Option<String>,
}

impl CatalogObject {
    /// Quoted name as accepted by `DROP`, with the argument list for routines.
    fn drop_target(&self) -> String {
        match &self.arguments {
            Some(args) => format!("{}({})", self.table.qualified(), args),
            None => self.table.qualified(),
        }
    }
}

// =============================================================================
// SQL rendering
// =============================================================================

/// Quote a PostgreSQL identifier, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Render `DROP` statements for every object, dependents first.
///
/// `IF EXISTS` keeps the batch valid when a cascade already removed an object
/// (owned sequences, partitions, routines over a dropped type).
pub fn drop_statements(objects: &[CatalogObject]) -> Vec<String> {
    let mut ordered: Vec<&CatalogObject> = objects.iter().collect();
    ordered.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then_with(|| a.table.cmp(&b.table))
            .then_with(|| a.arguments.cmp(&b.arguments))
    });

    ordered
        .into_iter()
        .map(|obj| {
            format!(
                "DROP {} IF EXISTS {} CASCADE",
                obj.kind.drop_keyword(),
                obj.drop_target()
            )
        })
        .collect()
}

/// Render a single `TRUNCATE` over all tables, or `None` if there are none.
pub fn truncate_statement(tables: &[TableRef]) -> Option<String> {
    if tables.is_empty() {
        return None;
    }

    let list = tables
        .iter()
        .map(TableRef::qualified)
        .collect::<Vec<_>>()
        .join(", ");

    Some(format!("TRUNCATE TABLE {} RESTART IDENTITY CASCADE", list))
}

// =============================================================================
// Catalog queries
// =============================================================================

/// Objects created by extensions are skipped; the extension owns them.
/// Routines internally bound to another object (range constructors) go away
/// with that object. Multirange types go away with their range.
const CATALOG_OBJECTS_SQL: &str = r#"
    SELECT n.nspname AS schema,
           c.relname AS name,
           CASE c.relkind
               WHEN 'v' THEN 'view'
               WHEN 'm' THEN 'materialized_view'
               WHEN 'f' THEN 'foreign_table'
               WHEN 'S' THEN 'sequence'
               WHEN 'c' THEN 'composite'
               ELSE 'table'
           END AS kind,
           NULL::text AS arguments
    FROM pg_class c
    JOIN pg_namespace n ON n.oid = c.relnamespace
    WHERE n.nspname = ANY($1)
      AND c.relkind IN ('r', 'p', 'v', 'm', 'f', 'S', 'c')
      AND NOT EXISTS (
          SELECT 1 FROM pg_depend d
          WHERE d.objid IN (c.oid, c.reltype) AND d.deptype = 'e'
      )
    UNION ALL
    SELECT n.nspname AS schema,
           t.typname AS name,
           CASE t.typtype
               WHEN 'd' THEN 'domain'
               WHEN 'r' THEN 'range'
               ELSE 'enum'
           END AS kind,
           NULL::text AS arguments
    FROM pg_type t
    JOIN pg_namespace n ON n.oid = t.typnamespace
    WHERE n.nspname = ANY($1)
      AND t.typtype IN ('e', 'd', 'r')
      AND NOT EXISTS (
          SELECT 1 FROM pg_depend d WHERE d.objid = t.oid AND d.deptype = 'e'
      )
    UNION ALL
    SELECT n.nspname AS schema,
           p.proname AS name,
           'routine' AS kind,
           pg_get_function_identity_arguments(p.oid) AS arguments
    FROM pg_proc p
    JOIN pg_namespace n ON n.oid = p.pronamespace
    WHERE n.nspname = ANY($1)
      AND NOT EXISTS (
          SELECT 1 FROM pg_depend d
          WHERE d.objid = p.oid AND d.deptype IN ('e', 'i')
      )
    ORDER BY 1, 2
"#;

const TABLES_SQL: &str = r#"
    SELECT n.nspname AS schema, c.relname AS name
    FROM pg_class c
    JOIN pg_namespace n ON n.oid = c.relnamespace
    WHERE n.nspname = ANY($1)
      AND c.relkind IN ('r', 'p')
      AND NOT c.relispartition
      AND NOT EXISTS (
          SELECT 1 FROM pg_depend d WHERE d.objid = c.oid AND d.deptype = 'e'
      )
    ORDER BY 1, 2
"#;

async fn load_catalog(
    conn: &mut PgConnection,
    schemas: &[String],
) -> std::result::Result<Vec<CatalogObject>, sqlx::Error> {
    let rows = sqlx::query(CATALOG_OBJECTS_SQL)
        .bind(schemas.to_vec())
        .fetch_all(&mut *conn)
        .await?;

    let mut objects = Vec::with_capacity(rows.len());
    for row in rows {
        let label: String = row.try_get("kind")?;
        let arguments: Option<String> = row.try_get("arguments")?;
        let table = TableRef::new(
            row.try_get::<String, _>("schema")?,
            row.try_get::<String, _>("name")?,
        );

        match ObjectKind::from_catalog(&label) {
            Some(kind) => objects.push(CatalogObject {
                kind,
                table,
                arguments,
            }),
            None => warn!(kind = %label, table = %table.qualified(), "Skipping unknown catalog object"),
        }
    }

    Ok(objects)
}

/// List base tables (partition roots included, partitions excluded) in the
/// given schemas.
pub async fn list_tables(
    pool: &PgPool,
    schemas: &[String],
) -> std::result::Result<Vec<TableRef>, sqlx::Error> {
    let rows = sqlx::query(TABLES_SQL)
        .bind(schemas.to_vec())
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| -> std::result::Result<TableRef, sqlx::Error> {
            Ok(TableRef::new(
                row.try_get::<String, _>("schema")?,
                row.try_get::<String, _>("name")?,
            ))
        })
        .collect()
}

// =============================================================================
// Cleaner
// =============================================================================

/// Default cleaner for PostgreSQL pools.
///
/// Behavior depends on `CleanerConfig::mode`:
/// - `Drop`: one transaction dropping views, tables, sequences, routines and
///   user types in the configured schemas. The schemas themselves are kept.
/// - `Truncate`: one `TRUNCATE ... RESTART IDENTITY CASCADE` over every
///   non-excluded table.
///
/// Driver errors are returned as-is.
#[derive(Debug, Clone, Default)]
pub struct PgDatabaseCleaner {
    config: CleanerConfig,
}

impl PgDatabaseCleaner {
    /// Create a cleaner with explicit configuration.
    pub fn new(config: CleanerConfig) -> Self {
        Self { config }
    }

    /// Create a cleaner configured from the environment.
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        Ok(Self::new(CleanerConfig::from_env()?))
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    async fn drop_all(&self, pool: &PgPool) -> std::result::Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let objects = load_catalog(&mut *tx, &self.config.schemas).await?;
        let statements = drop_statements(&objects);

        for statement in &statements {
            debug!(%statement, "Dropping");
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        tx.commit().await?;

        info!(
            schemas = ?self.config.schemas,
            objects = statements.len(),
            "Database dropped to empty schemas"
        );
        Ok(())
    }

    async fn truncate_all(&self, pool: &PgPool) -> std::result::Result<(), sqlx::Error> {
        let tables: Vec<TableRef> = list_tables(pool, &self.config.schemas)
            .await?
            .into_iter()
            .filter(|t| !self.config.is_excluded(&t.schema, &t.name))
            .collect();

        let Some(statement) = truncate_statement(&tables) else {
            debug!(schemas = ?self.config.schemas, "No tables to truncate");
            return Ok(());
        };

        sqlx::query(&statement).execute(pool).await?;

        info!(
            schemas = ?self.config.schemas,
            tables = tables.len(),
            "Database tables truncated"
        );
        Ok(())
    }
}

#[async_trait]
impl DatabaseCleaner<PgPool> for PgDatabaseCleaner {
    type Error = sqlx::Error;

    async fn clean(&self, pool: &PgPool) -> std::result::Result<(), Self::Error> {
        info!(mode = %self.config.mode, "Cleaning database");

        match self.config.mode {
            CleanMode::Drop => self.drop_all(pool).await,
            CleanMode::Truncate => self.truncate_all(pool).await,
        }
    }
}

impl DatabaseFacadeExt for PgPool {
    type DefaultCleaner = PgDatabaseCleaner;
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Run all pending migrations from the workspace `migrations/` directory.
///
/// Idempotent: safe to run multiple times.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");

    sqlx::migrate!("../migrations").run(pool).await?;

    info!("Migrations completed successfully");
    Ok(())
}

/// Check connectivity and report every table with its row count.
pub async fn status(pool: &PgPool, schemas: &[String]) -> Result<Vec<(TableRef, i64)>> {
    let result: i32 = sqlx::query_scalar("SELECT 1").fetch_one(pool).await?;

    if result != 1 {
        return Err(anyhow::anyhow!("Database connectivity check failed"));
    }

    info!("Database connectivity: OK");

    let tables = list_tables(pool, schemas).await?;
    if tables.is_empty() {
        warn!(?schemas, "No tables found (database is clean or not migrated)");
    }

    let mut report = Vec::with_capacity(tables.len());
    for table in tables {
        let rows: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table.qualified()))
            .fetch_one(pool)
            .await?;

        info!("  {}: {} rows", table.qualified(), rows);
        report.push((table, rows));
    }

    Ok(report)
}

// =============================================================================
// Tests
// =============================================================================
