//! Seeding and inspection helpers for database-backed tests.
//!
//! Target the functional-test schema in `migrations/`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::Result;
use otterbrix_db::TableRef;

/// Options for inserting a customer row.
pub struct SeedCustomerOptions {
    /// Display name
    pub name: String,
    /// Email (must contain '@' to satisfy the domain check)
    pub email: Option<String>,
    /// Creation time (defaults to now)
    pub created_at: Option<DateTime<Utc>>,
}

impl SeedCustomerOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            created_at: None,
        }
    }
}

/// Insert one customer. Returns its id.
pub async fn seed_customer(pool: &PgPool, options: SeedCustomerOptions) -> Result<Uuid> {
    let SeedCustomerOptions {
        name,
        email,
        created_at,
    } = options;

    let customer_id = Uuid::now_v7();
    let created_at = created_at.unwrap_or_else(Utc::now);

    sqlx::query(
        r#"
        INSERT INTO customers (customer_id, name, email, created_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(customer_id)
    .bind(&name)
    .bind(email)
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(customer_id)
}

/// Insert `count` customers named `customer-0`, `customer-1`, ...
pub async fn seed_customers(pool: &PgPool, count: usize) -> Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let id = seed_customer(
            pool,
            SeedCustomerOptions {
                name: format!("customer-{}", i),
                email: Some(format!("customer-{}@example.test", i)),
                created_at: None,
            },
        )
        .await?;
        ids.push(id);
    }
    Ok(ids)
}

/// Insert a pending order for a customer. Returns the generated order id.
pub async fn seed_order(pool: &PgPool, customer_id: Uuid) -> Result<i64> {
    let order_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO orders (customer_id) VALUES ($1) RETURNING order_id",
    )
    .bind(customer_id)
    .fetch_one(pool)
    .await?;

    Ok(order_id)
}

/// Count rows in `public.<table>`.
pub async fn count_rows(pool: &PgPool, table: &str) -> Result<i64> {
    let table = TableRef::new("public", table);
    let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table.qualified()))
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Count user-defined enum and domain types in `public`.
pub async fn count_user_types(pool: &PgPool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM pg_type t
        JOIN pg_namespace n ON n.oid = t.typnamespace
        WHERE n.nspname = 'public' AND t.typtype IN ('e', 'd')
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
