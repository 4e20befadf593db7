//! Catalog tables.
//!
//! Statements are idempotent and applied at startup. There is no versioned
//! migration history. Prices are whole cents in an INTEGER column; the CHECK
//! constraints keep prices and stock counts non-negative.

use tracing::info;

use crate::DbPool;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        category_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        product_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        price_cents INTEGER NOT NULL CHECK (price_cents >= 0),
        category_id INTEGER NOT NULL REFERENCES categories (category_id),
        description TEXT NOT NULL DEFAULT '',
        subcategory TEXT NOT NULL DEFAULT '',
        image_url TEXT NOT NULL DEFAULT '',
        stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
        featured INTEGER NOT NULL DEFAULT 0 CHECK (featured IN (0, 1))
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_products_category_id ON products (category_id)",
    "CREATE INDEX IF NOT EXISTS idx_products_price ON products (price_cents)",
];

pub const CATALOG_TABLES: &[&str] = &["categories", "products"];

pub async fn apply(pool: &DbPool) -> Result<(), sqlx::Error> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    info!(event_name = "db.schema.applied", tables = CATALOG_TABLES.len(), "catalog schema ready");
    Ok(())
}
