use shopfront_core::domain::category::CategoryId;
use shopfront_core::domain::product::{price_from_cents, Product, ProductDraft, ProductId};
use shopfront_core::filter::ProductFilter;
use shopfront_core::query::{ProductQuery, SqlParam, PRODUCT_SELECT_COLUMNS};
use sqlx::{sqlite::SqliteRow, Row};
use tracing::debug;

use super::{storable_cents, ProductRepository, RepositoryError};
use crate::DbPool;

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, query: &ProductQuery) -> Result<Vec<Product>, RepositoryError> {
        let mut statement = sqlx::query(&query.sql);
        for param in &query.params {
            statement = match param {
                SqlParam::Integer(value) => statement.bind(*value),
                SqlParam::Text(value) => statement.bind(value.as_str()),
            };
        }

        let rows = statement.fetch_all(&self.pool).await?;
        rows.iter().map(map_product_row).collect()
    }
}

/// Maps one row carrying [`PRODUCT_SELECT_COLUMNS`] to a product.
pub fn map_product_row(row: &SqliteRow) -> Result<Product, RepositoryError> {
    let stock: i64 = row.try_get("stock")?;

    Ok(Product {
        id: ProductId(row.try_get("product_id")?),
        name: row.try_get("name")?,
        price: price_from_cents(row.try_get("price_cents")?),
        category_id: CategoryId(row.try_get("category_id")?),
        description: row.try_get("description")?,
        subcategory: row.try_get("subcategory")?,
        stock: u32::try_from(stock)
            .map_err(|_| RepositoryError::Decode(format!("stock `{stock}` is out of range")))?,
        featured: row.try_get("featured")?,
        image_url: row.try_get("image_url")?,
    })
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let query = ProductQuery::from(filter);
        debug!(
            event_name = "db.product.search",
            clauses = query.params.len(),
            filter = ?filter,
            "running product search"
        );
        self.fetch(&query).await
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_SELECT_COLUMNS} FROM products WHERE product_id = ?");
        let row = sqlx::query(&sql).bind(id.0).fetch_optional(&self.pool).await?;

        row.as_ref().map(map_product_row).transpose()
    }

    async fn create(&self, draft: ProductDraft) -> Result<Product, RepositoryError> {
        let price_cents = storable_cents(draft.price)?;
        let result = sqlx::query(
            "INSERT INTO products \
             (name, price_cents, category_id, description, subcategory, image_url, stock, featured) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&draft.name)
        .bind(price_cents)
        .bind(draft.category_id.0)
        .bind(&draft.description)
        .bind(&draft.subcategory)
        .bind(&draft.image_url)
        .bind(i64::from(draft.stock))
        .bind(draft.featured)
        .execute(&self.pool)
        .await?;

        let id = ProductId(result.last_insert_rowid());
        debug!(event_name = "db.product.created", product_id = %id, "product inserted");

        self.find_by_id(id).await?.ok_or_else(|| {
            RepositoryError::Decode(format!("inserted product `{id}` could not be read back"))
        })
    }

    async fn update(&self, id: ProductId, draft: ProductDraft) -> Result<bool, RepositoryError> {
        let price_cents = storable_cents(draft.price)?;
        let result = sqlx::query(
            "UPDATE products SET name = ?, price_cents = ?, category_id = ?, \
             description = ?, subcategory = ?, image_url = ?, stock = ?, featured = ? \
             WHERE product_id = ?",
        )
        .bind(&draft.name)
        .bind(price_cents)
        .bind(draft.category_id.0)
        .bind(&draft.description)
        .bind(&draft.subcategory)
        .bind(&draft.image_url)
        .bind(i64::from(draft.stock))
        .bind(draft.featured)
        .bind(id.0)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE product_id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
