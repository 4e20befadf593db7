use sqlx::Executor;
use tracing::info;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Expected per-category product counts of the demo catalog.
const SEED_CATEGORIES: &[SeedCategoryContract] = &[
    SeedCategoryContract { category_id: 1, name: "Electronics", product_count: 5 },
    SeedCategoryContract { category_id: 2, name: "Fashion", product_count: 4 },
    SeedCategoryContract { category_id: 3, name: "Home & Kitchen", product_count: 3 },
];

/// Demo catalog: three categories and a dozen products spread across them.
pub struct CatalogSeed;

impl CatalogSeed {
    pub const SQL: &str = include_str!("../../../config/fixtures/catalog_seed.sql");

    /// Loads the demo catalog unless the categories table already has rows.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM categories")
            .fetch_one(pool)
            .await?;
        if existing > 0 {
            info!(event_name = "db.seed.skipped", existing, "catalog already has categories");
            return Ok(SeedResult { categories: 0, products: 0, skipped: true });
        }

        let mut tx = pool.begin().await?;
        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let categories = SEED_CATEGORIES.len();
        let products: usize = SEED_CATEGORIES.iter().map(|c| c.product_count as usize).sum();
        info!(event_name = "db.seed.loaded", categories, products, "demo catalog loaded");

        Ok(SeedResult { categories, products, skipped: false })
    }

    /// Checks that every seeded category exists with its expected product count.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        for category in SEED_CATEGORIES {
            let exists: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM categories WHERE category_id = ?1 AND name = ?2)",
            )
            .bind(category.category_id)
            .bind(category.name)
            .fetch_one(pool)
            .await?;
            checks.push((category.name, exists == 1));

            let product_count: i64 =
                sqlx::query_scalar("SELECT COUNT(1) FROM products WHERE category_id = ?1")
                    .bind(category.category_id)
                    .fetch_one(pool)
                    .await?;
            checks.push((category.name, product_count == category.product_count));
        }

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }
}

struct SeedCategoryContract {
    category_id: i64,
    name: &'static str,
    product_count: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub categories: usize,
    pub products: usize,
    pub skipped: bool,
}

#[derive(Clone, Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
