use shopfront_core::domain::category::{Category, CategoryDraft, CategoryId};
use sqlx::{sqlite::SqliteRow, Row};
use tracing::debug;

use super::{CategoryRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCategoryRepository {
    pool: DbPool,
}

impl SqlCategoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> Result<Category, RepositoryError> {
        Ok(Category {
            id: CategoryId(row.try_get("category_id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
        })
    }
}

#[async_trait::async_trait]
impl CategoryRepository for SqlCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT category_id, name, description FROM categories ORDER BY category_id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query(
            "SELECT category_id, name, description FROM categories WHERE category_id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn create(&self, draft: CategoryDraft) -> Result<Category, RepositoryError> {
        let result = sqlx::query("INSERT INTO categories (name, description) VALUES (?, ?)")
            .bind(&draft.name)
            .bind(&draft.description)
            .execute(&self.pool)
            .await?;

        let id = CategoryId(result.last_insert_rowid());
        debug!(event_name = "db.category.created", category_id = %id, "category inserted");
        Ok(draft.into_category(id))
    }

    async fn update(&self, id: CategoryId, draft: CategoryDraft) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE categories SET name = ?, description = ? WHERE category_id = ?")
                .bind(&draft.name)
                .bind(&draft.description)
                .bind(id.0)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE category_id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        debug!(
            event_name = "db.category.deleted",
            category_id = %id,
            rows_affected = result.rows_affected(),
            "category delete executed"
        );
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use shopfront_core::domain::category::{CategoryDraft, CategoryId};

    use super::SqlCategoryRepository;
    use crate::repositories::{CategoryRepository, RepositoryError};
    use crate::{connect_with_settings, schema};

    async fn repo() -> SqlCategoryRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        schema::apply(&pool).await.expect("schema");
        SqlCategoryRepository::new(pool)
    }

    #[tokio::test]
    async fn create_then_find_round_trips() {
        let repo = repo().await;

        let created =
            repo.create(CategoryDraft::new("Electronics", "Gadgets")).await.expect("create");
        let found = repo.find_by_id(created.id).await.expect("find");

        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let repo = repo().await;
        repo.create(CategoryDraft::new("B", "")).await.expect("create b");
        repo.create(CategoryDraft::new("A", "")).await.expect("create a");

        let names: Vec<String> =
            repo.list().await.expect("list").into_iter().map(|c| c.name).collect();

        assert_eq!(names, vec!["B".to_string(), "A".to_string()]);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let repo = repo().await;

        let updated = repo.update(CategoryId(99), CategoryDraft::new("X", "")).await;
        let deleted = repo.delete(CategoryId(99)).await;

        assert!(matches!(updated, Ok(false)));
        assert!(matches!(deleted, Ok(false)));
    }

    #[tokio::test]
    async fn update_replaces_fields() {
        let repo = repo().await;
        let created = repo.create(CategoryDraft::new("Old", "old")).await.expect("create");

        let updated =
            repo.update(created.id, CategoryDraft::new("New", "new")).await.expect("update");
        let found = repo.find_by_id(created.id).await.expect("find").expect("present");

        assert!(updated);
        assert_eq!(found.name, "New");
        assert_eq!(found.description, "new");
    }

    #[tokio::test]
    async fn deleting_referenced_category_is_a_constraint_violation() {
        let repo = repo().await;
        let created = repo.create(CategoryDraft::new("Shoes", "")).await.expect("create");
        sqlx::query("INSERT INTO products (name, price_cents, category_id) VALUES ('Boot', 10, ?)")
            .bind(created.id.0)
            .execute(&repo.pool)
            .await
            .expect("insert product");

        let result = repo.delete(created.id).await;

        assert!(matches!(result, Err(RepositoryError::Constraint(_))));
    }
}
