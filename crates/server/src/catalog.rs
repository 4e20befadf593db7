use std::sync::Arc;

use shopfront_core::domain::category::{Category, CategoryDraft, CategoryId};
use shopfront_core::domain::product::{Product, ProductDraft, ProductId};
use shopfront_core::errors::ApplicationError;
use shopfront_core::filter::ProductFilter;
#[cfg(test)]
use shopfront_db::InMemoryCatalog;
use shopfront_db::{
    CategoryRepository, DbPool, ProductRepository, SqlCategoryRepository, SqlProductRepository,
};
use tracing::info;

/// Catalog use cases shared by the HTTP handlers.
///
/// Drafts are validated before they reach storage, and missing identifiers
/// become [`ApplicationError::NotFound`] instead of a silent no-op.
#[derive(Clone)]
pub struct CatalogService {
    categories: Arc<dyn CategoryRepository>,
    products: Arc<dyn ProductRepository>,
}

impl CatalogService {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        products: Arc<dyn ProductRepository>,
    ) -> Self {
        Self { categories, products }
    }

    pub fn sql(pool: DbPool) -> Self {
        Self::new(
            Arc::new(SqlCategoryRepository::new(pool.clone())),
            Arc::new(SqlProductRepository::new(pool)),
        )
    }

    #[cfg(test)]
    pub fn in_memory(catalog: &InMemoryCatalog) -> Self {
        Self::new(Arc::new(catalog.categories()), Arc::new(catalog.products()))
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ApplicationError> {
        Ok(self.categories.list().await?)
    }

    pub async fn category(&self, id: CategoryId) -> Result<Category, ApplicationError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("category", id))
    }

    pub async fn create_category(&self, draft: CategoryDraft) -> Result<Category, ApplicationError> {
        draft.validate()?;
        let category = self.categories.create(draft).await?;
        info!(
            event_name = "catalog.category.created",
            category_id = %category.id,
            "category created"
        );
        Ok(category)
    }

    pub async fn update_category(
        &self,
        id: CategoryId,
        draft: CategoryDraft,
    ) -> Result<(), ApplicationError> {
        draft.validate()?;
        self.category(id).await?;
        if !self.categories.update(id, draft).await? {
            return Err(ApplicationError::not_found("category", id));
        }
        info!(event_name = "catalog.category.updated", category_id = %id, "category updated");
        Ok(())
    }

    pub async fn delete_category(&self, id: CategoryId) -> Result<(), ApplicationError> {
        self.category(id).await?;
        if !self.categories.delete(id).await? {
            return Err(ApplicationError::not_found("category", id));
        }
        info!(event_name = "catalog.category.deleted", category_id = %id, "category deleted");
        Ok(())
    }

    pub async fn products_in_category(
        &self,
        id: CategoryId,
    ) -> Result<Vec<Product>, ApplicationError> {
        Ok(self.products.list_by_category(id).await?)
    }

    pub async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApplicationError> {
        Ok(self.products.search(filter).await?)
    }

    pub async fn product(&self, id: ProductId) -> Result<Product, ApplicationError> {
        self.products.find_by_id(id).await?.ok_or_else(|| ApplicationError::not_found("product", id))
    }

    pub async fn create_product(&self, draft: ProductDraft) -> Result<Product, ApplicationError> {
        draft.validate()?;
        let product = self.products.create(draft).await?;
        info!(
            event_name = "catalog.product.created",
            product_id = %product.id,
            category_id = %product.category_id,
            "product created"
        );
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: ProductId,
        draft: ProductDraft,
    ) -> Result<(), ApplicationError> {
        draft.validate()?;
        self.product(id).await?;
        if !self.products.update(id, draft).await? {
            return Err(ApplicationError::not_found("product", id));
        }
        info!(event_name = "catalog.product.updated", product_id = %id, "product updated");
        Ok(())
    }

    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApplicationError> {
        self.product(id).await?;
        if !self.products.delete(id).await? {
            return Err(ApplicationError::not_found("product", id));
        }
        info!(event_name = "catalog.product.deleted", product_id = %id, "product deleted");
        Ok(())
    }
}
