use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use shopfront_core::domain::category::{Category, CategoryDraft, CategoryId};
use shopfront_core::domain::product::{price_from_cents, Product, ProductDraft, ProductId};
use shopfront_core::filter::ProductFilter;

use super::{storable_cents, CategoryRepository, ProductRepository, RepositoryError};

#[derive(Default)]
struct CatalogState {
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
    last_category_id: i64,
    last_product_id: i64,
}

impl CatalogState {
    /// Applies the same checks as the SQL schema and stores the price as
    /// SQL would read it back.
    fn stored_product(&self, id: ProductId, draft: ProductDraft) -> Result<Product, RepositoryError> {
        let cents = storable_cents(draft.price)?;
        if !self.categories.contains_key(&draft.category_id) {
            return Err(RepositoryError::Constraint("FOREIGN KEY constraint failed".into()));
        }
        let mut product = draft.into_product(id);
        product.price = price_from_cents(cents);
        Ok(product)
    }
}

/// Catalog kept in ordered maps, shared by the category and product views
/// so product writes can check category references.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn categories(&self) -> InMemoryCategoryRepository {
        InMemoryCategoryRepository { state: Arc::clone(&self.state) }
    }

    pub fn products(&self) -> InMemoryProductRepository {
        InMemoryProductRepository { state: Arc::clone(&self.state) }
    }
}

pub struct InMemoryCategoryRepository {
    state: Arc<RwLock<CatalogState>>,
}

pub struct InMemoryProductRepository {
    state: Arc<RwLock<CatalogState>>,
}

#[async_trait::async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.categories.values().cloned().collect())
    }

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.categories.get(&id).cloned())
    }

    async fn create(&self, draft: CategoryDraft) -> Result<Category, RepositoryError> {
        let mut state = self.state.write().await;
        state.last_category_id += 1;
        let category = draft.into_category(CategoryId(state.last_category_id));
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, id: CategoryId, draft: CategoryDraft) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        match state.categories.get_mut(&id) {
            Some(existing) => {
                *existing = draft.into_category(id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        if state.products.values().any(|product| product.category_id == id) {
            return Err(RepositoryError::Constraint("FOREIGN KEY constraint failed".into()));
        }
        Ok(state.categories.remove(&id).is_some())
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let predicate = filter.predicate();
        let state = self.state.read().await;
        Ok(state.products.values().filter(|product| predicate.matches(product)).cloned().collect())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.products.get(&id).cloned())
    }

    async fn create(&self, draft: ProductDraft) -> Result<Product, RepositoryError> {
        let mut state = self.state.write().await;
        let product = state.stored_product(ProductId(state.last_product_id + 1), draft)?;
        state.last_product_id = product.id.0;
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(&self, id: ProductId, draft: ProductDraft) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        if !state.products.contains_key(&id) {
            return Ok(false);
        }
        let product = state.stored_product(id, draft)?;
        state.products.insert(id, product);
        Ok(true)
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        Ok(state.products.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use shopfront_core::domain::category::{CategoryDraft, CategoryId};
    use shopfront_core::domain::product::ProductDraft;
    use shopfront_core::filter::ProductFilter;

    use super::InMemoryCatalog;
    use crate::repositories::{CategoryRepository, ProductRepository, RepositoryError};

    fn draft(category_id: CategoryId, cents: i64, subcategory: &str) -> ProductDraft {
        ProductDraft {
            name: format!("{subcategory}-{cents}"),
            price: Decimal::new(cents, 2),
            category_id,
            description: String::new(),
            subcategory: subcategory.to_string(),
            stock: 1,
            featured: false,
            image_url: String::new(),
        }
    }

    #[tokio::test]
    async fn in_memory_category_repo_round_trip() {
        let catalog = InMemoryCatalog::new();
        let categories = catalog.categories();

        let created =
            categories.create(CategoryDraft::new("Fashion", "Clothes")).await.expect("create");
        let found = categories.find_by_id(created.id).await.expect("find");

        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn in_memory_search_uses_the_predicate() {
        let catalog = InMemoryCatalog::new();
        let shoes = catalog.categories().create(CategoryDraft::new("Shoes", "")).await.unwrap();
        let products = catalog.products();
        products.create(draft(shoes.id, 1000, "running")).await.expect("create");
        products.create(draft(shoes.id, 5000, "running")).await.expect("create");

        let cheap = products
            .search(&ProductFilter::all().with_max_price(Decimal::new(20, 0)))
            .await
            .expect("search");

        assert_eq!(cheap.len(), 1);
        assert_eq!(cheap[0].price, Decimal::new(10, 0));
    }

    #[tokio::test]
    async fn product_writes_check_category_and_price() {
        let catalog = InMemoryCatalog::new();
        let shoes = catalog.categories().create(CategoryDraft::new("Shoes", "")).await.unwrap();
        let products = catalog.products();

        let orphan = products.create(draft(CategoryId(99), 100, "x")).await;
        let negative = products.create(draft(shoes.id, -100, "x")).await;
        let mut sub_cent = draft(shoes.id, 100, "x");
        sub_cent.price = Decimal::new(1001, 3);
        let sub_cent = products.create(sub_cent).await;

        assert!(matches!(orphan, Err(RepositoryError::Constraint(_))));
        assert!(matches!(negative, Err(RepositoryError::Constraint(_))));
        assert!(matches!(sub_cent, Err(RepositoryError::Constraint(_))));
        assert!(products.search(&ProductFilter::all()).await.expect("search").is_empty());
    }

    #[tokio::test]
    async fn referenced_category_cannot_be_deleted() {
        let catalog = InMemoryCatalog::new();
        let categories = catalog.categories();
        let shoes = categories.create(CategoryDraft::new("Shoes", "")).await.unwrap();
        let product =
            catalog.products().create(draft(shoes.id, 100, "running")).await.expect("create");

        assert!(matches!(categories.delete(shoes.id).await, Err(RepositoryError::Constraint(_))));

        catalog.products().delete(product.id).await.expect("delete product");
        assert!(categories.delete(shoes.id).await.expect("delete category"));
    }

    #[tokio::test]
    async fn list_by_category_matches_category_search() {
        let catalog = InMemoryCatalog::new();
        let categories = catalog.categories();
        let shoes = categories.create(CategoryDraft::new("Shoes", "")).await.unwrap();
        let hats = categories.create(CategoryDraft::new("Hats", "")).await.unwrap();
        let products = catalog.products();
        products.create(draft(shoes.id, 100, "running")).await.unwrap();
        products.create(draft(hats.id, 200, "beanie")).await.unwrap();

        let listed = products.list_by_category(hats.id).await.expect("list");
        let searched =
            products.search(&ProductFilter::all().with_category(hats.id)).await.expect("search");

        assert_eq!(listed, searched);
        assert_eq!(listed.len(), 1);
    }
}
