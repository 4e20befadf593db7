use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use shopfront_core::domain::category::{Category, CategoryDraft, CategoryId};
use shopfront_core::domain::product::{price_to_cents, Product, ProductDraft, ProductId};
use shopfront_core::errors::ApplicationError;
use shopfront_core::filter::ProductFilter;

pub mod category;
pub mod memory;
pub mod product;

pub use category::SqlCategoryRepository;
pub use memory::{InMemoryCatalog, InMemoryCategoryRepository, InMemoryProductRepository};
pub use product::SqlProductRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error("constraint violation: {0}")]
    Constraint(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        let constraint = match &error {
            sqlx::Error::Database(db) => matches!(
                db.kind(),
                ErrorKind::ForeignKeyViolation
                    | ErrorKind::CheckViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::UniqueViolation
            )
            .then(|| db.message().to_string()),
            _ => None,
        };

        match constraint {
            Some(message) => Self::Constraint(message),
            None => Self::Database(error),
        }
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Constraint(message) => Self::Conflict(message),
            error @ RepositoryError::Database(sqlx::Error::PoolTimedOut) => {
                Self::Unavailable(error.to_string())
            }
            other => Self::Persistence(other.to_string()),
        }
    }
}

/// Whole-cent amount a price is stored as. Prices the schema cannot hold
/// exactly are constraint violations.
pub(crate) fn storable_cents(price: Decimal) -> Result<i64, RepositoryError> {
    price_to_cents(price).ok_or_else(|| {
        RepositoryError::Constraint(format!("price `{price}` is not a storable amount"))
    })
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, RepositoryError>;
    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError>;
    async fn create(&self, draft: CategoryDraft) -> Result<Category, RepositoryError>;
    /// Returns `false` when no category has `id`.
    async fn update(&self, id: CategoryId, draft: CategoryDraft) -> Result<bool, RepositoryError>;
    /// Returns `false` when no category has `id`.
    async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Products matching every present filter, in storage order.
    async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError>;

    async fn list_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        self.search(&ProductFilter::all().with_category(category_id)).await
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn create(&self, draft: ProductDraft) -> Result<Product, RepositoryError>;
    async fn update(&self, id: ProductId, draft: ProductDraft) -> Result<bool, RepositoryError>;
    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use shopfront_core::errors::ApplicationError;

    use super::{storable_cents, RepositoryError};

    #[test]
    fn constraint_errors_become_conflicts() {
        let error = ApplicationError::from(RepositoryError::Constraint(
            "FOREIGN KEY constraint failed".to_string(),
        ));

        assert!(matches!(error, ApplicationError::Conflict(ref m) if m.contains("FOREIGN KEY")));
    }

    #[test]
    fn decode_errors_become_persistence_failures() {
        let error = ApplicationError::from(RepositoryError::Decode("bad price".to_string()));

        assert!(matches!(error, ApplicationError::Persistence(ref m) if m.contains("bad price")));
    }

    #[test]
    fn pool_timeouts_are_unavailable_and_other_driver_errors_are_persistence() {
        let timed_out = ApplicationError::from(RepositoryError::from(sqlx::Error::PoolTimedOut));
        let broken = ApplicationError::from(RepositoryError::from(sqlx::Error::RowNotFound));

        assert!(matches!(timed_out, ApplicationError::Unavailable(_)));
        assert!(matches!(broken, ApplicationError::Persistence(_)));
    }

    #[test]
    fn unstorable_prices_are_constraint_violations() {
        assert_eq!(storable_cents(Decimal::new(1999, 2)).ok(), Some(1999));
        assert!(matches!(storable_cents(Decimal::new(-1, 0)), Err(RepositoryError::Constraint(_))));
        assert!(matches!(storable_cents(Decimal::new(1, 3)), Err(RepositoryError::Constraint(_))));
    }

    #[test]
    fn driver_errors_stay_database_errors() {
        let error = RepositoryError::from(sqlx::Error::RowNotFound);

        assert!(matches!(error, RepositoryError::Database(sqlx::Error::RowNotFound)));
    }
}
