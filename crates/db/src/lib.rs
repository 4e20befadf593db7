pub mod connection;
pub mod fixtures;
pub mod repositories;
pub mod schema;

pub use connection::{connect_with_config, connect_with_settings, DbPool};
pub use fixtures::{CatalogSeed, SeedResult, VerificationResult};
pub use repositories::{
    CategoryRepository, InMemoryCatalog, InMemoryCategoryRepository, InMemoryProductRepository,
    ProductRepository, RepositoryError, SqlCategoryRepository, SqlProductRepository,
};
