pub mod config;
pub mod domain;
pub mod errors;
pub mod filter;
pub mod query;

pub use domain::category::{Category, CategoryDraft, CategoryId};
pub use domain::product::{Product, ProductDraft, ProductId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use filter::ProductFilter;
pub use query::{Column, CompareOp, Comparison, ProductPredicate, ProductQuery, SqlParam};
