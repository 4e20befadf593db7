//! Product search predicates and their SQL rendering.
//!
//! A search is a conjunction of optional comparisons. Each filter that is
//! present in a [`ProductFilter`] becomes one [`Comparison`] node; a filter
//! that is absent contributes nothing. The resulting [`ProductPredicate`] can
//! be evaluated in memory or rendered into a single parameterized statement.
//!
//! Rendering is pure: the same filter always yields the same SQL text and the
//! same ordered parameter list.
//!
//! Prices are stored as whole cents, so price bounds are rendered as the
//! nearest cent inside the requested range: a minimum rounds up and a maximum
//! rounds down. A stored price satisfies the rounded bound exactly when it
//! satisfies the original one.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::category::CategoryId;
use crate::domain::product::{Product, MAX_PRICE_CENTS};
use crate::filter::ProductFilter;

pub const PRODUCT_TABLE: &str = "products";

/// Columns every product row must expose for mapping.
pub const PRODUCT_SELECT_COLUMNS: &str = "product_id, name, price_cents, category_id, \
     description, subcategory, stock, featured, image_url";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
    CategoryId,
    Price,
    Subcategory,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CategoryId => "category_id",
            Self::Price => "price_cents",
            Self::Subcategory => "subcategory",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    AtLeast,
    AtMost,
}

impl CompareOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::AtLeast => ">=",
            Self::AtMost => "<=",
        }
    }
}

/// A bound value in a rendered query. Price bounds travel as whole cents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SqlParam {
    Integer(i64),
    Text(String),
}

/// One comparison node of a product predicate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Comparison {
    CategoryEq(CategoryId),
    PriceAtLeast(Decimal),
    PriceAtMost(Decimal),
    SubcategoryEq(String),
}

impl Comparison {
    pub fn column(&self) -> Column {
        match self {
            Self::CategoryEq(_) => Column::CategoryId,
            Self::PriceAtLeast(_) | Self::PriceAtMost(_) => Column::Price,
            Self::SubcategoryEq(_) => Column::Subcategory,
        }
    }

    pub fn op(&self) -> CompareOp {
        match self {
            Self::CategoryEq(_) | Self::SubcategoryEq(_) => CompareOp::Eq,
            Self::PriceAtLeast(_) => CompareOp::AtLeast,
            Self::PriceAtMost(_) => CompareOp::AtMost,
        }
    }

    pub fn param(&self) -> SqlParam {
        match self {
            Self::CategoryEq(id) => SqlParam::Integer(id.0),
            Self::PriceAtLeast(bound) => {
                SqlParam::Integer(bound_cents(*bound, RoundingStrategy::ToPositiveInfinity))
            }
            Self::PriceAtMost(bound) => {
                SqlParam::Integer(bound_cents(*bound, RoundingStrategy::ToNegativeInfinity))
            }
            Self::SubcategoryEq(name) => SqlParam::Text(name.clone()),
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::CategoryEq(id) => product.category_id == *id,
            Self::PriceAtLeast(bound) => product.price >= *bound,
            Self::PriceAtMost(bound) => product.price <= *bound,
            Self::SubcategoryEq(name) => product.subcategory == *name,
        }
    }

    fn render(&self) -> String {
        format!("{} {} ?", self.column().as_str(), self.op().as_sql())
    }
}

/// Rounds `bound` to a whole cent and clamps it just outside the storable
/// range, so out-of-range bounds still select all or nothing.
fn bound_cents(bound: Decimal, strategy: RoundingStrategy) -> i64 {
    let below = Decimal::new(-1, 2);
    let above = Decimal::new(MAX_PRICE_CENTS + 1, 2);
    let whole_cents = bound.round_dp_with_strategy(2, strategy).clamp(below, above);

    (whole_cents * Decimal::ONE_HUNDRED).to_i64().unwrap_or(MAX_PRICE_CENTS + 1)
}

/// Conjunction of comparisons. An empty conjunction matches every product.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductPredicate {
    clauses: Vec<Comparison>,
}

impl ProductPredicate {
    /// Clause order is fixed: category, min price, max price, sub-category.
    pub fn from_filter(filter: &ProductFilter) -> Self {
        let clauses = [
            filter.category_id.map(Comparison::CategoryEq),
            filter.min_price.map(Comparison::PriceAtLeast),
            filter.max_price.map(Comparison::PriceAtMost),
            filter
                .subcategory
                .as_ref()
                .filter(|name| !name.is_empty())
                .map(|name| Comparison::SubcategoryEq(name.clone())),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self { clauses }
    }

    pub fn clauses(&self) -> &[Comparison] {
        &self.clauses
    }

    pub fn is_identity(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.clauses.iter().all(|clause| clause.matches(product))
    }

    pub fn to_query(&self) -> ProductQuery {
        let mut sql = format!("SELECT {PRODUCT_SELECT_COLUMNS} FROM {PRODUCT_TABLE}");

        if !self.clauses.is_empty() {
            let conditions =
                self.clauses.iter().map(Comparison::render).collect::<Vec<_>>().join(" AND ");
            sql.push_str(" WHERE ");
            sql.push_str(&conditions);
        }
        sql.push_str(" ORDER BY product_id");

        ProductQuery { sql, params: self.clauses.iter().map(Comparison::param).collect() }
    }
}

/// Executable statement text plus its positional parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl From<&ProductFilter> for ProductQuery {
    fn from(filter: &ProductFilter) -> Self {
        ProductPredicate::from_filter(filter).to_query()
    }
}
