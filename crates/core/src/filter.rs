//! Normalized product filters.
//!
//! A [`ProductFilter`] holds the four optional constraints a catalog search
//! accepts. An absent constraint is `None` and contributes no predicate.

use rust_decimal::Decimal;

use crate::domain::category::CategoryId;
use crate::query::ProductPredicate;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub subcategory: Option<String>,
}

impl ProductFilter {
    /// Filter that matches every product.
    pub fn all() -> Self {
        Self::default()
    }

    /// Normalizes raw, possibly-unsupplied inputs.
    ///
    /// An empty sub-category is treated as not supplied. Numeric values are
    /// taken as-is; rejecting malformed input is the caller's job.
    pub fn from_raw(
        category_id: Option<i64>,
        min_price: Option<Decimal>,
        max_price: Option<Decimal>,
        subcategory: Option<String>,
    ) -> Self {
        Self {
            category_id: category_id.map(CategoryId),
            min_price,
            max_price,
            subcategory: subcategory.filter(|value| !value.is_empty()),
        }
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_min_price(mut self, min_price: Decimal) -> Self {
        self.min_price = Some(min_price);
        self
    }

    pub fn with_max_price(mut self, max_price: Decimal) -> Self {
        self.max_price = Some(max_price);
        self
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        let subcategory = subcategory.into();
        self.subcategory = (!subcategory.is_empty()).then_some(subcategory);
        self
    }

    pub fn is_identity(&self) -> bool {
        self.category_id.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.subcategory.is_none()
    }

    pub fn predicate(&self) -> ProductPredicate {
        ProductPredicate::from_filter(self)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::ProductFilter;
    use crate::domain::category::CategoryId;

    #[test]
    fn unsupplied_inputs_produce_identity_filter() {
        let filter = ProductFilter::from_raw(None, None, None, None);

        assert!(filter.is_identity());
        assert_eq!(filter, ProductFilter::all());
    }

    #[test]
    fn empty_subcategory_is_normalized_to_absent() {
        let filter = ProductFilter::from_raw(None, None, None, Some(String::new()));

        assert_eq!(filter.subcategory, None);
        assert!(filter.is_identity());
    }

    #[test]
    fn supplied_inputs_are_kept_verbatim() {
        let filter = ProductFilter::from_raw(
            Some(3),
            Some(Decimal::new(1000, 2)),
            Some(Decimal::new(2500, 2)),
            Some("hats".to_string()),
        );

        assert_eq!(filter.category_id, Some(CategoryId(3)));
        assert_eq!(filter.min_price, Some(Decimal::new(10, 0)));
        assert_eq!(filter.max_price, Some(Decimal::new(25, 0)));
        assert_eq!(filter.subcategory.as_deref(), Some("hats"));
        assert!(!filter.is_identity());
    }

    #[test]
    fn builder_methods_match_raw_normalization() {
        let built = ProductFilter::all()
            .with_category(CategoryId(1))
            .with_max_price(Decimal::new(20, 0))
            .with_subcategory("");
        let raw = ProductFilter::from_raw(Some(1), None, Some(Decimal::new(20, 0)), None);

        assert_eq!(built, raw);
    }

    #[test]
    fn inverted_price_range_is_not_rejected() {
        let filter = ProductFilter::all()
            .with_min_price(Decimal::new(50, 0))
            .with_max_price(Decimal::new(10, 0));

        assert_eq!(filter.predicate().clauses().len(), 2);
    }
}
