use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::category::CategoryId;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Largest storable price, in cents.
pub const MAX_PRICE_CENTS: i64 = 9_000_000_000_000_000_000;

/// Prices are stored as whole cents. Returns `None` for negative prices,
/// sub-cent precision, or anything above [`MAX_PRICE_CENTS`].
pub fn price_to_cents(price: Decimal) -> Option<i64> {
    if price.normalize().scale() > 2 {
        return None;
    }
    let cents = price.checked_mul(Decimal::ONE_HUNDRED)?.to_i64()?;
    (0..=MAX_PRICE_CENTS).contains(&cents).then_some(cents)
}

pub fn price_from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// A catalog product as read from storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "productId")]
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub category_id: CategoryId,
    pub description: String,
    #[serde(rename = "subCategory")]
    pub subcategory: String,
    pub stock: u32,
    #[serde(rename = "isFeatured")]
    pub featured: bool,
    pub image_url: String,
}

/// Write model for creating or replacing a product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub price: Decimal,
    pub category_id: CategoryId,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "subCategory")]
    pub subcategory: String,
    #[serde(default)]
    pub stock: u32,
    #[serde(default, rename = "isFeatured")]
    pub featured: bool,
    #[serde(default)]
    pub image_url: String,
}

impl ProductDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvariantViolation("product name must not be blank".into()));
        }
        if self.price < Decimal::ZERO {
            return Err(DomainError::InvariantViolation(format!(
                "product price must not be negative (got {})",
                self.price
            )));
        }
        if self.price.normalize().scale() > 2 {
            return Err(DomainError::InvariantViolation(format!(
                "product price must have at most two decimal places (got {})",
                self.price
            )));
        }
        if price_to_cents(self.price).is_none() {
            return Err(DomainError::InvariantViolation(format!(
                "product price is too large (got {})",
                self.price
            )));
        }
        Ok(())
    }

    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            category_id: self.category_id,
            description: self.description,
            subcategory: self.subcategory,
            stock: self.stock,
            featured: self.featured,
            image_url: self.image_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{price_from_cents, price_to_cents, ProductDraft, ProductId, MAX_PRICE_CENTS};
    use crate::domain::category::CategoryId;
    use crate::errors::DomainError;

    fn draft(price: Decimal) -> ProductDraft {
        ProductDraft {
            name: "Trail Runner".to_string(),
            price,
            category_id: CategoryId(1),
            description: "Lightweight trail shoe".to_string(),
            subcategory: "shoes".to_string(),
            stock: 12,
            featured: false,
            image_url: "trail-runner.jpg".to_string(),
        }
    }

    #[test]
    fn negative_price_is_rejected() {
        let result = draft(Decimal::new(-1, 0)).validate();

        assert!(matches!(result, Err(DomainError::InvariantViolation(ref message))
            if message.contains("price")));
    }

    #[test]
    fn zero_price_is_allowed() {
        assert_eq!(draft(Decimal::ZERO).validate(), Ok(()));
    }

    #[test]
    fn sub_cent_price_is_rejected() {
        let result = draft(Decimal::new(19_999, 3)).validate();

        assert!(matches!(result, Err(DomainError::InvariantViolation(ref message))
            if message.contains("two decimal places")));
        assert_eq!(draft(Decimal::new(19_990, 3)).validate(), Ok(()));
    }

    #[test]
    fn price_beyond_storable_range_is_rejected() {
        let too_large = price_from_cents(MAX_PRICE_CENTS) + Decimal::new(1, 2);

        assert!(matches!(draft(too_large).validate(), Err(DomainError::InvariantViolation(_))));
        assert_eq!(draft(price_from_cents(MAX_PRICE_CENTS)).validate(), Ok(()));
    }

    #[test]
    fn cents_conversion_is_exact() {
        let large = Decimal::new(1_234_567_890_123_456_789, 2);

        assert_eq!(price_to_cents(large), Some(1_234_567_890_123_456_789));
        assert_eq!(price_from_cents(1_234_567_890_123_456_789), large);
        assert_eq!(price_to_cents(Decimal::new(1250, 3)), Some(125));
        assert_eq!(price_to_cents(Decimal::new(-1, 2)), None);
        assert_eq!(price_to_cents(Decimal::new(1, 3)), None);
    }

    #[test]
    fn product_json_uses_original_field_names() {
        let product = draft(Decimal::new(4999, 2)).into_product(ProductId(7));
        let json = serde_json::to_value(&product).expect("serialize product");

        assert_eq!(json["productId"], 7);
        assert_eq!(json["categoryId"], 1);
        assert_eq!(json["subCategory"], "shoes");
        assert_eq!(json["isFeatured"], false);
        assert_eq!(json["imageUrl"], "trail-runner.jpg");
    }

    #[test]
    fn draft_accepts_numeric_price_and_defaults_optional_fields() {
        let draft: ProductDraft =
            serde_json::from_str(r#"{"name":"Cap","price":12.5,"categoryId":2}"#)
                .expect("deserialize draft");

        assert_eq!(draft.price, Decimal::new(125, 1));
        assert_eq!(draft.stock, 0);
        assert!(draft.subcategory.is_empty());
    }
}
