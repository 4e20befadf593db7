use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub i64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "categoryId")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Write model for creating or replacing a category. Storage assigns the id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl CategoryDraft {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), description: description.into() }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvariantViolation("category name must not be blank".into()));
        }
        Ok(())
    }

    pub fn into_category(self, id: CategoryId) -> Category {
        Category { id, name: self.name, description: self.description }
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryDraft, CategoryId};
    use crate::errors::DomainError;

    #[test]
    fn blank_name_is_rejected() {
        let draft = CategoryDraft::new("   ", "nothing");

        assert!(matches!(draft.validate(), Err(DomainError::InvariantViolation(_))));
    }

    #[test]
    fn category_serializes_with_camel_case_id() {
        let category = CategoryDraft::new("Electronics", "Gadgets").into_category(CategoryId(1));
        let json = serde_json::to_value(&category).expect("serialize category");

        assert_eq!(json["categoryId"], 1);
        assert_eq!(json["name"], "Electronics");
    }
}
