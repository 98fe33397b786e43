use serde::{Deserialize, Serialize};

use crate::domain::category::{Category as DomainCategory, NewCategory as DomainNewCategory};
use crate::domain::types::{CategoryId, CategoryName, TypeConstraintError};

/// JSON document stored under `categories/{id}`. The id is the node key and
/// is not repeated inside the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Category {
    /// Decode the stored document at `key` into a domain category.
    pub fn into_domain(self, key: &str) -> Result<DomainCategory, TypeConstraintError> {
        Ok(DomainCategory {
            id: CategoryId::new(key)?,
            name: CategoryName::new(self.name)?,
            description: self.description.filter(|d| !d.trim().is_empty()),
        })
    }
}

impl From<DomainNewCategory> for Category {
    fn from(category: DomainNewCategory) -> Self {
        Self {
            name: category.name.into_inner(),
            description: category.description,
        }
    }
}

impl From<DomainCategory> for Category {
    fn from(category: DomainCategory) -> Self {
        Self {
            name: category.name.into_inner(),
            description: category.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_documents_written_with_empty_description() {
        let doc: Category =
            serde_json::from_value(json!({"name": "Electronics", "description": ""})).unwrap();
        let category = doc.into_domain("c1").unwrap();
        assert_eq!(category.id, "c1");
        assert_eq!(category.description, None);
    }

    #[test]
    fn omits_absent_description() {
        let doc = Category {
            name: "Cars".into(),
            description: None,
        };
        assert_eq!(serde_json::to_value(doc).unwrap(), json!({"name": "Cars"}));
    }
}
