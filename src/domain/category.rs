use serde::{Deserialize, Serialize};

use crate::domain::types::{CategoryId, CategoryName};

/// A named grouping that listings reference by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    pub description: Option<String>,
}

/// Data required to insert a new [`Category`]. The id is assigned by the
/// store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCategory {
    pub name: CategoryName,
    pub description: Option<String>,
}

impl NewCategory {
    /// Attach the key the store assigned on creation.
    pub fn with_id(self, id: CategoryId) -> Category {
        Category {
            id,
            name: self.name,
            description: self.description,
        }
    }
}
