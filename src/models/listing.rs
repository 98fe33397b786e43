use serde::{Deserialize, Serialize};

use crate::domain::listing::Listing as DomainListing;
use crate::domain::types::{
    CategoryId, ImageUrl, ListingDescription, ListingId, ListingPrice, ListingTitle, Timestamp,
    TypeConstraintError,
};

/// JSON document stored under `listings/{id}`.
///
/// Field names are camelCase because the equality query filters on the
/// `categoryId` child. Timestamps default to zero for records written
/// without them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category_id: String,
    pub image_url: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Name of the child used for category filtering.
pub const CATEGORY_ID_FIELD: &str = "categoryId";

impl Listing {
    /// Decode the stored document at `key` into a domain listing.
    pub fn into_domain(self, key: &str) -> Result<DomainListing, TypeConstraintError> {
        Ok(DomainListing {
            id: ListingId::new(key)?,
            title: ListingTitle::new(self.title)?,
            description: ListingDescription::new(self.description)?,
            price: ListingPrice::new(self.price)?,
            category_id: CategoryId::new(self.category_id)?,
            image_url: ImageUrl::new(self.image_url)?,
            created_at: Timestamp::new(self.created_at)?,
            updated_at: Timestamp::new(self.updated_at)?,
        })
    }
}

impl From<DomainListing> for Listing {
    fn from(listing: DomainListing) -> Self {
        Self {
            title: listing.title.into_inner(),
            description: listing.description.into_inner(),
            price: listing.price.get(),
            category_id: listing.category_id.into_inner(),
            image_url: listing.image_url.into_inner(),
            created_at: listing.created_at.get(),
            updated_at: listing.updated_at.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_timestamps_read_as_zero() {
        let doc: Listing = serde_json::from_value(json!({
            "title": "Phone",
            "description": "Used",
            "price": 100,
            "categoryId": "c1",
            "imageUrl": "https://x.test/a.jpg"
        }))
        .unwrap();
        let listing = doc.into_domain("l1").unwrap();
        assert_eq!(listing.created_at.get(), 0);
        assert_eq!(listing.updated_at.get(), 0);
        assert_eq!(listing.category_id, "c1");
    }

    #[test]
    fn rejects_documents_with_non_positive_price() {
        let doc: Listing = serde_json::from_value(json!({
            "title": "Phone",
            "description": "Used",
            "price": 0,
            "categoryId": "c1",
            "imageUrl": "https://x.test/a.jpg"
        }))
        .unwrap();
        assert_eq!(
            doc.into_domain("l1").unwrap_err(),
            TypeConstraintError::NonPositiveNumber("price")
        );
    }
}
