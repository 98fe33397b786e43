use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CategoryId, ImageUrl, ListingDescription, ListingId, ListingPrice, ListingTitle, Timestamp,
};

/// A priced, categorized classified ad with an image reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub id: ListingId,
    pub title: ListingTitle,
    pub description: ListingDescription,
    pub price: ListingPrice,
    /// Expected to reference an existing category; not enforced by the store.
    pub category_id: CategoryId,
    pub image_url: ImageUrl,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Caller-supplied fields of a [`Listing`]. Timestamps are set by the write
/// path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewListing {
    pub title: ListingTitle,
    pub description: ListingDescription,
    pub price: ListingPrice,
    pub category_id: CategoryId,
    pub image_url: ImageUrl,
}

impl NewListing {
    /// Build the full record once the store key and write time are known.
    pub fn into_listing(self, id: ListingId, now: Timestamp) -> Listing {
        Listing {
            id,
            title: self.title,
            description: self.description,
            price: self.price,
            category_id: self.category_id,
            image_url: self.image_url,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Listing {
    /// Replace the caller-editable fields, keeping id and timestamps.
    pub fn apply(mut self, changes: NewListing) -> Self {
        self.title = changes.title;
        self.description = changes.description;
        self.price = changes.price;
        self.category_id = changes.category_id;
        self.image_url = changes.image_url;
        self
    }

    /// Whether the listing was edited after it was posted.
    pub fn was_updated(&self) -> bool {
        self.updated_at > self.created_at
    }
}
