use serde::Serialize;

use crate::domain::category::Category;
use crate::domain::listing::Listing;
use crate::dto::{format_date, format_price};

/// A listing prepared for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    /// Price as shown to users, e.g. `$1,234.50`.
    pub price_display: String,
    pub category_id: String,
    /// Name of the referenced category; `None` for a dangling reference.
    pub category_name: Option<String>,
    pub image_url: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub posted_on: String,
    /// Only set when the listing was edited after it was posted.
    pub updated_on: Option<String>,
}

impl ListingDto {
    /// Build the view of `listing`, resolving its category name from
    /// `categories`.
    pub fn new(listing: Listing, categories: &[Category]) -> Self {
        let category_name = categories
            .iter()
            .find(|c| c.id == listing.category_id)
            .map(|c| c.name.to_string());
        let updated_on = listing
            .was_updated()
            .then(|| format_date(listing.updated_at));

        Self {
            price_display: format_price(listing.price.get()),
            posted_on: format_date(listing.created_at),
            updated_on,
            category_name,
            id: listing.id.into_inner(),
            title: listing.title.into_inner(),
            description: listing.description.into_inner(),
            price: listing.price.get(),
            category_id: listing.category_id.into_inner(),
            image_url: listing.image_url.into_inner(),
            created_at: listing.created_at.get(),
            updated_at: listing.updated_at.get(),
        }
    }

    /// Views of `listings`, each annotated with its category name.
    pub fn from_all(listings: Vec<Listing>, categories: &[Category]) -> Vec<Self> {
        listings
            .into_iter()
            .map(|listing| Self::new(listing, categories))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{
        CategoryId, CategoryName, ImageUrl, ListingDescription, ListingId, ListingPrice,
        ListingTitle, Timestamp,
    };

    fn listing(created_at: i64, updated_at: i64) -> Listing {
        Listing {
            id: ListingId::new("l1").unwrap(),
            title: ListingTitle::new("Phone").unwrap(),
            description: ListingDescription::new("Used").unwrap(),
            price: ListingPrice::new(1234.5).unwrap(),
            category_id: CategoryId::new("c1").unwrap(),
            image_url: ImageUrl::new("https://x.test/a.jpg").unwrap(),
            created_at: Timestamp::new(created_at).unwrap(),
            updated_at: Timestamp::new(updated_at).unwrap(),
        }
    }

    #[test]
    fn resolves_category_name_and_formats_price() {
        let categories = vec![Category {
            id: CategoryId::new("c1").unwrap(),
            name: CategoryName::new("Electronics").unwrap(),
            description: None,
        }];
        let dto = ListingDto::new(listing(0, 0), &categories);
        assert_eq!(dto.category_name.as_deref(), Some("Electronics"));
        assert_eq!(dto.price_display, "$1,234.50");
        assert_eq!(dto.posted_on, "1970-01-01");
    }

    #[test]
    fn dangling_category_has_no_name() {
        let dto = ListingDto::new(listing(0, 0), &[]);
        assert_eq!(dto.category_name, None);
    }

    #[test]
    fn last_updated_shown_only_after_edit() {
        assert_eq!(ListingDto::new(listing(5, 5), &[]).updated_on, None);
        let edited = ListingDto::new(listing(0, 1_700_000_000_000), &[]);
        assert_eq!(edited.updated_on.as_deref(), Some("2023-11-14"));
    }
}
