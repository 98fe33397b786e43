use serde::Serialize;

use crate::dto::categories::CategoryDto;
use crate::dto::listings::ListingDto;
use crate::repository::{CategoryReader, ListingReader};

use super::{ServiceError, ServiceResult};

/// Data rendered on the home page.
#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub listings: Vec<ListingDto>,
    pub categories: Vec<CategoryDto>,
}

/// Core business logic for rendering the home page.
///
/// Listings and categories are fetched concurrently; each listing is
/// annotated with the name of its category when that category exists.
pub async fn show_home<R>(repo: &R) -> ServiceResult<HomePage>
where
    R: ListingReader + CategoryReader,
{
    let (listings, categories) =
        match futures::try_join!(repo.list_listings(), repo.list_categories()) {
            Ok(result) => result,
            Err(e) => {
                log::error!("Failed to load home page data: {e}");
                return Err(ServiceError::Internal);
            }
        };

    Ok(HomePage {
        listings: ListingDto::from_all(listings, &categories),
        categories: categories.into_iter().map(CategoryDto::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::NewCategory;
    use crate::domain::listing::NewListing;
    use crate::domain::types::{
        CategoryId, CategoryName, ImageUrl, ListingDescription, ListingPrice, ListingTitle,
    };
    use crate::repository::test::{failing_repository, memory_repository};
    use crate::repository::{CategoryWriter, ListingWriter};

    fn new_listing(title: &str, category_id: &str) -> NewListing {
        NewListing {
            title: ListingTitle::new(title).unwrap(),
            description: ListingDescription::new("Used").unwrap(),
            price: ListingPrice::new(100.0).unwrap(),
            category_id: CategoryId::new(category_id).unwrap(),
            image_url: ImageUrl::new("https://x.test/a.jpg").unwrap(),
        }
    }

    #[actix_web::test]
    async fn home_lists_listings_with_category_names() {
        let repo = memory_repository();
        let category = repo
            .create_category(&NewCategory {
                name: CategoryName::new("Electronics").unwrap(),
                description: None,
            })
            .await
            .unwrap();
        repo.create_listing(&new_listing("Phone", category.id.as_str()))
            .await
            .unwrap();
        repo.create_listing(&new_listing("Orphan", "gone")).await.unwrap();

        let page = show_home(&repo).await.unwrap();

        assert_eq!(page.categories.len(), 1);
        assert_eq!(page.listings.len(), 2);
        assert_eq!(page.listings[0].title, "Phone");
        assert_eq!(page.listings[0].category_name.as_deref(), Some("Electronics"));
        assert_eq!(page.listings[1].category_name, None);
    }

    #[actix_web::test]
    async fn empty_store_renders_empty_home() {
        let page = show_home(&memory_repository()).await.unwrap();
        assert!(page.listings.is_empty());
        assert!(page.categories.is_empty());
    }

    #[actix_web::test]
    async fn store_failure_is_internal() {
        let err = show_home(&failing_repository()).await.unwrap_err();
        assert_eq!(err, ServiceError::Internal);
    }
}
