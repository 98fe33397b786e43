use serde::Deserialize;

use crate::domain::category::Category;
use crate::domain::listing::Listing;
use crate::domain::types::{CategoryId, ListingId};
use crate::repository::{CategoryReader, ListingReader};

use super::{ServiceError, ServiceResult};

/// Query parameters accepted by the `/api/v1/listings` endpoint.
#[derive(Deserialize, Debug, Default)]
pub struct ApiV1ListingsQueryParams {
    pub category_id: Option<String>,
}

pub async fn api_v1_categories<R>(repo: &R) -> ServiceResult<Vec<Category>>
where
    R: CategoryReader,
{
    repo.list_categories().await.map_err(|e| {
        log::error!("Failed to list categories: {e}");
        ServiceError::Internal
    })
}

/// All listings, or only those of `category_id` when given. An id that can
/// never exist yields an empty list.
pub async fn api_v1_listings<R>(
    params: ApiV1ListingsQueryParams,
    repo: &R,
) -> ServiceResult<Vec<Listing>>
where
    R: ListingReader,
{
    let result = match params.category_id.as_deref() {
        Some(category_id) if !category_id.is_empty() => match CategoryId::new(category_id) {
            Ok(id) => repo.list_listings_by_category(&id).await,
            Err(_) => return Ok(Vec::new()),
        },
        _ => repo.list_listings().await,
    };

    result.map_err(|e| {
        log::error!("Failed to list listings: {e}");
        ServiceError::Internal
    })
}

pub async fn api_v1_listing<R>(listing_id: &str, repo: &R) -> ServiceResult<Listing>
where
    R: ListingReader,
{
    let id = ListingId::new(listing_id).map_err(|_| ServiceError::NotFound)?;

    match repo.get_listing_by_id(&id).await {
        Ok(Some(listing)) => Ok(listing),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get listing {listing_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::NewListing;
    use crate::domain::types::{ImageUrl, ListingDescription, ListingPrice, ListingTitle};
    use crate::repository::ListingWriter;
    use crate::repository::test::{failing_repository, memory_repository};

    fn new_listing(title: &str, category_id: &str) -> NewListing {
        NewListing {
            title: ListingTitle::new(title).unwrap(),
            description: ListingDescription::new("Used").unwrap(),
            price: ListingPrice::new(1.0).unwrap(),
            category_id: CategoryId::new(category_id).unwrap(),
            image_url: ImageUrl::new("https://x.test/a.jpg").unwrap(),
        }
    }

    #[actix_web::test]
    async fn filters_listings_by_category() {
        let repo = memory_repository();
        repo.create_listing(&new_listing("A", "c1")).await.unwrap();
        repo.create_listing(&new_listing("B", "c2")).await.unwrap();

        let all = api_v1_listings(ApiV1ListingsQueryParams::default(), &repo)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let params = ApiV1ListingsQueryParams {
            category_id: Some("c2".into()),
        };
        let filtered = api_v1_listings(params, &repo).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title.as_str(), "B");

        let params = ApiV1ListingsQueryParams {
            category_id: Some("bad/id".into()),
        };
        assert!(api_v1_listings(params, &repo).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn missing_listing_is_not_found() {
        let repo = memory_repository();
        assert_eq!(
            api_v1_listing("nope", &repo).await.unwrap_err(),
            ServiceError::NotFound
        );
    }

    #[actix_web::test]
    async fn store_failure_is_internal() {
        assert_eq!(
            api_v1_categories(&failing_repository()).await.unwrap_err(),
            ServiceError::Internal
        );
    }
}
