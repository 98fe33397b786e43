use async_trait::async_trait;
use serde_json::Value;

use crate::domain::listing::{Listing, NewListing};
use crate::domain::types::{CategoryId, ListingId, Timestamp};
use crate::models::listing::{CATEGORY_ID_FIELD, Listing as StoredListing};
use crate::repository::{
    LISTINGS, ListingReader, ListingWriter, RepositoryError, RepositoryResult, StoreRepository,
    decode, decode_all,
};

fn to_document(listing: &Listing) -> RepositoryResult<Value> {
    serde_json::to_value(StoredListing::from(listing.clone()))
        .map_err(|e| RepositoryError::ValidationError(e.to_string()))
}

#[async_trait]
impl ListingReader for StoreRepository {
    async fn list_listings(&self) -> RepositoryResult<Vec<Listing>> {
        let path = Self::collection(LISTINGS)?;
        let children = self.store().children(&path).await?;
        Ok(decode_all(LISTINGS, children, StoredListing::into_domain))
    }

    async fn list_listings_by_category(
        &self,
        category_id: &CategoryId,
    ) -> RepositoryResult<Vec<Listing>> {
        let path = Self::collection(LISTINGS)?;
        let matches = self
            .store()
            .query_equal(
                &path,
                CATEGORY_ID_FIELD,
                &Value::String(category_id.as_str().to_string()),
            )
            .await?;
        Ok(decode_all(LISTINGS, matches, StoredListing::into_domain))
    }

    async fn get_listing_by_id(&self, id: &ListingId) -> RepositoryResult<Option<Listing>> {
        let path = Self::record(LISTINGS, id.as_str())?;
        match self.store().get(&path).await? {
            Some(value) => decode(id.as_str(), value, StoredListing::into_domain).map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ListingWriter for StoreRepository {
    async fn create_listing(&self, listing: &NewListing) -> RepositoryResult<Listing> {
        let path = Self::collection(LISTINGS)?;
        let now = Timestamp::now();
        let document = serde_json::to_value(StoredListing {
            title: listing.title.to_string(),
            description: listing.description.to_string(),
            price: listing.price.get(),
            category_id: listing.category_id.to_string(),
            image_url: listing.image_url.to_string(),
            created_at: now.get(),
            updated_at: now.get(),
        })
        .map_err(|e| RepositoryError::ValidationError(e.to_string()))?;

        let key = self.store().push(&path, document).await?;
        let id = ListingId::new(key)?;

        Ok(listing.clone().into_listing(id, now))
    }

    async fn update_listing(&self, listing: &Listing) -> RepositoryResult<Listing> {
        let path = Self::record(LISTINGS, listing.id.as_str())?;
        let mut written = listing.clone();
        written.updated_at = Timestamp::now().max(listing.updated_at);

        self.store().set(&path, to_document(&written)?).await?;
        Ok(written)
    }

    async fn delete_listing(&self, id: &ListingId) -> RepositoryResult<()> {
        let path = Self::record(LISTINGS, id.as_str())?;
        self.store().remove(&path).await?;
        Ok(())
    }
}
