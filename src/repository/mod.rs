use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::category::{Category, NewCategory};
use crate::domain::listing::{Listing, NewListing};
use crate::domain::types::{CategoryId, ListingId, TypeConstraintError};
use crate::store::{DocumentStore, StorePath};

pub mod category;
pub mod errors;
pub mod listing;

pub use errors::{RepositoryError, RepositoryResult};

/// Collection holding category documents.
pub const CATEGORIES: &str = "categories";
/// Collection holding listing documents.
pub const LISTINGS: &str = "listings";

/// Repository implementation backed by a [`DocumentStore`].
///
/// The store handle is reference counted, allowing the repository to be
/// passed around freely between handlers.
#[derive(Clone)]
pub struct StoreRepository {
    store: Arc<dyn DocumentStore>,
}

impl StoreRepository {
    /// Create a new repository over an established store backend.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    fn collection(name: &str) -> RepositoryResult<StorePath> {
        Ok(StorePath::collection(name)?)
    }

    fn record(name: &str, key: &str) -> RepositoryResult<StorePath> {
        Ok(StorePath::collection(name)?.child(key)?)
    }
}

/// Decode one stored document; `into_domain` turns the raw model into the
/// domain type for the node key.
fn decode<M, T>(
    key: &str,
    value: Value,
    into_domain: impl FnOnce(M, &str) -> Result<T, TypeConstraintError>,
) -> RepositoryResult<T>
where
    M: DeserializeOwned,
{
    let model: M = serde_json::from_value(value)
        .map_err(|e| RepositoryError::ValidationError(format!("{key}: {e}")))?;
    into_domain(model, key).map_err(|e| RepositoryError::ValidationError(format!("{key}: {e}")))
}

/// Decode every child of a collection, skipping documents that do not fit the
/// domain model so one malformed record cannot hide the rest.
fn decode_all<M, T>(
    collection: &str,
    children: Vec<(String, Value)>,
    into_domain: impl Fn(M, &str) -> Result<T, TypeConstraintError>,
) -> Vec<T>
where
    M: DeserializeOwned,
{
    children
        .into_iter()
        .filter_map(|(key, value)| match decode::<M, T>(&key, value, &into_domain) {
            Ok(item) => Some(item),
            Err(e) => {
                log::warn!("Skipping malformed record in {collection}: {e}");
                None
            }
        })
        .collect()
}

/// Read-only operations for category entities.
#[async_trait]
pub trait CategoryReader {
    /// List every category.
    async fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
    /// Retrieve a category by its identifier.
    async fn get_category_by_id(&self, id: &CategoryId) -> RepositoryResult<Option<Category>>;
}

/// Write operations for category entities. Categories are never deleted.
#[async_trait]
pub trait CategoryWriter {
    /// Persist a new category under a store-assigned key.
    async fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category>;
    /// Overwrite the stored category at its id.
    async fn update_category(&self, category: &Category) -> RepositoryResult<()>;
}

/// Read-only operations for listing entities.
#[async_trait]
pub trait ListingReader {
    /// List every listing.
    async fn list_listings(&self) -> RepositoryResult<Vec<Listing>>;
    /// List listings whose `category_id` equals `category_id`.
    async fn list_listings_by_category(
        &self,
        category_id: &CategoryId,
    ) -> RepositoryResult<Vec<Listing>>;
    /// Retrieve a listing by its identifier.
    async fn get_listing_by_id(&self, id: &ListingId) -> RepositoryResult<Option<Listing>>;
}

/// Write operations for listing entities.
#[async_trait]
pub trait ListingWriter {
    /// Persist a new listing, stamping both timestamps with the write time.
    async fn create_listing(&self, listing: &NewListing) -> RepositoryResult<Listing>;
    /// Overwrite the stored listing, refreshing `updated_at`. Returns the
    /// record as written.
    async fn update_listing(&self, listing: &Listing) -> RepositoryResult<Listing>;
    /// Delete a listing by id.
    async fn delete_listing(&self, id: &ListingId) -> RepositoryResult<()>;
}
