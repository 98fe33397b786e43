//! Helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use actix_web_flash_messages::FlashMessagesFramework;
use async_trait::async_trait;
use lalafo_mini::domain::category::NewCategory;
use lalafo_mini::domain::listing::NewListing;
use lalafo_mini::domain::types::{
    CategoryId, CategoryName, ImageUrl, ListingDescription, ListingPrice, ListingTitle,
};
use lalafo_mini::repository::StoreRepository;
use lalafo_mini::routes::flash_messages;
use lalafo_mini::store::{DocumentStore, MemoryStore, StoreError, StorePath, StoreResult};
use serde_json::Value;
use tera::Tera;

pub const SECRET: &str = "integration-test-secret-0123456789abcdefghijklmnopqrstuvwxyzABCDEF";

/// Repository over a fresh in-memory store.
pub fn memory_repository() -> StoreRepository {
    StoreRepository::new(Arc::new(MemoryStore::new()))
}

/// Repository over an in-memory store pre-populated with `tree`.
pub fn seeded_repository(tree: Value) -> StoreRepository {
    StoreRepository::new(Arc::new(
        MemoryStore::with_tree(tree).expect("seed tree should be an object"),
    ))
}

/// Repository whose store denies every request.
pub fn failing_repository() -> StoreRepository {
    StoreRepository::new(Arc::new(DeniedStore))
}

pub fn templates() -> Tera {
    Tera::new("templates/**/*").expect("templates should parse")
}

pub fn flash_framework() -> FlashMessagesFramework {
    flash_messages(SECRET).expect("secret should be long enough")
}

pub fn new_category(name: &str) -> NewCategory {
    NewCategory {
        name: CategoryName::new(name).expect("valid category name"),
        description: None,
    }
}

pub fn new_listing(title: &str, price: f64, category_id: &CategoryId) -> NewListing {
    NewListing {
        title: ListingTitle::new(title).expect("valid title"),
        description: ListingDescription::new("In good condition").expect("valid description"),
        price: ListingPrice::new(price).expect("valid price"),
        category_id: category_id.clone(),
        image_url: ImageUrl::new("https://images.test/item.jpg").expect("valid url"),
    }
}

struct DeniedStore;

fn denied() -> StoreError {
    StoreError::PermissionDenied("Permission denied".to_string())
}

#[async_trait]
impl DocumentStore for DeniedStore {
    fn backend_tag(&self) -> &'static str {
        "denied"
    }

    async fn get(&self, _path: &StorePath) -> StoreResult<Option<Value>> {
        Err(denied())
    }

    async fn children(&self, _path: &StorePath) -> StoreResult<Vec<(String, Value)>> {
        Err(denied())
    }

    async fn set(&self, _path: &StorePath, _value: Value) -> StoreResult<()> {
        Err(denied())
    }

    async fn push(&self, _path: &StorePath, _value: Value) -> StoreResult<String> {
        Err(denied())
    }

    async fn remove(&self, _path: &StorePath) -> StoreResult<()> {
        Err(denied())
    }

    async fn query_equal(
        &self,
        _path: &StorePath,
        _child: &str,
        _value: &Value,
    ) -> StoreResult<Vec<(String, Value)>> {
        Err(denied())
    }
}
