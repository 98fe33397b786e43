use serde::Serialize;

use crate::domain::category::Category;
use crate::domain::types::CategoryId;
use crate::dto::categories::CategoryDto;
use crate::dto::listings::ListingDto;
use crate::forms::categories::CategoryFormPayload;
use crate::repository::{CategoryReader, CategoryWriter, ListingReader};

use super::{ServiceError, ServiceResult};

/// Data rendered on a category page.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryListingsPage {
    /// Id taken from the request path.
    pub category_id: String,
    /// `None` when no category with that id exists.
    pub category: Option<CategoryDto>,
    pub listings: Vec<ListingDto>,
    pub categories: Vec<CategoryDto>,
}

pub async fn show_categories<R>(repo: &R) -> ServiceResult<Vec<CategoryDto>>
where
    R: CategoryReader,
{
    match repo.list_categories().await {
        Ok(categories) => Ok(categories.into_iter().map(CategoryDto::from).collect()),
        Err(e) => {
            log::error!("Failed to list categories: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Listings of one category together with the category list.
///
/// A category that does not exist is not an error: the page still shows any
/// listings that reference the id.
pub async fn show_category_listings<R>(
    category_id: &str,
    repo: &R,
) -> ServiceResult<CategoryListingsPage>
where
    R: CategoryReader + ListingReader,
{
    let (listings, categories) = match CategoryId::new(category_id) {
        Ok(id) => futures::try_join!(repo.list_listings_by_category(&id), repo.list_categories()),
        Err(_) => repo.list_categories().await.map(|c| (Vec::new(), c)),
    }
    .map_err(|e| {
        log::error!("Failed to load listings of category {category_id}: {e}");
        ServiceError::Internal
    })?;

    let category = categories
        .iter()
        .find(|c| c.id.as_str() == category_id)
        .map(CategoryDto::from);

    Ok(CategoryListingsPage {
        category_id: category_id.to_string(),
        category,
        listings: ListingDto::from_all(listings, &categories),
        categories: categories.into_iter().map(CategoryDto::from).collect(),
    })
}

/// Look up the category shown on the edit page.
pub async fn get_category<R>(category_id: &str, repo: &R) -> ServiceResult<Category>
where
    R: CategoryReader,
{
    let id = CategoryId::new(category_id).map_err(|_| ServiceError::NotFound)?;

    match repo.get_category_by_id(&id).await {
        Ok(Some(category)) => Ok(category),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category {category_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub async fn add_category<R>(payload: CategoryFormPayload, repo: &R) -> ServiceResult<Category>
where
    R: CategoryWriter,
{
    match repo.create_category(&payload.into_new_category()).await {
        Ok(category) => {
            log::info!("Created category {}", category.id);
            Ok(category)
        }
        Err(e) => {
            log::error!("Failed to create category: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Overwrite the category at `category_id` with the submitted fields.
pub async fn update_category<R>(
    category_id: &str,
    payload: CategoryFormPayload,
    repo: &R,
) -> ServiceResult<Category>
where
    R: CategoryReader + CategoryWriter,
{
    let existing = get_category(category_id, repo).await?;
    let category = payload.into_category(existing.id);

    match repo.update_category(&category).await {
        Ok(()) => Ok(category),
        Err(e) => {
            log::error!("Failed to update category {category_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}
