use serde::Serialize;

use crate::domain::listing::Listing;
use crate::domain::types::ListingId;
use crate::dto::categories::CategoryDto;
use crate::dto::listings::ListingDto;
use crate::forms::listings::{CATEGORY_UNKNOWN, ListingFormPayload, ListingFormState};
use crate::repository::{CategoryReader, ListingReader, ListingWriter};

use super::{ServiceError, ServiceResult};

/// Data rendered on the listing detail page.
#[derive(Debug, Clone, Serialize)]
pub struct ListingPage {
    pub listing: ListingDto,
    /// `None` when the listing references a category that no longer exists.
    pub category: Option<CategoryDto>,
    pub categories: Vec<CategoryDto>,
}

fn parse_listing_id(listing_id: &str) -> ServiceResult<ListingId> {
    ListingId::new(listing_id).map_err(|_| ServiceError::NotFound)
}

pub async fn show_listing<R>(listing_id: &str, repo: &R) -> ServiceResult<ListingPage>
where
    R: ListingReader + CategoryReader,
{
    let id = parse_listing_id(listing_id)?;

    let (listing, categories) =
        match futures::try_join!(repo.get_listing_by_id(&id), repo.list_categories()) {
            Ok(result) => result,
            Err(e) => {
                log::error!("Failed to load listing {listing_id}: {e}");
                return Err(ServiceError::Internal);
            }
        };
    let listing = listing.ok_or(ServiceError::NotFound)?;

    let category = categories
        .iter()
        .find(|c| c.id == listing.category_id)
        .map(CategoryDto::from);

    Ok(ListingPage {
        listing: ListingDto::new(listing, &categories),
        category,
        categories: categories.into_iter().map(CategoryDto::from).collect(),
    })
}

/// Open the listing form: empty with an optional category pre-selection, or
/// pre-filled from the listing at `listing_id`.
pub async fn open_listing_form<R>(
    listing_id: Option<&str>,
    preselected: Option<String>,
    repo: &R,
) -> ServiceResult<ListingFormState>
where
    R: ListingReader + CategoryReader,
{
    let Some(listing_id) = listing_id else {
        let state = ListingFormState::new(None, preselected);
        return Ok(load_form_categories(state, repo).await);
    };

    let id = parse_listing_id(listing_id)?;
    let (listing, categories) =
        match futures::try_join!(repo.get_listing_by_id(&id), repo.list_categories()) {
            Ok(result) => result,
            Err(e) => {
                log::error!("Failed to load listing {listing_id} for editing: {e}");
                return Err(ServiceError::Internal);
            }
        };
    let listing = listing.ok_or(ServiceError::NotFound)?;

    Ok(ListingFormState::new(Some(&listing), preselected).categories_loaded(categories))
}

/// Fetch the category options of `state`.
///
/// A failed fetch is logged and leaves the options pending so the form can
/// still be shown with the user's input.
pub async fn load_form_categories<R>(state: ListingFormState, repo: &R) -> ListingFormState
where
    R: CategoryReader,
{
    match repo.list_categories().await {
        Ok(categories) => state.categories_loaded(categories),
        Err(e) => {
            log::error!("Failed to load categories for listing form: {e}");
            state
        }
    }
}

/// Persist a new listing. The referenced category must exist.
pub async fn create_listing<R>(payload: ListingFormPayload, repo: &R) -> ServiceResult<Listing>
where
    R: ListingWriter + CategoryReader,
{
    match repo.get_category_by_id(&payload.category_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ServiceError::Form(CATEGORY_UNKNOWN.to_string())),
        Err(e) => {
            log::error!("Failed to check category {}: {e}", payload.category_id);
            return Err(ServiceError::Internal);
        }
    }

    match repo.create_listing(&payload.into_new_listing()).await {
        Ok(listing) => {
            log::info!("Created listing {}", listing.id);
            Ok(listing)
        }
        Err(e) => {
            log::error!("Failed to create listing: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Overwrite the listing at `listing_id` with the submitted fields.
///
/// `created_at` is carried over from the stored record; the repository
/// refreshes `updated_at`.
pub async fn update_listing<R>(
    listing_id: &str,
    payload: ListingFormPayload,
    repo: &R,
) -> ServiceResult<Listing>
where
    R: ListingReader + ListingWriter + CategoryReader,
{
    let id = parse_listing_id(listing_id)?;

    let (existing, category) = match futures::try_join!(
        repo.get_listing_by_id(&id),
        repo.get_category_by_id(&payload.category_id)
    ) {
        Ok(result) => result,
        Err(e) => {
            log::error!("Failed to load listing {listing_id} for update: {e}");
            return Err(ServiceError::Internal);
        }
    };
    let existing = existing.ok_or(ServiceError::NotFound)?;
    if category.is_none() {
        return Err(ServiceError::Form(CATEGORY_UNKNOWN.to_string()));
    }

    match repo
        .update_listing(&existing.apply(payload.into_new_listing()))
        .await
    {
        Ok(listing) => Ok(listing),
        Err(e) => {
            log::error!("Failed to update listing {listing_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub async fn delete_listing<R>(listing_id: &str, repo: &R) -> ServiceResult<()>
where
    R: ListingWriter,
{
    let id = parse_listing_id(listing_id)?;

    match repo.delete_listing(&id).await {
        Ok(()) => {
            log::info!("Deleted listing {id}");
            Ok(())
        }
        Err(e) => {
            log::error!("Failed to delete listing {listing_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}
