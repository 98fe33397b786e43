use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;

use crate::dto::categories::CategoryDto;
use crate::forms::listings::{CategoryOptions, ListingField, ListingForm, ListingFormState};
use crate::repository::StoreRepository;
use crate::routes::{
    base_context, menu_categories, redirect, render_error, render_not_found, render_template,
};
use crate::services::ServiceError;
use crate::services::listings::{
    create_listing as create_listing_service, delete_listing as delete_listing_service,
    load_form_categories, open_listing_form, show_listing as show_listing_service,
    update_listing as update_listing_service,
};

const LISTING_NOT_FOUND_TITLE: &str = "Listing Not Found";
const LISTING_NOT_FOUND: &str = "The listing you're looking for does not exist or has been removed.";

#[derive(Deserialize)]
struct NewListingQueryParams {
    category: Option<String>,
}

#[derive(Deserialize)]
struct ListingQueryParams {
    #[serde(default)]
    confirm_delete: bool,
}

/// Where a listing form posts to.
enum FormTarget<'a> {
    Create,
    Edit(&'a str),
}

impl FormTarget<'_> {
    fn action(&self) -> String {
        match self {
            Self::Create => "/listings".to_string(),
            Self::Edit(id) => format!("/listings/{id}/edit"),
        }
    }

    fn heading(&self) -> &'static str {
        match self {
            Self::Create => "Create New Listing",
            Self::Edit(_) => "Edit Listing",
        }
    }
}

fn render_form(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    target: FormTarget<'_>,
    form: &ListingFormState,
    form_error: Option<&str>,
) -> HttpResponse {
    let categories = form
        .categories()
        .iter()
        .map(CategoryDto::from)
        .collect::<Vec<_>>();
    let load_error = matches!(form.options, CategoryOptions::Pending { .. })
        .then_some("Failed to load categories. Please try again.");

    let mut context = base_context(flash_messages, &categories, "listing_form");
    context.insert("form", form);
    context.insert("form_categories", &categories);
    context.insert("form_action", &target.action());
    context.insert("heading", target.heading());
    context.insert("form_error", &form_error);
    context.insert("load_error", &load_error);
    render_template(tera, "listings/form.html", &context)
}

async fn render_listing_not_found(
    repo: &StoreRepository,
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
) -> HttpResponse {
    let categories = menu_categories(repo).await;
    let context = base_context(flash_messages, &categories, "listing");
    render_not_found(tera, context, LISTING_NOT_FOUND_TITLE, LISTING_NOT_FOUND)
}

/// Re-render a submitted form after the service refused it.
async fn rerender_rejected(
    repo: &StoreRepository,
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    target: FormTarget<'_>,
    form: ListingForm,
    err: ServiceError,
    failure: &str,
) -> HttpResponse {
    let mut state = ListingFormState::submitted(form);
    let mut form_error = None;
    match err {
        ServiceError::Form(message) => {
            state = state.with_error(ListingField::CategoryId, message);
        }
        err => {
            log::debug!("Listing form submission failed: {err}");
            form_error = Some(failure);
        }
    }
    let state = load_form_categories(state, repo).await;
    render_form(tera, flash_messages, target, &state, form_error)
}

#[get("/listings/new")]
pub async fn new_listing(
    params: web::Query<NewListingQueryParams>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<StoreRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let preselected = params.into_inner().category;
    match open_listing_form(None, preselected, repo.get_ref()).await {
        Ok(state) => render_form(&tera, &flash_messages, FormTarget::Create, &state, None),
        Err(err) => {
            log::debug!("Failed to open listing form: {err}");
            let context = base_context(&flash_messages, &[], "listing_form");
            render_error(&tera, context, "Failed to load categories. Please try again.")
        }
    }
}

#[post("/listings")]
pub async fn create_listing(
    flash_messages: IncomingFlashMessages,
    repo: web::Data<StoreRepository>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<ListingForm>,
) -> impl Responder {
    let payload = match ListingFormState::submitted(form.clone()).submit() {
        Ok(payload) => payload,
        Err(state) => {
            let state = load_form_categories(state, repo.get_ref()).await;
            return render_form(&tera, &flash_messages, FormTarget::Create, &state, None);
        }
    };

    match create_listing_service(payload, repo.get_ref()).await {
        Ok(listing) => {
            FlashMessage::success("Listing created.").send();
            redirect(&format!("/listings/{}", listing.id))
        }
        Err(err) => {
            rerender_rejected(
                repo.get_ref(),
                &tera,
                &flash_messages,
                FormTarget::Create,
                form,
                err,
                "Failed to create listing. Please try again.",
            )
            .await
        }
    }
}

#[get("/listings/{listing_id}")]
pub async fn show_listing(
    listing_id: web::Path<String>,
    params: web::Query<ListingQueryParams>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<StoreRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_listing_service(&listing_id, repo.get_ref()).await {
        Ok(page) => {
            let mut context = base_context(&flash_messages, &page.categories, "listing");
            context.insert("listing", &page.listing);
            context.insert("category", &page.category);
            context.insert("confirm_delete", &params.confirm_delete);
            render_template(&tera, "listings/detail.html", &context)
        }
        Err(ServiceError::NotFound) => {
            render_listing_not_found(repo.get_ref(), &tera, &flash_messages).await
        }
        Err(err) => {
            log::debug!("Failed to render listing page: {err}");
            let context = base_context(&flash_messages, &[], "listing");
            render_error(&tera, context, "Failed to load listing. Please try again.")
        }
    }
}

#[get("/listings/{listing_id}/edit")]
pub async fn edit_listing(
    listing_id: web::Path<String>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<StoreRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match open_listing_form(Some(listing_id.as_str()), None, repo.get_ref()).await {
        Ok(state) => render_form(
            &tera,
            &flash_messages,
            FormTarget::Edit(listing_id.as_str()),
            &state,
            None,
        ),
        Err(ServiceError::NotFound) => {
            render_listing_not_found(repo.get_ref(), &tera, &flash_messages).await
        }
        Err(err) => {
            log::debug!("Failed to render listing edit page: {err}");
            let context = base_context(&flash_messages, &[], "listing_form");
            render_error(&tera, context, "Failed to load listing. Please try again.")
        }
    }
}

#[post("/listings/{listing_id}/edit")]
pub async fn update_listing(
    listing_id: web::Path<String>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<StoreRepository>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<ListingForm>,
) -> impl Responder {
    let payload = match ListingFormState::submitted(form.clone()).submit() {
        Ok(payload) => payload,
        Err(state) => {
            let state = load_form_categories(state, repo.get_ref()).await;
            return render_form(
                &tera,
                &flash_messages,
                FormTarget::Edit(listing_id.as_str()),
                &state,
                None,
            );
        }
    };

    match update_listing_service(&listing_id, payload, repo.get_ref()).await {
        Ok(listing) => {
            FlashMessage::success("Listing updated.").send();
            redirect(&format!("/listings/{}", listing.id))
        }
        Err(ServiceError::NotFound) => {
            render_listing_not_found(repo.get_ref(), &tera, &flash_messages).await
        }
        Err(err) => {
            rerender_rejected(
                repo.get_ref(),
                &tera,
                &flash_messages,
                FormTarget::Edit(listing_id.as_str()),
                form,
                err,
                "Failed to update listing. Please try again.",
            )
            .await
        }
    }
}

#[post("/listings/{listing_id}/delete")]
pub async fn delete_listing(
    listing_id: web::Path<String>,
    repo: web::Data<StoreRepository>,
) -> impl Responder {
    match delete_listing_service(&listing_id, repo.get_ref()).await {
        Ok(()) => {
            FlashMessage::success("Listing deleted.").send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => redirect("/404"),
        Err(err) => {
            log::debug!("Failed to delete listing: {err}");
            FlashMessage::error("Failed to delete listing. Please try again.").send();
            redirect(&format!("/listings/{listing_id}"))
        }
    }
}
