use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::dto::categories::CategoryDto;
use crate::forms::categories::{CategoryForm, CategoryFormState};
use crate::repository::StoreRepository;
use crate::routes::{
    base_context, menu_categories, redirect, render_error, render_not_found, render_template,
};
use crate::services::ServiceError;
use crate::services::categories::{
    add_category as add_category_service, get_category as get_category_service,
    show_categories as show_categories_service,
    show_category_listings as show_category_listings_service,
    update_category as update_category_service,
};

const CATEGORY_NOT_FOUND: &str = "Category not found.";

#[get("/categories/{category_id}")]
pub async fn show_category_listings(
    category_id: web::Path<String>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<StoreRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_category_listings_service(&category_id, repo.get_ref()).await {
        Ok(page) => {
            let mut context = base_context(&flash_messages, &page.categories, "category");
            context.insert("category_id", &page.category_id);
            context.insert("category", &page.category);
            context.insert("listings", &page.listings);
            render_template(&tera, "categories/listings.html", &context)
        }
        Err(err) => {
            log::debug!("Failed to render category page: {err}");
            let context = base_context(&flash_messages, &[], "category");
            render_error(&tera, context, "Failed to load listings. Please try again.")
        }
    }
}

/// Render the management page around `form`. `form_error` is a message that
/// is not tied to a single field.
async fn render_manage_page(
    repo: &StoreRepository,
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    form: &CategoryFormState,
    form_error: Option<&str>,
) -> HttpResponse {
    let (categories, load_error) = match show_categories_service(repo).await {
        Ok(categories) => (categories, None),
        Err(_) => (
            Vec::new(),
            Some("Failed to load categories. Please try again."),
        ),
    };

    let mut context = base_context(flash_messages, &categories, "categories");
    context.insert("categories", &categories);
    context.insert("form", form);
    context.insert("form_action", "/admin/categories");
    context.insert("submit_label", "Create Category");
    context.insert("form_error", &form_error);
    context.insert("load_error", &load_error);
    render_template(tera, "categories/manage.html", &context)
}

#[get("/admin/categories")]
pub async fn manage_categories(
    flash_messages: IncomingFlashMessages,
    repo: web::Data<StoreRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let form = CategoryFormState::new(None);
    render_manage_page(repo.get_ref(), &tera, &flash_messages, &form, None).await
}

#[post("/admin/categories")]
pub async fn add_category(
    flash_messages: IncomingFlashMessages,
    repo: web::Data<StoreRepository>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<CategoryForm>,
) -> impl Responder {
    let payload = match CategoryFormState::submitted(form.clone()).submit() {
        Ok(payload) => payload,
        Err(state) => {
            return render_manage_page(repo.get_ref(), &tera, &flash_messages, &state, None)
                .await;
        }
    };

    match add_category_service(payload, repo.get_ref()).await {
        Ok(_) => {
            FlashMessage::success("Category created.").send();
            redirect("/admin/categories")
        }
        Err(err) => {
            log::debug!("Failed to add category: {err}");
            let state = CategoryFormState::submitted(form);
            render_manage_page(
                repo.get_ref(),
                &tera,
                &flash_messages,
                &state,
                Some("Failed to create category. Please try again."),
            )
            .await
        }
    }
}

fn render_edit_page(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    categories: &[CategoryDto],
    category_id: &str,
    form: &CategoryFormState,
    form_error: Option<&str>,
) -> HttpResponse {
    let mut context = base_context(flash_messages, categories, "categories");
    context.insert("category_id", category_id);
    context.insert("form", form);
    context.insert("form_action", &format!("/admin/categories/{category_id}/edit"));
    context.insert("submit_label", "Update Category");
    context.insert("form_error", &form_error);
    render_template(tera, "categories/edit.html", &context)
}

#[get("/admin/categories/{category_id}/edit")]
pub async fn edit_category(
    category_id: web::Path<String>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<StoreRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let categories = menu_categories(repo.get_ref()).await;

    match get_category_service(&category_id, repo.get_ref()).await {
        Ok(category) => {
            let form = CategoryFormState::new(Some(&category));
            render_edit_page(&tera, &flash_messages, &categories, &category_id, &form, None)
        }
        Err(ServiceError::NotFound) => {
            let context = base_context(&flash_messages, &categories, "categories");
            render_not_found(&tera, context, "Category Not Found", CATEGORY_NOT_FOUND)
        }
        Err(err) => {
            log::debug!("Failed to render category edit page: {err}");
            let context = base_context(&flash_messages, &categories, "categories");
            render_error(&tera, context, "Failed to load category. Please try again.")
        }
    }
}

#[post("/admin/categories/{category_id}/edit")]
pub async fn update_category(
    category_id: web::Path<String>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<StoreRepository>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<CategoryForm>,
) -> impl Responder {
    let payload = match CategoryFormState::submitted(form.clone()).submit() {
        Ok(payload) => payload,
        Err(state) => {
            let categories = menu_categories(repo.get_ref()).await;
            return render_edit_page(
                &tera,
                &flash_messages,
                &categories,
                &category_id,
                &state,
                None,
            );
        }
    };

    match update_category_service(&category_id, payload, repo.get_ref()).await {
        Ok(_) => {
            FlashMessage::success("Category updated.").send();
            redirect("/admin/categories")
        }
        Err(ServiceError::NotFound) => {
            let categories = menu_categories(repo.get_ref()).await;
            let context = base_context(&flash_messages, &categories, "categories");
            render_not_found(&tera, context, "Category Not Found", CATEGORY_NOT_FOUND)
        }
        Err(err) => {
            log::debug!("Failed to update category: {err}");
            let categories = menu_categories(repo.get_ref()).await;
            let state = CategoryFormState::submitted(form);
            render_edit_page(
                &tera,
                &flash_messages,
                &categories,
                &category_id,
                &state,
                Some("Failed to update category. Please try again."),
            )
        }
    }
}
