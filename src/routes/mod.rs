use actix_web::cookie::Key;
use actix_web::http::StatusCode;
use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, web};
use actix_web_flash_messages::storage::CookieMessageStore;
use actix_web_flash_messages::{FlashMessagesFramework, IncomingFlashMessages, Level};
use tera::{Context, Tera};

use crate::dto::categories::CategoryDto;
use crate::repository::StoreRepository;
use crate::services::categories::show_categories;

pub mod api;
pub mod categories;
pub mod listings;
pub mod main;

/// Register every page and API endpoint.
///
/// `/listings/new` is registered ahead of `/listings/{listing_id}` so the
/// literal segment wins. Unknown paths redirect to `/404`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(main::index)
        .service(main::not_found)
        .service(categories::show_category_listings)
        .service(categories::manage_categories)
        .service(categories::add_category)
        .service(categories::edit_category)
        .service(categories::update_category)
        .service(listings::new_listing)
        .service(listings::create_listing)
        .service(listings::show_listing)
        .service(listings::edit_listing)
        .service(listings::update_listing)
        .service(listings::delete_listing)
        .service(
            web::scope("/api")
                .service(api::api_v1_categories)
                .service(api::api_v1_listings)
                .service(api::api_v1_listing),
        )
        .default_service(web::to(main::redirect_to_not_found));
}

/// Flash message middleware storing messages in a cookie signed with
/// `secret`, which must be at least 64 bytes long.
pub fn flash_messages(secret: &str) -> Result<FlashMessagesFramework, String> {
    let key = Key::try_from(secret.as_bytes()).map_err(|e| e.to_string())?;
    let store = CookieMessageStore::builder(key).build();
    Ok(FlashMessagesFramework::builder(store).build())
}

pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    render_template_with_status(tera, StatusCode::OK, template, context)
}

pub fn render_template_with_status(
    tera: &Tera,
    status: StatusCode,
    template: &str,
    context: &Context,
) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(tera.render(template, context).unwrap_or_else(|e| {
            log::error!("Failed to render template '{template}': {e}");
            String::new()
        }))
}

/// Context shared by every page: pending alerts, the category menu and the
/// active page.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    categories: &[CategoryDto],
    current_page: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("menu_categories", categories);
    context.insert("current_page", current_page);
    context
}

/// Category menu for pages whose own data does not include it. A failure
/// leaves the menu empty.
pub async fn menu_categories(repo: &StoreRepository) -> Vec<CategoryDto> {
    show_categories(repo).await.unwrap_or_default()
}

/// Render the "not found" state with the given heading.
pub fn render_not_found(
    tera: &Tera,
    mut context: Context,
    title: &str,
    message: &str,
) -> HttpResponse {
    context.insert("title", title);
    context.insert("message", message);
    render_template_with_status(tera, StatusCode::NOT_FOUND, "main/not_found.html", &context)
}

/// Render the generic failure page with a retry prompt.
pub fn render_error(tera: &Tera, mut context: Context, message: &str) -> HttpResponse {
    context.insert("message", message);
    render_template_with_status(
        tera,
        StatusCode::INTERNAL_SERVER_ERROR,
        "main/error.html",
        &context,
    )
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .finish()
}
