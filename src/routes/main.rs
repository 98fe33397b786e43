use actix_web::{Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::repository::StoreRepository;
use crate::routes::{
    base_context, menu_categories, redirect, render_error, render_not_found, render_template,
};
use crate::services::main::show_home;

#[get("/")]
pub async fn index(
    flash_messages: IncomingFlashMessages,
    repo: web::Data<StoreRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_home(repo.get_ref()).await {
        Ok(page) => {
            let mut context = base_context(&flash_messages, &page.categories, "index");
            context.insert("listings", &page.listings);
            render_template(&tera, "main/index.html", &context)
        }
        Err(err) => {
            log::debug!("Failed to render home page: {err}");
            let context = base_context(&flash_messages, &[], "index");
            render_error(&tera, context, "Failed to load listings. Please try again.")
        }
    }
}

#[get("/404")]
pub async fn not_found(
    flash_messages: IncomingFlashMessages,
    repo: web::Data<StoreRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let categories = menu_categories(repo.get_ref()).await;
    let context = base_context(&flash_messages, &categories, "not_found");
    render_not_found(
        &tera,
        context,
        "Page Not Found",
        "The page you're looking for does not exist.",
    )
}

/// Fallback for every unmatched path.
pub async fn redirect_to_not_found() -> impl Responder {
    redirect("/404")
}
