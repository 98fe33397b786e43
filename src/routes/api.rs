use actix_web::{HttpResponse, Responder, get, web};

use crate::repository::StoreRepository;
use crate::services::ServiceError;
use crate::services::api::{
    ApiV1ListingsQueryParams, api_v1_categories as api_v1_categories_service,
    api_v1_listing as api_v1_listing_service, api_v1_listings as api_v1_listings_service,
};

#[get("/v1/categories")]
pub async fn api_v1_categories(repo: web::Data<StoreRepository>) -> impl Responder {
    match api_v1_categories_service(repo.get_ref()).await {
        Ok(categories) => HttpResponse::Ok().json(categories),
        Err(_) => HttpResponse::InternalServerError().finish(),
    }
}

#[get("/v1/listings")]
pub async fn api_v1_listings(
    params: web::Query<ApiV1ListingsQueryParams>,
    repo: web::Data<StoreRepository>,
) -> impl Responder {
    match api_v1_listings_service(params.into_inner(), repo.get_ref()).await {
        Ok(listings) => HttpResponse::Ok().json(listings),
        Err(_) => HttpResponse::InternalServerError().finish(),
    }
}

#[get("/v1/listings/{listing_id}")]
pub async fn api_v1_listing(
    listing_id: web::Path<String>,
    repo: web::Data<StoreRepository>,
) -> impl Responder {
    match api_v1_listing_service(&listing_id, repo.get_ref()).await {
        Ok(listing) => HttpResponse::Ok().json(listing),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(_) => HttpResponse::InternalServerError().finish(),
    }
}
