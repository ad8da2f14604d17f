//! HTTP handlers and route configuration.

mod account;
mod admin;
mod auth;
mod health;
mod home;
mod media;
mod posts;

use actix_web::{HttpResponse, http::StatusCode, web};
use uuid::Uuid;

use crate::middleware::{AppError, AppResult};
use crate::views;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(home::index))
        .route("/index", web::get().to(home::index))
        .route("/health", web::get().to(health::health_check))
        // Accounts
        .service(
            web::resource("/register")
                .route(web::get().to(auth::register_form))
                .route(web::post().to(auth::register)),
        )
        .service(
            web::resource("/login")
                .route(web::get().to(auth::login_form))
                .route(web::post().to(auth::login)),
        )
        .route("/logout", web::get().to(auth::logout))
        .service(
            web::resource("/account")
                .route(web::get().to(account::show))
                .route(web::post().to(account::update)),
        )
        // Posts
        .route("/posts", web::get().to(posts::list))
        .route("/post/{id}", web::get().to(posts::show))
        .service(
            web::resource("/create_post")
                .route(web::get().to(posts::create_form))
                .route(web::post().to(posts::create)),
        )
        .service(
            web::resource("/edit_post/{id}")
                .route(web::get().to(posts::edit_form))
                .route(web::post().to(posts::edit)),
        )
        .route("/delete_post/{id}", web::post().to(posts::delete))
        // Media
        .route(
            "/media/profile_pics/{name}",
            web::get().to(media::profile_picture),
        )
        .service(admin::scope())
        .default_service(web::to(not_found));
}

async fn not_found() -> HttpResponse {
    views::error_page(StatusCode::NOT_FOUND, "That page does not exist.")
}

/// Ids arrive as path text; anything that is not a UUID cannot exist.
pub(crate) fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("no entity with id {raw}")))
}
