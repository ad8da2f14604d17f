//! Administration panel, mounted under `/admin`.
//!
//! Every handler takes an [`AdminUser`], so anonymous visitors are sent to
//! the login page and logged-in non-admins get a 403.

mod posts;
mod users;

use actix_web::{HttpResponse, Scope, web};

use crate::middleware::{AdminUser, AppResult, CurrentUser, Session};
use crate::state::AppState;
use crate::views;

pub fn scope() -> Scope {
    web::scope("/admin")
        .route("", web::get().to(|| async { views::redirect("/admin/") }))
        .route("/", web::get().to(dashboard))
        .route("/users/", web::get().to(users::list))
        .service(
            web::resource("/users/new")
                .route(web::get().to(users::create_form))
                .route(web::post().to(users::create)),
        )
        .service(
            web::resource("/users/edit/{id}")
                .route(web::get().to(users::edit_form))
                .route(web::post().to(users::edit)),
        )
        .route("/users/delete/{id}", web::post().to(users::delete))
        .route("/posts/", web::get().to(posts::list))
        .service(
            web::resource("/posts/new")
                .route(web::get().to(posts::create_form))
                .route(web::post().to(posts::create)),
        )
        .service(
            web::resource("/posts/edit/{id}")
                .route(web::get().to(posts::edit_form))
                .route(web::post().to(posts::edit)),
        )
        .route("/posts/delete/{id}", web::post().to(posts::delete))
}

/// GET /admin/
async fn dashboard(
    state: web::Data<AppState>,
    session: Session,
    current: CurrentUser,
    _admin: AdminUser,
) -> AppResult<HttpResponse> {
    let counts = state.post_admin().dashboard().await?;
    let mut ctx = views::page("Admin", &session, &current);
    ctx.insert("counts", &counts);
    views::render("admin/index.html", &ctx)
}
