//! Access-control extractors.
//!
//! ```ignore
//! async fn account(user: AuthUser) -> impl Responder { ... }
//! async fn dashboard(admin: AdminUser) -> impl Responder { ... }
//! ```

use std::future::{Ready, ready};

use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError, dev::Payload};

use quill_core::domain::User;
use quill_core::ports::FlashLevel;

use super::session::Session;
use crate::redirect::login_url;
use crate::views;

/// The logged-in user, if any, resolved once per request by the session
/// middleware.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(req
            .extensions()
            .get::<CurrentUser>()
            .cloned()
            .unwrap_or_default()))
    }
}

/// Why an extractor refused the request.
#[derive(Debug, thiserror::Error)]
pub enum AccessDenied {
    /// Not logged in; `next` is the path (and query) to come back to.
    #[error("login required")]
    LoginRequired { next: String },

    #[error("admin access required")]
    Forbidden,
}

impl ResponseError for AccessDenied {
    fn status_code(&self) -> StatusCode {
        match self {
            AccessDenied::LoginRequired { .. } => StatusCode::FOUND,
            AccessDenied::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AccessDenied::LoginRequired { next } => HttpResponse::Found()
                .insert_header((header::LOCATION, login_url(next)))
                .finish(),
            AccessDenied::Forbidden => views::error_page(
                StatusCode::FORBIDDEN,
                "You don't have permission to access this page.",
            ),
        }
    }
}

fn login_required(req: &HttpRequest) -> AccessDenied {
    if let Some(session) = req.extensions().get::<Session>() {
        session.flash(FlashLevel::Info, "Please log in to access this page.");
    }
    let next = match req.uri().path_and_query() {
        Some(pq) => pq.as_str().to_string(),
        None => req.path().to_string(),
    };
    AccessDenied::LoginRequired { next }
}

fn current(req: &HttpRequest) -> Option<User> {
    req.extensions()
        .get::<CurrentUser>()
        .and_then(|c| c.0.clone())
}

/// A handler argument that only resolves for logged-in visitors.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequest for AuthUser {
    type Error = AccessDenied;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(current(req).map(AuthUser).ok_or_else(|| login_required(req)))
    }
}

/// A logged-in administrator.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequest for AdminUser {
    type Error = AccessDenied;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match current(req) {
            None => Err(login_required(req)),
            Some(user) if user.is_admin() => Ok(AdminUser(user)),
            Some(user) => {
                tracing::warn!(user_id = %user.id, path = %req.path(), "Non-admin refused");
                Err(AccessDenied::Forbidden)
            }
        };
        ready(result)
    }
}
