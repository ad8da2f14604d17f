//! Template rendering.
//!
//! Templates are compiled into the binary and parsed once.

use actix_web::http::{StatusCode, header};
use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use serde::Serialize;
use tera::{Context, Tera};

use quill_core::validation::FieldErrors;
use quill_shared::UserView;

use crate::middleware::{AppResult, CurrentUser, Session};

static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../templates/base.html")),
        ("macros.html", include_str!("../templates/macros.html")),
        ("error.html", include_str!("../templates/error.html")),
        ("index.html", include_str!("../templates/index.html")),
        ("register.html", include_str!("../templates/register.html")),
        ("login.html", include_str!("../templates/login.html")),
        ("posts.html", include_str!("../templates/posts.html")),
        ("post.html", include_str!("../templates/post.html")),
        ("post_form.html", include_str!("../templates/post_form.html")),
        ("account.html", include_str!("../templates/account.html")),
        ("admin/base.html", include_str!("../templates/admin/base.html")),
        ("admin/index.html", include_str!("../templates/admin/index.html")),
        ("admin/users.html", include_str!("../templates/admin/users.html")),
        ("admin/user_form.html", include_str!("../templates/admin/user_form.html")),
        ("admin/posts.html", include_str!("../templates/admin/posts.html")),
        ("admin/post_form.html", include_str!("../templates/admin/post_form.html")),
    ])
    .expect("Failed to parse embedded templates");
    tera
});

/// Context every page starts from: title, current user, pending flashes and
/// the CSRF token for forms.
pub fn page(title: &str, session: &Session, current: &CurrentUser) -> Context {
    let mut ctx = Context::new();
    ctx.insert("title", title);
    ctx.insert("current_user", &current.user().map(UserView::from));
    ctx.insert("flashes", &session.take_flashes());
    ctx.insert("csrf_token", &session.csrf_token());
    ctx.insert("errors", &FieldErrors::new());
    ctx
}

/// Add a form's submitted values and its validation errors.
pub fn with_form<F: Serialize>(ctx: &mut Context, form: &F, errors: &FieldErrors) {
    ctx.insert("form", form);
    ctx.insert("errors", errors);
}

pub fn render(template: &str, ctx: &Context) -> AppResult<HttpResponse> {
    render_status(StatusCode::OK, template, ctx)
}

pub fn render_status(status: StatusCode, template: &str, ctx: &Context) -> AppResult<HttpResponse> {
    let body = TEMPLATES.render(template, ctx)?;
    Ok(HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// 302 to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// `&key=value` pairs appended to pagination links; empty values are left out.
pub fn query_suffix(pairs: &[(&str, &str)]) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs.iter().filter(|(_, v)| !v.is_empty()) {
        query.append_pair(key, value);
    }
    let query = query.finish();
    if query.is_empty() {
        query
    } else {
        format!("&{query}")
    }
}

/// Standalone error page; used where no session is at hand.
pub fn error_page(status: StatusCode, message: &str) -> HttpResponse {
    let mut ctx = Context::new();
    ctx.insert("title", status.canonical_reason().unwrap_or("Error"));
    ctx.insert("status", &status.as_u16());
    ctx.insert("message", message);
    ctx.insert("current_user", &Option::<UserView>::None);
    ctx.insert("flashes", &Vec::<()>::new());

    match TEMPLATES.render("error.html", &ctx) {
        Ok(body) => HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            tracing::error!(error = ?e, "Failed to render error page");
            HttpResponse::build(status)
                .content_type("text/plain; charset=utf-8")
                .body(message.to_string())
        }
    }
}
