//! Registration, login and logout.

use actix_web::{HttpResponse, web};

use quill_core::DomainError;
use quill_core::ports::FlashLevel;
use quill_core::validation::FieldErrors;
use quill_shared::forms::{LoginForm, NextQuery, RegistrationForm};

use crate::middleware::{AppResult, CurrentUser, Session};
use crate::redirect::safe_next;
use crate::state::AppState;
use crate::views;

fn register_page(
    session: &Session,
    current: &CurrentUser,
    form: &RegistrationForm,
    errors: &FieldErrors,
) -> AppResult<HttpResponse> {
    let mut ctx = views::page("Register", session, current);
    views::with_form(&mut ctx, form, errors);
    views::render("register.html", &ctx)
}

fn login_page(
    session: &Session,
    current: &CurrentUser,
    form: &LoginForm,
    errors: &FieldErrors,
    next: Option<&str>,
) -> AppResult<HttpResponse> {
    let mut ctx = views::page("Login", session, current);
    views::with_form(&mut ctx, form, errors);
    ctx.insert("next", &next);
    views::render("login.html", &ctx)
}

/// GET /register
pub async fn register_form(session: Session, current: CurrentUser) -> AppResult<HttpResponse> {
    if current.is_authenticated() {
        return Ok(views::redirect("/"));
    }
    register_page(&session, &current, &RegistrationForm::default(), &FieldErrors::new())
}

/// POST /register
pub async fn register(
    state: web::Data<AppState>,
    session: Session,
    current: CurrentUser,
    form: web::Form<RegistrationForm>,
) -> AppResult<HttpResponse> {
    if current.is_authenticated() {
        return Ok(views::redirect("/"));
    }
    session.require_csrf(&form.csrf_token)?;

    match state.accounts().register((&*form).into()).await {
        Ok(user) => {
            session.flash(
                FlashLevel::Success,
                format!("Account created for {}", user.username),
            );
            Ok(views::redirect("/login"))
        }
        Err(DomainError::Invalid(errors)) => register_page(&session, &current, &form, &errors),
        Err(e) => Err(e.into()),
    }
}

/// GET /login
pub async fn login_form(
    session: Session,
    current: CurrentUser,
    query: web::Query<NextQuery>,
) -> AppResult<HttpResponse> {
    if current.is_authenticated() {
        return Ok(views::redirect("/posts"));
    }
    login_page(
        &session,
        &current,
        &LoginForm::default(),
        &FieldErrors::new(),
        query.next.as_deref(),
    )
}

/// POST /login
pub async fn login(
    state: web::Data<AppState>,
    session: Session,
    current: CurrentUser,
    query: web::Query<NextQuery>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    if current.is_authenticated() {
        return Ok(views::redirect("/posts"));
    }
    session.require_csrf(&form.csrf_token)?;
    let next = query.next.as_deref();

    match state.accounts().authenticate(&form.credentials()).await {
        Ok(user) => {
            session.log_in(user.id, form.remember());
            session.flash(
                FlashLevel::Success,
                format!("Welcome back {}", user.username),
            );
            Ok(views::redirect(&safe_next(next)))
        }
        Err(DomainError::InvalidCredentials) => {
            session.flash(FlashLevel::Warning, "Incorrect email or password");
            login_page(&session, &current, &form, &FieldErrors::new(), next)
        }
        Err(DomainError::Invalid(errors)) => login_page(&session, &current, &form, &errors, next),
        Err(e) => Err(e.into()),
    }
}

/// GET /logout
pub async fn logout(session: Session, current: CurrentUser) -> HttpResponse {
    if let Some(user) = current.user() {
        tracing::info!(user_id = %user.id, "Logged out");
    }
    session.log_out();
    session.flash(FlashLevel::Info, "Logged out");
    views::redirect("/")
}
