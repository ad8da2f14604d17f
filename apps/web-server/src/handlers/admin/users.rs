use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::DomainError;
use quill_core::ports::FlashLevel;
use quill_core::validation::FieldErrors;
use quill_shared::forms::{AdminUserForm, CsrfForm, UserListQuery};
use quill_shared::{PageView, UserView};

use crate::handlers::parse_id;
use crate::middleware::{AdminUser, AppResult, CurrentUser, Session};
use crate::state::AppState;
use crate::views;

const LIST: &str = "/admin/users/";

fn form_page(
    session: &Session,
    current: &CurrentUser,
    form: &AdminUserForm,
    errors: &FieldErrors,
    editing: Option<Uuid>,
) -> AppResult<HttpResponse> {
    let title = if editing.is_some() { "Edit User" } else { "New User" };
    let mut ctx = views::page(title, session, current);
    views::with_form(&mut ctx, form, errors);
    ctx.insert("user_id", &editing);
    views::render("admin/user_form.html", &ctx)
}

/// GET /admin/users/?search=&sort=&desc=&page=
pub async fn list(
    state: web::Data<AppState>,
    session: Session,
    current: CurrentUser,
    _admin: AdminUser,
    query: web::Query<UserListQuery>,
) -> AppResult<HttpResponse> {
    let page = state.user_admin().list(&query.filter(), query.page()).await?;

    let mut ctx = views::page("Users", &session, &current);
    let users: Vec<UserView> = page.items.iter().map(UserView::from).collect();
    ctx.insert("users", &users);
    ctx.insert("pagination", &PageView::of(&page));
    ctx.insert("query", &*query);
    ctx.insert(
        "page_query",
        &views::query_suffix(&[
            ("search", query.search.as_deref().unwrap_or_default()),
            ("sort", query.sort.as_deref().unwrap_or_default()),
            ("desc", query.desc.as_deref().unwrap_or_default()),
        ]),
    );
    views::render("admin/users.html", &ctx)
}

/// GET /admin/users/new
pub async fn create_form(
    session: Session,
    current: CurrentUser,
    _admin: AdminUser,
) -> AppResult<HttpResponse> {
    form_page(&session, &current, &AdminUserForm::default(), &FieldErrors::new(), None)
}

/// POST /admin/users/new
pub async fn create(
    state: web::Data<AppState>,
    session: Session,
    current: CurrentUser,
    AdminUser(admin): AdminUser,
    form: web::Form<AdminUserForm>,
) -> AppResult<HttpResponse> {
    session.require_csrf(&form.csrf_token)?;
    match state.user_admin().create(form.create()).await {
        Ok(user) => {
            tracing::info!(admin_id = %admin.id, user_id = %user.id, "Admin created user");
            session.flash(FlashLevel::Success, format!("User {} created", user.username));
            Ok(views::redirect(LIST))
        }
        Err(DomainError::Invalid(errors)) => form_page(&session, &current, &form, &errors, None),
        Err(e) => Err(e.into()),
    }
}

/// GET /admin/users/edit/{id}
pub async fn edit_form(
    state: web::Data<AppState>,
    session: Session,
    current: CurrentUser,
    _admin: AdminUser,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&id)?;
    let user = state.user_admin().get(id).await?;
    let form = AdminUserForm {
        username: user.username,
        email: user.email,
        about_me: user.about_me.unwrap_or_default(),
        admin: user.admin.then(|| "y".to_string()),
        ..AdminUserForm::default()
    };
    form_page(&session, &current, &form, &FieldErrors::new(), Some(id))
}

/// POST /admin/users/edit/{id}
pub async fn edit(
    state: web::Data<AppState>,
    session: Session,
    current: CurrentUser,
    AdminUser(admin): AdminUser,
    id: web::Path<String>,
    form: web::Form<AdminUserForm>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&id)?;
    session.require_csrf(&form.csrf_token)?;
    match state.user_admin().update(id, form.update()).await {
        Ok(user) => {
            tracing::info!(admin_id = %admin.id, user_id = %user.id, "Admin updated user");
            session.flash(FlashLevel::Success, format!("User {} updated", user.username));
            Ok(views::redirect(LIST))
        }
        Err(DomainError::PasswordMismatch) => {
            session.flash(FlashLevel::Warning, "Passwords must match");
            form_page(&session, &current, &form, &FieldErrors::new(), Some(id))
        }
        Err(DomainError::Invalid(errors)) => {
            form_page(&session, &current, &form, &errors, Some(id))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /admin/users/delete/{id}
pub async fn delete(
    state: web::Data<AppState>,
    session: Session,
    AdminUser(admin): AdminUser,
    id: web::Path<String>,
    form: web::Form<CsrfForm>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&id)?;
    session.require_csrf(&form.csrf_token)?;
    match state.user_admin().delete(&admin, id).await {
        Ok(()) => {
            session.flash(FlashLevel::Success, "User deleted");
            Ok(views::redirect(LIST))
        }
        Err(DomainError::Forbidden) => {
            session.flash(FlashLevel::Danger, "You cannot delete your own account.");
            Ok(views::redirect(LIST))
        }
        Err(e) => Err(e.into()),
    }
}
