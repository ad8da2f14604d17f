//! Post listing, reading and author-only editing.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::DomainError;
use quill_core::ports::FlashLevel;
use quill_core::validation::FieldErrors;
use quill_shared::forms::{CsrfForm, PostForm, PostListQuery};
use quill_shared::{PageView, PostView};

use super::parse_id;
use crate::middleware::{AppResult, AuthUser, CurrentUser, Session};
use crate::state::AppState;
use crate::views;

const NOT_YOURS: &str = "You can only change your own posts.";

/// Non-authors are sent home with a warning instead of an error page.
fn rejected(session: &Session) -> HttpResponse {
    session.flash(FlashLevel::Warning, NOT_YOURS);
    views::redirect("/")
}

fn form_page(
    session: &Session,
    current: &CurrentUser,
    form: &PostForm,
    errors: &FieldErrors,
    editing: Option<Uuid>,
) -> AppResult<HttpResponse> {
    let title = if editing.is_some() { "Edit Post" } else { "New Post" };
    let mut ctx = views::page(title, session, current);
    views::with_form(&mut ctx, form, errors);
    ctx.insert("post_id", &editing);
    views::render("post_form.html", &ctx)
}

/// GET /posts?q=&page=
pub async fn list(
    state: web::Data<AppState>,
    session: Session,
    current: CurrentUser,
    _user: AuthUser,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let term = query.term();
    let page = state.post_service().list(term, query.page()).await?;

    let mut ctx = views::page("Posts", &session, &current);
    let posts: Vec<PostView> = page.items.iter().map(PostView::from).collect();
    ctx.insert("posts", &posts);
    ctx.insert("pagination", &PageView::of(&page));
    ctx.insert("q", &term.unwrap_or_default());
    ctx.insert(
        "page_query",
        &views::query_suffix(&[("q", term.unwrap_or_default())]),
    );
    views::render("posts.html", &ctx)
}

/// GET /post/{id}
pub async fn show(
    state: web::Data<AppState>,
    session: Session,
    current: CurrentUser,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&id)?;
    let post = state.post_service().get(id).await?;

    let is_author = current
        .user()
        .is_some_and(|u| post.post.is_authored_by(u.id));
    let mut ctx = views::page(&post.post.title, &session, &current);
    ctx.insert("post", &PostView::from(&post));
    ctx.insert("is_author", &is_author);
    views::render("post.html", &ctx)
}

/// GET /create_post
pub async fn create_form(
    session: Session,
    current: CurrentUser,
    _user: AuthUser,
) -> AppResult<HttpResponse> {
    form_page(&session, &current, &PostForm::default(), &FieldErrors::new(), None)
}

/// POST /create_post
pub async fn create(
    state: web::Data<AppState>,
    session: Session,
    current: CurrentUser,
    AuthUser(user): AuthUser,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    session.require_csrf(&form.csrf_token)?;
    match state.post_service().create(&user, form.draft()).await {
        Ok(post) => {
            session.flash(FlashLevel::Success, "Post created successfully");
            Ok(views::redirect(&format!("/post/{}", post.id)))
        }
        Err(DomainError::Invalid(errors)) => form_page(&session, &current, &form, &errors, None),
        Err(e) => Err(e.into()),
    }
}

/// GET /edit_post/{id}
pub async fn edit_form(
    state: web::Data<AppState>,
    session: Session,
    current: CurrentUser,
    AuthUser(user): AuthUser,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&id)?;
    let post = match state.post_service().owned_by(&user, id).await {
        Ok(post) => post,
        Err(DomainError::Forbidden) => return Ok(rejected(&session)),
        Err(e) => return Err(e.into()),
    };
    let form = PostForm {
        title: post.title,
        body: post.body,
        csrf_token: String::new(),
    };
    form_page(&session, &current, &form, &FieldErrors::new(), Some(id))
}

/// POST /edit_post/{id}
pub async fn edit(
    state: web::Data<AppState>,
    session: Session,
    current: CurrentUser,
    AuthUser(user): AuthUser,
    id: web::Path<String>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&id)?;
    session.require_csrf(&form.csrf_token)?;
    match state.post_service().edit(&user, id, form.draft()).await {
        Ok(post) => {
            session.flash(FlashLevel::Success, "Post edited successfully");
            Ok(views::redirect(&format!("/post/{}", post.id)))
        }
        Err(DomainError::Forbidden) => Ok(rejected(&session)),
        Err(DomainError::Invalid(errors)) => {
            form_page(&session, &current, &form, &errors, Some(id))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /delete_post/{id}
pub async fn delete(
    state: web::Data<AppState>,
    session: Session,
    AuthUser(user): AuthUser,
    id: web::Path<String>,
    form: web::Form<CsrfForm>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&id)?;
    session.require_csrf(&form.csrf_token)?;
    match state.post_service().delete(&user, id).await {
        Ok(()) => {
            session.flash(FlashLevel::Success, "Post deleted");
            Ok(views::redirect("/posts"))
        }
        Err(DomainError::Forbidden) => Ok(rejected(&session)),
        Err(e) => Err(e.into()),
    }
}
