use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::DomainError;
use quill_core::domain::User;
use quill_core::ports::FlashLevel;
use quill_core::validation::FieldErrors;
use quill_shared::forms::{AdminPostForm, AdminPostListQuery, CsrfForm};
use quill_shared::{PageView, PostView, UserView};

use crate::handlers::parse_id;
use crate::middleware::{AdminUser, AppResult, CurrentUser, Session};
use crate::state::AppState;
use crate::views;

const LIST: &str = "/admin/posts/";

fn form_page(
    session: &Session,
    current: &CurrentUser,
    authors: &[User],
    form: &AdminPostForm,
    errors: &FieldErrors,
    editing: Option<Uuid>,
) -> AppResult<HttpResponse> {
    let title = if editing.is_some() { "Edit Post" } else { "New Post" };
    let mut ctx = views::page(title, session, current);
    views::with_form(&mut ctx, form, errors);
    let authors: Vec<UserView> = authors.iter().map(UserView::from).collect();
    ctx.insert("authors", &authors);
    ctx.insert("post_id", &editing);
    views::render("admin/post_form.html", &ctx)
}

fn invalid_author() -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.add("author", "Not a valid choice");
    errors
}

/// GET /admin/posts/?search=&page=
pub async fn list(
    state: web::Data<AppState>,
    session: Session,
    current: CurrentUser,
    _admin: AdminUser,
    query: web::Query<AdminPostListQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .post_admin()
        .list(query.search.as_deref(), query.page())
        .await?;

    let mut ctx = views::page("Posts", &session, &current);
    let posts: Vec<PostView> = page.items.iter().map(PostView::from).collect();
    ctx.insert("posts", &posts);
    ctx.insert("pagination", &PageView::of(&page));
    ctx.insert("query", &*query);
    ctx.insert(
        "page_query",
        &views::query_suffix(&[("search", query.search.as_deref().unwrap_or_default())]),
    );
    views::render("admin/posts.html", &ctx)
}

/// GET /admin/posts/new
pub async fn create_form(
    state: web::Data<AppState>,
    session: Session,
    current: CurrentUser,
    AdminUser(admin): AdminUser,
) -> AppResult<HttpResponse> {
    let authors = state.post_admin().authors().await?;
    let form = AdminPostForm {
        author_id: admin.id.to_string(),
        ..AdminPostForm::default()
    };
    form_page(&session, &current, &authors, &form, &FieldErrors::new(), None)
}

/// POST /admin/posts/new
pub async fn create(
    state: web::Data<AppState>,
    session: Session,
    current: CurrentUser,
    _admin: AdminUser,
    form: web::Form<AdminPostForm>,
) -> AppResult<HttpResponse> {
    session.require_csrf(&form.csrf_token)?;
    let admin = state.post_admin();

    let result = match form.draft() {
        Some(draft) => admin.create(draft).await.map(|_| ()),
        None => Err(DomainError::Invalid(invalid_author())),
    };
    match result {
        Ok(()) => {
            session.flash(FlashLevel::Success, "Post created successfully");
            Ok(views::redirect(LIST))
        }
        Err(DomainError::Invalid(errors)) => {
            let authors = admin.authors().await?;
            form_page(&session, &current, &authors, &form, &errors, None)
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /admin/posts/edit/{id}
pub async fn edit_form(
    state: web::Data<AppState>,
    session: Session,
    current: CurrentUser,
    _admin: AdminUser,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&id)?;
    let admin = state.post_admin();
    let post = admin.get(id).await?;
    let authors = admin.authors().await?;
    let form = AdminPostForm {
        title: post.post.title,
        body: post.post.body,
        author_id: post.post.user_id.to_string(),
        csrf_token: String::new(),
    };
    form_page(&session, &current, &authors, &form, &FieldErrors::new(), Some(id))
}

/// POST /admin/posts/edit/{id}
pub async fn edit(
    state: web::Data<AppState>,
    session: Session,
    current: CurrentUser,
    _admin: AdminUser,
    id: web::Path<String>,
    form: web::Form<AdminPostForm>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&id)?;
    session.require_csrf(&form.csrf_token)?;
    let admin = state.post_admin();

    let result = match form.draft() {
        Some(draft) => admin.update(id, draft).await.map(|_| ()),
        None => Err(DomainError::Invalid(invalid_author())),
    };
    match result {
        Ok(()) => {
            session.flash(FlashLevel::Success, "Post edited successfully");
            Ok(views::redirect(LIST))
        }
        Err(DomainError::Invalid(errors)) => {
            let authors = admin.authors().await?;
            form_page(&session, &current, &authors, &form, &errors, Some(id))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /admin/posts/delete/{id}
pub async fn delete(
    state: web::Data<AppState>,
    session: Session,
    _admin: AdminUser,
    id: web::Path<String>,
    form: web::Form<CsrfForm>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&id)?;
    session.require_csrf(&form.csrf_token)?;
    state.post_admin().delete(id).await?;
    session.flash(FlashLevel::Success, "Post deleted");
    Ok(views::redirect(LIST))
}
