use actix_web::{HttpResponse, web};

use quill_shared::{PageView, PostView};

use crate::middleware::{AppResult, CurrentUser, Session};
use crate::state::AppState;
use crate::views;

/// GET / and /index - landing page with the latest posts.
pub async fn index(
    state: web::Data<AppState>,
    session: Session,
    current: CurrentUser,
) -> AppResult<HttpResponse> {
    let latest = state.post_service().list(None, 1).await?;

    let mut ctx = views::page("Home", &session, &current);
    let posts: Vec<PostView> = latest.items.iter().map(PostView::from).collect();
    ctx.insert("posts", &posts);
    ctx.insert("pagination", &PageView::of(&latest));
    views::render("index.html", &ctx)
}
