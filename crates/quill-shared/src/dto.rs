//! View models handed to the templates.
//!
//! These never carry the password hash.

use serde::Serialize;
use uuid::Uuid;

use quill_core::domain::{AuthoredPost, Page, User};

/// Public URL of a stored profile picture.
pub fn image_url(file: &str) -> String {
    format!("/media/profile_pics/{file}")
}

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub about_me: Option<String>,
    pub last_seen: String,
    pub admin: bool,
    pub created_at: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            image_url: image_url(&user.image_file),
            about_me: user.about_me.clone(),
            last_seen: user.last_seen.format("%Y-%m-%d %H:%M").to_string(),
            admin: user.admin,
            created_at: user.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorView {
    pub id: Uuid,
    pub username: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
    pub edited: bool,
    pub author: AuthorView,
}

impl From<&AuthoredPost> for PostView {
    fn from(item: &AuthoredPost) -> Self {
        let post = &item.post;
        Self {
            id: post.id,
            title: post.title.clone(),
            body: post.body.clone(),
            created_at: post.created_at.format("%Y-%m-%d").to_string(),
            updated_at: post.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            edited: post.updated_at > post.created_at,
            author: AuthorView {
                id: item.author.id,
                username: item.author.username.clone(),
                image_url: image_url(&item.author.image_file),
            },
        }
    }
}

/// Pagination controls. `links` holds page numbers, `None` marking a gap.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub has_prev: bool,
    pub has_next: bool,
    pub prev: u64,
    pub next: u64,
    pub links: Vec<Option<u64>>,
}

impl PageView {
    pub fn of<T>(page: &Page<T>) -> Self {
        Self {
            page: page.page,
            total_pages: page.total_pages,
            total_items: page.total_items,
            has_prev: page.has_prev(),
            has_next: page.has_next(),
            prev: page.page.saturating_sub(1).max(1),
            next: (page.page + 1).min(page.total_pages.max(1)),
            links: page_links(page.page, page.total_pages),
        }
    }
}

/// First page, last page and a window around the current one, with gaps.
fn page_links(current: u64, total: u64) -> Vec<Option<u64>> {
    let mut links = Vec::new();
    let mut last = 0;
    for n in 1..=total {
        let near = n + 1 >= current && n <= current + 2;
        if n == 1 || n == total || near {
            if last + 1 != n {
                links.push(None);
            }
            links.push(Some(n));
            last = n;
        }
    }
    links
}
