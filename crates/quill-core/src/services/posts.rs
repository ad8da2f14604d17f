//! Post listing, search and author-only editing.

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::domain::{AuthoredPost, Page, PageRequest, Post, User};
use crate::error::{DomainError, RepoError};
use crate::ports::PostRepository;
use crate::validation;

/// Title and body of a post being written or edited.
#[derive(Debug, Clone, Validate)]
pub struct PostDraft {
    #[validate(length(min = 1, message = "This field is required."))]
    pub title: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub body: String,
}

impl PostDraft {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            body: body.trim().to_string(),
        }
    }
}

/// Public post operations. Only a post's author may change it here.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    per_page: u64,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, per_page: u64) -> Self {
        Self { posts, per_page }
    }

    /// Newest-first listing, narrowed to posts whose title or body contains
    /// `query` when one is given. Out-of-range pages are clamped.
    pub async fn list(
        &self,
        query: Option<&str>,
        page: u64,
    ) -> Result<Page<AuthoredPost>, DomainError> {
        let term = query.map(str::trim).filter(|q| !q.is_empty());
        let page = self
            .posts
            .search(term, PageRequest::new(page, self.per_page))
            .await?;
        Ok(page)
    }

    pub async fn get(&self, id: Uuid) -> Result<AuthoredPost, DomainError> {
        self.posts
            .find_with_author(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "post",
                id,
            })
    }

    pub async fn create(&self, author: &User, draft: PostDraft) -> Result<Post, DomainError> {
        validation::check(&draft)?;
        let post = self
            .posts
            .insert(Post::new(author.id, draft.title, draft.body))
            .await?;
        tracing::info!(post_id = %post.id, user_id = %author.id, "Post created");
        Ok(post)
    }

    /// The post, provided `editor` wrote it.
    pub async fn owned_by(&self, editor: &User, id: Uuid) -> Result<Post, DomainError> {
        let post = self.posts.find_by_id(id).await?.ok_or(DomainError::NotFound {
            entity_type: "post",
            id,
        })?;
        if !post.is_authored_by(editor.id) {
            tracing::warn!(post_id = %id, user_id = %editor.id, "Rejected change by non-author");
            return Err(DomainError::Forbidden);
        }
        Ok(post)
    }

    pub async fn edit(
        &self,
        editor: &User,
        id: Uuid,
        draft: PostDraft,
    ) -> Result<Post, DomainError> {
        let mut post = self.owned_by(editor, id).await?;
        validation::check(&draft)?;
        post.revise(draft.title, draft.body);
        let post = self.posts.update(post).await?;
        tracing::info!(post_id = %post.id, user_id = %editor.id, "Post edited");
        Ok(post)
    }

    pub async fn delete(&self, editor: &User, id: Uuid) -> Result<(), DomainError> {
        self.owned_by(editor, id).await?;
        self.posts.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::NotFound {
                entity_type: "post",
                id,
            },
            other => other.into(),
        })?;
        tracing::info!(post_id = %id, user_id = %editor.id, "Post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::BaseRepository;
    use crate::services::testing::{FakePosts, FakeUsers};

    async fn fixture() -> (PostService, Arc<FakePosts>, User, User) {
        let users = Arc::new(FakeUsers::default());
        let alice = users
            .insert(User::new("alice".into(), "a@example.com".into(), "h".into()))
            .await
            .unwrap();
        let bob = users
            .insert(User::new("bobby".into(), "b@example.com".into(), "h".into()))
            .await
            .unwrap();
        let posts = Arc::new(FakePosts::new(users));
        (PostService::new(posts.clone(), 5), posts, alice, bob)
    }

    #[tokio::test]
    async fn search_matches_body_only_terms() {
        let (service, _, alice, _) = fixture().await;
        service
            .create(&alice, PostDraft::new("Weekend", "We went to the lighthouse."))
            .await
            .unwrap();
        service
            .create(&alice, PostDraft::new("Monday", "Back to work."))
            .await
            .unwrap();

        let page = service.list(Some("lighthouse"), 1).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].post.title, "Weekend");
        assert_eq!(page.items[0].author.username, "alice");
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_clamped() {
        let (service, _, alice, _) = fixture().await;
        for i in 0..7 {
            service
                .create(&alice, PostDraft::new(&format!("Post {i}"), "body"))
                .await
                .unwrap();
        }

        let first = service.list(None, 1).await.unwrap();
        assert_eq!(first.items[0].post.title, "Post 6");
        assert_eq!(first.total_pages, 2);

        let beyond = service.list(Some("   "), 40).await.unwrap();
        assert_eq!(beyond.page, 2);
        assert_eq!(beyond.items.len(), 2);
    }

    #[tokio::test]
    async fn non_author_cannot_edit_or_delete() {
        let (service, posts, alice, bob) = fixture().await;
        let post = service
            .create(&alice, PostDraft::new("Mine", "Original"))
            .await
            .unwrap();

        let err = service
            .edit(&bob, post.id, PostDraft::new("Hijacked", "Nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));
        assert!(matches!(
            service.delete(&bob, post.id).await,
            Err(DomainError::Forbidden)
        ));

        let stored = posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Mine");
        assert_eq!(stored.body, "Original");
    }

    #[tokio::test]
    async fn author_edits_bump_updated_at() {
        let (service, _, alice, _) = fixture().await;
        let post = service
            .create(&alice, PostDraft::new("Mine", "Original"))
            .await
            .unwrap();
        let edited = service
            .edit(&alice, post.id, PostDraft::new("Mine v2", "Changed"))
            .await
            .unwrap();
        assert_eq!(edited.title, "Mine v2");
        assert!(edited.updated_at >= post.updated_at);
    }

    #[tokio::test]
    async fn blank_drafts_are_invalid() {
        let (service, _, alice, _) = fixture().await;
        let err = service
            .create(&alice, PostDraft::new("  ", "body"))
            .await
            .unwrap_err();
        let DomainError::Invalid(errors) = err else {
            panic!("expected validation errors");
        };
        assert!(errors.contains("title"));
    }

    #[tokio::test]
    async fn unknown_post_is_not_found() {
        let (service, _, _, _) = fixture().await;
        assert!(matches!(
            service.get(Uuid::new_v4()).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
