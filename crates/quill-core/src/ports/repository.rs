use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{AuthoredPost, Page, PageRequest, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;

    /// Number of stored entities.
    async fn count(&self) -> Result<u64, RepoError>;
}

/// Column the admin user list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UserSort {
    #[default]
    Username,
    Admin,
}

/// Admin user-list query.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Substring of the username.
    pub search: Option<String>,
    pub sort: UserSort,
    pub descending: bool,
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Record activity without rewriting the rest of the row.
    async fn touch_last_seen(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError>;

    /// Paginated, filtered listing for the admin panel.
    async fn list(&self, filter: &UserFilter, page: PageRequest) -> Result<Page<User>, RepoError>;

    /// Every user ordered by username, for author pickers.
    async fn all(&self) -> Result<Vec<User>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// A post together with its author.
    async fn find_with_author(&self, id: Uuid) -> Result<Option<AuthoredPost>, RepoError>;

    /// Newest-first listing. With a term, only posts whose title or body
    /// contains it are returned.
    async fn search(
        &self,
        term: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<AuthoredPost>, RepoError>;

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError>;
}
