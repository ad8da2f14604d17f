//! In-memory repositories, used when no `DATABASE_URL` is configured.
//!
//! Both repositories share one [`InMemoryStore`] so deleting a user can take
//! their posts with them, as the foreign key does in SQL.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Author, AuthoredPost, Page, PageRequest, Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserFilter, UserRepository, UserSort};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    /// Insertion order, oldest first.
    posts: Vec<Post>,
}

/// Process-local tables. Data is lost on restart.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

fn author_of(user: &User) -> Author {
    Author {
        id: user.id,
        username: user.username.clone(),
        image_file: user.image_file.clone(),
    }
}

fn ensure_unique(tables: &Tables, user: &User) -> Result<(), RepoError> {
    for other in tables.users.values().filter(|u| u.id != user.id) {
        if other.username == user.username {
            return Err(RepoError::Constraint("user.username".into()));
        }
        if other.email == user.email {
            return Err(RepoError::Constraint("user.email".into()));
        }
    }
    Ok(())
}

pub struct InMemoryUserRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryUserRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.tables.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, entity: User) -> Result<User, RepoError> {
        let mut tables = self.store.tables.write().await;
        if tables.users.contains_key(&entity.id) {
            return Err(RepoError::Constraint("user.id".into()));
        }
        ensure_unique(&tables, &entity)?;
        tables.users.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: User) -> Result<User, RepoError> {
        let mut tables = self.store.tables.write().await;
        if !tables.users.contains_key(&entity.id) {
            return Err(RepoError::NotFound);
        }
        ensure_unique(&tables, &entity)?;
        tables.users.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        tables.users.remove(&id).ok_or(RepoError::NotFound)?;
        tables.posts.retain(|p| p.user_id != id);
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.store.tables.read().await.users.len() as u64)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn touch_last_seen(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        if let Some(user) = tables.users.get_mut(&id) {
            user.last_seen = at;
        }
        Ok(())
    }

    async fn list(&self, filter: &UserFilter, page: PageRequest) -> Result<Page<User>, RepoError> {
        let tables = self.store.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| {
                filter
                    .search
                    .as_deref()
                    .is_none_or(|term| u.username.contains(term))
            })
            .cloned()
            .collect();
        drop(tables);

        users.sort_by(|a, b| a.username.cmp(&b.username));
        if filter.sort == UserSort::Admin {
            users.sort_by_key(|u| u.admin);
        }
        if filter.descending {
            match filter.sort {
                UserSort::Username => users.reverse(),
                UserSort::Admin => users.sort_by_key(|u| std::cmp::Reverse(u.admin)),
            }
        }
        Ok(Page::from_vec(users, page))
    }

    async fn all(&self) -> Result<Vec<User>, RepoError> {
        let mut users: Vec<User> = self.store.tables.read().await.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}

pub struct InMemoryPostRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryPostRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        let mut tables = self.store.tables.write().await;
        if !tables.users.contains_key(&entity.user_id) {
            return Err(RepoError::Constraint("post.user_id".into()));
        }
        tables.posts.push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Post) -> Result<Post, RepoError> {
        let mut tables = self.store.tables.write().await;
        if !tables.users.contains_key(&entity.user_id) {
            return Err(RepoError::Constraint("post.user_id".into()));
        }
        let slot = tables
            .posts
            .iter_mut()
            .find(|p| p.id == entity.id)
            .ok_or(RepoError::NotFound)?;
        *slot = entity.clone();
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        if tables.posts.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.store.tables.read().await.posts.len() as u64)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_with_author(&self, id: Uuid) -> Result<Option<AuthoredPost>, RepoError> {
        let tables = self.store.tables.read().await;
        let found = tables.posts.iter().find(|p| p.id == id).and_then(|post| {
            tables.users.get(&post.user_id).map(|user| AuthoredPost {
                post: post.clone(),
                author: author_of(user),
            })
        });
        Ok(found)
    }

    async fn search(
        &self,
        term: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<AuthoredPost>, RepoError> {
        let tables = self.store.tables.read().await;
        // Reverse insertion order first so equal timestamps stay newest-first.
        let mut matching: Vec<AuthoredPost> = tables
            .posts
            .iter()
            .rev()
            .filter(|p| term.is_none_or(|t| p.title.contains(t) || p.body.contains(t)))
            .filter_map(|post| {
                tables.users.get(&post.user_id).map(|user| AuthoredPost {
                    post: post.clone(),
                    author: author_of(user),
                })
            })
            .collect();
        drop(tables);

        matching.sort_by(|a, b| b.post.created_at.cmp(&a.post.created_at));
        Ok(Page::from_vec(matching, page))
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let tables = self.store.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }
}
