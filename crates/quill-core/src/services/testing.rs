//! In-process fakes for service tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Author, AuthoredPost, Page, PageRequest, Post, User};
use crate::error::RepoError;
use crate::ports::{
    AuthError, BaseRepository, MediaError, PasswordService, PostRepository, ProfileImageStore,
    UserFilter, UserRepository, UserSort, allowed_extension,
};

#[derive(Default)]
pub struct FakeUsers {
    rows: RwLock<HashMap<Uuid, User>>,
}

impl FakeUsers {
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    fn check_unique(rows: &HashMap<Uuid, User>, user: &User) -> Result<(), RepoError> {
        for other in rows.values().filter(|u| u.id != user.id) {
            if other.username == user.username {
                return Err(RepoError::Constraint("username".into()));
            }
            if other.email == user.email {
                return Err(RepoError::Constraint("email".into()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for FakeUsers {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn insert(&self, entity: User) -> Result<User, RepoError> {
        let mut rows = self.rows.write().await;
        Self::check_unique(&rows, &entity)?;
        rows.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: User) -> Result<User, RepoError> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&entity.id) {
            return Err(RepoError::NotFound);
        }
        Self::check_unique(&rows, &entity)?;
        rows.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.rows
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.rows.read().await.len() as u64)
    }
}

#[async_trait]
impl UserRepository for FakeUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn touch_last_seen(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        let mut rows = self.rows.write().await;
        let user = rows.get_mut(&id).ok_or(RepoError::NotFound)?;
        user.last_seen = at;
        Ok(())
    }

    async fn list(&self, filter: &UserFilter, page: PageRequest) -> Result<Page<User>, RepoError> {
        let mut users: Vec<User> = self
            .rows
            .read()
            .await
            .values()
            .filter(|u| {
                filter
                    .search
                    .as_deref()
                    .is_none_or(|term| u.username.contains(term))
            })
            .cloned()
            .collect();
        match filter.sort {
            UserSort::Username => users.sort_by(|a, b| a.username.cmp(&b.username)),
            UserSort::Admin => users.sort_by(|a, b| a.admin.cmp(&b.admin)),
        }
        if filter.descending {
            users.reverse();
        }
        Ok(Page::from_vec(users, page))
    }

    async fn all(&self) -> Result<Vec<User>, RepoError> {
        let mut users: Vec<User> = self.rows.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}

/// Posts kept in insertion order; authors are looked up in the shared users.
pub struct FakePosts {
    users: Arc<FakeUsers>,
    rows: RwLock<Vec<Post>>,
}

impl FakePosts {
    pub fn new(users: Arc<FakeUsers>) -> Self {
        Self {
            users,
            rows: RwLock::new(Vec::new()),
        }
    }

    async fn with_author(&self, post: Post) -> Result<AuthoredPost, RepoError> {
        let user = self
            .users
            .find_by_id(post.user_id)
            .await?
            .ok_or(RepoError::NotFound)?;
        Ok(AuthoredPost {
            author: Author {
                id: user.id,
                username: user.username,
                image_file: user.image_file,
            },
            post,
        })
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for FakePosts {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.rows.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        self.rows.write().await.push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Post) -> Result<Post, RepoError> {
        let mut rows = self.rows.write().await;
        let slot = rows
            .iter_mut()
            .find(|p| p.id == entity.id)
            .ok_or(RepoError::NotFound)?;
        *slot = entity.clone();
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|p| p.id != id);
        if rows.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.rows.read().await.len() as u64)
    }
}

#[async_trait]
impl PostRepository for FakePosts {
    async fn find_with_author(&self, id: Uuid) -> Result<Option<AuthoredPost>, RepoError> {
        match self.find_by_id(id).await? {
            Some(post) => Ok(Some(self.with_author(post).await?)),
            None => Ok(None),
        }
    }

    async fn search(
        &self,
        term: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<AuthoredPost>, RepoError> {
        // Newest first; posts sharing a timestamp keep reverse insertion order.
        let mut matching: Vec<Post> = self
            .rows
            .read()
            .await
            .iter()
            .rev()
            .filter(|p| term.is_none_or(|t| p.title.contains(t) || p.body.contains(t)))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut authored = Vec::with_capacity(matching.len());
        for post in matching {
            authored.push(self.with_author(post).await?);
        }
        Ok(Page::from_vec(authored, page))
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// Reversible stand-in for a real password hash.
pub struct PlainPasswords;

impl PlainPasswords {
    pub fn hashed(password: &str) -> String {
        format!("hashed:{password}")
    }
}

impl PasswordService for PlainPasswords {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(Self::hashed(password))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(Self::hashed(password) == hash)
    }
}

/// Accepts any bytes and remembers them under a random name.
#[derive(Default)]
pub struct FakeImages {
    stored: RwLock<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl ProfileImageStore for FakeImages {
    async fn save(&self, original_name: &str, bytes: Vec<u8>) -> Result<String, MediaError> {
        let ext = allowed_extension(original_name)
            .ok_or_else(|| MediaError::UnsupportedType(original_name.to_string()))?;
        let name = format!("{}.{ext}", &Uuid::new_v4().simple().to_string()[..16]);
        self.stored.write().await.insert(name.clone(), bytes);
        Ok(name)
    }

    async fn load(&self, name: &str) -> Result<Vec<u8>, MediaError> {
        self.stored
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or(MediaError::NotFound)
    }
}
