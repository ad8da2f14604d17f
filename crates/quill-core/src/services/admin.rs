//! Admin panel use cases: managing every user and every post.

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::{REGISTRATION_CONFLICTS, conflict_error, find_conflicts, supplied};
use crate::domain::{AuthoredPost, Page, PageRequest, Post, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{PasswordService, PostRepository, UserFilter, UserRepository};
use crate::services::PostDraft;
use crate::validation::{self, USERNAME_RE, non_blank};

/// Admin "new user" form. `admin` is whatever the form submitted; the form
/// itself starts unchecked.
#[derive(Debug, Clone, Validate)]
pub struct AdminUserCreate {
    #[validate(
        length(min = 4, max = 25, message = "This field length must be between 4 and 25 characters"),
        regex(path = *USERNAME_RE, message = "Username must have only letters, numbers, dots or underscores")
    )]
    pub username: String,
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[validate(length(min = 6, message = "This field length must be more 5 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Field must be equal to password."))]
    pub password2: String,
    #[validate(length(max = 200, message = "Field cannot be longer than 200 characters."))]
    pub about_me: Option<String>,
    pub admin: bool,
}

/// Admin "edit user" form. A blank `new_password` keeps the stored hash.
#[derive(Debug, Clone, Validate)]
pub struct AdminUserUpdate {
    #[validate(
        length(min = 4, max = 25, message = "This field length must be between 4 and 25 characters"),
        regex(path = *USERNAME_RE, message = "Username must have only letters, numbers, dots or underscores")
    )]
    pub username: String,
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[validate(length(max = 200, message = "Field cannot be longer than 200 characters."))]
    pub about_me: Option<String>,
    pub admin: bool,
    #[validate(length(min = 6, message = "This field length must be more 5 characters"))]
    pub new_password: Option<String>,
    pub confirm: Option<String>,
}

/// User management for administrators.
pub struct UserAdmin {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    page_size: u64,
}

impl UserAdmin {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        page_size: u64,
    ) -> Self {
        Self {
            users,
            passwords,
            page_size,
        }
    }

    pub async fn list(&self, filter: &UserFilter, page: u64) -> Result<Page<User>, DomainError> {
        let filter = UserFilter {
            search: non_blank(filter.search.clone()),
            ..filter.clone()
        };
        Ok(self
            .users
            .list(&filter, PageRequest::new(page, self.page_size))
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, DomainError> {
        self.users.find_by_id(id).await?.ok_or(DomainError::NotFound {
            entity_type: "user",
            id,
        })
    }

    /// Create a user; the password is required and hashed before it is stored.
    pub async fn create(&self, input: AdminUserCreate) -> Result<User, DomainError> {
        let input = AdminUserCreate {
            username: input.username.trim().to_string(),
            email: input.email.trim().to_string(),
            about_me: non_blank(input.about_me),
            ..input
        };

        let mut errors = validation::check(&input).err().unwrap_or_default();
        let conflicts = find_conflicts(
            self.users.as_ref(),
            &input.username,
            &input.email,
            None,
            &REGISTRATION_CONFLICTS,
            &errors,
        )
        .await?;
        errors.merge(conflicts);
        errors.into_result()?;

        let mut user = User::new(
            input.username,
            input.email,
            self.passwords.hash(&input.password)?,
        );
        user.about_me = input.about_me;
        user.admin = input.admin;

        let saved = self
            .users
            .insert(user)
            .await
            .map_err(|e| conflict_error(e, &REGISTRATION_CONFLICTS))?;
        tracing::info!(user_id = %saved.id, admin = saved.admin, "Admin created user");
        Ok(saved)
    }

    /// Apply the edit form to user `id`.
    ///
    /// A new password whose confirmation differs rejects the whole update with
    /// [`DomainError::PasswordMismatch`] before anything is written.
    pub async fn update(&self, id: Uuid, input: AdminUserUpdate) -> Result<User, DomainError> {
        let existing = self.get(id).await?;
        let input = AdminUserUpdate {
            username: input.username.trim().to_string(),
            email: input.email.trim().to_string(),
            about_me: non_blank(input.about_me),
            new_password: supplied(input.new_password),
            ..input
        };

        if let Some(new_password) = &input.new_password {
            if input.confirm.as_deref() != Some(new_password.as_str()) {
                tracing::info!(user_id = %id, "Admin password reset rejected: confirmation mismatch");
                return Err(DomainError::PasswordMismatch);
            }
        }

        let mut errors = validation::check(&input).err().unwrap_or_default();
        let conflicts = find_conflicts(
            self.users.as_ref(),
            &input.username,
            &input.email,
            Some(id),
            &REGISTRATION_CONFLICTS,
            &errors,
        )
        .await?;
        errors.merge(conflicts);
        errors.into_result()?;

        let mut updated = existing;
        if let Some(new_password) = &input.new_password {
            updated.password_hash = self.passwords.hash(new_password)?;
        }
        updated.username = input.username;
        updated.email = input.email;
        updated.about_me = input.about_me;
        updated.admin = input.admin;

        let saved = self
            .users
            .update(updated)
            .await
            .map_err(|e| conflict_error(e, &REGISTRATION_CONFLICTS))?;
        tracing::info!(
            user_id = %saved.id,
            admin = saved.admin,
            password_reset = input.new_password.is_some(),
            "Admin updated user"
        );
        Ok(saved)
    }

    /// Delete a user and, with them, their posts. Admins cannot delete themselves.
    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<(), DomainError> {
        if actor.id == id {
            return Err(DomainError::Forbidden);
        }
        self.users.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::NotFound {
                entity_type: "user",
                id,
            },
            other => other.into(),
        })?;
        tracing::info!(user_id = %id, actor_id = %actor.id, "Admin deleted user");
        Ok(())
    }

    /// Grant the admin flag to the account registered under `email`.
    pub async fn promote(&self, email: &str) -> Result<User, DomainError> {
        let mut user = self
            .users
            .find_by_email(email.trim())
            .await?
            .ok_or(DomainError::Repo(RepoError::NotFound))?;
        user.admin = true;
        let user = self.users.update(user).await?;
        tracing::info!(user_id = %user.id, "User promoted to admin");
        Ok(user)
    }
}

/// Admin post form: a draft plus the author it is filed under.
#[derive(Debug, Clone)]
pub struct AdminPostDraft {
    pub author_id: Uuid,
    pub draft: PostDraft,
}

/// Totals shown on the admin landing page.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct Dashboard {
    pub users: u64,
    pub posts: u64,
}

/// Post management for administrators; unlike [`PostService`](super::PostService)
/// there is no authorship check.
pub struct PostAdmin {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    page_size: u64,
}

impl PostAdmin {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        page_size: u64,
    ) -> Self {
        Self {
            posts,
            users,
            page_size,
        }
    }

    pub async fn dashboard(&self) -> Result<Dashboard, DomainError> {
        Ok(Dashboard {
            users: self.users.count().await?,
            posts: self.posts.count().await?,
        })
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        page: u64,
    ) -> Result<Page<AuthoredPost>, DomainError> {
        let term = search.map(str::trim).filter(|s| !s.is_empty());
        Ok(self
            .posts
            .search(term, PageRequest::new(page, self.page_size))
            .await?)
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

    /// Candidates for the author picker.
    pub async fn authors(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.users.all().await?)
    }

    pub async fn create(&self, input: AdminPostDraft) -> Result<Post, DomainError> {
        self.check(&input).await?;
        let post = self
            .posts
            .insert(Post::new(
                input.author_id,
                input.draft.title,
                input.draft.body,
            ))
            .await?;
        tracing::info!(post_id = %post.id, user_id = %post.user_id, "Admin created post");
        Ok(post)
    }

    pub async fn update(&self, id: Uuid, input: AdminPostDraft) -> Result<Post, DomainError> {
        let mut post = self.posts.find_by_id(id).await?.ok_or(DomainError::NotFound {
            entity_type: "post",
            id,
        })?;
        self.check(&input).await?;
        post.user_id = input.author_id;
        post.revise(input.draft.title, input.draft.body);
        let post = self.posts.update(post).await?;
        tracing::info!(post_id = %post.id, "Admin edited post");
        Ok(post)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.posts.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::NotFound {
                entity_type: "post",
                id,
            },
            other => other.into(),
        })?;
        tracing::info!(post_id = %id, "Admin deleted post");
        Ok(())
    }

    async fn check(&self, input: &AdminPostDraft) -> Result<(), DomainError> {
        let mut errors = validation::check(&input.draft).err().unwrap_or_default();
        if self.users.find_by_id(input.author_id).await?.is_none() {
            errors.add("author", "Not a valid choice");
        }
        errors.into_result().map_err(DomainError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::BaseRepository;
    use crate::services::testing::{FakePosts, FakeUsers, PlainPasswords};

    fn admin_service(users: Arc<FakeUsers>) -> UserAdmin {
        UserAdmin::new(users, Arc::new(PlainPasswords), 20)
    }

    fn new_user(username: &str, email: &str) -> AdminUserCreate {
        AdminUserCreate {
            username: username.into(),
            email: email.into(),
            password: "secret1".into(),
            password2: "secret1".into(),
            about_me: None,
            admin: false,
        }
    }

    fn edit_of(user: &User) -> AdminUserUpdate {
        AdminUserUpdate {
            username: user.username.clone(),
            email: user.email.clone(),
            about_me: user.about_me.clone(),
            admin: user.admin,
            new_password: None,
            confirm: None,
        }
    }

    #[tokio::test]
    async fn create_hashes_and_respects_admin_flag() {
        let admin = admin_service(Arc::new(FakeUsers::default()));
        let user = admin.create(new_user("carol", "c@example.com")).await.unwrap();
        assert!(!user.admin);
        assert_eq!(user.password_hash, PlainPasswords::hashed("secret1"));

        let boss = admin
            .create(AdminUserCreate {
                admin: true,
                ..new_user("dave1", "d@example.com")
            })
            .await
            .unwrap();
        assert!(boss.admin);
    }

    #[tokio::test]
    async fn mismatched_confirmation_leaves_user_untouched() {
        let users = Arc::new(FakeUsers::default());
        let admin = admin_service(users.clone());
        let user = admin.create(new_user("carol", "c@example.com")).await.unwrap();

        let err = admin
            .update(
                user.id,
                AdminUserUpdate {
                    username: "renamed".into(),
                    new_password: Some("another1".into()),
                    confirm: Some("another2".into()),
                    ..edit_of(&user)
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PasswordMismatch));

        let stored = users.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, user.password_hash);
        assert_eq!(stored.username, "carol");
    }

    #[tokio::test]
    async fn blank_new_password_preserves_hash() {
        let users = Arc::new(FakeUsers::default());
        let admin = admin_service(users.clone());
        let user = admin.create(new_user("carol", "c@example.com")).await.unwrap();

        let updated = admin
            .update(
                user.id,
                AdminUserUpdate {
                    admin: true,
                    new_password: Some(String::new()),
                    confirm: Some("ignored".into()),
                    ..edit_of(&user)
                },
            )
            .await
            .unwrap();
        assert!(updated.admin);
        assert_eq!(updated.password_hash, user.password_hash);
    }

    #[tokio::test]
    async fn matching_new_password_is_rehashed() {
        let admin = admin_service(Arc::new(FakeUsers::default()));
        let user = admin.create(new_user("carol", "c@example.com")).await.unwrap();
        let updated = admin
            .update(
                user.id,
                AdminUserUpdate {
                    new_password: Some("another1".into()),
                    confirm: Some("another1".into()),
                    ..edit_of(&user)
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.password_hash, PlainPasswords::hashed("another1"));
    }

    #[tokio::test]
    async fn update_checks_uniqueness_against_others_only() {
        let admin = admin_service(Arc::new(FakeUsers::default()));
        let carol = admin.create(new_user("carol", "c@example.com")).await.unwrap();
        admin.create(new_user("dave1", "d@example.com")).await.unwrap();

        assert!(admin.update(carol.id, edit_of(&carol)).await.is_ok());

        let err = admin
            .update(
                carol.id,
                AdminUserUpdate {
                    email: "d@example.com".into(),
                    ..edit_of(&carol)
                },
            )
            .await
            .unwrap_err();
        let DomainError::Invalid(errors) = err else {
            panic!("expected validation errors");
        };
        assert!(errors.contains("email"));
    }

    #[tokio::test]
    async fn admins_cannot_delete_themselves() {
        let users = Arc::new(FakeUsers::default());
        let admin = admin_service(users.clone());
        let me = admin
            .create(AdminUserCreate {
                admin: true,
                ..new_user("boss1", "boss@example.com")
            })
            .await
            .unwrap();
        let other = admin.create(new_user("carol", "c@example.com")).await.unwrap();

        assert!(matches!(
            admin.delete(&me, me.id).await,
            Err(DomainError::Forbidden)
        ));
        admin.delete(&me, other.id).await.unwrap();
        assert!(users.find_by_id(other.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn post_admin_requires_existing_author() {
        let users = Arc::new(FakeUsers::default());
        let author = users
            .insert(User::new("alice".into(), "a@example.com".into(), "h".into()))
            .await
            .unwrap();
        let posts = Arc::new(FakePosts::new(users.clone()));
        let admin = PostAdmin::new(posts, users, 20);

        let err = admin
            .create(AdminPostDraft {
                author_id: Uuid::new_v4(),
                draft: PostDraft::new("T", "B"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Invalid(_)));

        let post = admin
            .create(AdminPostDraft {
                author_id: author.id,
                draft: PostDraft::new("T", "B"),
            })
            .await
            .unwrap();
        let dashboard = admin.dashboard().await.unwrap();
        assert_eq!(dashboard.posts, 1);
        assert_eq!(dashboard.users, 1);

        admin.delete(post.id).await.unwrap();
        assert!(matches!(
            admin.delete(post.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
