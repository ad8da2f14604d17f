//! Registration, login and profile maintenance.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::{PROFILE_CONFLICTS, REGISTRATION_CONFLICTS, conflict_error, find_conflicts, supplied};
use crate::domain::{User, masked_email};
use crate::error::DomainError;
use crate::ports::{PasswordService, ProfileImageStore, UserRepository, allowed_extension};
use crate::validation::{self, FieldErrors, USERNAME_RE, non_blank};

/// Sign-up form input.
#[derive(Debug, Clone, Validate)]
pub struct Registration {
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
}

/// Login form input.
#[derive(Debug, Clone, Validate)]
pub struct Credentials {
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "A password is required"))]
    pub password: String,
}

/// Account page input. Blank `password` keeps the current one.
#[derive(Debug, Clone, Validate)]
pub struct ProfileUpdate {
    #[validate(
        length(min = 4, max = 25, message = "This field length must be between 4 and 25 characters"),
        regex(path = *USERNAME_RE, message = "Username must have only letters, numbers, dots or underscores")
    )]
    pub username: String,
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[validate(length(max = 200, message = "Field cannot be longer than 200 characters."))]
    pub about_me: Option<String>,
    #[validate(length(min = 6, message = "This field length must be more 5 characters"))]
    pub password: Option<String>,
}

/// An uploaded profile picture.
#[derive(Debug, Clone)]
pub struct Picture {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Registration, authentication and self-service profile updates.
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    images: Arc<dyn ProfileImageStore>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        images: Arc<dyn ProfileImageStore>,
    ) -> Self {
        Self {
            users,
            passwords,
            images,
        }
    }

    /// Create an account with a hashed password.
    pub async fn register(&self, input: Registration) -> Result<User, DomainError> {
        let input = Registration {
            username: input.username.trim().to_string(),
            email: input.email.trim().to_string(),
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

        let password_hash = self.passwords.hash(&input.password)?;
        let user = User::new(input.username, input.email, password_hash);
        let saved = self
            .users
            .insert(user)
            .await
            .map_err(|e| conflict_error(e, &REGISTRATION_CONFLICTS))?;

        tracing::info!(user_id = %saved.id, username = %saved.username, "Account registered");
        Ok(saved)
    }

    /// Check a login attempt.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<User, DomainError> {
        validation::check(credentials)?;
        let email = credentials.email.trim();

        let Some(user) = self.users.find_by_email(email).await? else {
            tracing::info!(user_email = %masked_email(email), "Login rejected: unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        if !self
            .passwords
            .verify(&credentials.password, &user.password_hash)?
        {
            tracing::info!(user_id = %user.id, "Login rejected: wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "Login accepted");
        Ok(user)
    }

    /// Resolve the user behind a session and record the visit.
    pub async fn resume(&self, user_id: Uuid) -> Result<Option<User>, DomainError> {
        let Some(mut user) = self.users.find_by_id(user_id).await? else {
            return Ok(None);
        };
        let now = Utc::now();
        self.users.touch_last_seen(user.id, now).await?;
        user.last_seen = now;
        Ok(Some(user))
    }

    /// Apply the account page to `user`.
    pub async fn update_profile(
        &self,
        user: &User,
        update: ProfileUpdate,
        picture: Option<Picture>,
    ) -> Result<User, DomainError> {
        let update = ProfileUpdate {
            username: update.username.trim().to_string(),
            email: update.email.trim().to_string(),
            about_me: non_blank(update.about_me),
            password: supplied(update.password),
        };

        let mut errors = validation::check(&update).err().unwrap_or_default();
        if let Some(picture) = &picture {
            if allowed_extension(&picture.file_name).is_none() {
                errors.add("picture", "File does not have an approved extension: jpg, png");
            }
        }
        let conflicts = find_conflicts(
            self.users.as_ref(),
            &update.username,
            &update.email,
            Some(user.id),
            &PROFILE_CONFLICTS,
            &errors,
        )
        .await?;
        errors.merge(conflicts);
        errors.into_result()?;

        let mut updated = user.clone();
        if let Some(picture) = picture {
            updated.image_file = self.store_picture(picture).await?;
        }
        if let Some(password) = &update.password {
            updated.password_hash = self.passwords.hash(password)?;
        }
        updated.username = update.username;
        updated.email = update.email;
        updated.about_me = update.about_me;

        let saved = self
            .users
            .update(updated)
            .await
            .map_err(|e| conflict_error(e, &PROFILE_CONFLICTS))?;
        tracing::info!(user_id = %saved.id, "Profile updated");
        Ok(saved)
    }

    async fn store_picture(&self, picture: Picture) -> Result<String, DomainError> {
        match self.images.save(&picture.file_name, picture.bytes).await {
            Ok(name) => Ok(name),
            Err(crate::ports::MediaError::InvalidImage(reason)) => {
                tracing::debug!(%reason, "Rejected profile picture");
                let mut errors = FieldErrors::new();
                errors.add("picture", "The uploaded file is not a readable image.");
                Err(DomainError::Invalid(errors))
            }
            Err(e) => Err(e.into()),
        }
    }
}
