//! Application services - the use cases the web layer drives.
//!
//! Each service owns the ports it needs and returns [`DomainError`]; input
//! problems come back as [`DomainError::Invalid`] with every failing field.

mod accounts;
mod admin;
mod posts;
#[cfg(test)]
mod testing;

pub use accounts::{AccountService, Credentials, Picture, ProfileUpdate, Registration};
pub use admin::{AdminPostDraft, AdminUserCreate, AdminUserUpdate, Dashboard, PostAdmin, UserAdmin};
pub use posts::{PostDraft, PostService};

use uuid::Uuid;

use crate::error::{DomainError, RepoError};
use crate::ports::UserRepository;
use crate::validation::FieldErrors;

/// Messages used when a username or email already belongs to someone else.
pub(crate) struct ConflictMessages {
    pub username: &'static str,
    pub email: &'static str,
}

pub(crate) const REGISTRATION_CONFLICTS: ConflictMessages = ConflictMessages {
    username: "Please use a different username.",
    email: "Please use a different email address.",
};

pub(crate) const PROFILE_CONFLICTS: ConflictMessages = ConflictMessages {
    username: "Username is taken. Please choose another username!",
    email: "Email is taken. Please choose another email!",
};

/// Look for other accounts holding `username` or `email`.
///
/// Fields already failing in `known` are not checked again; `current` is the
/// account being edited, whose own values never conflict.
pub(crate) async fn find_conflicts(
    users: &dyn UserRepository,
    username: &str,
    email: &str,
    current: Option<Uuid>,
    messages: &ConflictMessages,
    known: &FieldErrors,
) -> Result<FieldErrors, RepoError> {
    let mut errors = FieldErrors::new();
    let is_other = |id: Uuid| current != Some(id);

    if !known.contains("username") {
        if let Some(existing) = users.find_by_username(username).await? {
            if is_other(existing.id) {
                errors.add("username", messages.username);
            }
        }
    }
    if !known.contains("email") {
        if let Some(existing) = users.find_by_email(email).await? {
            if is_other(existing.id) {
                errors.add("email", messages.email);
            }
        }
    }
    Ok(errors)
}

/// Map a unique-constraint failure that slipped past [`find_conflicts`]
/// onto the same inline messages.
pub(crate) fn conflict_error(err: RepoError, messages: &ConflictMessages) -> DomainError {
    match err {
        RepoError::Constraint(detail) => {
            let mut errors = FieldErrors::new();
            if detail.contains("email") {
                errors.add("email", messages.email);
            } else if detail.contains("username") {
                errors.add("username", messages.username);
            } else {
                return DomainError::Repo(RepoError::Constraint(detail));
            }
            DomainError::Invalid(errors)
        }
        other => DomainError::Repo(other),
    }
}

/// Normalise an optional password field: blank means "unchanged".
pub(crate) fn supplied(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
