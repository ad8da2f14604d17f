use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile picture every account starts with.
pub const DEFAULT_IMAGE_FILE: &str = "default.jpg";

/// User entity - a registered account, possibly an administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub image_file: String,
    pub about_me: Option<String>,
    pub last_seen: DateTime<Utc>,
    pub admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new, non-admin user with generated ID and timestamps.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            image_file: DEFAULT_IMAGE_FILE.to_string(),
            about_me: None,
            last_seen: now,
            admin: false,
            created_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }
}

/// Mask an email address for logging to avoid PII in logs.
pub fn masked_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let mut chars = local.chars();
            match (chars.next(), chars.next()) {
                (Some(first), Some(_)) => format!("{first}***@{domain}"),
                _ => format!("***@{domain}"),
            }
        }
        None => "***".to_string(),
    }
}
