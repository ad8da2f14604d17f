//! Form payloads as posted by the HTML forms.
//!
//! Every field defaults to empty so a tampered or partial form reaches
//! validation instead of failing deserialization.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_core::ports::{UserFilter, UserSort};
use quill_core::services::{
    AdminPostDraft, AdminUserCreate, AdminUserUpdate, Credentials, PostDraft, ProfileUpdate,
    Registration,
};

/// HTML checkbox semantics: present with any "on"-like value means checked.
pub fn checked(value: &Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::to_ascii_lowercase).as_deref(),
        Some("y" | "on" | "true" | "1" | "yes")
    )
}

/// Page number from a query string; anything unparsable is page 1.
pub fn page_number(raw: &Option<String>) -> u64 {
    raw.as_deref()
        .and_then(|p| p.trim().parse::<u64>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1)
}

/// Forms whose only payload is the CSRF token (delete buttons).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CsrfForm {
    pub csrf_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub password2: String,
    #[serde(skip_serializing)]
    pub csrf_token: String,
}

impl From<&RegistrationForm> for Registration {
    fn from(form: &RegistrationForm) -> Self {
        Self {
            username: form.username.clone(),
            email: form.email.clone(),
            password: form.password.clone(),
            password2: form.password2.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub remember: Option<String>,
    #[serde(skip_serializing)]
    pub csrf_token: String,
}

impl LoginForm {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }

    pub fn remember(&self) -> bool {
        checked(&self.remember)
    }
}

/// `?next=` on the login page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing)]
    pub csrf_token: String,
}

impl PostForm {
    pub fn draft(&self) -> PostDraft {
        PostDraft::new(&self.title, &self.body)
    }
}

/// Text fields of the multipart account form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccountForm {
    pub username: String,
    pub email: String,
    pub about_me: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub csrf_token: String,
}

impl AccountForm {
    /// Assign a named multipart text field; unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        match name {
            "username" => self.username = value,
            "email" => self.email = value,
            "about_me" => self.about_me = value,
            "password" => self.password = value,
            "csrf_token" => self.csrf_token = value,
            _ => {}
        }
    }
}

impl From<&AccountForm> for ProfileUpdate {
    fn from(form: &AccountForm) -> Self {
        Self {
            username: form.username.clone(),
            email: form.email.clone(),
            about_me: Some(form.about_me.clone()),
            password: Some(form.password.clone()),
        }
    }
}

/// `/posts?q=&page=`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostListQuery {
    pub q: Option<String>,
    pub page: Option<String>,
}

impl PostListQuery {
    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn page(&self) -> u64 {
        page_number(&self.page)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminUserForm {
    pub username: String,
    pub email: String,
    pub about_me: String,
    pub admin: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub password2: String,
    #[serde(skip_serializing)]
    pub new_password: String,
    #[serde(skip_serializing)]
    pub confirm: String,
    #[serde(skip_serializing)]
    pub csrf_token: String,
}

impl AdminUserForm {
    pub fn is_admin(&self) -> bool {
        checked(&self.admin)
    }

    pub fn create(&self) -> AdminUserCreate {
        AdminUserCreate {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            password2: self.password2.clone(),
            about_me: Some(self.about_me.clone()),
            admin: self.is_admin(),
        }
    }

    pub fn update(&self) -> AdminUserUpdate {
        AdminUserUpdate {
            username: self.username.clone(),
            email: self.email.clone(),
            about_me: Some(self.about_me.clone()),
            admin: self.is_admin(),
            new_password: Some(self.new_password.clone()),
            confirm: Some(self.confirm.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminPostForm {
    pub title: String,
    pub body: String,
    pub author_id: String,
    #[serde(skip_serializing)]
    pub csrf_token: String,
}

impl AdminPostForm {
    /// `None` when the author field is not a UUID.
    pub fn draft(&self) -> Option<AdminPostDraft> {
        let author_id = Uuid::parse_str(self.author_id.trim()).ok()?;
        Some(AdminPostDraft {
            author_id,
            draft: PostDraft::new(&self.title, &self.body),
        })
    }
}

/// `/admin/users/?search=&sort=&desc=&page=`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub desc: Option<String>,
    pub page: Option<String>,
}

impl UserListQuery {
    pub fn filter(&self) -> UserFilter {
        UserFilter {
            search: self.search.clone(),
            sort: match self.sort.as_deref() {
                Some("admin") => UserSort::Admin,
                _ => UserSort::Username,
            },
            descending: checked(&self.desc),
        }
    }

    pub fn page(&self) -> u64 {
        page_number(&self.page)
    }
}

/// `/admin/posts/?search=&page=`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminPostListQuery {
    pub search: Option<String>,
    pub page: Option<String>,
}

impl AdminPostListQuery {
    pub fn page(&self) -> u64 {
        page_number(&self.page)
    }
}
