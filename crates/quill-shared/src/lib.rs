//! # Quill Shared
//!
//! Types exchanged between the HTTP layer and the templates: the payloads the
//! HTML forms post, and the view models pages render.

pub mod dto;
pub mod forms;

pub use dto::{AuthorView, PageView, PostView, UserView, image_url};
