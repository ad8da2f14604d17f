//! Domain entities - the core business objects.

mod page;
mod post;
mod user;

pub use page::{Page, PageRequest};
pub use post::{Author, AuthoredPost, Post};
pub use user::{DEFAULT_IMAGE_FILE, User, masked_email};
