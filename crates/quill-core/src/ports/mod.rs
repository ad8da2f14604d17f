//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod media;
mod repository;
mod session;

pub use auth::{AuthError, PasswordService, SessionTokenService};
pub use media::{ALLOWED_IMAGE_EXTENSIONS, MediaError, ProfileImageStore, allowed_extension};
pub use repository::{BaseRepository, PostRepository, UserFilter, UserRepository, UserSort};
pub use session::{Flash, FlashLevel, SessionError, SessionRecord, SessionStore};
