//! Profile picture storage.

mod profile_images;

pub use profile_images::{FsProfileImageStore, THUMBNAIL_SIZE};
