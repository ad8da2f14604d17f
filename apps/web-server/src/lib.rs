//! # Quill web server
//!
//! A small blogging application: accounts with sessions, posts with search,
//! profile pictures and an admin panel, served as HTML by actix-web.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod redirect;
pub mod state;
pub mod telemetry;
pub mod views;

pub use handlers::configure_routes;
pub use middleware::SessionMiddleware;
pub use state::AppState;
