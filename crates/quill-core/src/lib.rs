//! # Quill Core
//!
//! The domain layer of the Quill blog.
//! This crate contains entities, validation rules, the ports that
//! infrastructure implements, and the services that drive them.
//! It has zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod validation;

pub use error::DomainError;
pub use validation::FieldErrors;
