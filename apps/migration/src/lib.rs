//! Schema migrations for the blog database.
//!
//! The web server applies these on startup; the `migration` binary exposes
//! the usual `up`, `down`, `status` and `fresh` commands.

pub use sea_orm_migration::prelude::*;

mod m20201201_000001_create_user;
mod m20201201_000002_create_post;
mod m20201207_000003_add_user_admin;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20201201_000001_create_user::Migration),
            Box::new(m20201201_000002_create_post::Migration),
            Box::new(m20201207_000003_add_user_admin::Migration),
        ]
    }
}
