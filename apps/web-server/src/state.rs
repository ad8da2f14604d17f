//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    PasswordService, PostRepository, ProfileImageStore, SessionStore, SessionTokenService,
    UserRepository,
};
use quill_core::services::{AccountService, PostAdmin, PostService, UserAdmin};
use quill_infra::{
    Argon2PasswordService, FsProfileImageStore, InMemoryPostRepository, InMemorySessionStore,
    InMemoryStore, InMemoryUserRepository, JwtConfig, JwtSessionTokenService,
};

use crate::config::{AppConfig, Settings};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub passwords: Arc<dyn PasswordService>,
    pub sessions: Arc<dyn SessionStore>,
    pub tokens: Arc<dyn SessionTokenService>,
    pub images: Arc<dyn ProfileImageStore>,
    pub settings: Settings,
}

type Repositories = (Arc<dyn UserRepository>, Arc<dyn PostRepository>);

fn in_memory_repositories() -> Repositories {
    let store = InMemoryStore::new();
    (
        Arc::new(InMemoryUserRepository::new(store.clone())),
        Arc::new(InMemoryPostRepository::new(store)),
    )
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// Missing or unreachable backends fall back to in-memory ones.
    pub async fn new(config: &AppConfig) -> Self {
        let (users, posts) = Self::repositories(config).await;
        let sessions = Self::session_store(config).await;

        let images = FsProfileImageStore::new(&config.settings.media_root);
        if let Err(e) = images.init().await {
            tracing::error!(error = %e, dir = %images.dir().display(), "Failed to prepare media directory");
        }

        tracing::info!("Application state initialized");

        Self {
            users,
            posts,
            passwords: Arc::new(Argon2PasswordService::new()),
            sessions,
            tokens: Arc::new(JwtSessionTokenService::new(config.jwt.clone())),
            images: Arc::new(images),
            settings: config.settings.clone(),
        }
    }

    /// Fully in-memory state; pictures still go to `settings.media_root`.
    pub fn in_memory(settings: Settings, jwt: JwtConfig) -> Self {
        let (users, posts) = in_memory_repositories();
        Self {
            users,
            posts,
            passwords: Arc::new(Argon2PasswordService::new()),
            sessions: Arc::new(InMemorySessionStore::new()),
            tokens: Arc::new(JwtSessionTokenService::new(jwt)),
            images: Arc::new(FsProfileImageStore::new(&settings.media_root)),
            settings,
        }
    }

    #[cfg(feature = "database")]
    async fn repositories(config: &AppConfig) -> Repositories {
        use migration::{Migrator, MigratorTrait};
        use quill_infra::database::connect;
        use quill_infra::{SeaPostRepository, SeaUserRepository};

        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return in_memory_repositories();
        };

        let conn = match connect(db_config).await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
                return in_memory_repositories();
            }
        };

        if let Err(e) = Migrator::up(&conn, None).await {
            tracing::error!(error = %e, "Database migration failed. Using in-memory fallback.");
            return in_memory_repositories();
        }

        (
            Arc::new(SeaUserRepository::new(conn.clone())),
            Arc::new(SeaPostRepository::new(conn)),
        )
    }

    #[cfg(not(feature = "database"))]
    async fn repositories(_config: &AppConfig) -> Repositories {
        tracing::info!("Running without database feature - using in-memory repositories");
        in_memory_repositories()
    }

    #[cfg(feature = "redis")]
    async fn session_store(config: &AppConfig) -> Arc<dyn SessionStore> {
        use quill_infra::RedisSessionStore;

        let Some(redis) = &config.redis else {
            return Arc::new(InMemorySessionStore::new());
        };
        match RedisSessionStore::new(redis).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::error!(error = %e, "Redis unavailable. Using in-memory sessions.");
                Arc::new(InMemorySessionStore::new())
            }
        }
    }

    #[cfg(not(feature = "redis"))]
    async fn session_store(_config: &AppConfig) -> Arc<dyn SessionStore> {
        Arc::new(InMemorySessionStore::new())
    }

    pub fn accounts(&self) -> AccountService {
        AccountService::new(
            self.users.clone(),
            self.passwords.clone(),
            self.images.clone(),
        )
    }

    pub fn post_service(&self) -> PostService {
        PostService::new(self.posts.clone(), self.settings.posts_per_page)
    }

    pub fn user_admin(&self) -> UserAdmin {
        UserAdmin::new(
            self.users.clone(),
            self.passwords.clone(),
            self.settings.admin_page_size,
        )
    }

    pub fn post_admin(&self) -> PostAdmin {
        PostAdmin::new(
            self.posts.clone(),
            self.users.clone(),
            self.settings.admin_page_size,
        )
    }
}
