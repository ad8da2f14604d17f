//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use quill_infra::{DatabaseConfig, JwtConfig};

#[cfg(feature = "redis")]
use quill_infra::RedisConfig;

/// Knobs the request handlers read at runtime.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Idle lifetime of a browser-session login (sliding).
    pub session_ttl: Duration,
    /// Lifetime of a "remember me" login.
    pub remember_for: Duration,
    pub cookie_secure: bool,
    pub media_root: PathBuf,
    pub posts_per_page: u64,
    pub admin_page_size: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(24 * 3600),
            remember_for: Duration::from_secs(365 * 24 * 3600),
            cookie_secure: false,
            media_root: PathBuf::from("./media"),
            posts_per_page: 5,
            admin_page_size: 20,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    #[cfg(feature = "redis")]
    pub redis: Option<RedisConfig>,
    pub jwt: JwtConfig,
    pub settings: Settings,
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Settings::default();
        let settings = Settings {
            session_ttl: Duration::from_secs(parsed("SESSION_TTL_HOURS", 24u64) * 3600),
            remember_for: Duration::from_secs(parsed("REMEMBER_DAYS", 365u64) * 24 * 3600),
            cookie_secure: env::var("SESSION_COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.media_root),
            posts_per_page: parsed("POSTS_PER_PAGE", defaults.posts_per_page).max(1),
            admin_page_size: parsed("ADMIN_PAGE_SIZE", defaults.admin_page_size).max(1),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 8080),
            database: DatabaseConfig::from_env(),
            #[cfg(feature = "redis")]
            redis: RedisConfig::from_env(),
            jwt: JwtConfig::from_env(),
            settings,
        }
    }
}
