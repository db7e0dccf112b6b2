use std::env;
use std::path::PathBuf;

/// Runtime settings, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. Required.
    pub database_url: String,
    /// Address the HTTP listener binds to.
    pub bind_addr: String,
    /// Absolute URL prefix used when building links in responses
    /// (pagination cursors, media URLs, short links). No trailing slash.
    pub base_url: String,
    /// Directory where uploaded avatar and recipe images are stored.
    pub media_root: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let bind_addr = load_with_default("BIND_ADDR", "0.0.0.0:3000");
        let base_url = load_with_default("BASE_URL", "http://localhost:3000");
        let media_root = PathBuf::from(load_with_default("MEDIA_ROOT", "media"));

        Self {
            database_url,
            bind_addr,
            base_url: base_url.trim_end_matches('/').to_string(),
            media_root,
        }
    }
}

fn load_with_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        tracing::info!("{} not set, using default: {}", key, default);
        default.to_string()
    })
}
