use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DbConfig {
    /// `sqlite:` URL; `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub busy_timeout: Duration,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Self {
            database_url,
            busy_timeout: Duration::from_millis(env_u64("SQLITE_BUSY_TIMEOUT_MS", 5000)),
            max_connections: env_u64("SQLITE_MAX_CONNECTIONS", 5).clamp(1, 64) as u32,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            database_url: None,
            busy_timeout: Duration::from_millis(5000),
            max_connections: 5,
        }
    }

    pub fn sqlite_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            database_url: Some(format!("sqlite:{}?mode=rwc", path.display())),
            ..Self::in_memory()
        }
    }
}

/// Default on-disk location used when `DATABASE_URL=sqlite:default`.
pub fn default_sqlite_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kotoba")
        .join("srs.db")
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
