use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::db::config::DbConfig;

const DEFAULT_CLEANUP_SCHEDULE: &str = "0 * * * * *";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub seed_vocabulary: bool,
    pub session_cleanup_enabled: bool,
    pub session_cleanup_schedule: String,
    pub srs: SrsConfig,
    pub db: DbConfig,
}

/// Tunables of the session orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SrsConfig {
    pub max_lessons_per_day: u32,
    pub session_idle_timeout: Duration,
    pub max_quiz_items: usize,
}

impl Default for SrsConfig {
    fn default() -> Self {
        Self {
            max_lessons_per_day: 15,
            session_idle_timeout: Duration::from_secs(30 * 60),
            max_quiz_items: 100,
        }
    }
}

impl SrsConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_lessons_per_day: env_parse("SRS_MAX_LESSONS_PER_DAY")
                .unwrap_or(defaults.max_lessons_per_day),
            session_idle_timeout: env_parse::<u64>("SRS_SESSION_IDLE_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_idle_timeout),
            max_quiz_items: env_parse::<usize>("SRS_MAX_QUIZ_ITEMS")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_quiz_items),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let port = env_parse::<u16>("PORT").unwrap_or(3000);

        let host = env_parse::<IpAddr>("HOST").unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let session_cleanup_schedule = std::env::var("SESSION_CLEANUP_SCHEDULE")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_CLEANUP_SCHEDULE.to_string());

        Self {
            host,
            port,
            log_level,
            seed_vocabulary: env_bool("SEED_VOCABULARY", true),
            session_cleanup_enabled: env_bool("ENABLE_SESSION_CLEANUP_WORKER", true),
            session_cleanup_schedule,
            srs: SrsConfig::from_env(),
            db: DbConfig::from_env(),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

pub fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(value) => parse_bool(&value).unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
}
