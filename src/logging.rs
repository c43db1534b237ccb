use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::env_bool;

const LOG_FILE_PREFIX: &str = "kotoba.log";

/// Keeps the non-blocking file writer flushing; hold it until shutdown.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init_tracing(log_level: &str) -> Option<FileLogGuard> {
    let stdout_layer = fmt::layer().with_target(true);

    if !env_bool("ENABLE_FILE_LOGS", false) {
        tracing_subscriber::registry()
            .with(build_filter(log_level))
            .with(stdout_layer)
            .init();
        return None;
    }

    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string());
    if let Err(err) = std::fs::create_dir_all(&log_dir) {
        eprintln!("failed to create log directory {log_dir}: {err}");
        tracing_subscriber::registry()
            .with(build_filter(log_level))
            .with(stdout_layer)
            .init();
        return None;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(build_filter(log_level))
        .with(stdout_layer)
        .with(file_layer)
        .init();

    tracing::info!(dir = %log_dir, "file logging enabled");
    Some(FileLogGuard { _guard: guard })
}
