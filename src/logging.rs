use crate::config::{OverlayConfig, DEFAULT_LOG_LEVEL};
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. Returns the guard that flushes the
/// background writer; `None` when logging is off.
pub fn init(config: &OverlayConfig) -> Option<WorkerGuard> {
    if !config.log_enabled {
        return None;
    }

    let level = if config.log_level.trim().is_empty() {
        DEFAULT_LOG_LEVEL
    } else {
        config.log_level.trim()
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let (writer, guard) = match open_log_file(config.log_file.trim()) {
        Some(file) => tracing_appender::non_blocking(file),
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
    Some(guard)
}

fn open_log_file(path: &str) -> Option<File> {
    if path.is_empty() {
        return None;
    }
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            let _ = fs::create_dir_all(parent);
        }
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}
