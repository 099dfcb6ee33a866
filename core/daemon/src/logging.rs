use fs_err as fs;
use std::env;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE_PREFIX: &str = "tf2-rich-presence.log";

pub fn init(log_dir: &Path, default_level: &str, keep_files: usize) -> WorkerGuard {
    if let Err(e) = fs::create_dir_all(log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let debug_enabled = env::var("TF2RP_DEBUG_LOG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let env_filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_dir = %log_dir.display(),
        "Starting TF2 Rich Presence"
    );

    cleanup_old_logs(log_dir, keep_files);

    guard
}

/// The most recently modified program log, if any.
pub fn latest_log_file(log_dir: &Path) -> Option<PathBuf> {
    log_files(log_dir)
        .into_iter()
        .max_by_key(|(_, modified)| *modified)
        .map(|(path, _)| path)
}

/// Deletes the oldest program logs beyond `keep_files`.
fn cleanup_old_logs(log_dir: &Path, keep_files: usize) {
    let mut files = log_files(log_dir);
    if files.len() <= keep_files {
        return;
    }

    files.sort_by_key(|(_, modified)| *modified);
    let excess = files.len() - keep_files;
    let mut deleted = 0usize;

    for (path, _) in files.into_iter().take(excess) {
        match fs::remove_file(&path) {
            Ok(()) => deleted += 1,
            Err(e) => tracing::warn!(error = %e, path = %path.display(), "Failed to remove old log file"),
        }
    }

    tracing::debug!(deleted, "Removed old log files");
}

fn log_files(log_dir: &Path) -> Vec<(PathBuf, std::time::SystemTime)> {
    let entries = match fs::read_dir(log_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read log directory");
            return Vec::new();
        }
    };

    entries
        .flatten()
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX))
        })
        .filter_map(|entry| {
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some((entry.path(), modified))
        })
        .collect()
}
