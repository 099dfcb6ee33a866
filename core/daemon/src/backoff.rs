//! Restart spin protection.
//!
//! The program exits on purpose whenever the game closes or presence can't be
//! established, trusting an external supervisor to start it again. If starts
//! pile up inside a short window, startup is delayed so a persistent failure
//! can't turn into a tight restart loop.

use chrono::{DateTime, Utc};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::warn;

const WINDOW_SECS: i64 = 120;
const FREE_STARTS: usize = 3;
const DELAY_STEP_SECS: u64 = 10;
const DELAY_MAX_SECS: u64 = 60;

/// Start times inside the current window, oldest first.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
struct RestartHistory {
    starts: Vec<DateTime<Utc>>,
}

/// Records this start and sleeps if the program is restarting too often.
pub fn apply_restart_backoff(path: &Path) -> Option<Duration> {
    let now = Utc::now();
    let mut history = RestartHistory::load(path, now);
    let delay = history.record_start(now);
    history.save(path);

    let secs = delay?;
    warn!(
        recent_starts = history.starts.len(),
        delay_secs = secs,
        "Restarting too often, delaying startup"
    );
    let delay = Duration::from_secs(secs);
    thread::sleep(delay);
    Some(delay)
}

impl RestartHistory {
    /// Reads the history at `path`, keeping only starts inside the window
    /// ending at `now`. A missing or unreadable file counts as no history.
    fn load(path: &Path, now: DateTime<Utc>) -> Self {
        let mut history = match fs::read(path) {
            Ok(data) => serde_json::from_slice(&data).unwrap_or_else(|err| {
                warn!(error = %err, "Ignoring corrupt restart history");
                Self::default()
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Self::default(),
            Err(err) => {
                warn!(error = %err, "Ignoring unreadable restart history");
                Self::default()
            }
        };
        history.prune(now);
        history
    }

    /// Starts stamped after `now` come from a clock change and are dropped too.
    fn prune(&mut self, now: DateTime<Utc>) {
        self.starts.retain(|start| {
            let age = now.signed_duration_since(*start).num_seconds();
            (0..=WINDOW_SECS).contains(&age)
        });
        self.starts.sort();
    }

    /// Appends `now` and returns the startup delay in seconds, if any.
    fn record_start(&mut self, now: DateTime<Utc>) -> Option<u64> {
        self.prune(now);
        self.starts.push(now);

        let extra = self.starts.len().checked_sub(FREE_STARTS)? as u64;
        if extra == 0 {
            return None;
        }
        Some(DELAY_STEP_SECS.saturating_mul(extra).min(DELAY_MAX_SECS))
    }

    /// Best effort.
    fn save(&self, path: &Path) {
        let result = path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| {
                let json = serde_json::to_vec(self).map_err(std::io::Error::other)?;
                fs::write(path, json)
            });
        if let Err(err) = result {
            warn!(error = %err, path = %path.display(), "Failed to persist restart history");
        }
    }
}
