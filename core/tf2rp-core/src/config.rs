//! Settings loading and well-known paths.
//!
//! Settings live in a TOML file under the user's config directory. A missing
//! file yields defaults; every key is optional.

use crate::error::{PresenceError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "tf2-rich-presence";
const SETTINGS_FILE: &str = "settings.toml";

/// Base delay between cycles when none is configured.
pub const DEFAULT_WAIT_TIME: f64 = 5.0;

/// Discord application registered for TF2 Rich Presence.
pub const DEFAULT_DISCORD_APP_ID: i64 = 429389143756374017;

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportLevel {
    /// Report Error and Critical events.
    Error,
    /// Report Critical events only.
    #[default]
    Critical,
    Never,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Base delay between cycles, in seconds.
    pub wait_time: f64,
    /// Back off the delay while the user is idle.
    pub scale_wait_time: bool,
    /// Number of trailing console.log lines to interpret.
    pub console_scan_lines: usize,
    pub hide_queued_gamemode: bool,
    pub hide_provider: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
    /// How many program log files to keep.
    pub max_program_logs: usize,
    pub report_level: ReportLevel,
    pub discord_app_id: i64,
    /// Usernames to treat as local in addition to those Steam knows about.
    pub extra_usernames: Vec<String>,
    /// Provider name to the server addresses it runs.
    pub providers: BTreeMap<String, Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wait_time: DEFAULT_WAIT_TIME,
            scale_wait_time: true,
            console_scan_lines: 10_000,
            hide_queued_gamemode: false,
            hide_provider: false,
            log_level: "info".to_string(),
            max_program_logs: 20,
            report_level: ReportLevel::Critical,
            discord_app_id: DEFAULT_DISCORD_APP_ID,
            extra_usernames: Vec::new(),
            providers: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Finds the provider running `server_address`, if any is configured.
    pub fn provider_for(&self, server_address: &str) -> Option<&str> {
        if server_address.is_empty() {
            return None;
        }
        self.providers
            .iter()
            .find(|(_, addresses)| addresses.iter().any(|a| a == server_address))
            .map(|(name, _)| name.as_str())
    }
}

/// Returns `<config dir>/tf2-rich-presence`.
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME))
}

/// Returns `<local data dir>/tf2-rich-presence`, where logs, reports and
/// restart bookkeeping live.
pub fn get_data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join(APP_DIR_NAME))
}

pub fn default_settings_path() -> Option<PathBuf> {
    get_config_dir().map(|d| d.join(SETTINGS_FILE))
}

/// Loads settings from `path` (or the default location), returning defaults
/// when the file doesn't exist.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_settings_path() {
            Some(path) => path,
            None => return Ok(Settings::default()),
        },
    };

    let content = match fs_err::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Settings::default());
        }
        Err(source) => return Err(PresenceError::ConfigRead { path, source }),
    };

    let settings =
        toml::from_str::<Settings>(&content).map_err(|err| PresenceError::ConfigMalformed {
            path: path.clone(),
            details: err.to_string(),
        })?;

    if !is_valid_wait_time(settings.wait_time) {
        return Err(PresenceError::ConfigMalformed {
            path,
            details: format!(
                "wait_time must be a positive number of seconds, got {}",
                settings.wait_time
            ),
        });
    }

    Ok(settings)
}

/// Finite, positive and small enough to sleep for.
pub fn is_valid_wait_time(secs: f64) -> bool {
    secs > 0.0 && std::time::Duration::try_from_secs_f64(secs).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_settings_defaults_when_file_missing() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("missing.toml");
        let settings = load_settings(Some(&path)).expect("load settings");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn load_settings_parses_partial_file() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("settings.toml");
        fs_err::write(
            &path,
            r#"
wait_time = 3
scale_wait_time = false
hide_queued_gamemode = true
report_level = "never"
extra_usernames = ["heavy_main"]

[providers]
"Skial" = ["1.2.3.4:27015", "1.2.3.5:27015"]
"#,
        )
        .expect("write settings");

        let settings = load_settings(Some(&path)).expect("load settings");
        assert!((settings.wait_time - 3.0).abs() < f64::EPSILON);
        assert!(!settings.scale_wait_time);
        assert!(settings.hide_queued_gamemode);
        assert_eq!(settings.report_level, ReportLevel::Never);
        assert_eq!(settings.console_scan_lines, 10_000);
        assert_eq!(settings.extra_usernames, vec!["heavy_main".to_string()]);
        assert_eq!(settings.provider_for("1.2.3.5:27015"), Some("Skial"));
        assert_eq!(settings.provider_for("9.9.9.9:27015"), None);
        assert_eq!(settings.provider_for(""), None);
    }

    #[test]
    fn load_settings_rejects_malformed_file() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("settings.toml");
        fs_err::write(&path, "wait_time = \"soon\"").expect("write settings");

        let err = load_settings(Some(&path)).expect_err("malformed");
        assert!(matches!(err, PresenceError::ConfigMalformed { .. }));
    }

    #[test]
    fn load_settings_rejects_unusable_wait_time() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("settings.toml");

        for value in ["inf", "nan", "0.0", "-5.0", "1e300"] {
            fs_err::write(&path, format!("wait_time = {}", value)).expect("write settings");
            let err = load_settings(Some(&path)).expect_err(value);
            assert!(
                matches!(err, PresenceError::ConfigMalformed { ref details, .. } if details.contains("wait_time")),
                "{}: {:?}",
                value,
                err
            );
        }
    }
}
