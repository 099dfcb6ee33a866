//! Local crash reports.
//!
//! A report is a JSON document with the failure reason plus the tails of
//! the console log and the program log. Reports never leave the machine.

use chrono::{DateTime, Utc};
use fs_err as fs;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tf2rp_core::ReportLevel;

pub const REPORT_BYTE_LIMIT: u64 = 200_000;

#[derive(Debug, Serialize)]
pub struct CrashReport {
    pub created_at: DateTime<Utc>,
    pub version: &'static str,
    pub reason: String,
    pub iteration: u64,
    pub console_log: Option<String>,
    pub program_log: Option<String>,
}

impl CrashReport {
    pub fn new(reason: impl Into<String>, iteration: u64) -> Self {
        Self {
            created_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
            reason: reason.into(),
            iteration,
            console_log: None,
            program_log: None,
        }
    }

    pub fn with_console_log(mut self, path: Option<&Path>) -> Self {
        self.console_log = path.and_then(|p| read_truncated_file(p, REPORT_BYTE_LIMIT));
        self
    }

    pub fn with_program_log(mut self, path: Option<&Path>) -> Self {
        self.program_log = path.and_then(|p| read_truncated_file(p, REPORT_BYTE_LIMIT));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Critical,
}

/// Decides which failures become reports and where they go.
#[derive(Debug, Clone)]
pub struct Reporter {
    level: ReportLevel,
    reports_dir: PathBuf,
    log_dir: PathBuf,
}

impl Reporter {
    pub fn new(level: ReportLevel, reports_dir: PathBuf, log_dir: PathBuf) -> Self {
        Self {
            level,
            reports_dir,
            log_dir,
        }
    }

    pub fn accepts(&self, severity: Severity) -> bool {
        match self.level {
            ReportLevel::Never => false,
            ReportLevel::Critical => severity == Severity::Critical,
            ReportLevel::Error => true,
        }
    }

    pub fn report(
        &self,
        severity: Severity,
        reason: &str,
        iteration: u64,
        console_log: Option<&Path>,
    ) -> Option<PathBuf> {
        if !self.accepts(severity) {
            return None;
        }
        let program_log = crate::logging::latest_log_file(&self.log_dir);
        let report = CrashReport::new(reason, iteration)
            .with_console_log(console_log)
            .with_program_log(program_log.as_deref());
        match write_report(&self.reports_dir, &report) {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to write crash report");
                None
            }
        }
    }
}

/// Reads a file, keeping only its last `limit` bytes once it grows more
/// than ten percent past the limit. Returns `None` if it can't be read.
pub fn read_truncated_file(path: &Path, limit: u64) -> Option<String> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(error = %e, "Couldn't read file for crash report");
            return None;
        }
    };

    let size = bytes.len() as u64;
    let slack = limit + limit / 10;
    if size <= slack {
        return Some(String::from_utf8_lossy(&bytes).into_owned());
    }

    let start = (size - limit) as usize;
    let tail = String::from_utf8_lossy(&bytes[start..]);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Some(format!(
        "TRUNCATED {} ({} bytes) TO LAST {} BYTES\n{}\nTRUNCATED {} ({} bytes) TO LAST {} BYTES",
        file_name, size, limit, tail, file_name, size, limit
    ))
}

/// Writes `report` under `reports_dir` and returns where it landed.
pub fn write_report(reports_dir: &Path, report: &CrashReport) -> Result<PathBuf, String> {
    fs::create_dir_all(reports_dir).map_err(|e| format!("Failed to create reports dir: {}", e))?;

    let file_name = format!("crash-{}.json", report.created_at.format("%Y%m%dT%H%M%S%.3fZ"));
    let path = reports_dir.join(file_name);
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| format!("Failed to serialize crash report: {}", e))?;
    fs::write(&path, json).map_err(|e| format!("Failed to write crash report: {}", e))?;

    tracing::info!(path = %path.display(), "Crash report written");
    Ok(path)
}
