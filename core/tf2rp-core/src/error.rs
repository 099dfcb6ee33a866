//! Error types for tf2rp-core operations.

use std::path::PathBuf;

/// All errors that can occur while observing the game and driving presence.
///
/// Variants are grouped by how the cycle driver treats them: missing input
/// triggers remediation, transport failures are fatal, the rest are reported.
#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Settings file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    #[error("Settings file unreadable: {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Console Log Errors
    // ─────────────────────────────────────────────────────────────────────
    /// The game is running without `-condebug`, so no console log exists.
    #[error("Console log not found at {0}")]
    MissingLogFile(PathBuf),

    #[error("Failed to read console log {path}: {source}")]
    LogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Presence Transport Errors
    // ─────────────────────────────────────────────────────────────────────
    /// The chat client is running but its presence service refused us.
    #[error("Presence endpoint unreachable: {0}")]
    EndpointUnreachable(String),

    #[error("Presence transport error: {0}")]
    Transport(String),

    #[error("Presence session is not connected")]
    NotConnected,

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl PresenceError {
    /// True for errors that must end the process so the supervisor restarts it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PresenceError::EndpointUnreachable(_))
    }
}

/// Convenience type alias for Results using PresenceError.
pub type Result<T> = std::result::Result<T, PresenceError>;

impl From<PresenceError> for String {
    fn from(err: PresenceError) -> String {
        err.to_string()
    }
}
