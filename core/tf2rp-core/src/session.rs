//! Presence session lifecycle.
//!
//! The session exclusively owns the connection to the display endpoint.
//! Connecting is idempotent; disconnecting is best effort because the
//! underlying transport doesn't reliably detach within one process lifetime.
//! Process restart is the real cleanup path.

use crate::error::{PresenceError, Result};
use crate::payload::menu_payload;
use crate::types::PresencePayload;

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// The chat client runs but its presence service isn't answering.
    #[error("client unreachable: {0}")]
    Unreachable(String),
    #[error("{0}")]
    Other(String),
}

/// An open connection to the presence endpoint.
pub trait PresenceConnection {
    fn update(&mut self, payload: &PresencePayload) -> std::result::Result<(), String>;
    /// Whether the transport still considers itself connected.
    fn is_connected(&self) -> bool;
    fn disconnect(&mut self) -> std::result::Result<(), String>;
}

/// Opens connections to the presence endpoint.
pub trait PresenceConnector {
    type Connection: PresenceConnection;

    fn connect(&mut self) -> std::result::Result<Self::Connection, ConnectError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    AlreadyConnected,
    /// A new connection was opened and the menu payload sent.
    Connected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Sent,
    /// The send went out but the transport reports it is no longer connected.
    ConnectionLost { reason: String },
}

pub struct PresenceSession<C: PresenceConnector> {
    connector: C,
    connection: Option<C::Connection>,
    state: SessionState,
    last_sent: Option<PresencePayload>,
    session_start: i64,
    observed_game_start: Option<u64>,
}

impl<C: PresenceConnector> PresenceSession<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            connection: None,
            state: SessionState::Disconnected,
            last_sent: None,
            session_start: chrono::Utc::now().timestamp(),
            observed_game_start: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Last payload that went out successfully. Diagnostics only.
    pub fn last_sent(&self) -> Option<&PresencePayload> {
        self.last_sent.as_ref()
    }

    pub fn session_start(&self) -> i64 {
        self.session_start
    }

    /// Records the game client's start time and returns the session start.
    ///
    /// The timestamp only moves when a different game process shows up, so it
    /// stays fixed for a continuous play session.
    pub fn observe_game_start(&mut self, process_start_time: u64) -> i64 {
        if self.observed_game_start != Some(process_start_time) {
            tracing::debug!(
                previous = ?self.observed_game_start,
                start = process_start_time,
                "New game client observed"
            );
            self.observed_game_start = Some(process_start_time);
            self.session_start = process_start_time as i64;
        }
        self.session_start
    }

    /// Opens the connection unless one is already open.
    ///
    /// A fresh connection immediately receives the menu payload.
    pub fn ensure_connected(&mut self) -> Result<ConnectOutcome> {
        if self.state == SessionState::Connected && self.connection.is_some() {
            return Ok(ConnectOutcome::AlreadyConnected);
        }

        self.state = SessionState::Connecting;
        tracing::info!("Connecting to presence endpoint");

        let mut connection = match self.connector.connect() {
            Ok(connection) => connection,
            Err(ConnectError::Unreachable(reason)) => {
                self.state = SessionState::Disconnected;
                tracing::error!(reason = %reason, "Can't connect to presence endpoint");
                return Err(PresenceError::EndpointUnreachable(reason));
            }
            Err(ConnectError::Other(reason)) => {
                self.state = SessionState::Disconnected;
                return Err(PresenceError::Transport(reason));
            }
        };

        let initial = menu_payload(self.session_start);
        if let Err(reason) = connection.update(&initial) {
            self.state = SessionState::Disconnected;
            return Err(PresenceError::Transport(reason));
        }

        tracing::debug!(payload = ?initial, "Sent initial payload");
        self.connection = Some(connection);
        self.last_sent = Some(initial);
        self.state = SessionState::Connected;
        Ok(ConnectOutcome::Connected)
    }

    /// Sends `payload`, even if it equals the previous one.
    pub fn push(&mut self, payload: &PresencePayload) -> Result<PushOutcome> {
        if self.state != SessionState::Connected {
            return Err(PresenceError::NotConnected);
        }
        let connection = self.connection.as_mut().ok_or(PresenceError::NotConnected)?;

        let lost = match connection.update(payload) {
            Err(reason) => Some(reason),
            Ok(()) if !connection.is_connected() => {
                Some("transport reports it is disconnected".to_string())
            }
            Ok(()) => None,
        };

        match lost {
            None => {
                tracing::debug!(payload = ?payload, "Sent payload");
                self.last_sent = Some(payload.clone());
                Ok(PushOutcome::Sent)
            }
            Some(reason) => {
                tracing::error!(critical = true, reason = %reason, "Presence connection lost during send");
                // Reconnect on the next cycle.
                self.connection = None;
                self.state = SessionState::Disconnected;
                Ok(PushOutcome::ConnectionLost { reason })
            }
        }
    }

    /// Best-effort disconnect. Failures are logged, never returned.
    pub fn teardown(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            tracing::debug!("Disconnecting presence client");
            if let Err(err) = connection.disconnect() {
                tracing::error!(error = %err, "Presence client error while disconnecting");
            }
        }
        self.state = SessionState::Disconnected;
    }
}
