//! One iteration of the observe → interpret → present loop.
//!
//! Nothing but the presence session survives between cycles. Every other
//! value is recomputed from the process table and the console log, so a bad
//! cycle can't poison the next one.

use crate::config::Settings;
use crate::console_log::{self, ConsoleLogReport};
use crate::error::{PresenceError, Result};
use crate::payload::build_payload;
use crate::process::ProcessSource;
use crate::session::{ConnectOutcome, PresenceConnector, PresenceSession, PushOutcome};
use crate::steam;
use crate::types::{PresencePayload, ProcessRoleSet};
use std::path::{Path, PathBuf};

/// Why the process should exit and let its supervisor restart it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminateReason {
    /// The game went away after presence was connected.
    GameClosed,
    /// The game runs without `-condebug`; the user has to fix launch options.
    MissingConsoleLog(PathBuf),
    EndpointUnreachable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Updated {
        payload: PresencePayload,
        /// True when this cycle opened the connection.
        connected_now: bool,
        /// Set when the send found the connection unexpectedly closed.
        anomaly: Option<String>,
        lines_retained: usize,
    },
    DisplayClientMissing,
    GameNotRunning,
    Terminate(TerminateReason),
}

pub struct CycleDriver<S: ProcessSource, C: PresenceConnector> {
    scanner: S,
    session: PresenceSession<C>,
    settings: Settings,
    iteration: u64,
    console_log: Option<PathBuf>,
}

impl<S: ProcessSource, C: PresenceConnector> CycleDriver<S, C> {
    pub fn new(scanner: S, connector: C, settings: Settings) -> Self {
        Self {
            scanner,
            session: PresenceSession::new(connector),
            settings,
            iteration: 0,
            console_log: None,
        }
    }

    pub fn session(&self) -> &PresenceSession<C> {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Drops the presence connection before an intentional exit.
    pub fn shutdown(&mut self) {
        self.session.teardown();
    }

    /// The console log read by the most recent presence update.
    pub fn console_log(&self) -> Option<&Path> {
        self.console_log.as_deref()
    }

    pub fn run_cycle(&mut self) -> Result<CycleOutcome> {
        self.iteration += 1;
        tracing::debug!(iteration = self.iteration, "Cycle started");

        let roles = self.scanner.scan();

        match (&roles.game, &roles.display) {
            (Some(_), Some(_)) => self.update_presence(&roles),
            (None, _) if self.session.is_connected() => {
                tracing::info!("Game closed while presence was connected, restarting");
                self.session.teardown();
                Ok(CycleOutcome::Terminate(TerminateReason::GameClosed))
            }
            (_, None) => {
                tracing::debug!("Discord isn't running");
                Ok(CycleOutcome::DisplayClientMissing)
            }
            (None, Some(_)) => {
                tracing::debug!("TF2 isn't running");
                Ok(CycleOutcome::GameNotRunning)
            }
        }
    }

    fn update_presence(&mut self, roles: &ProcessRoleSet) -> Result<CycleOutcome> {
        let Some(game) = roles.game.as_ref() else {
            return Ok(CycleOutcome::GameNotRunning);
        };
        let session_start = self.session.observe_game_start(game.process_start_time);

        let usernames = self.known_usernames(roles);
        let log_path = console_log::console_log_path(&game.install_path);
        self.console_log = Some(log_path.clone());
        let report: ConsoleLogReport = match console_log::interpret(
            &log_path,
            &usernames,
            self.settings.console_scan_lines,
            self.settings.hide_queued_gamemode,
        ) {
            Ok(report) => report,
            Err(PresenceError::MissingLogFile(path)) => {
                tracing::error!(path = %path.display(), "console.log doesn't exist");
                return Ok(CycleOutcome::Terminate(TerminateReason::MissingConsoleLog(path)));
            }
            Err(err) => return Err(err),
        };

        let connected_now = match self.session.ensure_connected() {
            Ok(outcome) => outcome == ConnectOutcome::Connected,
            Err(PresenceError::EndpointUnreachable(reason)) => {
                return Ok(CycleOutcome::Terminate(TerminateReason::EndpointUnreachable(
                    reason,
                )));
            }
            Err(err) => return Err(err),
        };

        let payload = build_payload(&report.snapshot, session_start, &self.settings);
        let anomaly = match self.session.push(&payload)? {
            PushOutcome::Sent => None,
            PushOutcome::ConnectionLost { reason } => Some(reason),
        };

        Ok(CycleOutcome::Updated {
            payload,
            connected_now,
            anomaly,
            lines_retained: report.lines_retained,
        })
    }

    fn known_usernames(&self, roles: &ProcessRoleSet) -> Vec<String> {
        let mut usernames = roles
            .platform
            .as_ref()
            .map(|platform| steam::known_usernames(&platform.install_path))
            .unwrap_or_default();
        for extra in &self.settings.extra_usernames {
            if !usernames.contains(extra) {
                usernames.push(extra.clone());
            }
        }
        usernames
    }
}
