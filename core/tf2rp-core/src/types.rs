//! Value types passed between components each cycle.
//!
//! Everything here is rebuilt from scratch every iteration; nothing carries
//! identity across cycles except the session start timestamp held by
//! [`crate::session::PresenceSession`].

use serde::Serialize;
use std::path::PathBuf;

/// Map value meaning "not in a match".
pub const IN_MENUS: &str = "In menus";
/// Activity value right after a map loads, before a class is picked.
pub const UNSELECTED: &str = "unselected";
/// Activity value after returning to the menus.
pub const NOT_QUEUED: &str = "Not queued";

// ═══════════════════════════════════════════════════════════════════════════════
// Process Roles
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessRole {
    /// The game itself (Source engine launcher inside the TF2 folder).
    GameClient,
    /// Steam.
    PlatformClient,
    /// Discord; presence can only be shown while it runs.
    DisplayClient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessRecord {
    pub role: ProcessRole,
    pub install_path: PathBuf,
    /// Seconds since the Unix epoch.
    pub process_start_time: u64,
}

/// Per-cycle classification result. Liveness of a role is "present here".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessRoleSet {
    pub game: Option<ProcessRecord>,
    pub platform: Option<ProcessRecord>,
    pub display: Option<ProcessRecord>,
}

impl ProcessRoleSet {
    pub fn get(&self, role: ProcessRole) -> Option<&ProcessRecord> {
        match role {
            ProcessRole::GameClient => self.game.as_ref(),
            ProcessRole::PlatformClient => self.platform.as_ref(),
            ProcessRole::DisplayClient => self.display.as_ref(),
        }
    }

    pub fn contains(&self, role: ProcessRole) -> bool {
        self.get(role).is_some()
    }

    /// Stores a record in its role slot, replacing any earlier one.
    pub fn insert(&mut self, record: ProcessRecord) {
        let slot = match record.role {
            ProcessRole::GameClient => &mut self.game,
            ProcessRole::PlatformClient => &mut self.platform,
            ProcessRole::DisplayClient => &mut self.display,
        };
        *slot = Some(record);
    }

    pub fn is_complete(&self) -> bool {
        self.game.is_some() && self.platform.is_some() && self.display.is_some()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Activity Snapshot
// ═══════════════════════════════════════════════════════════════════════════════

/// Matchmaking/party status, only meaningful while in menus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueState {
    #[default]
    NotQueued,
    QueuedCasual,
    QueuedCompetitive,
    QueuedMvM,
    /// Standby queue for a party's match.
    QueuedParty,
    InParty,
    /// Queued, with the match type hidden by settings (or unrecognized).
    Queued,
}

impl QueueState {
    pub fn label(self) -> &'static str {
        match self {
            QueueState::NotQueued => NOT_QUEUED,
            QueueState::QueuedCasual => "Queued for Casual",
            QueueState::QueuedCompetitive => "Queued for Competitive",
            QueueState::QueuedMvM => "Queued for MvM",
            QueueState::QueuedParty => "Queued for a party's match",
            QueueState::InParty => "In a party",
            QueueState::Queued => "Queued",
        }
    }

    pub fn is_queued(self) -> bool {
        !matches!(self, QueueState::NotQueued | QueueState::InParty)
    }
}

/// Canonical inferred state of one game session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivitySnapshot {
    pub map: String,
    pub activity: String,
    pub queue_state: QueueState,
    pub server_address: String,
    pub build_number: String,
}

impl ActivitySnapshot {
    pub fn in_menus(&self) -> bool {
        self.map == IN_MENUS
    }

    /// Snapshot for "back at the main menu", keeping only the build number.
    pub fn menu_reset(self) -> Self {
        Self {
            map: IN_MENUS.to_string(),
            activity: NOT_QUEUED.to_string(),
            queue_state: QueueState::NotQueued,
            server_address: String::new(),
            build_number: self.build_number,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Presence Payload
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresencePayload {
    pub title: String,
    pub subtitle: String,
    pub large_icon_key: String,
    pub large_icon_label: String,
    pub small_icon_key: String,
    pub small_icon_label: String,
    /// Seconds since the Unix epoch.
    pub session_start_timestamp: i64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Poll State
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollState {
    pub last_cycle_wall_clock: Option<chrono::DateTime<chrono::Utc>>,
    pub last_measured_idle_seconds: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_reset_clears_server_and_keeps_build() {
        let snapshot = ActivitySnapshot {
            map: "cp_badlands".to_string(),
            activity: "Scout".to_string(),
            queue_state: QueueState::InParty,
            server_address: "1.2.3.4:27015".to_string(),
            build_number: "5970214".to_string(),
        };

        let reset = snapshot.menu_reset();
        assert!(reset.in_menus());
        assert_eq!(reset.activity, NOT_QUEUED);
        assert_eq!(reset.queue_state, QueueState::NotQueued);
        assert!(reset.server_address.is_empty());
        assert_eq!(reset.build_number, "5970214");
    }

    #[test]
    fn role_set_insert_routes_by_role() {
        let mut roles = ProcessRoleSet::default();
        roles.insert(ProcessRecord {
            role: ProcessRole::DisplayClient,
            install_path: PathBuf::new(),
            process_start_time: 1,
        });

        assert!(roles.contains(ProcessRole::DisplayClient));
        assert!(!roles.contains(ProcessRole::GameClient));
        assert!(!roles.is_complete());
    }

    #[test]
    fn party_is_not_a_queue() {
        assert!(!QueueState::InParty.is_queued());
        assert!(QueueState::Queued.is_queued());
        assert!(QueueState::QueuedParty.is_queued());
    }
}
