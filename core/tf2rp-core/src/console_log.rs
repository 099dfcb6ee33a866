//! Console log interpretation.
//!
//! TF2 only writes `tf/console.log` when launched with `-condebug`. The file
//! is append-only with no record boundaries, so the interpreter reads a
//! bounded tail and folds it oldest to newest: every line yields a new
//! snapshot and the last writer of each field wins.

use crate::error::{PresenceError, Result};
use crate::types::{ActivitySnapshot, QueueState, IN_MENUS, NOT_QUEUED, UNSELECTED};
use std::path::{Path, PathBuf};

const MAP_MARKER: &str = "Map:";
const CLASS_SUFFIX: &str = " selected";
const USER_DISCONNECT_MARKER: &str = "Disconnect by user";
const QUEUE_ENTRY_MARKER: &str = "[PartyClient] Entering queue ";
/// Full line: `[PartyClient] Entering standby queue`.
const STANDBY_QUEUE_MARKER: &str = "[PartyClient] Entering s";
/// Full line: `[PartyClient] Leaving queue`.
const QUEUE_LEAVE_MARKER: &str = "[PartyClient] L";
const PARTY_JOIN_MARKER: &str = "[PartyClient] Joining party ";
const BUILD_MARKER: &str = "Build:";
const CONNECTED_MARKER: &str = "Connected to";

/// Any of these means the player is back at the main menu.
const DISCONNECT_MARKERS: &[&str] = &[
    "Server shutting down",
    "Steam config directory",
    "Lobby destroyed",
    "Disconnect:",
    "Missing map",
];

const TF2_CLASSES: &[&str] = &[
    "Scout", "Soldier", "Pyro", "Demoman", "Heavy", "Engineer", "Medic", "Sniper", "Spy",
];

const MATCH_TYPES: &[(&str, QueueState)] = &[
    ("match group 12v12 Casual Match", QueueState::QueuedCasual),
    ("match group 6v6 Ladder Match", QueueState::QueuedCompetitive),
    ("match group MvM Practice", QueueState::QueuedMvM),
];

/// Inputs that stay fixed for a whole fold.
#[derive(Debug, Clone, Default)]
pub struct LineContext<'a> {
    pub known_usernames: &'a [String],
    pub hide_queued_gamemode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLogReport {
    pub snapshot: ActivitySnapshot,
    pub file_size: u64,
    pub total_lines: usize,
    /// Lines actually interpreted after bounding the tail.
    pub lines_retained: usize,
    /// The last line that changed the snapshot, for diagnostics.
    pub line_used: Option<String>,
}

pub fn console_log_path(game_install: &Path) -> PathBuf {
    game_install.join("tf").join("console.log")
}

/// Reads the tail of the console log at `path` and interprets it.
pub fn interpret(
    path: &Path,
    known_usernames: &[String],
    max_lines: usize,
    hide_queued_gamemode: bool,
) -> Result<ConsoleLogReport> {
    tracing::debug!(path = %path.display(), "Looking for console.log");

    let bytes = match fs_err::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(PresenceError::MissingLogFile(path.to_path_buf()));
        }
        Err(source) => {
            return Err(PresenceError::LogRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    // The game may keep appending after this point; we interpret what we got.
    let content = String::from_utf8_lossy(&bytes);

    let all_lines: Vec<&str> = content.lines().collect();
    let total_lines = all_lines.len();
    let lines = tail_lines(&all_lines, max_lines);
    if lines.len() < total_lines {
        tracing::debug!(retained = lines.len(), total_lines, "Limited console.log tail");
    }

    let ctx = LineContext {
        known_usernames,
        hide_queued_gamemode,
    };
    let (fold, line_used) = lines.iter().fold(
        (LogFold::default(), None::<&str>),
        |(previous, line_used), line| {
            let next = previous.clone().apply(line, &ctx);
            let line_used = if next != previous {
                Some(*line)
            } else {
                line_used
            };
            (next, line_used)
        },
    );
    let snapshot = fold.finish();

    tracing::debug!(
        bytes = bytes.len(),
        total_lines,
        build = %snapshot.build_number,
        map = %snapshot.map,
        activity = %snapshot.activity,
        queue = ?snapshot.queue_state,
        server = %snapshot.server_address,
        line_used = line_used.unwrap_or(""),
        "Interpreted console.log"
    );

    Ok(ConsoleLogReport {
        snapshot,
        file_size: bytes.len() as u64,
        total_lines,
        lines_retained: lines.len(),
        line_used: line_used.map(str::to_string),
    })
}

/// Keeps the trailing `max_lines` lines once the log exceeds 110% of that.
pub fn tail_lines<'a, 'b>(lines: &'b [&'a str], max_lines: usize) -> &'b [&'a str] {
    if lines.len() as f64 > max_lines as f64 * 1.1 {
        &lines[lines.len() - max_lines..]
    } else {
        lines
    }
}

/// Folds lines oldest to newest into a snapshot.
pub fn interpret_lines<'a, I>(lines: I, ctx: &LineContext<'_>) -> ActivitySnapshot
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .fold(LogFold::default(), |fold, line| fold.apply(line, ctx))
        .finish()
}

/// State carried between lines of one fold.
///
/// `snapshot.server_address` may hold an address seen while still in menus:
/// TF2 logs `Connected to` before the `Map:` line of the new server.
/// [`LogFold::finish`] drops it if no map followed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LogFold {
    snapshot: ActivitySnapshot,
    /// A non-zero party was joined and not left since.
    in_party: bool,
}

impl LogFold {
    fn finish(self) -> ActivitySnapshot {
        let mut snapshot = self.snapshot;
        if snapshot.in_menus() {
            snapshot.server_address.clear();
        }
        snapshot
    }

    /// Applies every pattern matching `line`, in a fixed order.
    fn apply(self, line: &str, ctx: &LineContext<'_>) -> Self {
        let LogFold {
            snapshot: mut next,
            mut in_party,
        } = self;

        if let Some(map) = text_after(line, MAP_MARKER) {
            in_party = false;
            next = ActivitySnapshot {
                map,
                activity: UNSELECTED.to_string(),
                queue_state: QueueState::NotQueued,
                ..next
            };
        }

        if let Some(class) = selected_class(line) {
            next = ActivitySnapshot {
                activity: class.to_string(),
                ..next
            };
        }

        if line.contains(USER_DISCONNECT_MARKER)
            && ctx
                .known_usernames
                .iter()
                .any(|name| !name.is_empty() && line.contains(name.as_str()))
        {
            next = next.menu_reset();
        }

        if DISCONNECT_MARKERS.iter().any(|marker| line.contains(marker)) {
            next = next.menu_reset();
        }

        if let Some(group) = text_after(line, QUEUE_ENTRY_MARKER) {
            let queue_state = if ctx.hide_queued_gamemode {
                QueueState::Queued
            } else {
                match_type(&group)
            };
            next = queued(next, queue_state);
        }

        if line.contains(STANDBY_QUEUE_MARKER) {
            next = queued(next, QueueState::QueuedParty);
        }

        if line.contains(QUEUE_LEAVE_MARKER) {
            next = ActivitySnapshot {
                activity: NOT_QUEUED.to_string(),
                queue_state: if in_party {
                    QueueState::InParty
                } else {
                    QueueState::NotQueued
                },
                ..next
            };
        }

        if let Some(party_id) = text_after(line, PARTY_JOIN_MARKER) {
            in_party = party_id != "0";
            if in_party && !next.queue_state.is_queued() {
                next = ActivitySnapshot {
                    queue_state: QueueState::InParty,
                    ..next
                };
            }
        }

        if let Some(build_number) = text_after(line, BUILD_MARKER) {
            next = ActivitySnapshot {
                build_number,
                ..next
            };
        }

        if let Some(server_address) = text_after(line, CONNECTED_MARKER) {
            next = ActivitySnapshot {
                server_address,
                ..next
            };
        }

        LogFold {
            snapshot: next,
            in_party,
        }
    }
}

fn queued(snapshot: ActivitySnapshot, queue_state: QueueState) -> ActivitySnapshot {
    ActivitySnapshot {
        map: IN_MENUS.to_string(),
        activity: queue_state.label().to_string(),
        queue_state,
        server_address: String::new(),
        build_number: snapshot.build_number,
    }
}

fn match_type(group: &str) -> QueueState {
    let group = group.strip_prefix("for ").unwrap_or(group);
    MATCH_TYPES
        .iter()
        .find(|(name, _)| *name == group)
        .map(|(_, state)| *state)
        .unwrap_or_else(|| {
            tracing::debug!(group, "Unrecognized match group");
            QueueState::Queued
        })
}

fn selected_class(line: &str) -> Option<&'static str> {
    let candidate = line.trim().strip_suffix(CLASS_SUFFIX)?;
    TF2_CLASSES.iter().copied().find(|class| *class == candidate)
}

fn text_after(line: &str, marker: &str) -> Option<String> {
    line.find(marker)
        .map(|index| line[index + marker.len()..].trim().to_string())
}
