//! Process discovery: one pass over the OS process table per cycle.

use crate::types::{ProcessRecord, ProcessRole, ProcessRoleSet};
use std::path::{Path, PathBuf};
use std::time::Instant;
use sysinfo::{ProcessRefreshKind, System, UpdateKind};

/// Source engine launchers that can host TF2.
const GAME_LAUNCHERS: &[&str] = &[
    "hl2.exe",
    "tf.exe",
    "tf_win64.exe",
    "hl2_linux",
    "tf_linux64",
    "hl2_osx",
];
/// Folder that distinguishes TF2 from other Source games.
const GAME_FOLDER_MARKER: &str = "Team Fortress 2";
const PLATFORM_LAUNCHERS: &[&str] = &["Steam.exe", "steam", "steam_osx"];
/// Case-sensitive; matches Discord, DiscordPTB, DiscordCanary, Discord.exe.
const DISPLAY_MARKER: &str = "Discord";

/// Whatever the OS told us about one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub name: String,
    /// First command line argument, or the resolved executable when the
    /// command line is hidden from us.
    pub executable: Option<String>,
    /// Seconds since the Unix epoch.
    pub start_time: u64,
}

/// Anything that can produce this cycle's role set.
pub trait ProcessSource {
    fn scan(&mut self) -> ProcessRoleSet;
}

/// Scans the live process table with sysinfo.
#[derive(Debug, Clone, Default)]
pub struct SystemProcessScanner;

impl ProcessSource for SystemProcessScanner {
    fn scan(&mut self) -> ProcessRoleSet {
        let started = Instant::now();

        // Fresh System every call: the table is never cached across cycles.
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessRefreshKind::new()
                .with_cmd(UpdateKind::Always)
                .with_exe(UpdateKind::Always),
        );

        let processes = sys.processes().values().map(|process| ProcessInfo {
            name: process.name().to_string(),
            executable: process
                .cmd()
                .first()
                .filter(|arg| !arg.is_empty())
                .cloned()
                .or_else(|| process.exe().map(|exe| exe.to_string_lossy().to_string())),
            start_time: process.start_time(),
        });
        let (roles, searched) = classify_processes(processes);

        tracing::debug!(
            searched,
            total = sys.processes().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            game = roles.game.is_some(),
            platform = roles.platform.is_some(),
            display = roles.display.is_some(),
            "Process scan finished"
        );
        roles
    }
}

/// Classifies processes into roles, stopping once every role is filled.
///
/// Returns the role set and how many processes were examined.
pub fn classify_processes<I>(processes: I) -> (ProcessRoleSet, usize)
where
    I: IntoIterator<Item = ProcessInfo>,
{
    let mut roles = ProcessRoleSet::default();
    let mut searched = 0usize;

    for process in processes {
        searched += 1;
        match classify(&process) {
            Ok(Some(record)) => roles.insert(record),
            Ok(None) => {}
            Err(reason) => {
                tracing::debug!(name = %process.name, reason, "Skipping process");
            }
        }

        if roles.is_complete() {
            tracing::debug!(searched, "All roles found, ending scan early");
            break;
        }
    }

    (roles, searched)
}

/// Decides which role, if any, a process plays.
///
/// `Err` means the process looked relevant but couldn't be introspected.
pub fn classify(process: &ProcessInfo) -> Result<Option<ProcessRecord>, &'static str> {
    let Some(role) = role_for_name(&process.name) else {
        return Ok(None);
    };

    match role {
        ProcessRole::GameClient => {
            let executable = process
                .executable
                .as_deref()
                .ok_or("game launcher has no visible command line")?;
            if !executable.contains(GAME_FOLDER_MARKER) {
                // Another Source game.
                return Ok(None);
            }
            Ok(Some(ProcessRecord {
                role,
                install_path: install_path(executable, &process.name),
                process_start_time: process.start_time,
            }))
        }
        ProcessRole::PlatformClient => {
            let executable = process
                .executable
                .as_deref()
                .ok_or("platform client has no visible command line")?;
            Ok(Some(ProcessRecord {
                role,
                install_path: install_path(executable, &process.name),
                process_start_time: process.start_time,
            }))
        }
        ProcessRole::DisplayClient => Ok(Some(ProcessRecord {
            role,
            install_path: process
                .executable
                .as_deref()
                .map(|exe| install_path(exe, &process.name))
                .unwrap_or_default(),
            process_start_time: process.start_time,
        })),
    }
}

fn role_for_name(name: &str) -> Option<ProcessRole> {
    if GAME_LAUNCHERS.contains(&name) {
        Some(ProcessRole::GameClient)
    } else if PLATFORM_LAUNCHERS.contains(&name) {
        Some(ProcessRole::PlatformClient)
    } else if name.contains(DISPLAY_MARKER) {
        Some(ProcessRole::DisplayClient)
    } else {
        None
    }
}

/// Strips the trailing launcher name from an executable path.
fn install_path(executable: &str, launcher: &str) -> PathBuf {
    match executable.strip_suffix(launcher) {
        Some(dir) => PathBuf::from(dir),
        None => Path::new(executable)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    }
}
