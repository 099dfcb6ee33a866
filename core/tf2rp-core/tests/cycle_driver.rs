//! Integration tests for the cycle driver with faked collaborators.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::TempDir;
use tf2rp_core::{
    ConnectError, CycleDriver, CycleOutcome, PresenceConnection, PresenceConnector,
    PresencePayload, ProcessRecord, ProcessRole, ProcessRoleSet, ProcessSource, SessionState,
    Settings, TerminateReason,
};

#[derive(Default)]
struct Recorder {
    connects: usize,
    sent: Vec<PresencePayload>,
    disconnects: usize,
}

struct RecordingConnection {
    recorder: Rc<RefCell<Recorder>>,
}

impl PresenceConnection for RecordingConnection {
    fn update(&mut self, payload: &PresencePayload) -> Result<(), String> {
        self.recorder.borrow_mut().sent.push(payload.clone());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn disconnect(&mut self) -> Result<(), String> {
        self.recorder.borrow_mut().disconnects += 1;
        Ok(())
    }
}

struct RecordingConnector {
    recorder: Rc<RefCell<Recorder>>,
    unreachable: bool,
}

impl PresenceConnector for RecordingConnector {
    type Connection = RecordingConnection;

    fn connect(&mut self) -> Result<RecordingConnection, ConnectError> {
        if self.unreachable {
            return Err(ConnectError::Unreachable("Can't connect to Discord Client.".into()));
        }
        self.recorder.borrow_mut().connects += 1;
        Ok(RecordingConnection {
            recorder: Rc::clone(&self.recorder),
        })
    }
}

/// Hands out queued role sets, repeating the last one.
struct ScriptedScanner {
    script: Rc<RefCell<Vec<ProcessRoleSet>>>,
}

impl ProcessSource for ScriptedScanner {
    fn scan(&mut self) -> ProcessRoleSet {
        let mut script = self.script.borrow_mut();
        if script.len() > 1 {
            script.remove(0)
        } else {
            script.first().cloned().unwrap_or_default()
        }
    }
}

struct Harness {
    _temp: TempDir,
    game_dir: PathBuf,
    steam_dir: PathBuf,
    script: Rc<RefCell<Vec<ProcessRoleSet>>>,
    recorder: Rc<RefCell<Recorder>>,
    driver: CycleDriver<ScriptedScanner, RecordingConnector>,
}

fn harness(settings: Settings, unreachable: bool) -> Harness {
    let temp = tempfile::tempdir().expect("temp dir");
    let game_dir = temp.path().join("Team Fortress 2");
    std::fs::create_dir_all(game_dir.join("tf")).expect("tf dir");
    let steam_dir = temp.path().join("Steam");
    std::fs::create_dir_all(steam_dir.join("config")).expect("steam dir");

    let script = Rc::new(RefCell::new(Vec::new()));
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let driver = CycleDriver::new(
        ScriptedScanner {
            script: Rc::clone(&script),
        },
        RecordingConnector {
            recorder: Rc::clone(&recorder),
            unreachable,
        },
        settings,
    );

    Harness {
        _temp: temp,
        game_dir,
        steam_dir,
        script,
        recorder,
        driver,
    }
}

fn record(role: ProcessRole, path: &Path, start: u64) -> ProcessRecord {
    ProcessRecord {
        role,
        install_path: path.to_path_buf(),
        process_start_time: start,
    }
}

impl Harness {
    fn write_log(&self, content: &str) {
        std::fs::write(self.game_dir.join("tf").join("console.log"), content).expect("write log");
    }

    fn roles(&self, game: bool, platform: bool, display: bool) -> ProcessRoleSet {
        ProcessRoleSet {
            game: game.then(|| record(ProcessRole::GameClient, &self.game_dir, 1_700_000_000)),
            platform: platform
                .then(|| record(ProcessRole::PlatformClient, &self.steam_dir, 1_600_000_000)),
            display: display.then(|| record(ProcessRole::DisplayClient, Path::new(""), 1)),
        }
    }

    fn queue(&self, roles: ProcessRoleSet) {
        self.script.borrow_mut().push(roles);
    }
}

#[test]
fn updates_without_platform_client() {
    let mut h = harness(Settings::default(), false);
    h.write_log("Map: cp_badlands\nSniper selected\n");
    h.queue(h.roles(true, false, true));

    let outcome = h.driver.run_cycle().expect("cycle");
    let CycleOutcome::Updated {
        payload,
        connected_now,
        anomaly,
        ..
    } = outcome
    else {
        panic!("expected update");
    };

    assert!(connected_now);
    assert!(anomaly.is_none());
    assert_eq!(payload.title, "Map: cp_badlands");
    assert_eq!(payload.subtitle, "Class: Sniper");
    assert_eq!(payload.session_start_timestamp, 1_700_000_000);

    let recorder = h.recorder.borrow();
    assert_eq!(recorder.connects, 1);
    // Initial menu payload plus the real one.
    assert_eq!(recorder.sent.len(), 2);
    assert_eq!(recorder.sent[0].title, "In menus");
    assert_eq!(recorder.sent[0].session_start_timestamp, 1_700_000_000);
}

#[test]
fn repeated_cycles_reuse_connection_and_resend() {
    let mut h = harness(Settings::default(), false);
    h.write_log("Map: pl_upward\n");
    h.queue(h.roles(true, true, true));

    for _ in 0..3 {
        h.driver.run_cycle().expect("cycle");
    }

    let recorder = h.recorder.borrow();
    assert_eq!(recorder.connects, 1);
    assert_eq!(recorder.sent.len(), 4);
    assert!(recorder.sent[1..].iter().all(|p| p == &recorder.sent[1]));
    assert_eq!(h.driver.iteration(), 3);
}

#[test]
fn game_exit_after_connect_terminates() {
    let mut h = harness(Settings::default(), false);
    h.write_log("Map: koth_harvest_final\n");
    h.queue(h.roles(true, true, true));
    h.queue(h.roles(false, true, true));

    h.driver.run_cycle().expect("first cycle");
    let outcome = h.driver.run_cycle().expect("second cycle");

    assert_eq!(outcome, CycleOutcome::Terminate(TerminateReason::GameClosed));
    assert_eq!(h.driver.session().state(), SessionState::Disconnected);
    assert_eq!(h.recorder.borrow().disconnects, 1);
}

#[test]
fn game_absent_before_connect_just_waits() {
    let mut h = harness(Settings::default(), false);
    h.queue(h.roles(false, true, true));

    assert_eq!(h.driver.run_cycle().expect("cycle"), CycleOutcome::GameNotRunning);
    assert_eq!(h.recorder.borrow().connects, 0);
}

#[test]
fn missing_display_client_skips_presence() {
    let mut h = harness(Settings::default(), false);
    h.write_log("Map: ctf_2fort\n");
    h.queue(h.roles(true, true, false));

    assert_eq!(
        h.driver.run_cycle().expect("cycle"),
        CycleOutcome::DisplayClientMissing
    );
    assert_eq!(h.recorder.borrow().connects, 0);
}

#[test]
fn missing_console_log_requests_remediation() {
    let mut h = harness(Settings::default(), false);
    h.queue(h.roles(true, true, true));

    let outcome = h.driver.run_cycle().expect("cycle");
    let expected = h.game_dir.join("tf").join("console.log");
    assert_eq!(
        outcome,
        CycleOutcome::Terminate(TerminateReason::MissingConsoleLog(expected))
    );
    assert_eq!(h.recorder.borrow().connects, 0);
}

#[test]
fn unreachable_endpoint_terminates() {
    let mut h = harness(Settings::default(), true);
    h.write_log("Map: ctf_2fort\n");
    h.queue(h.roles(true, false, true));

    let outcome = h.driver.run_cycle().expect("cycle");
    assert!(matches!(
        outcome,
        CycleOutcome::Terminate(TerminateReason::EndpointUnreachable(_))
    ));
}

#[test]
fn steam_usernames_recognize_user_disconnect() {
    let mut h = harness(Settings::default(), false);
    std::fs::write(
        h.steam_dir.join("config").join("loginusers.vdf"),
        "\"users\"\n{\n\t\"1\"\n\t{\n\t\t\"AccountName\"\t\t\"pyro_acct\"\n\t\t\"PersonaName\"\t\t\"Mmmph\"\n\t}\n}\n",
    )
    .expect("vdf");
    h.write_log("Map: cp_gorge\nConnected to 10.0.0.5:27015\nMmmph: Disconnect by user.\n");
    h.queue(h.roles(true, true, true));

    let CycleOutcome::Updated { payload, .. } = h.driver.run_cycle().expect("cycle") else {
        panic!("expected update");
    };
    assert_eq!(payload.title, "In menus");
    assert_eq!(payload.large_icon_key, "main_menu");
}

#[test]
fn extra_usernames_apply_without_steam() {
    let settings = Settings {
        extra_usernames: vec!["Mmmph".to_string()],
        ..Settings::default()
    };
    let mut h = harness(settings, false);
    h.write_log("Map: cp_gorge\nMmmph: Disconnect by user.\n");
    h.queue(h.roles(true, false, true));

    let CycleOutcome::Updated { payload, .. } = h.driver.run_cycle().expect("cycle") else {
        panic!("expected update");
    };
    assert_eq!(payload.title, "In menus");
}

#[test]
fn over_limit_log_reports_retained_lines() {
    let settings = Settings {
        console_scan_lines: 20,
        ..Settings::default()
    };
    let mut h = harness(settings, false);
    let mut log = String::from("Map: cp_old\n");
    for i in 0..100 {
        log.push_str(&format!("chatter {}\n", i));
    }
    h.write_log(&log);
    h.queue(h.roles(true, false, true));

    let CycleOutcome::Updated {
        payload,
        lines_retained,
        ..
    } = h.driver.run_cycle().expect("cycle")
    else {
        panic!("expected update");
    };
    assert_eq!(lines_retained, 20);
    // The old map fell out of the tail.
    assert_eq!(payload.title, "In menus");
}
