//! # tf2rp-core
//!
//! Infers what a Team Fortress 2 player is doing from the outside (the
//! process table and TF2's `console.log`) and keeps a Discord Rich Presence
//! session in sync with it.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. Transports that need one
//!   hide it behind [`session::PresenceConnector`].
//! - **Recomputed every cycle**: Only the presence session outlives a cycle.
//! - **Collaborators behind traits**: process table, idle time and presence
//!   transport can all be faked in tests.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tf2rp_core::{CycleDriver, Settings, SystemProcessScanner};
//!
//! let mut driver = CycleDriver::new(SystemProcessScanner, connector, Settings::default());
//! let outcome = driver.run_cycle()?;
//! ```

pub mod config;
pub mod console_log;
pub mod driver;
pub mod error;
pub mod idle;
pub mod maps;
pub mod patterns;
pub mod payload;
pub mod process;
pub mod schedule;
pub mod session;
pub mod steam;
pub mod types;

pub use config::{load_settings, ReportLevel, Settings};
pub use console_log::{console_log_path, interpret, ConsoleLogReport};
pub use driver::{CycleDriver, CycleOutcome, TerminateReason};
pub use error::{PresenceError, Result};
pub use idle::{IdleProbe, SystemIdleProbe};
pub use payload::{build_payload, menu_payload};
pub use process::{ProcessSource, SystemProcessScanner};
pub use schedule::{next_delay, PollScheduler};
pub use session::{
    ConnectError, ConnectOutcome, PresenceConnection, PresenceConnector, PresenceSession,
    PushOutcome, SessionState,
};
pub use types::*;
