//! TF2 Rich Presence entrypoint.
//!
//! Runs the observe → interpret → present cycle until the game closes or
//! Discord can't be reached, then exits so a supervisor can restart it.

use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use tracing::{error, info, warn};

use tf2rp_core::config::get_data_dir;
use tf2rp_core::{
    load_settings, CycleDriver, CycleOutcome, PollScheduler, Settings, SystemIdleProbe,
    SystemProcessScanner, TerminateReason,
};

mod backoff;
mod crash;
mod discord;
mod logging;
mod remediation;
mod status;

use crash::{Reporter, Severity};
use discord::DiscordConnector;

const CRASH_PAUSE: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(name = "tf2-rich-presence", version, about = "Discord Rich Presence for Team Fortress 2")]
struct Cli {
    /// Settings file (defaults to the per-user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run a single cycle, print the resulting payload and exit
    #[arg(long)]
    once: bool,
}

fn main() {
    let cli = Cli::parse();

    let data_dir = match get_data_dir() {
        Some(dir) => dir,
        None => {
            eprintln!("Failed to resolve the local data directory");
            std::process::exit(1);
        }
    };

    let (settings, settings_error) = match load_settings(cli.config.as_deref()) {
        Ok(settings) => (settings, None),
        Err(err) => (Settings::default(), Some(err)),
    };

    let log_dir = data_dir.join("logs");
    let _log_guard = logging::init(&log_dir, &settings.log_level, settings.max_program_logs);

    if let Some(err) = settings_error {
        warn!(error = %err, "Failed to load settings; using defaults");
    }

    let reporter = Reporter::new(settings.report_level, data_dir.join("reports"), log_dir);
    install_panic_hook(reporter.clone());

    if !cli.once {
        backoff::apply_restart_backoff(&data_dir.join("restarts.json"));
    }

    let connector = match DiscordConnector::new(settings.discord_app_id) {
        Ok(connector) => connector,
        Err(err) => {
            error!(error = %err, "Failed to initialize Discord transport");
            std::process::exit(1);
        }
    };

    info!(
        wait_time = settings.wait_time,
        scale_wait_time = settings.scale_wait_time,
        console_scan_lines = settings.console_scan_lines,
        "Settings loaded"
    );

    let mut scheduler =
        PollScheduler::new(SystemIdleProbe, settings.wait_time, settings.scale_wait_time);
    let mut driver = CycleDriver::new(SystemProcessScanner, connector, settings);

    loop {
        let outcome = match driver.run_cycle() {
            Ok(outcome) => outcome,
            Err(err) => {
                let reason = err.to_string();
                error!(critical = true, error = %reason, "Cycle failed");
                reporter.report(
                    Severity::Critical,
                    &reason,
                    driver.iteration(),
                    driver.console_log(),
                );
                crash_exit(&mut driver);
            }
        };

        match outcome {
            CycleOutcome::Updated {
                payload,
                connected_now,
                anomaly,
                lines_retained,
            } => {
                if connected_now {
                    println!("Connected to Discord");
                }
                if let Some(reason) = anomaly {
                    reporter.report(
                        Severity::Critical,
                        &reason,
                        driver.iteration(),
                        driver.console_log(),
                    );
                }
                tracing::debug!(lines_retained, "Presence updated");
                if cli.once {
                    match serde_json::to_string_pretty(&payload) {
                        Ok(json) => println!("{}", json),
                        Err(err) => warn!(error = %err, "Failed to serialize payload"),
                    }
                } else {
                    println!("{}", status::render(&payload, Local::now()));
                }
            }
            CycleOutcome::DisplayClientMissing => {
                println!("{}\nDiscord isn't running\n", Local::now().format("%I:%M:%S %p"));
            }
            CycleOutcome::GameNotRunning => {
                println!("{}\nTF2 isn't running\n", Local::now().format("%I:%M:%S %p"));
            }
            CycleOutcome::Terminate(reason) => {
                terminate(&mut driver, reason, &reporter);
                return;
            }
        }

        if cli.once {
            driver.shutdown();
            return;
        }

        let delay = scheduler.delay();
        tracing::debug!(delay_ms = delay.as_millis() as u64, "Sleeping until next cycle");
        thread::sleep(delay);
    }
}

fn terminate<S, C>(driver: &mut CycleDriver<S, C>, reason: TerminateReason, reporter: &Reporter)
where
    S: tf2rp_core::ProcessSource,
    C: tf2rp_core::PresenceConnector,
{
    driver.shutdown();
    match reason {
        TerminateReason::GameClosed => {
            info!("TF2 closed, exiting for restart");
        }
        TerminateReason::MissingConsoleLog(path) => {
            error!(path = %path.display(), "TF2 is running without -condebug");
            reporter.report(
                Severity::Error,
                "console.log doesn't exist",
                driver.iteration(),
                None,
            );
            let stdin = io::stdin();
            if let Err(err) = remediation::prompt_condebug(&mut stdin.lock(), &mut io::stdout()) {
                warn!(error = %err, "Failed to show -condebug instructions");
            }
        }
        TerminateReason::EndpointUnreachable(reason) => {
            error!(reason = %reason, "Discord is running but unreachable");
            reporter.report(Severity::Error, &reason, driver.iteration(), None);
            println!("Can't connect to Discord for Rich Presence.");
        }
    }
}

fn crash_exit<S, C>(driver: &mut CycleDriver<S, C>) -> !
where
    S: tf2rp_core::ProcessSource,
    C: tf2rp_core::PresenceConnector,
{
    driver.shutdown();
    print_crash_message();
    thread::sleep(CRASH_PAUSE);
    std::process::exit(1);
}

fn print_crash_message() {
    let logs = get_data_dir()
        .map(|dir| dir.join("logs").display().to_string())
        .unwrap_or_else(|| "the local data directory".to_string());
    println!(
        "\nTF2 Rich Presence has crashed. A report was saved locally if reporting is enabled.\n\
         Logs are kept in {}",
        logs
    );
}

fn install_panic_hook(reporter: Reporter) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let reason = panic_info.to_string();
        error!(critical = true, panic = %reason, "Panicked");
        reporter.report(Severity::Critical, &reason, 0, None);
        default_hook(panic_info);
        print_crash_message();
        thread::sleep(CRASH_PAUSE);
    }));
}
