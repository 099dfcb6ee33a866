//! How long the local user has been away from keyboard and mouse.
//!
//! Each platform has its own source; when none works the probe reports
//! `None` and the scheduler falls back to its fixed interval.

pub trait IdleProbe {
    /// Seconds since the last user input, if this platform can tell.
    fn idle_seconds(&mut self) -> Option<f64>;
}

#[derive(Debug, Clone, Default)]
pub struct SystemIdleProbe;

impl IdleProbe for SystemIdleProbe {
    fn idle_seconds(&mut self) -> Option<f64> {
        get_idle_time()
    }
}

/// Platform idle time in seconds.
pub fn get_idle_time() -> Option<f64> {
    #[cfg(target_os = "windows")]
    {
        windows::idle_seconds()
    }

    #[cfg(target_os = "macos")]
    {
        macos::idle_seconds()
    }

    #[cfg(target_os = "linux")]
    {
        linux::idle_seconds()
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

#[cfg(target_os = "windows")]
mod windows {
    use windows_sys::Win32::System::SystemInformation::GetTickCount;
    use windows_sys::Win32::UI::Input::KeyboardAndMouse::{GetLastInputInfo, LASTINPUTINFO};

    pub fn idle_seconds() -> Option<f64> {
        // SAFETY: LASTINPUTINFO is plain data and cbSize is set before the call.
        unsafe {
            let mut last_input: LASTINPUTINFO = std::mem::zeroed();
            last_input.cbSize = std::mem::size_of::<LASTINPUTINFO>() as u32;

            if GetLastInputInfo(&mut last_input) == 0 {
                return None;
            }
            // Both are 32-bit tick counts; wrapping_sub survives the 49.7 day rollover.
            let idle_ms = GetTickCount().wrapping_sub(last_input.dwTime);
            Some(f64::from(idle_ms) / 1000.0)
        }
    }
}

#[cfg(target_os = "macos")]
mod macos {
    use std::process::Command;

    pub fn idle_seconds() -> Option<f64> {
        let output = Command::new("ioreg")
            .args(["-c", "IOHIDSystem", "-d", "4"])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        super::parse_hid_idle_time(&stdout)
    }
}

#[cfg(target_os = "linux")]
mod linux {
    use std::process::Command;

    /// Needs `xprintidle`, which only works under X11 or XWayland.
    pub fn idle_seconds() -> Option<f64> {
        let output = match Command::new("xprintidle").output() {
            Ok(output) if output.status.success() => output,
            Ok(_) => return None,
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    tracing::debug!("xprintidle not installed, idle scaling unavailable");
                }
                return None;
            }
        };

        let ms: u64 = String::from_utf8_lossy(&output.stdout).trim().parse().ok()?;
        Some(ms as f64 / 1000.0)
    }
}

/// Parses `"HIDIdleTime" = <nanoseconds>` out of `ioreg` output.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn parse_hid_idle_time(ioreg_output: &str) -> Option<f64> {
    ioreg_output
        .lines()
        .filter(|line| line.contains("HIDIdleTime"))
        .filter_map(|line| line.split('=').nth(1))
        .find_map(|value| value.trim().parse::<u64>().ok())
        .map(|nanos| nanos as f64 / 1_000_000_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ioreg_idle_time() {
        let output = r#"
    | |   "HIDIdleTime" = 2500000000
    | |   "HIDParameters" = {"HIDClickTime"=500000000}
"#;
        assert_eq!(parse_hid_idle_time(output), Some(2.5));
        assert_eq!(parse_hid_idle_time("nothing here"), None);
    }

    #[test]
    fn system_probe_never_panics() {
        let mut probe = SystemIdleProbe;
        if let Some(idle) = probe.idle_seconds() {
            assert!(idle >= 0.0);
        }
    }
}
