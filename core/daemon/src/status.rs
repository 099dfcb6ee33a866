//! Human-readable status printed after every cycle.

use chrono::{DateTime, Local};
use tf2rp_core::PresencePayload;

pub fn render(payload: &PresencePayload, now: DateTime<Local>) -> String {
    let elapsed = now.timestamp() - payload.session_start_timestamp;
    format!(
        "{}\n{} ({})\n{}\n{} elapsed\n",
        now.format("%I:%M:%S %p"),
        payload.title,
        payload.large_icon_label,
        payload.subtitle,
        format_elapsed(elapsed)
    )
}

pub fn format_elapsed(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn elapsed_is_hours_minutes_seconds() {
        assert_eq!(format_elapsed(0), "0:00:00");
        assert_eq!(format_elapsed(3_725), "1:02:05");
        assert_eq!(format_elapsed(-5), "0:00:00");
    }

    #[test]
    fn render_includes_every_line() {
        let now = Local.with_ymd_and_hms(2026, 3, 1, 14, 30, 0).unwrap();
        let payload = PresencePayload {
            title: "Map: cp_badlands".to_string(),
            subtitle: "Class: Medic".to_string(),
            large_icon_key: "control-point".to_string(),
            large_icon_label: "Control Point".to_string(),
            small_icon_key: "medic".to_string(),
            small_icon_label: "Medic".to_string(),
            session_start_timestamp: now.timestamp() - 90,
        };

        let text = render(&payload, now);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "02:30:00 PM",
                "Map: cp_badlands (Control Point)",
                "Class: Medic",
                "0:01:30 elapsed"
            ]
        );
    }
}
