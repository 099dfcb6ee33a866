//! Translation from an activity snapshot to a presence payload.

use crate::config::Settings;
use crate::maps::{self, UNKNOWN_MAP_ICON};
use crate::types::{ActivitySnapshot, PresencePayload, QueueState, IN_MENUS, NOT_QUEUED};

const SMALL_ICON_KEY: &str = "tf2_icon_small";
const SMALL_ICON_LABEL: &str = "Team Fortress 2";
const MENU_ICON_KEY: &str = "main_menu";
const MENU_ICON_LABEL: &str = "Main menu";

/// Payload for the main menu, sent right after connecting.
pub fn menu_payload(session_start_timestamp: i64) -> PresencePayload {
    PresencePayload {
        title: IN_MENUS.to_string(),
        subtitle: NOT_QUEUED.to_string(),
        large_icon_key: MENU_ICON_KEY.to_string(),
        large_icon_label: MENU_ICON_LABEL.to_string(),
        small_icon_key: SMALL_ICON_KEY.to_string(),
        small_icon_label: SMALL_ICON_LABEL.to_string(),
        session_start_timestamp,
    }
}

/// Builds the payload for `snapshot`.
///
/// An empty map means the game hasn't loaded one since the log began, which
/// is shown as the main menu.
pub fn build_payload(
    snapshot: &ActivitySnapshot,
    session_start_timestamp: i64,
    settings: &Settings,
) -> PresencePayload {
    if snapshot.in_menus() || snapshot.map.is_empty() {
        let (large_icon_key, large_icon_label) = match snapshot.queue_state {
            QueueState::QueuedCasual => ("casual", snapshot.queue_state.label()),
            QueueState::QueuedCompetitive => ("comp", snapshot.queue_state.label()),
            QueueState::QueuedMvM => ("mvm_queued", snapshot.queue_state.label()),
            _ => (MENU_ICON_KEY, MENU_ICON_LABEL),
        };
        return PresencePayload {
            title: IN_MENUS.to_string(),
            subtitle: snapshot.queue_state.label().to_string(),
            large_icon_key: large_icon_key.to_string(),
            large_icon_label: large_icon_label.to_string(),
            ..menu_payload(session_start_timestamp)
        };
    }

    let (large_icon_key, large_icon_label) = match maps::lookup_official(&snapshot.map) {
        Some(gamemode) => (gamemode.icon_key.to_string(), gamemode.label.to_string()),
        None => match maps::classify_custom(&snapshot.map) {
            Some(gamemode) => (
                gamemode.icon_key.to_string(),
                format!("{} [custom/community map]", gamemode.label),
            ),
            None => (
                UNKNOWN_MAP_ICON.to_string(),
                "Unknown gamemode [custom/community map]".to_string(),
            ),
        },
    };

    let provider = if settings.hide_provider {
        None
    } else {
        settings.provider_for(&snapshot.server_address)
    };
    let title = match provider {
        Some(provider) => format!("Map: {} ({} server)", snapshot.map, provider),
        None => format!("Map: {}", snapshot.map),
    };

    PresencePayload {
        title,
        subtitle: format!("Class: {}", snapshot.activity),
        large_icon_key,
        large_icon_label,
        small_icon_key: SMALL_ICON_KEY.to_string(),
        small_icon_label: SMALL_ICON_LABEL.to_string(),
        session_start_timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UNSELECTED;

    fn snapshot(map: &str, activity: &str) -> ActivitySnapshot {
        ActivitySnapshot {
            map: map.to_string(),
            activity: activity.to_string(),
            ..ActivitySnapshot::default()
        }
    }

    #[test]
    fn official_map_payload() {
        let payload = build_payload(&snapshot("koth_viaduct", "Heavy"), 100, &Settings::default());
        assert_eq!(payload.title, "Map: koth_viaduct");
        assert_eq!(payload.subtitle, "Class: Heavy");
        assert_eq!(payload.large_icon_key, "koth");
        assert_eq!(payload.large_icon_label, "King of the Hill");
        assert_eq!(payload.small_icon_key, SMALL_ICON_KEY);
        assert_eq!(payload.session_start_timestamp, 100);
    }

    #[test]
    fn custom_map_payload() {
        let payload = build_payload(&snapshot("jump_beef", UNSELECTED), 1, &Settings::default());
        assert_eq!(payload.large_icon_key, UNKNOWN_MAP_ICON);
        assert!(payload.large_icon_label.ends_with("[custom/community map]"));

        let payload = build_payload(&snapshot("koth_lakeside_b3", "Spy"), 1, &Settings::default());
        assert_eq!(payload.large_icon_key, "koth");
        assert_eq!(payload.large_icon_label, "King of the Hill [custom/community map]");
    }

    #[test]
    fn queued_menu_payload_uses_queue_icon() {
        let snapshot = ActivitySnapshot {
            queue_state: QueueState::QueuedCompetitive,
            ..snapshot(IN_MENUS, "Queued for Competitive")
        };
        let payload = build_payload(&snapshot, 5, &Settings::default());
        assert_eq!(payload.title, IN_MENUS);
        assert_eq!(payload.subtitle, "Queued for Competitive");
        assert_eq!(payload.large_icon_key, "comp");
    }

    #[test]
    fn empty_map_is_shown_as_menu() {
        let payload = build_payload(&ActivitySnapshot::default(), 5, &Settings::default());
        assert_eq!(payload, menu_payload(5));
    }

    #[test]
    fn provider_label_respects_hide_setting() {
        let mut settings = Settings::default();
        settings
            .providers
            .insert("Uncletopia".to_string(), vec!["5.6.7.8:27015".to_string()]);
        let snapshot = ActivitySnapshot {
            server_address: "5.6.7.8:27015".to_string(),
            ..snapshot("cp_process_final", "Scout")
        };

        let payload = build_payload(&snapshot, 0, &settings);
        assert_eq!(payload.title, "Map: cp_process_final (Uncletopia server)");

        settings.hide_provider = true;
        let payload = build_payload(&snapshot, 0, &settings);
        assert_eq!(payload.title, "Map: cp_process_final");
    }
}
