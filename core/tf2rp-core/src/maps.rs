//! Map to gamemode lookup.
//!
//! Official maps come from a static table. Anything else is a custom or
//! community map, classified by its prefix.

/// Large icon used when nothing is known about a map.
pub const UNKNOWN_MAP_ICON: &str = "unknown_map";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gamemode {
    pub icon_key: &'static str,
    pub label: &'static str,
}

/// Official maps: (map, gamemode icon key, gamemode label).
const OFFICIAL_MAPS: &[(&str, &str, &str)] = &[
    ("cp_5gorge", "control-point", "Control Point"),
    ("cp_badlands", "control-point", "Control Point"),
    ("cp_coldfront", "control-point", "Control Point"),
    ("cp_dustbowl", "attack-defend", "Attack/Defend"),
    ("cp_egypt_final", "attack-defend", "Attack/Defend"),
    ("cp_fastlane", "control-point", "Control Point"),
    ("cp_foundry", "control-point", "Control Point"),
    ("cp_freight_final1", "control-point", "Control Point"),
    ("cp_gorge", "attack-defend", "Attack/Defend"),
    ("cp_gorge_event", "attack-defend", "Attack/Defend"),
    ("cp_granary", "control-point", "Control Point"),
    ("cp_gravelpit", "attack-defend", "Attack/Defend"),
    ("cp_gullywash_final1", "control-point", "Control Point"),
    ("cp_junction_final", "attack-defend", "Attack/Defend"),
    ("cp_manor_event", "attack-defend", "Attack/Defend"),
    ("cp_mercenarypark", "attack-defend", "Attack/Defend"),
    ("cp_metalworks", "control-point", "Control Point"),
    ("cp_mossrock", "attack-defend", "Attack/Defend"),
    ("cp_mountainlab", "attack-defend", "Attack/Defend"),
    ("cp_powerhouse", "control-point", "Control Point"),
    ("cp_process_final", "control-point", "Control Point"),
    ("cp_snakewater_final1", "control-point", "Control Point"),
    ("cp_snowplow", "attack-defend", "Attack/Defend"),
    ("cp_steel", "attack-defend", "Attack/Defend"),
    ("cp_sunshine", "control-point", "Control Point"),
    ("cp_sunshine_event", "control-point", "Control Point"),
    ("cp_vanguard", "control-point", "Control Point"),
    ("cp_well", "control-point", "Control Point"),
    ("cp_yukon_final", "control-point", "Control Point"),
    ("ctf_2fort", "ctf", "Capture the Flag"),
    ("ctf_2fort_invasion", "ctf", "Capture the Flag"),
    ("ctf_doublecross", "ctf", "Capture the Flag"),
    ("ctf_foundry", "mannpower", "Mannpower"),
    ("ctf_gorge", "mannpower", "Mannpower"),
    ("ctf_hellfire", "mannpower", "Mannpower"),
    ("ctf_landfall", "ctf", "Capture the Flag"),
    ("ctf_sawmill", "ctf", "Capture the Flag"),
    ("ctf_thundermountain", "mannpower", "Mannpower"),
    ("ctf_turbine", "ctf", "Capture the Flag"),
    ("ctf_well", "ctf", "Capture the Flag"),
    ("koth_badlands", "koth", "King of the Hill"),
    ("koth_brazil", "koth", "King of the Hill"),
    ("koth_harvest_event", "koth", "King of the Hill"),
    ("koth_harvest_final", "koth", "King of the Hill"),
    ("koth_highpass", "koth", "King of the Hill"),
    ("koth_king", "koth", "King of the Hill"),
    ("koth_lakeside_event", "koth", "King of the Hill"),
    ("koth_lakeside_final", "koth", "King of the Hill"),
    ("koth_lazarus", "koth", "King of the Hill"),
    ("koth_maple_ridge_event", "koth", "King of the Hill"),
    ("koth_moonshine_event", "koth", "King of the Hill"),
    ("koth_nucleus", "koth", "King of the Hill"),
    ("koth_probed", "koth", "King of the Hill"),
    ("koth_sawmill", "koth", "King of the Hill"),
    ("koth_suijin", "koth", "King of the Hill"),
    ("koth_viaduct", "koth", "King of the Hill"),
    ("koth_viaduct_event", "koth", "King of the Hill"),
    ("mvm_bigrock", "mvm", "Mann vs. Machine"),
    ("mvm_coaltown", "mvm", "Mann vs. Machine"),
    ("mvm_decoy", "mvm", "Mann vs. Machine"),
    ("mvm_example", "mvm", "Mann vs. Machine"),
    ("mvm_ghost_town", "mvm", "Mann vs. Machine"),
    ("mvm_mannhattan", "mvm", "Mann vs. Machine"),
    ("mvm_mannworks", "mvm", "Mann vs. Machine"),
    ("mvm_rottenburg", "mvm", "Mann vs. Machine"),
    ("pass_brickyard", "passtime", "PASS Time"),
    ("pass_district", "passtime", "PASS Time"),
    ("pass_timbertown", "passtime", "PASS Time"),
    ("pd_pit_of_death_event", "player-destruction", "Player Destruction"),
    ("pd_watergate", "player-destruction", "Player Destruction"),
    ("pl_badwater", "payload", "Payload"),
    ("pl_barnblitz", "payload", "Payload"),
    ("pl_borneo", "payload", "Payload"),
    ("pl_cactuscanyon ", "payload", "Payload"),
    ("pl_enclosure_final", "payload", "Payload"),
    ("pl_fifthcurve_event", "payload", "Payload"),
    ("pl_frontier_final", "payload", "Payload"),
    ("pl_goldrush", "payload", "Payload"),
    ("pl_hoodoo_final", "payload", "Payload"),
    ("pl_millstone_event", "payload", "Payload"),
    ("pl_snowycoast", "payload", "Payload"),
    ("pl_swiftwater_final1", "payload", "Payload"),
    ("pl_thundermountain", "payload", "Payload"),
    ("pl_upward", "payload", "Payload"),
    ("plr_bananabay", "payload-race", "Payload Race"),
    ("plr_hightower", "payload-race", "Payload Race"),
    ("plr_hightower_event", "payload-race", "Payload Race"),
    ("plr_nightfall_final", "payload-race", "Payload Race"),
    ("plr_pipeline", "payload-race", "Payload Race"),
    ("rd_asteroid", "beta-map", "Robot Destruction"),
    ("sd_doomsday", "special-delivery", "Special Delivery"),
    ("sd_doomsday_event", "special-delivery", "Special Delivery"),
    ("tc_hydro", "territorial-control", "Territorial Control"),
];

/// Prefixes community maps use, longest first so `plr_` wins over `pl_`.
const CUSTOM_PREFIXES: &[(&str, &str, &str)] = &[
    ("arena_", "arena", "Arena"),
    ("koth_", "koth", "King of the Hill"),
    ("pass_", "passtime", "PASS Time"),
    ("ctf_", "ctf", "Capture the Flag"),
    ("mvm_", "mvm", "Mann vs. Machine"),
    ("plr_", "payload-race", "Payload Race"),
    ("cp_", "control-point", "Control Point"),
    ("pl_", "payload", "Payload"),
    ("sd_", "special-delivery", "Special Delivery"),
    ("pd_", "player-destruction", "Player Destruction"),
    ("tc_", "territorial-control", "Territorial Control"),
    ("rd_", "beta-map", "Robot Destruction"),
    ("tr_", "training", "Training"),
];

pub fn lookup_official(map: &str) -> Option<Gamemode> {
    OFFICIAL_MAPS
        .iter()
        .find(|(name, _, _)| *name == map)
        .map(|&(_, icon_key, label)| Gamemode { icon_key, label })
}

/// Guesses the gamemode of a community map from its prefix.
pub fn classify_custom(map: &str) -> Option<Gamemode> {
    let lower = map.to_ascii_lowercase();
    CUSTOM_PREFIXES
        .iter()
        .find(|(prefix, _, _)| lower.starts_with(prefix))
        .map(|&(_, icon_key, label)| Gamemode { icon_key, label })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn official_map_lookup() {
        let gamemode = lookup_official("ctf_2fort").expect("2fort");
        assert_eq!(gamemode.icon_key, "ctf");
        assert_eq!(gamemode.label, "Capture the Flag");
        assert!(lookup_official("ctf_2fort_remix_b4").is_none());
    }

    #[test]
    fn custom_map_prefixes() {
        assert_eq!(
            classify_custom("plr_hacksaw_b2").map(|g| g.icon_key),
            Some("payload-race")
        );
        assert_eq!(classify_custom("PL_Cashworks").map(|g| g.icon_key), Some("payload"));
        assert!(classify_custom("jump_beef").is_none());
    }
}
