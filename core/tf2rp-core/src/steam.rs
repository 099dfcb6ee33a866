//! Known local usernames, read from the Steam client's login cache.
//!
//! The console log names the player in "Disconnect by user" lines; only those
//! naming someone logged in on this machine count as a return to the menus.

use crate::patterns::{RE_ACCOUNT_NAME, RE_PERSONA_NAME};
use std::path::{Path, PathBuf};

pub fn login_users_path(steam_install: &Path) -> PathBuf {
    steam_install.join("config").join("loginusers.vdf")
}

/// Reads account and persona names from `loginusers.vdf`.
///
/// Missing or unreadable files yield an empty list.
pub fn known_usernames(steam_install: &Path) -> Vec<String> {
    let path = login_users_path(steam_install);
    match fs_err::read(&path) {
        Ok(bytes) => parse_login_users(&String::from_utf8_lossy(&bytes)),
        Err(err) => {
            tracing::debug!(error = %err, "Steam login users unavailable");
            Vec::new()
        }
    }
}

pub fn parse_login_users(content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for re in [&*RE_ACCOUNT_NAME, &*RE_PERSONA_NAME] {
        for captures in re.captures_iter(content) {
            let name = captures[1].trim();
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_USERS: &str = r#""users"
{
	"76561198000000000"
	{
		"AccountName"		"scoutmain99"
		"PersonaName"		"Bonk Enjoyer"
		"RememberPassword"		"1"
	}
	"76561198000000001"
	{
		"AccountName"		"medic_friend"
		"PersonaName"		"medic_friend"
	}
}
"#;

    #[test]
    fn parses_account_and_persona_names_without_duplicates() {
        let names = parse_login_users(LOGIN_USERS);
        assert_eq!(
            names,
            vec![
                "scoutmain99".to_string(),
                "medic_friend".to_string(),
                "Bonk Enjoyer".to_string(),
            ]
        );
    }

    #[test]
    fn missing_file_yields_no_names() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        assert!(known_usernames(temp_dir.path()).is_empty());
    }

    #[test]
    fn reads_names_from_steam_install() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let config_dir = temp_dir.path().join("config");
        std::fs::create_dir_all(&config_dir).expect("config dir");
        std::fs::write(config_dir.join("loginusers.vdf"), LOGIN_USERS).expect("vdf");

        let names = known_usernames(temp_dir.path());
        assert!(names.contains(&"Bonk Enjoyer".to_string()));
    }
}
