//! Compiled regex patterns for parsing Steam's VDF files.
//!
//! These patterns are compiled once on first use. Update these when Steam
//! changes the layout of `loginusers.vdf`.

use once_cell::sync::Lazy;
use regex::Regex;

// ═══════════════════════════════════════════════════════════════════════════════
// loginusers.vdf
// ═══════════════════════════════════════════════════════════════════════════════

pub static RE_ACCOUNT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*"AccountName"\s+"([^"]*)""#).unwrap());
pub static RE_PERSONA_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*"PersonaName"\s+"([^"]*)""#).unwrap());
