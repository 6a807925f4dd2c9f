//! Issuer display names for the CA distribution.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::ISSUER_DISPLAY_LENGTH;

static ORGANIZATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"O=([^,]+)").unwrap_or_else(|e| panic!("organization pattern is valid: {e}"))
});
static COMMON_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"CN=([^,]+)").unwrap_or_else(|e| panic!("common name pattern is valid: {e}"))
});

/// Short, human-friendly issuer name.
///
/// Prefers the `O=` value, then `CN=`. Quotes and backslash escapes are
/// removed. Without either field the raw string is cut to
/// `ISSUER_DISPLAY_LENGTH` characters with a trailing `...`.
pub fn issuer_display_name(issuer: &str) -> String {
    let field = ORGANIZATION
        .captures(issuer)
        .or_else(|| COMMON_NAME.captures(issuer))
        .and_then(|c| c.get(1));

    if let Some(value) = field {
        return value
            .as_str()
            .trim()
            .trim_matches('"')
            .trim_matches('\'')
            .replace('\\', "")
            .trim()
            .to_string();
    }

    if issuer.chars().count() > ISSUER_DISPLAY_LENGTH {
        let truncated: String = issuer.chars().take(ISSUER_DISPLAY_LENGTH).collect();
        format!("{truncated}...")
    } else {
        issuer.to_string()
    }
}
