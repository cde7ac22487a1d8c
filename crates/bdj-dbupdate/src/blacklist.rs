//! Filenames that would break the filesystem/path handling downstream are
//! rejected before ever being sent to the tag reader.

use regex::Regex;
use std::sync::OnceLock;

#[cfg(windows)]
const PATTERN: &str = r#"["]"#;
#[cfg(not(windows))]
const PATTERN: &str = r#"["\\:]"#;

fn pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PATTERN).expect("blacklist pattern is a fixed, valid regex"))
}

/// True if `name` contains a character this platform's filesystem or the
/// wire protocol's own field separators can't carry safely.
pub fn is_blacklisted(name: &str) -> bool {
    pattern().is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_passes() {
        assert!(!is_blacklisted("Artist - Song.mp3"));
    }

    #[test]
    fn quote_is_blacklisted() {
        assert!(is_blacklisted("Song \"Live\".mp3"));
    }

    #[cfg(not(windows))]
    #[test]
    fn colon_and_backslash_are_blacklisted() {
        assert!(is_blacklisted("a:b.mp3"));
        assert!(is_blacklisted("a\\b.mp3"));
    }
}
