pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

/// Best-effort console diagnostics for failures that are deliberately not
/// surfaced to the user (click tracking, insight fetch, list loads).
pub(crate) fn log_warn(msg: &str) {
    web_sys::console::warn_1(&msg.into());
}

/// Lowercase, trim, and strip everything outside `[a-z0-9-]`.
///
/// The backend enforces slug uniqueness; this only makes lookups and writes
/// case-insensitive and URL-safe on the client side.
pub(crate) fn normalize_slug(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

/// `2026-08-02T09:30:00Z` -> `2026-08-02`. Falls back to the input when the
/// timestamp is shorter than a date or cannot be split at the date boundary.
pub(crate) fn display_date(iso: &str) -> String {
    let t = iso.trim();
    t.get(..10).unwrap_or(t).to_string()
}

/// File extension for storage object paths. Defaults to `bin` when the
/// filename has no usable extension.
pub(crate) fn file_ext(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_slug_lowercases_and_trims() {
        assert_eq!(normalize_slug("  Acme  "), "acme");
    }

    #[test]
    fn normalize_slug_strips_unsafe_characters() {
        assert_eq!(normalize_slug("My Team!"), "myteam");
        assert_eq!(normalize_slug("my-team_2"), "my-team2");
    }

    #[test]
    fn display_date_truncates_iso_timestamp() {
        assert_eq!(display_date("2026-08-02T09:30:00Z"), "2026-08-02");
        assert_eq!(display_date(""), "");
        assert_eq!(display_date("2026"), "2026");
    }

    #[test]
    fn display_date_tolerates_multibyte_input() {
        // A malformed timestamp must never panic the render path, even when
        // the date boundary lands inside a multi-byte character.
        assert_eq!(display_date("2026-08-0é:00"), "2026-08-0é:00");
    }

    #[test]
    fn file_ext_handles_common_cases() {
        assert_eq!(file_ext("avatar.PNG"), "png");
        assert_eq!(file_ext("archive.tar.gz"), "gz");
        assert_eq!(file_ext("no-extension"), "bin");
        assert_eq!(file_ext("trailing-dot."), "bin");
    }
}
