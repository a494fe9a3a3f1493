//! App id extraction from hosted filenames.
//!
//! Files are conventionally named `<appid> <title>.<ext>`, so a leading digit
//! run is the preferred identifier. Any other digit run is used only when the
//! name does not start with one. A name leading with some other number (a
//! release year, a version) is therefore misread: `"2013 Factorio 427520.zip"`
//! yields `"2013"`. Kept as-is; callers that know better should attach the id
//! through a mapping record instead.
//!
//! Runs longer than ten digits are skipped whole rather than cut down to their
//! first ten digits, so `"12345678901 Factorio.zip"` yields `None`, not
//! `"1234567890"`. Such runs are hashes or timestamps, never app ids.

const MIN_APP_ID_DIGITS: usize = 2;
const MAX_APP_ID_DIGITS: usize = 10;

/// Strip the last `.ext` suffix, if there is a non-empty one.
fn strip_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) if idx + 1 < filename.len() => &filename[..idx],
        _ => filename,
    }
}

/// Maximal runs of ASCII digits whose length is a plausible app id.
fn digit_runs(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let bytes = text.as_bytes();
    let mut runs = Vec::new();
    let mut start = None;

    for (i, b) in bytes.iter().enumerate() {
        match (b.is_ascii_digit(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, bytes.len()));
    }

    runs.into_iter()
        .filter(|(s, e)| (MIN_APP_ID_DIGITS..=MAX_APP_ID_DIGITS).contains(&(e - s)))
        .map(move |(s, e)| (s, &text[s..e]))
}

/// Derive a numeric app id from a free-form filename.
///
/// Returns `None` for names without a 2–10 digit run. Longer runs (hashes,
/// timestamps) are never treated as identifiers.
pub fn extract_app_id(filename: &str) -> Option<String> {
    let base = strip_extension(filename).trim();
    if base.is_empty() {
        return None;
    }

    let runs: Vec<(usize, &str)> = digit_runs(base).collect();
    let leading = runs.iter().find(|(start, _)| *start == 0);

    leading
        .or_else(|| runs.first())
        .map(|(_, run)| run.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_app_id() {
        assert_eq!(extract_app_id("427520.zip").as_deref(), Some("427520"));
    }

    #[test]
    fn test_app_id_mid_name() {
        assert_eq!(
            extract_app_id("Factorio (427520) Linux.tar.gz").as_deref(),
            Some("427520")
        );
    }

    #[test]
    fn test_no_digits() {
        assert_eq!(extract_app_id("readme.txt"), None);
        assert_eq!(extract_app_id(""), None);
        assert_eq!(extract_app_id("   .zip"), None);
    }

    #[test]
    fn test_leading_run_wins() {
        assert_eq!(extract_app_id("2013 Factorio 427520.zip").as_deref(), Some("2013"));
        assert_eq!(extract_app_id("2013 - Factorio - 427520.zip").as_deref(), Some("2013"));
    }

    #[test]
    fn test_single_digits_ignored() {
        assert_eq!(extract_app_id("Portal 2.zip"), None);
        assert_eq!(extract_app_id("7 Days 251570.zip").as_deref(), Some("251570"));
    }

    #[test]
    fn test_long_runs_ignored() {
        assert_eq!(extract_app_id("backup 12345678901.zip"), None);
        assert_eq!(extract_app_id("12345678901 Valheim 892970.7z").as_deref(), Some("892970"));
        assert_eq!(extract_app_id("1234567890.zip").as_deref(), Some("1234567890"));
    }

    #[test]
    fn test_only_last_extension_stripped() {
        // "tar" stays, its digits do not matter
        assert_eq!(extract_app_id("220200.tar.gz").as_deref(), Some("220200"));
        // the extension itself is never searched
        assert_eq!(extract_app_id("game.v2024"), None);
        // trailing dot is not an extension
        assert_eq!(extract_app_id("413150.").as_deref(), Some("413150"));
    }

    #[test]
    fn test_whitespace_trimmed_before_leading_check() {
        assert_eq!(extract_app_id("  548430 Deep Rock.zip").as_deref(), Some("548430"));
    }
}
