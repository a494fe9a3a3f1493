//! Canonical text form shared by every scorer.
//!
//! `normalize` folds accents, lower-cases, collapses everything outside
//! `[a-z0-9]` into single spaces and rewrites the roman numerals `i`..`x`
//! to digits, so "Pokémon: Édition II" and "pokemon edition 2" compare equal.

use unicode_normalization::UnicodeNormalization;

// ═══════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════

const ROMAN_TO_ARABIC: &[(&str, &str)] = &[
    ("i", "1"), ("ii", "2"), ("iii", "3"), ("iv", "4"), ("v", "5"),
    ("vi", "6"), ("vii", "7"), ("viii", "8"), ("ix", "9"), ("x", "10"),
];

// ═══════════════════════════════════════════════════════════════════════════
// Normalization
// ═══════════════════════════════════════════════════════════════════════════

#[inline]
fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

#[inline]
fn roman_to_arabic(token: &str) -> &str {
    ROMAN_TO_ARABIC
        .iter()
        .find(|(roman, _)| *roman == token)
        .map(|(_, arabic)| *arabic)
        .unwrap_or(token)
}

/// Canonical comparable form of `text`.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    folded
        .split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        .filter(|token| !token.is_empty())
        .map(roman_to_arabic)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized text without spaces ("half life" and "halflife" compact alike).
pub fn compact(text: &str) -> String {
    normalize(text).replace(' ', "")
}

/// Normalized tokens in order; empty input gives no tokens.
pub fn tokens(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return Vec::new();
    }
    normalized.split(' ').map(str::to_string).collect()
}

/// First character of every token.
pub fn acronym(text: &str) -> String {
    tokens(text)
        .iter()
        .filter_map(|token| token.chars().next())
        .collect()
}

/// True when every char of `needle` occurs in `haystack` in order, matched
/// greedily left to right. Empty arguments never match.
pub fn is_subsequence(needle: &str, haystack: &str) -> bool {
    if needle.is_empty() || haystack.is_empty() {
        return false;
    }

    let mut wanted = needle.chars().peekable();
    for c in haystack.chars() {
        match wanted.peek() {
            Some(&next) if next == c => {
                wanted.next();
            }
            Some(_) => {}
            None => break,
        }
    }
    wanted.peek().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("  Half-Life: Alyx!! "), "half life alyx");
        assert_eq!(normalize("DOOM   Eternal"), "doom eternal");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t\n"), "");
        assert_eq!(normalize("---"), "");
    }

    #[test]
    fn test_diacritics_folded() {
        assert_eq!(normalize("Pokémon Café"), "pokemon cafe");
        assert_eq!(normalize("Ñandú"), "nandu");
    }

    #[test]
    fn test_non_ascii_letters_are_separators() {
        assert_eq!(normalize("Straße 2"), "stra e 2");
        assert_eq!(normalize("東方 Project"), "project");
    }

    #[test]
    fn test_roman_numerals() {
        assert_eq!(normalize("Civilization VI"), normalize("Civilization 6"));
        assert_eq!(normalize("Portal II"), "portal 2");
        assert_eq!(normalize("Final Fantasy X"), "final fantasy 10");
        // only i..x are mapped
        assert_eq!(normalize("Rocky XI"), "rocky xi");
        // only whole tokens
        assert_eq!(normalize("Vivid"), "vivid");
    }


    #[test]
    fn test_compact_and_tokens() {
        assert_eq!(compact("Half Life"), "halflife");
        assert_eq!(tokens("Half-Life 2"), vec!["half", "life", "2"]);
        assert!(tokens("   ").is_empty());
    }

    #[test]
    fn test_acronym() {
        assert_eq!(acronym("Deep Rock Galactic"), "drg");
        assert_eq!(acronym("Grand Theft Auto V"), "gta5");
        assert_eq!(acronym(""), "");
    }

    #[test]
    fn test_is_subsequence() {
        assert!(is_subsequence("hlife", "halflife"));
        assert!(is_subsequence("drg", "drg"));
        assert!(!is_subsequence("lh", "hl"));
        assert!(!is_subsequence("", "abc"));
        assert!(!is_subsequence("abc", ""));
        assert!(!is_subsequence("aab", "ab"));
    }

    proptest! {
        #[test]
        fn proptest_normalize_idempotent(text in "\\PC{0,40}") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn proptest_normalize_idempotent_titles(
            text in "(VI|II|IV|X|Pokémon|Édition|[A-Za-z0-9' :.-]){0,16}",
        ) {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once.clone());
            prop_assert!(once.chars().all(|c| c == ' ' || c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }
}
