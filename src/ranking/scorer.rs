use crate::ranking::normalize::{acronym, compact, is_subsequence, normalize, tokens};

// ═══════════════════════════════════════════════════════════════════════════
// Text signals
// ═══════════════════════════════════════════════════════════════════════════

const EXACT_BONUS: i64 = 2200;
const PREFIX_BONUS: i64 = 1300;
const CONTAINS_BONUS: i64 = 900;
const ALL_TOKENS_BONUS: i64 = 680;
const ALL_TOKEN_PREFIXES_BONUS: i64 = 540;
const TOKEN_PREFIX_BONUS: i64 = 42;
const COMPACT_CONTAINS_BONUS: i64 = 580;
const COMPACT_SUBSEQUENCE_BONUS: i64 = 240;
const ACRONYM_EXACT_BONUS: i64 = 1500;
const ACRONYM_PREFIX_BONUS: i64 = 900;
const ACRONYM_SUBSEQUENCE_BONUS: i64 = 450;

const LENGTH_PENALTY_PER_CHAR: i64 = 3;
const LENGTH_PENALTY_CAP: i64 = 220;

// ═══════════════════════════════════════════════════════════════════════════
// App id signals
// ═══════════════════════════════════════════════════════════════════════════

const APP_ID_EXACT_BONUS: i64 = 3000;
const APP_ID_PREFIX_BONUS: i64 = 1700;
const APP_ID_CONTAINS_BONUS: i64 = 1200;

/// True for a non-empty string made only of ASCII digits.
pub fn is_numeric_id(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Relevance of `target` for `query`, or 0 when either side normalizes empty.
///
/// Every signal adds its bonus independently; a length-difference penalty
/// (capped at 220) then nudges targets of similar length ahead.
pub fn score_text(query: &str, target: &str) -> i64 {
    let q = normalize(query);
    let t = normalize(target);
    if q.is_empty() || t.is_empty() {
        return 0;
    }

    let q_compact = compact(&q);
    let t_compact = compact(&t);
    let q_tokens = tokens(&q);
    let t_tokens = tokens(&t);
    let t_acronym = acronym(&t);

    let prefixes_target_token =
        |token: &String| t_tokens.iter().any(|target_token| target_token.starts_with(token.as_str()));

    let mut score = 0;

    if q == t {
        score += EXACT_BONUS;
    }
    if t.starts_with(&q) {
        score += PREFIX_BONUS;
    }
    if t.contains(&q) {
        score += CONTAINS_BONUS;
    }

    if q_tokens.iter().all(|token| t_tokens.contains(token)) {
        score += ALL_TOKENS_BONUS;
    }
    if q_tokens.iter().all(prefixes_target_token) {
        score += ALL_TOKEN_PREFIXES_BONUS;
    }
    score += q_tokens
        .iter()
        .filter(|token| token.len() >= 2 && prefixes_target_token(*token))
        .count() as i64
        * TOKEN_PREFIX_BONUS;

    if q_compact.len() >= 3 && t_compact.contains(&q_compact) {
        score += COMPACT_CONTAINS_BONUS;
    }
    if q_compact.len() >= 4 && is_subsequence(&q_compact, &t_compact) {
        score += COMPACT_SUBSEQUENCE_BONUS;
    }

    if !t_acronym.is_empty() && q_compact.len() >= 2 {
        if q_compact == t_acronym {
            score += ACRONYM_EXACT_BONUS;
        } else if t_acronym.starts_with(&q_compact) {
            score += ACRONYM_PREFIX_BONUS;
        } else if is_subsequence(&q_compact, &t_acronym) {
            score += ACRONYM_SUBSEQUENCE_BONUS;
        }
    }

    let length_gap = (t_compact.len() as i64 - q_compact.len() as i64).abs();
    score - (length_gap * LENGTH_PENALTY_PER_CHAR).min(LENGTH_PENALTY_CAP)
}

/// Relevance of an app id for a digit-only query; 0 for any other query.
pub fn score_app_id(query: &str, app_id: &str) -> i64 {
    let query = query.trim();
    let app_id = app_id.trim();
    if !is_numeric_id(query) || app_id.is_empty() {
        return 0;
    }

    if query == app_id {
        APP_ID_EXACT_BONUS
    } else if app_id.starts_with(query) {
        APP_ID_PREFIX_BONUS
    } else if app_id.contains(query) {
        APP_ID_CONTAINS_BONUS
    } else {
        0
    }
}
