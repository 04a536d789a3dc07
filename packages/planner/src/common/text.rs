//! Text normalization shared by dedup, catalog keys and interest matching.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a name for identity comparison.
///
/// Folds diacritics (NFD, combining marks dropped), lowercases, turns
/// punctuation into spaces and collapses whitespace. "Café  de Flore!" and
/// "cafe de flore" normalize to the same key.
pub fn normalize_name(s: &str) -> String {
    let folded: String = s
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when two location strings plausibly describe the same spot: after
/// normalization one is a prefix or substring of the other. Empty strings
/// never match.
pub fn locations_overlap(a: &str, b: &str) -> bool {
    let a = normalize_name(a);
    let b = normalize_name(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Truncate to at most `max_chars` characters, never splitting a char.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
