//! Cache key normalization
//!
//! Two page names that differ only in case, surrounding whitespace, or
//! internal whitespace style collapse to the same key, scoped per language.

/// Compute the canonical cache key for a (language, page name) pair.
///
/// The page name is trimmed, lowercased, and every whitespace character is
/// replaced with a single `_` (run length preserved: `"Page   Name"` keys
/// the same as `"page   name"`, not the same as `"page name"`).
pub fn cache_key(page_name: &str, lang: &str) -> String {
    let mut normalized = String::with_capacity(page_name.len());
    for ch in page_name.trim().chars() {
        if ch.is_whitespace() {
            normalized.push('_');
        } else {
            normalized.extend(ch.to_lowercase());
        }
    }
    format!("{lang}|{normalized}")
}
