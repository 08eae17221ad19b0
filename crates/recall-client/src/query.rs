//! Query text canonicalization and re-trigger suppression.
//!
//! Raw keystrokes arrive noisy: leading and trailing whitespace, doubled
//! spaces, inconsistent casing. [`normalize`] turns them into the canonical
//! form used as the cache and dedup key. [`is_near_duplicate`] suppresses
//! re-dispatch while the user is still typing the same semantic query.

/// Canonicalize raw input text into a comparable query key.
///
/// Trims, collapses internal whitespace runs to single spaces, and
/// lowercases. Absent input yields the empty string, which means
/// "no active query". Never errors.
pub fn normalize(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Heuristic check for "not enough change since the last dispatched query".
///
/// Returns true when the two queries differ by at most one character in
/// length and the shorter is a prefix of the longer. This approximates
/// "still typing the same word"; it is not an edit-distance computation and
/// its threshold is intentionally left as written.
pub fn is_near_duplicate(new: &str, last: &str) -> bool {
    if last.is_empty() {
        return false;
    }
    let new_len = new.chars().count();
    let last_len = last.chars().count();
    if new_len.abs_diff(last_len) > 1 {
        return false;
    }
    let (shorter, longer) = if new_len <= last_len {
        (new, last)
    } else {
        (last, new)
    };
    longer.starts_with(shorter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_collapses() {
        assert_eq!(normalize(Some("  explain   react\thooks  ")), "explain react hooks");
        assert_eq!(normalize(Some("one\n\ntwo")), "one two");
    }

    #[test]
    fn test_normalize_lowercases() {
        assert_eq!(normalize(Some("Explain React Hooks")), "explain react hooks");
    }

    #[test]
    fn test_normalize_absent_input() {
        assert_eq!(normalize(None), "");
        assert_eq!(normalize(Some("")), "");
        assert_eq!(normalize(Some("   \t\n")), "");
    }

    #[test]
    fn test_near_duplicate_one_char_appended() {
        assert!(is_near_duplicate("explain reacts", "explain react"));
        assert!(is_near_duplicate("explain react", "explain reacts"));
    }

    #[test]
    fn test_near_duplicate_equal_queries() {
        assert!(is_near_duplicate("explain react", "explain react"));
    }

    #[test]
    fn test_not_near_duplicate_two_chars() {
        assert!(!is_near_duplicate("explain react hooks", "explain react"));
    }

    #[test]
    fn test_not_near_duplicate_same_length_different_tail() {
        // "cat" vs "car" differ in the last character but neither is a
        // prefix of the other, so the edit counts as a real change.
        assert!(!is_near_duplicate("cat", "car"));
    }

    #[test]
    fn test_not_near_duplicate_unrelated() {
        assert!(!is_near_duplicate("quantum", "react"));
    }

    #[test]
    fn test_not_near_duplicate_without_prior_query() {
        assert!(!is_near_duplicate("anything", ""));
    }
}
