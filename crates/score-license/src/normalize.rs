//! The two distinct text normalizations spec.md §4.E calls for: one that
//! feeds the fuzzy matcher's similarity comparison, and a separate, coarser
//! one that feeds the content hash stored on [`score_models::License::md5`].

use once_cell::sync::Lazy;
use regex::Regex;

static COPYRIGHT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[-\s*•]*copyright(\s+\([cC]\)|\s+©)?").unwrap());

static BULLET_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(\d+[.):]|\([a-z0-9]+\)|[ivxIVX]+[.)])\s+").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Matcher-side normalization (spec.md §4.E step 2): drop copyright lines,
/// fold enumerated bullet markers to a single placeholder, collapse
/// whitespace, lowercase.
#[must_use]
pub fn normalize_for_matching(content: &str) -> String {
    let without_copyright: String = content
        .lines()
        .filter(|line| !COPYRIGHT_LINE.is_match(line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n");

    let bulletless = BULLET_MARKER.replace_all(&without_copyright, " * ");
    let collapsed = WHITESPACE.replace_all(&bulletless, " ");
    collapsed.to_lowercase().trim().to_string()
}

/// The separate, coarser normalization used only to compute
/// `License::md5` (spec.md §4.E step 3): collapse all whitespace to a
/// single space and trim. Deliberately does not drop copyright lines or
/// fold bullets, so the hash is sensitive to the license's actual wording.
#[must_use]
pub fn normalize_for_hash(content: &str) -> String {
    WHITESPACE.replace_all(content, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_copyright_lines() {
        let text = "Copyright (c) 2024 Jane Doe\nMIT License body";
        let normalized = normalize_for_matching(text);
        assert!(!normalized.contains("jane doe"));
        assert!(normalized.contains("mit license body"));
    }

    #[test]
    fn folds_numbered_bullets() {
        let text = "1. First condition\n2) Second condition";
        let normalized = normalize_for_matching(text);
        assert!(normalized.contains("* first condition"));
        assert!(normalized.contains("* second condition"));
    }

    #[test]
    fn hash_normalization_keeps_copyright_line() {
        let text = "Copyright (c) 2024\n\n  Some   license   text  ";
        let normalized = normalize_for_hash(text);
        assert_eq!(normalized, "Copyright (c) 2024 Some license text");
    }
}
