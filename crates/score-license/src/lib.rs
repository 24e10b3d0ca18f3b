//! The License Matcher (spec.md §4.E): classifies a candidate license
//! file's text against an SPDX matcher (when available) or, failing that,
//! a bundled reference corpus compared with Sørensen-Dice similarity.
//!
//! Grounded in `git_vcs/license_detection.py` of the original
//! implementation: the SPDX short-circuit, the `0.9`/`0.95` similarity
//! thresholds, and the two distinct normalization passes (matching vs.
//! hashing) all come from there.

mod catalog;
mod normalize;
mod spdx;

use std::collections::BTreeSet;

use md5::{Digest, Md5};
use score_models::License;

pub use crate::spdx::{NullSpdxMatcher, SpdxMatch, SpdxMatcher};

/// Below this similarity, the candidate isn't recognized at all (spec.md
/// §4.E step 2).
const PROBABLY_NOT: f64 = 0.9;
/// At or above this similarity, the candidate is considered an unmodified
/// copy of the reference text (spec.md §4.E step 2).
const CLOSE_ENOUGH: f64 = 0.95;

/// Classify `content` (the contents of a license file at `path` in the
/// repository identified by `source_url`, used only to label the diff)
/// against `matcher`'s SPDX engine, falling back to the bundled fuzzy
/// corpus match.
#[must_use]
pub fn identify_license(matcher: &dyn SpdxMatcher, source_url: &str, path: &str, content: &str) -> License {
    if let Some(spdx) = matcher.find_license(content) {
        return License {
            error: None,
            path: Some(path.to_string()),
            spdx_id: Some(spdx.spdx_id.clone()),
            kind: Some(spdx.kind),
            license: Some(spdx.name),
            best_match: Some(spdx.spdx_id),
            similarity: Some(1.0),
            modified: false,
            diff: None,
            md5: Some(md5_hash(content)),
            additional_text: non_empty(spdx.extra_characters),
            restrictions: spdx.restrictions.into_iter().collect(),
            is_osi_approved: Some(spdx.is_osi_approved),
        };
    }

    fuzzy_match(source_url, path, content)
}

fn fuzzy_match(source_url: &str, path: &str, content: &str) -> License {
    let normalized_candidate = normalize::normalize_for_matching(content);

    let (best_name, best_similarity) = catalog::CORPUS
        .iter()
        .map(|entry| {
            let normalized_reference = normalize::normalize_for_matching(entry.text);
            let similarity = strsim::sorensen_dice(&normalized_candidate, &normalized_reference);
            (entry.name, similarity)
        })
        .fold(("", -1.0_f64), |best, candidate| if candidate.1 > best.1 { candidate } else { best });

    if best_similarity < PROBABLY_NOT {
        return License {
            license: Some("Unknown".to_string()),
            kind: Some("Unknown".to_string()),
            path: Some(path.to_string()),
            similarity: Some(best_similarity.max(0.0)),
            best_match: Some(best_name.to_string()),
            modified: false,
            md5: Some(md5_hash(content)),
            ..License::default()
        };
    }

    let kind = catalog::kind_for(best_name).to_string();
    let modified = best_similarity < CLOSE_ENOUGH;
    let restrictions: BTreeSet<_> = catalog::restrictions_for(best_name).into_iter().collect();

    let diff = if modified {
        let reference_text = catalog::CORPUS.iter().find(|e| e.name == best_name).map(|e| e.text).unwrap_or("");
        Some(unified_diff(reference_text, content, best_name, source_url))
    } else {
        None
    };

    License {
        error: None,
        path: Some(path.to_string()),
        spdx_id: None,
        kind: Some(kind),
        license: Some(best_name.to_string()),
        best_match: Some(best_name.to_string()),
        similarity: Some(best_similarity),
        modified,
        diff,
        md5: Some(md5_hash(content)),
        additional_text: None,
        restrictions,
        is_osi_approved: Some(catalog::is_osi_approved(best_name)),
    }
}

fn unified_diff(reference: &str, candidate: &str, reference_name: &str, source_url: &str) -> String {
    let diff = similar::TextDiff::from_lines(reference, candidate);
    diff.unified_diff()
        .header(&format!("https://opensource.org/license/{reference_name}"), source_url)
        .to_string()
}

/// MD5 of the *normalized* license content (spec.md §3, §4.E step 3).
#[must_use]
pub fn md5_hash(content: &str) -> String {
    let normalized = normalize::normalize_for_hash(content);
    let digest = Md5::digest(normalized.as_bytes());
    hex::encode(digest)
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_mit_text_matches_with_high_similarity() {
        let content = catalog::CORPUS.iter().find(|e| e.name == "MIT").unwrap().text;
        let license = identify_license(&NullSpdxMatcher, "https://example.com/x", "LICENSE", content);
        assert_eq!(license.license.as_deref(), Some("MIT"));
        assert!(!license.modified);
        assert_eq!(license.kind.as_deref(), Some("MIT"));
    }

    #[test]
    fn unrelated_text_is_unknown() {
        let license = identify_license(
            &NullSpdxMatcher,
            "https://example.com/x",
            "LICENSE",
            "This is a recipe for chocolate chip cookies. Mix flour and sugar.",
        );
        assert_eq!(license.license.as_deref(), Some("Unknown"));
        assert_eq!(license.kind.as_deref(), Some("Unknown"));
    }

    #[test]
    fn slightly_modified_license_is_flagged_modified() {
        let base = catalog::CORPUS.iter().find(|e| e.name == "MIT").unwrap().text;
        let modified = format!("{base}\n\nAdditional clause added by a fork maintainer.\n");
        let license = identify_license(&NullSpdxMatcher, "https://example.com/x", "LICENSE", &modified);
        assert_eq!(license.license.as_deref(), Some("MIT"));
        assert!(license.modified);
        assert!(license.diff.is_some());
    }

    #[test]
    fn gpl_carries_derivative_work_copyleft_restriction() {
        let content = catalog::CORPUS.iter().find(|e| e.name == "GPL-3.0").unwrap().text;
        let license = identify_license(&NullSpdxMatcher, "https://example.com/x", "LICENSE", content);
        assert_eq!(license.license.as_deref(), Some("GPL-3.0"));
        assert!(license.restrictions.contains(&score_models::Restriction::DerivativeWorkCopyleft));
    }

    #[test]
    fn md5_is_stable_across_incidental_whitespace_changes() {
        let a = md5_hash("MIT License\n\nPermission granted.");
        let b = md5_hash("MIT  License\nPermission   granted.");
        assert_eq!(a, b);
    }
}
