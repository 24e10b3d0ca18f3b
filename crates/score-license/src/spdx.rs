//! The SPDX short-circuit (spec.md §4.E step 1), modeled as a pluggable
//! trait. When no SPDX matcher library is wired in, [`NullSpdxMatcher`]
//! always returns `None` and the fuzzy corpus match always runs — exactly
//! the spec's "if an SPDX matcher library is available" hedge.

use score_models::Restriction;

/// The result of an exact SPDX identification.
#[derive(Debug, Clone)]
pub struct SpdxMatch {
    pub spdx_id: String,
    pub name: String,
    pub kind: String,
    pub restrictions: Vec<Restriction>,
    pub is_osi_approved: bool,
    /// Text in the candidate beyond the canonical license (spec.md §3's
    /// `License.additional_text`).
    pub extra_characters: String,
}

/// A pluggable exact-match engine, tried before the fuzzy corpus match.
pub trait SpdxMatcher: Send + Sync {
    fn find_license(&self, content: &str) -> Option<SpdxMatch>;
}

/// The default: no SPDX matcher library wired in, so step 1 always misses
/// and control falls through to the fuzzy corpus match.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSpdxMatcher;

impl SpdxMatcher for NullSpdxMatcher {
    fn find_license(&self, _content: &str) -> Option<SpdxMatch> {
        None
    }
}
