//! Score assembly (spec.md §4.F.6): grouping the notes emitted by every
//! rule module into the four categorized sub-scores, plus the top-level
//! deduplicated, sorted note list.

use indexmap::IndexSet;
use score_models::{CategorizedScore, Score};
use score_notes::{seed_category, Note, ScoreGroup};

/// Assemble a [`Score`] from every note emitted across the rule modules
/// (spec.md §4.F.6). Each sub-score accepts a note iff it's `Any`-grouped
/// or matches that sub-score's own group, never adding the same code
/// twice, and takes the severity-maximum category of its accepted notes
/// starting from that group's seed baseline.
#[must_use]
pub fn assemble(notes: &[Note]) -> Score {
    Score {
        legal: build_group(notes, ScoreGroup::Legal),
        health_risk: build_group(notes, ScoreGroup::Health),
        maturity: build_group(notes, ScoreGroup::Maturity),
        security: build_group(notes, ScoreGroup::Security),
        notes: top_level_notes(notes),
    }
}

fn build_group(notes: &[Note], group: ScoreGroup) -> CategorizedScore {
    let mut accepted: IndexSet<Note> = IndexSet::new();
    let mut value = seed_category(group);

    for &note in notes {
        if note.contributes_to(group) && accepted.insert(note) {
            value = value.max(note.category());
        }
    }

    CategorizedScore { value: Some(value.as_str().to_string()), notes: accepted.into_iter().collect() }
}

/// The deduplicated, lexicographically-sorted union of every note emitted
/// (spec.md §3 invariants, §4.F.6).
fn top_level_notes(notes: &[Note]) -> Vec<Note> {
    let deduped: IndexSet<Note> = notes.iter().copied().collect();
    let mut sorted: Vec<Note> = deduped.into_iter().collect();
    sorted.sort_by_key(|note| note.code());
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_notes_yields_seed_values_and_empty_lists() {
        let score = assemble(&[]);
        assert_eq!(score.legal.value.as_deref(), Some("Healthy"));
        assert_eq!(score.health_risk.value.as_deref(), Some("Healthy"));
        assert_eq!(score.maturity.value.as_deref(), Some("Mature"));
        assert_eq!(score.security.value.as_deref(), Some("Healthy"));
        assert!(score.notes.is_empty());
    }

    #[test]
    fn any_group_note_raises_every_subscore() {
        let score = assemble(&[Note::NotOpenSource]);
        assert_eq!(score.legal.value.as_deref(), Some("Unknown"));
        assert_eq!(score.health_risk.value.as_deref(), Some("Unknown"));
        assert_eq!(score.maturity.value.as_deref(), Some("Unknown"));
        assert_eq!(score.security.value.as_deref(), Some("Unknown"));
        assert_eq!(score.notes, vec![Note::NotOpenSource]);
    }

    #[test]
    fn group_scoped_note_only_affects_its_own_subscore() {
        let score = assemble(&[Note::FewMaxMonthlyAuthors]);
        assert_eq!(score.health_risk.value.as_deref(), Some("Caution Needed"));
        assert_eq!(score.legal.value.as_deref(), Some("Healthy"));
        assert_eq!(score.maturity.value.as_deref(), Some("Mature"));
        assert_eq!(score.security.value.as_deref(), Some("Healthy"));
    }

    #[test]
    fn duplicate_notes_are_not_repeated_within_a_subscore() {
        let score = assemble(&[Note::LicenseUnknown, Note::LicenseUnknown]);
        assert_eq!(score.legal.notes, vec![Note::LicenseUnknown]);
    }

    #[test]
    fn subscore_value_is_the_severity_maximum() {
        // Moderate Risk > Caution Needed.
        let score = assemble(&[Note::LicenseAdditionalText, Note::LicenseUnknown]);
        assert_eq!(score.legal.value.as_deref(), Some("Moderate Risk"));
    }

    #[test]
    fn top_level_notes_are_sorted_lexicographically() {
        let score = assemble(&[Note::OneAuthorThisYear, Note::FewMaxMonthlyAuthors]);
        assert_eq!(score.notes, vec![Note::FewMaxMonthlyAuthors, Note::OneAuthorThisYear]);
    }
}
