//! Health rules (spec.md §4.F.2), evaluated on a [`Source`].

use score_models::Source;
use score_notes::Note;

/// Notes this source contributes to the Health sub-score.
#[must_use]
pub fn notes(source: &Source) -> Vec<Note> {
    if let Some(error) = source.error {
        return vec![error];
    }

    let mut notes = Vec::new();
    if source.max_monthly_authors_count.is_some_and(|count| count < 3) {
        notes.push(Note::FewMaxMonthlyAuthors);
    }
    if source.recent_authors_count.is_some_and(|count| count < 2) {
        notes.push(Note::OneAuthorThisYear);
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn source(recent: Option<u32>, max_monthly: Option<u32>) -> Source {
        Source {
            source_url: "https://github.com/psf/requests".to_string(),
            error: None,
            licenses: Vec::new(),
            package_destinations: Vec::new(),
            recent_authors_count: recent,
            max_monthly_authors_count: max_monthly,
            first_commit: Some(Utc::now()),
            latest_commit: Some(Utc::now()),
        }
    }

    #[test]
    fn error_short_circuits() {
        let s = Source::error("https://github.com/x/y", Note::RepoEmpty);
        assert_eq!(notes(&s), vec![Note::RepoEmpty]);
    }

    #[test]
    fn few_monthly_authors_is_flagged() {
        assert_eq!(notes(&source(Some(5), Some(2))), vec![Note::FewMaxMonthlyAuthors]);
    }

    #[test]
    fn one_author_this_year_is_flagged() {
        assert_eq!(notes(&source(Some(1), Some(5))), vec![Note::OneAuthorThisYear]);
    }

    #[test]
    fn both_can_fire_together() {
        let result = notes(&source(Some(1), Some(1)));
        assert!(result.contains(&Note::FewMaxMonthlyAuthors));
        assert!(result.contains(&Note::OneAuthorThisYear));
    }

    #[test]
    fn healthy_project_has_no_notes() {
        assert!(notes(&source(Some(10), Some(10))).is_empty());
    }
}
