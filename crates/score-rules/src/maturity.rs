//! Maturity rules (spec.md §4.F.1), evaluated on a [`Source`].

use chrono::{DateTime, Duration, Utc};
use score_models::Source;
use score_notes::Note;

/// Notes this source contributes to the Maturity sub-score.
#[must_use]
pub fn notes(source: &Source, now: DateTime<Utc>) -> Vec<Note> {
    if let Some(error) = source.error {
        return vec![error];
    }

    let (Some(first_commit), Some(latest_commit)) = (source.first_commit, source.latest_commit) else {
        return vec![Note::NoCommits];
    };

    if latest_commit < now - Duration::days(365 * 5) {
        vec![Note::LastCommitOver5Years]
    } else if latest_commit < now - Duration::days(365) {
        vec![Note::LastCommitOverAYear]
    } else if first_commit > now - Duration::days(365) {
        vec![Note::FirstCommitThisYear]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy_source(first_commit: DateTime<Utc>, latest_commit: DateTime<Utc>) -> Source {
        Source {
            source_url: "https://github.com/psf/requests".to_string(),
            error: None,
            licenses: Vec::new(),
            package_destinations: Vec::new(),
            recent_authors_count: Some(5),
            max_monthly_authors_count: Some(5),
            first_commit: Some(first_commit),
            latest_commit: Some(latest_commit),
        }
    }

    #[test]
    fn error_short_circuits() {
        let source = Source::error("https://github.com/x/y", Note::RepoEmpty);
        assert_eq!(notes(&source, Utc::now()), vec![Note::RepoEmpty]);
    }

    #[test]
    fn missing_commits_yields_no_commits() {
        let source = Source { first_commit: None, ..healthy_source(Utc::now(), Utc::now()) };
        assert_eq!(notes(&source, Utc::now()), vec![Note::NoCommits]);
    }

    #[test]
    fn last_commit_over_five_years_is_legacy() {
        let now = Utc::now();
        let source = healthy_source(now - Duration::days(365 * 8), now - Duration::days(365 * 6));
        assert_eq!(notes(&source, now), vec![Note::LastCommitOver5Years]);
    }

    #[test]
    fn last_commit_over_a_year_is_stale() {
        let now = Utc::now();
        let source = healthy_source(now - Duration::days(365 * 3), now - Duration::days(400));
        assert_eq!(notes(&source, now), vec![Note::LastCommitOverAYear]);
    }

    #[test]
    fn first_commit_this_year_is_experimental() {
        let now = Utc::now();
        let source = healthy_source(now - Duration::days(30), now - Duration::days(1));
        assert_eq!(notes(&source, now), vec![Note::FirstCommitThisYear]);
    }

    #[test]
    fn active_established_repo_has_no_notes() {
        let now = Utc::now();
        let source = healthy_source(now - Duration::days(1000), now - Duration::days(1));
        assert!(notes(&source, now).is_empty());
    }
}
