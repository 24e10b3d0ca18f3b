//! Security rules (spec.md §4.F.5), evaluated on [`Vulnerabilities`].

use chrono::{DateTime, Duration, Utc};
use score_models::Vulnerabilities;
use score_notes::Note;

const LONG_TIME_TO_FIX_DAYS: i64 = 600;
const RECENT_WINDOW_DAYS: i64 = 600;
const RECENT_THRESHOLD: usize = 2;
const SEVERE_SCORE: f64 = 7.0;

/// Notes this vulnerability query result contributes to the Security
/// sub-score.
#[must_use]
pub fn notes(vulnerabilities: &Vulnerabilities, now: DateTime<Utc>) -> Vec<Note> {
    if let Some(error) = vulnerabilities.error {
        return vec![error];
    }

    let mut notes = Vec::new();

    let days_to_fix: Vec<i64> = vulnerabilities.vulns.iter().filter_map(|v| v.days_to_fix).collect();
    if median(&days_to_fix).is_some_and(|m| m > LONG_TIME_TO_FIX_DAYS) {
        notes.push(Note::VulnerabilitiesLongTimeToFix);
    }

    let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
    let recent: Vec<_> = vulnerabilities.vulns.iter().filter(|v| v.published_on > cutoff).collect();
    if recent.len() > RECENT_THRESHOLD {
        notes.push(Note::VulnerabilitiesRecent);
        if recent.iter().any(|v| v.severity_num.is_some_and(|score| score >= SEVERE_SCORE)) {
            notes.push(Note::VulnerabilitiesSevere);
        }
    }

    notes
}

/// Odd length → the middle value; even length → integer floor of the
/// average of the two middle values (spec.md §4.F.5).
fn median(values: &[i64]) -> Option<i64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2)
    }
}
