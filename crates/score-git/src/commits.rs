//! Commit-history analysis (spec.md §4.D.3): author/email extraction, the
//! bot filter, and the two author-activity metrics.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rustc_hash::FxHashSet;
use score_notes::Note;

/// One commit's author identity and timestamp, after opening the
/// repository but before the bot filter is applied.
struct RawCommit {
    email: String,
    when: DateTime<Utc>,
}

/// The derived commit-activity metrics that become [`score_models::Source`]
/// fields (spec.md §4.D.3).
pub struct CommitStats {
    pub recent_authors_count: u32,
    pub max_monthly_authors_count: u32,
    pub first_commit: DateTime<Utc>,
    pub latest_commit: DateTime<Utc>,
}

/// Analyze the commit history of the repository at `repo_path`. Returns
/// `Err(Note::RepoEmpty)` if the repository's commit iterator yields zero
/// rows (spec.md §4.D.3) — checked before the bot filter runs, since an
/// empty history has nothing to filter either way.
pub fn analyze(repo_path: &Path, now: DateTime<Utc>) -> Result<CommitStats, Note> {
    let repo = git2::Repository::open(repo_path).map_err(|_| Note::RepoEmpty)?;
    let mut revwalk = repo.revwalk().map_err(|_| Note::RepoEmpty)?;
    revwalk.push_head().map_err(|_| Note::RepoEmpty)?;

    let mut raw_commits = Vec::new();
    for oid in revwalk.flatten() {
        let Ok(commit) = repo.find_commit(oid) else { continue };
        let author = commit.author();
        let Some(email) = author.email() else { continue };
        let time = commit.time();
        let Some(when) = DateTime::from_timestamp(time.seconds(), 0) else { continue };
        raw_commits.push(RawCommit { email: email.to_string(), when });
    }

    if raw_commits.is_empty() {
        return Err(Note::RepoEmpty);
    }

    // Bot filter: drop GitHub's noreply/bot commit authors (spec.md §4.D.3).
    let commits: Vec<RawCommit> =
        raw_commits.into_iter().filter(|c| !c.email.ends_with("github.com")).collect();

    if commits.is_empty() {
        return Err(Note::RepoEmpty);
    }

    let first_commit = commits.iter().map(|c| c.when).min().unwrap();
    let latest_commit = commits.iter().map(|c| c.when).max().unwrap();

    let one_year_ago = now - Duration::days(365);
    let recent_authors_count: u32 = {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for c in &commits {
            if c.when > one_year_ago {
                seen.insert(&c.email);
            }
        }
        seen.len() as u32
    };

    let max_monthly_authors_count = max_monthly_authors(&commits);

    Ok(CommitStats { recent_authors_count, max_monthly_authors_count, first_commit, latest_commit })
}

/// Reproduces the pandas idiom from the original implementation: resample
/// commits to one unique-author count per calendar day, then take the
/// maximum 30-day rolling *sum* of that per-day series (not a windowed
/// distinct-author count — a contributor active on several days within the
/// window is counted once per day, per spec.md §4.D.3).
fn max_monthly_authors(commits: &[RawCommit]) -> u32 {
    let mut daily_authors: BTreeMap<NaiveDate, FxHashSet<&str>> = BTreeMap::new();
    for c in commits {
        daily_authors.entry(c.when.date_naive()).or_default().insert(&c.email);
    }

    let daily_counts: BTreeMap<NaiveDate, u32> =
        daily_authors.into_iter().map(|(day, authors)| (day, authors.len() as u32)).collect();

    // The rolling sum is monotone non-increasing once a day with no new
    // activity falls off the trailing edge of the window, so the maximum
    // is always attained on a day that itself had commits.
    daily_counts
        .keys()
        .map(|&day| {
            let window_start = day - Duration::days(29);
            daily_counts.range(window_start..=day).map(|(_, count)| count).sum::<u32>()
        })
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(email: &str, days_ago: i64, now: DateTime<Utc>) -> RawCommit {
        RawCommit { email: email.to_string(), when: now - Duration::days(days_ago) }
    }

    #[test]
    fn max_monthly_authors_sums_distinct_authors_per_day_in_window() {
        let now = Utc::now();
        let commits = vec![
            commit("a@example.com", 1, now),
            commit("b@example.com", 1, now),
            commit("a@example.com", 2, now),
            commit("c@example.com", 40, now),
        ];
        // Day -1 has 2 distinct authors, day -2 has 1; the 30-day window
        // containing both sums to 3. The day -40 commit falls outside any
        // window that also contains days -1/-2.
        assert_eq!(max_monthly_authors(&commits), 3);
    }

    #[test]
    fn single_author_single_day_yields_one() {
        let now = Utc::now();
        let commits = vec![commit("a@example.com", 0, now)];
        assert_eq!(max_monthly_authors(&commits), 1);
    }
}
