//! The Git Ingestor (spec.md §4.D): `ingest(url) -> Source`, the hardest
//! component of the pipeline. Clones a scoped, minimum-bytes checkout of a
//! source repository into a temporary directory, reads its commit history,
//! license files, and declared package names, then tears the checkout down
//! regardless of outcome.

pub mod clone;
pub mod commits;
pub mod licenses;
pub mod manifests;
pub mod url;

use score_license::SpdxMatcher;
use score_models::Source;
use score_notes::Note;

pub use crate::clone::{CloneError, MAX_CLONE_TIME};

/// A clone that times out is eligible for one retry before it's treated as a
/// hard failure (spec.md §4.D.2: "Exit -9 + timeout: raise to caller as
/// timeout (retry eligible)").
const CLONE_TIMEOUT_RETRIES: u32 = 1;

/// Clone, ingest, and tear down the repository at `source_url`, using
/// `matcher` as the License Matcher's SPDX engine and `clone_timeout` as the
/// clone's hard wall-clock limit (spec.md §4.D). The temporary checkout is
/// always removed before this function returns, success or failure.
pub async fn ingest(source_url: &str, matcher: &dyn SpdxMatcher, clone_timeout: std::time::Duration) -> Source {
    let Some(normalized) = url::normalize_source_url(source_url) else {
        return Source::error(source_url, Note::NoSourceInvalidUrl);
    };

    if let Err(note) = url::gate(&normalized) {
        return Source::error(normalized, note);
    }

    let mut attempt = 0;
    loop {
        let temp_dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(_) => return Source::error(normalized, Note::NoSourceOtherGitError),
        };

        match clone::clone_sparse(&normalized, temp_dir.path(), clone_timeout).await {
            Ok(()) => return ingest_checkout(&normalized, temp_dir.path(), matcher).await,
            Err(CloneError::Timeout { .. }) if attempt < CLONE_TIMEOUT_RETRIES => {
                tracing::warn!(url = %normalized, attempt, "clone timed out, retrying");
                attempt += 1;
                continue;
            }
            Err(CloneError::Timeout { .. }) => return Source::error(normalized, Note::NoSourceOtherGitError),
            Err(CloneError::Note(note)) => return Source::error(normalized, note),
            Err(CloneError::Spawn(_)) => return Source::error(normalized, Note::NoSourceOtherGitError),
        }
    }
}

/// The synchronous, filesystem- and `git2`-heavy portion of ingestion,
/// dispatched to a blocking thread so the clone's async caller isn't
/// starved (spec.md §5).
async fn ingest_checkout(normalized_url: &str, repo_path: &std::path::Path, matcher: &dyn SpdxMatcher) -> Source {
    let repo_path = repo_path.to_path_buf();
    let source_url = normalized_url.to_string();

    let stats = {
        let repo_path = repo_path.clone();
        match tokio::task::spawn_blocking(move || commits::analyze(&repo_path, chrono::Utc::now())).await {
            Ok(result) => result,
            Err(_) => Err(Note::RepoEmpty),
        }
    };

    let stats = match stats {
        Ok(stats) => stats,
        Err(note) => return Source::error(source_url, note),
    };

    // `matcher` is borrowed, so this walk can't cross into spawn_blocking's
    // 'static bound; license discovery runs on the current task instead.
    let licenses = licenses::discover(&repo_path, matcher, &source_url);

    let package_destinations = manifests::discover(&repo_path);

    Source {
        source_url,
        error: None,
        licenses,
        package_destinations,
        recent_authors_count: Some(stats.recent_authors_count),
        max_monthly_authors_count: Some(stats.max_monthly_authors_count),
        first_commit: Some(stats.first_commit),
        latest_commit: Some(stats.latest_commit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use score_license::NullSpdxMatcher;

    #[tokio::test]
    async fn ingest_rejects_insecure_scheme_without_cloning() {
        let source = ingest("http://github.com/psf/requests", &NullSpdxMatcher, MAX_CLONE_TIME).await;
        assert_eq!(source.error, Some(Note::NoSourceInsecureConnection));
    }

    #[tokio::test]
    async fn ingest_rejects_localhost_without_cloning() {
        let source = ingest("https://localhost/psf/requests", &NullSpdxMatcher, MAX_CLONE_TIME).await;
        assert_eq!(source.error, Some(Note::NoSourceLocalhostUrl));
    }
}
