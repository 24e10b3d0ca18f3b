//! Note Derivation + Score Assembly (spec.md §4.F): the one pure component
//! in the pipeline. Given the evidence gathered by the other five
//! components — a [`Package`], an optional [`Source`], and optional
//! [`Vulnerabilities`] — reduces them to a [`Score`].
//!
//! Every rule here is a plain function from evidence to a list of
//! [`Note`]s; none of them can fail. Upstream failure (a missing repo, an
//! unreachable OSV endpoint, an unparseable license) has already been
//! turned into a note by the component that observed it (spec.md §7:
//! "the scoring layer treats all failure signals as notes rather than
//! exceptions").

mod assembly;
mod cross_check;
mod health;
mod legal;
mod maturity;
mod security;

use chrono::{DateTime, Utc};
use score_models::{Package, PackageStatus, Score, Source, Vulnerabilities};
use score_notes::Note;

/// Compute the full [`Score`] for one `(Package, Source, Vulnerabilities)`
/// triple as of `now` (spec.md §4.F, control flow in spec.md §2).
///
/// `source` is `None` when the package declared no usable source URL, or
/// when the Git Ingestor never ran for this request; `vulnerabilities` is
/// `None` when the Vulnerability Fetcher was skipped entirely (the caller
/// chose not to query it, as opposed to the fetcher returning a
/// `VULNERABILITIES_CHECK_FAILED` error, which is a `Some` carrying that
/// error).
#[must_use]
pub fn score(
    package: &Package,
    source: Option<&Source>,
    vulnerabilities: Option<&Vulnerabilities>,
    now: DateTime<Utc>,
) -> Score {
    let mut notes = Vec::new();

    match source {
        Some(source) => {
            notes.extend(maturity::notes(source, now));
            notes.extend(health::notes(source));
            notes.extend(legal::notes(source));
            // Cross-check rules read Package + Source together, so they
            // only make sense once Source ingested cleanly (spec.md
            // §4.F.4: "Skip if no Package or Source has error").
            if source.error.is_none() {
                notes.extend(cross_check::notes(package, source));
            }
        }
        None => notes.push(no_source_note(package)),
    }

    if let Some(vulnerabilities) = vulnerabilities {
        notes.extend(security::notes(vulnerabilities, now));
    }

    assembly::assemble(&notes)
}

/// Convenience wrapper over [`score`] using the wall clock (spec.md §4.F
/// rules are all relative to "now").
#[must_use]
pub fn score_now(package: &Package, source: Option<&Source>, vulnerabilities: Option<&Vulnerabilities>) -> Score {
    score(package, source, vulnerabilities, Utc::now())
}

/// The top-level special case for a request with no ingested `Source`
/// (spec.md §4.F.6): a package the registry never heard of is
/// `NOT_OPEN_SOURCE`; a package that exists but declared (or resolved to)
/// no reachable repository is `NO_SOURCE_REPO_NOT_FOUND`.
fn no_source_note(package: &Package) -> Note {
    match package.status {
        PackageStatus::NotFound => Note::NotOpenSource,
        PackageStatus::Ok => Note::NoSourceRepoNotFound,
    }
}
