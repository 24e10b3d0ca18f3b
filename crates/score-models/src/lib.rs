//! Core data types shared by every stage of the scoring pipeline: what a
//! Registry Fetcher produces ([`Package`]), what the Git Ingestor produces
//! ([`Source`]), what the Vulnerability Fetcher produces ([`Vulnerabilities`]),
//! and the assembled [`Score`] (spec.md §3).
//!
//! These are plain data. None of the types here know how to fetch, cache,
//! or score themselves — that logic lives in `score-fetchers`, `score-git`,
//! `score-vuln`, `score-cache` and `score-rules`.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use score_notes::Note;
use serde::{Deserialize, Serialize};

/// Whether a [`Package`] was found on its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageStatus {
    Ok,
    NotFound,
}

/// A single parsed dependency requirement (spec.md §3, §4.B.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    #[serde(default)]
    pub specifiers: Vec<String>,
    #[serde(default)]
    pub extras: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_marker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_marker: Option<String>,
}

/// Registry metadata for one package, as produced by a Registry Fetcher
/// (spec.md §4.B). Immutable after creation; cached up to `PACKAGE_TTL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub ecosystem: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Which registry field `source_url` was read from, e.g. `"project_urls.code"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<DateTime<Utc>>,
    pub status: PackageStatus,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Package {
    #[must_use]
    pub fn not_found(ecosystem: &str, name: &str) -> Self {
        Package {
            name: name.to_string(),
            ecosystem: ecosystem.to_string(),
            version: None,
            license: None,
            source_url: None,
            source_url_key: None,
            release_date: None,
            status: PackageStatus::NotFound,
            dependencies: Vec::new(),
        }
    }
}

/// A restriction tag attached to a matched license (spec.md §3, §4.E).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Restriction {
    DerivativeWorkCopyleft,
    NetworkCopyleft,
    PatentGrant,
    CommercialRestrictions,
    UserDataAccess,
    CryptographicAutonomy,
    WeakCopyleft,
}

impl Restriction {
    /// The note this restriction contributes during legal rule evaluation
    /// (spec.md §4.F.3).
    #[must_use]
    pub fn note(self) -> Note {
        match self {
            Restriction::DerivativeWorkCopyleft => Note::LicenseRestrictionDerivativeWorkCopyleft,
            Restriction::NetworkCopyleft => Note::LicenseRestrictionNetworkCopyleft,
            Restriction::PatentGrant => Note::LicenseRestrictionPatentGrant,
            Restriction::CommercialRestrictions => Note::LicenseRestrictionCommercialRestrictions,
            Restriction::UserDataAccess => Note::LicenseRestrictionUserDataAccess,
            Restriction::CryptographicAutonomy => Note::LicenseRestrictionCryptographicAutonomy,
            Restriction::WeakCopyleft => Note::LicenseRestrictionWeakCopyleft,
        }
    }
}

/// The result of matching one license file's content against the License
/// Matcher (spec.md §3, §4.E).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct License {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Note>,
    /// Path to the license file, relative to the repository root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spdx_id: Option<String>,
    /// Grouping family, e.g. `"BSD"`, `"GPL"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Canonical license name, e.g. `"Apache-2.0"`, or `"Unknown"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_match: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    #[serde(default)]
    pub modified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    /// MD5 of the *normalized* license content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_text: Option<String>,
    #[serde(default)]
    pub restrictions: BTreeSet<Restriction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_osi_approved: Option<bool>,
}

impl License {
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.license.as_deref() == Some("Unknown")
    }
}

/// One declared package name discovered in a repository manifest
/// (spec.md §4.D.5), e.g. `("pypi/requests", "pyproject.toml")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDestination {
    /// `"{ecosystem}/{name}"`.
    pub name: String,
    pub manifest_path: String,
}

/// The result of ingesting a source repository (spec.md §3, §4.D). Identity
/// is the normalized source URL. Cached up to `SOURCE_TTL`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Source {
    pub source_url: String,
    /// If set, every other field is advisory only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Note>,
    #[serde(default)]
    pub licenses: Vec<License>,
    #[serde(default)]
    pub package_destinations: Vec<PackageDestination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_authors_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_monthly_authors_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_commit: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_commit: Option<DateTime<Utc>>,
}

impl Source {
    #[must_use]
    pub fn error(source_url: impl Into<String>, error: Note) -> Self {
        Source {
            source_url: source_url.into(),
            error: Some(error),
            ..Source::default()
        }
    }
}

/// Severity bucket for a vulnerability's CVSS base score (spec.md §4.C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Critical,
    Unknown,
}

impl Severity {
    /// Bucket a CVSS base score (spec.md §4.C.2): `≥9 CRITICAL`, `≥7 HIGH`,
    /// `≥4 MODERATE`, else `LOW`. `None` maps to `UNKNOWN`.
    #[must_use]
    pub fn from_score(score: Option<f64>) -> Severity {
        match score {
            None => Severity::Unknown,
            Some(s) if s >= 9.0 => Severity::Critical,
            Some(s) if s >= 7.0 => Severity::High,
            Some(s) if s >= 4.0 => Severity::Moderate,
            Some(_) => Severity::Low,
        }
    }
}

/// A single deduplicated vulnerability record (spec.md §3, §4.C).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: String,
    pub published_on: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_on: Option<DateTime<Utc>>,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_num: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_to_fix: Option<i64>,
}

/// The OSV query result for one package (spec.md §3, §4.C). Cache TTL = 7 days.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vulnerabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Note>,
    #[serde(default)]
    pub vulns: Vec<Vulnerability>,
}

impl Vulnerabilities {
    #[must_use]
    pub fn error(error: Note) -> Self {
        Vulnerabilities { error: Some(error), vulns: Vec::new() }
    }
}

/// One of the four sub-scores (spec.md §3, §4.F.6): the maximum severity
/// category among its accepted notes, plus which notes contributed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategorizedScore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// The fully assembled score for a package (spec.md §3, §4.F.6). Computed
/// per request; never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Score {
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub legal: CategorizedScore,
    #[serde(default)]
    pub health_risk: CategorizedScore,
    #[serde(default)]
    pub maturity: CategorizedScore,
    #[serde(default)]
    pub security: CategorizedScore,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_round_trips_through_json() {
        let pkg = Package {
            name: "requests".into(),
            ecosystem: "pypi".into(),
            version: Some("2.31.0".into()),
            license: Some("Apache-2.0".into()),
            source_url: Some("https://github.com/psf/requests".into()),
            source_url_key: Some("project_urls.code".into()),
            release_date: None,
            status: PackageStatus::Ok,
            dependencies: vec![Dependency {
                name: "urllib3".into(),
                specifiers: vec![">=1.21.1".into()],
                extras: Vec::new(),
                environment_marker: None,
                extra_marker: None,
            }],
        };
        let json = serde_json::to_string(&pkg).unwrap();
        let back: Package = serde_json::from_str(&json).unwrap();
        assert_eq!(pkg, back);
    }

    #[test]
    fn severity_buckets_match_thresholds() {
        assert_eq!(Severity::from_score(Some(9.8)), Severity::Critical);
        assert_eq!(Severity::from_score(Some(9.0)), Severity::Critical);
        assert_eq!(Severity::from_score(Some(7.0)), Severity::High);
        assert_eq!(Severity::from_score(Some(4.0)), Severity::Moderate);
        assert_eq!(Severity::from_score(Some(3.9)), Severity::Low);
        assert_eq!(Severity::from_score(None), Severity::Unknown);
    }

    #[test]
    fn not_found_package_has_no_source_fields() {
        let pkg = Package::not_found("pypi", "does-not-exist");
        assert_eq!(pkg.status, PackageStatus::NotFound);
        assert!(pkg.source_url.is_none());
    }
}
