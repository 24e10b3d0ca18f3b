//! Package cross-check rules (spec.md §4.F.4): comparing a registry
//! [`Package`] against the build-manifest names and licenses discovered by
//! the Git Ingestor. Only evaluated when `Source.error` is unset — the
//! caller is responsible for that skip (spec.md: "Skip if no Package or
//! Source has error").

use std::collections::HashSet;

use chrono::Duration;
use score_git::manifests::pypi_normalize;
use score_models::{Package, Source};
use score_notes::Note;

fn normalize_for_ecosystem(ecosystem: &str, name: &str) -> String {
    if ecosystem == "pypi" {
        pypi_normalize(name)
    } else {
        name.to_string()
    }
}

/// Notes this `(Package, Source)` pair contributes to the Maturity/Health/
/// Legal sub-scores (spec.md §4.F.4: project-name, release-skew, and
/// license cross-checks).
#[must_use]
pub fn notes(package: &Package, source: &Source) -> Vec<Note> {
    let mut notes = Vec::new();

    notes.extend(project_name_notes(package, source));
    notes.extend(skew_notes(package, source));
    notes.extend(license_notes(package, source));

    notes
}

fn project_name_notes(package: &Package, source: &Source) -> Vec<Note> {
    let prefix = format!("{}/", package.ecosystem);
    let destinations: HashSet<String> = source
        .package_destinations
        .iter()
        .filter_map(|d| d.name.strip_prefix(prefix.as_str()))
        .map(String::from)
        .collect();

    if destinations.is_empty() {
        return vec![Note::NoProjectName];
    }

    let normalized_package_name = normalize_for_ecosystem(&package.ecosystem, &package.name);
    let matches = destinations
        .iter()
        .any(|name| normalize_for_ecosystem(&package.ecosystem, name) == normalized_package_name);

    if matches {
        Vec::new()
    } else {
        vec![Note::PackageNameMismatch]
    }
}

fn skew_notes(package: &Package, source: &Source) -> Vec<Note> {
    let (Some(latest_commit), Some(release_date)) = (source.latest_commit, package.release_date) else {
        return Vec::new();
    };

    let skew = latest_commit - release_date;
    if skew > Duration::days(365) {
        vec![Note::PackageSkewNotUpdated]
    } else if skew < -Duration::days(365) {
        vec![Note::PackageSkewNotReleased]
    } else {
        Vec::new()
    }
}

fn license_notes(package: &Package, source: &Source) -> Vec<Note> {
    let Some(package_license) = package.license.as_deref() else {
        return vec![Note::PackageNoLicense];
    };

    let normalized_kind = score_fetchers::license_kind::normalize(package_license);
    let package_license_md5 = score_license::md5_hash(package_license);

    let cross_checks = source.licenses.iter().any(|license| {
        license.kind.as_deref().is_some_and(|kind| kind.eq_ignore_ascii_case(&normalized_kind))
            || license.md5.as_deref() == Some(package_license_md5.as_str())
    });

    if cross_checks {
        return Vec::new();
    }

    if package_license.len() > 100 {
        vec![Note::PackageLicenseNotSpdxId]
    } else {
        vec![Note::PackageLicenseMismatch]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use score_models::{License, PackageDestination, PackageStatus};

    fn package(name: &str, ecosystem: &str, license: Option<&str>) -> Package {
        Package {
            name: name.to_string(),
            ecosystem: ecosystem.to_string(),
            version: Some("1.0.0".to_string()),
            license: license.map(str::to_string),
            source_url: Some("https://github.com/psf/requests".to_string()),
            source_url_key: None,
            release_date: Some(Utc::now()),
            status: PackageStatus::Ok,
            dependencies: Vec::new(),
        }
    }

    fn source_with(destinations: Vec<PackageDestination>, licenses: Vec<License>) -> Source {
        Source {
            source_url: "https://github.com/psf/requests".to_string(),
            error: None,
            licenses,
            package_destinations: destinations,
            recent_authors_count: Some(5),
            max_monthly_authors_count: Some(5),
            first_commit: Some(Utc::now()),
            latest_commit: Some(Utc::now()),
        }
    }

    #[test]
    fn no_destinations_for_ecosystem_is_no_project_name() {
        let pkg = package("requests", "pypi", Some("Apache-2.0"));
        let source = source_with(Vec::new(), Vec::new());
        assert!(notes(&pkg, &source).contains(&Note::NoProjectName));
    }

    #[test]
    fn matching_pypi_name_has_no_mismatch() {
        let pkg = package("My-Package", "pypi", None);
        let dest = vec![PackageDestination { name: "pypi/my-package".to_string(), manifest_path: "pyproject.toml".to_string() }];
        let source = source_with(dest, Vec::new());
        assert!(!notes(&pkg, &source).contains(&Note::PackageNameMismatch));
    }

    #[test]
    fn mismatched_name_is_flagged() {
        let pkg = package("requests", "pypi", None);
        let dest = vec![PackageDestination { name: "pypi/something-else".to_string(), manifest_path: "pyproject.toml".to_string() }];
        let source = source_with(dest, Vec::new());
        assert!(notes(&pkg, &source).contains(&Note::PackageNameMismatch));
    }

    #[test]
    fn skew_over_a_year_stale_release_is_flagged() {
        let now = Utc::now();
        let mut pkg = package("requests", "pypi", None);
        pkg.release_date = Some(now - Duration::days(400));
        let mut source = source_with(
            vec![PackageDestination { name: "pypi/requests".to_string(), manifest_path: "pyproject.toml".to_string() }],
            Vec::new(),
        );
        source.latest_commit = Some(now);
        assert!(notes(&pkg, &source).contains(&Note::PackageSkewNotUpdated));
    }

    #[test]
    fn skew_release_ahead_of_commits_is_flagged() {
        let now = Utc::now();
        let mut pkg = package("requests", "pypi", None);
        pkg.release_date = Some(now);
        let mut source = source_with(
            vec![PackageDestination { name: "pypi/requests".to_string(), manifest_path: "pyproject.toml".to_string() }],
            Vec::new(),
        );
        source.latest_commit = Some(now - Duration::days(400));
        assert!(notes(&pkg, &source).contains(&Note::PackageSkewNotReleased));
    }

    #[test]
    fn missing_package_license_is_flagged() {
        let pkg = package("requests", "pypi", None);
        let source = source_with(Vec::new(), Vec::new());
        assert!(notes(&pkg, &source).contains(&Note::PackageNoLicense));
    }

    #[test]
    fn license_matching_by_kind_has_no_mismatch() {
        let pkg = package("requests", "pypi", Some("Apache Software License"));
        let license = License { kind: Some("Apache".to_string()), ..License::default() };
        let source = source_with(Vec::new(), vec![license]);
        assert!(!notes(&pkg, &source).contains(&Note::PackageLicenseMismatch));
    }

    #[test]
    fn unmatched_short_license_string_is_mismatch() {
        let pkg = package("requests", "pypi", Some("GPL-2.0"));
        let license = License { kind: Some("MIT".to_string()), md5: Some("deadbeef".to_string()), ..License::default() };
        let source = source_with(Vec::new(), vec![license]);
        assert!(notes(&pkg, &source).contains(&Note::PackageLicenseMismatch));
    }

    #[test]
    fn unmatched_long_license_text_is_not_spdx_id() {
        let long_text = "x".repeat(150);
        let pkg = package("requests", "pypi", Some(&long_text));
        let license = License { kind: Some("MIT".to_string()), ..License::default() };
        let source = source_with(Vec::new(), vec![license]);
        assert!(notes(&pkg, &source).contains(&Note::PackageLicenseNotSpdxId));
    }
}
