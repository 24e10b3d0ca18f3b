//! The PyPI registry fetcher (spec.md §4.B).

use chrono::{DateTime, TimeZone, Utc};
use reqwest_middleware::ClientWithMiddleware;
use score_models::Package;
use serde::Deserialize;

use crate::deps::parse_deps;
use crate::license_kind::{license_from_classifiers, normalize};
use crate::{normalize_package_source_url, FetchError};

const SOURCE_URL_KEY_PREFERENCE: &[&str] = &["code", "repository", "source", "source code", "github", "homepage"];

#[derive(Debug, Deserialize)]
struct PypiResponse {
    info: PypiInfo,
    #[serde(default)]
    releases: std::collections::HashMap<String, Vec<PypiReleaseFile>>,
}

#[derive(Debug, Deserialize)]
struct PypiInfo {
    version: Option<String>,
    license: Option<String>,
    #[serde(default)]
    classifiers: Vec<String>,
    #[serde(default)]
    requires_dist: Vec<String>,
    #[serde(default)]
    project_urls: std::collections::HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct PypiReleaseFile {
    upload_time: Option<String>,
}

/// `GET https://pypi.org/pypi/{name}/json` (spec.md §4.B).
pub async fn fetch(client: &ClientWithMiddleware, name: &str) -> Result<Package, FetchError> {
    let url = format!("https://pypi.org/pypi/{name}/json");
    let response = client.get(&url).send().await?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(Package::not_found("pypi", name));
    }

    let response = response.error_for_status()?;
    let body: PypiResponse = response.json().await?;

    let dependencies = parse_deps(&body.info.requires_dist);
    let (source_url_key, source_url) = extract_source_url(&body.info.project_urls);

    let release_date = body
        .info
        .version
        .as_deref()
        .and_then(|version| body.releases.get(version))
        .and_then(earliest_upload_time);

    let license = body
        .info
        .license
        .filter(|license| !license.trim().is_empty())
        .or_else(|| license_from_classifiers(&body.info.classifiers))
        .map(|license| normalize(&license));

    Ok(Package {
        name: name.to_string(),
        ecosystem: "pypi".to_string(),
        version: body.info.version,
        license,
        source_url,
        source_url_key,
        release_date,
        status: score_models::PackageStatus::Ok,
        dependencies,
    })
}

fn earliest_upload_time(files: &[PypiReleaseFile]) -> Option<DateTime<Utc>> {
    files.iter().filter_map(|f| f.upload_time.as_deref()).filter_map(parse_pypi_timestamp).min()
}

/// PyPI's `upload_time` field has no timezone suffix; it's UTC (spec.md
/// §4.B).
fn parse_pypi_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn extract_source_url(project_urls: &std::collections::HashMap<String, String>) -> (Option<String>, Option<String>) {
    let lowercased: std::collections::HashMap<String, &String> =
        project_urls.iter().map(|(k, v)| (k.to_lowercase(), v)).collect();

    for key in SOURCE_URL_KEY_PREFERENCE {
        let Some(raw_url) = lowercased.get(*key) else { continue };
        if let Some(normalized) = normalize_package_source_url(raw_url) {
            return (Some((*key).to_string()), Some(normalized));
        }
    }

    (None, None)
}
