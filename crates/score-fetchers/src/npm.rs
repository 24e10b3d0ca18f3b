//! The npm registry fetcher (spec.md §4.B).

use chrono::{DateTime, Utc};
use reqwest_middleware::ClientWithMiddleware;
use score_models::Package;
use serde::Deserialize;

use crate::deps::npm_deps;
use crate::{normalize_package_source_url, FetchError};

#[derive(Debug, Deserialize)]
struct NpmResponse {
    #[serde(default, rename = "dist-tags")]
    dist_tags: DistTags,
    #[serde(default)]
    time: std::collections::HashMap<String, String>,
    license: Option<serde_json::Value>,
    repository: Option<serde_json::Value>,
    #[serde(default)]
    versions: std::collections::HashMap<String, NpmVersion>,
}

#[derive(Debug, Default, Deserialize)]
struct DistTags {
    latest: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NpmVersion {
    #[serde(default)]
    dependencies: serde_json::Map<String, serde_json::Value>,
}

/// `GET https://registry.npmjs.org/{name}` (spec.md §4.B).
pub async fn fetch(client: &ClientWithMiddleware, name: &str) -> Result<Package, FetchError> {
    let url = format!("https://registry.npmjs.org/{name}");
    let response = client.get(&url).send().await?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(Package::not_found("npm", name));
    }

    let response = response.error_for_status()?;
    let body: NpmResponse = response.json().await?;

    let version = body.dist_tags.latest.clone();
    let release_date = version
        .as_deref()
        .and_then(|v| body.time.get(v))
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc));

    let source_url = repository_url(body.repository.as_ref()).and_then(|raw| normalize_package_source_url(&raw));

    let license = body.license.and_then(|value| value.as_str().map(ToString::to_string));

    let dependencies = version
        .as_deref()
        .and_then(|v| body.versions.get(v))
        .map(|v| npm_deps(&v.dependencies))
        .unwrap_or_default();

    Ok(Package {
        name: name.to_string(),
        ecosystem: "npm".to_string(),
        version,
        license,
        source_url,
        source_url_key: None,
        release_date,
        status: score_models::PackageStatus::Ok,
        dependencies,
    })
}

/// `repository` is either a bare string or `{type, url}` (spec.md §4.B npm).
fn repository_url(repository: Option<&serde_json::Value>) -> Option<String> {
    match repository? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(map) => map.get("url").and_then(|v| v.as_str()).map(ToString::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_url_handles_object_form() {
        let value = serde_json::json!({"type": "git", "url": "git+https://github.com/psf/requests.git"});
        assert_eq!(repository_url(Some(&value)), Some("git+https://github.com/psf/requests.git".to_string()));
    }

    #[test]
    fn repository_url_handles_string_form() {
        let value = serde_json::json!("https://github.com/psf/requests");
        assert_eq!(repository_url(Some(&value)), Some("https://github.com/psf/requests".to_string()));
    }
}
