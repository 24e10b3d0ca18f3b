//! The conda registry fetcher (spec.md §4.B). `name` is `"{channel}/{pkg}"`.

use chrono::{DateTime, Utc};
use reqwest_middleware::ClientWithMiddleware;
use score_models::Package;
use serde::Deserialize;

use crate::deps::conda_deps;
use crate::{normalize_package_source_url, FetchError};

#[derive(Debug, Deserialize)]
struct CondaResponse {
    license: Option<String>,
    dev_url: Option<String>,
    source_git_url: Option<String>,
    latest_version: Option<String>,
    modified_at: Option<String>,
    #[serde(default)]
    files: Vec<CondaFile>,
}

#[derive(Debug, Deserialize)]
struct CondaFile {
    version: Option<String>,
    #[serde(default)]
    attrs: CondaFileAttrs,
}

#[derive(Debug, Default, Deserialize)]
struct CondaFileAttrs {
    #[serde(default)]
    depends: Vec<String>,
}

/// `GET https://api.anaconda.org/package/{channel}/{pkg}` (spec.md §4.B).
pub async fn fetch(client: &ClientWithMiddleware, name: &str) -> Result<Package, FetchError> {
    let Some((channel, package)) = name.split_once('/') else {
        return Err(FetchError::InvalidName { name: name.to_string() });
    };

    let url = format!("https://api.anaconda.org/package/{channel}/{package}");
    let response = client.get(&url).send().await?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(Package::not_found("conda", name));
    }

    let response = response.error_for_status()?;
    let body: CondaResponse = response.json().await?;

    let source_url = body
        .dev_url
        .or(body.source_git_url)
        .and_then(|raw| normalize_package_source_url(&raw));

    let release_date = body.modified_at.as_deref().and_then(|raw| {
        DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc))
    });

    // "Dependencies derived from depends strings on files of the current
    // version" (spec.md §4.B conda) — a version can have several files (one
    // per platform/build), so every matching file's `depends` contributes.
    let dependencies = body
        .latest_version
        .as_deref()
        .map(|version| {
            body.files
                .iter()
                .filter(|f| f.version.as_deref() == Some(version))
                .flat_map(|f| conda_deps(channel, &f.attrs.depends))
                .collect()
        })
        .unwrap_or_default();

    Ok(Package {
        name: name.to_string(),
        ecosystem: "conda".to_string(),
        version: body.latest_version,
        license: body.license,
        source_url,
        source_url_key: None,
        release_date,
        status: score_models::PackageStatus::Ok,
        dependencies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_name_without_channel_separator() {
        let client = score_client::build_client("test-agent");
        let result = fetch(&client, "numpy").await;
        assert!(matches!(result, Err(FetchError::InvalidName { .. })));
    }
}
