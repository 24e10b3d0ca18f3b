//! The Vulnerability Fetcher (spec.md §4.C): queries OSV for a package's
//! known vulnerabilities, deduplicates by id/alias, and extracts a CVSS
//! severity bucket for each.

mod cvss;

use chrono::{DateTime, Utc};
use reqwest_middleware::ClientWithMiddleware;
use rustc_hash::FxHashSet;
use score_models::{Severity, Vulnerabilities, Vulnerability};
use score_notes::Note;
use serde::{Deserialize, Serialize};

const OSV_API_URL: &str = "https://api.osv.dev/v1/query";

fn ecosystem_name(ecosystem: &str) -> Option<&'static str> {
    match ecosystem.to_lowercase().as_str() {
        "pypi" => Some("PyPI"),
        "npm" => Some("npm"),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
struct OsvQuery<'a> {
    package: OsvPackage<'a>,
}

#[derive(Debug, Serialize)]
struct OsvPackage<'a> {
    name: &'a str,
    ecosystem: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct OsvResponse {
    #[serde(default)]
    vulns: Vec<OsvVuln>,
}

#[derive(Debug, Deserialize)]
struct OsvVuln {
    id: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    severity: Vec<OsvSeverity>,
    published: Option<String>,
    modified: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OsvSeverity {
    #[serde(rename = "type")]
    severity_type: String,
    score: String,
}

/// Query OSV for `name` in `ecosystem` and return its deduplicated,
/// severity-bucketed vulnerability list (spec.md §4.C).
pub async fn fetch(client: &ClientWithMiddleware, ecosystem: &str, name: &str) -> Vulnerabilities {
    let Some(osv_ecosystem) = ecosystem_name(ecosystem) else {
        return Vulnerabilities::error(Note::VulnerabilitiesCheckFailed);
    };

    let query = OsvQuery { package: OsvPackage { name, ecosystem: osv_ecosystem } };
    let response = match client.post(OSV_API_URL).json(&query).send().await {
        Ok(response) => response,
        Err(_) => return Vulnerabilities::error(Note::VulnerabilitiesCheckFailed),
    };

    if response.status() != reqwest::StatusCode::OK {
        return Vulnerabilities::error(Note::VulnerabilitiesCheckFailed);
    }

    let body: OsvResponse = match response.json().await {
        Ok(body) => body,
        Err(_) => return Vulnerabilities::error(Note::VulnerabilitiesCheckFailed),
    };

    process_response(body)
}

/// Dedup-by-id/alias and severity-bucket every vuln in an OSV response
/// (spec.md §4.C.1-3), pulled out of [`fetch`] so it's testable without a
/// live HTTP call.
fn process_response(body: OsvResponse) -> Vulnerabilities {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut vulns = Vec::new();

    for vuln in body.vulns {
        let mut known_ids: Vec<&str> = vec![vuln.id.as_str()];
        known_ids.extend(vuln.aliases.iter().map(String::as_str));

        if known_ids.iter().any(|id| seen.contains(*id)) {
            continue;
        }
        for id in &known_ids {
            seen.insert((*id).to_string());
        }

        // spec.md §4.C.3: `published_on` is required ("raise if missing"),
        // matching the original scraper's `raise ValueError(...)` that
        // aborts the whole query rather than dropping just this entry.
        let Some(published_raw) = vuln.published.as_deref() else {
            tracing::error!(id = %vuln.id, "vulnerability missing required published date");
            return Vulnerabilities::error(Note::VulnerabilitiesCheckFailed);
        };
        let Some(published_on) = parse_osv_timestamp(published_raw) else {
            tracing::error!(id = %vuln.id, published = published_raw, "unparseable published date");
            return Vulnerabilities::error(Note::VulnerabilitiesCheckFailed);
        };

        let fixed_on = vuln.modified.as_deref().and_then(parse_osv_timestamp);
        let days_to_fix = fixed_on.map(|fixed| ((fixed - published_on).num_seconds() as f64 / 86400.0).floor() as i64);

        let (severity_num, severity) = extract_severity(&vuln.severity);

        vulns.push(Vulnerability {
            id: vuln.id,
            published_on,
            fixed_on,
            severity,
            severity_num,
            days_to_fix,
        });
    }

    Vulnerabilities { vulns, error: None }
}

fn parse_osv_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Scan `severity` in descending preference `CVSS_V4 > CVSS_V3 > CVSS_V2`
/// and compute the base score with the matching parser (spec.md §4.C.2).
fn extract_severity(severity: &[OsvSeverity]) -> (Option<f64>, Severity) {
    for wanted in ["CVSS_V4", "CVSS_V3", "CVSS_V2"] {
        let Some(entry) = severity.iter().find(|s| s.severity_type == wanted) else { continue };
        let score = match wanted {
            "CVSS_V4" => cvss::cvss4_base_score(&entry.score),
            "CVSS_V3" => cvss::cvss3_base_score(&entry.score),
            "CVSS_V2" => cvss::cvss2_base_score(&entry.score),
            _ => None,
        };
        if let Some(score) = score {
            return (Some(score), Severity::from_score(Some(score)));
        }
    }
    (None, Severity::from_score(None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unsupported_ecosystem_fails_immediately() {
        let client = score_client::build_client("test-agent");
        let result = fetch(&client, "conda", "numpy").await;
        assert_eq!(result.error, Some(Note::VulnerabilitiesCheckFailed));
        assert!(result.vulns.is_empty());
    }

    #[test]
    fn ecosystem_mapping_is_case_insensitive() {
        assert_eq!(ecosystem_name("PyPI"), Some("PyPI"));
        assert_eq!(ecosystem_name("npm"), Some("npm"));
        assert_eq!(ecosystem_name("conda"), None);
    }

    fn vuln_without_dates(id: &str) -> OsvVuln {
        OsvVuln { id: id.to_string(), aliases: Vec::new(), severity: Vec::new(), published: None, modified: None }
    }

    /// spec.md §4.C.3: `published_on` is required; a missing or unparseable
    /// date must fail the whole query rather than silently drop that one
    /// vulnerability and report a clean result.
    #[test]
    fn missing_published_date_fails_the_whole_query() {
        let body = OsvResponse { vulns: vec![vuln_without_dates("GHSA-missing-date")] };
        let result = process_response(body);
        assert_eq!(result.error, Some(Note::VulnerabilitiesCheckFailed));
        assert!(result.vulns.is_empty());
    }

    #[test]
    fn unparseable_published_date_fails_the_whole_query() {
        let mut vuln = vuln_without_dates("GHSA-bad-date");
        vuln.published = Some("not-a-date".to_string());
        let result = process_response(OsvResponse { vulns: vec![vuln] });
        assert_eq!(result.error, Some(Note::VulnerabilitiesCheckFailed));
    }

    #[test]
    fn well_formed_vuln_is_kept() {
        let mut vuln = vuln_without_dates("GHSA-ok");
        vuln.published = Some("2023-01-01T00:00:00Z".to_string());
        let result = process_response(OsvResponse { vulns: vec![vuln] });
        assert_eq!(result.error, None);
        assert_eq!(result.vulns.len(), 1);
    }

    #[test]
    fn prefers_cvss_v3_over_v2_when_both_present() {
        let severities = vec![
            OsvSeverity { severity_type: "CVSS_V2".to_string(), score: "AV:N/AC:L/Au:N/C:N/I:N/A:N".to_string() },
            OsvSeverity {
                severity_type: "CVSS_V3".to_string(),
                score: "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H".to_string(),
            },
        ];
        let (score, severity) = extract_severity(&severities);
        assert!(score.unwrap() > 9.0);
        assert_eq!(severity, Severity::Critical);
    }
}
