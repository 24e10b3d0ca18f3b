//! The HTTP framing layer (spec.md §6): a thin axum router translating the
//! four documented endpoints into [`crate::pipeline::Pipeline`] calls.
//!
//! Framing itself — routing, status codes, the error envelope, request
//! IDs — is explicitly out of CORE's scope (spec.md Non-goals), so this
//! module stays a dumb adapter: every real decision lives in `pipeline` or
//! `score-rules`.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use score_cache::{PACKAGE_TTL, SOURCE_TTL, VULN_TTL};
use score_models::{Package, PackageStatus, Score, Source, Vulnerabilities};
use score_notes::{Note, ScoreGroup};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::error;
use uuid::Uuid;

use crate::pipeline::{CacheHeader, Pipeline, PipelineError};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

/// Build the router (spec.md §6 endpoint table).
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/pkg/:ecosystem/*name", get(get_package))
        .route("/score/:ecosystem/*name", get(get_score))
        .route("/source/git/*source_url", get(get_source))
        .route("/notes/categories", get(get_note_categories))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct InvalidateQuery {
    #[serde(default)]
    invalidate_cache: bool,
    source_url: Option<String>,
}

async fn get_package(
    State(state): State<AppState>,
    Path((ecosystem, name)): Path<(String, String)>,
    Query(query): Query<InvalidateQuery>,
) -> Response {
    match state.pipeline.package(&ecosystem, &name, query.invalidate_cache).await {
        Ok((package, cache)) => {
            let response = with_cache_headers(Json(package).into_response(), "package", &cache);
            with_cache_control(response, PACKAGE_TTL)
        }
        Err(err) => error_response(&err),
    }
}

async fn get_source(
    State(state): State<AppState>,
    Path(source_url): Path<String>,
    Query(query): Query<InvalidateQuery>,
) -> Response {
    let (source, cache) = state.pipeline.source(&source_url, query.invalidate_cache).await;
    let response = with_cache_headers(Json(source).into_response(), "git", &cache);
    with_cache_control(response, SOURCE_TTL)
}

/// The full `/score` response body (spec.md §6): the triple of evidence the
/// pipeline gathered alongside the assembled [`Score`], not the score alone.
#[derive(Debug, Serialize)]
struct ScoreResponse<'a> {
    ecosystem: &'a str,
    package_name: &'a str,
    package: &'a Package,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: &'a Option<Source>,
    score: &'a Score,
    status: PackageStatus,
    vulnerabilities: &'a Vulnerabilities,
}

async fn get_score(
    State(state): State<AppState>,
    Path((ecosystem, name)): Path<(String, String)>,
    Query(query): Query<InvalidateQuery>,
) -> Response {
    match state
        .pipeline
        .run(&ecosystem, &name, query.source_url.as_deref(), query.invalidate_cache)
        .await
    {
        Ok(result) => {
            let body = ScoreResponse {
                ecosystem: &ecosystem,
                package_name: &name,
                status: result.package.status,
                package: &result.package,
                source: &result.source,
                score: &result.score,
                vulnerabilities: result.vulnerabilities.as_ref().unwrap_or(&EMPTY_VULNERABILITIES),
            };
            let mut response = Json(&body).into_response();
            let headers = response.headers_mut();
            apply_cache_headers(headers, "package", &result.package_cache);
            if let Some(git_cache) = &result.git_cache {
                apply_cache_headers(headers, "git", git_cache);
            }
            if let Some(vuln_cache) = &result.vuln_cache {
                apply_cache_headers(headers, "vuln", vuln_cache);
            }
            // The score response depends on all three evidence streams, so
            // its freshness guarantee is the shortest of their TTLs
            // (spec.md §6: "Cache-control: max-age={TTL}").
            let ttl = PACKAGE_TTL.min(SOURCE_TTL).min(VULN_TTL);
            with_cache_control(response, ttl)
        }
        Err(err) => error_response(&err),
    }
}

const EMPTY_VULNERABILITIES: Vulnerabilities = Vulnerabilities { error: None, vulns: Vec::new() };

#[derive(Debug, Serialize)]
struct NoteDescr {
    group: &'static str,
    category: &'static str,
    description: &'static str,
}

/// `GET /notes/categories` (spec.md §6): `{notes: {code -> NoteDescr},
/// categories: [...], groups: [...]}` — the full catalog plus the two
/// enumerations it's built from, so a downstream consumer doesn't need to
/// hardcode note codes, categories, or groups.
#[derive(Debug, Serialize)]
struct NoteCategoriesResponse {
    notes: std::collections::BTreeMap<&'static str, NoteDescr>,
    categories: Vec<&'static str>,
    groups: Vec<&'static str>,
}

async fn get_note_categories() -> Json<NoteCategoriesResponse> {
    let notes = Note::ALL
        .iter()
        .map(|note| {
            (
                note.code(),
                NoteDescr {
                    group: group_str(note),
                    category: note.category().as_str(),
                    description: note.description(),
                },
            )
        })
        .collect();
    Json(NoteCategoriesResponse {
        notes,
        categories: score_notes::ScoreCategory::ALL.iter().map(|c| c.as_str()).collect(),
        groups: vec!["Any", "Health", "Legal", "Maturity", "Security"],
    })
}

fn group_str(note: &Note) -> &'static str {
    match note.group() {
        ScoreGroup::Any => "Any",
        ScoreGroup::Health => "Health",
        ScoreGroup::Legal => "Legal",
        ScoreGroup::Maturity => "Maturity",
        ScoreGroup::Security => "Security",
    }
}

fn with_cache_headers(mut response: Response, component: &str, cache: &CacheHeader) -> Response {
    apply_cache_headers(response.headers_mut(), component, cache);
    response
}

/// `Cache-control: max-age={TTL}, public` on every response (spec.md §6).
fn with_cache_control(mut response: Response, ttl: std::time::Duration) -> Response {
    if let Ok(value) = HeaderValue::try_from(format!("max-age={}, public", ttl.as_secs())) {
        response.headers_mut().insert(axum::http::header::CACHE_CONTROL, value);
    }
    response
}

fn apply_cache_headers(headers: &mut HeaderMap, component: &str, cache: &CacheHeader) {
    if let Ok(name) = HeaderName::try_from(format!("{component}-cache-file")) {
        if let Ok(value) = HeaderValue::try_from(cache.cache_file.clone()) {
            headers.insert(name, value);
        }
    }
    if let Ok(name) = HeaderName::try_from(format!("{component}-cache-hit")) {
        headers.insert(name, HeaderValue::from_static(if cache.cache_hit { "true" } else { "false" }));
    }
}

/// `{detail, error}` for a client mistake (bad ecosystem, malformed conda
/// name); `{detail, reference_id}` for anything that indicates a bug in
/// this service (spec.md §6/§7 error envelope).
fn error_response(err: &PipelineError) -> Response {
    match err {
        PipelineError::UnknownEcosystem(ecosystem) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": format!("unrecognized ecosystem {ecosystem:?}"), "error": "unknown_ecosystem" })),
        )
            .into_response(),
        PipelineError::MalformedCondaName(name) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": format!("malformed conda package name {name:?}"), "error": "malformed_name" })),
        )
            .into_response(),
        PipelineError::Fetch(_) | PipelineError::Cache(_) => {
            let reference_id = Uuid::new_v4();
            error!(%reference_id, %err, "unhandled pipeline error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": "internal error", "reference_id": reference_id.to_string() })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_for_unknown_ecosystem_is_404() {
        let response = error_response(&PipelineError::UnknownEcosystem("pip".to_string()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn error_response_for_malformed_conda_name_is_404() {
        let response = error_response(&PipelineError::MalformedCondaName("numpy".to_string()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
