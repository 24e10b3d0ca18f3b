//! The Registry Fetchers (spec.md §4.B): three adapters sharing
//! `fetch(name) -> Package`, one per ecosystem.

mod conda;
mod deps;
pub mod license_kind;
mod npm;
mod pypi;

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use score_models::Package;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("unrecognized ecosystem {ecosystem:?}")]
    UnknownEcosystem { ecosystem: String },
    #[error("{name:?} is not a valid package name for this ecosystem")]
    InvalidName { name: String },
    #[error("registry request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),
    #[error("registry response was an error or could not be parsed: {0}")]
    Response(#[from] reqwest::Error),
}

/// One registry adapter (spec.md §4.B).
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, name: &str) -> Result<Package, FetchError>;
}

/// Dispatches to the right adapter by ecosystem string (`"pypi"`, `"npm"`,
/// `"conda"`).
pub struct RegistryFetcher {
    client: ClientWithMiddleware,
    ecosystem: String,
}

impl RegistryFetcher {
    #[must_use]
    pub fn new(client: ClientWithMiddleware, ecosystem: impl Into<String>) -> Self {
        RegistryFetcher { client, ecosystem: ecosystem.into() }
    }
}

#[async_trait]
impl Fetcher for RegistryFetcher {
    async fn fetch(&self, name: &str) -> Result<Package, FetchError> {
        match self.ecosystem.as_str() {
            "pypi" => pypi::fetch(&self.client, name).await,
            "npm" => npm::fetch(&self.client, name).await,
            "conda" => conda::fetch(&self.client, name).await,
            other => Err(FetchError::UnknownEcosystem { ecosystem: other.to_string() }),
        }
    }
}

/// Strip the git-specific prefixes npm's `repository.url` carries
/// (`git+`, `git://`, `git+ssh://git@`) before handing off to the shared
/// URL normalizer (spec.md §4.B npm, §4.D.1).
fn normalize_package_source_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let rewritten = if let Some(rest) = trimmed.strip_prefix("git+ssh://git@") {
        // Must be checked before the bare `git+` strip below, which would
        // otherwise consume this prefix first and leave `ssh://git@...`,
        // a form `rewrite_scp_syntax`/`Url::parse` doesn't understand.
        format!("git@{rest}")
    } else {
        let without_git_plus = trimmed.strip_prefix("git+").unwrap_or(trimmed);
        if let Some(rest) = without_git_plus.strip_prefix("git://") {
            format!("https://{rest}")
        } else {
            without_git_plus.to_string()
        }
    };

    score_git::url::normalize_source_url(&rewritten)
}
