//! Wires the six core components (spec.md §2) into the one request-scoped
//! pipeline every HTTP handler and CLI subcommand calls into:
//! `(ecosystem, name) -> Package -> Source? -> Vulnerabilities -> Score`.
//!
//! This is the only place in the workspace that knows about all of A–F at
//! once; every component it calls remains independently testable and
//! ignorant of the others.

use std::time::Duration;

use chrono::Utc;
use score_cache::{Cache, CacheLookup, PACKAGE_TTL, SOURCE_TTL, VULN_TTL};
use score_fetchers::{FetchError, Fetcher, RegistryFetcher};
use score_license::NullSpdxMatcher;
use score_models::{Package, PackageStatus, Score, Source, Vulnerabilities};
use score_notes::Note;

/// The three ecosystems this system scores (spec.md §2, GLOSSARY).
pub const ECOSYSTEMS: &[&str] = &["pypi", "npm", "conda"];

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("unrecognized ecosystem {0:?}")]
    UnknownEcosystem(String),
    #[error("conda package names must be \"{{channel}}/{{pkg}}\", got {0:?}")]
    MalformedCondaName(String),
    #[error("registry fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("cache I/O failed: {0}")]
    Cache(#[from] std::io::Error),
}

/// Header-contract metadata for one cache lookup (spec.md §4.A, §6):
/// `{component}-cache-file` and `{component}-cache-hit`.
#[derive(Debug, Clone)]
pub struct CacheHeader {
    pub cache_file: String,
    pub cache_hit: bool,
}

impl<T> From<&CacheLookup<T>> for CacheHeader {
    fn from(lookup: &CacheLookup<T>) -> Self {
        CacheHeader { cache_file: lookup.cache_file.clone(), cache_hit: lookup.cache_hit }
    }
}

/// Everything one `/score` request needs to answer both the JSON body and
/// the cache observability headers (spec.md §6).
pub struct PipelineResult {
    pub package: Package,
    pub source: Option<Source>,
    pub vulnerabilities: Option<Vulnerabilities>,
    pub score: Score,
    pub package_cache: CacheHeader,
    pub git_cache: Option<CacheHeader>,
    pub vuln_cache: Option<CacheHeader>,
}

/// Holds the shared, request-independent collaborators: the cache and the
/// outbound HTTP client. One instance is built at startup and shared
/// across every request (spec.md §5: "the cache is the only shared mutable
/// resource").
#[derive(Clone)]
pub struct Pipeline {
    cache: Cache,
    client: reqwest_middleware::ClientWithMiddleware,
    clone_timeout: Duration,
}

impl Pipeline {
    #[must_use]
    pub fn new(cache: Cache, client: reqwest_middleware::ClientWithMiddleware) -> Self {
        Pipeline { cache, client, clone_timeout: score_git::MAX_CLONE_TIME }
    }

    /// Override the clone hard-timeout (spec.md §6 `MAX_CLONE_TIME`),
    /// defaulting to [`score_git::MAX_CLONE_TIME`] otherwise.
    #[must_use]
    pub fn with_clone_timeout(mut self, clone_timeout: Duration) -> Self {
        self.clone_timeout = clone_timeout;
        self
    }

    fn validate(ecosystem: &str, name: &str) -> Result<(), PipelineError> {
        if !ECOSYSTEMS.contains(&ecosystem) {
            return Err(PipelineError::UnknownEcosystem(ecosystem.to_string()));
        }
        if ecosystem == "conda" && !name.contains('/') {
            return Err(PipelineError::MalformedCondaName(name.to_string()));
        }
        Ok(())
    }

    /// Fetch (cache-wrapped) just the [`Package`] for `/pkg/{ecosystem}/{name}`.
    pub async fn package(
        &self,
        ecosystem: &str,
        name: &str,
        invalidate_cache: bool,
    ) -> Result<(Package, CacheHeader), PipelineError> {
        Self::validate(ecosystem, name)?;
        self.fetch_package(ecosystem, name, invalidate_cache).await
    }

    /// Ingest (cache-wrapped) just the [`Source`] for `/source/git/{url}`.
    pub async fn source(&self, source_url: &str, invalidate_cache: bool) -> (Source, CacheHeader) {
        self.fetch_source(source_url, invalidate_cache).await
    }

    /// The full `(ecosystem, name) -> Score` pipeline for `/score/{ecosystem}/{name}`
    /// (spec.md §2's control flow).
    pub async fn run(
        &self,
        ecosystem: &str,
        name: &str,
        source_url_override: Option<&str>,
        invalidate_cache: bool,
    ) -> Result<PipelineResult, PipelineError> {
        Self::validate(ecosystem, name)?;

        let (package, package_cache) = self.fetch_package(ecosystem, name, invalidate_cache).await?;

        let source_url = source_url_override.map(str::to_string).or_else(|| package.source_url.clone());

        // Git ingestion and the vulnerability query are independent once
        // the package is known, so they run concurrently (spec.md §5).
        let source_fut = async {
            match &source_url {
                Some(url) => {
                    let (source, header) = self.fetch_source(url, invalidate_cache).await;
                    (Some(source), Some(header))
                }
                None => (None, None),
            }
        };
        let vuln_fut = self.fetch_vulnerabilities(ecosystem, name, invalidate_cache);

        let ((source, git_cache), (vulnerabilities, vuln_cache)) = futures::join!(source_fut, vuln_fut);

        let score = score_rules::score(&package, source.as_ref(), Some(&vulnerabilities), Utc::now());

        Ok(PipelineResult {
            package,
            source,
            vulnerabilities: Some(vulnerabilities),
            score,
            package_cache,
            git_cache,
            vuln_cache: Some(vuln_cache),
        })
    }

    async fn fetch_package(
        &self,
        ecosystem: &str,
        name: &str,
        invalidate: bool,
    ) -> Result<(Package, CacheHeader), PipelineError> {
        let entry = self.cache.package_entry(ecosystem, name);
        let lookup: CacheLookup<Package> = self.cache.get(&entry, PACKAGE_TTL, invalidate)?;
        let header = CacheHeader::from(&lookup);

        if let Some(package) = lookup.value {
            return Ok((package, header));
        }

        let fetcher = RegistryFetcher::new(self.client.clone(), ecosystem);
        let package = fetcher.fetch(name).await?;
        self.cache.put(&entry, &package)?;
        Ok((package, header))
    }

    async fn fetch_source(&self, source_url: &str, invalidate: bool) -> (Source, CacheHeader) {
        let entry = self.cache.git_entry(source_url);
        let lookup: CacheLookup<Source> = match self.cache.get(&entry, SOURCE_TTL, invalidate) {
            Ok(lookup) => lookup,
            Err(_) => CacheLookup { value: None, cache_file: entry.key().to_string(), cache_hit: false },
        };
        let header = CacheHeader::from(&lookup);

        if let Some(source) = lookup.value {
            return (source, header);
        }

        let source = score_git::ingest(source_url, &NullSpdxMatcher, self.clone_timeout).await;
        let _ = self.cache.put(&entry, &source);
        (source, header)
    }

    async fn fetch_vulnerabilities(&self, ecosystem: &str, name: &str, invalidate: bool) -> (Vulnerabilities, CacheHeader) {
        let entry = self.cache.vuln_entry(ecosystem, name);
        let lookup: CacheLookup<Vulnerabilities> = match self.cache.get(&entry, VULN_TTL, invalidate) {
            Ok(lookup) => lookup,
            Err(_) => CacheLookup { value: None, cache_file: entry.key().to_string(), cache_hit: false },
        };
        let header = CacheHeader::from(&lookup);

        if let Some(vulnerabilities) = lookup.value {
            return (vulnerabilities, header);
        }

        let vulnerabilities = score_vuln::fetch(&self.client, ecosystem, name).await;
        // spec.md §7.3: raw transient failures aren't cached, only
        // structured ones — here, any non-error (possibly empty) result is
        // a structured success, so only a clean result is persisted.
        if vulnerabilities.error.is_none() {
            let _ = self.cache.put(&entry, &vulnerabilities);
        }
        (vulnerabilities, header)
    }
}

/// The special-case score for a package the registry never heard of or
/// whose declared repository couldn't be found, without running the full
/// pipeline (used by the CLI's `pkg`/`source` subcommands, which only need
/// one leg of the pipeline).
#[must_use]
pub fn no_source_note(package: &Package) -> Note {
    match package.status {
        PackageStatus::NotFound => Note::NotOpenSource,
        PackageStatus::Ok => Note::NoSourceRepoNotFound,
    }
}

/// How long the HTTP server waits for a single request before giving up
/// server-side (spec.md §5: "cancellation-aware so a client disconnect
/// aborts in-flight I/O within request-timeout bounds").
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_ecosystem() {
        let err = Pipeline::validate("pip", "requests").unwrap_err();
        assert!(matches!(err, PipelineError::UnknownEcosystem(e) if e == "pip"));
    }

    #[test]
    fn rejects_conda_name_without_channel() {
        let err = Pipeline::validate("conda", "numpy").unwrap_err();
        assert!(matches!(err, PipelineError::MalformedCondaName(n) if n == "numpy"));
    }

    #[test]
    fn accepts_well_formed_names() {
        assert!(Pipeline::validate("pypi", "requests").is_ok());
        assert!(Pipeline::validate("npm", "left-pad").is_ok());
        assert!(Pipeline::validate("conda", "conda-forge/numpy").is_ok());
    }
}
