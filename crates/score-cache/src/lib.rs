//! The cache abstraction shared by every component that fetches data from
//! the network or from a cloned repository (spec.md §4.A): a single
//! `Get(key, ttl)` / `Put(key, value)` interface over hierarchical,
//! mtime-freshness keys.
//!
//! Grounded in the cache bucket / cache entry layout of a package manager's
//! on-disk artifact cache: buckets are subdirectories, entries are files
//! named by key, freshness is read off the file's own mtime rather than a
//! side index.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fs_err as fs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

pub use crate::timestamp::Timestamp;

mod timestamp;

/// Cache bucket for deserialized [`score_models::Package`]s. `packages/{ecosystem}/{name}`.
pub const PACKAGE_TTL: Duration = Duration::from_secs(60 * 60 * 24);
/// Cache bucket for deserialized [`score_models::Source`]s. `git/{url_encoded_source_url}`.
pub const SOURCE_TTL: Duration = Duration::from_secs(60 * 60 * 24);
/// Cache bucket for deserialized [`score_models::Vulnerabilities`]. `vuln/{ecosystem}/{name}`.
pub const VULN_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// The three kinds of data this service caches, each its own subdirectory
/// of the cache root (spec.md §4.A).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheBucket {
    Packages,
    Git,
    Vuln,
}

impl CacheBucket {
    #[must_use]
    pub fn to_str(self) -> &'static str {
        match self {
            CacheBucket::Packages => "packages",
            CacheBucket::Git => "git",
            CacheBucket::Vuln => "vuln",
        }
    }

    /// The response-header prefix for this bucket's observability contract,
    /// e.g. `package-cache-hit` (spec.md §4.A, §6).
    #[must_use]
    pub fn header_component(self) -> &'static str {
        match self {
            CacheBucket::Packages => "package",
            CacheBucket::Git => "git",
            CacheBucket::Vuln => "vuln",
        }
    }
}

/// A single file in the cache, addressed by a hierarchical key.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    bucket: CacheBucket,
    key: String,
    path: PathBuf,
}

impl CacheEntry {
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Whether a cache entry is usable as-is, present but past its TTL, or
/// absent (spec.md §4.A).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
    Missing,
}

impl Freshness {
    #[must_use]
    pub const fn is_fresh(self) -> bool {
        matches!(self, Freshness::Fresh)
    }
}

/// The outcome of a [`Cache::get`] call: the deserialized value (if the
/// entry was fresh and well-formed) plus the header-contract fields the
/// caller must surface (spec.md §4.A: `{component}-cache-file`,
/// `{component}-cache-hit`).
#[derive(Debug, Clone)]
pub struct CacheLookup<T> {
    pub value: Option<T>,
    pub cache_file: String,
    pub cache_hit: bool,
}

/// The on-disk, filesystem-backed cache. One instance is shared across all
/// requests.
#[derive(Debug, Clone)]
pub struct Cache {
    root: PathBuf,
}

impl Cache {
    /// Open (creating if necessary) a persistent cache rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        Self::init(&root)?;
        Ok(Cache { root })
    }

    /// A cache rooted in a fresh temporary directory, torn down when the
    /// returned [`tempfile::TempDir`] is dropped. Used by tests and by the
    /// `--no-cache` CLI flag.
    pub fn temp() -> io::Result<(Self, tempfile::TempDir)> {
        let dir = tempfile::tempdir()?;
        let cache = Cache::new(dir.path())?;
        Ok((cache, dir))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn init(root: &Path) -> io::Result<()> {
        fs::create_dir_all(root)?;

        // CACHEDIR.TAG lets backup tools and `du`-style scanners skip this
        // directory; same convention a package manager's artifact cache uses.
        let tag_path = root.join("CACHEDIR.TAG");
        if !tag_path.exists() {
            fs::write(
                &tag_path,
                "Signature: 8a477f597d28d172789f06886806bc55\n\
                 # This file is a cache directory tag created by opensourcescore.\n\
                 # For information about cache directory tags see https://bford.info/cachedir/\n",
            )?;
        }

        let gitignore_path = root.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, "*\n")?;
        }

        Ok(())
    }

    /// Build the [`CacheEntry`] for `key` within `bucket`. Keys are joined
    /// as path segments and stored as `{bucket}/{key}.json`.
    #[must_use]
    pub fn entry(&self, bucket: CacheBucket, key: &str) -> CacheEntry {
        let path = self.root.join(bucket.to_str()).join(format!("{key}.json"));
        CacheEntry { bucket, key: key.to_string(), path }
    }

    /// Cache key for a registry package: `packages/{ecosystem}/{name}`.
    #[must_use]
    pub fn package_entry(&self, ecosystem: &str, name: &str) -> CacheEntry {
        self.entry(CacheBucket::Packages, &format!("{ecosystem}/{name}"))
    }

    /// Cache key for an ingested repository: `git/{url_encoded_source_url}`.
    #[must_use]
    pub fn git_entry(&self, source_url: &str) -> CacheEntry {
        self.entry(CacheBucket::Git, &urlencoding::encode(source_url))
    }

    /// Cache key for a vulnerability query: `vuln/{ecosystem}/{name}`.
    #[must_use]
    pub fn vuln_entry(&self, ecosystem: &str, name: &str) -> CacheEntry {
        self.entry(CacheBucket::Vuln, &format!("{ecosystem}/{name}"))
    }

    /// `Fresh` iff the entry exists and `now - mtime <= ttl`; `Missing` iff
    /// it doesn't exist at all; `Stale` otherwise (spec.md §4.A).
    pub fn freshness(&self, entry: &CacheEntry, ttl: Duration) -> io::Result<Freshness> {
        match fs::metadata(entry.path()) {
            Ok(metadata) => {
                let age = Timestamp::from_metadata(&metadata).age(Timestamp::now());
                if age <= ttl {
                    Ok(Freshness::Fresh)
                } else {
                    Ok(Freshness::Stale)
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Freshness::Missing),
            Err(err) => Err(err),
        }
    }

    /// Read `entry` and deserialize it as `T`, honoring `ttl` and
    /// `invalidate`. A deserialization failure is treated as a miss, never
    /// as an error — a stale schema must not take down the pipeline
    /// (spec.md §4.A).
    pub fn get<T: DeserializeOwned>(
        &self,
        entry: &CacheEntry,
        ttl: Duration,
        invalidate: bool,
    ) -> io::Result<CacheLookup<T>> {
        let cache_file = entry.key().to_string();

        if invalidate {
            return Ok(CacheLookup { value: None, cache_file, cache_hit: false });
        }

        let freshness = self.freshness(entry, ttl)?;
        if !freshness.is_fresh() {
            return Ok(CacheLookup { value: None, cache_file, cache_hit: false });
        }

        match fs::read(entry.path()) {
            Ok(bytes) => match serde_json::from_slice::<T>(&bytes) {
                Ok(value) => {
                    debug!(key = entry.key(), "cache hit");
                    Ok(CacheLookup { value: Some(value), cache_file, cache_hit: true })
                }
                Err(err) => {
                    debug!(key = entry.key(), %err, "cache entry failed to deserialize, treating as miss");
                    Ok(CacheLookup { value: None, cache_file, cache_hit: false })
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Ok(CacheLookup { value: None, cache_file, cache_hit: false })
            }
            Err(err) => Err(err),
        }
    }

    /// Serialize `value` and write it to `entry`, creating parent
    /// directories as needed.
    pub fn put<T: Serialize>(&self, entry: &CacheEntry, value: &T) -> io::Result<()> {
        if let Some(parent) = entry.path().parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec(value)?;
        fs::write(entry.path(), bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Dummy {
        value: u32,
    }

    #[test]
    fn miss_when_absent() {
        let (cache, _dir) = Cache::temp().unwrap();
        let entry = cache.package_entry("pypi", "requests");
        let result: CacheLookup<Dummy> = cache.get(&entry, PACKAGE_TTL, false).unwrap();
        assert!(result.value.is_none());
        assert!(!result.cache_hit);
        assert_eq!(result.cache_file, "pypi/requests");
    }

    #[test]
    fn hit_after_put() {
        let (cache, _dir) = Cache::temp().unwrap();
        let entry = cache.package_entry("pypi", "requests");
        cache.put(&entry, &Dummy { value: 42 }).unwrap();
        let result: CacheLookup<Dummy> = cache.get(&entry, PACKAGE_TTL, false).unwrap();
        assert_eq!(result.value, Some(Dummy { value: 42 }));
        assert!(result.cache_hit);
    }

    #[test]
    fn invalidate_forces_miss_even_when_fresh() {
        let (cache, _dir) = Cache::temp().unwrap();
        let entry = cache.package_entry("pypi", "requests");
        cache.put(&entry, &Dummy { value: 42 }).unwrap();
        let result: CacheLookup<Dummy> = cache.get(&entry, PACKAGE_TTL, true).unwrap();
        assert!(result.value.is_none());
        assert!(!result.cache_hit);
    }

    #[test]
    fn corrupt_entry_is_a_miss_not_an_error() {
        let (cache, _dir) = Cache::temp().unwrap();
        let entry = cache.package_entry("pypi", "requests");
        fs::create_dir_all(entry.path().parent().unwrap()).unwrap();
        fs::write(entry.path(), b"not json").unwrap();
        let result: CacheLookup<Dummy> = cache.get(&entry, PACKAGE_TTL, false).unwrap();
        assert!(result.value.is_none());
        assert!(!result.cache_hit);
    }

    #[test]
    fn zero_ttl_is_always_stale() {
        let (cache, _dir) = Cache::temp().unwrap();
        let entry = cache.package_entry("pypi", "requests");
        cache.put(&entry, &Dummy { value: 1 }).unwrap();
        let result: CacheLookup<Dummy> = cache.get(&entry, Duration::ZERO, false).unwrap();
        assert!(result.value.is_none());
    }

    #[test]
    fn git_key_url_encodes_the_source_url() {
        let (cache, _dir) = Cache::temp().unwrap();
        let entry = cache.git_entry("https://github.com/psf/requests");
        assert!(!entry.key().contains("://"));
        assert_eq!(entry.bucket, CacheBucket::Git);
    }
}
