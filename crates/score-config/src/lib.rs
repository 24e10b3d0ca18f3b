//! Environment-driven configuration (spec.md §6 "Environment"): where the
//! cache lives, where batch-build output goes, how long a clone is allowed
//! to run, and how many workers the offline partition path spawns.
//!
//! Grounded in the teacher's `uv-cache::CacheArgs` split between
//! CLI-overridable fields and environment defaults: every field here has an
//! environment variable as its source of truth, with [`Config::from_env`]
//! doing the one-time read at process startup.

use std::env;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

/// Where the read-through cache (spec.md §4.A) persists its entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLocation {
    /// `CACHE_LOCATION=0` disables caching: every lookup is a miss, nothing
    /// is ever written.
    Disabled,
    /// A `file://` URL (or a bare path) naming the on-disk cache root.
    Path(PathBuf),
}

/// Default clone timeout (spec.md §4.D.2 `MAX_CLONE_TIME`), overridable by
/// the `MAX_CLONE_TIME` environment variable (seconds).
pub const DEFAULT_MAX_CLONE_TIME: Duration = Duration::from_secs(30);

/// Default offline batch-partition worker count (spec.md §5).
pub const DEFAULT_WORKER_POOL_SIZE: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is set to {value:?}, which is not a valid duration in seconds")]
    InvalidDuration { var: &'static str, value: String },
    #[error("{var} is set to {value:?}, which is not a positive integer")]
    InvalidWorkerCount { var: &'static str, value: String },
}

/// Process-wide configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub cache_location: CacheLocation,
    pub output_root: PathBuf,
    pub max_clone_time: Duration,
    pub worker_pool_size: NonZeroUsize,
}

impl Config {
    /// Read every setting from its environment variable, falling back to
    /// the documented default when unset (spec.md §6).
    pub fn from_env() -> Result<Self, ConfigError> {
        let cache_location = match env::var("CACHE_LOCATION") {
            Ok(value) if value == "0" => CacheLocation::Disabled,
            Ok(value) => CacheLocation::Path(parse_cache_location(&value)),
            Err(_) => CacheLocation::Path(default_cache_root()),
        };

        let output_root = env::var("OUTPUT_ROOT").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("./output"));

        let max_clone_time = match env::var("MAX_CLONE_TIME") {
            Ok(value) => {
                let seconds: u64 = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidDuration { var: "MAX_CLONE_TIME", value: value.clone() })?;
                Duration::from_secs(seconds)
            }
            Err(_) => DEFAULT_MAX_CLONE_TIME,
        };

        let worker_pool_size = match env::var("SCORE_WORKER_POOL_SIZE") {
            Ok(value) => {
                let count: usize = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidWorkerCount { var: "SCORE_WORKER_POOL_SIZE", value: value.clone() })?;
                NonZeroUsize::new(count)
                    .ok_or(ConfigError::InvalidWorkerCount { var: "SCORE_WORKER_POOL_SIZE", value })?
            }
            Err(_) => NonZeroUsize::new(DEFAULT_WORKER_POOL_SIZE).expect("16 is nonzero"),
        };

        Ok(Config { cache_location, output_root, max_clone_time, worker_pool_size })
    }
}

/// `file:///abs/path` or a bare path both resolve to the same [`PathBuf`];
/// other schemes (an eventual object-store backend) are out of scope for
/// the filesystem cache this crate wires up (spec.md §4.A: "storage ...
/// is pluggable").
fn parse_cache_location(raw: &str) -> PathBuf {
    raw.strip_prefix("file://").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(raw))
}

fn default_cache_root() -> PathBuf {
    PathBuf::from(".cache/opensourcescore")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_marker_is_recognized() {
        assert_eq!(
            match "0" {
                "0" => CacheLocation::Disabled,
                other => CacheLocation::Path(parse_cache_location(other)),
            },
            CacheLocation::Disabled
        );
    }

    #[test]
    fn file_url_strips_scheme() {
        assert_eq!(parse_cache_location("file:///var/cache/score"), PathBuf::from("/var/cache/score"));
    }

    #[test]
    fn bare_path_passes_through() {
        assert_eq!(parse_cache_location("/var/cache/score"), PathBuf::from("/var/cache/score"));
    }
}
