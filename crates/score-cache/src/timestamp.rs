use std::fs::Metadata;
use std::time::{Duration, SystemTime};

/// A point in time derived from a file's modification time, compared against
/// wall-clock time to decide cache freshness (spec.md §4.A).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(SystemTime);

impl Timestamp {
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Self {
        Self(metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH))
    }

    #[must_use]
    pub fn now() -> Self {
        Self(SystemTime::now())
    }

    /// Age of this timestamp relative to `now`, saturating at zero if the
    /// file's mtime is somehow in the future.
    #[must_use]
    pub fn age(self, now: Timestamp) -> Duration {
        now.0.duration_since(self.0).unwrap_or(Duration::ZERO)
    }
}
