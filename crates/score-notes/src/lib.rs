//! The note catalog: a data-driven enum of every observation the scoring
//! pipeline can emit, generated at build time from `notes.csv` (spec.md §6,
//! §9). `notes.csv` is the contract; this crate only adds typed accessors
//! and the severity ordering used to assemble a [`ScoreCategory`] per
//! sub-score.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

include!(concat!(env!("OUT_DIR"), "/notes_generated.rs"));

/// Which sub-score(s) a note contributes to (spec.md §3 invariants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreGroup {
    /// Contributes to every sub-score.
    Any,
    Health,
    Legal,
    Maturity,
    Security,
}

impl ScoreGroup {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreGroup::Any => "Any",
            ScoreGroup::Health => "Health",
            ScoreGroup::Legal => "Legal",
            ScoreGroup::Maturity => "Maturity",
            ScoreGroup::Security => "Security",
        }
    }
}

impl fmt::Display for ScoreGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ten severity categories a sub-score can take, in ascending severity
/// order (spec.md §4.F.6). `Ord` follows this order so that assembling a
/// sub-score is a running `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScoreCategory {
    Healthy,
    Mature,
    CautionNeeded,
    ModerateRisk,
    HighRisk,
    Experimental,
    Stale,
    Legacy,
    Unknown,
    Placeholder,
}

impl ScoreCategory {
    /// All ten categories in ascending severity order.
    pub const ALL: [ScoreCategory; 10] = [
        ScoreCategory::Healthy,
        ScoreCategory::Mature,
        ScoreCategory::CautionNeeded,
        ScoreCategory::ModerateRisk,
        ScoreCategory::HighRisk,
        ScoreCategory::Experimental,
        ScoreCategory::Stale,
        ScoreCategory::Legacy,
        ScoreCategory::Unknown,
        ScoreCategory::Placeholder,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreCategory::Healthy => "Healthy",
            ScoreCategory::Mature => "Mature",
            ScoreCategory::CautionNeeded => "Caution Needed",
            ScoreCategory::ModerateRisk => "Moderate Risk",
            ScoreCategory::HighRisk => "High Risk",
            ScoreCategory::Experimental => "Experimental",
            ScoreCategory::Stale => "Stale",
            ScoreCategory::Legacy => "Legacy",
            ScoreCategory::Unknown => "Unknown",
            ScoreCategory::Placeholder => "Placeholder",
        }
    }
}

impl fmt::Display for ScoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seed value a sub-score starts from before any note is applied
/// (spec.md §3 invariants: `Healthy` for legal/health/security, `Mature`
/// for maturity).
#[must_use]
pub fn seed_category(group: ScoreGroup) -> ScoreCategory {
    match group {
        ScoreGroup::Maturity => ScoreCategory::Mature,
        _ => ScoreCategory::Healthy,
    }
}

impl Note {
    /// `true` if this note contributes to sub-score `group` per spec.md §3:
    /// `Any`-grouped notes contribute everywhere, others only to their own.
    #[must_use]
    pub fn contributes_to(self, group: ScoreGroup) -> bool {
        matches!(self.group(), ScoreGroup::Any) || self.group() == group
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// Notes serialize as their bare code string everywhere they appear in the
// cache wire format and HTTP responses (spec.md §6: "note fields serialize
// as their `code` string").
impl Serialize for Note {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Note {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = String::deserialize(deserializer)?;
        Note::from_code(&code).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown note code in cache entry: {code}"))
        })
    }
}
