//! Static metadata about the bundled reference corpus: the canonical
//! text for each entry, which family (`kind`) it belongs to, and which
//! restriction tags it carries (spec.md §3, §4.E).

use score_models::Restriction;

/// One entry in the bundled reference corpus, embedded at compile time.
pub struct CorpusEntry {
    pub name: &'static str,
    pub text: &'static str,
}

/// The bundled reference license corpus (spec.md §4.E, §9: "bundle the
/// reference corpus as an embedded asset; load once into memory").
pub const CORPUS: &[CorpusEntry] = &[
    CorpusEntry { name: "MIT", text: include_str!("corpus/MIT") },
    CorpusEntry { name: "ISC", text: include_str!("corpus/ISC") },
    CorpusEntry { name: "Unlicense", text: include_str!("corpus/Unlicense") },
    CorpusEntry { name: "0BSD", text: include_str!("corpus/0BSD") },
    CorpusEntry { name: "BSD-2-Clause", text: include_str!("corpus/BSD-2-Clause") },
    CorpusEntry { name: "BSD-3-Clause", text: include_str!("corpus/BSD-3-Clause") },
    CorpusEntry { name: "Apache-2.0", text: include_str!("corpus/Apache-2.0") },
    CorpusEntry { name: "GPL-3.0", text: include_str!("corpus/GPL-3.0") },
    CorpusEntry { name: "LGPL-3.0", text: include_str!("corpus/LGPL-3.0") },
    CorpusEntry { name: "AGPL-3.0", text: include_str!("corpus/AGPL-3.0") },
    CorpusEntry { name: "MPL-2.0", text: include_str!("corpus/MPL-2.0") },
];

/// Map a canonical license name (SPDX id or bundled corpus entry name) to
/// its grouping family, e.g. `"Apache-2.0" -> "Apache"` (spec.md §3).
#[must_use]
pub fn kind_for(name: &str) -> &'static str {
    match name {
        "MIT" => "MIT",
        "ISC" => "ISC",
        "Unlicense" => "UNLICENSE",
        "0BSD" | "BSD-2-Clause" | "BSD-3-Clause" | "BSD-3-Clause-Clear" => "BSD",
        "Apache-2.0" | "Apache-1.1" => "Apache",
        "GPL-3.0" | "GPL-3.0-only" | "GPL-3.0-or-later" | "GPL-2.0" | "GPL-2.0-only" => "GPL",
        "LGPL-3.0" | "LGPL-3.0-only" | "LGPL-2.1" | "LGPL-2.1-only" => "LGPL",
        "AGPL-3.0" | "AGPL-3.0-only" | "AGPL-3.0-or-later" => "AGPL",
        "MPL-2.0" | "MPL-1.1" => "MPL",
        other => other,
    }
}

/// Restriction tags a canonical license name carries (spec.md §3's
/// `License.restrictions`). Applied to both the SPDX and the fuzzy-match
/// path, since the bundled corpus doesn't carry its own tag metadata the
/// way a full SPDX matcher library would.
#[must_use]
pub fn restrictions_for(name: &str) -> Vec<Restriction> {
    match kind_for(name) {
        "GPL" => vec![Restriction::DerivativeWorkCopyleft],
        "AGPL" => vec![Restriction::DerivativeWorkCopyleft, Restriction::NetworkCopyleft],
        "LGPL" | "MPL" => vec![Restriction::WeakCopyleft],
        "Apache" => vec![Restriction::PatentGrant],
        _ => Vec::new(),
    }
}

/// Whether a canonical license name is on the OSI-approved list (spec.md
/// §3's `License.is_osi_approved`). All entries in the bundled corpus are
/// OSI-approved; anything outside it defaults to `false` unless the SPDX
/// matcher (when wired in) says otherwise.
#[must_use]
pub fn is_osi_approved(name: &str) -> bool {
    CORPUS.iter().any(|entry| entry.name == name)
}
