//! Common-license-name to SPDX-family normalizer (spec.md §4.B PyPI).
//!
//! Registries report license strings freeform ("MIT License", "Apache
//! Software License", ...); this maps the common spellings to the same
//! family name the License Matcher's corpus kinds use, so the package
//! cross-check (spec.md §4.F.4) can compare `Package.license` against
//! `Source.licenses[].kind` by family rather than exact string.

const COMMON_NAMES: &[(&str, &str)] = &[
    ("mit", "MIT"),
    ("mit license", "MIT"),
    ("bsd license", "BSD"),
    ("bsd-2-clause", "BSD"),
    ("bsd-3-clause", "BSD"),
    ("new bsd license", "BSD"),
    ("simplified bsd license", "BSD"),
    ("the unlicense (unlicense)", "Unlicense"),
    ("unlicense", "Unlicense"),
    ("isc license (iscl)", "ISC"),
    ("isc license", "ISC"),
    ("apache software license", "Apache"),
    ("apache-2.0", "Apache"),
    ("apache license 2.0", "Apache"),
    ("gnu general public license v2 (gplv2)", "GPL"),
    ("gnu general public license v3 (gplv3)", "GPL"),
    ("gnu general public license (gpl)", "GPL"),
    ("gpl-3.0", "GPL"),
    ("gpl-2.0", "GPL"),
    ("gnu lesser general public license v3 (lgplv3)", "LGPL"),
    ("gnu library or lesser general public license (lgpl)", "LGPL"),
    ("lgpl-3.0", "LGPL"),
    ("gnu affero general public license v3", "AGPL"),
    ("agpl-3.0", "AGPL"),
    ("mozilla public license 2.0-(mpl-2.0)", "MPL"),
    ("mozilla public license 2.0 (mpl 2.0)", "MPL"),
    ("mpl-2.0", "MPL"),
];

/// Normalize a registry-declared license string to a family name, falling
/// back to the (lowercased, `" license"`-suffix-stripped) input when no
/// entry matches — mirroring the original implementation's "fall back to
/// the input unchanged" behavior rather than returning `Unknown`.
#[must_use]
pub fn normalize(license: &str) -> String {
    let mut normalized = license.to_lowercase();
    if let Some(stripped) = normalized.strip_suffix(" license") {
        normalized = stripped.to_string();
    }

    COMMON_NAMES
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, kind)| (*kind).to_string())
        .unwrap_or(normalized)
}

/// Extract a license string from a single PyPI `License :: ...` trove
/// classifier, stripping an `OSI Approved ::` segment if present (spec.md
/// §4.B PyPI).
#[must_use]
pub fn license_from_classifier(classifier: &str) -> Option<String> {
    let mut parts = classifier.split(" :: ");
    let first = parts.next()?;
    if !first.eq_ignore_ascii_case("license") {
        return None;
    }

    let rest: Vec<&str> = parts.collect();
    match rest.as_slice() {
        [] => None,
        [only] => Some((*only).to_string()),
        [first, tail @ ..] if *first == "OSI Approved" => Some(tail.join(" :: ")),
        _ => Some(rest.join(" :: ")),
    }
}

/// The first non-empty license extracted from `classifiers`, in order
/// (spec.md §4.B PyPI).
#[must_use]
pub fn license_from_classifiers(classifiers: &[String]) -> Option<String> {
    classifiers.iter().find_map(|c| license_from_classifier(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_common_names() {
        assert_eq!(normalize("MIT License"), "MIT");
        assert_eq!(normalize("Apache Software License"), "Apache");
        assert_eq!(normalize("BSD License"), "BSD");
    }

    #[test]
    fn unrecognized_name_passes_through_stripped_and_lowercased() {
        assert_eq!(normalize("Some Custom License"), "some custom");
    }

    #[test]
    fn strips_osi_approved_prefix_from_classifier() {
        assert_eq!(
            license_from_classifier("License :: OSI Approved :: MIT License"),
            Some("MIT License".to_string())
        );
    }

    #[test]
    fn non_license_classifier_is_ignored() {
        assert_eq!(license_from_classifier("Programming Language :: Python :: 3"), None);
    }

    #[test]
    fn picks_first_matching_classifier() {
        let classifiers = vec![
            "Programming Language :: Python :: 3".to_string(),
            "License :: OSI Approved :: Apache Software License".to_string(),
        ];
        assert_eq!(license_from_classifiers(&classifiers), Some("Apache Software License".to_string()));
    }
}
