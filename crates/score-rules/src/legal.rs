//! Legal rules (spec.md §4.F.3), evaluated on `Source.licenses`.

use score_models::Source;
use score_notes::Note;

/// Notes this source contributes to the Legal sub-score. Duplicates across
/// multiple license files are left in place here — the assembly stage
/// (spec.md §4.F.6) is responsible for deduplicating per sub-score.
#[must_use]
pub fn notes(source: &Source) -> Vec<Note> {
    if let Some(error) = source.error {
        return vec![error];
    }

    if source.licenses.is_empty() {
        return vec![Note::NoLicense];
    }

    let mut notes = Vec::new();
    for license in &source.licenses {
        if let Some(error) = license.error {
            notes.push(error);
            continue;
        }

        if license.is_unknown() {
            notes.push(Note::LicenseUnknown);
        }
        if license.additional_text.as_deref().is_some_and(|text| !text.is_empty()) {
            notes.push(Note::LicenseAdditionalText);
        }
        if license.spdx_id.is_none() {
            notes.push(Note::LicenseNotInSpdx);
        } else if license.is_osi_approved != Some(true) {
            notes.push(Note::LicenseNotOsiApproved);
        }
        for restriction in &license.restrictions {
            notes.push(restriction.note());
        }
        if license.modified {
            notes.push(Note::LicenseModified);
        }
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use score_models::{License, Restriction};
    use std::collections::BTreeSet;

    fn source_with(licenses: Vec<License>) -> Source {
        Source {
            source_url: "https://github.com/psf/requests".to_string(),
            error: None,
            licenses,
            package_destinations: Vec::new(),
            recent_authors_count: Some(5),
            max_monthly_authors_count: Some(5),
            first_commit: None,
            latest_commit: None,
        }
    }

    #[test]
    fn error_short_circuits() {
        let s = Source::error("https://github.com/x/y", Note::RepoEmpty);
        assert_eq!(notes(&s), vec![Note::RepoEmpty]);
    }

    #[test]
    fn no_licenses_is_no_license() {
        assert_eq!(notes(&source_with(Vec::new())), vec![Note::NoLicense]);
    }

    #[test]
    fn unknown_license_is_flagged() {
        let license = License { license: Some("Unknown".to_string()), ..License::default() };
        assert!(notes(&source_with(vec![license])).contains(&Note::LicenseUnknown));
    }

    #[test]
    fn missing_spdx_id_is_flagged() {
        let license = License { license: Some("MIT".to_string()), spdx_id: None, ..License::default() };
        let result = notes(&source_with(vec![license]));
        assert!(result.contains(&Note::LicenseNotInSpdx));
        assert!(!result.contains(&Note::LicenseNotOsiApproved));
    }

    #[test]
    fn not_osi_approved_only_checked_when_spdx_id_present() {
        let license = License {
            license: Some("Custom".to_string()),
            spdx_id: Some("Custom-1.0".to_string()),
            is_osi_approved: Some(false),
            ..License::default()
        };
        let result = notes(&source_with(vec![license]));
        assert!(result.contains(&Note::LicenseNotOsiApproved));
        assert!(!result.contains(&Note::LicenseNotInSpdx));
    }

    #[test]
    fn restrictions_map_to_their_notes() {
        let mut restrictions = BTreeSet::new();
        restrictions.insert(Restriction::NetworkCopyleft);
        let license = License {
            license: Some("AGPL-3.0".to_string()),
            spdx_id: Some("AGPL-3.0".to_string()),
            is_osi_approved: Some(true),
            restrictions,
            ..License::default()
        };
        assert!(notes(&source_with(vec![license])).contains(&Note::LicenseRestrictionNetworkCopyleft));
    }

    #[test]
    fn modified_license_is_flagged() {
        let license = License {
            license: Some("MIT".to_string()),
            spdx_id: Some("MIT".to_string()),
            is_osi_approved: Some(true),
            modified: true,
            ..License::default()
        };
        assert!(notes(&source_with(vec![license])).contains(&Note::LicenseModified));
    }

    #[test]
    fn clean_spdx_license_has_no_notes() {
        let license = License {
            license: Some("MIT".to_string()),
            spdx_id: Some("MIT".to_string()),
            is_osi_approved: Some(true),
            ..License::default()
        };
        assert!(notes(&source_with(vec![license])).is_empty());
    }
}
