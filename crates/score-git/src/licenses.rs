//! License file discovery (spec.md §4.D.4): find every candidate license
//! file in the working tree and hand each one to the License Matcher.

use std::path::Path;

use regex::RegexSet;
use score_license::{NullSpdxMatcher, SpdxMatcher};
use score_models::License;
use walkdir::WalkDir;

/// Pathological repos (monorepos vendoring hundreds of dependencies) are
/// capped here rather than matched in full (spec.md §4.D.4).
const MAX_CANDIDATES: usize = 2500;

const EXCLUDED_EXTENSIONS: &[&str] = &["json", "csv", "svg", "jpg", "jpeg"];

fn is_candidate_name(file_name: &str) -> bool {
    let stem = file_name.split('.').next().unwrap_or(file_name);
    let stem_upper = stem.to_ascii_uppercase();
    stem_upper == "LICENSE" || stem_upper == "LICENCE" || stem_upper == "COPYING"
}

fn has_excluded_extension(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| EXCLUDED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Documentation stubs that merely `.. include::` an external `LICENSE`
/// file shouldn't be matched as if they were the license itself (spec.md
/// §4.D.4).
fn is_external_include_stub(relative_path: &str, content: &str) -> bool {
    if !relative_path.starts_with("docs/") {
        return false;
    }
    let markers = RegexSet::new([
        r"\.\.\s+literalinclude::",
        r"\.\.\s+include::",
        r"\{include\}\s+\.\./LICENSE",
    ])
    .expect("static regex set");
    markers.is_match(content)
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).to_string_lossy().replace('\\', "/")
}

/// Find and classify every license file under `root`, using `matcher` for
/// the SPDX short-circuit step of the License Matcher (spec.md §4.D.4,
/// §4.E).
#[must_use]
pub fn discover(root: &Path, matcher: &dyn SpdxMatcher, source_url: &str) -> Vec<License> {
    let mut candidates: Vec<(std::path::PathBuf, String)> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let file_name = entry.file_name().to_string_lossy().to_string();
            if !is_candidate_name(&file_name) || has_excluded_extension(&file_name) {
                return None;
            }
            let relative = relative_path(root, entry.path());
            Some((entry.path().to_path_buf(), relative))
        })
        .collect();

    candidates.sort_by(|a, b| a.1.len().cmp(&b.1.len()).then_with(|| a.1.cmp(&b.1)));
    candidates.truncate(MAX_CANDIDATES);

    candidates
        .into_iter()
        .filter_map(|(path, relative)| {
            let content = std::fs::read_to_string(&path).ok()?;
            if is_external_include_stub(&relative, &content) {
                return None;
            }
            Some(score_license::identify_license(matcher, source_url, &relative, &content))
        })
        .collect()
}

/// Convenience wrapper using [`NullSpdxMatcher`] (no SPDX matcher library
/// wired in).
#[must_use]
pub fn discover_default(root: &Path, source_url: &str) -> Vec<License> {
    discover(root, &NullSpdxMatcher, source_url)
}
