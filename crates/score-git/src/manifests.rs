//! Manifest-based package-name discovery (spec.md §4.D.5): reading every
//! `pyproject.toml`, `setup.cfg`, `setup.py`, and `package.json` in the
//! working tree to find which package name(s) the repository itself
//! declares, in precedence order.

use std::path::Path;

use regex::Regex;
use score_models::PackageDestination;
use walkdir::WalkDir;

/// `lower(re.sub(/[-_.]+/, '-', name))` (spec.md §4.D.5).
#[must_use]
pub fn pypi_normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_separator = false;
    for ch in name.chars() {
        if ch == '-' || ch == '_' || ch == '.' {
            if !last_was_separator {
                out.push('-');
            }
            last_was_separator = true;
        } else {
            out.push(ch.to_ascii_lowercase());
            last_was_separator = false;
        }
    }
    out
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).to_string_lossy().replace('\\', "/")
}

fn find_files<'a>(root: &'a Path, file_name: &'static str) -> impl Iterator<Item = std::path::PathBuf> + 'a {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(move |entry| entry.file_type().is_file() && entry.file_name() == file_name)
        .map(|entry| entry.path().to_path_buf())
}

/// All `("pypi/{name}", manifest_path)` pairs discovered from
/// `pyproject.toml`/`setup.cfg` files, falling back to `setup.py` only if
/// neither of those found a name anywhere in the repo (spec.md §4.D.5).
fn pypi_destinations(root: &Path) -> Vec<PackageDestination> {
    let mut destinations = Vec::new();
    let mut found_any = false;
    let mut saw_typeshed = false;

    for path in find_files(root, "pyproject.toml") {
        let Ok(text) = std::fs::read_to_string(&path) else { continue };
        let Ok(value) = text.parse::<toml::Value>() else { continue };

        let name = value
            .get("project")
            .and_then(|p| p.get("name"))
            .or_else(|| value.get("tool").and_then(|t| t.get("poetry")).and_then(|p| p.get("name")))
            .and_then(toml::Value::as_str);

        if let Some(name) = name {
            found_any = true;
            if name == "typeshed" {
                saw_typeshed = true;
            }
            destinations.push(PackageDestination {
                name: format!("pypi/{}", pypi_normalize(name)),
                manifest_path: relative_path(root, &path),
            });
        }
    }

    for path in find_files(root, "setup.cfg") {
        let Ok(text) = std::fs::read_to_string(&path) else { continue };
        if let Some(name) = read_ini_metadata_name(&text) {
            found_any = true;
            destinations.push(PackageDestination {
                name: format!("pypi/{}", pypi_normalize(&name)),
                manifest_path: relative_path(root, &path),
            });
        }
    }

    if !found_any {
        let setup_py_name = Regex::new(r#"(?s)setup\(.*?name\s*=\s*['"](.*?)['"]"#).unwrap();
        for path in find_files(root, "setup.py") {
            let Ok(text) = std::fs::read_to_string(&path) else { continue };
            if let Some(captures) = setup_py_name.captures(&text) {
                let name = &captures[1];
                destinations.push(PackageDestination {
                    name: format!("pypi/{}", pypi_normalize(name)),
                    manifest_path: relative_path(root, &path),
                });
            }
        }
    }

    if saw_typeshed {
        destinations.extend(typeshed_stub_destinations(root));
    }

    destinations
}

/// `typeshed`'s `/stubs/*/METADATA.toml` special case (spec.md §4.D.5):
/// each stub directory becomes its own `types-{dir}` package name.
fn typeshed_stub_destinations(root: &Path) -> Vec<PackageDestination> {
    let stubs_dir = root.join("stubs");
    let Ok(entries) = std::fs::read_dir(&stubs_dir) else { return Vec::new() };

    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let dir_name = entry.file_name().to_string_lossy().to_string();
            let metadata_path = entry.path().join("METADATA.toml");
            if metadata_path.is_file() {
                Some(PackageDestination {
                    name: format!("pypi/types-{dir_name}"),
                    manifest_path: relative_path(root, &metadata_path),
                })
            } else {
                None
            }
        })
        .collect()
}

/// A minimal `[section]\nkey = value` reader, just enough to pull
/// `[metadata].name` out of `setup.cfg` (no crate in this stack covers
/// Python's `configparser` format).
fn read_ini_metadata_name(text: &str) -> Option<String> {
    let mut in_metadata_section = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            in_metadata_section = trimmed.trim_matches(|c| c == '[' || c == ']').eq_ignore_ascii_case("metadata");
            continue;
        }
        if !in_metadata_section {
            continue;
        }
        if let Some((key, value)) = trimmed.split_once('=') {
            if key.trim().eq_ignore_ascii_case("name") {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}

/// All `("npm/{name}", manifest_path)` pairs discovered from
/// `package.json` files (spec.md §4.D.5).
fn npm_destinations(root: &Path) -> Vec<PackageDestination> {
    find_files(root, "package.json")
        .filter_map(|path| {
            let text = std::fs::read_to_string(&path).ok()?;
            let value: serde_json::Value = serde_json::from_str(&text).ok()?;
            let name = value.get("name")?.as_str()?;
            Some(PackageDestination { name: format!("npm/{name}"), manifest_path: relative_path(root, &path) })
        })
        .collect()
}

/// Every declared package name found in the working tree, across both
/// ecosystems (spec.md §4.D.5).
#[must_use]
pub fn discover(root: &Path) -> Vec<PackageDestination> {
    let mut destinations = pypi_destinations(root);
    destinations.extend(npm_destinations(root));
    destinations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pypi_normalize_folds_separators() {
        assert_eq!(pypi_normalize("My_Package.Name"), "my-package-name");
        assert_eq!(pypi_normalize("already-normal"), "already-normal");
    }

    #[test]
    fn pypi_normalize_collapses_runs_of_separators() {
        assert_eq!(pypi_normalize("foo__-.bar"), "foo-bar");
    }

    #[test]
    fn ini_reader_finds_metadata_name() {
        let text = "[metadata]\nname = requests\nversion = 1.0\n[options]\nname = wrong\n";
        assert_eq!(read_ini_metadata_name(text), Some("requests".to_string()));
    }
}
