//! The PyPI `requires_dist` grammar (spec.md §4.B.1): `name (extras)?
//! version_specifiers? (; environment_marker)?`.

use once_cell::sync::Lazy;
use regex::Regex;
use score_models::Dependency;

static NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9._-]*)").unwrap());
static EXTRAS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\[([^\]]*)\]").unwrap());
static SPECIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[><=!~]+[^,;\s]+").unwrap());
static EXTRA_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"extra\s*==\s*["']([A-Za-z0-9_.\-]+)["']"#).unwrap());

/// Parse one `requires_dist` line. Returns `None` for lines that don't
/// start with a valid package name — the caller logs and skips these
/// rather than failing the whole package (spec.md §4.B.1).
#[must_use]
pub fn parse_dep(line: &str) -> Option<Dependency> {
    let (main_part, environment_marker) = match line.split_once(';') {
        Some((main, marker)) => (main.trim(), Some(marker.trim().to_string())),
        None => (line.trim(), None),
    };

    let name_match = NAME.find(main_part)?;
    let name = name_match.as_str().to_string();
    let rest = main_part[name_match.end()..].trim_start();

    let extras = EXTRAS
        .captures(rest)
        .map(|captures| captures[1].split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    let rest = EXTRAS.replace(rest, "");

    // A URL requirement (`name @ https://...`) has no version specifiers.
    let specifiers: Vec<String> = if rest.trim_start().starts_with('@') {
        Vec::new()
    } else {
        SPECIFIER.find_iter(&rest).map(|m| m.as_str().trim().to_string()).collect()
    };

    let extra_marker = environment_marker
        .as_deref()
        .and_then(|marker| EXTRA_MARKER.captures(marker))
        .map(|captures| captures[1].to_string());

    Some(Dependency { name, specifiers, extras, environment_marker, extra_marker })
}

/// Parse every line of `requires_dist`, skipping (and logging) any that
/// don't parse (spec.md §4.B.1: "do not fail the whole package").
#[must_use]
pub fn parse_deps(requires_dist: &[String]) -> Vec<Dependency> {
    requires_dist
        .iter()
        .filter_map(|line| {
            let parsed = parse_dep(line);
            if parsed.is_none() {
                tracing::warn!(line, "failed to parse dependency");
            }
            parsed
        })
        .collect()
}

/// The npm equivalent: `versions[version].dependencies` is already a map
/// of `name -> specifier string`, so there's no grammar to parse (spec.md
/// §4.B npm).
#[must_use]
pub fn npm_deps(dependencies: &serde_json::Map<String, serde_json::Value>) -> Vec<Dependency> {
    dependencies
        .iter()
        .filter_map(|(name, specifier)| {
            let specifier = specifier.as_str()?;
            Some(Dependency {
                name: name.clone(),
                specifiers: vec![specifier.to_string()],
                extras: Vec::new(),
                environment_marker: None,
                extra_marker: None,
            })
        })
        .collect()
}

/// The conda equivalent: each `depends` string is split on its first
/// whitespace into `name` and `specifier`, with the name prefixed by the
/// channel (spec.md §4.B conda).
#[must_use]
pub fn conda_deps(channel: &str, depends: &[String]) -> Vec<Dependency> {
    depends
        .iter()
        .map(|entry| {
            let (name, specifier) = match entry.split_once(char::is_whitespace) {
                Some((name, specifier)) => (name, specifier.trim()),
                None => (entry.as_str(), ""),
            };
            Dependency {
                name: format!("{channel}/{name}"),
                specifiers: if specifier.is_empty() { Vec::new() } else { vec![specifier.to_string()] },
                extras: Vec::new(),
                environment_marker: None,
                extra_marker: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_specifiers() {
        let dep = parse_dep("requests>=2.0,<3.0").unwrap();
        assert_eq!(dep.name, "requests");
        assert_eq!(dep.specifiers, vec![">=2.0", "<3.0"]);
        assert!(dep.extras.is_empty());
    }

    #[test]
    fn parses_extras() {
        let dep = parse_dep("requests[socks,security]>=2.0").unwrap();
        assert_eq!(dep.extras, vec!["socks", "security"]);
        assert_eq!(dep.specifiers, vec![">=2.0"]);
    }

    #[test]
    fn parses_environment_marker() {
        let dep = parse_dep("pywin32>=1.0; sys_platform == \"win32\"").unwrap();
        assert_eq!(dep.name, "pywin32");
        assert_eq!(dep.environment_marker.as_deref(), Some("sys_platform == \"win32\""));
        assert!(dep.extra_marker.is_none());
    }

    #[test]
    fn parses_extra_marker() {
        let dep = parse_dep("pytest; extra == \"test\"").unwrap();
        assert_eq!(dep.extra_marker.as_deref(), Some("test"));
    }

    #[test]
    fn url_requirement_has_no_specifiers() {
        let dep = parse_dep("mypackage @ https://example.com/mypackage.tar.gz").unwrap();
        assert_eq!(dep.name, "mypackage");
        assert!(dep.specifiers.is_empty());
    }

    #[test]
    fn unparseable_line_returns_none() {
        assert!(parse_dep("123-invalid-name").is_none());
    }

    #[test]
    fn conda_deps_split_on_first_whitespace() {
        let deps = conda_deps("conda-forge", &["numpy >=1.20".to_string(), "python".to_string()]);
        assert_eq!(deps[0].name, "conda-forge/numpy");
        assert_eq!(deps[0].specifiers, vec![">=1.20"]);
        assert_eq!(deps[1].name, "conda-forge/python");
        assert!(deps[1].specifiers.is_empty());
    }
}
