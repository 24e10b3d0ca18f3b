//! URL normalization and the ingest-time validity gate (spec.md §4.D.1).
//!
//! The normalizer is shared with the registry fetchers: every fetcher runs
//! its raw `source_url` through [`normalize_source_url`] before handing it
//! to the Git Ingestor.

use score_notes::Note;

const TWO_COMPONENT_HOSTS: &[&str] = &["github.com", "gitlab.com", "bitbucket.org"];

/// Rewrite `git@host:org/repo` SSH syntax to `https://host/org/repo`, then,
/// for github/gitlab/bitbucket, reduce the path to exactly two components
/// (`org/repo`) with any `.git` suffix stripped. Non-two-component hosts
/// pass through unchanged. Returns `None` if a two-component host's path
/// doesn't have exactly two components (spec.md §3 invariants, §4.B npm).
#[must_use]
pub fn normalize_source_url(url: &str) -> Option<String> {
    if url.trim().is_empty() {
        return None;
    }

    let rewritten = rewrite_scp_syntax(url);
    let parsed = url::Url::parse(&rewritten).ok()?;
    let host = parsed.host_str()?;

    if TWO_COMPONENT_HOSTS.contains(&host) {
        let components: Vec<&str> = parsed.path().trim_matches('/').split('/').collect();
        let [org, repo] = components.as_slice() else {
            return None;
        };
        let repo = repo.strip_suffix(".git").unwrap_or(repo);
        return Some(format!("https://{host}/{org}/{repo}"));
    }

    Some(rewritten)
}

/// `git@host:path` → `https://host/path`. Anything else is returned as-is.
fn rewrite_scp_syntax(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("git@") {
        if let Some((host, path)) = rest.split_once(':') {
            return format!("https://{host}/{path}");
        }
    }
    url.to_string()
}

fn is_valid_hostname(host: &str) -> bool {
    if host.contains(':') {
        return false;
    }
    if !(3..=255).contains(&host.len()) {
        return false;
    }
    host.contains('.')
}

/// Validate a normalized source URL before attempting a clone (spec.md
/// §4.D.1). `Ok(())` means the caller should proceed to clone; `Err(note)`
/// short-circuits with no clone attempt.
pub fn gate(url: &str) -> Result<(), Note> {
    let parsed = url::Url::parse(url).map_err(|_| Note::NoSourceInvalidUrl)?;

    match parsed.scheme() {
        "https" | "git" => {}
        "http" => return Err(Note::NoSourceInsecureConnection),
        _ => return Err(Note::NoSourceInvalidUrl),
    }

    let host = parsed.host_str().ok_or(Note::NoSourceInvalidUrl)?;
    if host == "localhost" || host.starts_with("127.") {
        return Err(Note::NoSourceLocalhostUrl);
    }
    if !is_valid_hostname(host) {
        return Err(Note::NoSourceInvalidUrl);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_component_hosts_reduce_to_org_repo() {
        assert_eq!(
            normalize_source_url("https://github.com/psf/requests.git"),
            Some("https://github.com/psf/requests".to_string())
        );
    }

    #[test]
    fn scp_syntax_is_rewritten() {
        assert_eq!(
            normalize_source_url("git@github.com:psf/requests.git"),
            Some("https://github.com/psf/requests".to_string())
        );
    }

    #[test]
    fn two_component_host_with_extra_path_segments_is_rejected() {
        assert_eq!(
            normalize_source_url("https://github.com/psf/requests/tree/main"),
            None
        );
    }

    #[test]
    fn non_two_component_host_passes_through() {
        assert_eq!(
            normalize_source_url("https://git.sr.ht/~user/repo"),
            Some("https://git.sr.ht/~user/repo".to_string())
        );
    }

    #[test]
    fn https_and_git_schemes_pass_the_gate() {
        assert!(gate("https://github.com/psf/requests").is_ok());
        assert!(gate("git://github.com/psf/requests").is_ok());
    }

    #[test]
    fn http_is_flagged_insecure() {
        assert_eq!(gate("http://github.com/psf/requests"), Err(Note::NoSourceInsecureConnection));
    }

    #[test]
    fn localhost_is_rejected() {
        assert_eq!(gate("https://localhost/psf/requests"), Err(Note::NoSourceLocalhostUrl));
        assert_eq!(gate("https://127.0.0.1/psf/requests"), Err(Note::NoSourceLocalhostUrl));
    }

    #[test]
    fn hostname_without_dot_is_invalid() {
        assert_eq!(gate("https://github/psf/requests"), Err(Note::NoSourceInvalidUrl));
    }

    #[test]
    fn ipv6_literal_hostname_is_invalid() {
        assert_eq!(gate("https://[::1]/psf/requests"), Err(Note::NoSourceInvalidUrl));
    }
}
