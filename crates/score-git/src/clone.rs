//! The clone protocol (spec.md §4.D.2): a scoped, minimum-bytes clone of a
//! source repository, shelled out to the system `git` binary so the hard
//! clone timeout can kill the child process outright.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use score_notes::Note;
use tokio::process::Command;
use tokio::time::timeout;

/// Kill the clone process if it runs longer than this (spec.md §4.D.2).
pub const MAX_CLONE_TIME: Duration = Duration::from_secs(30);

const SPARSE_CHECKOUT_PATTERNS: &[&str] = &[
    "**/package.json",
    "**/pyproject.toml",
    "**/setup.cfg",
    "**/setup.py",
    "**/requirements.txt",
    "**/LICEN[CS]E*",
    "**/licen[cs]e*",
    "**/COPYING*",
    "**/copying*",
    "**/stubs/*/METADATA.toml",
];

#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    /// The clone exceeded [`MAX_CLONE_TIME`]. Eligible for retry by the caller.
    #[error("clone of {url} exceeded {MAX_CLONE_TIME:?}")]
    Timeout { url: String },
    /// A condition the URL gate should have already rejected, translated to a note.
    #[error("git reported: {0:?}")]
    Note(Note),
    #[error("failed to spawn git: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Clone `url` into `dest` (already created, empty) with a single branch, no
/// initial checkout, and a tree-less partial clone filter, then materialize
/// only the files the rest of the pipeline needs via a non-cone
/// sparse-checkout (spec.md §4.D.2). `clone_timeout` overrides
/// [`MAX_CLONE_TIME`], e.g. from the `MAX_CLONE_TIME` environment variable
/// (spec.md §6).
pub async fn clone_sparse(url: &str, dest: &Path, clone_timeout: Duration) -> Result<(), CloneError> {
    run_git(
        &[
            "clone",
            "--single-branch",
            "--no-checkout",
            "--sparse",
            "--filter=tree:0",
            url,
            &dest.to_string_lossy(),
        ],
        None,
        url,
        clone_timeout,
    )
    .await?;

    run_git(&["sparse-checkout", "init", "--no-cone"], Some(dest), url, clone_timeout).await?;

    let sparse_checkout_file = dest.join(".git").join("info").join("sparse-checkout");
    tokio::fs::write(&sparse_checkout_file, SPARSE_CHECKOUT_PATTERNS.join("\n") + "\n")
        .await
        .map_err(CloneError::Spawn)?;

    run_git(&["checkout", "HEAD"], Some(dest), url, clone_timeout).await?;

    Ok(())
}

async fn run_git(args: &[&str], cwd: Option<&Path>, url: &str, clone_timeout: Duration) -> Result<(), CloneError> {
    let mut command = Command::new("git");
    command
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        // Mandatory (spec.md §6): an interactive credential prompt on a
        // private repo would otherwise hang the clone past MAX_CLONE_TIME
        // instead of failing fast with NoSourcePrivateRepo.
        .env("GIT_TERMINAL_PROMPT", "0");
    if let Some(cwd) = cwd {
        command.current_dir(cwd);
    }

    let child = command.spawn()?;

    let output = match timeout(clone_timeout, child.wait_with_output()).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(CloneError::Timeout { url: url.to_string() });
        }
    };

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).to_lowercase();
    let code = output.status.code();

    if stderr.contains("is not allowed") || stderr.contains("protocol") && stderr.contains("not allowed") {
        return Err(CloneError::Note(Note::NoSourceUnsafeGitProtocol));
    }

    if code == Some(128) {
        if stderr.contains("not found") {
            return Err(CloneError::Note(Note::NoSourceRepoNotFound));
        }
        if stderr.contains("could not read username") {
            return Err(CloneError::Note(Note::NoSourcePrivateRepo));
        }
    }

    tracing::warn!(url, code, stderr = %stderr, "git clone failed");
    Err(CloneError::Note(Note::NoSourceOtherGitError))
}
