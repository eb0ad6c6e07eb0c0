//! Git integration: patch extraction and config reads.

use tokio::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("failed to run git {args}: {source}")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {args} failed: {stderr}")]
    Command { args: String, stderr: String },

    #[error("empty patch for revision {revision}")]
    EmptyPatch { revision: String },

    #[error("patch has no {header} header")]
    MissingHeader { header: &'static str },
}

/// Run a git command and return its stdout.
async fn run(args: &[&str]) -> Result<String, GitError> {
    let rendered = args.join(" ");
    let output = Command::new("git")
        .args(args)
        .output()
        .await
        .map_err(|e| GitError::Spawn {
            args: rendered.clone(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(GitError::Command {
            args: rendered,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Produce the mail-formatted patch text for a revision.
pub async fn format_patch(revision: &str) -> Result<String, GitError> {
    let patch = run(&["format-patch", "--stdout", revision]).await?;
    if patch.trim().is_empty() {
        return Err(GitError::EmptyPatch {
            revision: revision.to_string(),
        });
    }
    Ok(patch)
}

/// Read a git config value. Unset keys yield `None`.
pub async fn config(key: &str) -> Result<Option<String>, GitError> {
    match run(&["config", key]).await {
        Ok(value) => Ok(Some(value.trim().to_string())),
        // git config exits nonzero for unset keys
        Err(GitError::Command { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Pull the author and subject out of a mail-formatted patch.
///
/// The patch header looks like:
/// ```text
/// From 1a2b3c4d Mon Sep 17 00:00:00 2001
/// From: Jane Doe <jane@example.com>
/// Date: ...
/// Subject: [PATCH] fix: handle empty input
/// ```
pub fn extract_author_subject(patch: &str) -> Result<(String, String), GitError> {
    let author = header_value(patch, "From: ")
        .ok_or(GitError::MissingHeader { header: "From" })?;
    let subject = header_value(patch, "Subject: ")
        .ok_or(GitError::MissingHeader { header: "Subject" })?;
    Ok((author, subject))
}

fn header_value(patch: &str, prefix: &str) -> Option<String> {
    patch
        .lines()
        .take_while(|line| !line.is_empty())
        .find_map(|line| line.strip_prefix(prefix))
        .map(|value| value.trim().to_string())
}
