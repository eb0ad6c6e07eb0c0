//! Relay list and secret key resolution.
//!
//! Precedence mirrors the usual git tooling conventions: command-line
//! flags, then environment, then `git config`.

use anyhow::{bail, Context};

use crate::git;

/// Environment variable consulted for the secret key.
pub const SEC_ENV_VAR: &str = "PATCHCAST_SEC";

/// Git config key holding the space-separated relay list.
pub const RELAYS_CONFIG_KEY: &str = "patchcast.relays";

/// Git config key holding the hex secret key.
pub const SECKEY_CONFIG_KEY: &str = "patchcast.seckey";

/// Git config key holding the optional hashtag.
pub const HASHTAG_CONFIG_KEY: &str = "patchcast.hashtag";

/// Resolve the relay list: `--relay` flags win, otherwise the
/// space-separated `patchcast.relays` git config.
///
/// An empty result is valid here; the broadcast coordinator is the layer
/// that rejects it.
pub async fn resolve_relays(flags: Vec<String>) -> anyhow::Result<Vec<String>> {
    if !flags.is_empty() {
        return Ok(flags);
    }
    let configured = git::config(RELAYS_CONFIG_KEY)
        .await
        .context("reading relay config")?;
    Ok(configured
        .map(|value| value.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default())
}

/// Resolve the secret key: `--sec` flag, then `PATCHCAST_SEC`, then the
/// `patchcast.seckey` git config.
pub async fn resolve_secret_key(flag: Option<String>) -> anyhow::Result<String> {
    if let Some(sec) = flag {
        return Ok(sec);
    }
    if let Ok(sec) = std::env::var(SEC_ENV_VAR) {
        if !sec.trim().is_empty() {
            return Ok(sec);
        }
    }
    if let Some(sec) = git::config(SECKEY_CONFIG_KEY)
        .await
        .context("reading secret key config")?
    {
        return Ok(sec);
    }
    bail!(
        "no secret key configured (pass --sec, set {SEC_ENV_VAR}, or set git config {SECKEY_CONFIG_KEY})"
    )
}
