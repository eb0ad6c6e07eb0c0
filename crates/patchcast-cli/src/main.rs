mod config;
mod git;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use patchcast_protocol::{broadcast, sign, LogObserver, PatchEvent, SecretKey, TcpRelayClient};

#[derive(Parser)]
#[command(
    name = "git-patchcast",
    about = "Sign a git patch and broadcast it to relays"
)]
struct Cli {
    /// Revision to send (anything `git format-patch` accepts).
    revision: String,

    /// Relay address (host:port). Repeatable; overrides `patchcast.relays`.
    #[arg(short = 'r', long = "relay")]
    relays: Vec<String>,

    /// Secret key as a 64-char hex seed. Falls back to PATCHCAST_SEC,
    /// then `git config patchcast.seckey`.
    #[arg(long)]
    sec: Option<String>,

    /// Per-relay publish deadline in seconds.
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Print the signed event instead of broadcasting it.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let patch = git::format_patch(&cli.revision)
        .await
        .context("error getting patch")?;
    let (author, subject) = git::extract_author_subject(&patch)?;

    let relays = config::resolve_relays(cli.relays).await?;
    let sec = config::resolve_secret_key(cli.sec).await?;
    let key = SecretKey::from_hex(&sec)?;

    let mut event = PatchEvent::new(patch, &author, &subject);
    if let Some(tag) = git::config(config::HASHTAG_CONFIG_KEY).await? {
        event = event.hashtag(&tag);
    }

    let signed = sign(event, &key).context("error signing event")?;

    if cli.dry_run {
        println!("{}", signed.to_canonical_json());
        eprintln!("this was a dry run");
        return Ok(());
    }

    tracing::info!("publishing {} to {} relays", signed.id(), relays.len());
    let receipt = broadcast(
        Arc::new(TcpRelayClient::new()),
        &relays,
        Arc::new(signed),
        &LogObserver,
        Duration::from_secs(cli.timeout_secs),
    )
    .await?;

    tracing::info!(
        "accepted by {}/{} relays",
        receipt.accepted.len(),
        relays.len()
    );
    println!("{}", receipt.reference);
    Ok(())
}
