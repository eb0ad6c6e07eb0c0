//! Broadcast coordinator: fan one signed event out to every relay.
//!
//! One concurrent publish task per relay, no shared mutable state between
//! them, no cross-relay cancellation. The coordinator joins ALL tasks
//! before aggregating, so a slow-but-successful relay still counts.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::crypto::SignedPatchEvent;
use crate::encode::encode_reference;
use crate::error::{BroadcastError, PublishError};
use crate::publish::{publish_with_deadline, RelayClient};

/// Observer for per-relay outcomes.
///
/// Injected rather than hard-coded so tests can capture diagnostics. The
/// default [`LogObserver`] reports through `tracing`.
pub trait BroadcastObserver: Send + Sync {
    fn relay_accepted(&self, _addr: &str) {}
    fn relay_failed(&self, _error: &PublishError) {}
}

/// Default observer: one warning per failed relay, debug on success.
pub struct LogObserver;

impl BroadcastObserver for LogObserver {
    fn relay_accepted(&self, addr: &str) {
        tracing::debug!("relay {addr} accepted event");
    }

    fn relay_failed(&self, error: &PublishError) {
        tracing::warn!("{error}");
    }
}

/// Result of a successful broadcast: at least one relay accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReceipt {
    /// Relays that acknowledged the event, in input-list order.
    pub accepted: Vec<String>,
    /// Portable reference to the published event (id + relays + pubkey).
    pub reference: String,
}

/// Publish `event` to every relay concurrently and aggregate the outcomes.
///
/// Fails with [`BroadcastError::NoRelays`] before any attempt if `relays`
/// is empty, and with [`BroadcastError::AllRelaysFailed`] (carrying every
/// per-relay reason) if no relay acknowledges. A panic inside one attempt
/// is contained and recorded as that relay's failure.
pub async fn broadcast<C>(
    client: Arc<C>,
    relays: &[String],
    event: Arc<SignedPatchEvent>,
    observer: &dyn BroadcastObserver,
    deadline: Duration,
) -> Result<BroadcastReceipt, BroadcastError>
where
    C: RelayClient + 'static,
{
    if relays.is_empty() {
        return Err(BroadcastError::NoRelays);
    }

    let mut tasks = JoinSet::new();
    let mut task_addrs: HashMap<tokio::task::Id, (usize, String)> = HashMap::new();

    for (index, addr) in relays.iter().enumerate() {
        let client = Arc::clone(&client);
        let event = Arc::clone(&event);
        let addr = addr.clone();
        let task_addr = addr.clone();
        let handle = tasks.spawn(async move {
            let result = publish_with_deadline(client.as_ref(), &task_addr, &event, deadline).await;
            (index, task_addr, result)
        });
        task_addrs.insert(handle.id(), (index, addr));
    }

    // Barrier join: wait for every attempt to reach a terminal state
    let mut outcomes: Vec<Option<Result<String, PublishError>>> =
        relays.iter().map(|_| None).collect();

    while let Some(joined) = tasks.join_next_with_id().await {
        match joined {
            Ok((_, (index, addr, Ok(())))) => {
                observer.relay_accepted(&addr);
                outcomes[index] = Some(Ok(addr));
            }
            Ok((_, (index, _, Err(error)))) => {
                observer.relay_failed(&error);
                outcomes[index] = Some(Err(error));
            }
            Err(join_error) => {
                // A crashed attempt counts as that relay's failure and must
                // not take the broadcast down with it
                let Some((index, addr)) = task_addrs.remove(&join_error.id()) else {
                    continue;
                };
                let error = PublishError::Aborted {
                    addr,
                    reason: join_error.to_string(),
                };
                observer.relay_failed(&error);
                outcomes[index] = Some(Err(error));
            }
        }
    }

    // Aggregate in input order
    let mut accepted = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes.into_iter().flatten() {
        match outcome {
            Ok(addr) => accepted.push(addr),
            Err(error) => failures.push(error),
        }
    }

    if accepted.is_empty() {
        return Err(BroadcastError::AllRelaysFailed { failures });
    }

    let reference = encode_reference(event.id(), &accepted, event.pubkey())?;
    Ok(BroadcastReceipt {
        accepted,
        reference,
    })
}
