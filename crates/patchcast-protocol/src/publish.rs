//! Single-relay publisher: connect, send one event, await one ack.
//!
//! Each attempt owns exactly one connection, released on every exit path
//! (including timeout: dropping the future drops the stream). Retry policy
//! belongs to a higher layer; this module performs none.

use std::time::Duration;

use tokio::net::TcpStream;

use crate::crypto::SignedPatchEvent;
use crate::error::PublishError;
use crate::wire::{self, ClientFrame, RelayAck};

/// Abstraction over the relay exchange.
///
/// In production: [`TcpRelayClient`]. In tests: a mock that scripts
/// per-address outcomes.
#[async_trait::async_trait]
pub trait RelayClient: Send + Sync {
    /// Run one connect → publish → await-ack exchange against `addr`.
    async fn try_publish(
        &self,
        addr: &str,
        event: &SignedPatchEvent,
    ) -> Result<(), PublishError>;
}

/// Publishes events over plain TCP with length-prefixed JSON frames.
#[derive(Debug, Clone, Default)]
pub struct TcpRelayClient;

impl TcpRelayClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl RelayClient for TcpRelayClient {
    async fn try_publish(
        &self,
        addr: &str,
        event: &SignedPatchEvent,
    ) -> Result<(), PublishError> {
        let mut stream = TcpStream::connect(addr).await.map_err(|e| {
            PublishError::Connection {
                addr: addr.to_string(),
                source: e.into(),
            }
        })?;

        let frame = ClientFrame::Publish {
            event: event.clone(),
        };
        wire::write_frame(&mut stream, &frame)
            .await
            .map_err(|e| PublishError::Connection {
                addr: addr.to_string(),
                source: e,
            })?;

        let ack: RelayAck =
            wire::read_frame(&mut stream)
                .await
                .map_err(|e| PublishError::Connection {
                    addr: addr.to_string(),
                    source: e,
                })?;

        match ack {
            RelayAck::Accepted { id } if id == event.id() => Ok(()),
            RelayAck::Accepted { id } => Err(PublishError::Rejected {
                addr: addr.to_string(),
                reason: format!("ack for wrong event id {id}"),
            }),
            RelayAck::Denied { reason } => Err(PublishError::Rejected {
                addr: addr.to_string(),
                reason,
            }),
        }
    }
}

/// Bound a publish attempt by a fixed deadline.
///
/// The deadline covers the whole exchange. Exceeding it abandons the
/// attempt and yields [`PublishError::Timeout`].
pub async fn publish_with_deadline<C>(
    client: &C,
    addr: &str,
    event: &SignedPatchEvent,
    deadline: Duration,
) -> Result<(), PublishError>
where
    C: RelayClient + ?Sized,
{
    match tokio::time::timeout(deadline, client.try_publish(addr, event)).await {
        Ok(result) => result,
        Err(_) => Err(PublishError::Timeout {
            addr: addr.to_string(),
            after: deadline,
        }),
    }
}

// ── MockRelayClient (tests) ─────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::mock::{MockBehavior, MockRelayClient};
    use super::*;
    use crate::crypto::{sign, SecretKey};
    use crate::event::PatchEvent;

    fn signed_event() -> SignedPatchEvent {
        let key = SecretKey::from_seed(&[1; 32]);
        sign(PatchEvent::new("patch body", "author", "subject"), &key).expect("sign")
    }

    #[tokio::test]
    async fn deadline_passes_through_success() {
        let client = MockRelayClient::new();
        client.script("relayA", MockBehavior::Accept);

        let result =
            publish_with_deadline(&client, "relayA", &signed_event(), Duration::from_secs(1))
                .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn deadline_passes_through_rejection() {
        let client = MockRelayClient::new();
        client.script("relayA", MockBehavior::Deny("policy"));

        let result =
            publish_with_deadline(&client, "relayA", &signed_event(), Duration::from_secs(1))
                .await;
        assert!(matches!(result, Err(PublishError::Rejected { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_relay_times_out_at_deadline_boundary() {
        let client = MockRelayClient::new();
        client.script("relayA", MockBehavior::Hang);
        let deadline = Duration::from_secs(30);

        let started = tokio::time::Instant::now();
        let result = publish_with_deadline(&client, "relayA", &signed_event(), deadline).await;
        let elapsed = started.elapsed();

        match result {
            Err(PublishError::Timeout { after, .. }) => assert_eq!(after, deadline),
            other => panic!("expected timeout, got {other:?}"),
        }
        // Paused clock: auto-advance jumps exactly to the deadline
        assert_eq!(elapsed, deadline);
    }
}
