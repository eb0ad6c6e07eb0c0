use std::time::Duration;

/// Errors from key handling and event signing.
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error("invalid secret key: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    Signature(String),

    #[error("signature verification failed")]
    Verification,
}

/// Failure of a single relay publish attempt.
///
/// Always recovered locally by the coordinator and downgraded to
/// diagnostic data; never fatal to the broadcast on its own.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("connection to {addr} failed: {source}")]
    Connection {
        addr: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("relay {addr} rejected event: {reason}")]
    Rejected { addr: String, reason: String },

    #[error("publish to {addr} timed out after {after:?}")]
    Timeout { addr: String, after: Duration },

    #[error("publish to {addr} aborted: {reason}")]
    Aborted { addr: String, reason: String },
}

impl PublishError {
    /// The relay address this attempt targeted.
    pub fn addr(&self) -> &str {
        match self {
            PublishError::Connection { addr, .. }
            | PublishError::Rejected { addr, .. }
            | PublishError::Timeout { addr, .. }
            | PublishError::Aborted { addr, .. } => addr,
        }
    }
}

/// Operation-level failure of a broadcast.
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    /// Precondition: the relay list was empty, no attempt was made.
    #[error("no relays configured")]
    NoRelays,

    /// Every relay was attempted and every attempt failed.
    #[error("no relay accepted the event ({} attempts failed)", .failures.len())]
    AllRelaysFailed { failures: Vec<PublishError> },

    /// The event was accepted but the reference could not be encoded.
    #[error("event published, but encoding the reference failed: {0}")]
    Encode(#[from] EncodeError),
}

/// Errors from reference encoding and decoding.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("invalid event id: {0}")]
    InvalidId(String),

    #[error("invalid public key: {0}")]
    InvalidPubkey(String),

    #[error("relay address too long for reference ({len} bytes, max {max})")]
    RelayTooLong { len: usize, max: usize },

    #[error("malformed reference: {0}")]
    Malformed(String),
}
