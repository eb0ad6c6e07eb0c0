//! Patch broadcast protocol.
//!
//! Turns a version-control patch into a signed event and fans it out to a
//! set of independent, unreliable relays, succeeding if at least one
//! acknowledges receipt. The accepted copies are summarised in a portable
//! reference string.
//!
//! Wire format: length-prefixed JSON frames over TCP.
//! Crypto: Ed25519 signature over a SHA-256 content identifier.

pub mod broadcast;
pub mod crypto;
pub mod encode;
pub mod error;
pub mod event;
pub mod publish;
pub mod types;
pub mod wire;

pub use broadcast::{broadcast, BroadcastObserver, BroadcastReceipt, LogObserver};
pub use crypto::{sign, SecretKey, SignedPatchEvent};
pub use encode::{decode_reference, encode_reference, PatchReference};
pub use error::{BroadcastError, EncodeError, PublishError, SignError};
pub use event::PatchEvent;
pub use publish::{publish_with_deadline, RelayClient, TcpRelayClient};
pub use types::{now_secs, Tag, DEFAULT_PUBLISH_TIMEOUT, PATCH_KIND};
pub use wire::{ClientFrame, RelayAck};
