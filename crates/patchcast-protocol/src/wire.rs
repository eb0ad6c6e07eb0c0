//! Relay wire protocol: length-prefixed JSON frames.
//!
//! One publish exchange per connection: the client sends a
//! [`ClientFrame::Publish`], the relay answers with a single [`RelayAck`],
//! and the connection is done.

use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum frame size. Patches can be large, but not unbounded.
pub const MAX_FRAME_SIZE: usize = 4 * 1024 * 1024;

/// Frames a client may send to a relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Publish {
        event: crate::crypto::SignedPatchEvent,
    },
}

/// The relay's single acknowledgment for a publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayAck {
    /// The relay stored the event. Echoes the event id.
    Accepted { id: String },
    /// Explicit negative acknowledgment with the relay-supplied reason.
    Denied { reason: String },
}

/// Write one frame: u32 big-endian length, then the JSON body.
pub async fn write_frame<W, T>(writer: &mut W, body: &T) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let data = serde_json::to_vec(body).context("serialize frame")?;
    if data.len() > MAX_FRAME_SIZE {
        bail!("frame too large: {} bytes (max {})", data.len(), MAX_FRAME_SIZE);
    }
    let len = (data.len() as u32).to_be_bytes();
    writer.write_all(&len).await?;
    writer.write_all(&data).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame and decode its JSON body.
pub async fn read_frame<R, T>(reader: &mut R) -> anyhow::Result<T>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    reader
        .read_exact(&mut len_buf)
        .await
        .context("read frame length")?;

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_SIZE {
        bail!("frame too large: {len} bytes (max {MAX_FRAME_SIZE})");
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await.context("read frame body")?;
    serde_json::from_slice(&buf).context("decode frame")
}
