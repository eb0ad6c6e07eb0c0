//! Portable reference encoding for published events.
//!
//! A reference packs the event id, the relays that accepted the event (in
//! the order the coordinator produced them), and the signer's public key
//! into a TLV blob rendered as `patchref1` + lowercase base32. Pure and
//! deterministic: identical inputs always yield the identical string.

use data_encoding::{BASE32_NOPAD, HEXLOWER, HEXLOWER_PERMISSIVE};

use crate::error::EncodeError;

/// Human-readable prefix of every reference string.
pub const REFERENCE_PREFIX: &str = "patchref1";

/// Maximum encodable relay address length (TLV length field is one byte).
pub const MAX_RELAY_ADDR_LEN: usize = 255;

const TLV_ID: u8 = 0;
const TLV_RELAY: u8 = 1;
const TLV_PUBKEY: u8 = 2;

/// Decoded contents of a reference string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReference {
    /// Event id, lowercase hex.
    pub id: String,
    /// Relays that accepted the event, in encoded order.
    pub relays: Vec<String>,
    /// Signer's public key, lowercase hex.
    pub pubkey: String,
}

/// Encode a reference from the event id, the accepted relays, and the
/// signer's public key.
///
/// Fails only on malformed inputs: a non-hex or wrong-length id or key, or
/// a relay address longer than [`MAX_RELAY_ADDR_LEN`] bytes. For values the
/// signer and coordinator produced themselves this should never happen.
pub fn encode_reference(
    id: &str,
    relays: &[String],
    pubkey: &str,
) -> Result<String, EncodeError> {
    let id_bytes = decode_hex32(id).map_err(EncodeError::InvalidId)?;
    let pk_bytes = decode_hex32(pubkey).map_err(EncodeError::InvalidPubkey)?;

    let mut tlv = Vec::with_capacity(2 + 32 + 2 + 32 + relays.len() * 16);
    push_entry(&mut tlv, TLV_ID, &id_bytes);
    for relay in relays {
        let bytes = relay.as_bytes();
        if bytes.len() > MAX_RELAY_ADDR_LEN {
            return Err(EncodeError::RelayTooLong {
                len: bytes.len(),
                max: MAX_RELAY_ADDR_LEN,
            });
        }
        push_entry(&mut tlv, TLV_RELAY, bytes);
    }
    push_entry(&mut tlv, TLV_PUBKEY, &pk_bytes);

    Ok(format!(
        "{REFERENCE_PREFIX}{}",
        BASE32_NOPAD.encode(&tlv).to_ascii_lowercase()
    ))
}

/// Decode a reference string back into its parts.
pub fn decode_reference(reference: &str) -> Result<PatchReference, EncodeError> {
    let payload = reference
        .strip_prefix(REFERENCE_PREFIX)
        .ok_or_else(|| EncodeError::Malformed(format!("missing {REFERENCE_PREFIX} prefix")))?;

    let tlv = BASE32_NOPAD
        .decode(payload.to_ascii_uppercase().as_bytes())
        .map_err(|e| EncodeError::Malformed(format!("not valid base32: {e}")))?;

    let mut id = None;
    let mut relays = Vec::new();
    let mut pubkey = None;

    let mut rest = tlv.as_slice();
    while !rest.is_empty() {
        if rest.len() < 2 {
            return Err(EncodeError::Malformed("truncated TLV header".into()));
        }
        let (kind, len) = (rest[0], rest[1] as usize);
        rest = &rest[2..];
        if rest.len() < len {
            return Err(EncodeError::Malformed("truncated TLV value".into()));
        }
        let (value, tail) = rest.split_at(len);
        rest = tail;

        match kind {
            TLV_ID => {
                if value.len() != 32 {
                    return Err(EncodeError::Malformed("id entry is not 32 bytes".into()));
                }
                id = Some(HEXLOWER.encode(value));
            }
            TLV_RELAY => {
                let addr = std::str::from_utf8(value)
                    .map_err(|_| EncodeError::Malformed("relay entry is not UTF-8".into()))?;
                relays.push(addr.to_string());
            }
            TLV_PUBKEY => {
                if value.len() != 32 {
                    return Err(EncodeError::Malformed("pubkey entry is not 32 bytes".into()));
                }
                pubkey = Some(HEXLOWER.encode(value));
            }
            other => {
                return Err(EncodeError::Malformed(format!("unknown TLV type {other}")));
            }
        }
    }

    Ok(PatchReference {
        id: id.ok_or_else(|| EncodeError::Malformed("missing id entry".into()))?,
        relays,
        pubkey: pubkey.ok_or_else(|| EncodeError::Malformed("missing pubkey entry".into()))?,
    })
}

fn push_entry(tlv: &mut Vec<u8>, kind: u8, value: &[u8]) {
    tlv.push(kind);
    tlv.push(value.len() as u8);
    tlv.extend_from_slice(value);
}

fn decode_hex32(hex: &str) -> Result<[u8; 32], String> {
    let bytes = HEXLOWER_PERMISSIVE
        .decode(hex.as_bytes())
        .map_err(|e| format!("not valid hex: {e}"))?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| format!("expected 32 bytes, got {}", b.len()))
}
