//! Binary wire format.
//!
//! ```text
//! IV (16) | EPHEMERAL PUBLIC KEY (65, 0x04..) | CIPHERTEXT (n * 16) | MAC (32)
//! ```
//!
//! There are no length prefixes: the key length follows from the byte at
//! offset 16 and the MAC is always the trailing 32 bytes. Only the
//! uncompressed `0x04` prefix is accepted; a compressed prefix on the wire is
//! treated as tampering.

use log::warn;

use super::EncryptedPayload;
use crate::crypto::{IV_LEN, MAC_LEN, MIN_WIRE_LEN, UNCOMPRESSED_KEY_LEN, UNCOMPRESSED_PREFIX};
use crate::error::EciesError;

/// Shortest input for which the prefix byte and a trailing MAC can both be
/// read, whatever the key size turns out to be.
const ABSOLUTE_MIN_LEN: usize = IV_LEN + 1 + MAC_LEN + 1;

/// Serializes a payload to its wire bytes.
///
/// # Errors
///
/// Returns [`EciesError::InvalidKey`] if the ephemeral key is not in
/// 65-byte uncompressed form.
pub fn serialize(payload: &EncryptedPayload) -> Result<Vec<u8>, EciesError> {
    let key = payload.ephemeral_public_key();
    if key.len() != UNCOMPRESSED_KEY_LEN || key[0] != UNCOMPRESSED_PREFIX {
        return Err(EciesError::InvalidKey(
            "wire format carries 65-byte uncompressed ephemeral keys only".into(),
        ));
    }

    let mut buf = Vec::with_capacity(payload.wire_len());

    buf.extend_from_slice(payload.iv());
    buf.extend_from_slice(key);
    buf.extend_from_slice(payload.ciphertext());
    buf.extend_from_slice(payload.mac());

    Ok(buf)
}

/// Parses wire bytes into a payload.
///
/// The length is checked before the prefix byte is read, and checked again
/// once the key size is known.
///
/// # Errors
///
/// Returns [`EciesError::DecryptionFailed`] if:
/// - the input is too short
/// - the ephemeral key prefix is anything other than `0x04`
/// - the ciphertext is not a whole number of AES blocks
pub fn deserialize(data: &[u8]) -> Result<EncryptedPayload, EciesError> {
    if data.len() < ABSOLUTE_MIN_LEN {
        return Err(too_short(data.len(), ABSOLUTE_MIN_LEN));
    }

    require_uncompressed_prefix(data[IV_LEN])?;

    if data.len() < MIN_WIRE_LEN {
        return Err(too_short(data.len(), MIN_WIRE_LEN));
    }

    let key_end = IV_LEN + UNCOMPRESSED_KEY_LEN;
    let mac_start = data.len() - MAC_LEN;

    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&data[..IV_LEN]);
    let mut mac = [0u8; MAC_LEN];
    mac.copy_from_slice(&data[mac_start..]);

    EncryptedPayload::new(
        iv,
        data[IV_LEN..key_end].to_vec(),
        data[key_end..mac_start].to_vec(),
        mac,
    )
}

/// Lowercase hex of the wire bytes, without a `0x` prefix.
pub fn to_hex(payload: &EncryptedPayload) -> Result<String, EciesError> {
    serialize(payload).map(hex::encode)
}

/// Parses hex wire bytes. Surrounding whitespace and a `0x` prefix are ignored.
pub fn from_hex(text: &str) -> Result<EncryptedPayload, EciesError> {
    let bytes = hex::decode(strip_hex_prefix(text))
        .map_err(|e| EciesError::DecryptionFailed(format!("invalid hex payload: {e}")))?;
    deserialize(&bytes)
}

/// Externally supplied ephemeral keys must carry the `0x04` prefix.
pub(super) fn require_uncompressed_prefix(prefix: u8) -> Result<(), EciesError> {
    if prefix != UNCOMPRESSED_PREFIX {
        warn!("rejected payload with ephemeral key prefix {prefix:#04x}");
        return Err(EciesError::DecryptionFailed(format!(
            "unsupported ephemeral key prefix {prefix:#04x}, expected 0x04"
        )));
    }
    Ok(())
}

/// Strips surrounding whitespace and an optional `0x`/`0X` prefix.
pub fn strip_hex_prefix(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

fn too_short(len: usize, need: usize) -> EciesError {
    EciesError::DecryptionFailed(format!(
        "payload too short: {len} bytes, need at least {need}"
    ))
}
