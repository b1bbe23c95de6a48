//! The encrypted payload and its external representations.
//!
//! The binary wire layout lives in [`wire`]; this module owns the in-memory
//! structure and its JSON object form.

use serde::{Deserialize, Serialize};

use crate::crypto::{
    BLOCK_LEN, COMPRESSED_KEY_LEN, COMPRESSED_PREFIXES, IV_LEN, MAC_LEN, UNCOMPRESSED_KEY_LEN,
    UNCOMPRESSED_PREFIX,
};
use crate::error::EciesError;

pub mod wire;

pub use wire::{deserialize, from_hex, serialize, strip_hex_prefix, to_hex};

/// Output of one encryption: everything a recipient needs besides its key.
///
/// Immutable once built. The ephemeral key may be held in compressed form in
/// memory, but only the 65-byte `0x04` form can be serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PayloadJson", into = "PayloadJson")]
pub struct EncryptedPayload {
    iv: [u8; IV_LEN],
    ephemeral_public_key: Vec<u8>,
    ciphertext: Vec<u8>,
    mac: [u8; MAC_LEN],
}

impl EncryptedPayload {
    /// Builds a payload, checking the structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`EciesError::DecryptionFailed`] if:
    /// - the ephemeral key is neither 33 bytes (`0x02`/`0x03`) nor 65 bytes (`0x04`)
    /// - the ciphertext is empty or not a whole number of AES blocks
    pub fn new(
        iv: [u8; IV_LEN],
        ephemeral_public_key: Vec<u8>,
        ciphertext: Vec<u8>,
        mac: [u8; MAC_LEN],
    ) -> Result<Self, EciesError> {
        let key_shape_ok = match (ephemeral_public_key.len(), ephemeral_public_key.first()) {
            (UNCOMPRESSED_KEY_LEN, Some(&p)) => p == UNCOMPRESSED_PREFIX,
            (COMPRESSED_KEY_LEN, Some(p)) => COMPRESSED_PREFIXES.contains(p),
            _ => false,
        };
        if !key_shape_ok {
            return Err(EciesError::DecryptionFailed(format!(
                "malformed ephemeral public key ({} bytes)",
                ephemeral_public_key.len()
            )));
        }

        if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
            return Err(EciesError::DecryptionFailed(format!(
                "ciphertext length {} is not a positive multiple of {BLOCK_LEN}",
                ciphertext.len()
            )));
        }

        Ok(Self {
            iv,
            ephemeral_public_key,
            ciphertext,
            mac,
        })
    }

    /// Returns the AES-CBC initialization vector.
    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    /// Returns the sender's one-time public key.
    pub fn ephemeral_public_key(&self) -> &[u8] {
        &self.ephemeral_public_key
    }

    /// Returns the AES-256-CBC ciphertext.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Returns the HMAC-SHA256 tag.
    pub fn mac(&self) -> &[u8; MAC_LEN] {
        &self.mac
    }

    /// Total size of the wire encoding.
    pub fn wire_len(&self) -> usize {
        IV_LEN + self.ephemeral_public_key.len() + self.ciphertext.len() + MAC_LEN
    }
}

/// Object form used by legacy callers: every field as lowercase hex.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayloadJson {
    iv: String,
    ephem_public_key: String,
    ciphertext: String,
    mac: String,
}

impl From<EncryptedPayload> for PayloadJson {
    fn from(p: EncryptedPayload) -> Self {
        Self {
            iv: hex::encode(p.iv),
            ephem_public_key: hex::encode(&p.ephemeral_public_key),
            ciphertext: hex::encode(&p.ciphertext),
            mac: hex::encode(p.mac),
        }
    }
}

impl TryFrom<PayloadJson> for EncryptedPayload {
    type Error = EciesError;

    fn try_from(json: PayloadJson) -> Result<Self, Self::Error> {
        let iv = decode_field::<IV_LEN>("iv", &json.iv)?;
        let mac = decode_field::<MAC_LEN>("mac", &json.mac)?;
        let ephemeral_public_key = hex::decode(&json.ephem_public_key)
            .map_err(|e| EciesError::DecryptionFailed(format!("ephemPublicKey: {e}")))?;
        let prefix = ephemeral_public_key.first().copied().ok_or_else(|| {
            EciesError::DecryptionFailed("ephemPublicKey: empty".into())
        })?;
        wire::require_uncompressed_prefix(prefix)?;
        let ciphertext = hex::decode(&json.ciphertext)
            .map_err(|e| EciesError::DecryptionFailed(format!("ciphertext: {e}")))?;

        EncryptedPayload::new(iv, ephemeral_public_key, ciphertext, mac)
    }
}

fn decode_field<const N: usize>(name: &str, value: &str) -> Result<[u8; N], EciesError> {
    let bytes =
        hex::decode(value).map_err(|e| EciesError::DecryptionFailed(format!("{name}: {e}")))?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        EciesError::DecryptionFailed(format!("{name}: expected {N} bytes, got {len}"))
    })
}
