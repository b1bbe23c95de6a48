//! secp256k1 ECIES, byte-compatible with the legacy eccrypto wire format.
//!
//! ```text
//! shared_x  = X(ephemeral_sk * recipient_pk)
//! kdf       = SHA-512(shared_x)             // enc_key = kdf[..32], mac_key = kdf[32..]
//! ciphertext= AES-256-CBC(enc_key, iv, msg) // PKCS#7
//! mac       = HMAC-SHA256(mac_key, iv || ephemeral_pk || ciphertext)
//! wire      = iv || ephemeral_pk || ciphertext || mac
//! ```
//!
//! Two interchangeable backends produce identical output for identical
//! randomness: [`NativeBackend`] (libsecp256k1) and [`PureBackend`] (`k256`).

pub mod crypto;
pub mod engine;
mod error;
pub mod format;

#[cfg(feature = "native")]
pub use crate::crypto::NativeBackend;
#[cfg(feature = "pure")]
pub use crate::crypto::PureBackend;
pub use crate::crypto::CryptoPrimitives;
pub use crate::engine::{Ecies, RecipientKey};
pub use crate::error::EciesError;
pub use crate::format::{
    EncryptedPayload, deserialize, from_hex, serialize, strip_hex_prefix, to_hex,
};

/// Selects a curve backend at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// libsecp256k1 through the `secp256k1` crate.
    #[default]
    Native,
    /// Pure Rust through the `k256` crate.
    Pure,
}

impl Backend {
    /// Builds an engine on this backend.
    ///
    /// # Errors
    ///
    /// Fails if the backend's cargo feature was disabled at build time.
    pub fn engine(self) -> Result<Ecies<dyn CryptoPrimitives>, EciesError> {
        match self {
            #[cfg(feature = "native")]
            Backend::Native => Ok(Ecies::from_boxed(Box::new(NativeBackend::new()))),
            #[cfg(feature = "pure")]
            Backend::Pure => Ok(Ecies::from_boxed(Box::new(PureBackend::new()))),
            #[allow(unreachable_patterns)]
            other => Err(EciesError::EncryptionFailed(format!(
                "{} backend not compiled in",
                other.name()
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Backend::Native => "native",
            Backend::Pure => "pure",
        }
    }

    /// Backends compiled into this build.
    pub fn available() -> Vec<Backend> {
        let mut out = Vec::new();
        if cfg!(feature = "native") {
            out.push(Backend::Native);
        }
        if cfg!(feature = "pure") {
            out.push(Backend::Pure);
        }
        out
    }
}

/// Engine on the preferred backend: native when compiled in, pure otherwise.
pub fn default_engine() -> Result<Ecies<dyn CryptoPrimitives>, EciesError> {
    let backend = Backend::available()
        .into_iter()
        .next()
        .ok_or_else(|| EciesError::EncryptionFailed("no backend compiled in".into()))?;
    backend.engine()
}

/// Encrypts `message` to `public_key` on the default backend.
pub fn encrypt(public_key: &[u8], message: &[u8]) -> Result<EncryptedPayload, EciesError> {
    default_engine()?.encrypt(public_key, message)
}

/// Decrypts `payload` with `private_key` on the default backend.
pub fn decrypt(private_key: &[u8], payload: &EncryptedPayload) -> Result<Vec<u8>, EciesError> {
    default_engine()?.decrypt(private_key, payload)
}

/// Normalizes a public key to 65-byte uncompressed form on the default backend.
pub fn normalize_to_uncompressed(public_key: &[u8]) -> Result<Vec<u8>, EciesError> {
    Ok(default_engine()?
        .normalize_to_uncompressed(public_key)?
        .to_vec())
}
