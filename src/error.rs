use std::fmt;

/// Errors returned by every ECIES operation.
///
/// The attached string is a human-readable reason. Branch on the variant
/// (or on [`EciesError::code`]), never on the message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EciesError {
    /// Wrong length, unsupported prefix or off-curve key.
    InvalidKey(String),
    /// Ephemeral key generation or cipher failure while encrypting.
    EncryptionFailed(String),
    /// Malformed payload, bad padding or any non-MAC decryption fault.
    DecryptionFailed(String),
    /// The payload failed authentication: tampered data or the wrong key.
    MacMismatch,
    /// Shared secret computation failed.
    EcdhFailed(String),
}

impl EciesError {
    /// Stable machine-readable code for the variant.
    pub fn code(&self) -> &'static str {
        match self {
            EciesError::InvalidKey(_) => "INVALID_KEY",
            EciesError::EncryptionFailed(_) => "ENCRYPTION_FAILED",
            EciesError::DecryptionFailed(_) => "DECRYPTION_FAILED",
            EciesError::MacMismatch => "MAC_MISMATCH",
            EciesError::EcdhFailed(_) => "ECDH_FAILED",
        }
    }
}

impl fmt::Display for EciesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EciesError::InvalidKey(r) => write!(f, "invalid key: {r}"),
            EciesError::EncryptionFailed(r) => write!(f, "encryption failed: {r}"),
            EciesError::DecryptionFailed(r) => write!(f, "decryption failed: {r}"),
            EciesError::MacMismatch => write!(f, "MAC mismatch: payload tampered or wrong key"),
            EciesError::EcdhFailed(r) => write!(f, "ECDH failed: {r}"),
        }
    }
}

impl std::error::Error for EciesError {}
