//! Cryptographic building blocks for the ECIES engine.
//!
//! Fixed scheme parameters, the primitive contract a backend implements,
//! and the two secp256k1 backends.

#[cfg(feature = "native")]
pub mod native;
pub mod primitives;
#[cfg(feature = "pure")]
pub mod pure;
pub mod symmetric;

#[cfg(feature = "native")]
pub use native::NativeBackend;
pub use primitives::CryptoPrimitives;
#[cfg(feature = "pure")]
pub use pure::PureBackend;

/// Length of a secp256k1 private key (32 bytes).
pub const PRIVATE_KEY_LEN: usize = 32;
/// Length of a compressed SEC1 public key (33 bytes).
pub const COMPRESSED_KEY_LEN: usize = 33;
/// Length of an uncompressed SEC1 public key (65 bytes).
pub const UNCOMPRESSED_KEY_LEN: usize = 65;
/// Leading byte of an uncompressed public key.
pub const UNCOMPRESSED_PREFIX: u8 = 0x04;
/// Leading bytes of a compressed public key (even / odd Y).
pub const COMPRESSED_PREFIXES: [u8; 2] = [0x02, 0x03];

/// Length of the ECDH shared X coordinate (32 bytes).
pub const SHARED_X_LEN: usize = 32;

/// AES-256 key length (32 bytes).
pub const AES_KEY_LEN: usize = 32;
/// AES-CBC IV length (16 bytes).
pub const IV_LEN: usize = 16;
/// AES block size; ciphertext is always a positive multiple of it.
pub const BLOCK_LEN: usize = 16;

/// SHA-512 output, split into encryption key and MAC key.
pub const KDF_LEN: usize = 64;
/// HMAC-SHA256 tag length (32 bytes).
pub const MAC_LEN: usize = 32;

/// Smallest wire payload once the ephemeral key is known to be uncompressed.
pub const MIN_WIRE_LEN: usize = IV_LEN + UNCOMPRESSED_KEY_LEN + MAC_LEN + 1;
