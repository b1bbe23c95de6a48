//! The primitive contract a platform backend supplies.
//!
//! Implementations carry no ECIES logic of their own: they only expose curve
//! operations, hashing, MAC and block cipher calls. Everything that depends
//! on ordering or on the wire format lives in [`crate::engine`].

use zeroize::Zeroizing;

use super::{IV_LEN, KDF_LEN, MAC_LEN, SHARED_X_LEN, UNCOMPRESSED_KEY_LEN};
use crate::error::EciesError;

pub trait CryptoPrimitives: Send + Sync {
    /// Short backend identifier, used in logs.
    fn name(&self) -> &'static str;

    /// Fill `buf` with cryptographically secure random bytes.
    fn random_bytes(&self, buf: &mut [u8]) -> Result<(), EciesError>;

    /// `true` if `key` is exactly 32 bytes and a scalar in `[1, n)`.
    fn is_valid_private_key(&self, key: &[u8]) -> bool;

    /// SEC1 public key for `private_key`, 33 bytes if `compressed`, else 65.
    ///
    /// `None` if the private key is invalid.
    fn derive_public_key(&self, private_key: &[u8], compressed: bool) -> Option<Vec<u8>>;

    /// `true` if `key` parses as a SEC1 point on the curve.
    fn is_valid_public_key(&self, key: &[u8]) -> bool;

    /// Expand a 33-byte compressed key into its 65-byte uncompressed form.
    fn decompress_public_key(&self, key: &[u8]) -> Option<[u8; UNCOMPRESSED_KEY_LEN]>;

    /// Raw X coordinate of `private_key * their_public_key`.
    ///
    /// Must NOT hash the shared point; the legacy format feeds the bare
    /// coordinate into SHA-512.
    fn ecdh_x_coordinate(
        &self,
        their_public_key: &[u8],
        our_private_key: &[u8],
    ) -> Result<Zeroizing<[u8; SHARED_X_LEN]>, EciesError>;

    /// Writes the SHA-512 digest of `data` into `out`.
    fn sha512(&self, data: &[u8], out: &mut [u8; KDF_LEN]);

    /// HMAC-SHA256 over the concatenation of `parts`.
    fn hmac_sha256(&self, key: &[u8], parts: &[&[u8]]) -> Result<[u8; MAC_LEN], EciesError>;

    /// AES-256-CBC with PKCS#7 padding.
    fn aes256cbc_encrypt(
        &self,
        key: &[u8],
        iv: &[u8; IV_LEN],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, EciesError>;

    /// AES-256-CBC decryption. Fails closed on bad padding.
    fn aes256cbc_decrypt(
        &self,
        key: &[u8],
        iv: &[u8; IV_LEN],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, EciesError>;
}
