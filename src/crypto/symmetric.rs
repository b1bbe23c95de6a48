//! Curve-independent primitives shared by both backends.

use super::{IV_LEN, KDF_LEN, MAC_LEN};
use crate::error::EciesError;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use getrandom::fill;
use hmac::{Hmac, Mac};
use sha2::digest::generic_array::GenericArray;
use sha2::{Digest, Sha256, Sha512};
use subtle::ConstantTimeEq;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// Fill buffer with cryptographically secure random bytes
pub fn secure_random(buf: &mut [u8]) -> Result<(), EciesError> {
    fill(buf).map_err(|e| EciesError::EncryptionFailed(format!("OS random generator unavailable: {e}")))
}

/// SHA-512 of `data`, written into `out`.
pub fn sha512(data: &[u8], out: &mut [u8; KDF_LEN]) {
    Sha512::new()
        .chain_update(data)
        .finalize_into(GenericArray::from_mut_slice(out));
}

/// HMAC-SHA256 over `parts` fed in order, without concatenating them first.
pub fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> Result<[u8; MAC_LEN], EciesError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|_| EciesError::InvalidKey("unusable HMAC key".into()))?;
    for part in parts {
        mac.update(part);
    }

    let mut out = [0u8; MAC_LEN];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

/// Encrypt with AES-256-CBC and PKCS#7 padding
pub fn aes256cbc_encrypt(
    key: &[u8],
    iv: &[u8; IV_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, EciesError> {
    let cipher = Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|_| EciesError::EncryptionFailed("AES-256 key must be 32 bytes".into()))?;

    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypt AES-256-CBC and strip PKCS#7 padding
pub fn aes256cbc_decrypt(
    key: &[u8],
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, EciesError> {
    let cipher = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|_| EciesError::DecryptionFailed("AES-256 key must be 32 bytes".into()))?;

    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| EciesError::DecryptionFailed("invalid padding".into()))
}

/// Equality whose timing does not depend on where the inputs differ.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
