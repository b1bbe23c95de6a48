//! Portable backend built on the pure-Rust `k256` crate.

use k256::{PublicKey, SecretKey, ecdh::diffie_hellman, elliptic_curve::sec1::ToEncodedPoint};
use zeroize::Zeroizing;

use super::{
    COMPRESSED_KEY_LEN, COMPRESSED_PREFIXES, CryptoPrimitives, IV_LEN, KDF_LEN, MAC_LEN,
    PRIVATE_KEY_LEN, SHARED_X_LEN, UNCOMPRESSED_KEY_LEN, UNCOMPRESSED_PREFIX, symmetric,
};
use crate::error::EciesError;

#[derive(Debug, Default, Clone, Copy)]
pub struct PureBackend;

impl PureBackend {
    pub fn new() -> Self {
        Self
    }

    // `SecretKey::from_slice` left-pads short input, so the length is
    // checked here first.
    fn secret_key(key: &[u8]) -> Option<SecretKey> {
        if key.len() != PRIVATE_KEY_LEN {
            return None;
        }
        SecretKey::from_slice(key).ok()
    }

    fn public_key(key: &[u8]) -> Option<PublicKey> {
        match key.first() {
            Some(&p) if p == UNCOMPRESSED_PREFIX || COMPRESSED_PREFIXES.contains(&p) => {
                PublicKey::from_sec1_bytes(key).ok()
            }
            _ => None,
        }
    }
}

impl CryptoPrimitives for PureBackend {
    fn name(&self) -> &'static str {
        "pure"
    }

    fn random_bytes(&self, buf: &mut [u8]) -> Result<(), EciesError> {
        symmetric::secure_random(buf)
    }

    fn is_valid_private_key(&self, key: &[u8]) -> bool {
        Self::secret_key(key).is_some()
    }

    fn derive_public_key(&self, private_key: &[u8], compressed: bool) -> Option<Vec<u8>> {
        let sk = Self::secret_key(private_key)?;
        Some(
            sk.public_key()
                .to_encoded_point(compressed)
                .as_bytes()
                .to_vec(),
        )
    }

    fn is_valid_public_key(&self, key: &[u8]) -> bool {
        Self::public_key(key).is_some()
    }

    fn decompress_public_key(&self, key: &[u8]) -> Option<[u8; UNCOMPRESSED_KEY_LEN]> {
        if key.len() != COMPRESSED_KEY_LEN {
            return None;
        }
        let pk = Self::public_key(key)?;
        pk.to_encoded_point(false).as_bytes().try_into().ok()
    }

    fn ecdh_x_coordinate(
        &self,
        their_public_key: &[u8],
        our_private_key: &[u8],
    ) -> Result<Zeroizing<[u8; SHARED_X_LEN]>, EciesError> {
        let pk = Self::public_key(their_public_key)
            .ok_or_else(|| EciesError::EcdhFailed("public key is not a curve point".into()))?;
        let sk = Self::secret_key(our_private_key)
            .ok_or_else(|| EciesError::EcdhFailed("private key is not a valid scalar".into()))?;

        // SharedSecret zeroizes itself on drop
        let shared = diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine());

        let mut x = Zeroizing::new([0u8; SHARED_X_LEN]);
        x.copy_from_slice(shared.raw_secret_bytes());
        Ok(x)
    }

    fn sha512(&self, data: &[u8], out: &mut [u8; KDF_LEN]) {
        symmetric::sha512(data, out)
    }

    fn hmac_sha256(&self, key: &[u8], parts: &[&[u8]]) -> Result<[u8; MAC_LEN], EciesError> {
        symmetric::hmac_sha256(key, parts)
    }

    fn aes256cbc_encrypt(
        &self,
        key: &[u8],
        iv: &[u8; IV_LEN],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, EciesError> {
        symmetric::aes256cbc_encrypt(key, iv, plaintext)
    }

    fn aes256cbc_decrypt(
        &self,
        key: &[u8],
        iv: &[u8; IV_LEN],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, EciesError> {
        symmetric::aes256cbc_decrypt(key, iv, ciphertext)
    }
}
