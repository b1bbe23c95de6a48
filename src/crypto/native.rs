//! Backend built on the `secp256k1` crate (bindings to the C libsecp256k1).

use secp256k1::{All, PublicKey, Secp256k1, SecretKey, ecdh};
use zeroize::{Zeroize, Zeroizing};

use super::{
    COMPRESSED_KEY_LEN, COMPRESSED_PREFIXES, CryptoPrimitives, IV_LEN, KDF_LEN, MAC_LEN,
    PRIVATE_KEY_LEN, SHARED_X_LEN, UNCOMPRESSED_KEY_LEN, UNCOMPRESSED_PREFIX, symmetric,
};
use crate::error::EciesError;

/// libsecp256k1-backed primitives.
///
/// Holds one signing + verification context so its precomputed tables are
/// built once per backend instead of once per call.
pub struct NativeBackend {
    secp: Secp256k1<All>,
}

impl NativeBackend {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    // libsecp256k1 keys are `Copy` and cannot implement `Zeroize`; callers
    // run `non_secure_erase` on the copy they hold, which is all the crate
    // exposes. Copies made inside the library are out of reach.
    fn secret_key(key: &[u8]) -> Option<SecretKey> {
        if key.len() != PRIVATE_KEY_LEN {
            return None;
        }
        SecretKey::from_slice(key).ok()
    }

    // libsecp256k1 also parses the hybrid 0x06/0x07 encodings; the legacy
    // format never produces them, so they are refused before parsing.
    fn public_key(key: &[u8]) -> Option<PublicKey> {
        match key.first() {
            Some(&p) if p == UNCOMPRESSED_PREFIX || COMPRESSED_PREFIXES.contains(&p) => {
                PublicKey::from_slice(key).ok()
            }
            _ => None,
        }
    }
}

impl Default for NativeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoPrimitives for NativeBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn random_bytes(&self, buf: &mut [u8]) -> Result<(), EciesError> {
        symmetric::secure_random(buf)
    }

    fn is_valid_private_key(&self, key: &[u8]) -> bool {
        Self::secret_key(key).is_some()
    }

    fn derive_public_key(&self, private_key: &[u8], compressed: bool) -> Option<Vec<u8>> {
        let mut sk = Self::secret_key(private_key)?;
        let pk = PublicKey::from_secret_key(&self.secp, &sk);
        sk.non_secure_erase();

        Some(if compressed {
            pk.serialize().to_vec()
        } else {
            pk.serialize_uncompressed().to_vec()
        })
    }

    fn is_valid_public_key(&self, key: &[u8]) -> bool {
        Self::public_key(key).is_some()
    }

    fn decompress_public_key(&self, key: &[u8]) -> Option<[u8; UNCOMPRESSED_KEY_LEN]> {
        if key.len() != COMPRESSED_KEY_LEN {
            return None;
        }
        Self::public_key(key).map(|pk| pk.serialize_uncompressed())
    }

    fn ecdh_x_coordinate(
        &self,
        their_public_key: &[u8],
        our_private_key: &[u8],
    ) -> Result<Zeroizing<[u8; SHARED_X_LEN]>, EciesError> {
        let pk = Self::public_key(their_public_key)
            .ok_or_else(|| EciesError::EcdhFailed("public key is not a curve point".into()))?;
        let mut sk = Self::secret_key(our_private_key)
            .ok_or_else(|| EciesError::EcdhFailed("private key is not a valid scalar".into()))?;

        // x || y of the shared point, unhashed
        let mut point = ecdh::shared_secret_point(&pk, &sk);
        sk.non_secure_erase();

        let mut x = Zeroizing::new([0u8; SHARED_X_LEN]);
        x.copy_from_slice(&point[..SHARED_X_LEN]);
        point.zeroize();

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
