//! ECIES orchestration.
//!
//! Encrypt: ephemeral key -> ECDH raw X -> SHA-512 split into AES key and MAC
//! key -> AES-256-CBC -> HMAC-SHA256 over `iv || ephemeral key || ciphertext`.
//! Decrypt runs the same derivation and refuses to touch the ciphertext until
//! the MAC has been verified.
//!
//! Every derived secret lives in a zeroizing container, so it is wiped on all
//! exit paths, early returns included.

use log::{debug, warn};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::{
    AES_KEY_LEN, COMPRESSED_KEY_LEN, COMPRESSED_PREFIXES, CryptoPrimitives, IV_LEN, KDF_LEN,
    PRIVATE_KEY_LEN, UNCOMPRESSED_KEY_LEN, UNCOMPRESSED_PREFIX, symmetric,
};
use crate::error::EciesError;
use crate::format::EncryptedPayload;

/// Random draws allowed before ephemeral key generation gives up. A single
/// draw is invalid with probability below 2^-127.
const MAX_EPHEMERAL_DRAWS: usize = 64;

/// ECIES engine over a pluggable primitive backend.
pub struct Ecies<P: CryptoPrimitives + ?Sized> {
    primitives: Box<P>,
}

impl<P: CryptoPrimitives> Ecies<P> {
    pub fn new(primitives: P) -> Self {
        Self {
            primitives: Box::new(primitives),
        }
    }
}

impl Ecies<dyn CryptoPrimitives> {
    /// Engine over a backend chosen at runtime.
    pub fn from_boxed(primitives: Box<dyn CryptoPrimitives>) -> Self {
        Self { primitives }
    }
}

/// A recipient public key that has been normalized to 65 bytes and checked
/// to lie on the curve.
///
/// Only [`Ecies::recipient_key`] builds one, so holding a `RecipientKey`
/// is proof of validation: encrypting to the same recipient many times
/// through [`Ecies::encrypt_to`] validates the point once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientKey {
    bytes: [u8; UNCOMPRESSED_KEY_LEN],
}

impl RecipientKey {
    pub fn as_bytes(&self) -> &[u8; UNCOMPRESSED_KEY_LEN] {
        &self.bytes
    }
}

/// SHA-512 of the shared X coordinate: AES key first, MAC key second.
#[derive(Zeroize, ZeroizeOnDrop)]
struct DerivedKeys {
    kdf: [u8; KDF_LEN],
}

impl DerivedKeys {
    fn derive<P: CryptoPrimitives + ?Sized>(primitives: &P, shared_x: &[u8]) -> Self {
        let mut keys = Self { kdf: [0u8; KDF_LEN] };
        primitives.sha512(shared_x, &mut keys.kdf);
        keys
    }

    fn encryption_key(&self) -> &[u8] {
        &self.kdf[..AES_KEY_LEN]
    }

    fn mac_key(&self) -> &[u8] {
        &self.kdf[AES_KEY_LEN..]
    }
}

impl<P: CryptoPrimitives + ?Sized> Ecies<P> {
    /// Name of the backend this engine runs on.
    pub fn backend_name(&self) -> &'static str {
        self.primitives.name()
    }

    pub fn primitives(&self) -> &P {
        &self.primitives
    }

    /// Normalizes a SEC1 public key to its 65-byte uncompressed form.
    ///
    /// Accepts a 65-byte `0x04` key (validated on-curve) or a 33-byte
    /// `0x02`/`0x03` key (decompressed). Anything else, including 64 raw
    /// coordinate bytes, is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`EciesError::InvalidKey`] on wrong length, wrong prefix or an
    /// off-curve point.
    pub fn normalize_to_uncompressed(
        &self,
        public_key: &[u8],
    ) -> Result<[u8; UNCOMPRESSED_KEY_LEN], EciesError> {
        match public_key.len() {
            UNCOMPRESSED_KEY_LEN => {
                if public_key[0] != UNCOMPRESSED_PREFIX {
                    return Err(EciesError::InvalidKey(format!(
                        "65-byte public key must start with 0x04, got {:#04x}",
                        public_key[0]
                    )));
                }
                if !self.primitives.is_valid_public_key(public_key) {
                    return Err(EciesError::InvalidKey(
                        "public key is not a point on secp256k1".into(),
                    ));
                }

                let mut key = [0u8; UNCOMPRESSED_KEY_LEN];
                key.copy_from_slice(public_key);
                Ok(key)
            }
            COMPRESSED_KEY_LEN => {
                if !COMPRESSED_PREFIXES.contains(&public_key[0]) {
                    return Err(EciesError::InvalidKey(format!(
                        "33-byte public key must start with 0x02 or 0x03, got {:#04x}",
                        public_key[0]
                    )));
                }
                self.primitives
                    .decompress_public_key(public_key)
                    .ok_or_else(|| {
                        EciesError::InvalidKey(
                            "compressed public key is not a point on secp256k1".into(),
                        )
                    })
            }
            len => Err(EciesError::InvalidKey(format!(
                "public key must be {COMPRESSED_KEY_LEN} or {UNCOMPRESSED_KEY_LEN} bytes, got {len}"
            ))),
        }
    }

    /// Validates a recipient key once for repeated [`Ecies::encrypt_to`] calls.
    pub fn recipient_key(&self, public_key: &[u8]) -> Result<RecipientKey, EciesError> {
        if public_key.is_empty() {
            return Err(EciesError::InvalidKey("public key is empty".into()));
        }

        Ok(RecipientKey {
            bytes: self.normalize_to_uncompressed(public_key)?,
        })
    }

    /// Derives the public key of `private_key`, compressed (33 bytes) or
    /// uncompressed (65 bytes).
    pub fn public_key(&self, private_key: &[u8], compressed: bool) -> Result<Vec<u8>, EciesError> {
        self.check_private_key(private_key)?;
        self.primitives
            .derive_public_key(private_key, compressed)
            .ok_or_else(|| EciesError::InvalidKey("could not derive public key".into()))
    }

    /// Encrypts `message` to `public_key` (33 or 65 bytes).
    ///
    /// An empty message is allowed and yields one block of padding.
    pub fn encrypt(&self, public_key: &[u8], message: &[u8]) -> Result<EncryptedPayload, EciesError> {
        let recipient = self.recipient_key(public_key)?;
        self.encrypt_to(&recipient, message)
    }

    /// Encrypts `message` to an already validated recipient.
    pub fn encrypt_to(
        &self,
        recipient: &RecipientKey,
        message: &[u8],
    ) -> Result<EncryptedPayload, EciesError> {
        debug!(
            "ecies encrypt: {} byte message, {} backend",
            message.len(),
            self.backend_name()
        );

        let ephemeral_private_key = self.generate_ephemeral_key()?;
        let ephemeral_public_key = self
            .primitives
            .derive_public_key(&ephemeral_private_key[..], false)
            .filter(|k| k.len() == UNCOMPRESSED_KEY_LEN)
            .ok_or_else(|| {
                EciesError::EncryptionFailed("could not derive ephemeral public key".into())
            })?;

        let shared_x = self
            .primitives
            .ecdh_x_coordinate(recipient.as_bytes(), &ephemeral_private_key[..])?;
        drop(ephemeral_private_key);

        let keys = DerivedKeys::derive(&*self.primitives, &shared_x[..]);
        drop(shared_x);

        let mut iv = [0u8; IV_LEN];
        self.primitives.random_bytes(&mut iv)?;

        let ciphertext = self
            .primitives
            .aes256cbc_encrypt(keys.encryption_key(), &iv, message)?;

        // encrypt-then-MAC, over the wire form of the ephemeral key
        let mac = self
            .primitives
            .hmac_sha256(
                keys.mac_key(),
                &[&iv[..], &ephemeral_public_key[..], &ciphertext[..]],
            )
            .map_err(|e| EciesError::EncryptionFailed(e.to_string()))?;

        EncryptedPayload::new(iv, ephemeral_public_key, ciphertext, mac)
            .map_err(|e| EciesError::EncryptionFailed(e.to_string()))
    }

    /// Decrypts `payload` with the recipient's 32-byte private key.
    ///
    /// # Errors
    ///
    /// - [`EciesError::InvalidKey`] for a bad private key or ephemeral key
    /// - [`EciesError::MacMismatch`] if authentication fails; the ciphertext
    ///   is not decrypted in that case
    /// - [`EciesError::DecryptionFailed`] for padding errors
    pub fn decrypt(
        &self,
        private_key: &[u8],
        payload: &EncryptedPayload,
    ) -> Result<Vec<u8>, EciesError> {
        self.check_private_key(private_key)?;
        debug!(
            "ecies decrypt: {} byte ciphertext, {} backend",
            payload.ciphertext().len(),
            self.backend_name()
        );

        // field lengths are enforced by EncryptedPayload::new
        let ephemeral = self.normalize_to_uncompressed(payload.ephemeral_public_key())?;

        let shared_x = self.primitives.ecdh_x_coordinate(&ephemeral, private_key)?;
        let keys = DerivedKeys::derive(&*self.primitives, &shared_x[..]);
        drop(shared_x);

        // MAC covers the key bytes as received, not the normalized form
        let expected_mac = self
            .primitives
            .hmac_sha256(
                keys.mac_key(),
                &[
                    &payload.iv()[..],
                    payload.ephemeral_public_key(),
                    payload.ciphertext(),
                ],
            )
            .map_err(|e| EciesError::DecryptionFailed(e.to_string()))?;

        if !symmetric::constant_time_eq(&expected_mac, payload.mac()) {
            warn!("ecies decrypt: MAC mismatch");
            return Err(EciesError::MacMismatch);
        }

        self.primitives
            .aes256cbc_decrypt(keys.encryption_key(), payload.iv(), payload.ciphertext())
    }

    fn check_private_key(&self, private_key: &[u8]) -> Result<(), EciesError> {
        if private_key.len() != PRIVATE_KEY_LEN {
            return Err(EciesError::InvalidKey(format!(
                "private key must be {PRIVATE_KEY_LEN} bytes, got {}",
                private_key.len()
            )));
        }
        if !self.primitives.is_valid_private_key(private_key) {
            return Err(EciesError::InvalidKey(
                "private key is not a valid secp256k1 scalar".into(),
            ));
        }
        Ok(())
    }

    fn generate_ephemeral_key(&self) -> Result<Zeroizing<[u8; PRIVATE_KEY_LEN]>, EciesError> {
        let mut key = Zeroizing::new([0u8; PRIVATE_KEY_LEN]);

        for _ in 0..MAX_EPHEMERAL_DRAWS {
            self.primitives.random_bytes(&mut key[..])?;
            if self.primitives.is_valid_private_key(&key[..]) {
                return Ok(key);
            }
            debug!("ephemeral scalar out of range, redrawing");
        }

        Err(EciesError::EncryptionFailed(
            "random source never produced a valid ephemeral key".into(),
        ))
    }
}
