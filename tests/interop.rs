#![cfg(all(feature = "native", feature = "pure"))]

use std::collections::VecDeque;
use std::sync::Mutex;

use ecies_legacy::crypto::{IV_LEN, KDF_LEN, MAC_LEN, SHARED_X_LEN, UNCOMPRESSED_KEY_LEN};
use ecies_legacy::{
    CryptoPrimitives, Ecies, EciesError, NativeBackend, PureBackend, deserialize, from_hex,
    serialize,
};
use zeroize::Zeroizing;

const SK: &str = "1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";
const PK: &str = "04bb50e2d89a4ed70663d080659fe0ad4b9bc3e06c17a227433966cb59ceee020d\
                  ecddbf6e00192011648d13b1c00af770c0c1bb609d4d3a5c98a43772e0e18ef4";

const LEGACY_HELLO: &str = include_str!("vectors/legacy_hello.hex");
const LEGACY_EMPTY: &str = include_str!("vectors/legacy_empty.hex");
const LEGACY_LARGE: &str = include_str!("vectors/legacy_large.hex");

fn bytes(h: &str) -> Vec<u8> {
    hex::decode(h.trim()).unwrap()
}

fn large_message() -> Vec<u8> {
    (0..12288u32).map(|i| (i % 251) as u8).collect()
}

/// Randomness and the inputs that produced each legacy vector.
fn legacy_cases() -> Vec<(&'static str, Vec<u8>, Vec<u8>, &'static str)> {
    vec![
        (
            "0b1e4b9d1f1c2a3e4d5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5",
            (0u8..16).collect(),
            b"hello".to_vec(),
            LEGACY_HELLO,
        ),
        (
            "2c8f1e0d3b4a59687766554433221100ffeeddccbbaa99887766554433221101",
            vec![0xa5; 16],
            Vec::new(),
            LEGACY_EMPTY,
        ),
        (
            "5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a",
            (100u8..116).collect(),
            large_message(),
            LEGACY_LARGE,
        ),
    ]
}

/// Delegates to a real backend but serves random bytes from a fixed tape.
struct Scripted<P> {
    inner: P,
    tape: Mutex<VecDeque<u8>>,
}

impl<P: CryptoPrimitives> Scripted<P> {
    fn new(inner: P, tape: Vec<u8>) -> Self {
        Self {
            inner,
            tape: Mutex::new(tape.into()),
        }
    }
}

impl<P: CryptoPrimitives> CryptoPrimitives for Scripted<P> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn random_bytes(&self, buf: &mut [u8]) -> Result<(), EciesError> {
        let mut tape = self.tape.lock().unwrap();
        if tape.len() < buf.len() {
            return Err(EciesError::EncryptionFailed("tape exhausted".into()));
        }
        for b in buf.iter_mut() {
            *b = tape.pop_front().unwrap();
        }
        Ok(())
    }

    fn is_valid_private_key(&self, key: &[u8]) -> bool {
        self.inner.is_valid_private_key(key)
    }

    fn derive_public_key(&self, private_key: &[u8], compressed: bool) -> Option<Vec<u8>> {
        self.inner.derive_public_key(private_key, compressed)
    }

    fn is_valid_public_key(&self, key: &[u8]) -> bool {
        self.inner.is_valid_public_key(key)
    }

    fn decompress_public_key(&self, key: &[u8]) -> Option<[u8; UNCOMPRESSED_KEY_LEN]> {
        self.inner.decompress_public_key(key)
    }

    fn ecdh_x_coordinate(
        &self,
        their_public_key: &[u8],
        our_private_key: &[u8],
    ) -> Result<Zeroizing<[u8; SHARED_X_LEN]>, EciesError> {
        self.inner.ecdh_x_coordinate(their_public_key, our_private_key)
    }

    fn sha512(&self, data: &[u8], out: &mut [u8; KDF_LEN]) {
        self.inner.sha512(data, out)
    }

    fn hmac_sha256(&self, key: &[u8], parts: &[&[u8]]) -> Result<[u8; MAC_LEN], EciesError> {
        self.inner.hmac_sha256(key, parts)
    }

    fn aes256cbc_encrypt(
        &self,
        key: &[u8],
        iv: &[u8; IV_LEN],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, EciesError> {
        self.inner.aes256cbc_encrypt(key, iv, plaintext)
    }

    fn aes256cbc_decrypt(
        &self,
        key: &[u8],
        iv: &[u8; IV_LEN],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, EciesError> {
        self.inner.aes256cbc_decrypt(key, iv, ciphertext)
    }
}

#[test]
fn legacy_vectors_decrypt_on_native() {
    let ecies = Ecies::new(NativeBackend::new());
    for (_, _, message, vector) in legacy_cases() {
        let payload = from_hex(vector).unwrap();
        assert_eq!(ecies.decrypt(&bytes(SK), &payload).unwrap(), message);
    }
}

#[test]
fn legacy_vectors_decrypt_on_pure() {
    let ecies = Ecies::new(PureBackend::new());
    for (_, _, message, vector) in legacy_cases() {
        let payload = from_hex(vector).unwrap();
        assert_eq!(ecies.decrypt(&bytes(SK), &payload).unwrap(), message);
    }
}

#[test]
fn legacy_large_vector_is_over_ten_kib() {
    let payload = from_hex(LEGACY_LARGE).unwrap();
    assert!(payload.ciphertext().len() >= 10 * 1024);
}

#[test]
fn fixed_randomness_reproduces_legacy_bytes_on_both_backends() {
    for (eph, iv, message, vector) in legacy_cases() {
        let tape = [bytes(eph), iv].concat();

        let native = Ecies::new(Scripted::new(NativeBackend::new(), tape.clone()));
        let pure = Ecies::new(Scripted::new(PureBackend::new(), tape));

        let a = serialize(&native.encrypt(&bytes(PK), &message).unwrap()).unwrap();
        let b = serialize(&pure.encrypt(&bytes(PK), &message).unwrap()).unwrap();

        assert_eq!(a, b);
        assert_eq!(a, bytes(vector));
    }
}

#[test]
fn out_of_range_ephemeral_draw_is_redrawn() {
    let (eph, iv, message, vector) = legacy_cases().remove(0);
    // zero and 0xff.. are both invalid scalars
    let tape = [vec![0u8; 32], vec![0xff; 32], bytes(eph), iv].concat();

    let ecies = Ecies::new(Scripted::new(PureBackend::new(), tape));
    let payload = ecies.encrypt(&bytes(PK), &message).unwrap();
    assert_eq!(serialize(&payload).unwrap(), bytes(vector));
}

#[test]
fn exhausted_randomness_is_encryption_failure() {
    let ecies = Ecies::new(Scripted::new(NativeBackend::new(), vec![1u8; 20]));
    assert!(matches!(
        ecies.encrypt(&bytes(PK), b"hello"),
        Err(EciesError::EncryptionFailed(_))
    ));
}

#[test]
fn cross_backend_roundtrip() {
    let native = Ecies::new(NativeBackend::new());
    let pure = Ecies::new(PureBackend::new());
    let messages: Vec<Vec<u8>> = vec![
        Vec::new(),
        b"hello".to_vec(),
        vec![0u8; 15],
        vec![1u8; 16],
        vec![2u8; 17],
        large_message(),
    ];

    for message in &messages {
        let from_native = native.encrypt(&bytes(PK), message).unwrap();
        assert_eq!(&pure.decrypt(&bytes(SK), &from_native).unwrap(), message);

        let from_pure = pure.encrypt(&bytes(PK), message).unwrap();
        assert_eq!(&native.decrypt(&bytes(SK), &from_pure).unwrap(), message);
    }
}

#[test]
fn cross_backend_roundtrip_through_wire_bytes() {
    let native = Ecies::new(NativeBackend::new());
    let pure = Ecies::new(PureBackend::new());

    let wire = serialize(&pure.encrypt(&bytes(PK), b"grant").unwrap()).unwrap();
    let payload = deserialize(&wire).unwrap();
    assert_eq!(native.decrypt(&bytes(SK), &payload).unwrap(), b"grant");
}

#[test]
fn backends_agree_on_key_operations() {
    let native = NativeBackend::new();
    let pure = PureBackend::new();

    for seed in 1u8..=16 {
        let sk = [seed; 32];
        let full = native.derive_public_key(&sk, false).unwrap();
        let short = native.derive_public_key(&sk, true).unwrap();

        assert_eq!(pure.derive_public_key(&sk, false).unwrap(), full);
        assert_eq!(pure.derive_public_key(&sk, true).unwrap(), short);
        assert_eq!(
            native.decompress_public_key(&short),
            pure.decompress_public_key(&short)
        );
        assert_eq!(
            *native.ecdh_x_coordinate(&bytes(PK), &sk).unwrap(),
            *pure.ecdh_x_coordinate(&bytes(PK), &sk).unwrap()
        );
    }
}

#[test]
fn tampered_legacy_vector_fails_on_both_backends() {
    let mut wire = bytes(LEGACY_HELLO);
    let last = wire.len() - 1;
    wire[last] ^= 0x01;
    let payload = deserialize(&wire).unwrap();

    for ecies in [
        Ecies::from_boxed(Box::new(NativeBackend::new())),
        Ecies::from_boxed(Box::new(PureBackend::new())),
    ] {
        assert_eq!(ecies.decrypt(&bytes(SK), &payload), Err(EciesError::MacMismatch));
    }
}
