use ecies_legacy::{Backend, EncryptedPayload, default_engine, deserialize, serialize};
use proptest::collection::vec;
use proptest::prelude::*;

const SK: &str = "1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";

fn keypair() -> (Vec<u8>, Vec<u8>) {
    let sk = hex::decode(SK).unwrap();
    let pk = default_engine().unwrap().public_key(&sk, false).unwrap();
    (sk, pk)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn encrypt_then_decrypt_returns_message(message in vec(any::<u8>(), 0..600)) {
        let (sk, pk) = keypair();
        for backend in Backend::available() {
            let ecies = backend.engine().unwrap();
            let payload = ecies.encrypt(&pk, &message).unwrap();
            prop_assert_eq!(ecies.decrypt(&sk, &payload).unwrap(), message.clone());
        }
    }

    #[test]
    fn any_single_bit_flip_is_detected(
        message in vec(any::<u8>(), 0..64),
        bit_seed in any::<usize>(),
    ) {
        let (sk, pk) = keypair();
        let ecies = default_engine().unwrap();
        let mut wire = serialize(&ecies.encrypt(&pk, &message).unwrap()).unwrap();

        let bit = bit_seed % (wire.len() * 8);
        wire[bit / 8] ^= 1 << (bit % 8);

        let outcome = deserialize(&wire).and_then(|p| ecies.decrypt(&sk, &p));
        prop_assert!(outcome.is_err(), "bit {} flipped silently", bit);
    }

    #[test]
    fn deserialize_inverts_serialize(
        iv in any::<[u8; 16]>(),
        coords in vec(any::<u8>(), 64),
        blocks in 1usize..8,
        fill in any::<u8>(),
        mac in any::<[u8; 32]>(),
    ) {
        let mut key = vec![0x04];
        key.extend_from_slice(&coords);
        let payload = EncryptedPayload::new(iv, key, vec![fill; blocks * 16], mac).unwrap();

        let wire = serialize(&payload).unwrap();
        prop_assert_eq!(deserialize(&wire).unwrap(), payload);
    }

    #[test]
    fn deserialize_never_panics(data in vec(any::<u8>(), 0..300)) {
        let _ = deserialize(&data);
    }
}
