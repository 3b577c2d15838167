//! SRA property tests.
//!
//! Key generation is expensive, so the prime and key pairs are generated once
//! from a fixed seed and shared by every case.

use std::sync::LazyLock;

use deckhand_crypto::{BigUint, SraKeyPair, decode_item, encode_item, random_prime};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

struct Keys {
    k1: SraKeyPair,
    k2: SraKeyPair,
}

static KEYS: LazyLock<Keys> = LazyLock::new(|| {
    let mut rng = ChaCha20Rng::seed_from_u64(0x5eed);
    let prime = random_prime(&mut rng, 32).expect("prime");
    let k1 = SraKeyPair::generate(&mut rng, &prime, 32).expect("k1");
    let k2 = SraKeyPair::generate(&mut rng, &prime, 32).expect("k2");
    Keys { k1, k2 }
});

fn encrypt_twice(x: &BigUint) -> BigUint {
    let once = KEYS.k1.encrypt(x).expect("encrypt k1");
    KEYS.k2.encrypt(&once).expect("encrypt k2")
}

#[test]
fn string_item_round_trip() {
    let plaintext = encode_item("Hello, world!").expect("encode");
    let ciphertext = KEYS.k1.encrypt(&plaintext).expect("encrypt");

    assert_ne!(ciphertext, plaintext);
    let opened = KEYS.k1.decrypt(&ciphertext).expect("decrypt");
    assert_eq!(decode_item(&opened), Ok("Hello, world!".into()));
}

#[test]
fn decimal_item_round_trip() {
    let item = deckhand_crypto::bigint_to_string(&encode_item("Qspades").expect("encode"));
    let ciphertext = KEYS.k2.encrypt_item(&item).expect("encrypt");

    assert_eq!(KEYS.k2.decrypt_item(&ciphertext), Ok(item));
}

proptest! {
    #[test]
    fn decrypt_inverts_encrypt(item in "[ -~]{1,24}") {
        let x = encode_item(&item).expect("encode");
        let y = KEYS.k1.encrypt(&x).expect("encrypt");
        prop_assert_eq!(KEYS.k1.decrypt(&y).expect("decrypt"), x);
    }

    #[test]
    fn layers_commute(item in "[ -~]{1,24}") {
        let x = encode_item(&item).expect("encode");
        let layered = encrypt_twice(&x);

        let k1_first = KEYS.k2.decrypt(&KEYS.k1.decrypt(&layered).expect("k1")).expect("k2");
        let k2_first = KEYS.k1.decrypt(&KEYS.k2.decrypt(&layered).expect("k2")).expect("k1");

        prop_assert_eq!(&k1_first, &x);
        prop_assert_eq!(&k2_first, &x);
    }
}
