use proptest::prelude::*;

use patchcast_protocol::{encode_reference, sign, PatchEvent, SecretKey};

/// Deterministic key from a seed byte.
fn secret_key(seed: u8) -> SecretKey {
    SecretKey::from_seed(&[seed; 32])
}

fn fixed_event(content: &str, author: &str, subject: &str) -> PatchEvent {
    let mut event = PatchEvent::new(content, author, subject);
    event.created_at = 1_708_000_000;
    event
}

proptest! {
    /// Same record and key always produce the same identifier and signature.
    #[test]
    fn signing_is_deterministic(
        content in ".{1,1000}",
        author in ".{0,100}",
        subject in ".{0,200}",
        seed in any::<u8>(),
    ) {
        let key = secret_key(seed);
        let a = sign(fixed_event(&content, &author, &subject), &key).expect("sign");
        let b = sign(fixed_event(&content, &author, &subject), &key).expect("sign");

        prop_assert_eq!(a.id(), b.id());
        prop_assert_eq!(a.sig(), b.sig());
    }

    /// Every signed event verifies against its own signature.
    #[test]
    fn signed_events_verify(
        content in ".{1,1000}",
        seed in any::<u8>(),
    ) {
        let signed = sign(fixed_event(&content, "a", "s"), &secret_key(seed)).expect("sign");
        prop_assert!(signed.verify().is_ok());
    }

    /// Different keys never share an identifier for the same record.
    #[test]
    fn identifier_binds_the_key(
        content in ".{1,500}",
        seed_a in 0u8..128,
        seed_b in 128u8..=255,
    ) {
        let a = sign(fixed_event(&content, "a", "s"), &secret_key(seed_a)).expect("sign");
        let b = sign(fixed_event(&content, "a", "s"), &secret_key(seed_b)).expect("sign");
        prop_assert_ne!(a.id(), b.id());
    }

    /// Reference encoding is a pure function of signer output.
    #[test]
    fn reference_is_deterministic(
        content in ".{1,500}",
        relays in prop::collection::vec("[a-z0-9.:-]{1,40}", 1..5),
        seed in any::<u8>(),
    ) {
        let signed = sign(fixed_event(&content, "a", "s"), &secret_key(seed)).expect("sign");
        let a = encode_reference(signed.id(), &relays, signed.pubkey()).expect("encode");
        let b = encode_reference(signed.id(), &relays, signed.pubkey()).expect("encode");
        prop_assert_eq!(a, b);
    }
}
