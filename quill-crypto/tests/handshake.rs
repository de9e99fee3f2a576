use quill_crypto::{
    accept, generate_identity, initiate, open, seal, CryptoError, CryptoProvider, HandshakeError,
};

#[test]
fn both_sides_derive_the_same_session_key() {
    let provider = CryptoProvider::default_stack();
    let alice = generate_identity(&provider);
    let bob = generate_identity(&provider);

    let (message, alice_key) = initiate(&provider, "alice", "bob", &alice, &bob.public_set()).unwrap();
    let bob_key = accept(&provider, message, &bob, &alice.public_set()).unwrap();

    assert_eq!(alice_key.as_bytes(), bob_key.as_bytes());
    assert_eq!(alice_key.handshake_id(), bob_key.handshake_id());
}

#[test]
fn tampered_ephemeral_key_is_rejected() {
    let provider = CryptoProvider::default_stack();
    let alice = generate_identity(&provider);
    let bob = generate_identity(&provider);

    let (mut message, _key) = initiate(&provider, "alice", "bob", &alice, &bob.public_set()).unwrap();
    message.ephemeral_public[0] ^= 0x01;

    let err = accept(&provider, message, &bob, &alice.public_set()).unwrap_err();
    assert_eq!(err, HandshakeError::Crypto(CryptoError::SignatureVerificationFailed));
}

#[test]
fn tampered_kem_ciphertext_is_rejected() {
    let provider = CryptoProvider::default_stack();
    let alice = generate_identity(&provider);
    let bob = generate_identity(&provider);

    let (mut message, _key) = initiate(&provider, "alice", "bob", &alice, &bob.public_set()).unwrap();
    message.kem_ciphertext[17] ^= 0x80;

    let err = accept(&provider, message, &bob, &alice.public_set()).unwrap_err();
    assert_eq!(err, HandshakeError::Crypto(CryptoError::SignatureVerificationFailed));
}

#[test]
fn handshake_cannot_be_redirected_to_another_recipient() {
    let provider = CryptoProvider::default_stack();
    let alice = generate_identity(&provider);
    let bob = generate_identity(&provider);
    let carol = generate_identity(&provider);

    let (mut message, _key) = initiate(&provider, "alice", "bob", &alice, &bob.public_set()).unwrap();
    // An attacker re-addresses the captured message to carol; the signed
    // transcript no longer matches.
    message.recipient = "carol".to_string();

    let err = accept(&provider, message, &carol, &alice.public_set()).unwrap_err();
    assert_eq!(err, HandshakeError::Crypto(CryptoError::SignatureVerificationFailed));
}

#[test]
fn repeated_handshakes_are_unlinkable() {
    let provider = CryptoProvider::default_stack();
    let alice = generate_identity(&provider);
    let bob = generate_identity(&provider);

    let (m1, k1) = initiate(&provider, "alice", "bob", &alice, &bob.public_set()).unwrap();
    let (m2, k2) = initiate(&provider, "alice", "bob", &alice, &bob.public_set()).unwrap();

    assert_ne!(m1.ephemeral_public, m2.ephemeral_public);
    assert_ne!(m1.handshake_id, m2.handshake_id);
    assert_ne!(k1.as_bytes(), k2.as_bytes());
}

#[test]
fn unknown_signer_is_rejected_without_deriving() {
    let provider = CryptoProvider::default_stack();
    let alice = generate_identity(&provider);
    let bob = generate_identity(&provider);
    let mallory = generate_identity(&provider);

    // Mallory forges a handshake claiming to be alice.
    let (message, _key) = initiate(&provider, "alice", "bob", &mallory, &bob.public_set()).unwrap();
    let err = accept(&provider, message, &bob, &alice.public_set()).unwrap_err();
    assert_eq!(err, HandshakeError::Crypto(CryptoError::SignatureVerificationFailed));
}

#[test]
fn derivation_mismatch_surfaces_only_at_first_decrypt() {
    let provider = CryptoProvider::default_stack();
    let alice = generate_identity(&provider);
    let bob = generate_identity(&provider);
    let stale_bob = generate_identity(&provider);

    let (message, alice_key) = initiate(&provider, "alice", "bob", &alice, &bob.public_set()).unwrap();
    // Bob decapsulates with rotated key material: the handshake still
    // verifies (the transcript is untouched) but the derived key differs.
    let bob_key = accept(&provider, message, &stale_bob, &alice.public_set()).unwrap();
    assert_ne!(alice_key.as_bytes(), bob_key.as_bytes());

    let sealed = seal(&provider, &alice_key, "alice", "bob", b"hello", b"alice|bob").unwrap();
    assert_eq!(
        open(&provider, &bob_key, &sealed).unwrap_err(),
        CryptoError::AuthenticationFailure
    );
}

#[test]
fn handshake_message_round_trips_as_base64_text() {
    let provider = CryptoProvider::default_stack();
    let alice = generate_identity(&provider);
    let bob = generate_identity(&provider);

    let (message, _key) = initiate(&provider, "alice", "bob", &alice, &bob.public_set()).unwrap();
    let json = serde_json::to_string(&message).unwrap();
    // Binary fields travel as base64 text, never as raw byte arrays.
    assert!(!json.contains('['));

    let parsed: quill_crypto::HandshakeMessage = serde_json::from_str(&json).unwrap();
    let bob_key = accept(&provider, parsed, &bob, &alice.public_set()).unwrap();
    assert_eq!(bob_key.handshake_id(), message.handshake_id);
}
