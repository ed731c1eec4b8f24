// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Ed25519 verifier tests: RFC 8032 §7.1 vectors, tampering, and
//! malleability rejection.

use zeroboot_common::ed25519::verify;

fn from_hex<const N: usize>(hex: &str) -> [u8; N] {
    let mut out = [0u8; N];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).unwrap();
    }
    out
}

// RFC 8032 §7.1 TEST 1
fn test1() -> ([u8; 32], Vec<u8>, [u8; 64]) {
    let pk = from_hex("d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a");
    let msg = Vec::new();
    let sig = from_hex(
        "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e065224901555fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b",
    );
    (pk, msg, sig)
}

// RFC 8032 §7.1 TEST 2
fn test2() -> ([u8; 32], Vec<u8>, [u8; 64]) {
    let pk = from_hex("3d4017c3e843895a92b70aa74d1b7ebc9c982ccf2ec4968cc0cd55f12af4660c");
    let msg = vec![0x72];
    let sig = from_hex(
        "92a009a9f0d4cab8720e820b5f642540a2b27b5416503f8fb3762223ebdb69da085ac1e43e15996e458f3613d0f11d8c387b2eaeb4302aeeb00d291612bb0c00",
    );
    (pk, msg, sig)
}

// RFC 8032 §7.1 TEST 3
fn test3() -> ([u8; 32], Vec<u8>, [u8; 64]) {
    let pk = from_hex("fc51cd8e6218a1a38da47ed00230f0580816ed13ba3303ac5deb911548908025");
    let msg = vec![0xAF, 0x82];
    let sig = from_hex(
        "6291d657deec24024827e69c3abe01a30ce548a284743a445e3680d7db5ac3ac18ff9b538d16f290ae67f760984dc6594a7c15e9716ed28dc027beceea1ec40a",
    );
    (pk, msg, sig)
}

#[test]
fn test_rfc8032_vectors_accepted() {
    for (name, (pk, msg, sig)) in [("1", test1()), ("2", test2()), ("3", test3())] {
        assert!(verify(&sig, &pk, &msg), "RFC 8032 test {name}");
    }
}

#[test]
fn test_signature_bit_flips_rejected() {
    let (pk, msg, sig) = test2();
    for byte in 0..64 {
        let mut tampered = sig;
        tampered[byte] ^= 1 << (byte % 8);
        assert!(
            !verify(&tampered, &pk, &msg),
            "flip in signature byte {byte} accepted"
        );
    }
}

#[test]
fn test_public_key_bit_flips_rejected() {
    let (pk, msg, sig) = test3();
    for byte in [0, 7, 15, 16, 30, 31] {
        let mut tampered = pk;
        tampered[byte] ^= 1 << (byte % 8);
        assert!(
            !verify(&sig, &tampered, &msg),
            "flip in public key byte {byte} accepted"
        );
    }
}

#[test]
fn test_message_changes_rejected() {
    let (pk, msg, sig) = test3();

    let mut flipped = msg.clone();
    flipped[0] ^= 0x01;
    assert!(!verify(&sig, &pk, &flipped));

    let mut extended = msg.clone();
    extended.push(0x00);
    assert!(!verify(&sig, &pk, &extended));

    assert!(!verify(&sig, &pk, b""));
}

#[test]
fn test_swapped_signature_halves_rejected() {
    let (pk, msg, sig) = test1();
    let mut swapped = [0u8; 64];
    swapped[..32].copy_from_slice(&sig[32..]);
    swapped[32..].copy_from_slice(&sig[..32]);
    assert!(!verify(&swapped, &pk, &msg));
}

/// The group order L, little endian.
const GROUP_ORDER: [u8; 32] = [
    0xED, 0xD3, 0xF5, 0x5C, 0x1A, 0x63, 0x12, 0x58,
    0xD6, 0x9C, 0xF7, 0xA2, 0xDE, 0xF9, 0xDE, 0x14,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10,
];

#[test]
fn test_s_equal_to_group_order_rejected() {
    let (pk, msg, mut sig) = test1();
    sig[32..].copy_from_slice(&GROUP_ORDER);
    assert!(!verify(&sig, &pk, &msg));
}

#[test]
fn test_malleable_twin_rejected() {
    // s' = s + L verifies on implementations that skip the canonicity
    // check; this loader must refuse it.
    let (pk, msg, sig) = test1();

    let mut twin = sig;
    let mut carry = 0u16;
    for i in 0..32 {
        let sum = sig[32 + i] as u16 + GROUP_ORDER[i] as u16 + carry;
        twin[32 + i] = sum as u8;
        carry = sum >> 8;
    }
    assert_eq!(carry, 0, "s + L must still fit in 32 bytes");
    assert!(!verify(&twin, &pk, &msg));
}

#[test]
fn test_malformed_public_key_rejected() {
    // y = 2 is not the y-coordinate of any curve point.
    let (_, msg, sig) = test1();
    let mut bad_pk = [0u8; 32];
    bad_pk[0] = 2;
    assert!(!verify(&sig, &bad_pk, &msg));
}

#[test]
fn test_all_zero_signature_rejected() {
    let (pk, msg, _) = test2();
    assert!(!verify(&[0u8; 64], &pk, &msg));
}
