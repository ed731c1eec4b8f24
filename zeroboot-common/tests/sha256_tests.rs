// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! FIPS 180-4 vectors and streaming behavior of the image hasher.

use zeroboot_common::Sha256;

fn digest_hex(chunks: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for chunk in chunks {
        hasher.update(chunk);
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[test]
fn test_empty_input() {
    assert_eq!(
        digest_hex(&[b""]),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn test_abc() {
    assert_eq!(
        digest_hex(&[b"abc"]),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn test_two_block_message() {
    assert_eq!(
        digest_hex(&[b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq"]),
        "248d6a61d20638b8e5c026930c3e6039a33ce45964ff2167f6ecedd419db06c1"
    );
}

#[test]
fn test_long_input() {
    let data = vec![b'a'; 1000];
    assert_eq!(
        digest_hex(&[&data]),
        "41edece42d63e8d9bf515a9ba6932e1c20cbc9f5a5d134645adb5db1b9737ea3"
    );
}

#[test]
fn test_split_updates_match_single_shot() {
    // update(a); update(b) must equal update(a ‖ b) for every split,
    // including splits on and around the 64-byte block boundary.
    let data: Vec<u8> = (0..150u8).collect();
    let mut whole = Sha256::new();
    whole.update(&data);
    let expected = whole.finalize();

    for split in 0..=data.len() {
        let mut hasher = Sha256::new();
        hasher.update(&data[..split]);
        hasher.update(&data[split..]);
        assert_eq!(hasher.finalize(), expected, "split at {split}");
    }
}

#[test]
fn test_byte_at_a_time_matches_single_shot() {
    // The loader feeds the hasher exactly one payload byte at a time.
    let data = vec![b'a'; 1000];
    let mut hasher = Sha256::new();
    for byte in &data {
        hasher.update(core::slice::from_ref(byte));
    }
    assert_eq!(
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>(),
        "41edece42d63e8d9bf515a9ba6932e1c20cbc9f5a5d134645adb5db1b9737ea3"
    );
}

#[test]
fn test_padding_boundaries() {
    // 55, 56, and 64 byte inputs exercise the one- and two-compression
    // finalize paths.
    for len in [55usize, 56, 63, 64, 119, 120, 128] {
        let data = vec![0xA5u8; len];
        let mut one = Sha256::new();
        one.update(&data);

        let mut two = Sha256::new();
        two.update(&data[..len / 2]);
        two.update(&data[len / 2..]);

        assert_eq!(one.finalize(), two.finalize(), "length {len}");
    }
}
