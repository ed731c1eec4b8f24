// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Self-contained Ed25519 signature verification.
//!
//! The loader authenticates a firmware image by verifying an Ed25519
//! signature over the image's SHA-256 digest against [`SIGNER_PUBLIC_KEY`].
//! No big-integer library, no allocation, no pre-computed tables; scalar
//! multiplication is variable-time, which is acceptable here because every
//! input to the verifier is public. Only the final 32-byte comparison is
//! constant-time.

mod field;
mod point;
mod scalar;
mod sha512;

use point::Point;
use sha512::Sha512;

/// Public key of the trusted firmware signer, compiled into the loader.
pub const SIGNER_PUBLIC_KEY: [u8; 32] = [
    0xEA, 0x4D, 0x85, 0x32, 0xDB, 0x8F, 0xC5, 0x70,
    0xE8, 0xA3, 0xC6, 0xD9, 0x4C, 0x8F, 0x41, 0x29,
    0xBE, 0x91, 0x13, 0xD5, 0xB6, 0xF3, 0x51, 0x50,
    0xD2, 0xD3, 0xE6, 0x7F, 0x62, 0x80, 0x49, 0x7B,
];

/// The generator in its canonical compressed form (y = 4/5, x even).
const BASEPOINT: [u8; 32] = [
    0x58, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
];

/// Verify a 64-byte signature `(R ‖ s)` over `message` under `public_key`.
///
/// Follows RFC 8032 with the cofactorless check: recompute
/// `R' = s·B - k·A` for `k = SHA-512(R ‖ A ‖ message) mod L` and accept
/// iff `R'` compresses to the transmitted `R`.
pub fn verify(signature: &[u8; 64], public_key: &[u8; 32], message: &[u8]) -> bool {
    let mut s = [0u8; 32];
    s.copy_from_slice(&signature[32..]);
    if !scalar::is_canonical(&s) {
        return false;
    }

    let Some(a) = Point::from_bytes(public_key) else {
        return false;
    };
    let Some(b) = Point::from_bytes(&BASEPOINT) else {
        return false;
    };

    let mut h = Sha512::new();
    h.update(&signature[..32]);
    h.update(public_key);
    h.update(message);
    let k = scalar::reduce(&h.finalize());

    let s_b = b.scalar_mul(&s);
    let k_a = a.scalar_mul(&k).neg();
    let r_check = s_b.add(&k_a).to_bytes();

    constant_time_eq_32(&r_check, &signature[..32])
}

fn constant_time_eq_32(a: &[u8; 32], b: &[u8]) -> bool {
    let mut diff = 0u8;
    for i in 0..32 {
        diff |= a[i] ^ b[i];
    }
    diff == 0
}
