// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Arithmetic in GF(2^255 - 19), five limbs of 51 bits each.
//!
//! Every operation returns a weakly reduced element (all limbs below
//! 2^51 plus a small carry excess), which keeps the 128-bit products in
//! [`Fe::mul`] far from overflow. [`Fe::to_bytes`] performs the full
//! canonical reduction.

const LOW_51_BITS: u64 = (1 << 51) - 1;

/// 16*p in limb form, added before subtraction so limbs never underflow
/// even when the subtrahend carries a few bits of excess.
const SIXTEEN_P: [u64; 5] = [
    36_028_797_018_963_664,
    36_028_797_018_963_952,
    36_028_797_018_963_952,
    36_028_797_018_963_952,
    36_028_797_018_963_952,
];

#[derive(Clone, Copy)]
pub(crate) struct Fe(pub(crate) [u64; 5]);

impl Fe {
    pub(crate) const ZERO: Fe = Fe([0; 5]);
    pub(crate) const ONE: Fe = Fe([1, 0, 0, 0, 0]);

    /// Curve constant d = -121665/121666.
    pub(crate) const EDWARDS_D: Fe = Fe([
        929_955_233_495_203,
        466_365_720_129_213,
        1_662_059_464_998_953,
        2_033_849_074_728_123,
        1_442_794_654_840_575,
    ]);

    /// sqrt(-1) = 2^((p-1)/4), used when the first decompression candidate
    /// is not a square root.
    pub(crate) const SQRT_M1: Fe = Fe([
        1_718_705_420_411_056,
        234_908_883_556_509,
        2_233_514_472_574_048,
        2_117_202_627_021_982,
        765_476_049_583_133,
    ]);

    /// One serial carry pass; folds the top limb back through * 19.
    fn reduce(mut self) -> Fe {
        let l = &mut self.0;
        let mut c = l[0] >> 51;
        l[0] &= LOW_51_BITS;
        l[1] += c;
        c = l[1] >> 51;
        l[1] &= LOW_51_BITS;
        l[2] += c;
        c = l[2] >> 51;
        l[2] &= LOW_51_BITS;
        l[3] += c;
        c = l[3] >> 51;
        l[3] &= LOW_51_BITS;
        l[4] += c;
        c = l[4] >> 51;
        l[4] &= LOW_51_BITS;
        l[0] += c * 19;
        self
    }

    /// Little-endian decode; bit 255 is the sign bit of the compressed
    /// point encoding and is not part of the field element.
    pub(crate) fn from_bytes(s: &[u8; 32]) -> Fe {
        let load = |off: usize| {
            let mut word = [0u8; 8];
            word.copy_from_slice(&s[off..off + 8]);
            u64::from_le_bytes(word)
        };
        Fe([
            load(0) & LOW_51_BITS,
            (load(6) >> 3) & LOW_51_BITS,
            (load(12) >> 6) & LOW_51_BITS,
            (load(19) >> 1) & LOW_51_BITS,
            (load(24) >> 12) & LOW_51_BITS,
        ])
    }

    /// Canonical little-endian encoding: the unique representative in
    /// [0, p) with bit 255 clear.
    pub(crate) fn to_bytes(self) -> [u8; 32] {
        let mut l = self.reduce().0;

        // Decide whether the value is >= p: q becomes the top carry of
        // value + 19, i.e. 1 exactly when subtracting p is needed.
        let mut q = (l[0] + 19) >> 51;
        q = (l[1] + q) >> 51;
        q = (l[2] + q) >> 51;
        q = (l[3] + q) >> 51;
        q = (l[4] + q) >> 51;

        l[0] += 19 * q;
        let mut c = l[0] >> 51;
        l[0] &= LOW_51_BITS;
        l[1] += c;
        c = l[1] >> 51;
        l[1] &= LOW_51_BITS;
        l[2] += c;
        c = l[2] >> 51;
        l[2] &= LOW_51_BITS;
        l[3] += c;
        c = l[3] >> 51;
        l[3] &= LOW_51_BITS;
        l[4] += c;
        // Discarding the carry out of the top limb subtracts 2^255, which
        // together with the +19 above completes the reduction mod p.
        l[4] &= LOW_51_BITS;

        let mut s = [0u8; 32];
        s[0..8].copy_from_slice(&(l[0] | (l[1] << 51)).to_le_bytes());
        s[8..16].copy_from_slice(&((l[1] >> 13) | (l[2] << 38)).to_le_bytes());
        s[16..24].copy_from_slice(&((l[2] >> 26) | (l[3] << 25)).to_le_bytes());
        s[24..32].copy_from_slice(&((l[3] >> 39) | (l[4] << 12)).to_le_bytes());
        s
    }

    pub(crate) fn add(&self, rhs: &Fe) -> Fe {
        let mut r = [0u64; 5];
        for i in 0..5 {
            r[i] = self.0[i] + rhs.0[i];
        }
        Fe(r)
    }

    pub(crate) fn sub(&self, rhs: &Fe) -> Fe {
        let mut r = [0u64; 5];
        for i in 0..5 {
            r[i] = self.0[i] + SIXTEEN_P[i] - rhs.0[i];
        }
        Fe(r).reduce()
    }

    pub(crate) fn neg(&self) -> Fe {
        let mut r = [0u64; 5];
        for i in 0..5 {
            r[i] = SIXTEEN_P[i] - self.0[i];
        }
        Fe(r).reduce()
    }

    /// Schoolbook multiplication with the 2^255 = 19 fold applied to the
    /// high partial products.
    pub(crate) fn mul(&self, rhs: &Fe) -> Fe {
        #[inline]
        fn m(a: u64, b: u64) -> u128 {
            u128::from(a) * u128::from(b)
        }

        let a = &self.0;
        let b = &rhs.0;
        let a1_19 = a[1] * 19;
        let a2_19 = a[2] * 19;
        let a3_19 = a[3] * 19;
        let a4_19 = a[4] * 19;

        let t0 = m(a[0], b[0]) + m(a1_19, b[4]) + m(a2_19, b[3]) + m(a3_19, b[2]) + m(a4_19, b[1]);
        let t1 = m(a[0], b[1]) + m(a[1], b[0]) + m(a2_19, b[4]) + m(a3_19, b[3]) + m(a4_19, b[2]);
        let t2 = m(a[0], b[2]) + m(a[1], b[1]) + m(a[2], b[0]) + m(a3_19, b[4]) + m(a4_19, b[3]);
        let t3 = m(a[0], b[3]) + m(a[1], b[2]) + m(a[2], b[1]) + m(a[3], b[0]) + m(a4_19, b[4]);
        let t4 = m(a[0], b[4]) + m(a[1], b[3]) + m(a[2], b[2]) + m(a[3], b[1]) + m(a[4], b[0]);

        let mut r = [0u64; 5];
        r[0] = (t0 as u64) & LOW_51_BITS;
        let t1 = t1 + (t0 >> 51);
        r[1] = (t1 as u64) & LOW_51_BITS;
        let t2 = t2 + (t1 >> 51);
        r[2] = (t2 as u64) & LOW_51_BITS;
        let t3 = t3 + (t2 >> 51);
        r[3] = (t3 as u64) & LOW_51_BITS;
        let t4 = t4 + (t3 >> 51);
        r[4] = (t4 as u64) & LOW_51_BITS;
        r[0] += (t4 >> 51) as u64 * 19;
        let c = r[0] >> 51;
        r[0] &= LOW_51_BITS;
        r[1] += c;
        Fe(r)
    }

    pub(crate) fn square(&self) -> Fe {
        self.mul(self)
    }

    /// z^((p-5)/8) = z^(2^252 - 3), the core exponentiation of both point
    /// decompression and inversion.
    pub(crate) fn pow22523(&self) -> Fe {
        let z = self;
        let mut t0 = z.square(); // 2
        let mut t1 = t0.square(); // 4
        t1 = t1.square(); // 8
        t1 = z.mul(&t1); // 9
        t0 = t0.mul(&t1); // 11
        t0 = t0.square(); // 22
        t0 = t1.mul(&t0); // 31 = 2^5 - 1
        t1 = t0.square();
        for _ in 1..5 {
            t1 = t1.square();
        }
        t0 = t1.mul(&t0); // 2^10 - 1
        t1 = t0.square();
        for _ in 1..10 {
            t1 = t1.square();
        }
        t1 = t1.mul(&t0); // 2^20 - 1
        let mut t2 = t1.square();
        for _ in 1..20 {
            t2 = t2.square();
        }
        t1 = t2.mul(&t1); // 2^40 - 1
        t1 = t1.square();
        for _ in 1..10 {
            t1 = t1.square();
        }
        t0 = t1.mul(&t0); // 2^50 - 1
        t1 = t0.square();
        for _ in 1..50 {
            t1 = t1.square();
        }
        t1 = t1.mul(&t0); // 2^100 - 1
        t2 = t1.square();
        for _ in 1..100 {
            t2 = t2.square();
        }
        t1 = t2.mul(&t1); // 2^200 - 1
        t1 = t1.square();
        for _ in 1..50 {
            t1 = t1.square();
        }
        t0 = t1.mul(&t0); // 2^250 - 1
        t0 = t0.square(); // 2^251 - 2
        t0 = t0.square(); // 2^252 - 4
        t0.mul(z) // 2^252 - 3
    }

    /// Inversion via Fermat: z^(p-2) = (z^(2^252-3))^8 * z^3.
    pub(crate) fn invert(&self) -> Fe {
        let t = self.pow22523();
        let t = t.square().square().square(); // z^(2^255 - 24)
        let z3 = self.square().mul(self);
        t.mul(&z3) // z^(2^255 - 21)
    }

    /// Replace `self` with `other` when `choice` holds, without branching
    /// on the data.
    pub(crate) fn cmov(&mut self, other: &Fe, choice: bool) {
        let mask = 0u64.wrapping_sub(choice as u64);
        for i in 0..5 {
            self.0[i] ^= mask & (self.0[i] ^ other.0[i]);
        }
    }

    /// Least significant bit of the canonical encoding; the "sign" of the
    /// x coordinate in compressed points.
    pub(crate) fn is_negative(&self) -> bool {
        self.to_bytes()[0] & 1 == 1
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.to_bytes() == [0u8; 32]
    }
}

#[cfg(test)]
mod tests {
    use super::Fe;

    fn fe(n: u64) -> Fe {
        Fe([n, 0, 0, 0, 0])
    }

    #[test]
    fn test_mul_matches_small_integers() {
        let a = fe(1234);
        let b = fe(5678);
        assert_eq!(a.mul(&b).to_bytes(), fe(1234 * 5678).to_bytes());
    }

    #[test]
    fn test_sub_and_neg_round_trip() {
        let a = fe(40);
        let b = fe(55);
        // a - b == -(b - a)
        assert_eq!(a.sub(&b).to_bytes(), b.sub(&a).neg().to_bytes());
    }

    #[test]
    fn test_invert() {
        let a = fe(987_654_321);
        let inv = a.invert();
        assert_eq!(a.mul(&inv).to_bytes(), Fe::ONE.to_bytes());
    }

    #[test]
    fn test_sqrt_m1_squares_to_minus_one() {
        let minus_one = Fe::ZERO.sub(&Fe::ONE);
        assert_eq!(Fe::SQRT_M1.square().to_bytes(), minus_one.to_bytes());
    }

    #[test]
    fn test_to_bytes_is_canonical_for_p() {
        // p itself must encode as zero.
        let p = Fe([(1 << 51) - 19, (1 << 51) - 1, (1 << 51) - 1, (1 << 51) - 1, (1 << 51) - 1]);
        assert_eq!(p.to_bytes(), [0u8; 32]);
        assert!(p.is_zero());
    }

    #[test]
    fn test_from_bytes_to_bytes_round_trip() {
        let mut s = [0u8; 32];
        for (i, b) in s.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(37).wrapping_add(5);
        }
        s[31] &= 0x7F;
        // Only canonical encodings round-trip; keep the value below p.
        s[31] &= 0x3F;
        assert_eq!(Fe::from_bytes(&s).to_bytes(), s);
    }
}
