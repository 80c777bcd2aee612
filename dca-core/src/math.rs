// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed-point saturating arithmetic shared by every fixed-point decode path (core subband
//! dequantization, ADPCM prediction, the fixed IMDCT/synthesis filter, and XLL's linear
//! prediction).

const CLIP23_MIN: i32 = -(1 << 23);
const CLIP23_MAX: i32 = (1 << 23) - 1;

/// Clamps `x` to `[-2^23, 2^23 - 1]`.
#[inline]
pub fn clip23(x: i32) -> i32 {
    x.clamp(CLIP23_MIN, CLIP23_MAX)
}

/// Clamps `x` to `[-2^24, 2^24 - 1]`, used by XLL's prediction residual path.
#[inline]
pub fn clip24(x: i64) -> i32 {
    const MIN: i64 = -(1 << 24);
    const MAX: i64 = (1 << 24) - 1;
    x.clamp(MIN, MAX) as i32
}

/// Arithmetic right shift of `x` by `k` bits, rounding half-away-from-zero. Pass-through when
/// `k == 0`.
#[inline]
pub fn norm_k(x: i64, k: u32) -> i32 {
    if k == 0 {
        x as i32
    }
    else {
        ((x + (1i64 << (k - 1))) >> k) as i32
    }
}

/// A rounded multiply-and-shift-by-23, used by the tables that store Q23 fixed-point
/// coefficients.
#[inline]
pub fn mul23(a: i32, b: i32) -> i32 {
    norm_k(i64::from(a) * i64::from(b), 23)
}

/// A rounded multiply-and-shift-by-31, used by the tables that store Q31 fixed-point
/// coefficients (ADPCM predictor taps, reflection-coefficient conversion).
#[inline]
pub fn mul31(a: i32, b: i32) -> i32 {
    norm_k(i64::from(a) * i64::from(b), 31)
}

/// Rounds `a` to a multiple of `2^bits`, without shifting it back down (used where the original
/// keeps the value's magnitude but zeroes the low bits before a later exact shift).
#[inline]
pub fn round_to(a: i64, bits: u32) -> i64 {
    if bits == 0 {
        a
    }
    else {
        (a + (1i64 << (bits - 1))) & !((1i64 << bits) - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_clip23() {
        assert_eq!(clip23(0), 0);
        assert_eq!(clip23(1 << 23), CLIP23_MAX);
        assert_eq!(clip23(-(1 << 24)), CLIP23_MIN);
        assert_eq!(clip23(CLIP23_MAX), CLIP23_MAX);
        assert_eq!(clip23(CLIP23_MIN), CLIP23_MIN);
    }

    #[test]
    fn verify_norm_k_rounding() {
        assert_eq!(norm_k(5, 0), 5);
        assert_eq!(norm_k(4, 1), 2);
        assert_eq!(norm_k(5, 1), 3); // rounds half away from zero
        assert_eq!(norm_k(-5, 1), -2);
        assert_eq!(norm_k(-4, 1), -2);
    }

    #[test]
    fn verify_mul23_identity() {
        // Multiplying by 2^23 (1.0 in Q23) should be the identity (up to rounding).
        let one_q23 = 1i32 << 23;
        assert_eq!(mul23(12345, one_q23), 12345);
    }
}
