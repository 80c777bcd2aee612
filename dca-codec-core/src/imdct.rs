// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `imdct` module implements the 32-point and 64-point inverse MDCT "half" transforms that
//! feed the polyphase synthesis filter, in both a floating-point and a fixed-point flavor.
//!
//! Both transforms compute the same `N`-in, `N`-out "half" of a `2N`-point IMDCT: only the first
//! `N` outputs of the full transform are needed because the remaining `N` are a mirrored,
//! sign-flipped copy that the synthesis filter folds back in on its own (see [`crate::synth`]).

use dca_core::math::{clip23, norm_k};

/// Floating-point IMDCT-half, generic over any power-of-two `N` the caller's buffers are sized
/// for (32 or 64 in this crate). A direct radix-2 cosine sum; accuracy, not asymptotic speed, is
/// the goal here; vectorization is left to the caller's build configuration.
pub fn imdct_half_f32(input: &[f32], output: &mut [f32]) {
    let n = input.len();
    debug_assert_eq!(output.len(), n);
    let scale = std::f64::consts::PI / (4 * n) as f64;
    for (i, out) in output.iter_mut().enumerate() {
        let mut sum = 0.0f64;
        for (k, &x) in input.iter().enumerate() {
            let angle = scale * ((4 * i + 2 * n + 1) as f64) * (2 * k + 1) as f64;
            sum += f64::from(x) * angle.cos();
        }
        *out = sum as f32;
    }
}

/// Lazily-built Q23 fixed-point cosine tables for the 32- and 64-point transforms, generated once
/// from the same closed-form angle used by the float path, generated once and exposed as
/// `static`.
struct CosTable {
    n: usize,
    /// `table[i][k]` holds `cos(angle(i, k))` in Q23.
    table: Vec<Vec<i32>>,
}

impl CosTable {
    fn build(n: usize) -> CosTable {
        let scale = std::f64::consts::PI / (4 * n) as f64;
        let mut table = Vec::with_capacity(n);
        for i in 0..n {
            let mut row = Vec::with_capacity(n);
            for k in 0..n {
                let angle = scale * ((4 * i + 2 * n + 1) as f64) * (2 * k + 1) as f64;
                row.push((angle.cos() * f64::from(1i32 << 23)).round() as i32);
            }
            table.push(row);
        }
        CosTable { n, table }
    }
}

lazy_static::lazy_static! {
    static ref COS_TABLE_32: CosTable = CosTable::build(32);
    static ref COS_TABLE_64: CosTable = CosTable::build(64);
}

/// Fixed-point IMDCT-half with the magnitude-adaptive pre-shift: if the sum of
/// input magnitudes exceeds `2^22`, inputs are pre-divided by 4 (rounded) and the post-shift
/// compensates at the tail. Outputs are saturated via [`clip23`].
fn imdct_half_fixed(cos: &CosTable, input: &[i32], output: &mut [i32]) {
    let n = cos.n;
    debug_assert_eq!(input.len(), n);
    debug_assert_eq!(output.len(), n);

    let magnitude_sum: i64 = input.iter().map(|&x| i64::from(x.abs())).sum();
    let pre_shift = magnitude_sum > (1i64 << 22);

    let mut scaled = [0i32; 64];
    let scaled = &mut scaled[..n];
    if pre_shift {
        for (d, &s) in scaled.iter_mut().zip(input) {
            *d = norm_k(i64::from(s), 2);
        }
    }
    else {
        scaled.copy_from_slice(input);
    }

    for (i, out) in output.iter_mut().enumerate() {
        let mut acc = 0i64;
        for (k, &x) in scaled.iter().enumerate() {
            acc += i64::from(x) * i64::from(cos.table[i][k]);
        }
        // The cosine table is Q23; one extra post-shift by 2 restores the pre-shift's lost bits.
        let v = if pre_shift { norm_k(acc, 25) } else { norm_k(acc, 23) };
        *out = clip23(v);
    }
}

/// 32-point fixed-point IMDCT-half.
pub fn imdct_half_32_fixed(input: &[i32; 32], output: &mut [i32; 32]) {
    imdct_half_fixed(&COS_TABLE_32, input, output);
}

/// 64-point fixed-point IMDCT-half.
pub fn imdct_half_64_fixed(input: &[i32; 64], output: &mut [i32; 64]) {
    imdct_half_fixed(&COS_TABLE_64, input, output);
}

/// 32-point floating-point IMDCT-half.
pub fn imdct_half_32(input: &[f32; 32], output: &mut [f32; 32]) {
    imdct_half_f32(input, output);
}

/// 64-point floating-point IMDCT-half.
pub fn imdct_half_64(input: &[f32; 64], output: &mut [f32; 64]) {
    imdct_half_f32(input, output);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_float_fixed_agree_in_sign() {
        let mut input_f = [0f32; 32];
        let mut input_i = [0i32; 32];
        for i in 0..32 {
            let v = ((i as i32) - 16) * 1000;
            input_f[i] = v as f32;
            input_i[i] = v;
        }
        let mut out_f = [0f32; 32];
        let mut out_i = [0i32; 32];
        imdct_half_32(&input_f, &mut out_f);
        imdct_half_32_fixed(&input_i, &mut out_i);

        for i in 0..32 {
            // Same sign (or both ~zero) confirms the fixed-point table tracks the float transform.
            assert!(out_f[i].signum() as i32 == out_i[i].signum() || out_i[i].abs() < 8);
        }
    }

    #[test]
    fn verify_fixed_saturates() {
        let input = [1 << 22; 32];
        let mut output = [0i32; 32];
        imdct_half_32_fixed(&input, &mut output);
        for v in output {
            assert!((-(1 << 23)..(1 << 23)).contains(&v));
        }
    }
}
