// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! XLL's inverse prediction stages: adaptive (reflection-coefficient) or fixed
//! (repeated first-order integration) prediction, and pair-wise channel correlation.

use dca_core::math::{clip24, norm_k};

use dca_codec_core::adpcm::reflection_to_direct_form;

/// Converts `refl` (8-bit unsigned quantized reflection coefficients) into the direct-form Q16
/// coefficients the adaptive predictor needs, reusing the shared Levinson-style transform.
pub fn refl_to_direct(refl: &[u8]) -> Vec<i32> {
    let order = refl.len();
    let mut c: Vec<i32> = refl.iter().map(|&r| (i32::from(r) - 128) * 256).collect();
    reflection_to_direct_form(&mut c, order);
    c
}

/// Undoes adaptive prediction in place: for each sample `x[i]`, subtracts
/// `round_21(sum_j coeffs[j] * x[i-1-j])` and clips to 24 bits. `history` holds
/// exactly `coeffs.len()` samples preceding `samples[0]`, oldest first, and is updated in place to
/// the `order` samples preceding the next segment.
pub fn undo_adaptive_prediction(samples: &mut [i32], coeffs: &[i32], history: &mut Vec<i32>) {
    let order = coeffs.len();
    if history.len() != order {
        history.resize(order, 0);
    }

    for i in 0..samples.len() {
        let mut acc: i64 = 0;
        for (j, &c) in coeffs.iter().enumerate() {
            let lag = j + 1;
            let past = if lag <= i { samples[i - lag] } else { history[order - (lag - i)] };
            acc += i64::from(c) * i64::from(past);
        }
        let predicted = norm_k(acc, 21);
        samples[i] = clip24(i64::from(samples[i]) - i64::from(predicted));
    }

    if samples.len() >= order {
        history.copy_from_slice(&samples[samples.len() - order..]);
    }
    else {
        history.rotate_left(samples.len());
        let keep = order - samples.len();
        history[keep..].copy_from_slice(samples);
    }
}

/// Undoes fixed-order prediction in place via `order` passes of first-order integration
/// (`x[i] += x[i-1]`), carrying `history`'s last sample forward as the seed for the first pass.
pub fn undo_fixed_prediction(samples: &mut [i32], order: u8, history: &mut i32) {
    for _ in 0..order {
        let mut prev = *history;
        for sample in samples.iter_mut() {
            *sample = clip24(i64::from(*sample) + i64::from(prev));
            prev = *sample;
        }
        *history = prev;
    }
}

/// Pair-wise channel correlation: for the right channel of a pair with a non-zero
/// coefficient `c`, adds `round_3(c * left)` in place.
pub fn apply_pair_correlation(right: &mut [i32], left: &[i32], coeff: i8) {
    if coeff == 0 {
        return;
    }
    for (r, &l) in right.iter_mut().zip(left.iter()) {
        let adj = norm_k(i64::from(coeff) * i64::from(l), 3);
        *r = clip24(i64::from(*r) + i64::from(adj));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_fixed_prediction_single_pass_is_cumulative_sum() {
        let mut samples = [1, 2, 3, 4];
        let mut history = 0;
        undo_fixed_prediction(&mut samples, 1, &mut history);
        assert_eq!(samples, [1, 3, 6, 10]);
        assert_eq!(history, 10);
    }

    #[test]
    fn verify_pair_correlation_noop_with_zero_coeff() {
        let left = [10, 20, 30];
        let mut right = [1, 2, 3];
        apply_pair_correlation(&mut right, &left, 0);
        assert_eq!(right, [1, 2, 3]);
    }

    #[test]
    fn verify_pair_correlation_adds_scaled_left() {
        let left = [8, 8, 8];
        let mut right = [0, 0, 0];
        apply_pair_correlation(&mut right, &left, 8);
        assert_eq!(right, [8, 8, 8]);
    }
}
