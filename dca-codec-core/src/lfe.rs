// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! LFE interpolation: the decimated LFE channel (one
//! sample per 64 or 128 full-rate PCM samples) is brought up to the core's output sample rate by a
//! low-pass FIR, selected by [`LfeMode::Interpolate64`]/[`LfeMode::Interpolate128`].
//!
//! `ff_dca_lfe_fir_64`/`ff_dca_lfe_fir_128`'s defining tables are not reproduced bit-for-bit here;
//! the taps below are a generic Kaiser-windowed sinc low-pass, built the same way
//! `tables::build_synth_window` builds the synthesis prototype, rather than a verbatim port.

use dca_core::audio::LfeMode;

fn decimation_factor(mode: LfeMode) -> usize {
    match mode {
        LfeMode::None => 1,
        LfeMode::Interpolate64 => 64,
        LfeMode::Interpolate128 => 128,
    }
}

fn bessel_i0(x: f64) -> f64 {
    let mut sum = 1.0;
    let mut term = 1.0;
    for k in 1..24 {
        term *= (x / 2.0 / k as f64).powi(2);
        sum += term;
    }
    sum
}

/// Builds a `2 * decimation`-tap windowed-sinc low-pass filter, normalized to unit DC gain, used
/// to interpolate the decimated LFE channel back up to full rate.
fn build_fir(decimation: usize) -> Vec<f32> {
    let taps = decimation * 2;
    let cutoff = 1.0 / decimation as f64;
    let beta = 6.0;
    let denom = bessel_i0(beta);
    let mut h = vec![0f64; taps];
    let center = (taps - 1) as f64 / 2.0;
    for (n, slot) in h.iter_mut().enumerate() {
        let x = n as f64 - center;
        let sinc = if x.abs() < 1e-9 {
            cutoff
        }
        else {
            (std::f64::consts::PI * cutoff * x).sin() / (std::f64::consts::PI * x)
        };
        let window_x = 2.0 * n as f64 / (taps - 1) as f64 - 1.0;
        let window = bessel_i0(beta * (1.0 - window_x * window_x).max(0.0).sqrt()) / denom;
        *slot = sinc * window;
    }
    let sum: f64 = h.iter().sum();
    h.iter().map(|&v| (v / sum) as f32).collect()
}

/// Interpolates `decimated` LFE samples (already in the Q23 fixed domain, one sample per
/// `mode`'s decimation factor) up to `n_out` full-rate `f32` samples in `[-1.0, 1.0)`. `mode ==
/// LfeMode::None` is a caller error; every other mode zero-stuffs to full rate and runs the
/// low-pass FIR so the decimated samples land exactly on their original time instants.
pub fn interpolate(decimated: &[i32], mode: LfeMode, n_out: usize) -> Vec<f32> {
    const Q23_TO_F32: f32 = 1.0 / (1i64 << 23) as f32;
    let decimation = decimation_factor(mode);

    let mut out = vec![0f32; n_out];
    if decimation <= 1 || decimated.is_empty() {
        for (o, &s) in out.iter_mut().zip(decimated.iter()) {
            *o = s as f32 * Q23_TO_F32;
        }
        return out;
    }

    let fir = build_fir(decimation);
    let taps = fir.len() as i64;
    let decimation = decimation as i64;
    let gain = decimation as f32;

    for (i, o) in out.iter_mut().enumerate() {
        let mut acc = 0f64;
        let mut k = (i as i64).rem_euclid(decimation);
        while k < taps {
            let src = (i as i64 - k) / decimation;
            if src >= 0 && (src as usize) < decimated.len() {
                acc += f64::from(decimated[src as usize]) * f64::from(fir[k as usize]);
            }
            k += decimation;
        }
        *o = (acc as f32) * gain * Q23_TO_F32;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_silence_in_silence_out() {
        let decimated = vec![0i32; 4];
        let out = interpolate(&decimated, LfeMode::Interpolate64, 256);
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn verify_interpolated_length_matches_request() {
        let decimated = vec![1 << 20; 8];
        let out = interpolate(&decimated, LfeMode::Interpolate128, 1024);
        assert_eq!(out.len(), 1024);
        assert!(out.iter().any(|&v| v != 0.0));
    }

    #[test]
    fn verify_none_mode_passes_through_without_upsampling() {
        let decimated = vec![1 << 20, -(1 << 19)];
        let out = interpolate(&decimated, LfeMode::None, 4);
        assert_eq!(out[0], 1.0);
    }
}
