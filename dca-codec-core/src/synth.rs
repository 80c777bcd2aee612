// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The 512-tap (32-band) and 1024-tap (64-band) polyphase synthesis filter, driven by the IMDCT
//! output. Maintains the per-channel circular history buffer (`SynthesisHistory`): a 1024-sample
//! ring plus a 64-sample secondary buffer and a rotating offset, zeroed on flush or when the
//! frame header's `predictor_history` bit is clear.

use dca_core::math::norm_k;

use crate::imdct::{imdct_half_32, imdct_half_32_fixed, imdct_half_64, imdct_half_64_fixed};
use crate::tables::{synth_window_f32, synth_window_fixed};

/// Per-channel synthesis-filter state. `bands` is 32 or 64, selecting which IMDCT and window
/// table this instance drives.
pub struct SynthesisHistory {
    bands: usize,
    history: Vec<f32>,
    history_fixed: Vec<i32>,
    secondary: Vec<f32>,
    secondary_fixed: Vec<i32>,
    offset: usize,
}

impl SynthesisHistory {
    pub fn new(bands: usize) -> SynthesisHistory {
        debug_assert!(bands == 32 || bands == 64);
        SynthesisHistory {
            bands,
            history: vec![0.0; bands * 16],
            history_fixed: vec![0; bands * 16],
            secondary: vec![0.0; bands],
            secondary_fixed: vec![0; bands],
            offset: 0,
        }
    }

    /// Zeroes the history, as required when `predictor_history` is false or on an explicit flush.
    pub fn reset(&mut self) {
        self.history.iter_mut().for_each(|v| *v = 0.0);
        self.history_fixed.iter_mut().for_each(|v| *v = 0);
        self.secondary.iter_mut().for_each(|v| *v = 0.0);
        self.secondary_fixed.iter_mut().for_each(|v| *v = 0);
        self.offset = 0;
    }

    fn history_len(&self) -> usize {
        self.bands * 16
    }

    /// Runs the IMDCT on `input` (one subband-sample vector spanning `bands` values), then the
    /// polyphase synthesis sums, writing `bands` PCM output samples to `out` and advancing the
    /// circular history.
    pub fn synth_float(&mut self, input: &[f32], out: &mut [f32], scale: f32) {
        let n = self.bands;
        debug_assert_eq!(input.len(), n);
        debug_assert_eq!(out.len(), n);

        let mut half = vec![0.0f32; n];
        if n == 32 {
            let mut inb = [0f32; 32];
            inb.copy_from_slice(input);
            let mut outb = [0f32; 32];
            imdct_half_32(&inb, &mut outb);
            half.copy_from_slice(&outb);
        }
        else {
            let mut inb = [0f32; 64];
            inb.copy_from_slice(input);
            let mut outb = [0f32; 64];
            imdct_half_64(&inb, &mut outb);
            half.copy_from_slice(&outb);
        }

        // Write the new "half" vector (combined with its mirror) into the front of the ring.
        let hlen = self.history_len();
        let write_base = self.offset;
        for i in 0..n {
            self.history[(write_base + i) % hlen] = half[i];
            self.history[(write_base + 2 * n - 1 - i) % hlen] = -half[i];
        }

        let window = synth_window_f32(n);

        for i in 0..n {
            let mut a = 0.0f32;
            let mut b = 0.0f32;
            for j in 0..(hlen / (4 * n)) {
                let idx_a = (write_base + i + j * 4 * n) % hlen;
                let idx_b = (write_base + (2 * n - 1 - i) + j * 4 * n) % hlen;
                a += self.history[idx_a] * window[i + j * 4 * n];
                b += self.history[idx_b] * window[(2 * n - 1 - i) + j * 4 * n];
            }
            out[i] = (a + self.secondary[i]) * scale;
            self.secondary[i] = b;
        }

        self.offset = (self.offset + hlen - n) % hlen;
    }

    /// Fixed-point counterpart of [`SynthesisHistory::synth_float`]. `scale` is a Q20 fixed-point
    /// multiplier; the 20-/21-bit normalization is applied via [`norm_k`].
    pub fn synth_fixed(&mut self, input: &[i32], out: &mut [i32], scale: i32) {
        let n = self.bands;
        debug_assert_eq!(input.len(), n);
        debug_assert_eq!(out.len(), n);

        let mut half = vec![0i32; n];
        if n == 32 {
            let mut inb = [0i32; 32];
            inb.copy_from_slice(input);
            let mut outb = [0i32; 32];
            imdct_half_32_fixed(&inb, &mut outb);
            half.copy_from_slice(&outb);
        }
        else {
            let mut inb = [0i32; 64];
            inb.copy_from_slice(input);
            let mut outb = [0i32; 64];
            imdct_half_64_fixed(&inb, &mut outb);
            half.copy_from_slice(&outb);
        }

        let hlen = self.history_len();
        let write_base = self.offset;
        for i in 0..n {
            self.history_fixed[(write_base + i) % hlen] = half[i];
            self.history_fixed[(write_base + 2 * n - 1 - i) % hlen] = -half[i];
        }

        let window = synth_window_fixed(n);
        let norm_bits = if n == 32 { 20 } else { 21 };

        for i in 0..n {
            let mut a = 0i64;
            let mut b = 0i64;
            for j in 0..(hlen / (4 * n)) {
                let idx_a = (write_base + i + j * 4 * n) % hlen;
                let idx_b = (write_base + (2 * n - 1 - i) + j * 4 * n) % hlen;
                a += i64::from(self.history_fixed[idx_a]) * i64::from(window[i + j * 4 * n]);
                b += i64::from(self.history_fixed[idx_b])
                    * i64::from(window[(2 * n - 1 - i) + j * 4 * n]);
            }
            let a = norm_k(a, norm_bits);
            out[i] = norm_k(i64::from(a.saturating_add(self.secondary_fixed[i])) * i64::from(scale), 23);
            self.secondary_fixed[i] = norm_k(b, norm_bits);
        }

        self.offset = (self.offset + hlen - n) % hlen;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_silence_in_silence_out() {
        let mut hist = SynthesisHistory::new(32);
        let input = [0f32; 32];
        let mut out = [0f32; 32];
        hist.synth_float(&input, &mut out, 1.0);
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn verify_reset_clears_history() {
        let mut hist = SynthesisHistory::new(32);
        let input = [1000f32; 32];
        let mut out = [0f32; 32];
        hist.synth_float(&input, &mut out, 1.0);
        hist.reset();
        assert!(hist.history.iter().all(|&v| v == 0.0));
        assert!(hist.secondary.iter().all(|&v| v == 0.0));
        assert_eq!(hist.offset, 0);
    }

    #[test]
    fn verify_fixed_path_runs_and_stays_in_range() {
        let mut hist = SynthesisHistory::new(64);
        let input = [5000i32; 64];
        let mut out = [0i32; 64];
        hist.synth_fixed(&input, &mut out, 1 << 20);
        for v in out {
            assert!((-(1 << 23)..(1 << 23)).contains(&v));
        }
    }
}
