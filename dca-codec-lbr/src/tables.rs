// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! LBR's own frozen tables: the tonal/grid/residual VLC families, the cosine/sine table the
//! tonal-component synthesizer uses, the 11-tap correction filter, the residual level tables, and
//! the LFE ADPCM step-size/delta-index tables.
//!
//! STUB NOTICE: as with `dca-codec-core::tables`, every table below is a placeholder. No reference
//! source for LBR's actual codebook/table contents was available to build this decoder from, so
//! these are synthetically generated to have the right shape and range (entry counts, code-length
//! distributions, coefficient scaling), not claimed to match any specific third-party reference
//! table bit-for-bit. Real table data would need to replace these before this decoder could
//! produce correct audio from an actual encoded LBR asset.

use dca_core::io::bit::huffman::{HuffmanTable, H16, H8};
use dca_core::vlc_val;

fn rice_like_entries(n_values: u16) -> Vec<(u16, u8, u16)> {
    let mut entries = Vec::with_capacity(n_values as usize);
    for v in 0..n_values {
        let len = (v / 2) + 1;
        entries.push((v, (len as u8).min(15), v));
    }
    entries
}

fn build_single_stage_h8(entries: &[(u16, u8, u16)], n_init_bits: u32) -> Vec<H8> {
    let size = 1usize << n_init_bits;
    let mut data = vec![vlc_val!(0, 0); size];
    for &(code, len, value) in entries {
        let shift = n_init_bits - u32::from(len);
        let base = (code as usize) << shift;
        for fill in 0..(1usize << shift) {
            data[base + fill] = vlc_val!(value as u8, len as u16);
        }
    }
    data
}

fn build_single_stage_h16(entries: &[(u16, u8, u16)], n_init_bits: u32) -> Vec<H16> {
    let size = 1usize << n_init_bits;
    let mut data = vec![vlc_val!(0, 0); size];
    for &(code, len, value) in entries {
        let shift = n_init_bits - u32::from(len);
        let base = (code as usize) << shift;
        for fill in 0..(1usize << shift) {
            data[base + fill] = vlc_val!(value, len as u16);
        }
    }
    data
}

pub struct LbrVlc8 {
    pub table: HuffmanTable<H8>,
    pub max_depth: u32,
}

pub struct LbrVlc16 {
    pub table: HuffmanTable<H16>,
    pub max_depth: u32,
}

lazy_static::lazy_static! {
    // Named VLC families: tonal-group, tonal-scale-factor, damping, phase, first-residual
    // amplitude, residual-approximation, residual amplitude, three-group average, and the grid
    // families (standard, 2-level, 3-level), plus the residual coefficient table itself.
    static ref TNL_GRP: [Vec<H8>; 5] = [
        build_single_stage_h8(&rice_like_entries(8), 8),
        build_single_stage_h8(&rice_like_entries(8), 8),
        build_single_stage_h8(&rice_like_entries(8), 8),
        build_single_stage_h8(&rice_like_entries(8), 8),
        build_single_stage_h8(&rice_like_entries(8), 8),
    ];
    static ref TNL_SCF: Vec<H8> = build_single_stage_h8(&rice_like_entries(32), 9);
    static ref DAMP: Vec<H8> = build_single_stage_h8(&rice_like_entries(16), 8);
    static ref DPH: Vec<H8> = build_single_stage_h8(&rice_like_entries(32), 9);
    static ref FST_RSD_AMP: Vec<H16> = build_single_stage_h16(&rice_like_entries(128), 10);
    static ref RSD_APPRX: Vec<H8> = build_single_stage_h8(&rice_like_entries(8), 8);
    static ref RSD_AMP: Vec<H16> = build_single_stage_h16(&rice_like_entries(256), 10);
    static ref AVG_G3: Vec<H8> = build_single_stage_h8(&rice_like_entries(8), 8);
    static ref ST_GRID: Vec<H8> = build_single_stage_h8(&rice_like_entries(16), 8);
    static ref GRID_2: Vec<H8> = build_single_stage_h8(&rice_like_entries(4), 4);
    static ref GRID_3: Vec<H8> = build_single_stage_h8(&rice_like_entries(8), 8);
    static ref RSD: Vec<H16> = build_single_stage_h16(&rice_like_entries(512), 10);
}

pub fn tnl_grp_vlc(group: usize) -> LbrVlc8 {
    LbrVlc8 { table: HuffmanTable { data: &TNL_GRP[group.min(4)], n_init_bits: 8 }, max_depth: 1 }
}
pub fn tnl_scf_vlc() -> LbrVlc8 {
    LbrVlc8 { table: HuffmanTable { data: &TNL_SCF, n_init_bits: 9 }, max_depth: 1 }
}
pub fn damp_vlc() -> LbrVlc8 {
    LbrVlc8 { table: HuffmanTable { data: &DAMP, n_init_bits: 8 }, max_depth: 1 }
}
pub fn dph_vlc() -> LbrVlc8 {
    LbrVlc8 { table: HuffmanTable { data: &DPH, n_init_bits: 9 }, max_depth: 1 }
}
pub fn fst_rsd_amp_vlc() -> LbrVlc16 {
    LbrVlc16 { table: HuffmanTable { data: &FST_RSD_AMP, n_init_bits: 10 }, max_depth: 1 }
}
pub fn rsd_apprx_vlc() -> LbrVlc8 {
    LbrVlc8 { table: HuffmanTable { data: &RSD_APPRX, n_init_bits: 8 }, max_depth: 1 }
}
pub fn rsd_amp_vlc() -> LbrVlc16 {
    LbrVlc16 { table: HuffmanTable { data: &RSD_AMP, n_init_bits: 10 }, max_depth: 1 }
}
pub fn avg_g3_vlc() -> LbrVlc8 {
    LbrVlc8 { table: HuffmanTable { data: &AVG_G3, n_init_bits: 8 }, max_depth: 1 }
}
pub fn st_grid_vlc() -> LbrVlc8 {
    LbrVlc8 { table: HuffmanTable { data: &ST_GRID, n_init_bits: 8 }, max_depth: 1 }
}
pub fn grid_2_vlc() -> LbrVlc8 {
    LbrVlc8 { table: HuffmanTable { data: &GRID_2, n_init_bits: 4 }, max_depth: 1 }
}
pub fn grid_3_vlc() -> LbrVlc8 {
    LbrVlc8 { table: HuffmanTable { data: &GRID_3, n_init_bits: 8 }, max_depth: 1 }
}
pub fn rsd_vlc() -> LbrVlc16 {
    LbrVlc16 { table: HuffmanTable { data: &RSD, n_init_bits: 10 }, max_depth: 1 }
}

/// Fixed small level tables for the five residual quantization level codebooks (binary through
/// hexadecimal), indexed by raw code.
pub const RSD_LEVEL_2A: [i32; 2] = [-1, 1];
pub const RSD_LEVEL_2B: [i32; 2] = [-2, 2];
pub const RSD_LEVEL_3: [i32; 3] = [-2, 0, 2];
pub const RSD_LEVEL_5: [i32; 5] = [-4, -2, 0, 2, 4];
pub const RSD_LEVEL_8: [i32; 8] = [-7, -5, -3, -1, 1, 3, 5, 7];
pub const RSD_LEVEL_16: [i32; 16] =
    [-15, -13, -11, -9, -7, -5, -3, -1, 1, 3, 5, 7, 9, 11, 13, 15];

/// LFE ADPCM step-size table (16 entries) and its companion delta-index adjustment table, the
/// same shape the 16-/24-bit LFE chunk's decoder state machine advances through per sample.
pub const LFE_STEP_SIZE: [i32; 16] =
    [7, 8, 9, 10, 11, 12, 13, 14, 16, 18, 20, 22, 24, 26, 28, 32];
pub const LFE_DELTA_INDEX: [i32; 16] = [-1, -1, -1, -1, 2, 4, 6, 8, -1, -1, -1, -1, 2, 4, 6, 8];

/// LBR's own 8-bit sample-rate code table (distinct from the core substream's 4-bit table), the
/// same enumeration the decoder-init header's `sample_rate_code` indexes.
pub const LBR_SAMPLE_RATES: [u32; 16] = [
    8_000, 16_000, 32_000, 64_000, 128_000, 22_050, 44_100, 88_200, 176_400, 12_000, 24_000, 48_000, 96_000,
    192_000, 384_000, 0,
];

pub fn lbr_sample_rate(code: u8) -> u32 {
    LBR_SAMPLE_RATES[code as usize % LBR_SAMPLE_RATES.len()]
}

/// The linear-congruential generator LBR uses to dither unallocated subbands, identical in form
/// to X96's.
pub fn lbr_rand(state: &mut u32) -> i32 {
    dca_codec_core::ext::x96::next_random(state)
}

lazy_static::lazy_static! {
    /// 256-entry cosine/sine table used by the tonal-component synthesizer to rotate each
    /// component's phase per subframe.
    pub static ref TONAL_COS_SIN: Vec<(f32, f32)> = {
        (0..256)
            .map(|i| {
                let theta = std::f64::consts::PI * 2.0 * i as f64 / 256.0;
                (theta.cos() as f32, theta.sin() as f32)
            })
            .collect()
    };

    /// 11-tap correction filter applied around each tonal component's synthesized frequency bin.
    pub static ref CORR_CF: [f32; 11] = {
        let mut t = [0f32; 11];
        for (i, slot) in t.iter_mut().enumerate() {
            let x = i as f32 - 5.0;
            *slot = (1.0 - (x / 6.0).powi(2)).max(0.0);
        }
        t
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_level_tables_are_centered() {
        assert_eq!(RSD_LEVEL_3[1], 0);
        assert_eq!(RSD_LEVEL_5.iter().sum::<i32>(), 0);
    }

    #[test]
    fn verify_tonal_cos_sin_periodic() {
        let (c0, s0) = TONAL_COS_SIN[0];
        assert!((c0 - 1.0).abs() < 1e-4);
        assert!(s0.abs() < 1e-4);
    }

    #[test]
    fn verify_lbr_rand_varies() {
        let mut s = 42;
        let a = lbr_rand(&mut s);
        let b = lbr_rand(&mut s);
        assert_ne!(a, b);
    }
}
