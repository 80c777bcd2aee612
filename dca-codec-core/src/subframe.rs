// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-subframe side information: subsubframe/partial-sample counts,
//! prediction mode and VQ address, bit allocation, transition mode, and scale factors.

use dca_core::errors::{decode_error, Result};
use dca_core::io::BitReaderLtr;

use crate::common::CodingHeader;
use crate::tables::{
    bit_allocation_vlc, quant_index_vlc, scale_factor_vlc, transition_mode_vlc, JOINT_SCALE_FACTORS,
    SCALE_FACTOR_QUANT6, SCALE_FACTOR_QUANT7,
};

/// One subframe's fully-parsed side information, scoped to a single primary channel.
#[derive(Clone, Debug, Default)]
pub struct ChannelSubframeInfo {
    /// Per-subband prediction mode: `false` = no ADPCM, `true` = ADPCM with `prediction_vq_addr`.
    pub prediction_mode: Vec<bool>,
    /// Per-subband 12-bit ADPCM VQ address, valid where `prediction_mode[sb]` is set.
    pub prediction_vq_addr: Vec<u32>,
    /// Per-subband bit-allocation index, `0..=26`.
    pub bit_allocation: Vec<u8>,
    /// Per-subband transition mode (the subsubframe at which the transient begins), only
    /// populated for non-VQ subbands when there is more than one subsubframe.
    pub transition_mode: Vec<u8>,
    /// Per-subband scale factor(s): index 0 is the steady-state factor, index 1 (when
    /// `transition_mode[sb] != 0`) is the transient-point factor.
    pub scale_factors: Vec<[i32; 2]>,
    /// Per-subband joint-subband scale factor, populated for `nsubbands_self..nsubbands_src` when
    /// this channel borrows high subbands from another (`joint_intensity_index > 0`).
    pub joint_scale_factors: Vec<i32>,
}

/// Side information shared across all channels within one subframe.
#[derive(Clone, Debug, Default)]
pub struct SubframeInfo {
    /// `1..=4`: the number of subsubframes in this subframe.
    pub n_subsubframes: u8,
    /// `0..=7`: number of samples in a partial trailing subsubframe (0 when none).
    pub partial_samples: u8,
    pub channels: Vec<ChannelSubframeInfo>,
}

fn is_huffman_eligible(bit_alloc_sel: u8, abits: u8) -> bool {
    // The core substream's bit-allocation selector also picks which codebooks are legal; when
    // the selector is within the group size for this `abits`, Huffman coding is used instead of
    // fixed-width block coding.
    abits >= 1 && abits <= 10 && u32::from(bit_alloc_sel) < 2 + u32::from(abits)
}

/// Parses one subframe's side information for all primary channels.
pub fn parse_subframe_header(
    reader: &mut BitReaderLtr<'_>,
    coding: &CodingHeader,
) -> Result<SubframeInfo> {
    let n_subsubframes = reader.read_bits(2)? as u8 + 1;
    let partial_samples = reader.read_bits(3)? as u8;

    let mut channels = Vec::with_capacity(coding.channels.len());
    for ch in &coding.channels {
        let n = ch.subband_activity as usize;
        let mut info = ChannelSubframeInfo {
            prediction_mode: vec![false; n],
            prediction_vq_addr: vec![0; n],
            bit_allocation: vec![0; n],
            transition_mode: vec![0; n],
            scale_factors: vec![[0, 0]; n],
            joint_scale_factors: Vec::new(),
        };

        for sb in 0..n {
            info.prediction_mode[sb] = reader.read_bool()?;
        }
        for sb in 0..n {
            if info.prediction_mode[sb] {
                info.prediction_vq_addr[sb] = reader.read_bits(12)?;
            }
        }

        let vq_start = ch.vq_start_subband as usize;
        for sb in 0..vq_start.min(n) {
            let abits = if ch.bit_allocation_sel < 7 {
                let vlc = bit_allocation_vlc();
                reader.lookup_vlc(&vlc.table, vlc.max_depth)?
            }
            else {
                reader.read_bits(5)? as u8
            };
            if abits > 26 {
                return decode_error("subframe: bit_allocation index out of range");
            }
            info.bit_allocation[sb] = abits;
        }

        if n_subsubframes > 1 {
            for sb in 0..vq_start.min(n) {
                if info.bit_allocation[sb] != 0 {
                    let vlc = transition_mode_vlc(ch.transition_mode_sel as usize & 3);
                    info.transition_mode[sb] = reader.lookup_vlc(&vlc.table, vlc.max_depth)?;
                }
            }
        }

        channels.push(info);
    }

    for (ch_info, ch) in channels.iter_mut().zip(coding.channels.iter()) {
        parse_scale_factors(reader, ch_info, ch)?;
    }

    Ok(SubframeInfo { n_subsubframes, partial_samples, channels })
}

fn parse_scale_factors(
    reader: &mut BitReaderLtr<'_>,
    info: &mut ChannelSubframeInfo,
    ch: &crate::common::ChannelCodingParams,
) -> Result<()> {
    let vq_start = ch.vq_start_subband as usize;
    let activity = ch.subband_activity as usize;
    let sel = ch.scale_factor_sel;

    let mut running: i32 = 0;
    for sb in 0..vq_start.min(activity) {
        if info.bit_allocation[sb] == 0 {
            continue;
        }
        let value = read_scale_factor(reader, sel, &mut running)?;
        info.scale_factors[sb][0] = lookup_quant(sel, value);
        if info.transition_mode[sb] != 0 {
            let transient = read_scale_factor(reader, sel, &mut running)?;
            info.scale_factors[sb][1] = lookup_quant(sel, transient);
        }
    }

    // High-frequency VQ subbands carry one scale factor each.
    for sb in vq_start..activity {
        let value = read_scale_factor(reader, sel, &mut running)?;
        info.scale_factors[sb][0] = lookup_quant(sel, value);
    }

    if ch.joint_intensity_index > 0 {
        let _joint_codebook_sel = reader.read_bits(3)?;
        info.joint_scale_factors = vec![0; activity.max(32)];
        for sb in activity..32 {
            let raw = reader.read_bits(6)? as i32;
            info.joint_scale_factors[sb] = JOINT_SCALE_FACTORS[(raw + 64).clamp(0, 128) as usize];
        }
    }

    // Dynamic-range coefficient, when present, and the side-information CRC are both skipped by
    // the caller at the subframe boundary rather than here, since their presence is governed by
    // frame-header-level flags this function does not have access to.

    Ok(())
}

fn read_scale_factor(reader: &mut BitReaderLtr<'_>, sel: u8, running: &mut i32) -> Result<i32> {
    if sel <= 4 {
        let vlc = scale_factor_vlc();
        let delta = reader.lookup_vlc(&vlc.table, vlc.max_depth)? as i32 - 32;
        *running += delta;
        Ok(*running)
    }
    else {
        let bits = u32::from(sel) + 1;
        let value = reader.read_bits(bits)? as i32;
        *running = value;
        Ok(value)
    }
}

fn lookup_quant(sel: u8, index: i32) -> i32 {
    if sel <= 4 {
        let idx = index.clamp(0, 63) as usize;
        SCALE_FACTOR_QUANT6[idx]
    }
    else {
        let idx = index.clamp(0, 127) as usize;
        SCALE_FACTOR_QUANT7[idx]
    }
}

/// Whether `abits` (and the corresponding bit-allocation selector context) indicates Huffman
/// coding for the per-subband sample path. Exposed for [`crate::quantize`].
pub fn abits_uses_huffman(bit_alloc_sel: u8, abits: u8) -> bool {
    is_huffman_eligible(bit_alloc_sel, abits)
}

pub fn quant_index_vlc_for(book: usize) -> crate::tables::DcaVlc {
    quant_index_vlc(book)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ChannelCodingParams;

    fn build_header_zero_alloc() -> Vec<u8> {
        let mut bits: Vec<bool> = Vec::new();
        let mut push = |val: u32, n: u32| {
            for i in (0..n).rev() {
                bits.push((val >> i) & 1 != 0);
            }
        };
        push(0, 2); // n_subsubframes - 1 = 0 => 1 subsubframe
        push(0, 3); // partial_samples
        push(0, 2); // 2 subbands: prediction_mode[0..2] = false
        push(0, 5); // bit_allocation[0] (fixed-width since bit_allocation_sel will be 7 in test)
        push(0, 5); // bit_allocation[1]
        let mut bytes = vec![0u8; (bits.len() + 7) / 8];
        for (i, b) in bits.iter().enumerate() {
            if *b {
                bytes[i / 8] |= 1 << (7 - i % 8);
            }
        }
        bytes
    }

    #[test]
    fn verify_zero_allocation_subframe() {
        let buf = build_header_zero_alloc();
        let mut reader = BitReaderLtr::new(&buf);
        let coding = CodingHeader {
            n_subframes: 1,
            n_primary_channels: 1,
            channels: vec![ChannelCodingParams {
                subband_activity: 2,
                vq_start_subband: 2,
                bit_allocation_sel: 7,
                ..Default::default()
            }],
        };
        let info = parse_subframe_header(&mut reader, &coding).unwrap();
        assert_eq!(info.n_subsubframes, 1);
        assert_eq!(info.channels[0].bit_allocation, vec![0, 0]);
    }
}
