// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! XBR: a bitrate-refinement layer. Unlike XCH/XXCH/X96, XBR samples are *additive* refinements
//! to the core's already-decoded subband-domain samples rather than replacements or new channels
//! XBR always dequantizes with the lossless step table regardless of the core
//! frame's `bit_rate_code`, and its transient-point scale-factor selection reuses the core's own
//! per-subframe transition mode rather than parsing one of its own.

use dca_core::errors::{decode_error, Result};
use dca_core::io::BitReaderLtr;
use dca_core::math::clip23;

use crate::common::CodingHeader;
use crate::quantize::{check_dsync, dequantize, read_linear_samples};
use crate::subframe::SubframeInfo;
use crate::tables::{SCALE_FACTOR_QUANT6, SCALE_FACTOR_QUANT7, STEP_SIZE_LOSSLESS};

/// Per-channel XBR side information for one frame: how many of the core's subbands this
/// refinement layer covers.
#[derive(Clone, Debug, Default)]
pub struct XbrFrameInfo {
    pub nsubbands: Vec<usize>,
}

/// Parses and applies one XBR frame's worth of refinement samples directly onto `subband`, the
/// core's own per-`(channel, subband)` subband-domain sample buffer. `reader` must be
/// positioned immediately after the XBR sync word; `core_coding`/`core_subframes` are the core
/// substream's own parsed coding header and per-subframe side information (XBR reuses the core's
/// transition-mode and scale-factor-selector fields rather than carrying its own), and
/// `n_sub_total` is the access unit's subband-domain sample count.
pub fn parse_xbr_frame(
    reader: &mut BitReaderLtr<'_>,
    core_coding: &CodingHeader,
    core_subframes: &[SubframeInfo],
    sync_ssf: bool,
    n_sub_total: usize,
    subband: &mut [Vec<Vec<i32>>],
) -> Result<XbrFrameInfo> {
    let n_channels = core_coding.channels.len();

    let band_nbits = reader.read_bits(2)? + 5;
    let transition_mode_flag = reader.read_bool()?;

    let mut nsubbands = Vec::with_capacity(n_channels);
    for _ in 0..n_channels {
        let n = reader.read_bits(band_nbits)? as usize + 1;
        if n > 32 {
            return decode_error("xbr: active subband count out of range");
        }
        nsubbands.push(n);
    }

    let mut slot = 0usize;
    for (sf_idx, info) in core_subframes.iter().enumerate() {
        let n_subsubframes = info.n_subsubframes as usize;
        let n_samples_this_subframe = if sf_idx + 1 == core_subframes.len() && info.partial_samples != 0 {
            (n_subsubframes - 1) * 8 + info.partial_samples as usize
        }
        else {
            n_subsubframes * 8
        };

        let mut nabits = vec![0u8; n_channels];
        for slot_ch in nabits.iter_mut() {
            *slot_ch = reader.read_bits(2)? as u8 + 2;
        }

        let mut bit_alloc: Vec<Vec<u8>> = Vec::with_capacity(n_channels);
        for ch in 0..n_channels {
            let mut v = Vec::with_capacity(nsubbands[ch]);
            for _ in 0..nsubbands[ch] {
                let a = reader.read_bits(u32::from(nabits[ch]))? as u8;
                if a as usize > 26 {
                    return decode_error("xbr: bit allocation index out of range");
                }
                v.push(a);
            }
            bit_alloc.push(v);
        }

        let mut scale_nbits = vec![0u8; n_channels];
        for slot_ch in scale_nbits.iter_mut() {
            let b = reader.read_bits(3)? as u8;
            if b == 0 {
                return decode_error("xbr: scale factor index width is zero");
            }
            *slot_ch = b;
        }

        let mut scale: Vec<Vec<[i32; 2]>> = Vec::with_capacity(n_channels);
        for ch in 0..n_channels {
            let sel = core_coding.channels[ch].scale_factor_sel;
            let (table, size): (&[i32], usize) =
                if sel > 5 { (&SCALE_FACTOR_QUANT7[..], SCALE_FACTOR_QUANT7.len()) } else { (&SCALE_FACTOR_QUANT6[..], SCALE_FACTOR_QUANT6.len()) };
            let mut v = vec![[0i32; 2]; nsubbands[ch]];
            for band in 0..nsubbands[ch] {
                if bit_alloc[ch][band] == 0 {
                    continue;
                }
                let idx = reader.read_bits(u32::from(scale_nbits[ch]))? as usize;
                if idx >= size {
                    return decode_error("xbr: scale factor index out of range");
                }
                v[band][0] = table[idx];

                let transient = transition_mode_flag
                    && info.channels.get(ch).and_then(|c| c.transition_mode.get(band)).copied().unwrap_or(0) != 0;
                if transient {
                    let idx2 = reader.read_bits(u32::from(scale_nbits[ch]))? as usize;
                    if idx2 >= size {
                        return decode_error("xbr: scale factor index out of range");
                    }
                    v[band][1] = table[idx2];
                }
            }
            scale.push(v);
        }

        let mut ofs = slot;
        for ssf in 0..n_subsubframes {
            let samples_in_block = if ssf == n_subsubframes - 1 { (n_samples_this_subframe - ssf * 8).min(8) } else { 8 };
            if samples_in_block == 0 {
                break;
            }

            for ch in 0..n_channels {
                for band in 0..nsubbands[ch] {
                    let abits = bit_alloc[ch][band];
                    if abits == 0 {
                        continue;
                    }
                    let mut raw = [0i32; 8];
                    read_linear_samples(reader, abits, &mut raw)?;

                    let step = STEP_SIZE_LOSSLESS[(abits as usize).min(26)];
                    let trans_ssf = if transition_mode_flag {
                        info.channels.get(ch).and_then(|c| c.transition_mode.get(band)).copied().unwrap_or(0) as usize
                    }
                    else {
                        0
                    };
                    let sc = if trans_ssf == 0 || ssf < trans_ssf { scale[ch][band][0] } else { scale[ch][band][1] };

                    if let Some(dst_band) = subband.get_mut(ch).and_then(|c| c.get_mut(band)) {
                        let avail = dst_band.len().saturating_sub(ofs);
                        let n = avail.min(samples_in_block);
                        for (s, &r) in raw.iter().take(n).enumerate() {
                            let refinement = dequantize(r, step, sc, 1.0, false);
                            let cur = &mut dst_band[ofs + s];
                            *cur = clip23(cur.saturating_add(refinement));
                        }
                    }
                }
            }

            if ssf == n_subsubframes - 1 || sync_ssf {
                check_dsync(reader)?;
            }
            ofs += samples_in_block;
        }
        slot = ofs.min(n_sub_total);
    }

    Ok(XbrFrameInfo { nsubbands })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ChannelCodingParams;

    #[test]
    fn verify_rejects_zero_scale_nbits() {
        let mut bits: Vec<bool> = Vec::new();
        let mut push = |val: u32, n: u32| {
            for i in (0..n).rev() {
                bits.push((val >> i) & 1 != 0);
            }
        };
        push(0, 2); // band_nbits - 5 = 0 => 5
        push(0, 1); // transition_mode_flag
        push(0, 5); // nsubbands[0] - 1 = 0 => 1
        push(0, 2); // nabits[0] - 2 = 0 => 2
        push(0, 2); // bit_allocation[0][0] = 0 (no bits allocated, skip scale-nbits check? still read)
        push(0, 3); // scale_nbits[0] = 0 -> invalid
        let mut bytes = vec![0u8; (bits.len() + 7) / 8];
        for (i, b) in bits.iter().enumerate() {
            if *b {
                bytes[i / 8] |= 1 << (7 - i % 8);
            }
        }
        let mut reader = BitReaderLtr::new(&bytes);
        let coding = CodingHeader {
            n_subframes: 1,
            n_primary_channels: 1,
            channels: vec![ChannelCodingParams { subband_activity: 1, ..Default::default() }],
        };
        let subframes = vec![SubframeInfo { n_subsubframes: 1, partial_samples: 0, channels: vec![Default::default()] }];
        let mut subband = vec![vec![vec![0i32; 8]; 1]];
        assert!(parse_xbr_frame(&mut reader, &coding, &subframes, true, 8, &mut subband).is_err());
    }
}
