// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coding header parsing: per-channel subband activity, VQ start, joint intensity, and the
//! selectors that govern scale-factor and bit-allocation decoding in every subframe.

use dca_core::errors::{decode_error, Result};
use dca_core::io::BitReaderLtr;

use crate::common::{ChannelCodingParams, CodingHeader};

const N_CODE_BOOKS: usize = 10;

/// Below this selector value, a per-subband scale-factor adjustment follows the selector.
/// Mirrors the per-codebook threshold rule: low selectors imply the coarser of two adjustment
/// tables, which requires an explicit multiplier.
fn needs_scale_factor_adjustment(sel: u8) -> bool {
    sel < 5
}

pub fn parse_coding_header(
    reader: &mut BitReaderLtr<'_>,
    n_primary_channels_expected: usize,
    crc_present: bool,
) -> Result<CodingHeader> {
    let n_subframes = reader.read_bits(4)? as u8 + 1;
    if n_subframes == 0 || n_subframes > 16 {
        return decode_error("coding header: n_subframes out of range");
    }

    let n_primary_channels = reader.read_bits(3)? as u8 + 1;
    if n_primary_channels as usize != n_primary_channels_expected {
        return decode_error("coding header: primary channel count disagrees with audio_mode");
    }

    let mut channels = Vec::with_capacity(n_primary_channels as usize);
    for _ in 0..n_primary_channels {
        let subband_activity = reader.read_bits(5)? as u8 + 2;
        if subband_activity > 32 {
            return decode_error("coding header: subband_activity out of range");
        }
        let vq_start_subband = reader.read_bits(5)? as u8 + 1;
        if vq_start_subband > subband_activity {
            return decode_error("coding header: vq_start_subband exceeds subband_activity");
        }

        let joint_intensity_index = reader.read_bits(3)? as u8;

        channels.push(ChannelCodingParams {
            subband_activity,
            vq_start_subband,
            joint_intensity_index,
            ..Default::default()
        });
    }

    for ch in channels.iter_mut() {
        ch.transition_mode_sel = reader.read_bits(2)? as u8;
    }
    for ch in channels.iter_mut() {
        ch.scale_factor_sel = reader.read_bits(3)? as u8;
    }
    for ch in channels.iter_mut() {
        ch.bit_allocation_sel = reader.read_bits(3)? as u8;
    }

    for ch in channels.iter_mut() {
        for book in 0..N_CODE_BOOKS {
            let sel = reader.read_bits(3)? as u8;
            ch.quant_index_sel[book] = sel;
        }
        for book in 0..N_CODE_BOOKS {
            if needs_scale_factor_adjustment(ch.quant_index_sel[book]) {
                let raw = reader.read_bits(5)?;
                ch.scale_factor_adj[book] = 1.0 + raw as f32 / 16.0;
            } else {
                ch.scale_factor_adj[book] = 1.0;
            }
        }
    }

    if crc_present {
        reader.skip(16)?;
    }

    Ok(CodingHeader { n_subframes, n_primary_channels, channels })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_single_channel_header() -> Vec<u8> {
        let mut bits: Vec<bool> = Vec::new();
        let mut push = |val: u32, n: u32| {
            for i in (0..n).rev() {
                bits.push((val >> i) & 1 != 0);
            }
        };
        push(3, 4); // n_subframes - 1 = 3 => 4 subframes
        push(0, 3); // n_primary_channels - 1 = 0 => 1 channel
        push(6, 5); // subband_activity - 2 = 6 => 8
        push(0, 5); // vq_start_subband - 1 = 0 => 1
        push(0, 3); // joint_intensity_index = 0
        push(0, 2); // transition_mode_sel
        push(0, 3); // scale_factor_sel
        push(0, 3); // bit_allocation_sel
        for _ in 0..10 {
            push(6, 3); // quant_index_sel: 6, no adjustment bits needed (>= 5)
        }

        let mut bytes = vec![0u8; (bits.len() + 7) / 8];
        for (i, b) in bits.iter().enumerate() {
            if *b {
                bytes[i / 8] |= 1 << (7 - i % 8);
            }
        }
        bytes
    }

    #[test]
    fn verify_single_channel_coding_header() {
        let buf = build_single_channel_header();
        let mut reader = BitReaderLtr::new(&buf);
        let header = parse_coding_header(&mut reader, 1, false).unwrap();
        assert_eq!(header.n_subframes, 4);
        assert_eq!(header.n_primary_channels, 1);
        assert_eq!(header.channels.len(), 1);
        assert_eq!(header.channels[0].subband_activity, 8);
        assert_eq!(header.channels[0].vq_start_subband, 1);
        assert_eq!(header.max_subband_activity(), 8);
    }

    #[test]
    fn verify_channel_count_mismatch_rejected() {
        let buf = build_single_channel_header();
        let mut reader = BitReaderLtr::new(&buf);
        assert!(parse_coding_header(&mut reader, 2, false).is_err());
    }
}
