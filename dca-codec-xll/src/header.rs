// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! XLL's common header and per-channel-set parameter block.

use dca_core::audio::ChannelMask;
use dca_core::consts::SYNC_XLL;
use dca_core::errors::{decode_error, invalid_sync_error, unsupported_error, Result};
use dca_core::io::BitReaderLtr;

const MAX_CHANNEL_SETS: usize = 3;

/// The fields common to every XLL frame, read once before its channel sets.
#[derive(Clone, Debug)]
pub struct XllCommonHeader {
    pub version: u8,
    pub header_size_bits: u32,
    pub frame_size_bytes: u32,
    pub n_channel_sets: u8,
    pub segments_per_frame_log2: u8,
    pub samples_per_segment_log2: u8,
    pub seg_size_nbits: u32,
    pub band_crc_mode: u8,
    pub scalable_lsb_present: bool,
    pub channel_mask_nbits: u32,
}

impl XllCommonHeader {
    pub fn n_segments(&self) -> usize {
        1usize << self.segments_per_frame_log2
    }

    pub fn samples_per_segment(&self) -> usize {
        1usize << self.samples_per_segment_log2
    }
}

/// One channel set's static parameters. A single supported frequency
/// band per channel set, as the format allows but most streams use.
#[derive(Clone, Debug)]
pub struct ChannelSetHeader {
    pub n_channels: usize,
    pub residual_encode_mask: u32,
    pub pcm_bit_resolution: u32,
    pub storage_bit_width: u32,
    pub sampling_frequency: u32,
    pub is_primary: bool,
    pub embedded_downmix_coeffs: Option<Vec<i32>>,
    pub is_hierarchical: bool,
    pub channel_mask: ChannelMask,
    pub pairwise_decorrelation: bool,
    pub pair_coeffs: Vec<i8>,
    pub adaptive_order: Vec<u8>,
    pub fixed_order: Vec<u8>,
    pub reflection_coeffs: Vec<Vec<u8>>,
    pub scalable_lsbs: Vec<u32>,
    pub bit_width_adj: Vec<u32>,
}

/// Parses the common header. `reader` must be positioned immediately after the XLL sync word.
pub fn parse_common_header(reader: &mut BitReaderLtr<'_>) -> Result<XllCommonHeader> {
    let version = reader.read_bits(4)? as u8;
    let header_size_bits = reader.read_bits(8)? + 1;
    let frame_size_bytes = reader.read_bits(20)? + 1;
    let n_channel_sets = reader.read_bits(4)? as u8 + 1;
    if n_channel_sets as usize > MAX_CHANNEL_SETS {
        return unsupported_error("xll: more than 3 channel sets");
    }
    let segments_per_frame_log2 = reader.read_bits(4)? as u8;
    let samples_per_segment_log2 = reader.read_bits(4)? as u8;
    let seg_size_nbits = reader.read_bits(5)? + 1;
    let band_crc_mode = reader.read_bits(2)? as u8;
    let scalable_lsb_present = reader.read_bool()?;
    let channel_mask_nbits = reader.read_bits(5)?;

    Ok(XllCommonHeader {
        version,
        header_size_bits,
        frame_size_bytes,
        n_channel_sets,
        segments_per_frame_log2,
        samples_per_segment_log2,
        seg_size_nbits,
        band_crc_mode,
        scalable_lsb_present,
        channel_mask_nbits,
    })
}

/// Skips past the XLL sync word, returning an `InvalidSync` error if it is absent.
pub fn skip_sync(reader: &mut BitReaderLtr<'_>) -> Result<()> {
    let sync = reader.read_bits(32)?;
    if sync != SYNC_XLL {
        return invalid_sync_error("xll: sync word mismatch");
    }
    Ok(())
}

/// Parses one channel set's parameter block, given the common header's scalable-LSB flag.
pub fn parse_channel_set_header(reader: &mut BitReaderLtr<'_>, common: &XllCommonHeader) -> Result<ChannelSetHeader> {
    let n_channels = reader.read_bits(4)? as usize + 1;
    let residual_encode_mask = reader.read_bits(n_channels as u32)?;
    let pcm_bit_resolution = reader.read_bits(5)? + 1;
    let storage_bit_width = reader.read_bits(5)? + 1;
    let sampling_frequency = reader.read_bits(4)?;

    let n_freq_bands = reader.read_bits(2)? + 1;
    if n_freq_bands != 1 {
        return unsupported_error("xll: multiple frequency bands per channel set");
    }

    let is_primary = reader.read_bool()?;

    let embedded_downmix_coeffs = if !is_primary && reader.read_bool()? {
        let mut coeffs = Vec::with_capacity(n_channels);
        for _ in 0..n_channels {
            coeffs.push(reader.read_signed(16)?);
        }
        Some(coeffs)
    }
    else {
        None
    };

    let is_hierarchical = reader.read_bool()?;

    let channel_mask = if common.channel_mask_nbits > 0 {
        ChannelMask::from_bits_truncate(reader.read_bits(common.channel_mask_nbits)?)
    }
    else {
        ChannelMask::empty()
    };

    let pairwise_decorrelation = n_channels > 1 && reader.read_bool()?;
    let mut pair_coeffs = Vec::new();
    if pairwise_decorrelation {
        for _ in 0..n_channels / 2 {
            pair_coeffs.push(reader.read_signed(7)? as i8);
        }
    }

    let mut adaptive_order = vec![0u8; n_channels];
    let mut fixed_order = vec![0u8; n_channels];
    let mut reflection_coeffs = vec![Vec::new(); n_channels];

    for ch in 0..n_channels {
        let prediction_mode = reader.read_bool()?;
        if prediction_mode {
            let order = reader.read_bits(4)? as u8;
            if order > 15 {
                return decode_error("xll: adaptive prediction order out of range");
            }
            adaptive_order[ch] = order;
            let mut coeffs = Vec::with_capacity(order as usize);
            for _ in 0..order {
                coeffs.push(reader.read_bits(8)? as u8);
            }
            reflection_coeffs[ch] = coeffs;
        }
        else {
            fixed_order[ch] = reader.read_bits(2)? as u8;
        }
    }

    let mut scalable_lsbs = vec![0u32; n_channels];
    let mut bit_width_adj = vec![0u32; n_channels];
    if common.scalable_lsb_present {
        for ch in 0..n_channels {
            scalable_lsbs[ch] = reader.read_bits(4)?;
            if scalable_lsbs[ch] > 0 {
                bit_width_adj[ch] = reader.read_bits(4)?;
            }
        }
    }

    Ok(ChannelSetHeader {
        n_channels,
        residual_encode_mask,
        pcm_bit_resolution,
        storage_bit_width,
        sampling_frequency,
        is_primary,
        embedded_downmix_coeffs,
        is_hierarchical,
        channel_mask,
        pairwise_decorrelation,
        pair_coeffs,
        adaptive_order,
        fixed_order,
        reflection_coeffs,
        scalable_lsbs,
        bit_width_adj,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_bits(bits: &mut Vec<bool>, val: u32, n: u32) {
        for i in (0..n).rev() {
            bits.push((val >> i) & 1 != 0);
        }
    }

    fn to_bytes(bits: &[bool]) -> Vec<u8> {
        let mut bytes = vec![0u8; (bits.len() + 7) / 8];
        for (i, b) in bits.iter().enumerate() {
            if *b {
                bytes[i / 8] |= 1 << (7 - i % 8);
            }
        }
        bytes
    }

    #[test]
    fn verify_common_header_roundtrip_shape() {
        let mut bits = Vec::new();
        push_bits(&mut bits, 8, 4); // version
        push_bits(&mut bits, 19, 8); // header_size - 1
        push_bits(&mut bits, 999, 20); // frame_size - 1
        push_bits(&mut bits, 0, 4); // n_channel_sets - 1
        push_bits(&mut bits, 2, 4); // segments_per_frame_log2
        push_bits(&mut bits, 6, 4); // samples_per_segment_log2
        push_bits(&mut bits, 11, 5); // seg_size_nbits - 1
        push_bits(&mut bits, 1, 2); // band_crc_mode
        push_bits(&mut bits, 1, 1); // scalable_lsb_present
        push_bits(&mut bits, 16, 5); // channel_mask_nbits
        let buf = to_bytes(&bits);
        let mut reader = BitReaderLtr::new(&buf);
        let header = parse_common_header(&mut reader).unwrap();
        assert_eq!(header.n_channel_sets, 1);
        assert_eq!(header.n_segments(), 4);
        assert_eq!(header.samples_per_segment(), 64);
        assert!(header.scalable_lsb_present);
    }

    #[test]
    fn verify_too_many_channel_sets_rejected() {
        let mut bits = Vec::new();
        push_bits(&mut bits, 8, 4);
        push_bits(&mut bits, 19, 8);
        push_bits(&mut bits, 999, 20);
        push_bits(&mut bits, 5, 4); // n_channel_sets - 1 = 5 -> 6 sets: unsupported
        let buf = to_bytes(&bits);
        let mut reader = BitReaderLtr::new(&buf);
        assert!(parse_common_header(&mut reader).is_err());
    }
}
