// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! LBR's header: a decoder-init header (type 2) or a lightweight repeat header (type 1) that
//! reuses previously initialized state.

use dca_core::audio::ChannelMask;
use dca_core::consts::SYNC_LBR;
use dca_core::errors::{decode_error, invalid_sync_error, unsupported_error, Result};
use dca_core::io::BitReaderLtr;

/// Which of LBR's two header shapes this frame carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LbrHeaderKind {
    /// Type 1: reuses the previously initialized decoder state, requiring only a fresh
    /// (non-zero) sample rate.
    Repeat,
    /// Type 2: a full decoder-init header.
    Init(LbrInitHeader),
}

#[derive(Clone, Debug, Default)]
pub struct LbrInitHeader {
    pub sample_rate_code: u8,
    pub channel_mask: ChannelMask,
    pub lfe_present: bool,
    pub band_limit: u8,
    pub stereo_downmix: bool,
    pub multichannel_downmix: bool,
    pub original_bit_rate: u32,
    pub scaled_bit_rate: u32,
}

/// Parses the LBR sync word and header. `reader` must be positioned immediately before the sync
/// word.
pub fn parse_lbr_header(reader: &mut BitReaderLtr<'_>) -> Result<LbrHeaderKind> {
    let sync = reader.read_bits(32)?;
    if sync != SYNC_LBR {
        return invalid_sync_error("lbr: sync word mismatch");
    }

    let header_type = reader.read_bits(8)? as u8;
    match header_type {
        1 => {
            let sample_rate_code = reader.read_bits(8)? as u8;
            if sample_rate_code == 0 {
                return decode_error("lbr: repeat header requires a non-zero sample rate");
            }
            // The remainder of a type-1 header is the sample-rate code only; everything else is
            // inherited from the most recent type-2 header.
            Ok(LbrHeaderKind::Repeat)
        }
        2 => {
            let sample_rate_code = reader.read_bits(8)? as u8;
            let mask_bits = reader.read_bits(16)?;
            let channel_mask = ChannelMask::from_bits_truncate(mask_bits);

            let version = reader.read_bits(16)?;
            if (version >> 8) != 0x08 {
                return unsupported_error("lbr: unrecognized header version");
            }

            let lfe_present = reader.read_bool()?;
            let band_limit = reader.read_bits(3)? as u8;
            let stereo_downmix = reader.read_bool()?;
            let multichannel_downmix = reader.read_bool()?;
            let _reserved = reader.read_bits(2)?;

            let _bit_rate_hi = reader.read_bits(4)?;
            let original_bit_rate = reader.read_bits(16)?;
            let scaled_bit_rate = reader.read_bits(16)?;

            Ok(LbrHeaderKind::Init(LbrInitHeader {
                sample_rate_code,
                channel_mask,
                lfe_present,
                band_limit,
                stereo_downmix,
                multichannel_downmix,
                original_bit_rate,
                scaled_bit_rate,
            }))
        }
        _ => unsupported_error("lbr: unrecognized header type"),
    }
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
    fn verify_repeat_header_requires_nonzero_rate() {
        let mut bits = Vec::new();
        push_bits(&mut bits, SYNC_LBR, 32);
        push_bits(&mut bits, 1, 8); // header_type = 1
        push_bits(&mut bits, 0, 8); // sample_rate_code = 0: invalid
        let buf = to_bytes(&bits);
        let mut reader = BitReaderLtr::new(&buf);
        assert!(parse_lbr_header(&mut reader).is_err());
    }

    #[test]
    fn verify_init_header_rejects_bad_version() {
        let mut bits = Vec::new();
        push_bits(&mut bits, SYNC_LBR, 32);
        push_bits(&mut bits, 2, 8); // header_type = 2
        push_bits(&mut bits, 13, 8); // sample_rate_code
        push_bits(&mut bits, 0, 16); // channel_mask
        push_bits(&mut bits, 0x0100, 16); // version, upper byte wrong (0x01 != 0x08)
        let buf = to_bytes(&bits);
        let mut reader = BitReaderLtr::new(&buf);
        assert!(parse_lbr_header(&mut reader).is_err());
    }
}
