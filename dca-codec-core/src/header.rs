// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core frame header parsing.

use dca_core::audio::{AudioMode, LfeMode};
use dca_core::consts::{MAX_CORE_FRAME_SIZE, MIN_CORE_FRAME_SIZE, SAMPLE_RATES_HZ};
use dca_core::errors::{decode_error, unsupported_error, Result};
use dca_core::io::BitReaderLtr;

use crate::common::CoreFrameHeader;

/// Parses the core frame header, up to and including the reserved/HDCD bits that precede the
/// coding header. `reader` must already be positioned immediately after the 32-bit sync word.
pub fn parse_frame_header(reader: &mut BitReaderLtr<'_>) -> Result<CoreFrameHeader> {
    let normal_frame = !reader.read_bool()?; // FTYPE: 0 = normal frame, 1 = termination frame
    let deficit_samples = reader.read_bits(5)? + 1;
    if deficit_samples != 32 {
        if normal_frame {
            return unsupported_error("core frame: non-default deficit sample count");
        }
        return decode_error("core frame: deficit samples field out of range");
    }

    let crc_present = reader.read_bool()?;

    let npcmblocks = reader.read_bits(7)? + 1;
    if npcmblocks < 8 || npcmblocks % 8 != 0 {
        return decode_error("core frame: npcmblocks is not a multiple of 8");
    }

    let frame_size = (reader.read_bits(14)? + 1) as usize;
    if frame_size < MIN_CORE_FRAME_SIZE || frame_size > MAX_CORE_FRAME_SIZE {
        return decode_error("core frame: frame_size out of range");
    }

    let amode = reader.read_bits(6)?;
    let audio_mode = match AudioMode::from_code(amode) {
        Some(mode) => mode,
        None => return decode_error("core frame: reserved audio_mode"),
    };

    let sample_rate_code = reader.read_bits(4)? as u8;
    let sample_rate = SAMPLE_RATES_HZ[sample_rate_code as usize];
    if sample_rate == 0 {
        return decode_error("core frame: reserved sample_rate_code");
    }

    let bit_rate_code = reader.read_bits(5)? as u8;

    let _reserved_mix = reader.read_bool()?;
    let dynamic_range_present = reader.read_bool()?;
    let timestamp_present = reader.read_bool()?;
    let aux_present = reader.read_bool()?;
    let _hdcd = reader.read_bool()?;

    let ext_audio_type = reader.read_bits(3)? as u8;
    let ext_audio_present = reader.read_bool()?;
    let _aspf = reader.read_bool()?;

    let lfe_code = reader.read_bits(2)?;
    let lfe = match lfe_code {
        0 => LfeMode::None,
        1 => LfeMode::Interpolate128,
        2 => LfeMode::Interpolate64,
        _ => return decode_error("core frame: reserved lfe_flag"),
    };

    let predictor_history = reader.read_bool()?;

    if crc_present {
        reader.skip(16)?; // header CRC check word
    }

    let sync_ssf = reader.read_bool()?;
    let _reserved = reader.read_bits(2)?;

    let front_sum_diff = reader.read_bool()?;
    let surround_sum_diff = reader.read_bool()?;

    let dialog_normalization = if dynamic_range_present { reader.read_bits(4)? as u8 } else { 0 };
    let source_pcm_resolution_code = reader.read_bits(3)? as u8;

    Ok(CoreFrameHeader {
        frame_size,
        npcmblocks,
        audio_mode,
        sample_rate_code,
        sample_rate,
        bit_rate_code,
        lfe,
        crc_present,
        predictor_history,
        sync_ssf,
        source_pcm_resolution_code,
        front_sum_diff,
        surround_sum_diff,
        dialog_normalization,
        timestamp_present,
        aux_present,
        ext_audio_present,
        ext_audio_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dca_core::io::BitReaderLtr;

    fn build_header_bits(sample_rate_code: u32) -> Vec<u8> {
        // Hand-assemble the bitstream described in the "Minimal mono core" end-to-end scenario:
        // audio_mode = 0 (mono), sample_rate_code = 13 (48 kHz), npcmblocks = 8,
        // frame_size = 96, crc_present = false, lfe = None.
        let mut bits: Vec<bool> = Vec::new();
        let mut push = |val: u32, n: u32| {
            for i in (0..n).rev() {
                bits.push((val >> i) & 1 != 0);
            }
        };
        push(0, 1); // FTYPE: normal frame
        push(31, 5); // deficit samples - 1 == 31 => 32
        push(0, 1); // crc_present
        push(7, 7); // npcmblocks - 1 == 7 => npcmblocks = 8
        push(95, 14); // frame_size - 1 == 95 => 96
        push(0, 6); // amode = 0 (mono)
        push(sample_rate_code, 4);
        push(0, 5); // bit_rate_code
        push(0, 1); // reserved/mix
        push(0, 1); // dynamic_range_present
        push(0, 1); // timestamp_present
        push(0, 1); // aux_present
        push(0, 1); // hdcd
        push(0, 3); // ext_audio_type
        push(0, 1); // ext_audio_present
        push(0, 1); // aspf
        push(0, 2); // lfe_flag = None
        push(1, 1); // predictor_history
        push(0, 1); // sync_ssf
        push(0, 2); // reserved
        push(0, 1); // front_sum_diff
        push(0, 1); // surround_sum_diff
        push(0, 3); // source_pcm_resolution_code

        let mut bytes = vec![0u8; (bits.len() + 7) / 8];
        for (i, b) in bits.iter().enumerate() {
            if *b {
                bytes[i / 8] |= 1 << (7 - i % 8);
            }
        }
        bytes
    }

    #[test]
    fn verify_minimal_mono_header() {
        let buf = build_header_bits(13); // 48 kHz
        let mut reader = BitReaderLtr::new(&buf);
        let header = parse_frame_header(&mut reader).unwrap();
        assert_eq!(header.frame_size, 96);
        assert_eq!(header.sample_rate, 48_000);
        assert_eq!(header.n_channels(), 1);
        assert!(!header.crc_present);
        assert_eq!(header.lfe, LfeMode::None);
    }

    #[test]
    fn verify_reserved_sample_rate_rejected() {
        let buf = build_header_bits(4); // reserved sample_rate_code
        let mut reader = BitReaderLtr::new(&buf);
        assert!(parse_frame_header(&mut reader).is_err());
    }
}
