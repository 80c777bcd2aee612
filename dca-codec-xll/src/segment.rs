// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Segment decoding: per-channel Rice or linear sample coding, split
//! into a part-A (covering the adaptive-prediction order) and part-B region, with optional
//! hybrid-Rice linearly-coded exceptions.

use dca_core::errors::Result;
use dca_core::io::BitReaderLtr;

const MAX_UNARY_PREFIX: u32 = 33;

/// One channel's per-segment coding parameters.
#[derive(Clone, Copy, Debug)]
pub struct ChannelCodingParams {
    pub rice_coded: bool,
    pub part_a_bits0: u32,
    pub part_a_bits: u32,
    pub part_b_bits: u32,
    pub aux_bits: u32,
}

fn read_unary(reader: &mut BitReaderLtr<'_>) -> Result<u32> {
    let mut n = 0u32;
    while n < MAX_UNARY_PREFIX {
        if !reader.read_bool()? {
            break;
        }
        n += 1;
    }
    Ok(n)
}

fn zigzag_decode(t: u32) -> i32 {
    if t & 1 != 0 {
        -((t >> 1) as i32) - 1
    }
    else {
        (t >> 1) as i32
    }
}

fn read_rice_sample(reader: &mut BitReaderLtr<'_>, suffix_bits: u32) -> Result<i32> {
    let prefix = read_unary(reader)?;
    let suffix = if suffix_bits > 0 { reader.read_bits(suffix_bits)? } else { 0 };
    let t = (prefix << suffix_bits) | suffix;
    Ok(zigzag_decode(t))
}

fn read_linear_sample(reader: &mut BitReaderLtr<'_>, bits: u32) -> Result<i32> {
    if bits == 0 {
        Ok(0)
    }
    else {
        reader.read_signed(bits)
    }
}

/// Decodes one channel's segment of `n_samples`, split at `part_a_len` into part A (using
/// `params.part_a_bits0`) and part B (using `params.part_b_bits`). `params.part_a_bits` is still
/// read off the bitstream by the caller to keep the cursor aligned with the segment header layout,
/// even though this split does not consult it. When `hybrid_rice` is set, a bitmap of
/// linearly-coded exceptions (each `aux_bits` wide) is read first and applied over the Rice-coded
/// stream.
pub fn decode_channel_segment(
    reader: &mut BitReaderLtr<'_>,
    n_samples: usize,
    part_a_len: usize,
    params: &ChannelCodingParams,
    hybrid_rice: bool,
) -> Result<Vec<i32>> {
    let mut exceptions = vec![false; n_samples];
    if hybrid_rice {
        let log2_n = (usize::BITS - n_samples.max(1).leading_zeros()).max(1);
        let n_exceptions = reader.read_bits(log2_n)? as usize;
        for _ in 0..n_exceptions.min(n_samples) {
            let idx = reader.read_bits(log2_n)? as usize;
            if idx < n_samples {
                exceptions[idx] = true;
            }
        }
    }

    let mut out = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let in_part_a = i < part_a_len;
        let value = if exceptions[i] {
            read_linear_sample(reader, params.aux_bits)?
        }
        else if params.rice_coded {
            let suffix_bits = if in_part_a { params.part_a_bits0 } else { params.part_b_bits };
            read_rice_sample(reader, suffix_bits)?
        }
        else {
            let bits = if in_part_a { params.part_a_bits0 } else { params.part_b_bits };
            read_linear_sample(reader, bits)?
        };
        out.push(value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_zigzag_decode() {
        assert_eq!(zigzag_decode(0), 0);
        assert_eq!(zigzag_decode(1), -1);
        assert_eq!(zigzag_decode(2), 1);
        assert_eq!(zigzag_decode(3), -2);
    }

    #[test]
    fn verify_linear_sample_zero_bits_is_zero() {
        let buf = [0u8; 4];
        let mut reader = BitReaderLtr::new(&buf);
        assert_eq!(read_linear_sample(&mut reader, 0).unwrap(), 0);
    }

    #[test]
    fn verify_decode_channel_segment_all_linear() {
        let buf = [0xFFu8; 8];
        let mut reader = BitReaderLtr::new(&buf);
        let params = ChannelCodingParams { rice_coded: false, part_a_bits0: 8, part_a_bits: 8, part_b_bits: 8, aux_bits: 0 };
        let out = decode_channel_segment(&mut reader, 4, 2, &params, false).unwrap();
        assert_eq!(out.len(), 4);
    }
}
