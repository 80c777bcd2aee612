// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! LBR's chunked frame body: each chunk carries an 8-bit ID (whose MSB selects a short or
//! long length field) followed by its bytes. This module owns chunk framing, the LFE ADPCM
//! decode, and the grid/time-sample subband decode; [`crate::tonal`] owns the tonal-group chunk
//! family.

use dca_core::errors::{decode_error, Result};
use dca_core::io::BitReaderLtr;

use crate::tables::{
    grid_2_vlc, grid_3_vlc, lbr_rand, rsd_amp_vlc, rsd_vlc, st_grid_vlc, LFE_DELTA_INDEX, LFE_STEP_SIZE,
    RSD_LEVEL_16, RSD_LEVEL_2A, RSD_LEVEL_2B, RSD_LEVEL_3, RSD_LEVEL_5, RSD_LEVEL_8,
};

const LFE_SAMPLES_PER_CHUNK: usize = 64;

/// One chunk's framing: its 8-bit ID and the byte slice of its body.
pub struct Chunk<'a> {
    pub id: u8,
    pub body: &'a [u8],
}

/// Splits `buf` (the LBR frame body, after the header) into its sequence of chunks. The MSB of
/// the ID byte selects a 1-byte ("short") or 2-byte ("long") length field for the chunk that
/// follows it.
pub fn split_chunks(buf: &[u8]) -> Vec<Chunk<'_>> {
    let mut chunks = Vec::new();
    let mut pos = 0usize;
    while pos < buf.len() {
        let id_byte = buf[pos];
        let id = id_byte & 0x7F;
        pos += 1;
        let len = if id_byte & 0x80 != 0 {
            if pos + 2 > buf.len() {
                break;
            }
            let len = u16::from_be_bytes([buf[pos], buf[pos + 1]]) as usize;
            pos += 2;
            len
        }
        else {
            if pos + 1 > buf.len() {
                break;
            }
            let len = buf[pos] as usize;
            pos += 1;
            len
        };
        let end = (pos + len).min(buf.len());
        chunks.push(Chunk { id, body: &buf[pos..end] });
        pos = end;
    }
    chunks
}

/// Decodes one LFE chunk into 64 LFE samples via 16- or 24-bit ADPCM.
pub fn decode_lfe_chunk(body: &[u8], bits_per_sample: u32) -> Result<[i32; LFE_SAMPLES_PER_CHUNK]> {
    let mut reader = BitReaderLtr::new(body);
    let mut out = [0i32; LFE_SAMPLES_PER_CHUNK];
    let mut predictor: i32 = reader.read_signed(bits_per_sample)?;
    let mut step_index: usize = 0;
    out[0] = predictor;

    for slot in out.iter_mut().skip(1) {
        let delta = reader.read_signed(4)?;
        let step = LFE_STEP_SIZE[step_index.min(15)];
        let magnitude = delta.unsigned_abs() as i32;
        let diff = (step * (2 * magnitude + 1)) >> 3;
        predictor = if delta < 0 { predictor - diff } else { predictor + diff };
        predictor = predictor.clamp(-(1 << 23), (1 << 23) - 1);
        *slot = predictor;

        let adjust = LFE_DELTA_INDEX[magnitude.min(15) as usize];
        step_index = (step_index as i32 + adjust).clamp(0, 15) as usize;
    }

    Ok(out)
}

/// One decoded subband's 4-sample time block from a grid/TS chunk.
pub type SubbandBlock = [i32; 4];

/// Decodes a residual sample of quantization level `level` (`1..=5`, corresponding to
/// binary/ternary/quinary/octal/hexadecimal code books) using the matching small level table.
fn decode_level_coded(reader: &mut BitReaderLtr<'_>, level: u8) -> Result<i32> {
    match level {
        1 => {
            let code = reader.read_bits(1)? as usize;
            Ok(RSD_LEVEL_2A[code])
        }
        2 => {
            let code = reader.read_bits(1)? as usize;
            Ok(RSD_LEVEL_2B[code])
        }
        3 => {
            let vlc = grid_2_vlc();
            let code = reader.lookup_vlc(&vlc.table, vlc.max_depth)? as usize % RSD_LEVEL_3.len();
            Ok(RSD_LEVEL_3[code])
        }
        4 => {
            let vlc = grid_3_vlc();
            let code = reader.lookup_vlc(&vlc.table, vlc.max_depth)? as usize % RSD_LEVEL_5.len();
            Ok(RSD_LEVEL_5[code])
        }
        5 => {
            let vlc = st_grid_vlc();
            let code = reader.lookup_vlc(&vlc.table, vlc.max_depth)? as usize % RSD_LEVEL_8.len();
            Ok(RSD_LEVEL_8[code])
        }
        _ => {
            let vlc = rsd_vlc();
            let code = reader.lookup_vlc(&vlc.table, vlc.max_depth)? as usize % RSD_LEVEL_16.len();
            Ok(RSD_LEVEL_16[code])
        }
    }
}

/// Decodes one grid/TS chunk's per-subband 4-sample blocks for `n_subbands` active subbands,
/// filling subbands the bitstream left unallocated with dithered noise derived from the mean
/// magnitude of subbands 2..5 for indices `>= 10` and plain dither below that.
pub fn decode_grid_chunk(
    body: &[u8],
    n_subbands: usize,
    allocated: &[bool],
    levels: &[u8],
    rand_state: &mut u32,
) -> Result<Vec<SubbandBlock>> {
    let mut reader = BitReaderLtr::new(body);
    let mut out = vec![[0i32; 4]; n_subbands];

    for sb in 0..n_subbands {
        if sb < 2 {
            continue;
        }
        if sb < allocated.len() && allocated[sb] {
            let level = levels.get(sb).copied().unwrap_or(5);
            for slot in out[sb].iter_mut() {
                *slot = decode_level_coded(&mut reader, level)?;
            }
        }
    }

    let mean_low = if n_subbands > 5 {
        let sum: i64 = out[2..5].iter().flatten().map(|&v| i64::from(v.abs())).sum();
        (sum / 12).max(1) as i32
    }
    else {
        1
    };

    for sb in 2..n_subbands {
        let already_allocated = sb < allocated.len() && allocated[sb];
        if already_allocated {
            continue;
        }
        let factor = if sb < 10 { 64 } else { mean_low };
        for slot in out[sb].iter_mut() {
            let r = lbr_rand(rand_state);
            *slot = ((i64::from(r) * i64::from(factor)) >> 24) as i32;
        }
    }

    if out.is_empty() {
        return decode_error("lbr: grid chunk declares zero subbands");
    }

    Ok(out)
}

/// Decodes a residual amplitude-VLC-coded sample, used by the first-residual ("fst_rsd_amp") and
/// ordinary residual-amplitude ("rsd_amp") code families.
pub fn decode_residual_amplitude(reader: &mut BitReaderLtr<'_>, first: bool) -> Result<i32> {
    if first {
        let vlc = crate::tables::fst_rsd_amp_vlc();
        Ok(reader.lookup_vlc(&vlc.table, vlc.max_depth)? as i32)
    }
    else {
        let vlc = rsd_amp_vlc();
        Ok(reader.lookup_vlc(&vlc.table, vlc.max_depth)? as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_split_chunks_short_form() {
        let buf = [0x05, 0x02, 0xAA, 0xBB];
        let chunks = split_chunks(&buf);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, 5);
        assert_eq!(chunks[0].body, &[0xAA, 0xBB]);
    }

    #[test]
    fn verify_split_chunks_long_form() {
        let buf = [0x85, 0x00, 0x02, 0xAA, 0xBB];
        let chunks = split_chunks(&buf);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, 5);
        assert_eq!(chunks[0].body, &[0xAA, 0xBB]);
    }

    #[test]
    fn verify_lfe_chunk_stays_in_range() {
        let body = vec![0u8; 32];
        let out = decode_lfe_chunk(&body, 16).unwrap();
        for v in out {
            assert!((-(1 << 23)..(1 << 23)).contains(&v));
        }
    }
}
