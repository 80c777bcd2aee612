// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The NAVI table: per-band, per-segment, per-channel-set byte counts, followed by
//! a 16-bit CRC and a byte alignment.

use dca_core::errors::Result;
use dca_core::io::BitReaderLtr;

/// `sizes[band][segment][channel_set]` byte counts, as read from the NAVI table.
pub struct Navi {
    pub sizes: Vec<Vec<Vec<u32>>>,
}

impl Navi {
    /// The total byte size of `segment` within `band`, summed across channel sets.
    pub fn segment_size(&self, band: usize, segment: usize) -> u32 {
        self.sizes[band][segment].iter().sum()
    }

    /// The total byte size of `band`, summed across all its segments.
    pub fn band_size(&self, band: usize) -> u32 {
        self.sizes[band].iter().map(|seg| seg.iter().sum::<u32>()).sum()
    }
}

/// Parses the NAVI table for `n_bands` frequency bands, `n_segments` segments per band, and
/// `n_channel_sets` channel sets, each entry `seg_size_nbits + 1` bits wide, then skips the
/// trailing 16-bit CRC and aligns to a byte boundary. The CRC itself is validated by the caller
/// (which holds the original byte slice this reader was built from) via
/// [`crate::decoder::validate_navi_crc`], following the same split the auxiliary block parser
/// uses.
pub fn parse_navi(
    reader: &mut BitReaderLtr<'_>,
    n_bands: usize,
    n_segments: usize,
    n_channel_sets: usize,
    seg_size_nbits: u32,
) -> Result<(Navi, usize, usize)> {
    let start_bit = reader.position_bits();
    let mut sizes = vec![vec![vec![0u32; n_channel_sets]; n_segments]; n_bands];

    for band in sizes.iter_mut() {
        for segment in band.iter_mut() {
            for entry in segment.iter_mut() {
                *entry = reader.read_bits(seg_size_nbits)?;
            }
        }
    }

    let end_bit = reader.position_bits();
    let _crc = reader.read_bits(16)?;
    reader.align_to(8)?;
    Ok((Navi { sizes }, start_bit, end_bit - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_navi_sizes_sum_correctly() {
        let navi = Navi { sizes: vec![vec![vec![3, 4], vec![5, 6]]] };
        assert_eq!(navi.segment_size(0, 0), 7);
        assert_eq!(navi.segment_size(0, 1), 11);
        assert_eq!(navi.band_size(0), 18);
    }
}
