// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A minimal `WAVE_FORMAT_IEEE_FLOAT` RIFF/WAVE writer, just enough to hand decoded PCM to a
//! media player for manual inspection. This demo always writes the `f32` values the decoder's
//! `PlanarAudioBuffer` already holds.
//!
//! The format is a handful of fixed-size fields, not an algorithmic concern worth a dependency,
//! so this is hand-rolled rather than pulled in from a crate.

use std::io::{self, Write};

const FORMAT_IEEE_FLOAT: u16 = 3;

/// Writes a complete RIFF/WAVE file containing `samples` (interleaved, `n_channels`-wide frames)
/// as 32-bit IEEE float PCM at `sample_rate`.
pub fn write_wav<W: Write>(
    mut writer: W,
    n_channels: u16,
    sample_rate: u32,
    samples: &[f32],
) -> io::Result<()> {
    let bits_per_sample: u16 = 32;
    let block_align = n_channels * (bits_per_sample / 8);
    let byte_rate = sample_rate * u32::from(block_align);
    let data_size = (samples.len() * 4) as u32;
    let riff_size = 36 + data_size;

    writer.write_all(b"RIFF")?;
    writer.write_all(&riff_size.to_le_bytes())?;
    writer.write_all(b"WAVE")?;

    writer.write_all(b"fmt ")?;
    writer.write_all(&16u32.to_le_bytes())?;
    writer.write_all(&FORMAT_IEEE_FLOAT.to_le_bytes())?;
    writer.write_all(&n_channels.to_le_bytes())?;
    writer.write_all(&sample_rate.to_le_bytes())?;
    writer.write_all(&byte_rate.to_le_bytes())?;
    writer.write_all(&block_align.to_le_bytes())?;
    writer.write_all(&bits_per_sample.to_le_bytes())?;

    writer.write_all(b"data")?;
    writer.write_all(&data_size.to_le_bytes())?;
    for sample in samples {
        writer.write_all(&sample.to_le_bytes())?;
    }

    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_header_sizes_for_empty_stereo_stream() {
        let mut out = Vec::new();
        write_wav(&mut out, 2, 48_000, &[]).unwrap();
        assert_eq!(&out[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes([out[4], out[5], out[6], out[7]]), 36);
        assert_eq!(&out[8..12], b"WAVE");
        assert_eq!(&out[12..16], b"fmt ");
        assert_eq!(out.len(), 44);
    }

    #[test]
    fn verify_data_chunk_holds_every_sample() {
        let samples = [0.5f32, -0.25, 1.0, -1.0];
        let mut out = Vec::new();
        write_wav(&mut out, 1, 44_100, &samples).unwrap();
        let data_size = u32::from_le_bytes([out[40], out[41], out[42], out[43]]);
        assert_eq!(data_size as usize, samples.len() * 4);
        assert_eq!(out.len(), 44 + samples.len() * 4);
    }
}
