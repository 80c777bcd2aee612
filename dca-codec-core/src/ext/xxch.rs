// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! XXCH: extra loudspeaker sets defined by a variable-width speaker-mask descriptor, with an
//! optional embedded downmix back to the core's channel set. Rides on the same subframe
//! machinery as the core substream ([`crate::quantize::decode_channel_set_samples`]): header and
//! sample payload are interleaved per subframe, not all headers followed by all data.

use dca_core::audio::ChannelMask;
use dca_core::errors::{decode_error, Result};
use dca_core::io::BitReaderLtr;

use crate::coding_header::parse_coding_header;
use crate::common::CodingHeader;
use crate::quantize::decode_channel_set_samples;
use crate::subframe::SubframeInfo;

/// An embedded downmix from the XXCH channel set back onto the core's speakers: one 7-bit signed
/// coefficient per `(new channel, core speaker)` pair that participates.
#[derive(Clone, Debug, Default)]
pub struct XxchDownmix {
    pub core_mask: ChannelMask,
    /// One coefficient row per new channel, each row indexed in the same order as
    /// `core_mask.speakers()`.
    pub coefficients: Vec<Vec<i32>>,
}

pub struct XxchAsset {
    pub new_mask: ChannelMask,
    pub coding: CodingHeader,
    pub subframes: Vec<SubframeInfo>,
    pub downmix: Option<XxchDownmix>,
    /// Decoded subband-domain samples, `samples[new_channel][subband][sample_idx]`.
    pub samples: Vec<Vec<Vec<i32>>>,
}

/// Parses and fully decodes the XXCH extension. `reader` is positioned immediately after the
/// XXCH sync word. `core_mask` must be disjoint from the newly-declared speaker mask; violating
/// this is a parse error. `n_sub_total` is the access unit's subband-domain sample
/// count (`header.duration() / 32`); `histories` holds this channel set's own persistent
/// per-`(new channel, subband)` ADPCM history, carried across frames and resized here to match
/// however many new channels and subbands this frame declares.
#[allow(clippy::too_many_arguments)]
pub fn parse_xxch(
    reader: &mut BitReaderLtr<'_>,
    core_mask: ChannelMask,
    n_subframes: u8,
    bit_rate_code: u8,
    sync_ssf: bool,
    n_sub_total: usize,
    histories: &mut Vec<Vec<[i32; 4]>>,
) -> Result<XxchAsset> {
    let mask_nbits = reader.read_bits(5)? + 1;
    let new_mask_bits = reader.read_bits(mask_nbits)?;
    let new_mask = ChannelMask::from_bits_truncate(new_mask_bits);

    if core_mask.intersects(new_mask) {
        return decode_error("xxch: new speaker mask overlaps the core's mask");
    }

    let n_new_channels = new_mask.count() as usize;
    if n_new_channels == 0 {
        return decode_error("xxch: empty new speaker mask");
    }

    let has_downmix = reader.read_bool()?;
    let downmix = if has_downmix {
        let core_speakers: Vec<_> = core_mask.speakers().collect();
        let mut coefficients = Vec::with_capacity(n_new_channels);
        for _ in 0..n_new_channels {
            let mut row = Vec::with_capacity(core_speakers.len());
            for _ in &core_speakers {
                let present = reader.read_bool()?;
                if present {
                    let raw = reader.read_signed(7)?;
                    row.push(raw);
                }
                else {
                    row.push(0);
                }
            }
            coefficients.push(row);
        }
        Some(XxchDownmix { core_mask, coefficients })
    }
    else {
        None
    };

    let crc_present = reader.read_bool()?;
    let coding = parse_coding_header(reader, n_new_channels, crc_present)?;
    if coding.channels.len() != n_new_channels {
        return decode_error("xxch: coding header channel count does not match the speaker mask");
    }

    if histories.len() != n_new_channels {
        histories.resize_with(n_new_channels, Vec::new);
    }
    for (ch, hist) in histories.iter_mut().enumerate() {
        let activity = coding.channels[ch].subband_activity as usize;
        if hist.len() != activity {
            *hist = vec![[0i32; 4]; activity];
        }
    }

    let (subframes, samples) =
        decode_channel_set_samples(reader, bit_rate_code, &coding, n_subframes, sync_ssf, n_sub_total, histories)?;

    Ok(XxchAsset { new_mask, coding, subframes, downmix, samples })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_overlapping_mask_rejected() {
        let mut bits: Vec<bool> = Vec::new();
        let mut push = |val: u32, n: u32| {
            for i in (0..n).rev() {
                bits.push((val >> i) & 1 != 0);
            }
        };
        push(4, 5); // mask_nbits - 1 = 4 => 5 bits
        push(ChannelMask::L.bits(), 5); // new_mask overlaps core's L
        let mut bytes = vec![0u8; (bits.len() + 7) / 8];
        for (i, b) in bits.iter().enumerate() {
            if *b {
                bytes[i / 8] |= 1 << (7 - i % 8);
            }
        }
        let mut reader = BitReaderLtr::new(&bytes);
        let core_mask = ChannelMask::L | ChannelMask::R;
        let mut histories = Vec::new();
        assert!(parse_xxch(&mut reader, core_mask, 1, 0, true, 0, &mut histories).is_err());
    }
}
