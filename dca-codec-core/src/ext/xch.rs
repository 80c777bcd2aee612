// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! XCH: a single extra surround channel (Cs) appended to the core's primary channel set
//! XCH rejects frames where Cs is already present in the core's
//! speaker mask. Rides on the same subframe machinery as the core substream
//! ([`crate::quantize::decode_channel_set_samples`]): header and sample payload are interleaved
//! per subframe exactly as the core's own loop is, not all headers followed by all data.

use dca_core::audio::ChannelMask;
use dca_core::errors::{decode_error, unsupported_error, Result};
use dca_core::io::BitReaderLtr;

use crate::coding_header::parse_coding_header;
use crate::common::CodingHeader;
use crate::quantize::decode_channel_set_samples;
use crate::subframe::SubframeInfo;

/// A parsed XCH channel set: one extra channel's coding parameters, its per-subframe side
/// information, and its decoded subband-domain samples (`samples[0][subband][sample_idx]`),
/// ready to be synthesized and appended to the core's channel array.
pub struct XchAsset {
    pub coding: CodingHeader,
    pub subframes: Vec<SubframeInfo>,
    pub samples: Vec<Vec<Vec<i32>>>,
}

/// Parses and fully decodes the XCH extension. `reader` must be positioned immediately after the
/// XCH sync word and its frame-size field has already been validated for plausibility by the
/// caller. `core_mask` is the core's speaker mask
/// *before* XCH is applied; `n_sub_total` is the access unit's subband-domain sample count
/// (`header.duration() / 32`); `history` is this channel's own persistent per-subband ADPCM
/// history, carried across frames the same way the core's is.
pub fn parse_xch(
    reader: &mut BitReaderLtr<'_>,
    core_mask: ChannelMask,
    n_subframes: u8,
    bit_rate_code: u8,
    sync_ssf: bool,
    n_sub_total: usize,
    history: &mut Vec<[i32; 4]>,
) -> Result<XchAsset> {
    if core_mask.contains(ChannelMask::CS) {
        return decode_error("xch: core already carries a center-surround channel");
    }

    let crc_present = reader.read_bool()?;
    let coding = parse_coding_header(reader, 1, crc_present)?;
    if coding.channels.len() != 1 {
        return unsupported_error("xch: more than one appended channel");
    }

    let activity = coding.channels[0].subband_activity as usize;
    if history.len() != activity {
        *history = vec![[0i32; 4]; activity];
    }
    let mut histories = [std::mem::take(history)];

    let (subframes, samples) =
        decode_channel_set_samples(reader, bit_rate_code, &coding, n_subframes, sync_ssf, n_sub_total, &mut histories)?;

    let [restored] = histories;
    *history = restored;

    Ok(XchAsset { coding, subframes, samples })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_rejects_when_cs_already_present() {
        let buf = [0u8; 4];
        let mut reader = BitReaderLtr::new(&buf);
        let mask = ChannelMask::L | ChannelMask::R | ChannelMask::CS;
        let mut history = Vec::new();
        assert!(parse_xch(&mut reader, mask, 1, 0, true, 0, &mut history).is_err());
    }
}
