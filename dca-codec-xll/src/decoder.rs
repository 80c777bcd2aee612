// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The XLL (lossless) decoder: ties the header, NAVI, segment, and prediction stages together.

use log::debug;

use dca_core::checksum;
use dca_core::errors::{crc_mismatch_error, unsupported_error, Result};
use dca_core::io::BitReaderLtr;

use crate::header::{parse_channel_set_header, parse_common_header, skip_sync, ChannelSetHeader, XllCommonHeader};
use crate::navi::parse_navi;
use crate::predict::{apply_pair_correlation, refl_to_direct, undo_adaptive_prediction, undo_fixed_prediction};
use crate::segment::{decode_channel_segment, ChannelCodingParams};

/// Per-channel persistent prediction history, carried across frames.
struct ChannelHistory {
    adaptive: Vec<i32>,
    fixed: i32,
}

impl ChannelHistory {
    fn new() -> ChannelHistory {
        ChannelHistory { adaptive: Vec::new(), fixed: 0 }
    }
}

/// One channel set's persistent decode state.
struct ChannelSetState {
    header: ChannelSetHeader,
    history: Vec<ChannelHistory>,
}

pub struct XllDecoder {
    channel_sets: Vec<ChannelSetState>,
}

/// One channel set's decoded samples for the frame, one `Vec<i32>` per channel.
pub struct DecodedChannelSet {
    pub header: ChannelSetHeader,
    pub samples: Vec<Vec<i32>>,
}

impl XllDecoder {
    pub fn new() -> XllDecoder {
        XllDecoder { channel_sets: Vec::new() }
    }

    /// Decodes one XLL asset (sync word included) into one [`DecodedChannelSet`] per channel set,
    /// in header order. `check_crc` mirrors the controller's `err_recognition` CRC-check bit.
    pub fn decode(&mut self, buf: &[u8], check_crc: bool) -> Result<Vec<DecodedChannelSet>> {
        let mut reader = BitReaderLtr::new(buf);
        skip_sync(&mut reader)?;
        let common = parse_common_header(&mut reader)?;
        debug!("xll: {} channel set(s), {} segments/frame", common.n_channel_sets, common.n_segments());

        let mut headers = Vec::with_capacity(common.n_channel_sets as usize);
        for _ in 0..common.n_channel_sets {
            headers.push(parse_channel_set_header(&mut reader, &common)?);
        }

        if self.channel_sets.len() != headers.len() {
            self.channel_sets = headers
                .iter()
                .map(|h| ChannelSetState {
                    header: h.clone(),
                    history: (0..h.n_channels).map(|_| ChannelHistory::new()).collect(),
                })
                .collect();
        }
        else {
            for (state, h) in self.channel_sets.iter_mut().zip(headers.iter()) {
                state.header = h.clone();
            }
        }

        reader.align_to(8)?;

        let n_segments = common.n_segments();
        let samples_per_segment = common.samples_per_segment();
        let (navi, navi_start, navi_end) =
            parse_navi(&mut reader, 1, n_segments, headers.len(), common.seg_size_nbits)?;

        if check_crc && !checksum::check(buf, navi_start, navi_end) {
            return crc_mismatch_error("xll: NAVI table CRC mismatch");
        }

        let mut results: Vec<DecodedChannelSet> =
            headers.iter().map(|h| DecodedChannelSet { header: h.clone(), samples: vec![Vec::new(); h.n_channels] }).collect();

        for seg in 0..n_segments {
            for (cs_idx, header) in headers.iter().enumerate() {
                let seg_bytes = navi.sizes[0][seg][cs_idx] as usize;
                let byte_pos = reader.position_bits() / 8;
                let seg_end = (byte_pos + seg_bytes).min(buf.len());
                let mut seg_reader = BitReaderLtr::new(&buf[byte_pos..seg_end]);

                let _use_previous = seg > 0 && seg_reader.read_bool()?;
                let seg_type = seg_reader.read_bits(1)?;

                let mut params = Vec::with_capacity(header.n_channels);
                for _ in 0..header.n_channels {
                    let rice_coded = seg_reader.read_bool()?;
                    let part_a_bits0 = seg_reader.read_bits(5)?;
                    let part_a_bits = seg_reader.read_bits(5)?;
                    let part_b_bits = seg_reader.read_bits(5)?;
                    let aux_bits = if rice_coded { seg_reader.read_bits(5)? } else { 0 };
                    params.push(ChannelCodingParams { rice_coded, part_a_bits0, part_a_bits, part_b_bits, aux_bits });
                    if seg_type == 1 {
                        break;
                    }
                }
                if seg_type == 1 && params.len() == 1 {
                    let p = params[0];
                    params = vec![p; header.n_channels];
                }

                let max_adaptive_order = header.adaptive_order.iter().copied().max().unwrap_or(0) as usize;

                for ch in 0..header.n_channels {
                    let order = header.adaptive_order[ch] as usize;
                    let part_a_len = if seg_type == 0 { order } else { max_adaptive_order };
                    let chan_params = params.get(ch).copied().unwrap_or(params[0]);
                    let mut decoded = decode_channel_segment(
                        &mut seg_reader,
                        samples_per_segment,
                        part_a_len,
                        &chan_params,
                        false,
                    )?;

                    let state = &mut self.channel_sets[cs_idx];
                    if order > 0 {
                        let coeffs = refl_to_direct(&header.reflection_coeffs[ch]);
                        undo_adaptive_prediction(&mut decoded, &coeffs, &mut state.history[ch].adaptive);
                    }
                    else if header.fixed_order[ch] > 0 {
                        undo_fixed_prediction(&mut decoded, header.fixed_order[ch], &mut state.history[ch].fixed);
                    }

                    results[cs_idx].samples[ch].extend(decoded);
                }

                if header.pairwise_decorrelation {
                    for (pair_idx, &coeff) in header.pair_coeffs.iter().enumerate() {
                        let left_idx = pair_idx * 2;
                        let right_idx = left_idx + 1;
                        if right_idx < header.n_channels {
                            let segment_start = results[cs_idx].samples[left_idx].len() - samples_per_segment;
                            let left = results[cs_idx].samples[left_idx][segment_start..].to_vec();
                            let right = &mut results[cs_idx].samples[right_idx][segment_start..];
                            apply_pair_correlation(right, &left, coeff);
                        }
                    }
                }

                if !header.scalable_lsbs.is_empty() && header.scalable_lsbs.iter().any(|&w| w > 0) {
                    for ch in 0..header.n_channels {
                        let width = header.scalable_lsbs[ch];
                        if width == 0 {
                            continue;
                        }
                        let adj = header.bit_width_adj[ch];
                        let segment_start = results[cs_idx].samples[ch].len() - samples_per_segment;
                        let shift = if adj > 0 { adj - 1 } else { 0 };
                        for slot in results[cs_idx].samples[ch][segment_start..].iter_mut() {
                            let lsb = seg_reader.read_bits(width)? as i32;
                            *slot = (*slot << shift).wrapping_add(lsb << adj);
                        }
                    }
                }
            }
        }

        for header in &headers {
            if header.is_hierarchical && header.embedded_downmix_coeffs.is_some() {
                return unsupported_error("xll: hierarchical embedded downmix undo");
            }
        }

        Ok(results)
    }
}

impl Default for XllDecoder {
    fn default() -> XllDecoder {
        XllDecoder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_fresh_decoder_has_no_channel_sets() {
        let decoder = XllDecoder::new();
        assert_eq!(decoder.channel_sets.len(), 0);
    }
}
