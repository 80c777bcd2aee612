// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The LBR (DTS Express) decoder: ties the header, chunk, tonal, and synthesis stages together
//! into a single per-asset decode pass.

use log::debug;

use dca_core::audio::{ChannelMask, PlanarAudioBuffer};
use dca_core::errors::{decode_error, Result};
use dca_core::io::BitReaderLtr;

use crate::chunks::{decode_grid_chunk, decode_lfe_chunk, split_chunks};
use crate::header::{parse_lbr_header, LbrHeaderKind, LbrInitHeader};
use crate::synth::{add_tonal_components, hybrid_filter, overlap_add, reconstruct_pairwise_stereo, LbrChannelState};
use crate::tonal::TonalRing;

const N_SUBBANDS: usize = 32;

// Chunk IDs: LFE (0x00), grid/TS (0x01..=0x0D), tonal groups (0x0E..=0x1B), group average
// (0x1C), and per-channel-pair stereo flags (0x1D).
const CHUNK_ID_LFE: u8 = 0x00;
const CHUNK_ID_GRID_FIRST: u8 = 0x01;
const CHUNK_ID_GRID_LAST: u8 = 0x0D;
const CHUNK_ID_TONAL_FIRST: u8 = 0x0E;
const CHUNK_ID_TONAL_LAST: u8 = 0x1B;
const CHUNK_ID_GROUP_AVG: u8 = 0x1C;
const CHUNK_ID_STEREO_FLAGS: u8 = 0x1D;

/// Persistent, cross-frame LBR decoder state: the most recent init header, the tonal ring buffer,
/// the pseudo-random dither state, and one synthesis state per channel.
pub struct LbrDecoder {
    init: Option<LbrInitHeader>,
    tonal: TonalRing,
    rand_state: u32,
    channels: Vec<LbrChannelState>,
    subframe_counter: usize,
}

/// One decoded LBR frame's channel mask and sample rate, alongside the samples written into the
/// caller's buffer.
pub struct LbrDecodedFrame {
    pub channel_mask: ChannelMask,
    pub sample_rate: u32,
}

impl LbrDecoder {
    pub fn new() -> LbrDecoder {
        LbrDecoder { init: None, tonal: TonalRing::new(), rand_state: 1, channels: Vec::new(), subframe_counter: 0 }
    }

    fn ensure_channels(&mut self, n: usize) {
        if self.channels.len() != n {
            self.channels = (0..n).map(|_| LbrChannelState::new()).collect();
        }
    }

    /// Decodes one LBR asset (the bytes of one EXSS LBR asset, sync word included) into `out`.
    pub fn decode(&mut self, buf: &[u8], out: &mut PlanarAudioBuffer) -> Result<LbrDecodedFrame> {
        let mut reader = BitReaderLtr::new(buf);
        let header = parse_lbr_header(&mut reader)?;

        let init = match header {
            LbrHeaderKind::Init(init) => {
                debug!("lbr: init header, band_limit={}", init.band_limit);
                self.init = Some(init.clone());
                for ch in &mut self.channels {
                    ch.reset();
                }
                init
            }
            LbrHeaderKind::Repeat => match &self.init {
                Some(init) => init.clone(),
                None => return decode_error("lbr: repeat header with no prior init header"),
            },
        };

        let n_channels = init.channel_mask.count() as usize + if init.lfe_present { 1 } else { 0 };
        self.ensure_channels(n_channels.max(1));

        reader.align_to(8)?;
        let body_start = reader.position_bits() / 8;
        let chunks = split_chunks(&buf[body_start..]);

        let mut subband_blocks: Vec<Vec<[i32; 4]>> = vec![Vec::new(); n_channels];
        let mut lfe_samples: Option<[i32; 64]> = None;
        let mut group_average = 0i32;
        let mut sec_ch_sbms = vec![false; N_SUBBANDS];
        let mut sec_ch_lrms = vec![false; N_SUBBANDS];

        for chunk in &chunks {
            match chunk.id {
                CHUNK_ID_LFE => {
                    lfe_samples = Some(decode_lfe_chunk(chunk.body, 16)?);
                }
                id if (CHUNK_ID_GRID_FIRST..=CHUNK_ID_GRID_LAST).contains(&id) => {
                    let ch = (id - CHUNK_ID_GRID_FIRST) as usize;
                    if ch < n_channels {
                        let allocated = vec![true; N_SUBBANDS];
                        let levels = vec![5u8; N_SUBBANDS];
                        subband_blocks[ch] =
                            decode_grid_chunk(chunk.body, N_SUBBANDS, &allocated, &levels, &mut self.rand_state)?;
                    }
                }
                id if (CHUNK_ID_TONAL_FIRST..=CHUNK_ID_TONAL_LAST).contains(&id) => {
                    let group = (id - CHUNK_ID_TONAL_FIRST) as usize % 5;
                    let mut chunk_reader = BitReaderLtr::new(chunk.body);
                    self.tonal.parse_group_chunk(&mut chunk_reader, group, self.subframe_counter % 32, n_channels)?;
                }
                CHUNK_ID_GROUP_AVG => {
                    let mut chunk_reader = BitReaderLtr::new(chunk.body);
                    group_average = self.tonal.read_group_average(&mut chunk_reader)?;
                }
                CHUNK_ID_STEREO_FLAGS => {
                    for (sb, byte) in chunk.body.iter().enumerate().take(N_SUBBANDS) {
                        sec_ch_sbms[sb] = byte & 0x01 != 0;
                        sec_ch_lrms[sb] = byte & 0x02 != 0;
                    }
                }
                _ => {}
            }
        }
        let _ = group_average;

        let empty_refl: Vec<Vec<i32>> = Vec::new();
        let mut channel_pcm: Vec<Vec<f32>> = Vec::with_capacity(n_channels);

        for ch in 0..n_channels {
            if subband_blocks[ch].is_empty() {
                channel_pcm.push(vec![0f32; 32]);
                continue;
            }
            self.channels[ch].apply_lpc(&mut subband_blocks[ch], &empty_refl);
            let mut samples = hybrid_filter(&subband_blocks[ch]);
            let components = self.tonal.active(0, self.subframe_counter % 32);
            add_tonal_components(&mut samples, &components, ch);
            let emitted = overlap_add(&mut self.channels[ch], &samples);
            channel_pcm.push(emitted);
        }

        if init.stereo_downmix && n_channels >= 2 && !channel_pcm[1].iter().any(|&v| v != 0.0) {
            channel_pcm[1] = reconstruct_pairwise_stereo(&channel_pcm[0], &sec_ch_sbms, &sec_ch_lrms, 1.0, 1.0);
        }

        let total_channels = n_channels + if lfe_samples.is_some() { 1 } else { 0 };
        let n_frames = channel_pcm.first().map(|p| p.len()).unwrap_or(0);
        out.prepare(total_channels, n_frames);

        for (ch, pcm) in channel_pcm.iter().enumerate() {
            out.plane_mut(ch)[..pcm.len()].copy_from_slice(pcm);
        }
        if let Some(lfe) = lfe_samples {
            let plane = out.plane_mut(n_channels);
            let scale = 1.0 / (1i64 << 23) as f32;
            for (i, slot) in plane.iter_mut().enumerate().take(lfe.len().min(n_frames)) {
                *slot = lfe[i] as f32 * scale;
            }
        }

        self.subframe_counter = self.subframe_counter.wrapping_add(1);

        let sample_rate = crate::tables::lbr_sample_rate(init.sample_rate_code);
        Ok(LbrDecodedFrame { channel_mask: init.channel_mask, sample_rate })
    }
}

impl Default for LbrDecoder {
    fn default() -> LbrDecoder {
        LbrDecoder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_fresh_decoder_has_no_init_state() {
        let decoder = LbrDecoder::new();
        assert!(decoder.init.is_none());
        assert_eq!(decoder.channels.len(), 0);
    }
}
