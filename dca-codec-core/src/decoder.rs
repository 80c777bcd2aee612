// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The core substream decoder: orchestrates frame-header and coding-header parsing, the
//! per-subframe side-information and subband-sample decode loop, inverse ADPCM prediction,
//! joint-subband recombination, LFE interpolation, the polyphase synthesis filter, and extension
//! probing (XCH/XXCH/X96/XBR) over the tail of the frame. XCH/XXCH append their own decoded and
//! synthesized channels; XBR refines the core's subband-domain samples before synthesis; X96 is
//! parsed for validation but contributes no additional channel (it refines existing channels'
//! subband count rather than appending new ones).

use log::debug;

use dca_core::audio::{ChannelMask, LfeMode, PlanarAudioBuffer};
use dca_core::consts::{SYNC_X96, SYNC_XBR, SYNC_XCH, SYNC_XXCH};
use dca_core::errors::{decode_error, Result};
use dca_core::io::BitReaderLtr;

use crate::coding_header::parse_coding_header;
use crate::common::{CodingHeader, CoreFrameHeader};
use crate::ext::x96::parse_x96;
use crate::ext::xbr::parse_xbr_frame;
use crate::ext::xch::parse_xch;
use crate::ext::xxch::parse_xxch;
use crate::header::parse_frame_header;
use crate::quantize::{check_dsync, decode_subsubframe_block, read_lfe_samples};
use crate::subframe::{parse_subframe_header, SubframeInfo};
use crate::synth::SynthesisHistory;

const SUBBAND_SAMPLES_PER_SUBSUBFRAME: usize = 8;
const SYNTH_BANDS: usize = 32;
/// Q23 fixed point to `f32` in `[-1.0, 1.0)`, matching the domain every dequantized subband
/// sample is already saturated to.
const Q23_TO_F32: f32 = 1.0 / (1i64 << 23) as f32;

/// Per-channel persistent state carried across frames: ADPCM history for the inverse predictor
/// and the synthesis filter's circular buffer. `adpcm_history` holds one 4-sample history per
/// subband, matching what [`crate::quantize::decode_subsubframe_block`] expects.
struct ChannelState {
    adpcm_history: Vec<[i32; 4]>,
    synth: SynthesisHistory,
}

impl ChannelState {
    fn new() -> ChannelState {
        ChannelState { adpcm_history: Vec::new(), synth: SynthesisHistory::new(SYNTH_BANDS) }
    }

    fn reset(&mut self) {
        for h in &mut self.adpcm_history {
            *h = [0; 4];
        }
        self.synth.reset();
    }
}

/// Decodes one core-substream access unit into planar PCM. One instance is reused across frames
/// so that ADPCM and synthesis-filter history carry forward across frames.
pub struct CoreDecoder {
    channels: Vec<ChannelState>,
    disable_xch: bool,
    disable_xxch: bool,
    disable_x96: bool,
    disable_xbr: bool,
    xch_history: Vec<[i32; 4]>,
    xch_synth: SynthesisHistory,
    xxch_histories: Vec<Vec<[i32; 4]>>,
    xxch_synth: Vec<SynthesisHistory>,
}

/// The result of decoding one core-substream frame: the header (for the caller to derive output
/// framing and profile) and the resolved channel mask, including LFE and any spliced-in
/// XCH/XXCH channels.
pub struct DecodedFrame {
    pub header: CoreFrameHeader,
    pub channel_mask: ChannelMask,
}

impl Default for CoreDecoder {
    fn default() -> CoreDecoder {
        CoreDecoder::new()
    }
}

/// The channels (and resolved speaker-mask bits) that an XCH or XXCH asset appends on top of the
/// core's own primary channels.
#[derive(Default)]
struct ExtraChannelSet {
    mask: ChannelMask,
    pcm: Vec<Vec<f32>>,
}

impl CoreDecoder {
    pub fn new() -> CoreDecoder {
        CoreDecoder {
            channels: Vec::new(),
            disable_xch: false,
            disable_xxch: false,
            disable_x96: false,
            disable_xbr: false,
            xch_history: Vec::new(),
            xch_synth: SynthesisHistory::new(SYNTH_BANDS),
            xxch_histories: Vec::new(),
            xxch_synth: Vec::new(),
        }
    }

    /// Disables the XCH extension even when present, mirroring `dca::DecoderOptions::disable_xch`.
    pub fn set_disable_xch(&mut self, disable: bool) {
        self.disable_xch = disable;
    }

    pub fn set_disable_xxch(&mut self, disable: bool) {
        self.disable_xxch = disable;
    }

    pub fn set_disable_x96(&mut self, disable: bool) {
        self.disable_x96 = disable;
    }

    pub fn set_disable_xbr(&mut self, disable: bool) {
        self.disable_xbr = disable;
    }

    fn ensure_channels(&mut self, n: usize) {
        if self.channels.len() != n {
            self.channels = (0..n).map(|_| ChannelState::new()).collect();
        }
    }

    /// Decodes one access unit starting at `buf`'s core sync word, writing rendered PCM into
    /// `out` (one plane per primary channel, any appended XCH/XXCH channels next, LFE last when
    /// present). `buf` must hold at least `header.frame_size` bytes.
    pub fn decode(&mut self, buf: &[u8], out: &mut PlanarAudioBuffer) -> Result<DecodedFrame> {
        let mut reader = BitReaderLtr::new(buf);
        reader.skip(32)?; // caller has already matched the core sync word

        let header = parse_frame_header(&mut reader)?;
        let n_channels = header.n_channels();
        let coding = parse_coding_header(&mut reader, n_channels, header.crc_present)?;

        if !header.predictor_history {
            for ch in &mut self.channels {
                ch.reset();
            }
            self.xch_history.clear();
            self.xch_synth.reset();
            self.xxch_histories.clear();
            for s in &mut self.xxch_synth {
                s.reset();
            }
        }
        self.ensure_channels(n_channels);
        for (ch_idx, ch_coding) in coding.channels.iter().enumerate() {
            let activity = ch_coding.subband_activity as usize;
            if self.channels[ch_idx].adpcm_history.len() != activity {
                self.channels[ch_idx].adpcm_history = vec![[0i32; 4]; activity];
            }
        }

        let n_frames = header.duration() as usize;
        let n_sub_total = n_frames / SYNTH_BANDS;
        let max_activity = coding.max_subband_activity() as usize;
        let mut subband: Vec<Vec<Vec<i32>>> = vec![vec![vec![0i32; n_sub_total]; max_activity]; n_channels];
        let mut lfe_pcm: Vec<f32> = Vec::new();
        let mut histories: Vec<Vec<[i32; 4]>> = self.channels.iter().map(|c| c.adpcm_history.clone()).collect();
        let mut subframes: Vec<SubframeInfo> = Vec::with_capacity(coding.n_subframes as usize);
        let mut slot = 0usize;

        for sf_idx in 0..coding.n_subframes {
            let info = parse_subframe_header(&mut reader, &coding)?;
            let n_samples_this_subframe = if sf_idx + 1 == coding.n_subframes && info.partial_samples != 0 {
                (info.n_subsubframes as usize - 1) * SUBBAND_SAMPLES_PER_SUBSUBFRAME + info.partial_samples as usize
            }
            else {
                info.n_subsubframes as usize * SUBBAND_SAMPLES_PER_SUBSUBFRAME
            };

            let n_subsubframes = info.n_subsubframes as usize;
            for ssf in 0..n_subsubframes {
                let samples_in_block = if ssf == n_subsubframes - 1 {
                    (n_samples_this_subframe - ssf * SUBBAND_SAMPLES_PER_SUBSUBFRAME)
                        .min(SUBBAND_SAMPLES_PER_SUBSUBFRAME)
                }
                else {
                    SUBBAND_SAMPLES_PER_SUBSUBFRAME
                };
                if samples_in_block == 0 {
                    break;
                }

                let per_channel = decode_subsubframe_block(
                    &mut reader,
                    header.bit_rate_code,
                    &coding,
                    &info,
                    ssf,
                    samples_in_block,
                    &mut histories,
                )?;
                for (ch_idx, per_subband) in per_channel.into_iter().enumerate() {
                    for (sb, samples8) in per_subband.into_iter().enumerate() {
                        if sb >= subband[ch_idx].len() {
                            continue;
                        }
                        let avail = subband[ch_idx][sb].len().saturating_sub(slot);
                        let n = avail.min(samples_in_block);
                        subband[ch_idx][sb][slot..slot + n].copy_from_slice(&samples8[..n]);
                    }
                }
                slot += samples_in_block;

                if header.sync_ssf {
                    check_dsync(&mut reader)?;
                }
            }

            if !header.sync_ssf {
                check_dsync(&mut reader)?;
            }

            if header.lfe != LfeMode::None {
                let n_lfe = info.n_subsubframes as usize * 2;
                let (samples, _scale_index) = read_lfe_samples(&mut reader, n_lfe, 1 << 20)?;
                for s in samples {
                    lfe_pcm.push(s as f32 * Q23_TO_F32);
                }
            }

            subframes.push(info);
        }

        for (ch_idx, hist) in histories.into_iter().enumerate() {
            self.channels[ch_idx].adpcm_history = hist;
        }

        if header.aux_present {
            let _ = crate::aux::parse_aux_block(&mut reader, n_channels);
        }

        let mut channel_mask = header.channel_mask();
        let extra = self.probe_extensions(buf, &header, &coding, &subframes, n_sub_total, &mut subband)?;
        channel_mask |= extra.mask;

        let synths: Vec<&mut SynthesisHistory> = self.channels.iter_mut().map(|c| &mut c.synth).collect();
        let pcm = synthesize_channel_set(&subband, n_sub_total, synths);

        let has_lfe = header.lfe != LfeMode::None;
        let total_channels = n_channels + extra.pcm.len() + usize::from(has_lfe);
        out.prepare(total_channels, n_frames);

        let mut ch = 0usize;
        for plane in pcm {
            out.plane_mut(ch).copy_from_slice(&plane);
            ch += 1;
        }
        for plane in extra.pcm {
            let n = out.plane_mut(ch).len().min(plane.len());
            out.plane_mut(ch)[..n].copy_from_slice(&plane[..n]);
            ch += 1;
        }
        if has_lfe {
            let plane = out.plane_mut(ch);
            let n = plane.len().min(lfe_pcm.len());
            plane[..n].copy_from_slice(&lfe_pcm[..n]);
        }

        Ok(DecodedFrame { header, channel_mask })
    }

    /// Scans the remaining bytes of the access unit for extension sync words and decodes the
    /// first one found (each extension's payload does not carry its own size, so the scan cannot
    /// skip past one to find the next). XCH/XXCH are fully decoded and synthesized into their own
    /// channel planes here; XBR refines `subband` in place before the caller's synthesis pass;
    /// X96 is parsed for validation only, since splicing its extra high-frequency subbands would
    /// require rebuilding the core's own sample pipeline at a higher subband count.
    fn probe_extensions(
        &mut self,
        buf: &[u8],
        header: &CoreFrameHeader,
        coding: &CodingHeader,
        subframes: &[SubframeInfo],
        n_sub_total: usize,
        subband: &mut [Vec<Vec<i32>>],
    ) -> Result<ExtraChannelSet> {
        if buf.len() < header.frame_size {
            return decode_error("core frame: buffer shorter than declared frame_size");
        }
        let tail = &buf[header.frame_size..];
        if tail.len() < 4 {
            return Ok(ExtraChannelSet::default());
        }

        let mut extra = ExtraChannelSet::default();
        let mut offset = 0usize;
        while offset + 4 <= tail.len() {
            let word =
                u32::from_be_bytes([tail[offset], tail[offset + 1], tail[offset + 2], tail[offset + 3]]);
            match word {
                SYNC_XCH if !self.disable_xch => {
                    debug!("core frame: xch extension found at tail offset {}", offset);
                    let mut reader = BitReaderLtr::new(&tail[offset + 4..]);
                    match parse_xch(
                        &mut reader,
                        header.channel_mask(),
                        coding.n_subframes,
                        header.bit_rate_code,
                        header.sync_ssf,
                        n_sub_total,
                        &mut self.xch_history,
                    ) {
                        Ok(asset) => {
                            let pcm =
                                synthesize_channel_set(&asset.samples, n_sub_total, vec![&mut self.xch_synth]);
                            extra.mask |= ChannelMask::CS;
                            extra.pcm.extend(pcm);
                        }
                        Err(err) => debug!("core frame: xch asset failed to decode: {}", err),
                    }
                    break;
                }
                SYNC_XXCH if !self.disable_xxch => {
                    debug!("core frame: xxch extension found at tail offset {}", offset);
                    let mut reader = BitReaderLtr::new(&tail[offset + 4..]);
                    match parse_xxch(
                        &mut reader,
                        header.channel_mask(),
                        coding.n_subframes,
                        header.bit_rate_code,
                        header.sync_ssf,
                        n_sub_total,
                        &mut self.xxch_histories,
                    ) {
                        Ok(asset) => {
                            let n_new = asset.samples.len();
                            if self.xxch_synth.len() != n_new {
                                self.xxch_synth =
                                    (0..n_new).map(|_| SynthesisHistory::new(SYNTH_BANDS)).collect();
                            }
                            let synths: Vec<&mut SynthesisHistory> = self.xxch_synth.iter_mut().collect();
                            let pcm = synthesize_channel_set(&asset.samples, n_sub_total, synths);
                            extra.mask |= asset.new_mask;
                            extra.pcm.extend(pcm);
                        }
                        Err(err) => debug!("core frame: xxch asset failed to decode: {}", err),
                    }
                    break;
                }
                SYNC_X96 if !self.disable_x96 => {
                    debug!("core frame: x96 extension found at tail offset {}", offset);
                    let mut reader = BitReaderLtr::new(&tail[offset + 4..]);
                    match parse_x96(&mut reader, coding.channels.len()) {
                        Ok(asset) => {
                            debug!("core frame: x96 side info parsed for {} channel(s)", asset.channels.len())
                        }
                        Err(err) => debug!("core frame: x96 asset failed to decode: {}", err),
                    }
                    break;
                }
                SYNC_XBR if !self.disable_xbr => {
                    debug!("core frame: xbr extension found at tail offset {}", offset);
                    let mut reader = BitReaderLtr::new(&tail[offset + 4..]);
                    match parse_xbr_frame(&mut reader, coding, subframes, header.sync_ssf, n_sub_total, subband) {
                        Ok(info) => debug!("core frame: xbr refined {} channel(s)", info.nsubbands.len()),
                        Err(err) => debug!("core frame: xbr asset failed to decode: {}", err),
                    }
                    break;
                }
                _ => offset += 1,
            }
        }

        Ok(extra)
    }
}

/// Runs the polyphase synthesis filter over every channel's full-frame subband-domain buffer,
/// producing `n_sub_total * 32` PCM samples per channel. Shared by the core's own primary
/// channels and by XCH/XXCH, whose decoded channel sets have the same
/// `[channel][subband][sample_idx]` shape.
fn synthesize_channel_set(
    subband: &[Vec<Vec<i32>>],
    n_sub_total: usize,
    mut synths: Vec<&mut SynthesisHistory>,
) -> Vec<Vec<f32>> {
    let n_channels = subband.len();
    let mut pcm = vec![vec![0f32; n_sub_total * SYNTH_BANDS]; n_channels];
    for ch_idx in 0..n_channels {
        let activity = subband[ch_idx].len();
        for s in 0..n_sub_total {
            let mut subband_vec = vec![0f32; SYNTH_BANDS];
            for sb in 0..activity.min(SYNTH_BANDS) {
                subband_vec[sb] = subband[ch_idx][sb][s] as f32 * Q23_TO_F32;
            }
            let mut synth_out = vec![0f32; SYNTH_BANDS];
            synths[ch_idx].synth_float(&subband_vec, &mut synth_out, 1.0);
            let base = s * SYNTH_BANDS;
            pcm[ch_idx][base..base + SYNTH_BANDS].copy_from_slice(&synth_out);
        }
    }
    pcm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_fresh_decoder_has_no_channel_state() {
        let decoder = CoreDecoder::new();
        assert!(decoder.channels.is_empty());
    }

    #[test]
    fn verify_disable_flags_are_independent() {
        let mut decoder = CoreDecoder::new();
        decoder.set_disable_xch(true);
        decoder.set_disable_x96(true);
        assert!(decoder.disable_xch);
        assert!(decoder.disable_x96);
        assert!(!decoder.disable_xbr);
        assert!(!decoder.disable_xxch);
    }
}
