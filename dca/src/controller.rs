// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The top-level controller: recognizes one of the four leading sync patterns, decodes the
//! core frame, probes for the EXSS extension block, and layers XLL or X96 on top per the
//! configured [`DecoderOptions`].

use log::{debug, warn};

use dca_core::audio::{ChannelMask, PlanarAudioBuffer, Profile, SampleFormat};
use dca_core::consts::{SYNC_CORE_14B_BE, SYNC_CORE_14B_LE, SYNC_CORE_BE, SYNC_CORE_LE, SYNC_EXSS};
use dca_core::errors::{decode_error, Result};

use dca_codec_core::decoder::CoreDecoder;
use dca_codec_lbr::decoder::LbrDecoder;
use dca_codec_xll::decoder::{DecodedChannelSet, XllDecoder};

use crate::exss::{parse_exss, AssetExtensionMask};
use crate::options::DecoderOptions;
use crate::profile::{from_packet_flags, PacketFlags};

/// What the caller receives after one access unit is decoded.
pub struct DecodedAccessUnit {
    pub n_frames: usize,
    pub sample_format: SampleFormat,
    pub sample_rate: u32,
    pub channel_mask: ChannelMask,
    pub profile: Profile,
}

/// The persistent, cross-access-unit decoder state: one independent instance per stream.
pub struct DcaDecoder {
    options: DecoderOptions,
    core: CoreDecoder,
    lbr: LbrDecoder,
    xll: XllDecoder,
}

/// Re-packs a 14-bit-word bitstream (each 16-bit slot carrying 14 significant bits, 2 padding
/// bits MSB-justified) into canonical 16-bit words.
pub fn repack_14_to_16(input: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(input.len() * 8);
    for &byte in input {
        for i in (0..8).rev() {
            bits.push((byte >> i) & 1 != 0);
        }
    }

    let mut repacked_bits = Vec::with_capacity(bits.len());
    let mut pos = 0;
    while pos + 14 <= bits.len() {
        repacked_bits.extend_from_slice(&bits[pos..pos + 14]);
        pos += 14;
    }

    let mut out = vec![0u8; (repacked_bits.len() + 7) / 8];
    for (i, &b) in repacked_bits.iter().enumerate() {
        if b {
            out[i / 8] |= 1 << (7 - i % 8);
        }
    }
    out
}

/// Byte-swaps every 16-bit word in place, converting the raw-LE sync convention to raw-BE.
fn byte_swap_16(buf: &[u8]) -> Vec<u8> {
    let mut out = buf.to_vec();
    let mut i = 0;
    while i + 1 < out.len() {
        out.swap(i, i + 1);
        i += 2;
    }
    out
}

enum Framing {
    RawBe,
    RawLe,
    Core14Be,
    Core14Le,
}

fn detect_framing(buf: &[u8]) -> Result<Framing> {
    if buf.len() < 4 {
        return decode_error("controller: access unit shorter than one sync word");
    }
    let word = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
    match word {
        SYNC_CORE_BE => Ok(Framing::RawBe),
        SYNC_CORE_LE => Ok(Framing::RawLe),
        SYNC_CORE_14B_BE => Ok(Framing::Core14Be),
        SYNC_CORE_14B_LE => Ok(Framing::Core14Le),
        _ => decode_error("controller: no recognized sync pattern at offset 0"),
    }
}

/// Writes each XLL channel set's decoded samples onto `out`'s planes, mapping channel index to
/// output plane by speaker: a channel set with its own explicit speaker mask is matched speaker
/// by speaker against `channel_mask`'s plane order; a channel set with no mask of its own (the
/// common case for the primary set) is assumed to be in the same order as `channel_mask` itself.
/// Each channel's `residual_encode_mask` bit decides whether its samples are added onto the
/// core's already-rendered (lossy) PCM or replace it outright.
fn apply_xll_channel_sets(channel_sets: &[DecodedChannelSet], channel_mask: ChannelMask, out: &mut PlanarAudioBuffer) {
    let speakers: Vec<ChannelMask> = channel_mask.speakers().collect();

    for set in channel_sets {
        let scale = 1.0f32 / (1u32 << set.header.pcm_bit_resolution.saturating_sub(1)) as f32;
        let own_speakers: Vec<ChannelMask> = set.header.channel_mask.speakers().collect();

        for ch in 0..set.header.n_channels {
            let speaker = if own_speakers.is_empty() { speakers.get(ch).copied() } else { own_speakers.get(ch).copied() };
            let plane_idx = match speaker.and_then(|spk| speakers.iter().position(|&s| s == spk)) {
                Some(idx) => idx,
                None => continue,
            };
            let samples = match set.samples.get(ch) {
                Some(samples) => samples,
                None => continue,
            };

            let is_residual = (set.header.residual_encode_mask >> ch) & 1 != 0;
            let plane = out.plane_mut(plane_idx);
            let n = plane.len().min(samples.len());
            if is_residual {
                for (dst, &src) in plane[..n].iter_mut().zip(samples[..n].iter()) {
                    *dst += src as f32 * scale;
                }
            }
            else {
                for (dst, &src) in plane[..n].iter_mut().zip(samples[..n].iter()) {
                    *dst = src as f32 * scale;
                }
            }
        }
    }
}

impl DcaDecoder {
    pub fn new(options: DecoderOptions) -> DcaDecoder {
        let mut core = CoreDecoder::new();
        core.set_disable_xch(options.disable_xch || options.core_only);
        core.set_disable_xxch(options.disable_xxch || options.core_only);
        core.set_disable_x96(options.disable_x96 || options.core_only);
        core.set_disable_xbr(options.disable_xbr || options.core_only);

        DcaDecoder { options, core, lbr: LbrDecoder::new(), xll: XllDecoder::new() }
    }

    /// Decodes one access unit, writing planar PCM into `out`.
    pub fn decode(&mut self, buf: &[u8], out: &mut PlanarAudioBuffer) -> Result<DecodedAccessUnit> {
        let framing = detect_framing(buf)?;
        let canonical: Vec<u8>;
        let canonical_ref: &[u8] = match framing {
            Framing::RawBe => buf,
            Framing::RawLe => {
                canonical = byte_swap_16(buf);
                &canonical
            }
            Framing::Core14Be => {
                canonical = repack_14_to_16(buf);
                &canonical
            }
            Framing::Core14Le => {
                canonical = repack_14_to_16(&byte_swap_16(buf));
                &canonical
            }
        };

        let mut flags = PacketFlags::CORE;
        let core_frame = self.core.decode(canonical_ref, out)?;
        let header = core_frame.header;

        let mut channel_mask = core_frame.channel_mask;
        let mut sample_rate = header.sample_rate;
        let mut upsampled_96k = false;

        let tail_start = header.frame_size;
        if tail_start + 4 <= canonical_ref.len() {
            let exss_word = u32::from_be_bytes([
                canonical_ref[tail_start],
                canonical_ref[tail_start + 1],
                canonical_ref[tail_start + 2],
                canonical_ref[tail_start + 3],
            ]);

            if exss_word == SYNC_EXSS && !self.options.core_only {
                match parse_exss(&canonical_ref[tail_start..]) {
                    Ok(exss) => {
                        debug!("controller: exss header with {} asset(s)", exss.assets.len());
                        for asset in &exss.assets {
                            if asset.has(AssetExtensionMask::XBR) {
                                flags |= PacketFlags::XBR;
                            }
                            if asset.has(AssetExtensionMask::XXCH) {
                                flags |= PacketFlags::XXCH;
                            }
                            if asset.has(AssetExtensionMask::X96) {
                                flags |= PacketFlags::X96;
                                upsampled_96k = true;
                            }

                            if asset.has(AssetExtensionMask::LBR) && !self.options.core_only {
                                let start = tail_start + asset.lbr.offset as usize;
                                let end = (start + asset.lbr.size as usize).min(canonical_ref.len());
                                if start < end {
                                    match self.lbr.decode(&canonical_ref[start..end], out) {
                                        Ok(frame) => {
                                            flags |= PacketFlags::LBR;
                                            channel_mask = frame.channel_mask;
                                            sample_rate = frame.sample_rate;
                                        }
                                        Err(err) => warn!("controller: lbr asset failed to decode: {}", err),
                                    }
                                }
                            }

                            if asset.has(AssetExtensionMask::XLL) && !self.options.disable_xll && !self.options.core_only {
                                let start = tail_start + asset.xll.offset as usize;
                                let end = (start + asset.xll.size as usize).min(canonical_ref.len());
                                if start < end {
                                    let check_crc = self.options.err_recognition.bits() != 0;
                                    match self.xll.decode(&canonical_ref[start..end], check_crc) {
                                        Ok(channel_sets) => {
                                            apply_xll_channel_sets(&channel_sets, channel_mask, out);
                                            flags |= PacketFlags::XLL;
                                        }
                                        Err(err) => {
                                            warn!("controller: xll asset failed, falling back to core: {}", err);
                                        }
                                    }
                                }
                            }
                        }
                    }
                    Err(err) => warn!("controller: exss header failed to parse: {}", err),
                }
            }
        }

        let sample_format = if self.options.bit_exact { SampleFormat::S32P } else { SampleFormat::FltP };
        let profile = from_packet_flags(flags, upsampled_96k);

        Ok(DecodedAccessUnit { n_frames: out.n_frames(), sample_format, sample_rate, channel_mask, profile })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_repack_14_to_16_shrinks_by_expected_ratio() {
        let input = vec![0xFFu8; 28]; // 224 bits -> 16 fourteen-bit words -> 224 repacked bits -> 28 bytes
        let out = repack_14_to_16(&input);
        assert_eq!(out.len(), 28);
    }

    #[test]
    fn verify_detect_framing_rejects_short_buffers() {
        assert!(detect_framing(&[0u8; 2]).is_err());
    }

    #[test]
    fn verify_detect_framing_recognizes_raw_be() {
        let buf = [0x7F, 0xFE, 0x80, 0x01, 0, 0, 0, 0];
        assert!(matches!(detect_framing(&buf), Ok(Framing::RawBe)));
    }
}
