// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data types decoded from the core frame header and coding header.

use dca_core::audio::{AudioMode, ChannelMask, LfeMode};

/// Decoded fields of the 32-bit-sync-word-onward core frame header.
#[derive(Clone, Debug)]
pub struct CoreFrameHeader {
    /// Frame size in bytes. Invariant: `>= 96` and `<= 16384`.
    pub frame_size: usize,
    /// Number of PCM sample blocks per subband, per subframe (always a multiple of 8).
    pub npcmblocks: u32,
    pub audio_mode: AudioMode,
    /// Index into the 16-entry sample-rate table.
    pub sample_rate_code: u8,
    pub sample_rate: u32,
    pub bit_rate_code: u8,
    pub lfe: LfeMode,
    pub crc_present: bool,
    /// When false, ADPCM and synthesis-filter history are zeroed rather than carried forward.
    pub predictor_history: bool,
    /// Whether the DSYNC marker is expected after every subsubframe (`true`) or only once per
    /// subframe (`false`).
    pub sync_ssf: bool,
    pub source_pcm_resolution_code: u8,
    pub front_sum_diff: bool,
    pub surround_sum_diff: bool,
    pub dialog_normalization: u8,
    pub timestamp_present: bool,
    pub aux_present: bool,
    pub ext_audio_present: bool,
    /// 3-bit extension-audio-type descriptor, meaningful only when `ext_audio_present`.
    pub ext_audio_type: u8,
}

impl CoreFrameHeader {
    pub fn n_channels(&self) -> usize {
        self.audio_mode.channel_count()
    }

    pub fn channel_mask(&self) -> ChannelMask {
        let mut mask = self.audio_mode.channel_mask();
        if self.lfe != LfeMode::None {
            mask |= ChannelMask::LFE1;
        }
        mask
    }

    /// Duration of this frame in samples per channel.
    pub fn duration(&self) -> u64 {
        u64::from(self.npcmblocks) * 32
    }
}

/// Per-channel coding parameters read from the coding header.
#[derive(Clone, Debug, Default)]
pub struct ChannelCodingParams {
    /// Number of active subbands, `2..=32`.
    pub subband_activity: u8,
    /// First subband coded by the high-frequency VQ, `1..=32`.
    pub vq_start_subband: u8,
    /// `0` when this channel does not participate in joint-subband coding; otherwise the
    /// 1-based index of the source channel whose high subbands it borrows.
    pub joint_intensity_index: u8,
    pub transition_mode_sel: u8,
    pub scale_factor_sel: u8,
    pub bit_allocation_sel: u8,
    /// Per-codebook quantization-index-codebook selector.
    pub quant_index_sel: [u8; 10],
    /// Scale-factor adjustment, only populated when `quant_index_sel[book] < threshold(book)`.
    pub scale_factor_adj: [f32; 10],
}

/// Decoded coding header: one [`ChannelCodingParams`] per primary channel.
#[derive(Clone, Debug, Default)]
pub struct CodingHeader {
    pub n_subframes: u8,
    pub n_primary_channels: u8,
    pub channels: Vec<ChannelCodingParams>,
}

impl CodingHeader {
    pub fn max_subband_activity(&self) -> u8 {
        self.channels.iter().map(|c| c.subband_activity).max().unwrap_or(0)
    }
}
