// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Speaker layout and sample-format types shared by the core substream, every extension, and the
//! top-level controller.

use bitflags::bitflags;

bitflags! {
    /// A 32-bit mask over the fixed DCA speaker enumeration. Bits 28..=31 are reserved and always
    /// clear.
    pub struct ChannelMask: u32 {
        const C     = 1 << 0;
        const L     = 1 << 1;
        const R     = 1 << 2;
        const LS    = 1 << 3;
        const RS    = 1 << 4;
        const LFE1  = 1 << 5;
        const CS    = 1 << 6;
        const LSR   = 1 << 7;
        const RSR   = 1 << 8;
        const LSS   = 1 << 9;
        const RSS   = 1 << 10;
        const LC    = 1 << 11;
        const RC    = 1 << 12;
        const LH    = 1 << 13;
        const CH    = 1 << 14;
        const RH    = 1 << 15;
        const LFE2  = 1 << 16;
        const LW    = 1 << 17;
        const RW    = 1 << 18;
        const OH    = 1 << 19;
        const LHS   = 1 << 20;
        const RHS   = 1 << 21;
        const CHR   = 1 << 22;
        const LHR   = 1 << 23;
        const RHR   = 1 << 24;
        const CL    = 1 << 25;
        const LL    = 1 << 26;
        const RL    = 1 << 27;
    }
}

impl ChannelMask {
    /// Returns the number of speakers set in the mask.
    pub fn count(&self) -> u32 {
        self.bits().count_ones()
    }

    /// Returns the speaker bits in ascending order, for deriving a stable plane-to-speaker remap.
    pub fn speakers(&self) -> impl Iterator<Item = ChannelMask> + '_ {
        (0..28).filter_map(move |i| {
            let bit = ChannelMask::from_bits_truncate(1 << i);
            if self.contains(bit) {
                Some(bit)
            }
            else {
                None
            }
        })
    }
}

/// The ten core `audio_mode` speaker arrangements decoded from the frame header, before any
/// extension appends channels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AudioMode {
    /// 1 channel: C.
    Mono,
    /// 2 channels, dual mono: A, B (not summed to stereo).
    DualMono,
    /// 2 channels: L, R.
    Stereo,
    /// 2 channels, sum/difference coded: L+R, L-R.
    StereoSumDiff,
    /// 2 channels, embedded L/R with left-total/right-total matrix: Lt, Rt.
    StereoTotal,
    /// 3 channels: C, L, R.
    ThreeFZero,
    /// 3 channels: L, R, S (mono surround).
    TwoFOneR,
    /// 4 channels: C, L, R, S.
    ThreeFOneR,
    /// 4 channels: L, R, Ls, Rs.
    TwoFTwoR,
    /// 5 channels: C, L, R, Ls, Rs.
    ThreeFTwoR,
}

impl AudioMode {
    /// The number of primary channels implied by this mode, before LFE or any extension.
    pub fn channel_count(self) -> usize {
        match self {
            AudioMode::Mono => 1,
            AudioMode::DualMono => 2,
            AudioMode::Stereo => 2,
            AudioMode::StereoSumDiff => 2,
            AudioMode::StereoTotal => 2,
            AudioMode::ThreeFZero => 3,
            AudioMode::TwoFOneR => 3,
            AudioMode::ThreeFOneR => 4,
            AudioMode::TwoFTwoR => 4,
            AudioMode::ThreeFTwoR => 5,
        }
    }

    /// The base speaker mask for this mode (excluding LFE, which is added separately when
    /// present).
    pub fn channel_mask(self) -> ChannelMask {
        use ChannelMask as M;
        match self {
            AudioMode::Mono => M::C,
            // Dual mono carries two independent program channels; neither speaker bit applies,
            // so both are reported under L/R for downstream channel-count purposes only.
            AudioMode::DualMono => M::L | M::R,
            AudioMode::Stereo | AudioMode::StereoSumDiff | AudioMode::StereoTotal => M::L | M::R,
            AudioMode::ThreeFZero => M::C | M::L | M::R,
            AudioMode::TwoFOneR => M::L | M::R | M::CS,
            AudioMode::ThreeFOneR => M::C | M::L | M::R | M::CS,
            AudioMode::TwoFTwoR => M::L | M::R | M::LS | M::RS,
            AudioMode::ThreeFTwoR => M::C | M::L | M::R | M::LS | M::RS,
        }
    }

    pub fn from_code(code: u32) -> Option<AudioMode> {
        match code {
            0 => Some(AudioMode::Mono),
            1 => Some(AudioMode::DualMono),
            2 => Some(AudioMode::Stereo),
            3 => Some(AudioMode::StereoSumDiff),
            4 => Some(AudioMode::StereoTotal),
            5 => Some(AudioMode::ThreeFZero),
            6 => Some(AudioMode::TwoFOneR),
            7 => Some(AudioMode::ThreeFOneR),
            8 => Some(AudioMode::TwoFTwoR),
            9 => Some(AudioMode::ThreeFTwoR),
            _ => None,
        }
    }
}

/// The presence and gain convention of the LFE channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LfeMode {
    None,
    /// LFE samples are interpolated by a 128-tap FIR.
    Interpolate128,
    /// LFE samples are interpolated by a 64-tap FIR (used by some extension configurations).
    Interpolate64,
}

/// The sample representation emitted by the controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SampleFormat {
    /// 24-bit signed samples held in the top bits of a 32-bit signed plane.
    S32P,
    /// 32-bit IEEE-754 float samples, nominally in `[-1.0, 1.0]`.
    FltP,
}

/// The profile tag reported alongside decoded PCM, derived from which substreams were seen
/// in the access unit plus the effective output resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Profile {
    Dts,
    DtsEs,
    Dts96_24,
    DtsHdHra,
    DtsHdMa,
    DtsExpress,
}

/// A caller-facing planar output buffer: one `Vec<f32>` or `Vec<i32>` plane per channel,
/// reallocated only when `npcmblocks` grows.
#[derive(Clone, Debug, Default)]
pub struct PlanarAudioBuffer {
    planes: Vec<Vec<f32>>,
    capacity_frames: usize,
}

impl PlanarAudioBuffer {
    pub fn new(n_channels: usize, capacity_frames: usize) -> Self {
        PlanarAudioBuffer {
            planes: vec![Vec::with_capacity(capacity_frames); n_channels],
            capacity_frames,
        }
    }

    /// Ensures there are exactly `n_channels` planes, each able to hold `n_frames` samples
    /// without reallocating, reusing existing storage when possible: reallocates only when
    /// `npcmblocks` grows.
    pub fn prepare(&mut self, n_channels: usize, n_frames: usize) {
        if self.planes.len() != n_channels {
            self.planes.resize_with(n_channels, Vec::new);
        }
        if n_frames > self.capacity_frames {
            self.capacity_frames = n_frames;
        }
        for plane in &mut self.planes {
            plane.clear();
            plane.reserve(self.capacity_frames);
            plane.resize(n_frames, 0.0);
        }
    }

    pub fn plane_mut(&mut self, ch: usize) -> &mut [f32] {
        &mut self.planes[ch]
    }

    pub fn plane(&self, ch: usize) -> &[f32] {
        &self.planes[ch]
    }

    pub fn n_channels(&self) -> usize {
        self.planes.len()
    }

    pub fn n_frames(&self) -> usize {
        self.planes.first().map(|p| p.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_audio_mode_channel_counts() {
        assert_eq!(AudioMode::Mono.channel_count(), 1);
        assert_eq!(AudioMode::ThreeFTwoR.channel_count(), 5);
        assert_eq!(AudioMode::ThreeFTwoR.channel_mask().count(), 5);
    }

    #[test]
    fn verify_channel_mask_speaker_order() {
        let mask = ChannelMask::L | ChannelMask::R | ChannelMask::LFE1;
        let speakers: Vec<_> = mask.speakers().collect();
        assert_eq!(speakers, vec![ChannelMask::L, ChannelMask::R, ChannelMask::LFE1]);
    }

    #[test]
    fn verify_planar_buffer_reuse() {
        let mut buf = PlanarAudioBuffer::new(2, 256);
        buf.prepare(2, 256);
        buf.plane_mut(0)[0] = 1.0;
        assert_eq!(buf.n_frames(), 256);
        buf.prepare(2, 128);
        assert_eq!(buf.n_frames(), 128);
        assert_eq!(buf.plane(0)[0], 0.0);
    }
}
