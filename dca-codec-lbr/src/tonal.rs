// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tonal-component decoding: a 512-entry ring buffer of
//! sinusoidal components, each carrying a frequency bin, frequency delta, phase rotation, and
//! per-channel amplitude/phase, plus the per-group subframe bounds used to know which ring
//! entries are active in a given subframe.

use dca_core::errors::Result;
use dca_core::io::BitReaderLtr;

use crate::tables::{avg_g3_vlc, damp_vlc, dph_vlc, tnl_grp_vlc, tnl_scf_vlc};

const TONAL_RING_SIZE: usize = 512;
const N_TONAL_GROUPS: usize = 5;

/// One decoded tonal component: its frequency bin, the bin delta to its predecessor in the same
/// group, a phase-rotation rate, and one amplitude/phase pair per channel.
#[derive(Clone, Debug, Default)]
pub struct TonalComponent {
    pub x_freq: u16,
    pub f_delt: i16,
    pub ph_rot: u8,
    pub amp: Vec<u8>,
    pub phs: Vec<u8>,
}

/// The 512-entry ring buffer of tonal components, plus the per-group/per-subframe bounds used to
/// slice out the components active in one subframe's synthesis pass.
pub struct TonalRing {
    ring: Vec<TonalComponent>,
    write_pos: usize,
    /// `tonal_bounds[group][subframe] = (start, end)` index range into `ring`.
    pub tonal_bounds: [[(usize, usize); 32]; N_TONAL_GROUPS],
}

impl TonalRing {
    pub fn new() -> TonalRing {
        TonalRing {
            ring: vec![TonalComponent::default(); TONAL_RING_SIZE],
            write_pos: 0,
            tonal_bounds: [[(0, 0); 32]; N_TONAL_GROUPS],
        }
    }

    fn push(&mut self, component: TonalComponent) -> usize {
        let idx = self.write_pos;
        self.ring[idx] = component;
        self.write_pos = (self.write_pos + 1) % TONAL_RING_SIZE;
        idx
    }

    pub fn component(&self, idx: usize) -> &TonalComponent {
        &self.ring[idx % TONAL_RING_SIZE]
    }

    /// Parses one tonal-group chunk (IDs `0x0E..=0x1B`): a base scale factor followed by a run of
    /// tonal components for `group`, recording the active ring range for `subframe`.
    pub fn parse_group_chunk(
        &mut self,
        reader: &mut BitReaderLtr<'_>,
        group: usize,
        subframe: usize,
        n_channels: usize,
    ) -> Result<()> {
        let group = group.min(N_TONAL_GROUPS - 1);
        let grp_vlc = tnl_grp_vlc(group);
        let n_components = reader.lookup_vlc(&grp_vlc.table, grp_vlc.max_depth)? as usize;

        let scf_vlc = tnl_scf_vlc();
        let damp = damp_vlc();
        let dph = dph_vlc();

        let start = self.write_pos;
        let mut running_freq: u16 = 0;

        for _ in 0..n_components {
            let scale = reader.lookup_vlc(&scf_vlc.table, scf_vlc.max_depth)? as i32 - 16;
            let f_delt = reader.lookup_vlc(&damp.table, damp.max_depth)? as i32 - 8;
            running_freq = running_freq.wrapping_add(f_delt as u16);
            let ph_rot = reader.lookup_vlc(&dph.table, dph.max_depth)?;

            let mut amp = Vec::with_capacity(n_channels);
            let mut phs = Vec::with_capacity(n_channels);
            for _ in 0..n_channels {
                amp.push((scale.max(0).min(255)) as u8);
                phs.push(reader.read_bits(8)? as u8);
            }

            self.push(TonalComponent { x_freq: running_freq, f_delt: f_delt as i16, ph_rot: ph_rot as u8, amp, phs });
        }

        let end = self.write_pos;
        self.tonal_bounds[group][subframe.min(31)] = (start, end);
        Ok(())
    }

    /// Returns the tonal components active in `group` during `subframe`.
    pub fn active(&self, group: usize, subframe: usize) -> Vec<&TonalComponent> {
        let (start, end) = self.tonal_bounds[group.min(N_TONAL_GROUPS - 1)][subframe.min(31)];
        let mut out = Vec::new();
        let mut i = start;
        while i != end {
            out.push(self.component(i));
            i = (i + 1) % TONAL_RING_SIZE;
        }
        out
    }

    /// Evaluates the three-group running average VLC once per frame, used by the synthesizer to
    /// normalize tonal-group energy.
    pub fn read_group_average(&self, reader: &mut BitReaderLtr<'_>) -> Result<i32> {
        let vlc = avg_g3_vlc();
        Ok(reader.lookup_vlc(&vlc.table, vlc.max_depth)? as i32)
    }
}

impl Default for TonalRing {
    fn default() -> TonalRing {
        TonalRing::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_ring_starts_empty() {
        let ring = TonalRing::new();
        assert_eq!(ring.active(0, 0).len(), 0);
    }
}
