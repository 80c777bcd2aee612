// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Profile-tag derivation: which substreams an access unit actually carried,
//! plus the effective output resolution, together pick the profile tag reported alongside PCM.

use dca_core::audio::Profile;

bitflags::bitflags! {
    /// Which substreams were present in the access unit just decoded.
    pub struct PacketFlags: u8 {
        const CORE = 1 << 0;
        const XCH  = 1 << 1;
        const XXCH = 1 << 2;
        const X96  = 1 << 3;
        const XBR  = 1 << 4;
        const LBR  = 1 << 5;
        const XLL  = 1 << 6;
    }
}

/// Derives the profile tag to report alongside decoded PCM, from which substreams were observed
/// and whether the output ended up at 96 kHz (X96 effective) resolution.
pub fn from_packet_flags(flags: PacketFlags, upsampled_96k: bool) -> Profile {
    if flags.contains(PacketFlags::XLL) {
        Profile::DtsHdMa
    }
    else if flags.contains(PacketFlags::LBR) {
        Profile::DtsExpress
    }
    else if flags.contains(PacketFlags::XBR) {
        Profile::DtsHdHra
    }
    else if flags.contains(PacketFlags::X96) || upsampled_96k {
        Profile::Dts96_24
    }
    else if flags.contains(PacketFlags::XCH) || flags.contains(PacketFlags::XXCH) {
        Profile::DtsEs
    }
    else {
        Profile::Dts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_bare_core_is_dts() {
        assert_eq!(from_packet_flags(PacketFlags::CORE, false), Profile::Dts);
    }

    #[test]
    fn verify_xll_outranks_everything() {
        let flags = PacketFlags::CORE | PacketFlags::X96 | PacketFlags::XLL;
        assert_eq!(from_packet_flags(flags, false), Profile::DtsHdMa);
    }

    #[test]
    fn verify_xch_is_dts_es() {
        let flags = PacketFlags::CORE | PacketFlags::XCH;
        assert_eq!(from_packet_flags(flags, false), Profile::DtsEs);
    }

    #[test]
    fn verify_lbr_is_dts_express() {
        assert_eq!(from_packet_flags(PacketFlags::LBR, false), Profile::DtsExpress);
    }
}
