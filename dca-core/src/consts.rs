// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bit-exact wire-format constants shared by every `dca-*` crate so none of them re-derive or
//! duplicate a sync word.

pub const SYNC_CORE_BE: u32 = 0x7FFE_8001;
pub const SYNC_CORE_LE: u32 = 0xFE7F_0180;
pub const SYNC_CORE_14B_BE: u32 = 0x1FFF_E800;
pub const SYNC_CORE_14B_LE: u32 = 0xFF1F_00E8;

pub const SYNC_XCH: u32 = 0x5A5A_5A5A;
pub const SYNC_XXCH: u32 = 0x4700_4A03;
pub const SYNC_X96: u32 = 0x1D95_F262;
pub const SYNC_XBR: u32 = 0x655E_315E;
pub const SYNC_LBR: u32 = 0x0A80_1921;
pub const SYNC_XLL: u32 = 0x41A2_9547;

pub const SYNC_EXSS: u32 = 0x6458_2025;
pub const SYNC_EXSS_CORE: u32 = 0x02B0_9261;

pub const SYNC_REV1_AUX: u32 = 0x9A11_05A0;

/// Marks the end of every subsubframe (or group of subsubframes when `sync_ssf` is set).
pub const DSYNC: u16 = 0xFFFF;

/// Sample rate, in Hz, indexed by the core frame header's 4-bit `sample_rate_code`. A `0` entry
/// marks a reserved code.
pub const SAMPLE_RATES_HZ: [u32; 16] =
    [0, 8_000, 16_000, 32_000, 0, 0, 11_025, 22_050, 44_100, 0, 0, 12_000, 24_000, 48_000, 96_000, 192_000];

/// The byte offset, within the 242-entry downmix coefficient table, at which the inverse
/// coefficients begin.
pub const DMIXTABLE_OFFSET: usize = 41;

/// Number of entries in the embedded downmix coefficient table.
pub const DMIXTABLE_LEN: usize = 242;

/// Maximum declared frame size, in bytes, for a core frame.
pub const MAX_CORE_FRAME_SIZE: usize = 16384;

/// Minimum legal core frame size, in bytes.
pub const MIN_CORE_FRAME_SIZE: usize = 96;

/// Maximum number of primary channels the core (with all extensions applied) may report.
pub const MAX_CHANNELS: usize = 7;
