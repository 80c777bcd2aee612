// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The core-substream extensions: XCH (one extra surround channel), XXCH (extra loudspeaker
//! sets with optional embedded downmix), X96 (extra high-frequency subbands for 96 kHz output),
//! and XBR (a bitrate-refinement layer applied additively to core samples). All four ride on the
//! same subframe machinery the core substream uses; each module here owns only the parts that
//! differ (sync word, header shape, and how decoded subband data is combined with the core).

pub mod x96;
pub mod xbr;
pub mod xch;
pub mod xxch;
