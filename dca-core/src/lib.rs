// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Shared plumbing for the `dca-*` crates: bit/byte readers, the CRC-16 engine, fixed-point
//! saturating math, and the speaker-layout/sample-format types every codec and the top-level
//! controller agree on.

pub mod audio;
pub mod checksum;
pub mod consts;
pub mod errors;
pub mod io;
pub mod math;
