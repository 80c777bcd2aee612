// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bit- and byte-oriented cursors over a borrowed buffer.

pub mod bit;
mod byte_reader;

pub use bit::{BitReaderLtr, BitReaderRtl};
pub use byte_reader::ByteReader;
