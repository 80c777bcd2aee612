// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! LBR (DTS Express) decode: the asset `EXSS` carries in its DTS Express substream, a
//! low-bit-rate hybrid tonal/subband codec distinct from the core substream it often accompanies.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]
#![allow(clippy::identity_op)]
#![allow(clippy::excessive_precision)]

pub mod chunks;
pub mod decoder;
pub mod header;
pub mod synth;
pub mod tables;
pub mod tonal;

pub use decoder::{LbrDecodedFrame, LbrDecoder};
pub use header::{LbrHeaderKind, LbrInitHeader};
