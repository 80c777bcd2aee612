// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

// Justification: identity operations are allowed to vertically align, and better illustrate
// complex algorithms and vectorizations.
#![allow(clippy::identity_op)]

// Justification: excessive floating point precision is allowed in-case f32 constants should be
// switched to f64.
#![allow(clippy::excessive_precision)]

//! The core DCA substream decoder: frame and coding header parsing, per-subframe side
//! information and subband sample decoding, inverse ADPCM prediction, the IMDCT and polyphase
//! synthesis filter, and the XCH/XXCH/X96/XBR core extensions.

pub mod adpcm;
pub mod aux;
pub mod coding_header;
pub mod common;
pub mod decoder;
pub mod ext;
pub mod header;
pub mod imdct;
pub mod lfe;
pub mod quantize;
pub mod subframe;
pub mod synth;
pub mod tables;

pub use common::{ChannelCodingParams, CodingHeader, CoreFrameHeader};
pub use decoder::{CoreDecoder, DecodedFrame};