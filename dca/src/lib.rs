// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! The DCA facade crate: given one access unit at a time from an external framer, decodes the
//! core substream, probes for a sibling EXSS extension substream, layers LBR/XLL/X96 on top per
//! the caller's [`options::DecoderOptions`], and reports planar PCM plus a
//! [`dca_core::audio::Profile`] tag.
//!
//! Everything upstream of this crate — container demuxing, the IEC-61937 framing, seeking — is an
//! external collaborator's responsibility: this crate only ever sees one borrowed access unit per
//! call.

pub mod controller;
pub mod exss;
pub mod options;
pub mod profile;

pub use controller::{repack_14_to_16, DcaDecoder, DecodedAccessUnit};
pub use exss::{AssetDescriptor, AssetExtensionMask, AssetRange, ExssHeader};
pub use options::{DecoderOptions, ErrRecognition, RequestChannelLayout};
pub use profile::PacketFlags;

pub use dca_core::audio::{AudioMode, ChannelMask, LfeMode, PlanarAudioBuffer, Profile, SampleFormat};
pub use dca_core::errors::{DcaError, ErrorKind, Result};
