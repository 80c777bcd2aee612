// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller options: each flag's effect is resolved once per access
//! unit at the start of [`crate::controller::DcaDecoder::decode`].

use bitflags::bitflags;

bitflags! {
    /// Error-recognition strictness: `CRC_CHECK` validates CRC-protected regions that would
    /// otherwise be skipped; `CAREFUL` additionally raises reserved-bit violations as errors;
    /// `EXPLODE` promotes every otherwise-recoverable error to fatal.
    pub struct ErrRecognition: u8 {
        const CAREFUL   = 1 << 0;
        const CRC_CHECK = 1 << 1;
        const EXPLODE   = 1 << 2;
    }
}

/// The caller's requested output channel layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RequestChannelLayout {
    /// Keep whatever layout the effective speaker mask implies.
    Keep,
    /// Downmix to stereo, preferring an embedded downmix when present and compatible.
    Stereo,
}

impl Default for RequestChannelLayout {
    fn default() -> RequestChannelLayout {
        RequestChannelLayout::Keep
    }
}

/// Top-level decoder options, each with an explicit, independently
/// toggleable effect on the decode pipeline.
#[derive(Clone, Debug)]
pub struct DecoderOptions {
    /// If `true` (the default), EXSS XLL is not decoded even when present; the core (plus other
    /// extensions) is output instead.
    pub disable_xll: bool,
    /// If `true`, XCH is ignored even when present.
    pub disable_xch: bool,
    /// If `true`, XXCH is ignored even when present.
    pub disable_xxch: bool,
    /// If `true`, X96 is ignored even when present.
    pub disable_x96: bool,
    /// If `true`, XBR is ignored even when present.
    pub disable_xbr: bool,
    /// If `true`, every extension is skipped even when present, overriding the individual
    /// `disable_*` flags.
    pub core_only: bool,
    pub request_channel_layout: RequestChannelLayout,
    pub err_recognition: ErrRecognition,
    /// Forces the fixed-point synthesis path even when the float path would otherwise be chosen.
    pub bit_exact: bool,
}

impl Default for DecoderOptions {
    fn default() -> DecoderOptions {
        DecoderOptions {
            disable_xll: true,
            disable_xch: false,
            disable_xxch: false,
            disable_x96: false,
            disable_xbr: false,
            core_only: false,
            request_channel_layout: RequestChannelLayout::Keep,
            err_recognition: ErrRecognition::empty(),
            bit_exact: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_default_options_disable_xll_but_not_other_extensions() {
        let opts = DecoderOptions::default();
        assert!(opts.disable_xll);
        assert!(!opts.disable_xch);
        assert!(!opts.core_only);
        assert_eq!(opts.request_channel_layout, RequestChannelLayout::Keep);
    }

    #[test]
    fn verify_err_recognition_explode_implies_distinct_bit() {
        let recognition = ErrRecognition::CRC_CHECK | ErrRecognition::EXPLODE;
        assert!(recognition.contains(ErrRecognition::CRC_CHECK));
        assert!(recognition.contains(ErrRecognition::EXPLODE));
        assert!(!recognition.contains(ErrRecognition::CAREFUL));
    }
}
