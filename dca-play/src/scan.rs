// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Splits a raw elementary DCA stream into access units.
//!
//! Container demuxing is explicitly out of scope for the decoder; this
//! module is the bare minimum an external framer would do for a *raw* `.dts`/`.cpt` dump rather
//! than a real container: find the core sync word, read just enough of the frame header to learn
//! `frame_size`, extend the access unit over a trailing EXSS block when one follows, and repeat.
//! Only the raw big-endian framing is handled here; 14-bit-word and byte-swapped streams are a
//! container/transport concern this demo does not attempt to detect from a bare dump.

use log::warn;

use dca_core::consts::{SYNC_CORE_BE, SYNC_EXSS};
use dca_core::io::BitReaderLtr;
use dca_codec_core::header::parse_frame_header;

/// Returns the byte ranges of each access unit found in `buf`, in order. Stops (without error) at
/// the first position that is not a recognized core sync word, since that is either the end of
/// the stream or trailing padding.
pub fn find_access_units(buf: &[u8]) -> Vec<std::ops::Range<usize>> {
    let mut units = Vec::new();
    let mut pos = 0;

    while pos + 4 <= buf.len() {
        let sync = u32::from_be_bytes([buf[pos], buf[pos + 1], buf[pos + 2], buf[pos + 3]]);
        if sync != SYNC_CORE_BE {
            if pos != buf.len() {
                warn!("scan: no core sync word at offset {}, stopping scan", pos);
            }
            break;
        }

        let mut reader = BitReaderLtr::new(&buf[pos..]);
        if reader.skip(32).is_err() {
            break;
        }
        let header = match parse_frame_header(&mut reader) {
            Ok(header) => header,
            Err(err) => {
                warn!("scan: malformed core frame header at offset {}: {}", pos, err);
                break;
            }
        };

        let mut au_len = header.frame_size;
        let exss_pos = pos + header.frame_size;
        if exss_pos + 4 <= buf.len() {
            let exss_sync =
                u32::from_be_bytes([buf[exss_pos], buf[exss_pos + 1], buf[exss_pos + 2], buf[exss_pos + 3]]);
            if exss_sync == SYNC_EXSS {
                match dca::exss::parse_exss(&buf[exss_pos..]) {
                    Ok(exss) => au_len += exss.frame_size_bytes as usize,
                    Err(err) => warn!("scan: trailing exss sync found but header failed to parse: {}", err),
                }
            }
        }

        if pos + au_len > buf.len() || au_len == 0 {
            warn!("scan: access unit at offset {} extends past end of buffer, truncating", pos);
            units.push(pos..buf.len());
            break;
        }

        units.push(pos..pos + au_len);
        pos += au_len;
    }

    units
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_mono_frame() -> Vec<u8> {
        // A minimal mono core frame: frame_size = 96.
        let mut bits: Vec<bool> = Vec::new();
        let mut push = |val: u32, n: u32| {
            for i in (0..n).rev() {
                bits.push((val >> i) & 1 != 0);
            }
        };
        push(SYNC_CORE_BE, 32);
        push(0, 1); // FTYPE
        push(31, 5); // deficit samples - 1
        push(0, 1); // crc_present
        push(7, 7); // npcmblocks - 1 == 8
        push(95, 14); // frame_size - 1 == 96
        push(0, 6); // amode = mono
        push(13, 4); // sample_rate_code = 48 kHz
        push(0, 5); // bit_rate_code
        push(0, 1); // reserved/mix
        push(0, 1); // dynamic_range_present
        push(0, 1); // timestamp_present
        push(0, 1); // aux_present
        push(0, 1); // hdcd
        push(0, 3); // ext_audio_type
        push(0, 1); // ext_audio_present
        push(0, 1); // aspf
        push(0, 2); // lfe_flag = None
        push(1, 1); // predictor_history
        push(0, 1); // sync_ssf
        push(0, 2); // reserved
        push(0, 1); // front_sum_diff
        push(0, 1); // surround_sum_diff
        push(0, 3); // source_pcm_resolution_code

        let mut bytes = vec![0u8; 96];
        for (i, b) in bits.iter().enumerate() {
            if *b {
                bytes[i / 8] |= 1 << (7 - i % 8);
            }
        }
        bytes
    }

    #[test]
    fn verify_finds_single_access_unit() {
        let frame = minimal_mono_frame();
        let units = find_access_units(&frame);
        assert_eq!(units, vec![0..96]);
    }

    #[test]
    fn verify_finds_two_consecutive_access_units() {
        let mut stream = minimal_mono_frame();
        stream.extend(minimal_mono_frame());
        let units = find_access_units(&stream);
        assert_eq!(units, vec![0..96, 96..192]);
    }

    #[test]
    fn verify_stops_at_unrecognized_data() {
        let mut stream = minimal_mono_frame();
        stream.extend_from_slice(&[0u8; 16]);
        let units = find_access_units(&stream);
        assert_eq!(units, vec![0..96]);
    }
}
