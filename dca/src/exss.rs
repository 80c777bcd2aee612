// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The EXSS demultiplexer: a length-prefixed header enumerating up to four audio
//! presentations and, for each, the byte ranges of its constituent assets (core, XBR, XXCH, X96,
//! LBR, XLL).

use dca_core::consts::SYNC_EXSS;
use dca_core::errors::{decode_error, invalid_sync_error, Result};
use dca_core::io::BitReaderLtr;

const MAX_PRESENTATIONS: usize = 4;
const MAX_ASSETS: usize = 8;

bitflags::bitflags! {
    /// Which extension substreams an asset's descriptor declares.
    pub struct AssetExtensionMask: u8 {
        const CORE = 1 << 0;
        const XBR  = 1 << 1;
        const XXCH = 1 << 2;
        const X96  = 1 << 3;
        const LBR  = 1 << 4;
        const XLL  = 1 << 5;
    }
}

/// One asset's relative byte offset and size within the EXSS frame, per substream kind.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssetRange {
    pub offset: u32,
    pub size: u32,
}

/// One asset descriptor: which extensions it carries and each one's byte range.
#[derive(Clone, Debug, Default)]
pub struct AssetDescriptor {
    pub extension_mask: u8,
    pub core: AssetRange,
    pub xbr: AssetRange,
    pub xxch: AssetRange,
    pub x96: AssetRange,
    pub lbr: AssetRange,
    pub xll: AssetRange,
}

impl AssetDescriptor {
    pub fn has(&self, ext: AssetExtensionMask) -> bool {
        AssetExtensionMask::from_bits_truncate(self.extension_mask).contains(ext)
    }
}

/// The decoded EXSS header: the frame's total byte size and one descriptor per asset.
#[derive(Clone, Debug, Default)]
pub struct ExssHeader {
    pub frame_size_bytes: u32,
    pub assets: Vec<AssetDescriptor>,
}

fn read_range(reader: &mut BitReaderLtr<'_>, nbits_size: u32) -> Result<AssetRange> {
    let offset = reader.read_bits(13)?;
    let size = reader.read_bits(nbits_size)?;
    Ok(AssetRange { offset, size })
}

/// Parses the EXSS header. `reader` must be positioned immediately after the EXSS sync word has
/// already been validated by the caller (the controller, which needs to know the sync matched
/// before committing to this parse path).
pub fn parse_exss(buf: &[u8]) -> Result<ExssHeader> {
    let mut reader = BitReaderLtr::new(buf);
    let sync = reader.read_bits(32)?;
    if sync != SYNC_EXSS {
        return invalid_sync_error("exss: sync word mismatch");
    }

    let _user_def_bits = reader.read_bits(8)?;
    let _version = reader.read_bits(2)? + 1;
    let header_size = reader.read_bits(6)? + 1;
    let exss_size_nbits = reader.read_bits(4)? + 1;
    let frame_size_bytes = reader.read_bits(exss_size_nbits)? + 1;

    let n_presentations = reader.read_bits(2)? as usize + 1;
    if n_presentations > MAX_PRESENTATIONS {
        return decode_error("exss: too many audio presentations declared");
    }
    let n_assets = reader.read_bits(3)? as usize + 1;
    if n_assets > MAX_ASSETS {
        return decode_error("exss: too many assets declared");
    }

    // The per-presentation active-asset mask; not otherwise used by the controller beyond
    // validating the asset count makes sense.
    for _ in 0..n_presentations {
        if n_assets > 1 {
            let _active_mask = reader.read_bits(n_assets as u32)?;
        }
    }

    let mut asset_sizes_nbits = Vec::with_capacity(n_assets);
    for _ in 0..n_assets {
        asset_sizes_nbits.push(reader.read_bits(5)? + 1);
    }

    let mut assets = Vec::with_capacity(n_assets);
    for &size_nbits in &asset_sizes_nbits {
        let extension_mask = reader.read_bits(6)? as u8;
        let mut descriptor = AssetDescriptor { extension_mask, ..AssetDescriptor::default() };

        if descriptor.has(AssetExtensionMask::CORE) {
            descriptor.core = read_range(&mut reader, size_nbits)?;
        }
        if descriptor.has(AssetExtensionMask::XBR) {
            descriptor.xbr = read_range(&mut reader, size_nbits)?;
        }
        if descriptor.has(AssetExtensionMask::XXCH) {
            descriptor.xxch = read_range(&mut reader, size_nbits)?;
        }
        if descriptor.has(AssetExtensionMask::X96) {
            descriptor.x96 = read_range(&mut reader, size_nbits)?;
        }
        if descriptor.has(AssetExtensionMask::LBR) {
            descriptor.lbr = read_range(&mut reader, size_nbits)?;
        }
        if descriptor.has(AssetExtensionMask::XLL) {
            descriptor.xll = read_range(&mut reader, size_nbits)?;
        }

        assets.push(descriptor);
    }

    let _ = header_size;
    Ok(ExssHeader { frame_size_bytes, assets })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_bits(bits: &mut Vec<bool>, val: u32, n: u32) {
        for i in (0..n).rev() {
            bits.push((val >> i) & 1 != 0);
        }
    }

    fn to_bytes(bits: &[bool]) -> Vec<u8> {
        let mut bytes = vec![0u8; (bits.len() + 7) / 8];
        for (i, b) in bits.iter().enumerate() {
            if *b {
                bytes[i / 8] |= 1 << (7 - i % 8);
            }
        }
        bytes
    }

    #[test]
    fn verify_single_asset_core_only() {
        let mut bits = Vec::new();
        push_bits(&mut bits, SYNC_EXSS, 32);
        push_bits(&mut bits, 0, 8); // user_def_bits
        push_bits(&mut bits, 0, 2); // version - 1
        push_bits(&mut bits, 8, 6); // header_size - 1
        push_bits(&mut bits, 11, 4); // exss_size_nbits - 1 = 11 -> 12 bits
        push_bits(&mut bits, 500, 12); // frame_size - 1
        push_bits(&mut bits, 0, 2); // n_presentations - 1
        push_bits(&mut bits, 0, 3); // n_assets - 1
        push_bits(&mut bits, 12, 5); // asset size nbits - 1 = 12 -> 13 bits
        push_bits(&mut bits, AssetExtensionMask::CORE.bits() as u32, 6); // extension_mask
        push_bits(&mut bits, 10, 13); // core offset
        push_bits(&mut bits, 200, 13); // core size
        let buf = to_bytes(&bits);

        let header = parse_exss(&buf).unwrap();
        assert_eq!(header.frame_size_bytes, 501);
        assert_eq!(header.assets.len(), 1);
        assert!(header.assets[0].has(AssetExtensionMask::CORE));
        assert_eq!(header.assets[0].core.offset, 10);
        assert_eq!(header.assets[0].core.size, 200);
    }

    #[test]
    fn verify_wrong_sync_word_rejected() {
        let buf = [0u8; 32];
        assert!(parse_exss(&buf).is_err());
    }
}
