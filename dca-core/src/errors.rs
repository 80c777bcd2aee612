// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type shared by every `dca-*` crate.

use std::error::Error as StdError;
use std::fmt;
use std::result;

/// `ErrorKind` enumerates every distinct way a bitstream can fail to parse or decode, as
/// distinguished by the core (see the error handling design notes for each variant's exact
/// trigger condition and propagation policy).
#[derive(Debug)]
pub enum ErrorKind {
    /// The bit reader was exhausted before a required field could be read.
    Truncated,
    /// A sync word was missing, or did not match, at an expected bit position.
    InvalidSync,
    /// A field held a value outside its legal range (reserved bit set, zero sample rate,
    /// out-of-range scale-factor index, DSYNC mismatch, and similar).
    InvalidData,
    /// A VLC table lookup produced no match within the configured maximum number of stages.
    InvalidVlc,
    /// A CRC-protected region failed validation.
    CrcMismatch,
    /// A legal but unimplemented feature was encountered (more than one XXCH channel set,
    /// deficit samples, exotic LBR band limits, XLL mapping coefficients, and so on).
    Unsupported(&'static str),
    /// Allocating a sample buffer failed.
    OutOfMemory,
    /// The EXSS XLL peak-bitrate-smoothing buffer does not yet hold a complete frame.
    NeedMoreData,
}

impl ErrorKind {
    fn as_str(&self) -> &'static str {
        match *self {
            ErrorKind::Truncated => "bit reader exhausted before a required field",
            ErrorKind::InvalidSync => "sync word missing or incorrect",
            ErrorKind::InvalidData => "field value outside its legal range",
            ErrorKind::InvalidVlc => "vlc table yielded no match within max_depth stages",
            ErrorKind::CrcMismatch => "crc-protected region failed validation",
            ErrorKind::Unsupported(_) => "unsupported but legal feature",
            ErrorKind::OutOfMemory => "sample buffer allocation failed",
            ErrorKind::NeedMoreData => "incomplete frame buffered, more data required",
        }
    }
}

/// `DcaError` is the single error type returned by every fallible operation across the `dca-*`
/// crates.
#[derive(Debug)]
pub enum DcaError {
    /// A malformed bitstream was encountered; see `ErrorKind` for the precise reason.
    Decode(ErrorKind, &'static str),
    /// An I/O error occurred while reading the underlying byte source.
    Io(std::io::Error),
}

impl fmt::Display for DcaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DcaError::Decode(kind, msg) => write!(f, "{}: {}", kind.as_str(), msg),
            DcaError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl StdError for DcaError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            DcaError::Io(err) => Some(err),
            DcaError::Decode(..) => None,
        }
    }
}

impl From<std::io::Error> for DcaError {
    fn from(err: std::io::Error) -> DcaError {
        DcaError::Io(err)
    }
}

pub type Result<T> = result::Result<T, DcaError>;

/// Convenience function to create a `Truncated` error.
pub fn truncated_error<T>(desc: &'static str) -> Result<T> {
    Err(DcaError::Decode(ErrorKind::Truncated, desc))
}

/// Convenience function to create an `InvalidSync` error.
pub fn invalid_sync_error<T>(desc: &'static str) -> Result<T> {
    Err(DcaError::Decode(ErrorKind::InvalidSync, desc))
}

/// Convenience function to create an `InvalidData` error.
pub fn decode_error<T>(desc: &'static str) -> Result<T> {
    Err(DcaError::Decode(ErrorKind::InvalidData, desc))
}

/// Convenience function to create an `InvalidVlc` error.
pub fn invalid_vlc_error<T>(desc: &'static str) -> Result<T> {
    Err(DcaError::Decode(ErrorKind::InvalidVlc, desc))
}

/// Convenience function to create a `CrcMismatch` error.
pub fn crc_mismatch_error<T>(desc: &'static str) -> Result<T> {
    Err(DcaError::Decode(ErrorKind::CrcMismatch, desc))
}

/// Convenience function to create an `Unsupported` error.
pub fn unsupported_error<T>(feature: &'static str) -> Result<T> {
    Err(DcaError::Decode(ErrorKind::Unsupported(feature), feature))
}

/// Convenience function to create an `OutOfMemory` error.
pub fn out_of_memory_error<T>(desc: &'static str) -> Result<T> {
    Err(DcaError::Decode(ErrorKind::OutOfMemory, desc))
}

/// Convenience function to create a `NeedMoreData` error.
pub fn need_more_data_error<T>(desc: &'static str) -> Result<T> {
    Err(DcaError::Decode(ErrorKind::NeedMoreData, desc))
}
