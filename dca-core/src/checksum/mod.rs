// Copyright (c) 2026 The DCA Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `checksum` module provides the CRC-16 engine DCA uses to protect frame headers, side
//! information, and NAVI tables.

mod crc16;

pub use crc16::check;
