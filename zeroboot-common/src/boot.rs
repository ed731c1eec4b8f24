// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Bootloader-entry decision.
//!
//! Sampled once at reset: the loader stays resident when the host has opened
//! the virtual serial port at the touch baud rate, or when no authenticated
//! application is installed. Otherwise control passes to the application.

use crate::layout::APP_VALID_MAGIC;

/// Opening the CDC port at this rate forces the loader to stay resident.
pub const TOUCH_BAUD: u32 = 1200;

/// Decide between staying in the loader and launching the application.
///
/// `host_baud` is the most recent CDC line-coding rate requested by the
/// host; `valid_marker` is the word read from the application-valid address.
pub fn stay_resident(host_baud: u32, valid_marker: u32) -> bool {
    host_baud == TOUCH_BAUD || valid_marker != APP_VALID_MAGIC
}
