// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Flash geometry and application layout for the ATSAMD21G18A target.
//!
//! The NVM controller programs in 64-byte pages and erases in 256-byte rows
//! (four pages). The loader occupies the first 16 KiB of flash; everything
//! from [`APP_START`] to the end of flash belongs to the application.

/// Total on-chip flash in bytes; exclusive upper bound for legal addresses.
pub const FLASH_SIZE: u32 = 256 * 1024;

/// Program granule of the NVM controller.
pub const PAGE_SIZE: usize = 64;

/// Erase granule: four pages.
pub const ROW_SIZE: usize = PAGE_SIZE * 4;

/// Flash reserved for the loader itself. The linker script must agree.
pub const LOADER_RESERVED: u32 = 0x4000;

/// First address of the application image.
pub const APP_START: u32 = LOADER_RESERVED;

/// Magic stored in the word immediately before [`APP_START`] once a
/// complete, authenticated image has been installed.
pub const APP_VALID_MAGIC: u32 = 0x55AA_13F0;

/// Address of the application-valid marker word.
pub const APP_VALID_ADDR: u32 = APP_START - 4;

// The erase loop over the application region relies on APP_START sitting on
// a row boundary.
const _: () = assert!(APP_START % ROW_SIZE as u32 == 0);
const _: () = assert!(APP_VALID_ADDR % 4 == 0);

/// Round `addr` down to the containing row boundary.
pub const fn align_down_to_row(addr: u32) -> u32 {
    addr & !(ROW_SIZE as u32 - 1)
}

/// Round `addr` down to the containing page boundary.
pub const fn align_down_to_page(addr: u32) -> u32 {
    addr & !(PAGE_SIZE as u32 - 1)
}

/// True iff `addr` is a legal program address.
pub const fn is_page_aligned(addr: u32) -> bool {
    addr % PAGE_SIZE as u32 == 0
}

/// True iff `[addr, addr + len)` lies entirely inside the application window.
pub fn write_in_app_window(addr: u32, len: u32) -> bool {
    addr >= APP_START && addr.checked_add(len).is_some_and(|end| end <= FLASH_SIZE)
}
