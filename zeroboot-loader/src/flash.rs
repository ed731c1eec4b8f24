// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! SAMD21 NVMCTRL flash engine.
//!
//! The NVM controller programs 64-byte pages through a write-once page
//! buffer and erases 256-byte rows. Every command is followed by a busy
//! wait on `INTFLAG.READY`; the controller has no other software-visible
//! failure mode. The `ADDR` register takes addresses in 16-bit granules,
//! hence the `/ 2` on every address write.

use zeroboot_common::layout::{
    align_down_to_page, align_down_to_row, APP_START, APP_VALID_ADDR, APP_VALID_MAGIC, FLASH_SIZE,
    PAGE_SIZE, ROW_SIZE,
};
use zeroboot_common::FlashOps;

const NVMCTRL_BASE: u32 = 0x4100_4000;

const CTRLA: *mut u16 = NVMCTRL_BASE as *mut u16;
const CTRLB: *mut u32 = (NVMCTRL_BASE + 0x04) as *mut u32;
const INTFLAG: *mut u8 = (NVMCTRL_BASE + 0x14) as *mut u8;
const ADDR: *mut u32 = (NVMCTRL_BASE + 0x1C) as *mut u32;

const INTFLAG_READY: u8 = 1 << 0;

const CTRLB_MANW: u32 = 1 << 7;
const CTRLB_RWS_MASK: u32 = 0xF << 1;
/// One read wait state, required at 48 MHz.
const CTRLB_RWS_ONE: u32 = 1 << 1;

const CMDEX_KEY: u16 = 0xA5 << 8;
const CMD_ERASE_ROW: u16 = 0x02;
const CMD_WRITE_PAGE: u16 = 0x04;
const CMD_PAGE_BUFFER_CLEAR: u16 = 0x44;

fn wait_ready() {
    unsafe {
        while INTFLAG.read_volatile() & INTFLAG_READY == 0 {
            core::hint::spin_loop();
        }
    }
}

fn exec_cmd(cmd: u16) {
    unsafe {
        CTRLA.write_volatile(CMDEX_KEY | cmd);
    }
    wait_ready();
}

/// Exclusive handle to the NVM controller. Constructed once at boot.
pub struct Nvm {
    _priv: (),
}

impl Nvm {
    /// Switch the controller to manual write mode (pages are committed by
    /// an explicit `WP` command, not automatically on the last word) and
    /// set one read wait state for the 48 MHz core clock.
    pub fn init() -> Nvm {
        wait_ready();
        unsafe {
            let ctrlb = CTRLB.read_volatile() | CTRLB_MANW;
            CTRLB.write_volatile((ctrlb & !CTRLB_RWS_MASK) | CTRLB_RWS_ONE);
        }
        wait_ready();
        Nvm { _priv: () }
    }

    /// Erase every row intersecting `[addr, addr + len)`, clamped to the
    /// end of flash. A zero length is a no-op.
    pub fn erase_range(&mut self, addr: u32, len: usize) {
        if len == 0 {
            return;
        }
        let mut row = align_down_to_row(addr);
        let end = addr
            .checked_add(len as u32)
            .map_or(FLASH_SIZE, |e| e.min(FLASH_SIZE));

        while row < end {
            wait_ready();
            unsafe {
                ADDR.write_volatile(row / 2);
            }
            exec_cmd(CMD_ERASE_ROW);
            row += ROW_SIZE as u32;
        }
    }

    /// Program one or more pages starting at the page-aligned `addr`.
    /// The unwritten tail of the final page is padded with 0xFF, which
    /// leaves the corresponding flash cells untouched.
    fn program_pages(&mut self, mut addr: u32, mut data: &[u8]) {
        while !data.is_empty() {
            let chunk = data.len().min(PAGE_SIZE);
            let mut staging = [0xFFu8; PAGE_SIZE];
            staging[..chunk].copy_from_slice(&data[..chunk]);

            wait_ready();
            exec_cmd(CMD_PAGE_BUFFER_CLEAR);

            // Fill the NVM page buffer with 32-bit writes to the target
            // address range.
            let dest = addr as *mut u32;
            for (i, word) in staging.chunks_exact(4).enumerate() {
                let value = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
                unsafe {
                    dest.add(i).write_volatile(value);
                }
            }

            unsafe {
                ADDR.write_volatile(addr / 2);
            }
            exec_cmd(CMD_WRITE_PAGE);

            addr += PAGE_SIZE as u32;
            data = &data[chunk..];
        }
    }
}

impl FlashOps for Nvm {
    fn erase_application(&mut self) {
        self.erase_range(APP_START, (FLASH_SIZE - APP_START) as usize);
    }

    fn program(&mut self, addr: u32, data: &[u8]) {
        self.program_pages(addr, data);
    }

    /// The marker shares its page with the tail of the loader region,
    /// which the loader image never reaches; staging the rest of the page
    /// as 0xFF leaves those cells unchanged.
    fn set_app_valid(&mut self) {
        let page_addr = align_down_to_page(APP_VALID_ADDR);
        let offset = (APP_VALID_ADDR - page_addr) as usize;

        let mut staging = [0xFFu8; PAGE_SIZE];
        staging[offset..offset + 4].copy_from_slice(&APP_VALID_MAGIC.to_le_bytes());
        self.program_pages(page_addr, &staging);
    }
}
