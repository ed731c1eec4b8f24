// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Application launch.

use zeroboot_common::layout::{APP_START, APP_VALID_ADDR};

const SCB_VTOR: *mut u32 = 0xE000_ED08 as *mut u32;

/// Read the application-valid marker word.
pub fn valid_marker() -> u32 {
    unsafe { (APP_VALID_ADDR as *const u32).read_volatile() }
}

/// Install the application vector table and transfer control to its reset
/// handler. Interrupts are disabled on the way out; the application's
/// startup re-enables them once its own vectors are live.
pub fn launch_application() -> ! {
    unsafe {
        cortex_m::interrupt::disable();

        SCB_VTOR.write_volatile(APP_START);
        cortex_m::asm::dsb();
        cortex_m::asm::isb();

        // Loads SP from the first word of the vector table and jumps to
        // the reset vector in the second.
        cortex_m::asm::bootload(APP_START as *const u32)
    }
}
