// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! ZeroBoot: resident USB CDC firmware loader for the ATSAMD21G18A.
//!
//! On reset the loader jumps straight to the application when one is
//! installed and authenticated, unless the host holds the virtual serial
//! port open at 1200 baud. While resident it speaks the line protocol
//! implemented in `zeroboot-common`, erasing and reprogramming the
//! application region and verifying the image signature before handing
//! over control.

#![no_std]
#![no_main]

mod boot;
mod flash;
mod peripherals;
mod usb_transport;

use cortex_m_rt::entry;
use defmt_rtt as _;
use panic_probe as _;

use usb_transport::UsbTransport;
use zeroboot_common::boot::stay_resident;
use zeroboot_common::ed25519::SIGNER_PUBLIC_KEY;
use zeroboot_common::{Flow, Protocol};

defmt::timestamp!("{=u64:us}", { 0 });

#[entry]
fn main() -> ! {
    defmt::println!("ZeroBoot init");

    let usb_bus = peripherals::init();
    let mut nvm = flash::Nvm::init();
    let mut transport = UsbTransport::new(usb_bus);

    if !stay_resident(transport.host_baud(), boot::valid_marker()) {
        defmt::println!("Valid application found, launching");
        boot::launch_application();
    }

    defmt::println!("Resident: waiting for host commands");
    let mut protocol = Protocol::new(SIGNER_PUBLIC_KEY);

    loop {
        transport.poll();
        if let Some(byte) = transport.read_byte() {
            match protocol.process_byte(byte, &mut nvm, &mut transport) {
                Flow::Continue => {}
                Flow::Launch => {
                    // Let the OK DONE reply reach the host before the
                    // port disappears.
                    transport.drain();
                    defmt::println!("Image authenticated, launching");
                    boot::launch_application();
                }
            }
        }
    }
}
