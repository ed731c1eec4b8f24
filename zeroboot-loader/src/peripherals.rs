// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Clock and USB peripheral bring-up.
//!
//! The board follows the Arduino-Zero arrangement: XOSC32K feeds GCLK1,
//! which references the DFLL48M in closed-loop mode; GCLK0 then runs core
//! and USB at 48 MHz.

use atsamd_hal as hal;
use hal::clock::GenericClockController;
use hal::pac;
use hal::usb::UsbBus;
use usb_device::bus::UsbBusAllocator;

/// Static storage for the bus allocator; `usb-device` requires the
/// allocator to outlive the device and class handles.
static mut USB_BUS: Option<UsbBusAllocator<UsbBus>> = None;

/// Bring up clocks and the USB bus. Called exactly once from `main`.
pub fn init() -> &'static UsbBusAllocator<UsbBus> {
    let mut peripherals = pac::Peripherals::take().unwrap();

    let mut clocks = GenericClockController::with_external_32kosc(
        peripherals.gclk,
        &mut peripherals.pm,
        &mut peripherals.sysctrl,
        &mut peripherals.nvmctrl,
    );

    let pins = hal::gpio::Pins::new(peripherals.port);

    let usb_gclk = clocks.gclk0();
    let usb_clock = clocks.usb(&usb_gclk).unwrap();

    let allocator = UsbBusAllocator::new(UsbBus::new(
        &usb_clock,
        &mut peripherals.pm,
        pins.pa24,
        pins.pa25,
        peripherals.usb,
    ));

    unsafe {
        USB_BUS = Some(allocator);
        (*core::ptr::addr_of!(USB_BUS)).as_ref().unwrap()
    }
}
