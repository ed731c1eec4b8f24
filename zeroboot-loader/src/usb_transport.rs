// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! USB CDC-ACM transport.
//!
//! The main loop pumps [`UsbTransport::poll`] continuously; received bytes
//! accumulate in a small ring so the protocol can pull exactly one byte
//! per iteration. Replies block until the host drains the TX path, pumping
//! the device while waiting.

use atsamd_hal::usb::UsbBus;
use usb_device::bus::UsbBusAllocator;
use usb_device::prelude::*;
use usbd_serial::SerialPort;
use zeroboot_common::Transport;

const RX_RING_SIZE: usize = 256;

pub struct UsbTransport {
    serial: SerialPort<'static, UsbBus>,
    usb_dev: UsbDevice<'static, UsbBus>,
    rx: [u8; RX_RING_SIZE],
    rx_head: usize,
    rx_tail: usize,
}

impl UsbTransport {
    pub fn new(usb_bus: &'static UsbBusAllocator<UsbBus>) -> Self {
        let serial = SerialPort::new(usb_bus);
        let usb_dev = UsbDeviceBuilder::new(usb_bus, UsbVidPid(0x2341, 0x004D))
            .strings(&[StringDescriptors::default()
                .manufacturer("ZeroBoot")
                .product("SAMD21 CDC")
                .serial_number("00000001")])
            .unwrap()
            .device_class(usbd_serial::USB_CLASS_CDC)
            .build();

        Self {
            serial,
            usb_dev,
            rx: [0u8; RX_RING_SIZE],
            rx_head: 0,
            rx_tail: 0,
        }
    }

    /// Service the device and move freshly received bytes into the ring.
    /// Must be called frequently.
    pub fn poll(&mut self) {
        self.usb_dev.poll(&mut [&mut self.serial]);

        let mut tmp = [0u8; 64];
        while self.rx_space() >= tmp.len() {
            match self.serial.read(&mut tmp) {
                Ok(count) if count > 0 => {
                    for &byte in &tmp[..count] {
                        self.rx[self.rx_head % RX_RING_SIZE] = byte;
                        self.rx_head = self.rx_head.wrapping_add(1);
                    }
                }
                _ => break,
            }
        }
    }

    fn rx_space(&self) -> usize {
        RX_RING_SIZE - self.rx_head.wrapping_sub(self.rx_tail)
    }

    /// Pull at most one byte, in arrival order.
    pub fn read_byte(&mut self) -> Option<u8> {
        if self.rx_head == self.rx_tail {
            return None;
        }
        let byte = self.rx[self.rx_tail % RX_RING_SIZE];
        self.rx_tail = self.rx_tail.wrapping_add(1);
        Some(byte)
    }

    /// Most recent line-coding baud rate requested by the host; the
    /// 1200-baud touch arrives through this value.
    pub fn host_baud(&self) -> u32 {
        self.serial.line_coding().data_rate()
    }

    /// Pump the device until queued reply bytes have gone out on the
    /// wire, bounded so a vanished host cannot wedge the loader.
    pub fn drain(&mut self) {
        for _ in 0..500_000 {
            self.poll();
            if self.serial.flush().is_ok() {
                break;
            }
        }
    }
}

impl Transport for UsbTransport {
    fn write_all(&mut self, data: &[u8]) {
        let mut offset = 0;
        while offset < data.len() {
            match self.serial.write(&data[offset..]) {
                Ok(count) => offset += count,
                Err(UsbError::WouldBlock) => self.poll(),
                Err(_) => break,
            }
        }
    }
}
