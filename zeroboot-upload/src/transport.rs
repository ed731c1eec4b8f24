// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Serial transport for the line-oriented loader protocol.

use std::io::{Read, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serialport::SerialPort;

/// Default timeout for serial operations in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// USB CDC transport for communicating with the loader.
pub struct Transport {
    port: Box<dyn SerialPort>,
}

impl Transport {
    /// Open the named serial port with the default timeout.
    pub fn new(port_name: &str) -> Result<Self> {
        let port = serialport::new(port_name, 115_200)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()
            .with_context(|| format!("Failed to open serial port {}", port_name))?;

        Ok(Self { port })
    }

    /// Get the port name.
    pub fn port_name(&self) -> String {
        self.port.name().unwrap_or_else(|| "?".to_string())
    }

    /// Send one command line; the trailing newline is appended here.
    pub fn send_line(&mut self, line: &str) -> Result<()> {
        self.port
            .write_all(line.as_bytes())
            .context("Failed to write to serial port")?;
        self.port.write_all(b"\n")?;
        self.port.flush()?;
        Ok(())
    }

    /// Send raw payload bytes (the body of a WRITE block).
    pub fn send_raw(&mut self, data: &[u8]) -> Result<()> {
        self.port
            .write_all(data)
            .context("Failed to write payload to serial port")?;
        self.port.flush()?;
        Ok(())
    }

    /// Read one LF-terminated reply, stripped of line endings.
    pub fn read_reply(&mut self) -> Result<String> {
        let mut reply = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            match self.port.read(&mut byte) {
                Ok(1) => {
                    if byte[0] == b'\n' {
                        break;
                    }
                    if byte[0] != b'\r' {
                        reply.push(byte[0]);
                    }
                }
                Ok(_) => continue,
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                    bail!("Timeout waiting for reply");
                }
                Err(e) => bail!("Serial read error: {}", e),
            }
        }

        String::from_utf8(reply).context("Loader reply was not valid text")
    }

    /// Read a reply with a one-off timeout (erase can take a while).
    pub fn read_reply_timeout(&mut self, timeout_ms: u64) -> Result<String> {
        let old_timeout = self.port.timeout();
        self.port
            .set_timeout(Duration::from_millis(timeout_ms))
            .context("Failed to set timeout")?;

        let result = self.read_reply();

        let _ = self.port.set_timeout(old_timeout);
        result
    }

    /// Discard any stale bytes sitting in the receive path.
    pub fn drain_rx(&mut self) {
        let mut buf = [0u8; 64];
        let old_timeout = self.port.timeout();
        let _ = self.port.set_timeout(Duration::from_millis(10));
        while self.port.read(&mut buf).unwrap_or(0) > 0 {}
        let _ = self.port.set_timeout(old_timeout);
    }
}
