// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Firmware upload tool for the ZeroBoot loader via USB CDC.
//!
//! Usage:
//!   zeroboot-upload --port /dev/ttyACM0 hello
//!   zeroboot-upload --port /dev/ttyACM0 erase
//!   zeroboot-upload --port /dev/ttyACM0 upload firmware.bin --signature firmware.sig

mod cli;
mod commands;
mod transport;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    cli::run(args)
}
