// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line interface definitions.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use crate::transport::Transport;

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "zeroboot-upload")]
#[command(about = "Firmware upload tool for the ZeroBoot loader")]
pub struct Cli {
    /// Serial port (e.g., /dev/ttyACM0)
    #[arg(short, long)]
    pub port: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Query the loader version banner
    Hello,

    /// Erase the application region
    Erase,

    /// Erase, stream a firmware image, and finalize with its signature
    Upload {
        /// Firmware binary file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Ed25519 signature over the image's SHA-256 digest: a file
        /// holding either 64 raw bytes or 128 hex characters
        #[arg(short, long, value_name = "SIG")]
        signature: PathBuf,

        /// Load address (decimal or 0x-prefixed hex)
        #[arg(short, long, default_value = "0x4000", value_parser = parse_address)]
        address: u32,
    },
}

fn parse_address(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address {s:?}: {e}"))
}

/// Execute the parsed CLI command.
pub fn run(cli: Cli) -> Result<()> {
    let mut transport = Transport::new(&cli.port)?;

    match cli.command {
        Commands::Hello => commands::hello(&mut transport),
        Commands::Erase => commands::erase(&mut transport),
        Commands::Upload {
            file,
            signature,
            address,
        } => commands::upload(&mut transport, &file, &signature, address),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_address;

    #[test]
    fn test_parse_address_hex_and_decimal() {
        assert_eq!(parse_address("0x4000").unwrap(), 0x4000);
        assert_eq!(parse_address("16384").unwrap(), 16384);
    }

    #[test]
    fn test_parse_address_rejects_garbage() {
        assert!(parse_address("0xzz").is_err());
        assert!(parse_address("four").is_err());
    }
}
