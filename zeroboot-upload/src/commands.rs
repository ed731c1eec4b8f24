// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command implementations for loader operations.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use crc::{Crc, CRC_32_ISO_HDLC};
use indicatif::{ProgressBar, ProgressStyle};
use zeroboot_common::Sha256;

use crate::transport::Transport;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Bytes per WRITE block.
const CHUNK_SIZE: usize = 1024;

/// Erasing the whole application region takes the loader a while.
const ERASE_TIMEOUT_MS: u64 = 30_000;

/// Query and display the loader banner.
pub fn hello(transport: &mut Transport) -> Result<()> {
    transport.drain_rx();
    transport.send_line("HELLO")?;
    let reply = transport.read_reply()?;

    if let Some(version) = reply.strip_prefix("OK BOOT ") {
        println!("Loader {} on {}", version, transport.port_name());
    } else {
        bail!("Unexpected reply: {:?}", reply);
    }
    Ok(())
}

/// Erase the application region.
pub fn erase(transport: &mut Transport) -> Result<()> {
    transport.drain_rx();
    print!("Erasing application region... ");
    std::io::stdout().flush()?;

    transport.send_line("ERASE APP")?;
    let reply = transport.read_reply_timeout(ERASE_TIMEOUT_MS)?;
    if reply != "OK ERASE" {
        bail!("Erase failed: {:?}", reply);
    }
    println!("OK");
    Ok(())
}

/// Erase, stream the image block by block, then finalize with `DONE`.
pub fn upload(
    transport: &mut Transport,
    file: &Path,
    signature_file: &Path,
    address: u32,
) -> Result<()> {
    let firmware =
        fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    if firmware.is_empty() {
        bail!("{} is empty", file.display());
    }
    let signature = read_signature(signature_file)?;

    let mut hasher = Sha256::new();
    hasher.update(&firmware);
    let digest = hasher.finalize();

    println!(
        "Firmware: {} ({} bytes, SHA-256 {})",
        file.display(),
        firmware.len(),
        to_hex(&digest)
    );
    println!("Target:   0x{:08X}", address);
    println!();

    erase(transport)?;

    let progress = ProgressBar::new(firmware.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    let mut addr = address;
    for chunk in firmware.chunks(CHUNK_SIZE) {
        let crc = CRC32.checksum(chunk);
        transport.send_line(&format!("WRITE 0x{:X} {} 0x{:08X}", addr, chunk.len(), crc))?;
        transport.send_raw(chunk)?;

        let reply = transport.read_reply()?;
        if reply != "OK WRITE" {
            progress.abandon();
            bail!("Block at 0x{:X} failed: {:?}", addr, reply);
        }

        addr += chunk.len() as u32;
        progress.set_position((addr - address) as u64);
    }
    progress.finish_with_message("Upload complete");
    println!();

    print!("Verifying signature... ");
    std::io::stdout().flush()?;

    transport.send_line(&format!("DONE {}", to_hex(&signature)))?;
    let reply = transport.read_reply()?;
    match reply.as_str() {
        "OK DONE" => {
            println!("OK");
            println!();
            println!("Image authenticated; the device is booting the application.");
        }
        "ERR SIGNATURE" => bail!("The loader rejected the signature"),
        other => bail!("Unexpected reply: {:?}", other),
    }

    Ok(())
}

/// Load a detached signature: 64 raw bytes, or 128 hex characters with
/// optional whitespace. Decodes over the raw bytes so a file that is not
/// valid UTF-8 fails cleanly instead of tripping up a string rebuild.
fn read_signature(path: &Path) -> Result<[u8; 64]> {
    let raw = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let mut signature = [0u8; 64];
    if raw.len() == 64 {
        signature.copy_from_slice(&raw);
        return Ok(signature);
    }

    let hex: Vec<u8> = raw
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if hex.len() != 128 {
        bail!(
            "{} must hold 64 raw bytes or 128 hex characters",
            path.display()
        );
    }
    for (out, pair) in signature.iter_mut().zip(hex.chunks_exact(2)) {
        let (Some(hi), Some(lo)) = (hex_value(pair[0]), hex_value(pair[1])) else {
            bail!("Invalid hex in {}", path.display());
        };
        *out = (hi << 4) | lo;
    }
    Ok(signature)
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|v| v as u8)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::{read_signature, to_hex};
    use std::path::PathBuf;

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[0x00, 0xAB, 0x10]), "00ab10");
    }

    fn write_temp(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "zeroboot-upload-test-{}-{name}",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_signature_raw_bytes() {
        let sig: Vec<u8> = (0u8..64).collect();
        let path = write_temp("raw.sig", &sig);
        assert_eq!(read_signature(&path).unwrap().to_vec(), sig);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_read_signature_hex_with_whitespace() {
        let sig: Vec<u8> = (0u8..64).map(|i| i * 3).collect();
        let mut text = to_hex(&sig);
        text.insert(64, '\n');
        text.push('\n');
        let path = write_temp("hex.sig", text.as_bytes());
        assert_eq!(read_signature(&path).unwrap().to_vec(), sig);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_read_signature_rejects_wrong_length() {
        let path = write_temp("short.sig", b"0011223344");
        assert!(read_signature(&path).is_err());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_read_signature_rejects_non_hex() {
        let text = "zz".repeat(64);
        let path = write_temp("nonhex.sig", text.as_bytes());
        assert!(read_signature(&path).is_err());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_read_signature_rejects_non_utf8() {
        // 127 hex chars plus one invalid byte: 128 bytes that are not
        // valid UTF-8. Must report an error, never panic.
        let mut contents = vec![b'a'; 127];
        contents.push(0xFF);
        let path = write_temp("binary.sig", &contents);
        assert!(read_signature(&path).is_err());
        std::fs::remove_file(path).ok();
    }
}
