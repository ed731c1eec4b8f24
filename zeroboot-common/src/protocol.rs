// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Line-oriented host protocol with an embedded binary payload window.
//!
//! Commands arrive as LF-terminated ASCII lines:
//!
//! ```text
//! HELLO\n                          -> OK BOOT v1.0\n
//! ERASE APP\n                      -> OK ERASE\n
//! WRITE <addr> <len> <crc32>\n     followed by <len> raw payload bytes;
//!                                  the reply is sent once the block has
//!                                  been programmed and its CRC checked.
//! DONE <128 hex chars>\n           -> verifies the Ed25519 signature of
//!                                  the image hash and requests the jump
//!                                  to the application on success.
//! ```
//!
//! The machine owns no hardware: flash programming and the reply channel
//! are injected through [`FlashOps`] and [`Transport`], which keeps the
//! whole protocol testable on the host.

use core::fmt::Write as _;

use crc::{Crc, CRC_32_ISO_HDLC};
use heapless::{String, Vec};

use crate::ed25519;
use crate::layout::{write_in_app_window, PAGE_SIZE};
use crate::sha256::Sha256;

pub const VERSION_MAJOR: u8 = 1;
pub const VERSION_MINOR: u8 = 0;

/// Maximum length of a single command line, excluding binary payload.
pub const CMD_BUF_SIZE: usize = 128;

/// IEEE 802.3 CRC-32, computed incrementally over each payload block.
static CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Flash effects required by the protocol. Implemented by the NVM engine
/// in the loader and by an in-memory fake in the test suite.
pub trait FlashOps {
    /// Erase every row of the application region.
    fn erase_application(&mut self);
    /// Program `data` starting at the page-aligned address `addr`; a
    /// partial final page is padded with 0xFF.
    fn program(&mut self, addr: u32, data: &[u8]);
    /// Write the application-valid magic into the marker word.
    fn set_app_valid(&mut self);
}

/// Reply channel back to the host.
pub trait Transport {
    fn write_all(&mut self, data: &[u8]);
}

/// Fixed replies on the wire. The `HELLO` banner carries the version and
/// is formatted separately.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    OkErase,
    OkWrite,
    OkDone,
    ErrCrc,
    ErrParam,
    ErrFormat,
    ErrSignature,
    ErrUnknown,
}

impl Reply {
    pub const fn as_bytes(self) -> &'static [u8] {
        match self {
            Reply::OkErase => b"OK ERASE\n",
            Reply::OkWrite => b"OK WRITE\n",
            Reply::OkDone => b"OK DONE\n",
            Reply::ErrCrc => b"ERR CRC\n",
            Reply::ErrParam => b"ERR PARAM\n",
            Reply::ErrFormat => b"ERR FORMAT\n",
            Reply::ErrSignature => b"ERR SIGNATURE\n",
            Reply::ErrUnknown => b"ERR UNKNOWN\n",
        }
    }
}

/// Tells the main loop whether to keep feeding bytes or hand control to
/// the freshly authenticated application.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Launch,
}

/// State of one `WRITE` transaction, alive from the command line until the
/// terminal reply.
struct WriteTransfer {
    dst_addr: u32,
    expected_len: u32,
    expected_crc: u32,
    received: u32,
    crc: crc::Digest<'static, u32>,
    page: Vec<u8, PAGE_SIZE>,
}

enum State {
    WaitCmd,
    WriteData(WriteTransfer),
}

/// The protocol state machine. One instance lives for the whole resident
/// session.
pub struct Protocol {
    state: State,
    cmd: Vec<u8, CMD_BUF_SIZE>,
    hasher: Sha256,
    public_key: [u8; 32],
}

impl Protocol {
    pub fn new(public_key: [u8; 32]) -> Self {
        Self {
            state: State::WaitCmd,
            cmd: Vec::new(),
            hasher: Sha256::new(),
            public_key,
        }
    }

    /// Feed one byte from the host. Bytes must be delivered in arrival
    /// order; the caller performs the jump when `Flow::Launch` is
    /// returned.
    pub fn process_byte<F: FlashOps, T: Transport>(
        &mut self,
        byte: u8,
        flash: &mut F,
        link: &mut T,
    ) -> Flow {
        match core::mem::replace(&mut self.state, State::WaitCmd) {
            State::WriteData(xfer) => {
                self.receive_payload_byte(byte, xfer, flash, link);
                Flow::Continue
            }
            State::WaitCmd => self.receive_command_byte(byte, flash, link),
        }
    }

    fn receive_command_byte<F: FlashOps, T: Transport>(
        &mut self,
        byte: u8,
        flash: &mut F,
        link: &mut T,
    ) -> Flow {
        match byte {
            b'\n' => {
                let flow = self.dispatch_line(flash, link);
                self.cmd.clear();
                flow
            }
            b'\r' => Flow::Continue,
            _ => {
                if self.cmd.push(byte).is_err() {
                    // Overflow: drop the line accumulated so far.
                    self.cmd.clear();
                }
                Flow::Continue
            }
        }
    }

    fn dispatch_line<F: FlashOps, T: Transport>(&mut self, flash: &mut F, link: &mut T) -> Flow {
        let cmd_copy: Vec<u8, CMD_BUF_SIZE> = self.cmd.clone();
        let Ok(line) = core::str::from_utf8(&cmd_copy) else {
            link.write_all(Reply::ErrUnknown.as_bytes());
            return Flow::Continue;
        };

        if line == "HELLO" {
            let mut banner: String<24> = String::new();
            let _ = write!(banner, "OK BOOT v{}.{}\n", VERSION_MAJOR, VERSION_MINOR);
            link.write_all(banner.as_bytes());
            Flow::Continue
        } else if line == "ERASE APP" {
            flash.erase_application();
            // A new image begins with the erase.
            self.hasher = Sha256::new();
            link.write_all(Reply::OkErase.as_bytes());
            Flow::Continue
        } else if let Some(args) = line.strip_prefix("WRITE ") {
            self.start_write(args, link);
            Flow::Continue
        } else if let Some(sig_hex) = line.strip_prefix("DONE ") {
            self.finish_image(sig_hex, flash, link)
        } else {
            link.write_all(Reply::ErrUnknown.as_bytes());
            Flow::Continue
        }
    }

    /// Parse `WRITE` arguments and open the binary payload window. No
    /// reply yet on success; it follows once the block is complete.
    fn start_write<T: Transport>(&mut self, args: &str, link: &mut T) {
        let mut fields = args.split(' ').filter(|f| !f.is_empty());
        let (Some(addr_s), Some(len_s), Some(crc_s)) =
            (fields.next(), fields.next(), fields.next())
        else {
            link.write_all(Reply::ErrFormat.as_bytes());
            return;
        };

        let addr = parse_number(addr_s);
        let len = parse_number(len_s);
        let crc = parse_number(crc_s);

        if !write_in_app_window(addr, len) {
            link.write_all(Reply::ErrParam.as_bytes());
            return;
        }

        if len == 0 {
            // Nothing to receive or program; judge the declared CRC
            // against the CRC of the empty sequence.
            let empty = CRC32.digest().finalize();
            let reply = if crc == empty { Reply::OkWrite } else { Reply::ErrCrc };
            link.write_all(reply.as_bytes());
            return;
        }

        self.state = State::WriteData(WriteTransfer {
            dst_addr: addr,
            expected_len: len,
            expected_crc: crc,
            received: 0,
            crc: CRC32.digest(),
            page: Vec::new(),
        });
    }

    /// One binary payload byte: fan out to the block CRC, the image hash,
    /// and the page accumulator; program on page boundaries and on block
    /// completion.
    fn receive_payload_byte<F: FlashOps, T: Transport>(
        &mut self,
        byte: u8,
        mut xfer: WriteTransfer,
        flash: &mut F,
        link: &mut T,
    ) {
        xfer.crc.update(&[byte]);
        self.hasher.update(&[byte]);
        let _ = xfer.page.push(byte);
        xfer.received += 1;

        if xfer.page.is_full() {
            flash.program(xfer.dst_addr, &xfer.page);
            xfer.dst_addr += PAGE_SIZE as u32;
            xfer.page.clear();
        }

        if xfer.received < xfer.expected_len {
            self.state = State::WriteData(xfer);
            return;
        }

        // Block complete: flush the partial page, then report the CRC
        // verdict. The bytes are committed either way; on a mismatch the
        // host re-erases and resends.
        if !xfer.page.is_empty() {
            flash.program(xfer.dst_addr, &xfer.page);
        }
        let reply = if xfer.crc.finalize() == xfer.expected_crc {
            Reply::OkWrite
        } else {
            Reply::ErrCrc
        };
        link.write_all(reply.as_bytes());
    }

    /// Decode the signature, finalize the image hash, and verify. On
    /// success the valid marker is written and the caller is told to
    /// jump; the reply goes out first so the host sees it before the
    /// port disappears.
    fn finish_image<F: FlashOps, T: Transport>(
        &mut self,
        sig_hex: &str,
        flash: &mut F,
        link: &mut T,
    ) -> Flow {
        let Some(signature) = decode_signature(sig_hex) else {
            link.write_all(Reply::ErrFormat.as_bytes());
            return Flow::Continue;
        };

        let hasher = core::mem::replace(&mut self.hasher, Sha256::new());
        let digest = hasher.finalize();

        if ed25519::verify(&signature, &self.public_key, &digest) {
            link.write_all(Reply::OkDone.as_bytes());
            flash.set_app_valid();
            Flow::Launch
        } else {
            link.write_all(Reply::ErrSignature.as_bytes());
            Flow::Continue
        }
    }
}

/// `strtoul(s, NULL, 0)` semantics: optional sign (ignored here, the
/// protocol only carries unsigned values), `0x`/`0X` prefix for hex, a
/// leading `0` for octal, decimal otherwise. Parsing stops at the first
/// non-digit; a token without digits yields 0.
fn parse_number(token: &str) -> u32 {
    let bytes = token.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let radix = if bytes[i..].starts_with(b"0x") || bytes[i..].starts_with(b"0X") {
        i += 2;
        16
    } else if bytes.get(i) == Some(&b'0') {
        i += 1;
        8
    } else {
        10
    };

    let mut value: u32 = 0;
    while let Some(digit) = bytes.get(i).and_then(|&c| (c as char).to_digit(radix)) {
        value = value.wrapping_mul(radix).wrapping_add(digit);
        i += 1;
    }
    value
}

/// Decode exactly 128 hex characters into the 64 signature bytes.
fn decode_signature(hex: &str) -> Option<[u8; 64]> {
    let bytes = hex.as_bytes();
    if bytes.len() != 128 {
        return None;
    }
    let mut sig = [0u8; 64];
    for (out, pair) in sig.iter_mut().zip(bytes.chunks_exact(2)) {
        let hi = (pair[0] as char).to_digit(16)?;
        let lo = (pair[1] as char).to_digit(16)?;
        *out = ((hi << 4) | lo) as u8;
    }
    Some(sig)
}

#[cfg(test)]
mod tests {
    use super::{decode_signature, parse_number};

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_number("12345"), 12345);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_number("0x4000"), 0x4000);
        assert_eq!(parse_number("0XDEADBEEF"), 0xDEAD_BEEF);
    }

    #[test]
    fn test_parse_octal() {
        assert_eq!(parse_number("0777"), 0o777);
        assert_eq!(parse_number("0"), 0);
    }

    #[test]
    fn test_parse_stops_at_first_non_digit() {
        assert_eq!(parse_number("42xyz"), 42);
        assert_eq!(parse_number("0x10g"), 0x10);
    }

    #[test]
    fn test_parse_sign_is_ignored() {
        assert_eq!(parse_number("-7"), 7);
        assert_eq!(parse_number("+0x20"), 0x20);
    }

    #[test]
    fn test_parse_no_digits_is_zero() {
        assert_eq!(parse_number("zzz"), 0);
        assert_eq!(parse_number(""), 0);
        assert_eq!(parse_number("0x"), 0);
    }

    #[test]
    fn test_decode_signature_round_trip() {
        let hex: String = (0..64).map(|i| format!("{i:02x}")).collect();
        let sig = decode_signature(&hex).unwrap();
        for (i, b) in sig.iter().enumerate() {
            assert_eq!(*b as usize, i);
        }
    }

    #[test]
    fn test_decode_signature_rejects_bad_length() {
        assert!(decode_signature("ab").is_none());
        assert!(decode_signature(&"ab".repeat(65)).is_none());
    }

    #[test]
    fn test_decode_signature_rejects_non_hex() {
        let mut hex = "ab".repeat(64);
        hex.replace_range(10..11, "g");
        assert!(decode_signature(&hex).is_none());
    }
}
