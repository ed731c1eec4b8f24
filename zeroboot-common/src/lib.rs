// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Hardware-independent core of the ZeroBoot firmware loader.
//!
//! Everything in this crate runs unchanged on the thumbv6m target and on the
//! host, which is where the test suite lives. The loader binary supplies the
//! two effectful halves (NVM programming and the USB CDC link) through the
//! [`protocol::FlashOps`] and [`protocol::Transport`] traits.

#![cfg_attr(not(test), no_std)]

pub mod boot;
pub mod ed25519;
pub mod layout;
pub mod protocol;
pub mod sha256;

pub use protocol::{FlashOps, Flow, Protocol, Reply, Transport};
pub use sha256::Sha256;
