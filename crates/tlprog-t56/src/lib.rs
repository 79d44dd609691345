//! tlprog-t56 - T56 universal programmer support
//!
//! This crate translates the [`Programmer`](tlprog_core::programmer::Programmer)
//! operations into the T56's fixed-frame binary command set and decodes the
//! responses.
//!
//! # Protocol Overview
//!
//! Every command is a fixed-size frame (8, 10, 15 or 64 bytes) with the opcode
//! in byte 0; responses are 16, 32 or 64 bytes. Before the first session the
//! FPGA is configured with a device-family bitstream fetched from an
//! [`AlgorithmSource`](tlprog_core::algorithm::AlgorithmSource). The upload
//! is remembered in an [`UploadLatch`] and skipped afterwards.
//!
//! Chips flagged with `CUSTOM_PROTOCOL` are driven by an alternate dialect
//! supplied by the caller. [`Session`] picks the dialect once and dispatches
//! every operation to it, keeping bitstream upload, overcurrent detection and
//! status polls on the native link.
//!
//! # Example
//!
//! ```ignore
//! use tlprog_core::programmer::{MemoryClass, Programmer};
//! use tlprog_t56::{parse_options, Session, T56};
//!
//! let config = parse_options(&[("icsp", "vcc")])?;
//! let t56 = T56::new(usb_transport, device, algorithm_archive, config);
//! let mut session = Session::select(t56, None)?;
//!
//! let mut buf = vec![0u8; 0x400];
//! session.begin()?;
//! session.read_block(MemoryClass::Code, 0, &mut buf)?;
//! session.end()?;
//! ```
//!
//! # Configuration Options
//!
//! - `icsp=off|vcc|novcc`: In-circuit programming mode
//! - `vopt=N`: Voltage option handed to the algorithm source

mod block;
mod config;
mod device;
mod dialect;
mod fuses;
mod ident;
mod jedec;
mod loader;
mod protocol;
mod transport;

#[cfg(test)]
mod testutil;

use tlprog_core::programmer::ProgrammerInfo;

pub use config::{parse_options, T56Config};
pub use device::{SessionState, T56};
pub use dialect::Session;
pub use loader::{BitstreamLoader, UploadLatch};
pub use protocol::Opcode;
pub use transport::Transport;

/// Programmer registration info
pub const PROGRAMMER_INFO: ProgrammerInfo = ProgrammerInfo {
    name: "t56",
    aliases: &["xgecu-t56"],
    description: "XGecu T56 universal programmer (native protocol)",
};
