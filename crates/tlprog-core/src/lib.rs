//! tlprog-core - Core library for TL-series chip programmers
//!
//! This crate holds the pieces shared by every programmer backend:
//!
//! - [`device::Device`]: the per-chip descriptor supplied by the device database
//! - [`algorithm`]: the FPGA bitstream payload and the trait used to fetch it
//! - [`programmer::Programmer`]: the operation set every protocol dialect implements
//! - [`error::Error`]: the error type returned by all of the above
//!
//! # Example
//!
//! ```ignore
//! use tlprog_core::programmer::{MemoryClass, Programmer};
//!
//! fn dump_code<P: Programmer>(prog: &mut P, size: usize) -> tlprog_core::Result<Vec<u8>> {
//!     let mut buf = vec![0u8; size];
//!     prog.begin()?;
//!     prog.read_block(MemoryClass::Code, 0, &mut buf)?;
//!     prog.end()?;
//!     Ok(buf)
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod algorithm;
pub mod device;
pub mod error;
pub mod programmer;

pub use error::{Error, Result};
