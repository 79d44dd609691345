//! Error types for tlprog-core
//!
//! A single error type is shared by the core traits and every programmer
//! backend, so that a dialect can be swapped without changing call sites.

use std::io;

use thiserror::Error;

use crate::programmer::MemoryClass;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// A memory or fuse class was passed to an operation that does not handle it
    #[error("{operation}: unsupported memory class {class}")]
    UnsupportedClass {
        /// Operation that rejected the class
        operation: &'static str,
        /// The rejected class
        class: MemoryClass,
    },

    /// Sending or receiving a frame failed
    #[error("{operation}: transfer failed: {source}")]
    Transfer {
        /// Operation that was exchanging frames
        operation: &'static str,
        /// Underlying transport error
        #[source]
        source: io::Error,
    },

    /// The programmer reported an overcurrent condition on the target socket
    #[error("overcurrent protection triggered")]
    Overcurrent,

    /// No bitstream algorithm could be obtained for the device
    #[error("algorithm unavailable: {0}")]
    AlgorithmUnavailable(String),

    /// Provided buffer is too small for the operation
    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall {
        /// Bytes required
        needed: usize,
        /// Bytes provided
        actual: usize,
    },

    /// Parameter out of range or unparsable
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error raised by an alternate protocol dialect implementation
    #[error("dialect error: {0}")]
    Dialect(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Returns a closure wrapping a transport error for `operation`
    ///
    /// Intended for `map_err`:
    ///
    /// ```ignore
    /// transport.send(&frame).map_err(Error::transfer("end_transaction"))?;
    /// ```
    pub fn transfer(operation: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::Transfer { operation, source }
    }
}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
