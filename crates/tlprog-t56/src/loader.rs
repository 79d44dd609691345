//! FPGA bitstream loader
//!
//! The T56 FPGA must be configured with the right algorithm before a session
//! can be opened. Reconfiguring is slow and the configuration survives
//! across sessions, so the loader uploads once and then remembers it in an
//! [`UploadLatch`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tlprog_core::algorithm::{Algorithm, AlgorithmRequest, AlgorithmSource};
use tlprog_core::error::{Error, Result};

use crate::protocol::bitstream_header;
use crate::transport::Transport;

/// Records whether a bitstream has been uploaded
///
/// Each loader starts with its own latch. Sessions that drive the same
/// physical programmer can share one by cloning it.
#[derive(Debug, Clone, Default)]
pub struct UploadLatch(Arc<AtomicBool>);

impl UploadLatch {
    /// Create a cleared latch
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a bitstream has been uploaded
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Forget the upload, e.g. after the programmer was reconnected
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }

    fn set(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Fetches algorithms and uploads them at most once per latch
pub struct BitstreamLoader {
    source: Box<dyn AlgorithmSource>,
    latch: UploadLatch,
}

impl BitstreamLoader {
    /// Create a loader with a fresh latch
    pub fn new(source: impl AlgorithmSource + 'static) -> Self {
        Self::with_latch(source, UploadLatch::new())
    }

    /// Create a loader sharing an existing latch
    pub fn with_latch(source: impl AlgorithmSource + 'static, latch: UploadLatch) -> Self {
        Self {
            source: Box::new(source),
            latch,
        }
    }

    /// The loader's latch
    pub fn latch(&self) -> &UploadLatch {
        &self.latch
    }

    /// Upload the algorithm for `request` unless one was already uploaded
    ///
    /// The latch is set only after the header and the payload were both
    /// sent; any failure leaves it clear so the next session retries.
    pub fn ensure_uploaded<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        request: &AlgorithmRequest,
    ) -> Result<()> {
        if self.latch.is_set() {
            log::debug!("t56: bitstream already uploaded, skipping");
            return Ok(());
        }

        let algorithm = self.source.fetch(request)?;
        log::info!("Using {} algorithm..", algorithm.name);

        upload(transport, algorithm)?;
        self.latch.set();
        Ok(())
    }
}

/// Send the upload header followed by the payload
///
/// Takes the algorithm by value: the payload is released when this returns,
/// whichever way it returns.
fn upload<T: Transport + ?Sized>(transport: &mut T, algorithm: Algorithm) -> Result<()> {
    let len = u32::try_from(algorithm.len()).map_err(|_| {
        Error::InvalidParameter(format!(
            "algorithm {} is too large ({} bytes)",
            algorithm.name,
            algorithm.len()
        ))
    })?;

    log::debug!("t56: uploading {} bytes of bitstream", len);
    transport
        .send(&bitstream_header(len))
        .map_err(Error::transfer("write_bitstream"))?;
    transport
        .send(&algorithm.bitstream)
        .map_err(Error::transfer("write_bitstream"))?;
    Ok(())
}
