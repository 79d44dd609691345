//! T56 device implementation
//!
//! This module provides the `T56` struct, which drives a T56 programmer over
//! a [`Transport`] using the native fixed-frame protocol.

use tlprog_core::algorithm::{AlgorithmRequest, AlgorithmSource};
use tlprog_core::device::Device;
use tlprog_core::error::{Error, Result};
use tlprog_core::programmer::{ChipId, MemoryClass, Programmer, SpiPackage, StatusReport};

use crate::config::T56Config;
use crate::loader::{BitstreamLoader, UploadLatch};
use crate::protocol::{
    begin_transaction_frame, decode_status, opcode_frame, Opcode, RESPONSE_LEN,
};
use crate::transport::Transport;
use crate::{block, fuses, ident, jedec};

/// Session state of a T56 connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session open
    #[default]
    Idle,
    /// Session opened by a successful `begin`
    Open,
    /// `begin` tripped the overcurrent protection
    Failed,
}

/// T56 programmer speaking the native protocol
///
/// Every operation is sent as native frames. Devices flagged
/// `CUSTOM_PROTOCOL` must be driven through [`Session`](crate::Session),
/// which routes their operations to the alternate dialect.
pub struct T56<T: Transport> {
    transport: T,
    device: Device,
    config: T56Config,
    loader: BitstreamLoader,
    state: SessionState,
}

impl<T: Transport> T56<T> {
    /// Create a T56 for `device` with its own upload latch
    pub fn new(
        transport: T,
        device: Device,
        source: impl AlgorithmSource + 'static,
        config: T56Config,
    ) -> Self {
        Self::with_loader(transport, device, BitstreamLoader::new(source), config)
    }

    /// Create a T56 around an existing loader
    ///
    /// Use this with [`BitstreamLoader::with_latch`] to share the upload latch
    /// of another session on the same programmer.
    pub fn with_loader(
        transport: T,
        device: Device,
        loader: BitstreamLoader,
        config: T56Config,
    ) -> Self {
        log::debug!(
            "t56: {} (protocol 0x{:02X}, algorithm 0x{:02X})",
            device.name,
            device.protocol_id,
            device.algorithm_number()
        );
        if device.uses_alternate_dialect() {
            log::warn!(
                "t56: {} uses the alternate protocol, drive it through a Session",
                device.name
            );
        }
        Self {
            transport,
            device,
            config,
            loader,
            state: SessionState::Idle,
        }
    }

    /// The device descriptor this session programs
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Session configuration
    pub fn config(&self) -> &T56Config {
        &self.config
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Upload latch of this session's loader
    pub fn upload_latch(&self) -> &UploadLatch {
        self.loader.latch()
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the session, returning the transport
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Poll the programmer status
    ///
    /// The detailed record is only decoded for devices using the native
    /// protocol; the overcurrent flag is always reported.
    pub fn poll_status(&mut self, want_record: bool) -> Result<StatusReport> {
        self.transport
            .send(&opcode_frame(Opcode::RequestStatus))
            .map_err(Error::transfer("status"))?;

        let mut response = [0u8; RESPONSE_LEN];
        self.transport
            .receive(&mut response)
            .map_err(Error::transfer("status"))?;

        let want_record = want_record && !self.device.uses_alternate_dialect();
        Ok(decode_status(&response, want_record))
    }

    /// Open a session: upload the bitstream, run `open`, check overcurrent
    ///
    /// `open` sends the dialect's session-open command.
    pub(crate) fn open_session<F>(&mut self, open: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let request = self.algorithm_request();
        if let Err(e) = self.loader.ensure_uploaded(&mut self.transport, &request) {
            log::error!("t56: an error occurred while sending bitstream: {}", e);
            return Err(e);
        }

        open(self)?;

        if self.poll_status(false)?.overcurrent {
            log::error!("Overcurrent protection!");
            self.state = SessionState::Failed;
            return Err(Error::Overcurrent);
        }

        log::debug!("t56: session open");
        self.state = SessionState::Open;
        Ok(())
    }

    pub(crate) fn close_session(&mut self) {
        log::debug!("t56: session closed");
        self.state = SessionState::Idle;
    }

    /// Log calls made outside an open session
    pub(crate) fn note_session(&self, operation: &str) {
        if self.state != SessionState::Open {
            log::debug!(
                "t56: {} called outside an open session ({:?})",
                operation,
                self.state
            );
        }
    }

    fn algorithm_request(&self) -> AlgorithmRequest {
        AlgorithmRequest::for_device(
            &self.device,
            self.config.icsp.as_byte(),
            self.config.voltage_option,
        )
    }

    fn send_begin_frame(&mut self) -> Result<()> {
        let frame = begin_transaction_frame(&self.device, self.config.icsp.as_byte());
        self.transport
            .send(&frame)
            .map_err(Error::transfer("begin_transaction"))
    }
}

impl<T: Transport> Programmer for T56<T> {
    fn begin(&mut self) -> Result<()> {
        self.open_session(Self::send_begin_frame)
    }

    fn end(&mut self) -> Result<()> {
        self.note_session("end");
        self.transport
            .send(&opcode_frame(Opcode::EndTrans))
            .map_err(Error::transfer("end_transaction"))?;
        self.close_session();
        Ok(())
    }

    fn read_block(&mut self, class: MemoryClass, addr: u32, buf: &mut [u8]) -> Result<()> {
        self.note_session("read_block");
        block::read_block(&mut self.transport, class, addr, buf)
    }

    fn write_block(&mut self, class: MemoryClass, addr: u32, len: u16, data: &[u8]) -> Result<()> {
        self.note_session("write_block");
        block::write_block(
            &mut self.transport,
            self.device.write_buffer_size,
            class,
            addr,
            len,
            data,
        )
    }

    fn read_fuses(&mut self, class: MemoryClass, items: u8, buf: &mut [u8]) -> Result<()> {
        self.note_session("read_fuses");
        fuses::read_fuses(&mut self.transport, &self.device, class, items, buf)
    }

    fn write_fuses(&mut self, class: MemoryClass, items: u8, data: Option<&[u8]>) -> Result<()> {
        self.note_session("write_fuses");
        fuses::write_fuses(&mut self.transport, &self.device, class, items, data)
    }

    fn read_calibration(&mut self, buf: &mut [u8]) -> Result<()> {
        self.note_session("read_calibration");
        ident::read_calibration(&mut self.transport, buf)
    }

    fn chip_id(&mut self) -> Result<ChipId> {
        self.note_session("chip_id");
        ident::chip_id(&mut self.transport, self.device.chip_id_bytes_count)
    }

    /// Identify an unknown SPI flash
    ///
    /// Loads the autodetection bitstream unless a bitstream is already
    /// loaded. The session's device descriptor is left untouched.
    fn spi_autodetect(&mut self, package: SpiPackage) -> Result<u32> {
        let request = ident::autodetect_request(
            package,
            self.config.icsp.as_byte(),
            self.config.voltage_option,
        );
        if let Err(e) = self.loader.ensure_uploaded(&mut self.transport, &request) {
            log::error!("t56: an error occurred while sending bitstream: {}", e);
            return Err(e);
        }
        ident::detect_spi(&mut self.transport, package)
    }

    fn protect_off(&mut self) -> Result<()> {
        self.note_session("protect_off");
        fuses::protect_off(&mut self.transport)
    }

    fn protect_on(&mut self) -> Result<()> {
        self.note_session("protect_on");
        fuses::protect_on(&mut self.transport)
    }

    fn erase(&mut self) -> Result<()> {
        self.note_session("erase");
        fuses::erase(&mut self.transport, &self.device)
    }

    fn read_jedec_row(&mut self, row: u8, flags: u8, bit_size: u8, buf: &mut [u8]) -> Result<()> {
        self.note_session("read_jedec_row");
        jedec::read_jedec_row(
            &mut self.transport,
            self.device.protocol_id,
            row,
            flags,
            bit_size,
            buf,
        )
    }

    fn write_jedec_row(&mut self, row: u8, flags: u8, bit_size: u8, data: &[u8]) -> Result<()> {
        self.note_session("write_jedec_row");
        jedec::write_jedec_row(
            &mut self.transport,
            self.device.protocol_id,
            row,
            flags,
            bit_size,
            data,
        )
    }

    fn status(&mut self, want_record: bool) -> Result<StatusReport> {
        self.poll_status(want_record)
    }
}
