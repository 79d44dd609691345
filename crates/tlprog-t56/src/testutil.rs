//! Test doubles shared by the unit tests

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use tlprog_core::algorithm::{Algorithm, AlgorithmRequest, AlgorithmSource};
use tlprog_core::device::{Device, FuseLayout, PackageDetails, Voltages};
use tlprog_core::error::{Error, Result};
use tlprog_core::programmer::{ChipId, MemoryClass, Programmer, SpiPackage, StatusReport};

use crate::config::T56Config;
use crate::device::T56;
use crate::transport::Transport;

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Transport that records every frame and replays queued responses
///
/// Receives with no queued response are answered with zeros, which decodes
/// as "no overcurrent" for status polls.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    /// Every successfully sent transfer, in order
    pub sent: Vec<Vec<u8>>,
    /// Requested size of every receive, in order
    pub receive_sizes: Vec<usize>,
    responses: VecDeque<Vec<u8>>,
    send_calls: usize,
    fail_send_at: Option<usize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next receive
    pub fn respond(&mut self, response: &[u8]) {
        self.responses.push_back(response.to_vec());
    }

    /// Make the `index`th send call (0-based) fail
    pub fn fail_send_at(&mut self, index: usize) {
        self.send_calls = 0;
        self.fail_send_at = Some(index);
    }
}

impl Transport for MockTransport {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        let call = self.send_calls;
        self.send_calls += 1;
        if self.fail_send_at == Some(call) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock send failure"));
        }
        self.sent.push(data.to_vec());
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.receive_sizes.push(buf.len());
        buf.fill(0);
        if let Some(response) = self.responses.pop_front() {
            let n = response.len().min(buf.len());
            buf[..n].copy_from_slice(&response[..n]);
        }
        Ok(())
    }
}

/// Algorithm source returning a fixed payload and counting fetches
pub(crate) fn counting_source(
    name: &'static str,
    bitstream: &[u8],
) -> (impl AlgorithmSource + 'static, Rc<Cell<usize>>) {
    let fetches = Rc::new(Cell::new(0));
    let counter = Rc::clone(&fetches);
    let bitstream = bitstream.to_vec();
    let source = move |_: &AlgorithmRequest| -> Result<Algorithm> {
        counter.set(counter.get() + 1);
        Ok(Algorithm::new(name, bitstream.clone()))
    };
    (source, fetches)
}

/// Algorithm source that records every request it receives
pub(crate) fn recording_source() -> (
    impl AlgorithmSource + 'static,
    Rc<RefCell<Vec<AlgorithmRequest>>>,
) {
    let requests = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&requests);
    let source = move |request: &AlgorithmRequest| -> Result<Algorithm> {
        log.borrow_mut().push(*request);
        Ok(Algorithm::new("REC", vec![0x5A; 2]))
    };
    (source, requests)
}

/// Algorithm source that never has a match
pub(crate) fn failing_source() -> impl AlgorithmSource + 'static {
    |request: &AlgorithmRequest| -> Result<Algorithm> {
        Err(Error::AlgorithmUnavailable(format!(
            "no algorithm for protocol 0x{:02X}",
            request.protocol_id
        )))
    }
}

/// A parallel EEPROM style descriptor
pub(crate) fn test_device() -> Device {
    Device {
        name: "AT28C256".to_string(),
        protocol_id: 0x2A,
        variant: 0x0501,
        code_memory_size: 0x8000,
        page_size: 64,
        pulse_delay: 200,
        voltages: Voltages(0x0000_0031),
        package_details: PackageDetails(0x1C),
        read_buffer_size: 0x200,
        write_buffer_size: 0x40,
        chip_id_bytes_count: 2,
        fuses: Some(FuseLayout { num_fuses: 2 }),
        ..Default::default()
    }
}

/// A T56 over a mock transport with a one-byte algorithm
pub(crate) fn mock_t56(device: Device) -> T56<MockTransport> {
    init_logger();
    let (source, _) = counting_source("TEST", &[0xA5]);
    T56::new(MockTransport::new(), device, source, T56Config::default())
}

/// Alternate dialect that only records which operations were called
#[derive(Debug, Default)]
pub(crate) struct RecordingDialect {
    pub calls: Rc<RefCell<Vec<&'static str>>>,
}

impl RecordingDialect {
    pub fn new() -> (Self, Rc<RefCell<Vec<&'static str>>>) {
        let dialect = Self::default();
        let calls = Rc::clone(&dialect.calls);
        (dialect, calls)
    }

    fn record(&self, op: &'static str) {
        self.calls.borrow_mut().push(op);
    }
}

impl Programmer for RecordingDialect {
    fn begin(&mut self) -> Result<()> {
        self.record("begin");
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.record("end");
        Ok(())
    }

    fn read_block(&mut self, _class: MemoryClass, _addr: u32, buf: &mut [u8]) -> Result<()> {
        self.record("read_block");
        buf.fill(0xBB);
        Ok(())
    }

    fn write_block(
        &mut self,
        _class: MemoryClass,
        _addr: u32,
        _len: u16,
        _data: &[u8],
    ) -> Result<()> {
        self.record("write_block");
        Ok(())
    }

    fn read_fuses(&mut self, _class: MemoryClass, _items: u8, _buf: &mut [u8]) -> Result<()> {
        self.record("read_fuses");
        Ok(())
    }

    fn write_fuses(&mut self, _class: MemoryClass, _items: u8, _data: Option<&[u8]>) -> Result<()> {
        self.record("write_fuses");
        Ok(())
    }

    fn read_calibration(&mut self, _buf: &mut [u8]) -> Result<()> {
        self.record("read_calibration");
        Ok(())
    }

    fn chip_id(&mut self) -> Result<ChipId> {
        self.record("chip_id");
        Ok(ChipId { id_type: 0, id: 0xC0FFEE })
    }

    fn spi_autodetect(&mut self, _package: SpiPackage) -> Result<u32> {
        self.record("spi_autodetect");
        Ok(0x00BF_2541)
    }

    fn protect_off(&mut self) -> Result<()> {
        self.record("protect_off");
        Ok(())
    }

    fn protect_on(&mut self) -> Result<()> {
        self.record("protect_on");
        Ok(())
    }

    fn erase(&mut self) -> Result<()> {
        self.record("erase");
        Ok(())
    }

    fn read_jedec_row(
        &mut self,
        _row: u8,
        _flags: u8,
        _bit_size: u8,
        _buf: &mut [u8],
    ) -> Result<()> {
        self.record("read_jedec_row");
        Ok(())
    }

    fn write_jedec_row(&mut self, _row: u8, _flags: u8, _bit_size: u8, _data: &[u8]) -> Result<()> {
        self.record("write_jedec_row");
        Ok(())
    }

    fn status(&mut self, _want_record: bool) -> Result<StatusReport> {
        self.record("status");
        Ok(StatusReport::default())
    }
}
