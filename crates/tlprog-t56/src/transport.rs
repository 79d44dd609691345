//! Transport layer abstraction for T56 communication
//!
//! The T56 exchanges fixed-size frames over USB bulk endpoints. Opening the
//! device and moving the bytes belongs to the transport implementation;
//! this crate only needs blocking send and fixed-length receive.

use std::io;

/// Transport trait for sending and receiving frames
pub trait Transport {
    /// Send `data` as one transfer
    fn send(&mut self, data: &[u8]) -> io::Result<()>;

    /// Receive exactly `buf.len()` bytes
    fn receive(&mut self, buf: &mut [u8]) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).send(data)
    }

    fn receive(&mut self, buf: &mut [u8]) -> io::Result<()> {
        (**self).receive(buf)
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).send(data)
    }

    fn receive(&mut self, buf: &mut [u8]) -> io::Result<()> {
        (**self).receive(buf)
    }
}
