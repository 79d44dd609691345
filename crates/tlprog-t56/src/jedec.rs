//! JEDEC fuse row access for PLD/GAL devices

use tlprog_core::error::{Error, Result};

use crate::protocol::{jedec_payload_len, read_jedec_frame, write_jedec_frame, RESPONSE_LEN};
use crate::transport::Transport;

pub(crate) fn write_jedec_row<T: Transport + ?Sized>(
    transport: &mut T,
    protocol_id: u8,
    row: u8,
    flags: u8,
    bit_size: u8,
    data: &[u8],
) -> Result<()> {
    let frame = write_jedec_frame(protocol_id, bit_size, row, flags, data)?;
    transport
        .send(&frame)
        .map_err(Error::transfer("write_jedec_row"))
}

/// Read one row; `ceil(bit_size / 8)` bytes are copied into `buf`
pub(crate) fn read_jedec_row<T: Transport + ?Sized>(
    transport: &mut T,
    protocol_id: u8,
    row: u8,
    flags: u8,
    bit_size: u8,
    buf: &mut [u8],
) -> Result<()> {
    let len = jedec_payload_len(bit_size);
    if buf.len() < len {
        return Err(Error::BufferTooSmall {
            needed: len,
            actual: buf.len(),
        });
    }

    transport
        .send(&read_jedec_frame(protocol_id, bit_size, row, flags))
        .map_err(Error::transfer("read_jedec_row"))?;

    let mut response = [0u8; RESPONSE_LEN];
    transport
        .receive(&mut response)
        .map_err(Error::transfer("read_jedec_row"))?;
    buf[..len].copy_from_slice(&response[..len]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockTransport;

    #[test]
    fn test_row_round_trip() {
        // What was written is what the programmer echoes back
        let row = [0xA5, 0x5A, 0x0F];
        let mut transport = MockTransport::new();
        write_jedec_row(&mut transport, 0x2C, 12, 0x00, 20, &row).unwrap();

        let written = transport.sent[0].clone();
        assert_eq!(written.len(), 64);
        transport.respond(&written[8..11]);

        let mut readback = [0u8; 3];
        read_jedec_row(&mut transport, 0x2C, 12, 0x00, 20, &mut readback).unwrap();

        assert_eq!(readback, row);
        assert_eq!(transport.sent[1], vec![0x1D, 0x2C, 20, 0, 12, 0x00, 0, 0]);
        assert_eq!(transport.receive_sizes, vec![RESPONSE_LEN]);
    }

    #[test]
    fn test_read_copies_only_row_bytes() {
        let mut transport = MockTransport::new();
        transport.respond(&[0x11, 0x22, 0x33, 0x44]);

        let mut buf = [0xEEu8; 4];
        read_jedec_row(&mut transport, 0x2C, 0, 0, 9, &mut buf).unwrap();
        assert_eq!(buf, [0x11, 0x22, 0xEE, 0xEE]);
    }

    #[test]
    fn test_read_buffer_too_small() {
        let mut transport = MockTransport::new();
        let mut buf = [0u8; 1];
        assert!(matches!(
            read_jedec_row(&mut transport, 0, 0, 0, 16, &mut buf),
            Err(Error::BufferTooSmall {
                needed: 2,
                actual: 1
            })
        ));
        assert!(transport.sent.is_empty());
    }
}
