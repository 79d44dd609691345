//! Fuse, lock bit, protection and erase commands

use tlprog_core::device::Device;
use tlprog_core::error::{Error, Result};
use tlprog_core::programmer::MemoryClass;

use crate::block::unsupported;
use crate::protocol::{
    erase_frame, erase_fuse_count, opcode_frame, read_fuses_frame, read_fuses_opcode,
    write_fuses_frame, write_fuses_opcode, Opcode, LONG_FRAME_LEN, MAX_FRAME_PAYLOAD,
    PAYLOAD_OFFSET,
};
use crate::transport::Transport;

/// Read `buf.len()` fuse bytes of `class`
pub(crate) fn read_fuses<T: Transport + ?Sized>(
    transport: &mut T,
    device: &Device,
    class: MemoryClass,
    items: u8,
    buf: &mut [u8],
) -> Result<()> {
    let opcode = read_fuses_opcode(class).ok_or_else(|| unsupported("read_fuses", class))?;
    if buf.len() > MAX_FRAME_PAYLOAD {
        return Err(Error::InvalidParameter(format!(
            "read_fuses: {} bytes requested, a response holds at most {}",
            buf.len(),
            MAX_FRAME_PAYLOAD
        )));
    }

    transport
        .send(&read_fuses_frame(
            opcode,
            device.protocol_id,
            items,
            device.code_memory_size,
        ))
        .map_err(Error::transfer("read_fuses"))?;

    let mut response = [0u8; LONG_FRAME_LEN];
    transport
        .receive(&mut response)
        .map_err(Error::transfer("read_fuses"))?;
    buf.copy_from_slice(&response[PAYLOAD_OFFSET..PAYLOAD_OFFSET + buf.len()]);
    Ok(())
}

/// Write fuse bytes of `class`; `None` sends the bare opcode frame
pub(crate) fn write_fuses<T: Transport + ?Sized>(
    transport: &mut T,
    device: &Device,
    class: MemoryClass,
    items: u8,
    data: Option<&[u8]>,
) -> Result<()> {
    let opcode = write_fuses_opcode(class).ok_or_else(|| unsupported("write_fuses", class))?;
    let frame = write_fuses_frame(
        opcode,
        device.protocol_id,
        items,
        device.code_memory_size,
        data,
    )?;
    transport
        .send(&frame)
        .map_err(Error::transfer("write_fuses"))
}

pub(crate) fn protect_off<T: Transport + ?Sized>(transport: &mut T) -> Result<()> {
    transport
        .send(&opcode_frame(Opcode::ProtectOff))
        .map_err(Error::transfer("protect_off"))
}

pub(crate) fn protect_on<T: Transport + ?Sized>(transport: &mut T) -> Result<()> {
    transport
        .send(&opcode_frame(Opcode::ProtectOn))
        .map_err(Error::transfer("protect_on"))
}

/// Erase the chip and wait for the firmware's acknowledgement
pub(crate) fn erase<T: Transport + ?Sized>(transport: &mut T, device: &Device) -> Result<()> {
    let count = erase_fuse_count(device.fuse_count());
    log::debug!("t56: erase, fuse count {}", count);
    transport
        .send(&erase_frame(count))
        .map_err(Error::transfer("erase"))?;

    let mut response = [0u8; LONG_FRAME_LEN];
    transport
        .receive(&mut response)
        .map_err(Error::transfer("erase"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{test_device, MockTransport};
    use tlprog_core::device::FuseLayout;

    #[test]
    fn test_read_lock_byte() {
        let device = test_device();
        let mut transport = MockTransport::new();
        let mut response = [0u8; LONG_FRAME_LEN];
        response[8] = 0xFC;
        response[9] = 0x55;
        transport.respond(&response);

        let mut lock = [0u8; 1];
        read_fuses(&mut transport, &device, MemoryClass::LockFuses, 1, &mut lock).unwrap();

        assert_eq!(
            transport.sent,
            vec![vec![0x15, 0x2A, 0x01, 0x00, 0x00, 0x80, 0x00, 0x00]]
        );
        assert_eq!(transport.receive_sizes, vec![LONG_FRAME_LEN]);
        assert_eq!(lock, [0xFC]);
    }

    #[test]
    fn test_read_fuses_too_long() {
        let device = test_device();
        let mut transport = MockTransport::new();
        let mut buf = [0u8; MAX_FRAME_PAYLOAD + 1];
        assert!(matches!(
            read_fuses(&mut transport, &device, MemoryClass::UserFuses, 1, &mut buf),
            Err(Error::InvalidParameter(_))
        ));
        assert!(transport.sent.is_empty());
    }

    #[test]
    fn test_read_fuses_unsupported_class() {
        let device = test_device();
        let mut transport = MockTransport::new();
        let mut buf = [0u8; 2];
        assert!(matches!(
            read_fuses(&mut transport, &device, MemoryClass::Code, 1, &mut buf),
            Err(Error::UnsupportedClass {
                operation: "read_fuses",
                ..
            })
        ));
        assert!(transport.sent.is_empty());
    }

    #[test]
    fn test_write_fuses_without_data_sends_opcode_only() {
        let device = test_device();
        let mut transport = MockTransport::new();
        write_fuses(&mut transport, &device, MemoryClass::ConfigFuses, 3, None).unwrap();

        assert_eq!(transport.sent.len(), 1);
        let frame = &transport.sent[0];
        assert_eq!(frame.len(), LONG_FRAME_LEN);
        assert_eq!(frame[0], 0x09);
        assert!(frame[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_write_fuses_with_data() {
        let device = test_device();
        let mut transport = MockTransport::new();
        write_fuses(
            &mut transport,
            &device,
            MemoryClass::LockFuses,
            1,
            Some(&[0xC0]),
        )
        .unwrap();

        // 0x8000 - 0x38 = 0x7FC8
        assert_eq!(
            transport.sent[0][..9],
            [0x14, 0x2A, 0x01, 0x00, 0xC8, 0x7F, 0x00, 0x00, 0xC0]
        );
    }

    #[test]
    fn test_write_fuses_unknown_class_is_an_error() {
        let device = test_device();
        let mut transport = MockTransport::new();
        assert!(matches!(
            write_fuses(&mut transport, &device, MemoryClass::Data, 1, None),
            Err(Error::UnsupportedClass {
                operation: "write_fuses",
                class: MemoryClass::Data,
            })
        ));
        assert!(transport.sent.is_empty());
    }

    #[test]
    fn test_protect_frames() {
        let mut transport = MockTransport::new();
        protect_off(&mut transport).unwrap();
        protect_on(&mut transport).unwrap();
        assert_eq!(
            transport.sent,
            vec![vec![0x18, 0, 0, 0, 0, 0, 0, 0], vec![0x19, 0, 0, 0, 0, 0, 0, 0]]
        );
    }

    #[test]
    fn test_erase_frame_with_declared_fuses() {
        // Two declared fuses still erase with a count of 1
        let device = test_device();
        let mut transport = MockTransport::new();
        erase(&mut transport, &device).unwrap();

        assert_eq!(transport.sent.len(), 1);
        assert_eq!(transport.sent[0].len(), 15);
        assert_eq!(transport.sent[0][..3], [0x0E, 0x00, 0x01]);
        assert_eq!(transport.receive_sizes, vec![LONG_FRAME_LEN]);
    }

    #[test]
    fn test_erase_fuse_count_byte() {
        for (fuses, expected) in [
            (None, 1),
            (Some(FuseLayout { num_fuses: 0 }), 0),
            (Some(FuseLayout { num_fuses: 3 }), 1),
            (Some(FuseLayout { num_fuses: 9 }), 1),
        ] {
            let device = Device {
                fuses,
                ..test_device()
            };
            let mut transport = MockTransport::new();
            erase(&mut transport, &device).unwrap();
            assert_eq!(transport.sent[0][2], expected);
        }
    }
}
