//! Code, data and user memory block transfers

use tlprog_core::error::{Error, Result};
use tlprog_core::programmer::MemoryClass;

use crate::protocol::{block_frame, read_block_opcode, write_block_opcode, READ_BLOCK_SLACK};
use crate::transport::Transport;

/// Read `buf.len()` bytes of `class` memory at `addr`
///
/// The firmware sends more than it was asked for, so the response is
/// received into a buffer [`READ_BLOCK_SLACK`] bytes longer and only the
/// requested prefix is handed back.
pub(crate) fn read_block<T: Transport + ?Sized>(
    transport: &mut T,
    class: MemoryClass,
    addr: u32,
    buf: &mut [u8],
) -> Result<()> {
    let opcode = read_block_opcode(class).ok_or_else(|| unsupported("read_block", class))?;
    let len = block_len(buf.len())?;

    log::trace!("t56: read {} block addr=0x{:08X} len={}", class, addr, len);
    transport
        .send(&block_frame(opcode, len, addr))
        .map_err(Error::transfer("read_block"))?;

    let mut response = vec![0u8; buf.len() + READ_BLOCK_SLACK];
    transport
        .receive(&mut response)
        .map_err(Error::transfer("read_block"))?;
    buf.copy_from_slice(&response[..buf.len()]);
    Ok(())
}

/// Write one block of `class` memory at `addr`
///
/// The header carries `len`, the payload is always exactly
/// `write_buffer_size` bytes taken from the front of `data`.
pub(crate) fn write_block<T: Transport + ?Sized>(
    transport: &mut T,
    write_buffer_size: u16,
    class: MemoryClass,
    addr: u32,
    len: u16,
    data: &[u8],
) -> Result<()> {
    let opcode = write_block_opcode(class).ok_or_else(|| unsupported("write_block", class))?;
    let payload_len = write_buffer_size as usize;
    if data.len() < payload_len {
        return Err(Error::BufferTooSmall {
            needed: payload_len,
            actual: data.len(),
        });
    }

    log::trace!("t56: write {} block addr=0x{:08X} len={}", class, addr, len);
    transport
        .send(&block_frame(opcode, len, addr))
        .map_err(Error::transfer("write_block"))?;
    transport
        .send(&data[..payload_len])
        .map_err(Error::transfer("write_block"))?;
    Ok(())
}

fn block_len(len: usize) -> Result<u16> {
    u16::try_from(len)
        .map_err(|_| Error::InvalidParameter(format!("block length {} exceeds 65535", len)))
}

pub(crate) fn unsupported(operation: &'static str, class: MemoryClass) -> Error {
    log::error!("t56: unknown type for {} ({})", operation, class);
    Error::UnsupportedClass { operation, class }
}
