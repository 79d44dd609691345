//! T56 protocol constants and frame codecs
//!
//! Every request is a fixed-size frame with the opcode in byte 0 and the
//! remaining fields at fixed offsets. Multi-byte fields are little-endian
//! except the 3-byte autodetect identifier and some chip-id formats. The frame
//! sizes below are part of the wire contract; the firmware misbehaves if a
//! frame is padded or shortened.

// Allow unused opcodes - kept as protocol documentation
#![allow(dead_code)]

use tlprog_core::device::{Device, Voltages};
use tlprog_core::error::{Error, Result};
use tlprog_core::programmer::{ChipId, MemoryClass, Status, StatusReport};

/// T56 command opcodes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    BeginTrans = 0x03,
    EndTrans = 0x04,
    ReadId = 0x05,
    ReadUser = 0x06,
    WriteUser = 0x07,
    ReadCfg = 0x08,
    WriteCfg = 0x09,
    WriteUserData = 0x0A,
    ReadUserData = 0x0B,
    WriteCode = 0x0C,
    ReadCode = 0x0D,
    Erase = 0x0E,
    ReadData = 0x10,
    WriteData = 0x11,
    WriteLock = 0x14,
    ReadLock = 0x15,
    ReadCalibration = 0x16,
    ProtectOff = 0x18,
    ProtectOn = 0x19,
    ReadJedec = 0x1D,
    WriteJedec = 0x1E,
    WriteBitstream = 0x26,
    LogicIcTestVector = 0x28,
    Autodetect = 0x37,
    UnlockTsop48 = 0x38,
    RequestStatus = 0x39,
    PinDetection = 0x3E,
}

// Frame sizes
pub const SHORT_FRAME_LEN: usize = 8;
pub const AUTODETECT_FRAME_LEN: usize = 10;
pub const ERASE_FRAME_LEN: usize = 15;
pub const AUTODETECT_RESPONSE_LEN: usize = 16;
pub const RESPONSE_LEN: usize = 32;
pub const LONG_FRAME_LEN: usize = 64;

/// Payload offset inside fuse and JEDEC frames
pub const PAYLOAD_OFFSET: usize = 8;
/// Largest payload that fits behind the header of a 64-byte frame
pub const MAX_FRAME_PAYLOAD: usize = LONG_FRAME_LEN - PAYLOAD_OFFSET;

/// Extra bytes requested on block reads; the firmware sends past the
/// requested length and the USB stack overflows on an exact-size buffer.
pub const READ_BLOCK_SLACK: usize = 16;

/// Code size correction applied to fuse writes, required by the firmware
pub const FUSE_WRITE_CODE_SIZE_OFFSET: u32 = 0x38;

/// Fill byte for the unused part of the chip-id request
pub const READ_ID_FILL: u8 = 0xD0;

/// Chip-id formats decoded little-endian
pub const ID_TYPE_LE: [u8; 2] = [3, 4];
/// Maximum number of chip-id bytes
pub const MAX_ID_BYTES: usize = 4;

// SPI autodetection: protocol and variant high bytes selecting the
// 'SPI25F11' (8-pin) and 'SPI25F21' (16-pin) bitstreams
pub const SPI_PROTOCOL: u8 = 0x03;
pub const SPI_DEVICE_8P: u8 = 0x11;
pub const SPI_DEVICE_16P: u8 = 0x21;

/// Opcode for reading a memory class
pub fn read_block_opcode(class: MemoryClass) -> Option<Opcode> {
    match class {
        MemoryClass::Code => Some(Opcode::ReadCode),
        MemoryClass::Data => Some(Opcode::ReadData),
        MemoryClass::User => Some(Opcode::ReadUserData),
        _ => None,
    }
}

/// Opcode for writing a memory class
pub fn write_block_opcode(class: MemoryClass) -> Option<Opcode> {
    match class {
        MemoryClass::Code => Some(Opcode::WriteCode),
        MemoryClass::Data => Some(Opcode::WriteData),
        MemoryClass::User => Some(Opcode::WriteUserData),
        _ => None,
    }
}

/// Opcode for reading a fuse class
pub fn read_fuses_opcode(class: MemoryClass) -> Option<Opcode> {
    match class {
        MemoryClass::UserFuses => Some(Opcode::ReadUser),
        MemoryClass::ConfigFuses => Some(Opcode::ReadCfg),
        MemoryClass::LockFuses => Some(Opcode::ReadLock),
        _ => None,
    }
}

/// Opcode for writing a fuse class
pub fn write_fuses_opcode(class: MemoryClass) -> Option<Opcode> {
    match class {
        MemoryClass::UserFuses => Some(Opcode::WriteUser),
        MemoryClass::ConfigFuses => Some(Opcode::WriteCfg),
        MemoryClass::LockFuses => Some(Opcode::WriteLock),
        _ => None,
    }
}

/// Frame carrying only an opcode
pub fn opcode_frame(opcode: Opcode) -> [u8; SHORT_FRAME_LEN] {
    let mut frame = [0u8; SHORT_FRAME_LEN];
    frame[0] = opcode as u8;
    frame
}

/// Bytes 20..23 of the begin frame
///
/// Byte 20 is bits 16-23 of the raw word. Bytes 21 and 22 carry the low and
/// high nibble of the low byte, unless the high nibble is 0xF, in which case
/// byte 22 carries the whole low byte. The override bit replaces byte 22 with
/// bits 16-19.
pub fn encode_voltages(voltages: Voltages) -> [u8; 3] {
    let raw = voltages.raw();
    let mut out = [(raw >> 16) as u8, 0, 0];

    if raw & 0xF0 == 0xF0 {
        out[2] = raw as u8;
    } else {
        out[1] = raw as u8 & 0x0F;
        out[2] = raw as u8 & 0xF0;
    }
    if voltages.has_override() {
        out[2] = ((raw >> 16) & 0x0F) as u8;
    }
    out
}

/// Session-open frame
pub fn begin_transaction_frame(device: &Device, icsp: u8) -> [u8; LONG_FRAME_LEN] {
    let mut frame = [0u8; LONG_FRAME_LEN];
    frame[0] = Opcode::BeginTrans as u8;
    frame[1] = device.protocol_id;
    frame[2] = device.variant as u8;
    frame[3] = icsp;

    frame[4..6].copy_from_slice(&(device.voltages.raw() as u16).to_le_bytes());
    frame[6] = device.chip_info as u8;
    frame[7] = device.pin_map as u8;
    frame[8..10].copy_from_slice(&(device.data_memory_size as u16).to_le_bytes());
    frame[10..12].copy_from_slice(&device.page_size.to_le_bytes());
    frame[12..14].copy_from_slice(&device.pulse_delay.to_le_bytes());
    frame[14..16].copy_from_slice(&(device.data_memory2_size as u16).to_le_bytes());
    frame[16..20].copy_from_slice(&device.code_memory_size.to_le_bytes());
    frame[20..23].copy_from_slice(&encode_voltages(device.voltages));

    frame[40..44].copy_from_slice(&device.package_details.raw().to_le_bytes());
    frame[44..46].copy_from_slice(&device.read_buffer_size.to_le_bytes());
    frame[56..60].copy_from_slice(&device.flags.bits().to_le_bytes());
    frame
}

/// Bitstream upload header
pub fn bitstream_header(len: u32) -> [u8; SHORT_FRAME_LEN] {
    let mut frame = opcode_frame(Opcode::WriteBitstream);
    frame[4..8].copy_from_slice(&len.to_le_bytes());
    frame
}

/// Block read/write header
pub fn block_frame(opcode: Opcode, len: u16, addr: u32) -> [u8; SHORT_FRAME_LEN] {
    let mut frame = opcode_frame(opcode);
    frame[2..4].copy_from_slice(&len.to_le_bytes());
    frame[4..8].copy_from_slice(&addr.to_le_bytes());
    frame
}

/// Fuse read request
pub fn read_fuses_frame(
    opcode: Opcode,
    protocol_id: u8,
    items: u8,
    code_size: u32,
) -> [u8; SHORT_FRAME_LEN] {
    let mut frame = opcode_frame(opcode);
    frame[1] = protocol_id;
    frame[2] = items;
    frame[4..8].copy_from_slice(&code_size.to_le_bytes());
    frame
}

/// Fuse write frame
///
/// With no payload only the opcode is set. With a payload the code size is
/// reduced by [`FUSE_WRITE_CODE_SIZE_OFFSET`] before encoding.
pub fn write_fuses_frame(
    opcode: Opcode,
    protocol_id: u8,
    items: u8,
    code_size: u32,
    data: Option<&[u8]>,
) -> Result<[u8; LONG_FRAME_LEN]> {
    let mut frame = [0u8; LONG_FRAME_LEN];
    frame[0] = opcode as u8;
    if let Some(data) = data {
        check_payload(data.len())?;
        frame[1] = protocol_id;
        frame[2] = items;
        frame[4..8].copy_from_slice(
            &code_size
                .wrapping_sub(FUSE_WRITE_CODE_SIZE_OFFSET)
                .to_le_bytes(),
        );
        frame[PAYLOAD_OFFSET..PAYLOAD_OFFSET + data.len()].copy_from_slice(data);
    }
    Ok(frame)
}

/// Calibration read request
pub fn calibration_frame(len: u16) -> [u8; LONG_FRAME_LEN] {
    let mut frame = [0u8; LONG_FRAME_LEN];
    frame[0] = Opcode::ReadCalibration as u8;
    frame[2..4].copy_from_slice(&len.to_le_bytes());
    frame
}

/// Chip-id request
pub fn read_id_frame() -> [u8; SHORT_FRAME_LEN] {
    let mut frame = [READ_ID_FILL; SHORT_FRAME_LEN];
    frame[0] = Opcode::ReadId as u8;
    frame
}

/// Decode a chip-id response
///
/// `id_bytes` is the device's configured identifier length; it is clamped
/// to [`MAX_ID_BYTES`] and a length of 0 yields id 0.
pub fn decode_chip_id(response: &[u8; RESPONSE_LEN], id_bytes: u8) -> ChipId {
    let id_type = response[0];
    let len = (id_bytes as usize).min(MAX_ID_BYTES);
    let bytes = &response[2..2 + len];

    let id = if ID_TYPE_LE.contains(&id_type) {
        bytes
            .iter()
            .rev()
            .fold(0u32, |acc, &b| (acc << 8) | b as u32)
    } else {
        bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32)
    };
    ChipId { id_type, id }
}

/// SPI autodetect request
pub fn autodetect_frame(width_flag: u8) -> [u8; AUTODETECT_FRAME_LEN] {
    let mut frame = [0u8; AUTODETECT_FRAME_LEN];
    frame[0] = Opcode::Autodetect as u8;
    frame[8] = width_flag;
    frame
}

/// Decode the 3-byte big-endian JEDEC id from an autodetect response
pub fn decode_autodetect(response: &[u8; AUTODETECT_RESPONSE_LEN]) -> u32 {
    (response[2] as u32) << 16 | (response[3] as u32) << 8 | response[4] as u32
}

/// Erase request
pub fn erase_frame(fuse_count: u8) -> [u8; ERASE_FRAME_LEN] {
    let mut frame = [0u8; ERASE_FRAME_LEN];
    frame[0] = Opcode::Erase as u8;
    frame[2] = fuse_count;
    frame
}

/// Fuse count sent with an erase request
///
/// The firmware expects 1 unless the device carries a fuse layout that
/// declares no fuses, in which case 0 is sent.
pub fn erase_fuse_count(fuses: Option<u8>) -> u8 {
    match fuses {
        Some(0) => 0,
        _ => 1,
    }
}

/// Bytes needed to hold `bit_size` bits
pub fn jedec_payload_len(bit_size: u8) -> usize {
    (bit_size as usize).div_ceil(8)
}

fn jedec_header(opcode: Opcode, protocol_id: u8, bit_size: u8, row: u8, flags: u8) -> [u8; 8] {
    let mut header = opcode_frame(opcode);
    header[1] = protocol_id;
    header[2] = bit_size;
    header[4] = row;
    header[5] = flags;
    header
}

/// JEDEC row read request
pub fn read_jedec_frame(
    protocol_id: u8,
    bit_size: u8,
    row: u8,
    flags: u8,
) -> [u8; SHORT_FRAME_LEN] {
    jedec_header(Opcode::ReadJedec, protocol_id, bit_size, row, flags)
}

/// JEDEC row write frame
pub fn write_jedec_frame(
    protocol_id: u8,
    bit_size: u8,
    row: u8,
    flags: u8,
    data: &[u8],
) -> Result<[u8; LONG_FRAME_LEN]> {
    let len = jedec_payload_len(bit_size);
    if data.len() < len {
        return Err(Error::BufferTooSmall {
            needed: len,
            actual: data.len(),
        });
    }
    let mut frame = [0u8; LONG_FRAME_LEN];
    frame[..PAYLOAD_OFFSET].copy_from_slice(&jedec_header(
        Opcode::WriteJedec,
        protocol_id,
        bit_size,
        row,
        flags,
    ));
    frame[PAYLOAD_OFFSET..PAYLOAD_OFFSET + len].copy_from_slice(&data[..len]);
    Ok(frame)
}

/// Decode a status response
///
/// The overcurrent flag is always decoded; the record only if `want_record`.
pub fn decode_status(response: &[u8; RESPONSE_LEN], want_record: bool) -> StatusReport {
    let status = want_record.then(|| Status {
        error: response[0],
        c1: u16::from_le_bytes([response[2], response[3]]),
        c2: u16::from_le_bytes([response[4], response[5]]),
        address: u32::from_le_bytes([response[8], response[9], response[10], response[11]]),
    });
    StatusReport {
        status,
        overcurrent: response[12] != 0,
    }
}

fn check_payload(len: usize) -> Result<()> {
    if len > MAX_FRAME_PAYLOAD {
        return Err(Error::InvalidParameter(format!(
            "payload of {} bytes exceeds the {} byte frame payload",
            len, MAX_FRAME_PAYLOAD
        )));
    }
    Ok(())
}
