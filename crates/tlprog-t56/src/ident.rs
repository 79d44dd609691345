//! Calibration, chip identification and SPI autodetection

use tlprog_core::algorithm::AlgorithmRequest;
use tlprog_core::error::{Error, Result};
use tlprog_core::programmer::{ChipId, SpiPackage};

use crate::protocol::{
    autodetect_frame, calibration_frame, decode_autodetect, decode_chip_id, read_id_frame,
    AUTODETECT_RESPONSE_LEN, RESPONSE_LEN, SPI_DEVICE_16P, SPI_DEVICE_8P, SPI_PROTOCOL,
};
use crate::transport::Transport;

pub(crate) fn read_calibration<T: Transport + ?Sized>(
    transport: &mut T,
    buf: &mut [u8],
) -> Result<()> {
    let len = u16::try_from(buf.len()).map_err(|_| {
        Error::InvalidParameter(format!("calibration length {} exceeds 65535", buf.len()))
    })?;
    transport
        .send(&calibration_frame(len))
        .map_err(Error::transfer("read_calibration"))?;
    transport
        .receive(buf)
        .map_err(Error::transfer("read_calibration"))
}

/// Read the chip id, decoding `id_bytes` identifier bytes
pub(crate) fn chip_id<T: Transport + ?Sized>(transport: &mut T, id_bytes: u8) -> Result<ChipId> {
    transport
        .send(&read_id_frame())
        .map_err(Error::transfer("chip_id"))?;

    let mut response = [0u8; RESPONSE_LEN];
    transport
        .receive(&mut response)
        .map_err(Error::transfer("chip_id"))?;

    let id = decode_chip_id(&response, id_bytes);
    log::debug!("t56: chip id type {} value 0x{:08X}", id.id_type, id.id);
    Ok(id)
}

/// Algorithm request for the SPI autodetection bitstream of `package`
///
/// Only the protocol and the variant high byte matter to the source.
pub(crate) fn autodetect_request(
    package: SpiPackage,
    icsp: u8,
    voltage_option: u8,
) -> AlgorithmRequest {
    let device = match package {
        SpiPackage::Pins8 => SPI_DEVICE_8P,
        SpiPackage::Pins16 => SPI_DEVICE_16P,
    };
    AlgorithmRequest {
        protocol_id: SPI_PROTOCOL,
        variant: (device as u32) << 8,
        icsp,
        voltage_option,
    }
}

/// Run the autodetect exchange; the bitstream must already be loaded
pub(crate) fn detect_spi<T: Transport + ?Sized>(
    transport: &mut T,
    package: SpiPackage,
) -> Result<u32> {
    transport
        .send(&autodetect_frame(package.width_flag()))
        .map_err(Error::transfer("spi_autodetect"))?;

    let mut response = [0u8; AUTODETECT_RESPONSE_LEN];
    transport
        .receive(&mut response)
        .map_err(Error::transfer("spi_autodetect"))?;
    Ok(decode_autodetect(&response))
}
