//! FPGA bitstream algorithms
//!
//! Before a programming session the programmer's FPGA is reconfigured with a
//! device-family specific bitstream (an "algorithm"). Where the bitstream comes
//! from (an algorithm archive, a directory of files, an embedded table) is up
//! to the [`AlgorithmSource`] implementation.

use crate::device::Device;
use crate::error::Result;

/// An algorithm payload
///
/// The payload is owned: once handed to an uploader it is released when the
/// uploader drops it, on success and failure alike.
#[derive(Clone, PartialEq, Eq)]
pub struct Algorithm {
    /// Algorithm name (e.g. "SPI25F11")
    pub name: String,
    /// Raw bitstream bytes
    pub bitstream: Vec<u8>,
}

impl Algorithm {
    /// Create a new algorithm payload
    pub fn new(name: impl Into<String>, bitstream: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bitstream,
        }
    }

    /// Bitstream length in bytes
    pub fn len(&self) -> usize {
        self.bitstream.len()
    }

    /// Whether the bitstream is empty
    pub fn is_empty(&self) -> bool {
        self.bitstream.is_empty()
    }
}

impl core::fmt::Debug for Algorithm {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Algorithm")
            .field("name", &self.name)
            .field("len", &self.bitstream.len())
            .finish()
    }
}

/// Selectors identifying which algorithm a session needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmRequest {
    /// Protocol (family) identifier
    pub protocol_id: u8,
    /// Variant code; the high byte is the algorithm number
    pub variant: u32,
    /// ICSP byte in effect for the session
    pub icsp: u8,
    /// Voltage option passed through to the source
    pub voltage_option: u8,
}

impl AlgorithmRequest {
    /// Build the request for a device descriptor
    pub fn for_device(device: &Device, icsp: u8, voltage_option: u8) -> Self {
        Self {
            protocol_id: device.protocol_id,
            variant: device.variant,
            icsp,
            voltage_option,
        }
    }

    /// Algorithm number (variant high byte)
    pub fn algorithm_number(&self) -> u8 {
        (self.variant >> 8) as u8
    }
}

/// Provider of algorithm payloads
pub trait AlgorithmSource {
    /// Fetch the algorithm matching `request`
    ///
    /// Returns [`Error::AlgorithmUnavailable`](crate::Error::AlgorithmUnavailable)
    /// if no matching algorithm exists.
    fn fetch(&mut self, request: &AlgorithmRequest) -> Result<Algorithm>;
}

impl<F> AlgorithmSource for F
where
    F: FnMut(&AlgorithmRequest) -> Result<Algorithm>,
{
    fn fetch(&mut self, request: &AlgorithmRequest) -> Result<Algorithm> {
        self(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_request_for_device() {
        let device = Device {
            protocol_id: 0x03,
            variant: 0x1100,
            ..Default::default()
        };
        let request = AlgorithmRequest::for_device(&device, 0x81, 2);
        assert_eq!(request.protocol_id, 0x03);
        assert_eq!(request.algorithm_number(), 0x11);
        assert_eq!(request.icsp, 0x81);
        assert_eq!(request.voltage_option, 2);
    }

    #[test]
    fn test_closure_source() {
        let mut source = |request: &AlgorithmRequest| {
            if request.protocol_id == 0x03 {
                Ok(Algorithm::new("SPI25F11", vec![0xAA; 4]))
            } else {
                Err(Error::AlgorithmUnavailable(format!(
                    "protocol 0x{:02X}",
                    request.protocol_id
                )))
            }
        };
        let request = AlgorithmRequest {
            protocol_id: 0x03,
            variant: 0x1100,
            icsp: 0,
            voltage_option: 0,
        };
        let algorithm = source.fetch(&request).unwrap();
        assert_eq!(algorithm.name, "SPI25F11");
        assert_eq!(algorithm.len(), 4);

        let missing = AlgorithmRequest {
            protocol_id: 0x42,
            ..request
        };
        assert!(matches!(
            source.fetch(&missing),
            Err(Error::AlgorithmUnavailable(_))
        ));
    }

    #[test]
    fn test_debug_omits_bitstream() {
        let algorithm = Algorithm::new("NAND01", vec![0u8; 1024]);
        assert_eq!(
            format!("{:?}", algorithm),
            "Algorithm { name: \"NAND01\", len: 1024 }"
        );
    }
}
