//! Value types exchanged by programmer operations

use core::fmt;

/// Memory or fuse class addressed by an operation
///
/// Block operations accept the memory classes, fuse operations accept the
/// fuse classes; any other combination is rejected with
/// [`Error::UnsupportedClass`](crate::Error::UnsupportedClass).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryClass {
    /// Main code memory
    Code,
    /// Data memory (EEPROM)
    Data,
    /// User row / user data memory
    User,
    /// User fuse bytes
    UserFuses,
    /// Configuration fuse bytes
    ConfigFuses,
    /// Lock bits
    LockFuses,
}

impl MemoryClass {
    /// Whether this is a block-addressed memory class
    pub fn is_memory(self) -> bool {
        matches!(self, Self::Code | Self::Data | Self::User)
    }

    /// Whether this is a fuse class
    pub fn is_fuse(self) -> bool {
        !self.is_memory()
    }
}

impl fmt::Display for MemoryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code => write!(f, "code"),
            Self::Data => write!(f, "data"),
            Self::User => write!(f, "user"),
            Self::UserFuses => write!(f, "user fuses"),
            Self::ConfigFuses => write!(f, "config fuses"),
            Self::LockFuses => write!(f, "lock fuses"),
        }
    }
}

/// ICSP (in-circuit programming) mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Icsp {
    /// Program in the ZIF socket
    #[default]
    Off,
    /// ICSP, target powered by the programmer
    WithVcc,
    /// ICSP, target self-powered
    WithoutVcc,
}

impl Icsp {
    /// ICSP enable bit
    pub const ENABLE: u8 = 0x80;
    /// Programmer supplies VCC
    pub const VCC: u8 = 0x01;

    /// Byte sent to the programmer at session open
    pub fn as_byte(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::WithVcc => Self::ENABLE | Self::VCC,
            Self::WithoutVcc => Self::ENABLE,
        }
    }
}

/// Package width used to pick the SPI autodetection bitstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpiPackage {
    /// 8-pin SOIC/DIP
    #[default]
    Pins8,
    /// 16-pin SOIC
    Pins16,
}

impl SpiPackage {
    /// Width flag carried in the autodetect request
    pub fn width_flag(self) -> u8 {
        match self {
            Self::Pins8 => 0,
            Self::Pins16 => 1,
        }
    }
}

/// Chip identifier as reported by the programmer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChipId {
    /// Identifier format tag (1-5)
    pub id_type: u8,
    /// Decoded identifier value
    pub id: u32,
}

/// Verify-while-writing status record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Status {
    /// Error code (0 = no error)
    pub error: u8,
    /// First generic counter
    pub c1: u16,
    /// Second generic counter
    pub c2: u16,
    /// Address of the first verify failure
    pub address: u32,
}

/// Result of a status poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusReport {
    /// Detailed record, present when requested and supported by the dialect
    pub status: Option<Status>,
    /// Overcurrent protection tripped
    pub overcurrent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_class_partition() {
        for class in [MemoryClass::Code, MemoryClass::Data, MemoryClass::User] {
            assert!(class.is_memory());
            assert!(!class.is_fuse());
        }
        for class in [
            MemoryClass::UserFuses,
            MemoryClass::ConfigFuses,
            MemoryClass::LockFuses,
        ] {
            assert!(class.is_fuse());
        }
    }

    #[test]
    fn test_icsp_byte() {
        assert_eq!(Icsp::Off.as_byte(), 0x00);
        assert_eq!(Icsp::WithVcc.as_byte(), 0x81);
        assert_eq!(Icsp::WithoutVcc.as_byte(), 0x80);
    }

    #[test]
    fn test_spi_package_width_flag() {
        assert_eq!(SpiPackage::Pins8.width_flag(), 0);
        assert_eq!(SpiPackage::Pins16.width_flag(), 1);
    }
}
