//! Device descriptor type definitions
//!
//! A [`Device`] describes one chip as the programmer firmware needs to see it:
//! memory geometry, timing, packed voltage and package words, and a flag set.
//! Descriptors come from the device database and are read-only to the
//! programmer backends.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Device flag word
    ///
    /// The raw word is forwarded to the programmer verbatim, so bits that
    /// have no named constant here are retained rather than dropped.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DeviceFlags: u32 {
        /// Chip supports a bulk erase command
        const CAN_ERASE           = 1 << 0;
        /// Chip reports an identifier
        const HAS_CHIP_ID         = 1 << 1;
        /// Data memory is addressed with an offset
        const HAS_DATA_OFFSET     = 1 << 2;
        /// Code memory is word organized
        const HAS_WORD            = 1 << 3;
        /// Write protection must be lifted before programming
        const OFF_PROTECT_BEFORE  = 1 << 4;
        /// Write protection should be set after programming
        const PROTECT_AFTER       = 1 << 5;
        /// Lock bits can be written but not read back
        const LOCK_BIT_WRITE_ONLY = 1 << 6;
        /// Chip carries calibration bytes
        const HAS_CALIBRATION     = 1 << 7;
        /// Chip is driven through the alternate (custom) protocol dialect
        const CUSTOM_PROTOCOL     = 1 << 15;
    }
}

impl Serialize for DeviceFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for DeviceFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(Self::from_bits_retain)
    }
}

/// Packed voltage word
///
/// The low 16 bits hold the VPP/VCC selectors, bits 16-19 an extra selector
/// nibble, and bit 31 marks that nibble as the one the firmware must use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Voltages(pub u32);

impl Voltages {
    /// Bit 31: the nibble in bits 16-19 overrides the low selector
    pub const OVERRIDE: u32 = 1 << 31;

    /// Raw packed value
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether the override bit is set
    pub const fn has_override(self) -> bool {
        self.0 & Self::OVERRIDE != 0
    }
}

/// Packed package-details word (pin count, adapter, ICSP wiring)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageDetails(pub u32);

impl PackageDetails {
    /// Raw packed value
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Pin count stored in the low byte
    pub const fn pin_count(self) -> u8 {
        self.0 as u8
    }
}

/// Fuse layout metadata attached to a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FuseLayout {
    /// Number of configuration fuses declared for the chip
    pub num_fuses: u8,
}

/// Chip descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    /// Chip name (e.g. "AT28C256")
    pub name: String,
    /// Programming protocol (algorithm family) identifier
    pub protocol_id: u8,
    /// Variant code; the high byte selects the algorithm number
    pub variant: u32,
    /// Code memory size in bytes
    pub code_memory_size: u32,
    /// Data memory size in bytes
    pub data_memory_size: u32,
    /// Secondary data memory size in bytes
    pub data_memory2_size: u32,
    /// Page size in bytes
    pub page_size: u16,
    /// Programming pulse delay
    pub pulse_delay: u16,
    /// Packed voltage selectors
    pub voltages: Voltages,
    /// Pin map index
    pub pin_map: u32,
    /// Chip information code
    pub chip_info: u32,
    /// Packed package details
    pub package_details: PackageDetails,
    /// Read transfer buffer size in bytes
    pub read_buffer_size: u16,
    /// Write transfer buffer size in bytes
    pub write_buffer_size: u16,
    /// Flag word
    pub flags: DeviceFlags,
    /// Expected chip identifier
    pub chip_id: u32,
    /// Number of significant bytes in the chip identifier
    pub chip_id_bytes_count: u8,
    /// Fuse layout, if the chip has configuration fuses
    pub fuses: Option<FuseLayout>,
}

impl Device {
    /// Whether this chip is driven through the alternate protocol dialect
    pub fn uses_alternate_dialect(&self) -> bool {
        self.flags.contains(DeviceFlags::CUSTOM_PROTOCOL)
    }

    /// Algorithm number selected by the variant's high byte
    pub fn algorithm_number(&self) -> u8 {
        (self.variant >> 8) as u8
    }

    /// Number of declared fuses, if a fuse layout is attached
    pub fn fuse_count(&self) -> Option<u8> {
        self.fuses.map(|f| f.num_fuses)
    }
}
