//! Programmer trait definitions

use crate::error::Result;

use super::types::{ChipId, MemoryClass, SpiPackage, StatusReport};

/// Programmer trait
///
/// The full operation set of a TL-series programmer. Each protocol dialect
/// (the native fixed-frame protocol, the alternate bit-banged protocol)
/// implements it, and callers only ever see this trait.
///
/// Every operation except [`status`](Programmer::status) expects a session
/// opened with [`begin`](Programmer::begin). Calling them outside a session is
/// a contract violation; implementations are not required to detect it.
///
/// ## Example
///
/// ```ignore
/// fn read_lock_byte<P: Programmer>(prog: &mut P) -> Result<u8> {
///     let mut lock = [0u8; 1];
///     prog.begin()?;
///     prog.read_fuses(MemoryClass::LockFuses, 1, &mut lock)?;
///     prog.end()?;
///     Ok(lock[0])
/// }
/// ```
pub trait Programmer {
    /// Open a programming session
    fn begin(&mut self) -> Result<()>;

    /// Close the programming session
    fn end(&mut self) -> Result<()>;

    /// Read `buf.len()` bytes of `class` memory starting at `addr`
    fn read_block(&mut self, class: MemoryClass, addr: u32, buf: &mut [u8]) -> Result<()>;

    /// Write one transfer block of `class` memory at `addr`
    ///
    /// `len` is the number of valid bytes in the block and may be shorter
    /// than `data`, e.g. for the last chunk of an image. `data` must still
    /// cover a full transfer buffer.
    fn write_block(&mut self, class: MemoryClass, addr: u32, len: u16, data: &[u8]) -> Result<()>;

    /// Read `buf.len()` fuse bytes of `class` covering `items` fuse items
    fn read_fuses(&mut self, class: MemoryClass, items: u8, buf: &mut [u8]) -> Result<()>;

    /// Write fuse bytes of `class`
    ///
    /// `None` signals that there are no fuses to write.
    fn write_fuses(&mut self, class: MemoryClass, items: u8, data: Option<&[u8]>) -> Result<()>;

    /// Read `buf.len()` calibration bytes
    fn read_calibration(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Read the chip identifier
    fn chip_id(&mut self) -> Result<ChipId>;

    /// Identify an unknown 25-series SPI flash and return its 3-byte JEDEC id
    fn spi_autodetect(&mut self, package: SpiPackage) -> Result<u32>;

    /// Clear write protection
    fn protect_off(&mut self) -> Result<()>;

    /// Set write protection
    fn protect_on(&mut self) -> Result<()>;

    /// Erase the chip
    fn erase(&mut self) -> Result<()>;

    /// Read one JEDEC fuse row of `bit_size` bits into `buf`
    fn read_jedec_row(&mut self, row: u8, flags: u8, bit_size: u8, buf: &mut [u8]) -> Result<()>;

    /// Write one JEDEC fuse row of `bit_size` bits from `data`
    fn write_jedec_row(&mut self, row: u8, flags: u8, bit_size: u8, data: &[u8]) -> Result<()>;

    /// Poll the programmer status
    ///
    /// The overcurrent flag is always reported; the detailed record only when
    /// `want_record` is set and the dialect supports it.
    fn status(&mut self, want_record: bool) -> Result<StatusReport>;
}

impl<P: Programmer + ?Sized> Programmer for Box<P> {
    fn begin(&mut self) -> Result<()> {
        (**self).begin()
    }

    fn end(&mut self) -> Result<()> {
        (**self).end()
    }

    fn read_block(&mut self, class: MemoryClass, addr: u32, buf: &mut [u8]) -> Result<()> {
        (**self).read_block(class, addr, buf)
    }

    fn write_block(&mut self, class: MemoryClass, addr: u32, len: u16, data: &[u8]) -> Result<()> {
        (**self).write_block(class, addr, len, data)
    }

    fn read_fuses(&mut self, class: MemoryClass, items: u8, buf: &mut [u8]) -> Result<()> {
        (**self).read_fuses(class, items, buf)
    }

    fn write_fuses(&mut self, class: MemoryClass, items: u8, data: Option<&[u8]>) -> Result<()> {
        (**self).write_fuses(class, items, data)
    }

    fn read_calibration(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_calibration(buf)
    }

    fn chip_id(&mut self) -> Result<ChipId> {
        (**self).chip_id()
    }

    fn spi_autodetect(&mut self, package: SpiPackage) -> Result<u32> {
        (**self).spi_autodetect(package)
    }

    fn protect_off(&mut self) -> Result<()> {
        (**self).protect_off()
    }

    fn protect_on(&mut self) -> Result<()> {
        (**self).protect_on()
    }

    fn erase(&mut self) -> Result<()> {
        (**self).erase()
    }

    fn read_jedec_row(&mut self, row: u8, flags: u8, bit_size: u8, buf: &mut [u8]) -> Result<()> {
        (**self).read_jedec_row(row, flags, bit_size, buf)
    }

    fn write_jedec_row(&mut self, row: u8, flags: u8, bit_size: u8, data: &[u8]) -> Result<()> {
        (**self).write_jedec_row(row, flags, bit_size, data)
    }

    fn status(&mut self, want_record: bool) -> Result<StatusReport> {
        (**self).status(want_record)
    }
}

/// Information about a programmer backend
#[derive(Debug, Clone)]
pub struct ProgrammerInfo {
    /// Name of the programmer
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Description
    pub description: &'static str,
}
