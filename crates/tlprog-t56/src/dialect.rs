//! Protocol dialect selection
//!
//! Some chips are driven by a bit-banged protocol instead of the native
//! frames. Which dialect a chip uses is fixed by its descriptor, so the
//! choice is made once when the session is built and every operation is
//! then dispatched to the selected implementation.

use tlprog_core::error::{Error, Result};
use tlprog_core::programmer::{ChipId, MemoryClass, Programmer, SpiPackage, StatusReport};

use crate::device::{SessionState, T56};
use crate::transport::Transport;

/// A T56 session bound to the dialect its device requires
pub enum Session<T: Transport> {
    /// Native fixed-frame protocol
    Native(T56<T>),
    /// Alternate dialect
    ///
    /// The native link still uploads the bitstream, checks overcurrent when
    /// the session opens and answers status polls.
    Alternate {
        /// Native link to the programmer
        link: T56<T>,
        /// Alternate dialect implementation
        dialect: Box<dyn Programmer>,
    },
}

impl<T: Transport> Session<T> {
    /// Select the dialect from the device's custom protocol flag
    ///
    /// Fails if the device needs the alternate dialect and none was given.
    pub fn select(link: T56<T>, alternate: Option<Box<dyn Programmer>>) -> Result<Self> {
        if !link.device().uses_alternate_dialect() {
            if alternate.is_some() {
                log::debug!(
                    "t56: {} uses the native protocol, ignoring the alternate dialect",
                    link.device().name
                );
            }
            return Ok(Session::Native(link));
        }

        match alternate {
            Some(dialect) => {
                log::debug!("t56: {} uses the alternate dialect", link.device().name);
                Ok(Session::Alternate { link, dialect })
            }
            None => Err(Error::InvalidParameter(format!(
                "{} requires the alternate protocol dialect",
                link.device().name
            ))),
        }
    }

    /// The native link
    pub fn link(&self) -> &T56<T> {
        match self {
            Session::Native(link) | Session::Alternate { link, .. } => link,
        }
    }

    /// Mutably borrow the native link
    pub fn link_mut(&mut self) -> &mut T56<T> {
        match self {
            Session::Native(link) | Session::Alternate { link, .. } => link,
        }
    }

    /// Whether operations go to the alternate dialect
    pub fn is_alternate(&self) -> bool {
        matches!(self, Session::Alternate { .. })
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.link().state()
    }

    fn active(&mut self) -> &mut dyn Programmer {
        match self {
            Session::Native(link) => link as &mut dyn Programmer,
            Session::Alternate { dialect, .. } => dialect.as_mut(),
        }
    }
}

impl<T: Transport> Programmer for Session<T> {
    fn begin(&mut self) -> Result<()> {
        match self {
            Session::Native(link) => link.begin(),
            Session::Alternate { link, dialect } => link.open_session(|_| dialect.begin()),
        }
    }

    fn end(&mut self) -> Result<()> {
        match self {
            Session::Native(link) => link.end(),
            Session::Alternate { link, dialect } => {
                dialect.end()?;
                link.close_session();
                Ok(())
            }
        }
    }

    fn read_block(&mut self, class: MemoryClass, addr: u32, buf: &mut [u8]) -> Result<()> {
        self.active().read_block(class, addr, buf)
    }

    fn write_block(&mut self, class: MemoryClass, addr: u32, len: u16, data: &[u8]) -> Result<()> {
        self.active().write_block(class, addr, len, data)
    }

    fn read_fuses(&mut self, class: MemoryClass, items: u8, buf: &mut [u8]) -> Result<()> {
        self.active().read_fuses(class, items, buf)
    }

    fn write_fuses(&mut self, class: MemoryClass, items: u8, data: Option<&[u8]>) -> Result<()> {
        self.active().write_fuses(class, items, data)
    }

    fn read_calibration(&mut self, buf: &mut [u8]) -> Result<()> {
        self.active().read_calibration(buf)
    }

    fn chip_id(&mut self) -> Result<ChipId> {
        self.active().chip_id()
    }

    fn spi_autodetect(&mut self, package: SpiPackage) -> Result<u32> {
        self.active().spi_autodetect(package)
    }

    fn protect_off(&mut self) -> Result<()> {
        self.active().protect_off()
    }

    fn protect_on(&mut self) -> Result<()> {
        self.active().protect_on()
    }

    fn erase(&mut self) -> Result<()> {
        self.active().erase()
    }

    fn read_jedec_row(&mut self, row: u8, flags: u8, bit_size: u8, buf: &mut [u8]) -> Result<()> {
        self.active().read_jedec_row(row, flags, bit_size, buf)
    }

    fn write_jedec_row(&mut self, row: u8, flags: u8, bit_size: u8, data: &[u8]) -> Result<()> {
        self.active().write_jedec_row(row, flags, bit_size, data)
    }

    fn status(&mut self, want_record: bool) -> Result<StatusReport> {
        self.link_mut().poll_status(want_record)
    }
}
