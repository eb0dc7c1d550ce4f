//! Bus transport and device addressing
//!
//! The driver talks to the chip through [`Transport`], a byte-oriented
//! write/read/probe interface addressed by 7-bit bus address. Every
//! `embedded_hal::i2c::I2c` bus is a transport.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

use crate::error::Error;

/// Byte-oriented bus access
pub trait Transport {
    /// Error type for bus operations
    type Error: core::fmt::Debug;

    /// Write `bytes` to the device at `address`
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Read into `buffer` from the device at `address`
    ///
    /// Returns the number of bytes actually received.
    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<usize, Self::Error>;

    /// Whether a device acknowledges `address`
    fn probe(&mut self, address: u8) -> Result<bool, Self::Error>;
}

impl<T: I2c> Transport for T {
    type Error = T::Error;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        I2c::write(self, address, bytes)
    }

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        I2c::read(self, address, buffer)?;
        Ok(buffer.len())
    }

    fn probe(&mut self, address: u8) -> Result<bool, Self::Error> {
        match I2c::write(self, address, &[]) {
            Ok(()) => Ok(true),
            Err(err) if matches!(err.kind(), ErrorKind::NoAcknowledge(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

/// Bus address of the chip, selected by the SEN pin
///
/// Only the two legal addresses exist as values, so an unresolved or zero
/// address cannot be handed to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceAddress {
    /// SEN tied low
    Primary = 0x11,
    /// SEN tied high
    Secondary = 0x63,
}

impl DeviceAddress {
    /// Probe order: first match wins
    pub const CANDIDATES: [Self; 2] = [Self::Primary, Self::Secondary];

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for DeviceAddress {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x11 => Ok(Self::Primary),
            0x63 => Ok(Self::Secondary),
            invalid => Err(invalid),
        }
    }
}

/// Finds the chip on the bus.
///
/// Probes each legal address in [`DeviceAddress::CANDIDATES`] order.
///
/// # Errors
/// * `Error::DeviceNotFound` - neither address acknowledged
/// * `Error::Bus` - the probe itself failed
pub fn resolve_address<T: Transport>(transport: &mut T) -> Result<DeviceAddress, Error<T::Error>> {
    for candidate in DeviceAddress::CANDIDATES {
        if transport.probe(candidate.as_u8()).map_err(Error::Bus)? {
            return Ok(candidate);
        }
    }
    Err(Error::DeviceNotFound)
}
