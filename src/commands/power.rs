//! Power and identification commands
//!
//! POWER_UP selects the receiver function (FM or AM) and the clock source,
//! POWER_DOWN returns the chip to its low power state, and GET_REV reads the
//! part and firmware identification. After POWER_UP the chip needs a settling
//! delay before CTS is reliable; the session handles that timing.

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::FromByteArray;

use crate::commands::StatusByte;
use crate::{Command, NoParameters, ToByteArray};

bitflags! {
    /// POWER_UP argument 1
    ///
    /// The low nibble carries the function code, see [`Function`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PowerUpFlags: u8 {
        /// CTS interrupt enable
        const CTSIEN = 0x80;
        /// GPO2 output enable
        const GPO2OEN = 0x40;
        /// Boot into patch mode
        const PATCH = 0x20;
        /// Crystal oscillator enable
        const XOSCEN = 0x10;
    }
}

/// Receiver function selected at power up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Function {
    FmReceive = 0x00,
    AmReceive = 0x01,
}

/// Audio output mode (POWER_UP argument 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioOutput {
    /// Analog audio on LOUT/ROUT
    Analog = 0x05,
    /// Digital audio on DOUT/DFS/DCLK
    Digital = 0xB0,
    /// Analog and digital outputs together
    AnalogAndDigital = 0xB5,
}

/// POWER_UP parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUpConfig {
    pub flags: PowerUpFlags,
    pub function: Function,
    pub output: AudioOutput,
}

impl ToByteArray for PowerUpConfig {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.flags.bits() | self.function as u8, self.output as u8])
    }
}

/// POWER_UP command (0x01)
///
/// # Important Notes
/// - Only accepted while the chip is powered down
/// - Wait 110 ms (external clock) or 500 ms (crystal) before the next command
/// - Properties revert to their defaults
#[derive(Debug, Clone)]
pub struct PowerUp {
    pub config: PowerUpConfig,
}

impl Command for PowerUp {
    type IdType = u8;
    type CommandParameters = PowerUpConfig;
    type ResponseParameters = StatusByte;

    fn id() -> Self::IdType {
        0x01
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.config
    }
}

/// POWER_DOWN command (0x11)
#[derive(Debug, Clone)]
pub struct PowerDown;

impl Command for PowerDown {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = StatusByte;

    fn id() -> Self::IdType {
        0x11
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

/// Part and firmware identification
///
/// # Format
/// - Byte 0: status
/// - Byte 1: final two digits of the part number (35 for Si4735)
/// - Bytes 2-3: firmware major/minor revision, ASCII
/// - Bytes 4-5: patch ID, big-endian
/// - Bytes 6-7: component major/minor revision, ASCII
/// - Byte 8: chip revision, ASCII
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Revision {
    pub status: StatusByte,
    pub part_number: u8,
    pub firmware_major: u8,
    pub firmware_minor: u8,
    pub patch_id: u16,
    pub component_major: u8,
    pub component_minor: u8,
    pub chip_revision: u8,
}

impl FromByteArray for Revision {
    type Error = Infallible;
    type Array = [u8; 9];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            status: StatusByte::from_bits_retain(bytes[0]),
            part_number: bytes[1],
            firmware_major: bytes[2],
            firmware_minor: bytes[3],
            patch_id: u16::from_be_bytes([bytes[4], bytes[5]]),
            component_major: bytes[6],
            component_minor: bytes[7],
            chip_revision: bytes[8],
        })
    }
}

/// GET_REV command (0x10)
///
/// Only valid after POWER_UP.
#[derive(Debug, Clone)]
pub struct GetRevision;

impl Command for GetRevision {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = Revision;

    fn id() -> Self::IdType {
        0x10
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

/// Extended 14 byte GET_REV frame
///
/// The standard record followed by five trailing bytes. Parts with an
/// extended revision block (library ID and friends) report it there; on the
/// Si4735 they are reserved and kept as read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExtendedRevision {
    pub revision: Revision,
    pub extended: [u8; 5],
}

impl FromByteArray for ExtendedRevision {
    type Error = Infallible;
    type Array = [u8; 14];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        let mut head = [0u8; 9];
        head.copy_from_slice(&bytes[..9]);
        let mut extended = [0u8; 5];
        extended.copy_from_slice(&bytes[9..]);

        Ok(Self {
            revision: Revision::from_bytes(head)?,
            extended,
        })
    }
}

/// GET_REV command (0x10), reading the extended frame
#[derive(Debug, Clone)]
pub struct GetRevisionLong;

impl Command for GetRevisionLong {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = ExtendedRevision;

    fn id() -> Self::IdType {
        0x10
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}
