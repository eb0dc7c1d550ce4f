//! Property commands
//!
//! Properties are 16 bit configuration values addressed by a 16 bit id, see
//! [`crate::properties`]. Both id and value travel big-endian behind a
//! reserved zero byte. The chip keeps no history: every read and write here
//! is a bus transaction.

use core::convert::Infallible;

use regiface::FromByteArray;

use crate::commands::StatusByte;
use crate::properties::PropertyId;
use crate::{Command, ToByteArray};

/// SET_PROPERTY parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyWrite {
    pub id: PropertyId,
    pub value: u16,
}

impl ToByteArray for PropertyWrite {
    type Error = Infallible;
    type Array = [u8; 5];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let [id_hi, id_lo] = self.id.0.to_be_bytes();
        let [value_hi, value_lo] = self.value.to_be_bytes();
        Ok([0x00, id_hi, id_lo, value_hi, value_lo])
    }
}

/// SET_PROPERTY command (0x12)
///
/// # Important Notes
/// - Only valid while powered up
/// - Takes up to 10 ms to apply
#[derive(Debug, Clone)]
pub struct SetProperty {
    pub property: PropertyWrite,
}

impl SetProperty {
    pub fn new(id: PropertyId, value: u16) -> Self {
        Self {
            property: PropertyWrite { id, value },
        }
    }
}

impl Command for SetProperty {
    type IdType = u8;
    type CommandParameters = PropertyWrite;
    type ResponseParameters = StatusByte;

    fn id() -> Self::IdType {
        0x12
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.property
    }
}

impl ToByteArray for PropertyId {
    type Error = Infallible;
    type Array = [u8; 3];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let [hi, lo] = self.0.to_be_bytes();
        Ok([0x00, hi, lo])
    }
}

/// GET_PROPERTY response
///
/// # Format
/// - Byte 0: status
/// - Byte 1: reserved
/// - Bytes 2-3: property value, big-endian
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PropertyValue {
    pub status: StatusByte,
    pub value: u16,
}

impl FromByteArray for PropertyValue {
    type Error = Infallible;
    type Array = [u8; 4];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            status: StatusByte::from_bits_retain(bytes[0]),
            value: u16::from_be_bytes([bytes[2], bytes[3]]),
        })
    }
}

/// GET_PROPERTY command (0x13)
#[derive(Debug, Clone)]
pub struct GetProperty {
    pub id: PropertyId,
}

impl Command for GetProperty {
    type IdType = u8;
    type CommandParameters = PropertyId;
    type ResponseParameters = PropertyValue;

    fn id() -> Self::IdType {
        0x13
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.id
    }
}
