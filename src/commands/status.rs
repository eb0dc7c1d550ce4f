//! Status commands
//!
//! This module contains the interrupt status query and the per-mode tune and
//! received signal quality (RSQ) queries. Every Si4735 response begins with
//! the same status byte; the records here decode the bytes that follow it.
//!
//! Record lengths are fixed. Reserved bits are passed through untouched.

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::FromByteArray;

use crate::{Command, NoParameters, ToByteArray};

bitflags! {
    /// The status byte returned first in every response
    ///
    /// # Format
    /// - Bit 7: CTS, chip ready for the next command
    /// - Bit 6: ERR, the last command failed
    /// - Bit 3: RSQINT, signal quality interrupt
    /// - Bit 2: RDSINT, RDS interrupt
    /// - Bit 1: ASQINT, audio signal quality interrupt
    /// - Bit 0: STCINT, seek/tune complete
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusByte: u8 {
        /// Clear to send
        const CTS = 0x80;
        /// Error in the last command
        const ERR = 0x40;
        /// Received signal quality interrupt
        const RSQINT = 0x08;
        /// RDS interrupt
        const RDSINT = 0x04;
        /// Audio signal quality interrupt
        const ASQINT = 0x02;
        /// Seek/tune complete
        const STCINT = 0x01;

        const _ = !0;
    }
}

impl StatusByte {
    /// Chip is ready to accept another command
    pub fn is_clear_to_send(self) -> bool {
        self.contains(Self::CTS)
    }

    /// Chip flagged the previous command as failed
    pub fn is_error(self) -> bool {
        self.contains(Self::ERR)
    }

    /// Seek or tune has completed
    pub fn is_tune_complete(self) -> bool {
        self.contains(Self::STCINT)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusByte {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "StatusByte({=u8:#04x})", self.bits())
    }
}

impl FromByteArray for StatusByte {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self::from_bits_retain(bytes[0]))
    }
}

/// GET_INT_STATUS command (0x14)
///
/// Refreshes and returns the status byte. This is how seek/tune completion
/// (STCINT) is observed without an interrupt line.
#[derive(Debug, Clone)]
pub struct GetIntStatus;

impl Command for GetIntStatus {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = StatusByte;

    fn id() -> Self::IdType {
        0x14
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

bitflags! {
    /// Argument byte for the TUNE_STATUS and RSQ_STATUS queries
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusQueryFlags: u8 {
        /// Cancel a seek in progress (TUNE_STATUS only)
        const CANCEL = 0x02;
        /// Acknowledge and clear the pending interrupt
        const INTACK = 0x01;
    }
}

impl ToByteArray for StatusQueryFlags {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}

/// Tune status record
///
/// # Format
/// - Byte 0: status
/// - Byte 1: bit 7 band limit reached, bit 1 AFC railed, bit 0 valid channel
/// - Bytes 2-3: tuned frequency, big-endian, in the mode's channel units
/// - Byte 4: RSSI in dBµV
/// - Byte 5: SNR in dB
/// - Byte 6: multipath indicator (FM) or antenna cap high byte (AM)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TuneStatus {
    pub status: StatusByte,
    /// A seek hit the band limit
    pub band_limit: bool,
    pub afc_railed: bool,
    /// Channel meets the seek/tune validity thresholds
    pub valid: bool,
    /// FM: 10 kHz units, AM: 1 kHz units
    pub frequency: u16,
    pub rssi: u8,
    pub snr: u8,
    /// Raw byte 6. FM: multipath indicator. AM: high byte of the antenna
    /// tuning capacitor (READANTCAPH), not a multipath value.
    pub multipath: u8,
}

impl FromByteArray for TuneStatus {
    type Error = Infallible;
    type Array = [u8; 7];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            status: StatusByte::from_bits_retain(bytes[0]),
            band_limit: bytes[1] & 0x80 != 0,
            afc_railed: bytes[1] & 0x02 != 0,
            valid: bytes[1] & 0x01 != 0,
            frequency: u16::from_be_bytes([bytes[2], bytes[3]]),
            rssi: bytes[4],
            snr: bytes[5],
            multipath: bytes[6],
        })
    }
}

/// FM_TUNE_STATUS command (0x22)
#[derive(Debug, Clone)]
pub struct FmTuneStatus {
    pub flags: StatusQueryFlags,
}

impl Command for FmTuneStatus {
    type IdType = u8;
    type CommandParameters = StatusQueryFlags;
    type ResponseParameters = TuneStatus;

    fn id() -> Self::IdType {
        0x22
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.flags
    }
}

/// AM_TUNE_STATUS command (0x42)
#[derive(Debug, Clone)]
pub struct AmTuneStatus {
    pub flags: StatusQueryFlags,
}

impl Command for AmTuneStatus {
    type IdType = u8;
    type CommandParameters = StatusQueryFlags;
    type ResponseParameters = TuneStatus;

    fn id() -> Self::IdType {
        0x42
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.flags
    }
}

/// Received signal quality record
///
/// # Format
/// - Byte 0: status
/// - Byte 1: RSQ interrupt sources (blend, multipath, SNR, RSSI high/low)
/// - Byte 2: bit 3 soft mute, bit 1 AFC railed, bit 0 valid channel
/// - Byte 3: bit 7 stereo pilot, bits 6:0 stereo blend percentage (FM only)
/// - Byte 4: RSSI in dBµV
/// - Byte 5: SNR in dB
/// - Byte 6: multipath indicator (FM only)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RsqStatus {
    pub status: StatusByte,
    pub interrupts: u8,
    pub soft_mute: bool,
    pub afc_railed: bool,
    pub valid: bool,
    /// Stereo pilot present
    pub pilot: bool,
    pub stereo_blend: u8,
    pub rssi: u8,
    pub snr: u8,
    pub multipath: u8,
}

impl FromByteArray for RsqStatus {
    type Error = Infallible;
    type Array = [u8; 7];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            status: StatusByte::from_bits_retain(bytes[0]),
            interrupts: bytes[1],
            soft_mute: bytes[2] & 0x08 != 0,
            afc_railed: bytes[2] & 0x02 != 0,
            valid: bytes[2] & 0x01 != 0,
            pilot: bytes[3] & 0x80 != 0,
            stereo_blend: bytes[3] & 0x7F,
            rssi: bytes[4],
            snr: bytes[5],
            multipath: bytes[6],
        })
    }
}

/// FM_RSQ_STATUS command (0x23)
#[derive(Debug, Clone)]
pub struct FmRsqStatus {
    pub flags: StatusQueryFlags,
}

impl Command for FmRsqStatus {
    type IdType = u8;
    type CommandParameters = StatusQueryFlags;
    type ResponseParameters = RsqStatus;

    fn id() -> Self::IdType {
        0x23
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.flags
    }
}

/// AM_RSQ_STATUS command (0x43)
#[derive(Debug, Clone)]
pub struct AmRsqStatus {
    pub flags: StatusQueryFlags,
}

impl Command for AmRsqStatus {
    type IdType = u8;
    type CommandParameters = StatusQueryFlags;
    type ResponseParameters = RsqStatus;

    fn id() -> Self::IdType {
        0x43
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.flags
    }
}
