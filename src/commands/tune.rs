//! Tune and seek commands
//!
//! FM and AM use separate opcodes with different argument layouts. The
//! frequency argument is always in the channel units of the mode: 10 kHz for
//! FM, 1 kHz for AM. Completion is signalled through STCINT in the status
//! byte, not through CTS.

use core::convert::Infallible;

use bitflags::bitflags;

use crate::commands::StatusByte;
use crate::{Command, ToByteArray};

bitflags! {
    /// Argument 1 of FM_TUNE_FREQ and AM_TUNE_FREQ
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TuneFlags: u8 {
        /// Freeze the FM metrics during tuning (FM only)
        const FREEZE = 0x02;
        /// Skip the validation metrics for a faster tune
        const FAST = 0x01;
    }
}

/// FM_TUNE_FREQ parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FmTuneConfig {
    pub flags: TuneFlags,
    /// 10 kHz units, 6400..=10800
    pub frequency: u16,
    /// Antenna tuning capacitor, 0 selects automatic
    pub antenna_cap: u8,
}

impl ToByteArray for FmTuneConfig {
    type Error = Infallible;
    type Array = [u8; 4];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let [hi, lo] = self.frequency.to_be_bytes();
        Ok([self.flags.bits(), hi, lo, self.antenna_cap])
    }
}

/// FM_TUNE_FREQ command (0x20)
///
/// CTS returns quickly; STCINT is raised once the tune finishes.
#[derive(Debug, Clone)]
pub struct FmTuneFreq {
    pub config: FmTuneConfig,
}

impl FmTuneFreq {
    pub fn new(frequency: u16) -> Self {
        Self {
            config: FmTuneConfig {
                flags: TuneFlags::empty(),
                frequency,
                antenna_cap: 0,
            },
        }
    }
}

impl Command for FmTuneFreq {
    type IdType = u8;
    type CommandParameters = FmTuneConfig;
    type ResponseParameters = StatusByte;

    fn id() -> Self::IdType {
        0x20
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.config
    }
}

/// AM_TUNE_FREQ parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmTuneConfig {
    pub flags: TuneFlags,
    /// 1 kHz units, 149..=23000
    pub frequency: u16,
    /// Antenna tuning capacitor, 0 selects automatic
    pub antenna_cap: u16,
}

impl ToByteArray for AmTuneConfig {
    type Error = Infallible;
    type Array = [u8; 5];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let [hi, lo] = self.frequency.to_be_bytes();
        let [cap_hi, cap_lo] = self.antenna_cap.to_be_bytes();
        Ok([(self.flags & TuneFlags::FAST).bits(), hi, lo, cap_hi, cap_lo])
    }
}

/// AM_TUNE_FREQ command (0x40)
#[derive(Debug, Clone)]
pub struct AmTuneFreq {
    pub config: AmTuneConfig,
}

impl AmTuneFreq {
    pub fn new(frequency: u16) -> Self {
        Self {
            config: AmTuneConfig {
                flags: TuneFlags::empty(),
                frequency,
                antenna_cap: 0,
            },
        }
    }
}

impl Command for AmTuneFreq {
    type IdType = u8;
    type CommandParameters = AmTuneConfig;
    type ResponseParameters = StatusByte;

    fn id() -> Self::IdType {
        0x40
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.config
    }
}

bitflags! {
    /// Argument 1 of FM_SEEK_START and AM_SEEK_START
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SeekFlags: u8 {
        /// Seek towards higher frequencies
        const SEEK_UP = 0x08;
        /// Wrap around at the band limits instead of stopping
        const WRAP = 0x04;
    }
}

impl ToByteArray for SeekFlags {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}

/// FM_SEEK_START command (0x21)
#[derive(Debug, Clone)]
pub struct FmSeekStart {
    pub flags: SeekFlags,
}

impl Command for FmSeekStart {
    type IdType = u8;
    type CommandParameters = SeekFlags;
    type ResponseParameters = StatusByte;

    fn id() -> Self::IdType {
        0x21
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.flags
    }
}

/// AM_SEEK_START parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmSeekConfig {
    pub flags: SeekFlags,
    pub antenna_cap: u16,
}

impl ToByteArray for AmSeekConfig {
    type Error = Infallible;
    type Array = [u8; 5];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let [cap_hi, cap_lo] = self.antenna_cap.to_be_bytes();
        Ok([self.flags.bits(), 0x00, 0x00, cap_hi, cap_lo])
    }
}

/// AM_SEEK_START command (0x41)
#[derive(Debug, Clone)]
pub struct AmSeekStart {
    pub config: AmSeekConfig,
}

impl Command for AmSeekStart {
    type IdType = u8;
    type CommandParameters = AmSeekConfig;
    type ResponseParameters = StatusByte;

    fn id() -> Self::IdType {
        0x41
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.config
    }
}
