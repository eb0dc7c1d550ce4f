//! Receiver modes and band plans
//!
//! The mode decides which opcodes, properties and frequency units apply.
//! FM frequencies travel in 10 kHz channel units (10110 is 101.1 MHz), AM
//! frequencies in 1 kHz units (810 is 810 kHz). Mixing the two scales is the
//! classic way to land on the wrong station, so every conversion goes
//! through [`Mode`].

use crate::commands::Function;
use crate::properties::PropertyId;

/// Receiver mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Fm,
    Am,
}

impl Mode {
    /// POWER_UP function code for this mode
    pub fn function(self) -> Function {
        match self {
            Self::Fm => Function::FmReceive,
            Self::Am => Function::AmReceive,
        }
    }

    /// Size of one channel unit in kHz
    pub fn khz_per_unit(self) -> u32 {
        match self {
            Self::Fm => 10,
            Self::Am => 1,
        }
    }

    /// Range the tuner hardware accepts, in channel units
    pub fn hardware_range(self) -> (u16, u16) {
        match self {
            Self::Fm => (6400, 10800),
            Self::Am => (149, 23000),
        }
    }

    /// Converts kHz to channel units.
    ///
    /// Returns `None` when the frequency is not a whole number of channel
    /// units or does not fit the 16 bit argument.
    pub fn channel_from_khz(self, khz: u32) -> Option<u16> {
        let unit = self.khz_per_unit();
        if khz % unit != 0 {
            return None;
        }
        u16::try_from(khz / unit).ok()
    }

    /// Converts channel units to kHz
    pub fn khz_from_channel(self, channel: u16) -> u32 {
        u32::from(channel) * self.khz_per_unit()
    }

    /// Seek band property pair (bottom, top)
    pub(crate) fn band_properties(self) -> (PropertyId, PropertyId) {
        match self {
            Self::Fm => (PropertyId::FM_SEEK_BAND_BOTTOM, PropertyId::FM_SEEK_BAND_TOP),
            Self::Am => (PropertyId::AM_SEEK_BAND_BOTTOM, PropertyId::AM_SEEK_BAND_TOP),
        }
    }

    /// Seek validity threshold property pair (RSSI, SNR)
    pub(crate) fn seek_threshold_properties(self) -> (PropertyId, PropertyId) {
        match self {
            Self::Fm => (
                PropertyId::FM_SEEK_TUNE_RSSI_THRESHOLD,
                PropertyId::FM_SEEK_TUNE_SNR_THRESHOLD,
            ),
            Self::Am => (PropertyId::AM_SEEK_RSSI_THRESHOLD, PropertyId::AM_SEEK_SNR_THRESHOLD),
        }
    }

    /// Largest seek RSSI/SNR threshold the chip accepts
    pub fn seek_threshold_max(self) -> u8 {
        match self {
            Self::Fm => 127,
            Self::Am => 63,
        }
    }

    /// Seek spacing property
    pub(crate) fn spacing_property(self) -> PropertyId {
        match self {
            Self::Fm => PropertyId::FM_SEEK_FREQ_SPACING,
            Self::Am => PropertyId::AM_SEEK_FREQ_SPACING,
        }
    }
}

/// Tunable range and step for one mode, in channel units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Band {
    pub bottom: u16,
    pub top: u16,
    /// Increment used by frequency stepping and seek spacing
    pub step: u16,
}

impl Band {
    /// 64 - 108 MHz in 100 kHz steps
    pub const FM: Self = Self {
        bottom: 6400,
        top: 10800,
        step: 10,
    };

    /// 520 - 1710 kHz in 10 kHz steps
    pub const AM: Self = Self {
        bottom: 520,
        top: 1710,
        step: 10,
    };

    pub fn contains(&self, channel: u16) -> bool {
        (self.bottom..=self.top).contains(&channel)
    }

    /// Band limits are ordered and inside the hardware range of `mode`
    pub fn fits(&self, mode: Mode) -> bool {
        let (low, high) = mode.hardware_range();
        self.bottom < self.top && self.bottom >= low && self.top <= high
    }

    /// Next channel one step away, wrapping at the band edges
    pub fn step_from(&self, channel: u16, direction: Direction) -> u16 {
        match direction {
            Direction::Up => match channel.checked_add(self.step) {
                Some(next) if next <= self.top => next,
                _ => self.bottom,
            },
            Direction::Down => match channel.checked_sub(self.step) {
                Some(next) if next >= self.bottom => next,
                _ => self.top,
            },
        }
    }
}

/// Direction for seek and frequency stepping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Up,
    Down,
}
