//! Session configuration
//!
//! Everything board- or policy-specific lives here instead of in constants:
//! clock source, timing, band plans and the volume restored after a mode
//! switch.

use embedded_hal::pwm::SetDutyCycle;

use crate::commands::{AudioOutput, PowerUpFlags};
use crate::error::InvalidArgument;
use crate::mode::{Band, Mode};
use crate::ready::ReadyPolicy;

/// Valid reference clock range after prescaling, in Hz
pub const REFCLK_RANGE: core::ops::RangeInclusive<u32> = 31_130..=34_406;

/// Frequency of the standard watch crystal, in Hz
pub const CRYSTAL_FREQUENCY_HZ: u32 = 32_768;

/// Where the chip's reference clock comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// 32.768 kHz crystal on the chip's oscillator pins
    Crystal,
    /// Clock driven into RCLK by the host, e.g. from a PWM pin
    External {
        /// Frequency on RCLK in Hz
        frequency_hz: u32,
        /// Divider bringing `frequency_hz` into [`REFCLK_RANGE`]
        prescaler: u16,
    },
}

impl ClockSource {
    /// 131 kHz from a host PWM pin, divided by 4
    pub const PWM_131KHZ: Self = Self::External {
        frequency_hz: 131_000,
        prescaler: 4,
    };

    /// Value for REFCLK_FREQ
    pub fn reference_frequency(&self) -> u32 {
        match *self {
            Self::Crystal => CRYSTAL_FREQUENCY_HZ,
            Self::External {
                frequency_hz,
                prescaler,
            } => frequency_hz / u32::from(prescaler.max(1)),
        }
    }

    /// Value for REFCLK_PRESCALE
    pub fn prescaler(&self) -> u16 {
        match *self {
            Self::Crystal => 1,
            Self::External { prescaler, .. } => prescaler,
        }
    }

    /// POWER_UP flags implied by the clock source
    pub fn power_up_flags(&self) -> PowerUpFlags {
        match self {
            Self::Crystal => PowerUpFlags::XOSCEN,
            Self::External { .. } => PowerUpFlags::empty(),
        }
    }

    /// Checks that the prescaled clock lands in [`REFCLK_RANGE`]
    pub fn validate(&self) -> Result<(), InvalidArgument> {
        let prescaler = self.prescaler();
        let frequency = self.reference_frequency();
        if prescaler == 0 || prescaler >= 4096 || !REFCLK_RANGE.contains(&frequency) {
            let frequency_hz = match *self {
                Self::Crystal => CRYSTAL_FREQUENCY_HZ,
                Self::External { frequency_hz, .. } => frequency_hz,
            };
            return Err(InvalidArgument::ReferenceClock {
                frequency_hz,
                prescaler,
            });
        }
        Ok(())
    }
}

/// Delays and polling bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// How long the reset line is held low, in milliseconds
    pub reset_pulse_ms: u32,
    /// Settle time after POWER_UP with a crystal, in milliseconds
    pub crystal_settle_ms: u32,
    /// Settle time after POWER_UP with an external clock, in milliseconds
    pub external_clock_settle_ms: u32,
    /// Settle time after POWER_DOWN, in milliseconds
    pub power_down_settle_ms: u32,
    /// CTS polling after every command
    pub ready: ReadyPolicy,
    /// STCINT polling after tune and seek
    pub completion: ReadyPolicy,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            reset_pulse_ms: 100,
            crystal_settle_ms: 500,
            external_clock_settle_ms: 100,
            power_down_settle_ms: 100,
            ready: ReadyPolicy::default(),
            completion: ReadyPolicy::new(300, 10),
        }
    }
}

/// Configuration handed to [`Si4735::new`](crate::Si4735::new)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub clock: ClockSource,
    pub output: AudioOutput,
    pub timing: Timing,
    pub fm_band: Band,
    pub am_band: Band,
    /// Volume applied after every mode switch, 0..=63
    pub volume: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clock: ClockSource::Crystal,
            output: AudioOutput::Analog,
            timing: Timing::default(),
            fm_band: Band::FM,
            am_band: Band::AM,
            volume: 30,
        }
    }
}

impl Config {
    pub fn band(&self, mode: Mode) -> &Band {
        match mode {
            Mode::Fm => &self.fm_band,
            Mode::Am => &self.am_band,
        }
    }

    pub(crate) fn band_mut(&mut self, mode: Mode) -> &mut Band {
        match mode {
            Mode::Fm => &mut self.fm_band,
            Mode::Am => &mut self.am_band,
        }
    }

    /// Settling delay after POWER_UP for the configured clock source
    pub fn power_up_settle_ms(&self) -> u32 {
        match self.clock {
            ClockSource::Crystal => self.timing.crystal_settle_ms,
            ClockSource::External { .. } => self.timing.external_clock_settle_ms,
        }
    }
}

/// Starts a 50% duty PWM output to feed RCLK.
///
/// The PWM frequency itself is set through the HAL; it must match the
/// `frequency_hz` of [`ClockSource::External`].
pub fn start_reference_clock<P: SetDutyCycle>(pwm: &mut P) -> Result<(), P::Error> {
    pwm.set_duty_cycle_percent(50)
}
