//! Driver error types

use core::fmt;

use crate::commands::StatusByte;
use crate::session::State;

/// Failure to turn a raw response into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Fewer bytes arrived than the record needs
    ShortRead { expected: usize, actual: usize },
    /// More bytes arrived than the record holds
    TrailingBytes { expected: usize, actual: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortRead { expected, actual } => {
                write!(f, "short read: expected {expected} bytes, got {actual}")
            }
            Self::TrailingBytes { expected, actual } => {
                write!(f, "response too long: expected {expected} bytes, got {actual}")
            }
        }
    }
}

/// An argument rejected before it reached the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InvalidArgument {
    /// Channel outside the configured band limits
    Frequency { channel: u16, bottom: u16, top: u16 },
    /// Volume above the chip maximum of 63
    Volume(u8),
    /// Band limits inverted or outside the hardware range of the mode
    BandLimits { bottom: u16, top: u16 },
    /// Zero frequency step
    Step(u16),
    /// Seek RSSI or SNR threshold above the mode maximum
    SeekThreshold { rssi: u8, snr: u8 },
    /// Reference clock outside 31130..=34406 Hz after prescaling
    ReferenceClock { frequency_hz: u32, prescaler: u16 },
}

/// Errors returned by the driver.
///
/// `E` is the error type of the underlying [`Transport`](crate::Transport).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Neither legal bus address answered
    DeviceNotFound,
    /// The transport failed; never retried by the driver
    Bus(E),
    /// CTS (or a completion flag) was not observed within the configured wait
    Timeout,
    /// The chip accepted the command but raised its ERR flag
    Chip(StatusByte),
    /// A response did not have the expected length
    Decode(DecodeError),
    /// Rejected before any bus traffic
    InvalidArgument(InvalidArgument),
    /// The operation is not legal in the current session state
    InvalidState(State),
    /// Driving the reset line failed
    ResetPin,
}

impl<E> From<DecodeError> for Error<E> {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}

impl<E> From<InvalidArgument> for Error<E> {
    fn from(err: InvalidArgument) -> Self {
        Self::InvalidArgument(err)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceNotFound => f.write_str("no Si4735 found at 0x11 or 0x63"),
            Self::Bus(err) => write!(f, "bus error: {err:?}"),
            Self::Timeout => f.write_str("timed out waiting for the chip"),
            Self::Chip(status) => write!(f, "chip reported an error (status {:#04x})", status.bits()),
            Self::Decode(err) => write!(f, "{err}"),
            Self::InvalidArgument(arg) => write!(f, "invalid argument: {arg:?}"),
            Self::InvalidState(state) => write!(f, "operation not allowed in state {state:?}"),
            Self::ResetPin => f.write_str("failed to drive the reset line"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Error<E> {}
