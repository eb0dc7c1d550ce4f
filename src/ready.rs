//! Readiness gate
//!
//! After each command the chip holds CTS low until it can take the next one.
//! The gate reads the status byte until CTS is set, with a fixed delay between
//! reads and a hard cap on the number of reads. Reading the status byte is
//! not a command, so polling never violates the CTS rule.

use embedded_hal::delay::DelayNs;
use embedded_hal_async::delay::DelayNs as AsyncDelayNs;
use embedded_hal_async::i2c::I2c as AsyncI2c;

use crate::commands::StatusByte;
use crate::error::{DecodeError, Error};
use crate::transport::{DeviceAddress, Transport};

/// Bounded polling schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadyPolicy {
    /// Number of status reads before giving up
    pub max_attempts: u32,
    /// Delay between reads in milliseconds
    pub poll_interval_ms: u32,
}

impl ReadyPolicy {
    pub const fn new(max_attempts: u32, poll_interval_ms: u32) -> Self {
        Self {
            max_attempts,
            poll_interval_ms,
        }
    }

    /// Upper bound on the time spent waiting, in milliseconds
    pub fn max_wait_ms(&self) -> u32 {
        self.max_attempts.saturating_mul(self.poll_interval_ms)
    }
}

impl Default for ReadyPolicy {
    /// 50 reads, 10 ms apart: 500 ms
    fn default() -> Self {
        Self::new(50, 10)
    }
}

/// Polls the status byte until CTS is set.
///
/// Returns the status byte that carried CTS. ERR may be set alongside it;
/// deciding what that means is left to the caller.
///
/// # Errors
/// * `Error::Timeout` - CTS not seen within `policy.max_attempts` reads
/// * `Error::Bus` - the status read failed
/// * `Error::Decode` - the status read returned no byte
pub fn await_ready<T, D>(
    transport: &mut T,
    address: DeviceAddress,
    delay: &mut D,
    policy: &ReadyPolicy,
) -> Result<StatusByte, Error<T::Error>>
where
    T: Transport,
    D: DelayNs,
{
    for attempt in 0..policy.max_attempts {
        if attempt > 0 {
            delay.delay_ms(policy.poll_interval_ms);
        }

        let mut raw = [0u8; 1];
        let received = transport
            .read(address.as_u8(), &mut raw)
            .map_err(Error::Bus)?;
        if received < raw.len() {
            return Err(DecodeError::ShortRead {
                expected: raw.len(),
                actual: received,
            }
            .into());
        }

        let status = StatusByte::from_bits_retain(raw[0]);
        if status.is_clear_to_send() {
            return Ok(status);
        }
    }

    Err(Error::Timeout)
}

/// Polls the status byte until CTS is set, without blocking the executor.
///
/// Same schedule and results as [`await_ready`].
pub async fn await_ready_async<T, D>(
    bus: &mut T,
    address: DeviceAddress,
    delay: &mut D,
    policy: &ReadyPolicy,
) -> Result<StatusByte, Error<T::Error>>
where
    T: AsyncI2c,
    D: AsyncDelayNs,
{
    for attempt in 0..policy.max_attempts {
        if attempt > 0 {
            AsyncDelayNs::delay_ms(delay, policy.poll_interval_ms).await;
        }

        let mut raw = [0u8; 1];
        AsyncI2c::read(bus, address.as_u8(), &mut raw)
            .await
            .map_err(Error::Bus)?;

        let status = StatusByte::from_bits_retain(raw[0]);
        if status.is_clear_to_send() {
            return Ok(status);
        }
    }

    Err(Error::Timeout)
}
