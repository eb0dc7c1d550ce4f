//! Si4735 Device Interface
//!
//! This module provides the command-level interface to the chip: it frames
//! commands, enforces the CTS handshake between them and reads back the
//! fixed-size response records.
//!
//! The interface is built around the `Device<T, D>` struct which owns the
//! transport, the resolved bus address and the delay provider used for
//! polling. It knows nothing about modes or power state; that is the job of
//! [`Si4735`](crate::Si4735).
//!
//! # Example
//! ```no_run
//! # use embedded_hal::{delay::DelayNs, i2c::I2c};
//! use si4735::{commands::GetRevision, resolve_address, Device, ReadyPolicy};
//!
//! fn revision<I: I2c, D: DelayNs>(mut i2c: I, delay: D) {
//!     let Ok(address) = resolve_address(&mut i2c) else {
//!         return;
//!     };
//!     let mut device = Device::new(i2c, address, delay, ReadyPolicy::default());
//!     let _rev = device.execute_command(GetRevision);
//! }
//! ```

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal_async::delay::DelayNs as AsyncDelayNs;
use embedded_hal_async::i2c::I2c as AsyncI2c;
use regiface::{Command, FromByteArray, ToByteArray};

use crate::codec::{self, MAX_FRAME_LEN};
use crate::commands::StatusByte;
use crate::error::Error;
use crate::ready::{self, ReadyPolicy};
use crate::transport::{DeviceAddress, Transport};

/// Longest response record read by the driver
const MAX_RESPONSE_LEN: usize = 16;

/// Command-level interface to the chip.
///
/// Each command is written in one bus write; the CTS handshake is completed
/// before the call returns, so the next command can always be sent.
///
/// A command whose CTS wait failed stays outstanding. The next write first
/// waits for that CTS again and fails with `Error::Timeout` if it is still
/// missing, so no command ever reaches a busy chip.
pub struct Device<T, D> {
    transport: T,
    address: DeviceAddress,
    delay: D,
    ready: ReadyPolicy,
    /// A command was written and its CTS has not been seen yet
    outstanding: bool,
}

impl<T, D> Device<T, D> {
    /// Creates a new Device for the chip at `address`.
    ///
    /// # Arguments
    /// * `transport` - Bus the chip sits on
    /// * `address` - Resolved bus address, see [`resolve_address`](crate::resolve_address)
    /// * `delay` - Delay provider for polling
    /// * `ready` - Bound on the CTS wait after each command
    pub fn new(transport: T, address: DeviceAddress, delay: D, ready: ReadyPolicy) -> Self {
        Self {
            transport,
            address,
            delay,
            ready,
            outstanding: false,
        }
    }

    pub fn address(&self) -> DeviceAddress {
        self.address
    }

    /// Whether the last command is still waiting for CTS
    pub fn is_outstanding(&self) -> bool {
        self.outstanding
    }

    /// Forgets an outstanding command after a hardware reset.
    pub fn clear_outstanding(&mut self) {
        self.outstanding = false;
    }

    /// Releases the transport and delay provider.
    pub fn release(self) -> (T, D) {
        (self.transport, self.delay)
    }
}

impl<T, D> Device<T, D>
where
    T: Transport,
    D: DelayNs,
{
    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Writes a command without waiting for its CTS.
    ///
    /// Used where the chip needs a settling delay before it can be polled.
    /// The caller must run [`await_ready`](Self::await_ready) before sending
    /// anything else.
    ///
    /// # Errors
    /// * `Error::Timeout` - the previous command still has not raised CTS
    /// * `Error::Bus` - the write failed
    pub fn write_command<C>(&mut self, command: C) -> Result<(), Error<T::Error>>
    where
        C: Command<IdType = u8>,
        C::CommandParameters: ToByteArray<Error = Infallible>,
    {
        if self.outstanding {
            self.await_ready()?;
        }

        let frame = codec::encode(command);
        debug_assert!(frame.as_bytes().len() <= MAX_FRAME_LEN);

        self.transport
            .write(self.address.as_u8(), frame.as_bytes())
            .map_err(Error::Bus)?;
        self.outstanding = true;
        Ok(())
    }

    /// Polls the status byte until CTS is set.
    ///
    /// # Errors
    /// * `Error::Timeout` - CTS not seen within the ready policy
    /// * `Error::Bus` - a status read failed
    pub fn await_ready(&mut self) -> Result<StatusByte, Error<T::Error>> {
        let status =
            ready::await_ready(&mut self.transport, self.address, &mut self.delay, &self.ready)?;
        self.outstanding = false;
        Ok(status)
    }

    /// Writes a command and waits for CTS.
    ///
    /// The returned status may carry ERR; it is not treated as a failure here.
    pub fn send_command<C>(&mut self, command: C) -> Result<StatusByte, Error<T::Error>>
    where
        C: Command<IdType = u8>,
        C::CommandParameters: ToByteArray<Error = Infallible>,
    {
        self.write_command(command)?;
        self.await_ready()
    }

    /// Reads the response record of the command just completed.
    ///
    /// # Errors
    /// * `Error::Bus` - the read failed
    /// * `Error::Decode` - fewer bytes arrived than the record needs
    pub fn read_response<R>(&mut self) -> Result<R, Error<T::Error>>
    where
        R: FromByteArray<Error = Infallible>,
    {
        let mut raw = [0u8; MAX_RESPONSE_LEN];
        let expected = codec::response_len::<R>().min(MAX_RESPONSE_LEN);

        let received = self
            .transport
            .read(self.address.as_u8(), &mut raw[..expected])
            .map_err(Error::Bus)?;

        codec::decode(&raw[..received.min(expected)]).map_err(Error::Decode)
    }

    /// Executes a command on the device.
    ///
    /// # Type Parameters
    /// * `C` - Command type implementing the Command trait with u8 ID
    ///
    /// # Returns
    /// The decoded response record. Single byte responses are taken from the
    /// status byte that completed the CTS wait, without another read.
    ///
    /// # Errors
    /// * `Error::Bus` - bus communication failed
    /// * `Error::Timeout` - CTS not seen in time
    /// * `Error::Chip` - the chip set ERR
    /// * `Error::Decode` - the response was short
    pub fn execute_command<C>(&mut self, command: C) -> Result<C::ResponseParameters, Error<T::Error>>
    where
        C: Command<IdType = u8>,
        C::CommandParameters: ToByteArray<Error = Infallible>,
        C::ResponseParameters: FromByteArray<Error = Infallible>,
    {
        let status = self.send_command(command)?;
        if status.is_error() {
            return Err(Error::Chip(status));
        }

        if codec::response_len::<C::ResponseParameters>() == 1 {
            codec::decode(&[status.bits()]).map_err(Error::Decode)
        } else {
            self.read_response()
        }
    }
}

impl<T, D> Device<T, D>
where
    T: AsyncI2c,
    D: AsyncDelayNs,
{
    pub async fn delay_ms_async(&mut self, ms: u32) {
        AsyncDelayNs::delay_ms(&mut self.delay, ms).await;
    }

    /// Asynchronously writes a command without waiting for its CTS.
    ///
    /// This is the async version of [`write_command`](Device::write_command).
    pub async fn write_command_async<C>(&mut self, command: C) -> Result<(), Error<T::Error>>
    where
        C: Command<IdType = u8>,
        C::CommandParameters: ToByteArray<Error = Infallible>,
    {
        if self.outstanding {
            self.await_ready_async().await?;
        }

        let frame = codec::encode(command);
        AsyncI2c::write(&mut self.transport, self.address.as_u8(), frame.as_bytes())
            .await
            .map_err(Error::Bus)?;
        self.outstanding = true;
        Ok(())
    }

    /// Asynchronously polls the status byte until CTS is set.
    ///
    /// This is the async version of [`await_ready`](Device::await_ready).
    pub async fn await_ready_async(&mut self) -> Result<StatusByte, Error<T::Error>> {
        let status = ready::await_ready_async(
            &mut self.transport,
            self.address,
            &mut self.delay,
            &self.ready,
        )
        .await?;
        self.outstanding = false;
        Ok(status)
    }

    /// Asynchronously writes a command and waits for CTS.
    ///
    /// This is the async version of [`send_command`](Device::send_command).
    pub async fn send_command_async<C>(&mut self, command: C) -> Result<StatusByte, Error<T::Error>>
    where
        C: Command<IdType = u8>,
        C::CommandParameters: ToByteArray<Error = Infallible>,
    {
        self.write_command_async(command).await?;
        self.await_ready_async().await
    }

    /// Asynchronously reads the response record of the command just completed.
    ///
    /// This is the async version of [`read_response`](Device::read_response).
    pub async fn read_response_async<R>(&mut self) -> Result<R, Error<T::Error>>
    where
        R: FromByteArray<Error = Infallible>,
    {
        let mut raw = [0u8; MAX_RESPONSE_LEN];
        let expected = codec::response_len::<R>().min(MAX_RESPONSE_LEN);

        AsyncI2c::read(&mut self.transport, self.address.as_u8(), &mut raw[..expected])
            .await
            .map_err(Error::Bus)?;

        codec::decode(&raw[..expected]).map_err(Error::Decode)
    }

    /// Asynchronously executes a command on the device.
    ///
    /// This is the async version of [`execute_command`](Device::execute_command).
    pub async fn execute_command_async<C>(
        &mut self,
        command: C,
    ) -> Result<C::ResponseParameters, Error<T::Error>>
    where
        C: Command<IdType = u8>,
        C::CommandParameters: ToByteArray<Error = Infallible>,
        C::ResponseParameters: FromByteArray<Error = Infallible>,
    {
        let status = self.send_command_async(command).await?;
        if status.is_error() {
            return Err(Error::Chip(status));
        }

        if codec::response_len::<C::ResponseParameters>() == 1 {
            codec::decode(&[status.bits()]).map_err(Error::Decode)
        } else {
            self.read_response_async().await
        }
    }
}
