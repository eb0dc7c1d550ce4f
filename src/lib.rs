#![cfg_attr(not(test), no_std)]
//! Si4735 Radio Driver
//!
//! This crate provides a type-safe interface for the Silicon Labs Si4735
//! AM/FM broadcast receiver, controlled over I2C.
//!
//! # Features
//! - FM receive: 64-108 MHz in 10 kHz channels
//! - AM receive: 149-23000 kHz in 1 kHz channels
//! - Crystal or host-supplied (e.g. PWM) reference clock
//! - Bounded CTS and seek/tune completion polling, no unbounded waits
//! - Blocking session plus an `embedded-hal-async` command interface on [`Device`]
//! - Session state machine: illegal operations are rejected before any bus traffic
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`transport`]: the byte-level bus seam and address resolution
//!   - Any `embedded_hal::i2c::I2c` is a [`Transport`]
//!   - [`resolve_address`] probes 0x11 then 0x63
//!
//! - [`ready`]: the readiness gate polling the status byte for CTS
//!
//! - [`commands`]: every chip command as a [`regiface::Command`]
//!   - POWER_UP, POWER_DOWN and GET_REV
//!   - property, tune/seek and status queries
//!
//! - [`codec`]: framing and length-checked decoding of responses
//!
//! - [`device`]: command-level interface sending one command at a time
//!
//! - [`session`]: the [`Si4735`] state machine built on top of [`Device`]
//!
//! # Usage
//! Create the session with the resolved address and a [`Config`], pulse the
//! reset line, then select a mode:
//!
//! 1. Resolve the address with [`resolve_address`]
//! 2. Create a [`Si4735`] with transport, reset pin, delay and [`Config`]
//! 3. [`reset`](Si4735::reset)
//! 4. [`set_mode`](Si4735::set_mode) to FM or AM (powers up and applies the band)
//! 5. [`tune`](Si4735::tune), [`seek`](Si4735::seek), [`set_volume`](Si4735::set_volume)
//!
//! # Important Notes
//! - No command may be sent before the previous one raised CTS; the driver
//!   enforces this on every call
//! - A failed mode switch faults the session until the next reset
//! - FM channels are 10 kHz units, AM channels 1 kHz units
//!
//! # Example
//! ```no_run
//! use embedded_hal::{delay::DelayNs, digital::OutputPin, i2c::I2c};
//! use si4735::{resolve_address, Config, Error, Mode, Si4735};
//!
//! fn listen<I, P, D>(mut i2c: I, reset: P, delay: D) -> Result<(), Error<I::Error>>
//! where
//!     I: I2c,
//!     P: OutputPin,
//!     D: DelayNs,
//! {
//!     let address = resolve_address(&mut i2c)?;
//!     let mut radio = Si4735::new(i2c, reset, delay, address, Config::default());
//!
//!     radio.reset()?;
//!     radio.set_mode(Mode::Fm)?;
//!     radio.tune(10110)?;
//!     radio.set_volume(40)?;
//!     Ok(())
//! }
//! ```

use regiface::{Command, NoParameters, ToByteArray};

pub mod codec;
pub mod commands;
pub mod config;
pub mod device;
pub mod error;
pub mod mode;
pub mod observer;
pub mod properties;
pub mod ready;
pub mod session;
pub mod transport;

pub use config::{start_reference_clock, ClockSource, Config, Timing};
pub use device::Device;
pub use error::{DecodeError, Error, InvalidArgument};
pub use mode::{Band, Direction, Mode};
#[cfg(feature = "defmt")]
pub use observer::DefmtObserver;
pub use observer::{Event, NoopObserver, Observer};
pub use properties::{AmBandwidth, Deemphasis, PropertyId};
pub use ready::ReadyPolicy;
pub use session::{Si4735, State};
pub use transport::{resolve_address, DeviceAddress, Transport};
