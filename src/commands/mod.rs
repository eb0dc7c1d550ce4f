//! Si4735 command implementations
//!
//! Every command is a type implementing [`regiface::Command`]: a one byte
//! opcode, a fixed-size argument block and a fixed-size response record.
//! Commands are organized into functional categories:
//!
//! - [`power`]: POWER_UP, POWER_DOWN and GET_REV
//! - [`property`]: SET_PROPERTY and GET_PROPERTY
//! - [`tune`]: FM/AM tune and seek
//! - [`status`]: GET_INT_STATUS and the tune and signal quality queries
//!
//! # Command Execution
//! - Write the opcode and arguments in one bus write
//! - Poll the status byte until CTS is set
//! - Read the response record, which always starts with the status byte
//!
//! Sending a command before CTS is set corrupts the chip's command state.
//! Tune and seek additionally raise STCINT when they finish.

mod power;
mod property;
mod status;
mod tune;

pub use power::*;
pub use property::*;
pub use status::*;
pub use tune::*;
