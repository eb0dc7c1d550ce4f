//! Command framing
//!
//! Pure conversion between command types and the bytes on the wire. A frame
//! is the opcode followed by the argument block; a response is a fixed-size
//! record that must arrive complete.

use core::convert::Infallible;

use regiface::{ByteArray, Command, FromByteArray, ToByteArray};

use crate::commands::TuneStatus;
use crate::error::DecodeError;
use crate::mode::Mode;

/// Longest command the chip accepts: opcode plus seven argument bytes
pub const MAX_FRAME_LEN: usize = 8;

/// An encoded command, ready for a single bus write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; MAX_FRAME_LEN],
    len: usize,
}

impl Frame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn opcode(&self) -> u8 {
        self.bytes[0]
    }
}

/// Serializes a command into its wire frame.
///
/// # Panics
/// If the argument block is longer than `MAX_FRAME_LEN - 1` bytes. No
/// command in [`crate::commands`] comes close.
pub fn encode<C>(command: C) -> Frame
where
    C: Command<IdType = u8>,
    C::CommandParameters: ToByteArray<Error = Infallible>,
{
    let arguments = match command.invoking_parameters().to_bytes() {
        Ok(arguments) => arguments,
        Err(never) => match never {},
    };
    let arguments = arguments.as_ref();

    let mut bytes = [0u8; MAX_FRAME_LEN];
    bytes[0] = C::id();
    bytes[1..=arguments.len()].copy_from_slice(arguments);

    Frame {
        bytes,
        len: arguments.len() + 1,
    }
}

/// Length of the response record `R`
pub fn response_len<R>() -> usize
where
    R: FromByteArray,
{
    R::Array::new().as_ref().len()
}

/// Parses a complete response record.
///
/// The length must match the record exactly: fewer bytes is a
/// [`DecodeError::ShortRead`], more is [`DecodeError::TrailingBytes`].
pub fn decode<R>(raw: &[u8]) -> Result<R, DecodeError>
where
    R: FromByteArray<Error = Infallible>,
{
    let mut array = R::Array::new();
    let expected = array.as_ref().len();

    if raw.len() < expected {
        return Err(DecodeError::ShortRead {
            expected,
            actual: raw.len(),
        });
    }
    if raw.len() > expected {
        return Err(DecodeError::TrailingBytes {
            expected,
            actual: raw.len(),
        });
    }

    array.as_mut().copy_from_slice(raw);
    match R::from_bytes(array) {
        Ok(record) => Ok(record),
        Err(never) => match never {},
    }
}

/// Decodes the tuned frequency of a TUNE_STATUS response, in kHz.
pub fn decode_tune_frequency(mode: Mode, raw: &[u8]) -> Result<u32, DecodeError> {
    let status: TuneStatus = decode(raw)?;
    Ok(mode.khz_from_channel(status.frequency))
}
