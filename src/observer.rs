//! Session event reporting
//!
//! The session never logs on its own. It hands an [`Event`] to the
//! [`Observer`] it was built with, and the application decides where events
//! go. Any `FnMut(Event)` closure is an observer.

use crate::commands::StatusByte;
use crate::mode::Mode;
use crate::properties::PropertyId;

/// Something the session did or noticed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Reset line pulsed
    Reset,
    PoweredUp(Mode),
    PoweredDown,
    /// Mode switch completed
    ModeChanged(Mode),
    PropertySet { id: PropertyId, value: u16 },
    /// Tune or seek finished on this channel
    Tuned { mode: Mode, channel: u16 },
    /// The chip raised ERR
    ChipError(StatusByte),
    /// CTS or STCINT did not appear in time
    Timeout,
    /// A mode switch failed part way; only reset recovers
    Faulted,
}

/// Receives session events
pub trait Observer {
    fn notify(&mut self, event: Event);
}

impl<F: FnMut(Event)> Observer for F {
    fn notify(&mut self, event: Event) {
        self(event)
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn notify(&mut self, _event: Event) {}
}

/// Reports events through `defmt`
///
/// Failures are logged at warn level, everything else at debug.
#[cfg(feature = "defmt")]
#[derive(Debug, Default, Clone, Copy)]
pub struct DefmtObserver;

#[cfg(feature = "defmt")]
impl Observer for DefmtObserver {
    fn notify(&mut self, event: Event) {
        match event {
            Event::ChipError(_) | Event::Timeout | Event::Faulted => {
                defmt::warn!("si4735: {}", event)
            }
            _ => defmt::debug!("si4735: {}", event),
        }
    }
}
