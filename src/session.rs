//! Si4735 receiver session
//!
//! [`Si4735`] owns the bus, the reset line and the delay provider for one
//! chip and sequences commands into the lifecycle operations: reset, power
//! up and down, mode switching, tuning, volume and status queries.
//!
//! # State machine
//! ```text
//! AddressResolved --power_up--> PoweredUp(mode) --tune/seek--> Tuned(mode, channel)
//!        ^                          |      ^                         |
//!        |                      power_down |                    power_down
//!      reset                        v      |                         v
//!   (from any state)            PoweredDown --power_up---------------'
//! ```
//! A failed mode switch leaves the session `Faulted`; only [`Si4735::reset`]
//! leaves that state.
//!
//! # Concurrency
//! Every operation takes `&mut self` and runs to completion, including its
//! settling delays and bounded polls. To share a session between tasks, put
//! it behind a mutex and hold the lock for a whole operation.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::commands::{
    AmRsqStatus, AmSeekConfig, AmSeekStart, AmTuneFreq, AmTuneStatus, ExtendedRevision,
    FmRsqStatus, FmSeekStart, FmTuneFreq, FmTuneStatus, GetIntStatus, GetProperty,
    GetRevision, GetRevisionLong, PowerDown, PowerUp, PowerUpConfig, PowerUpFlags, Revision,
    RsqStatus, SeekFlags, SetProperty, StatusByte, StatusQueryFlags, TuneStatus,
};
use crate::config::Config;
use crate::device::Device;
use crate::error::{Error, InvalidArgument};
use crate::mode::{Band, Direction, Mode};
use crate::observer::{Event, NoopObserver, Observer};
use crate::properties::{AmBandwidth, Deemphasis, PropertyId, HARD_MUTE_BOTH, VOLUME_MAX};
use crate::transport::{DeviceAddress, Transport};

/// Where the session is in the chip lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Address known, chip not powered up since reset
    AddressResolved,
    PoweredDown,
    PoweredUp(Mode),
    Tuned { mode: Mode, channel: u16 },
    /// A mode switch failed part way; the chip state is unknown
    Faulted,
}

impl State {
    /// Active mode while powered up
    pub fn mode(&self) -> Option<Mode> {
        match *self {
            Self::PoweredUp(mode) | Self::Tuned { mode, .. } => Some(mode),
            _ => None,
        }
    }
}

/// Driver session for one Si4735.
///
/// Generic over the bus transport, reset pin, delay provider and event
/// observer.
pub struct Si4735<T, RST, D, O = NoopObserver> {
    device: Device<T, D>,
    reset_pin: RST,
    config: Config,
    observer: O,
    state: State,
    volume: u8,
}

impl<T, RST, D> Si4735<T, RST, D> {
    /// Creates a session for the chip at `address`.
    ///
    /// Nothing is sent to the chip; call [`reset`](Self::reset) and
    /// [`power_up`](Self::power_up) or [`set_mode`](Self::set_mode) next.
    ///
    /// # Arguments
    /// * `transport` - Bus the chip sits on
    /// * `reset_pin` - Output driving the chip's RST line
    /// * `delay` - Delay provider for settling delays and polling
    /// * `address` - Address found by [`resolve_address`](crate::resolve_address)
    /// * `config` - Clock, timing and band configuration
    #[must_use]
    pub fn new(transport: T, reset_pin: RST, delay: D, address: DeviceAddress, config: Config) -> Self {
        Self {
            device: Device::new(transport, address, delay, config.timing.ready),
            reset_pin,
            volume: config.volume,
            config,
            observer: NoopObserver,
            state: State::AddressResolved,
        }
    }
}

impl<T, RST, D, O> Si4735<T, RST, D, O> {
    /// Replaces the event observer.
    pub fn with_observer<O2: Observer>(self, observer: O2) -> Si4735<T, RST, D, O2> {
        Si4735 {
            device: self.device,
            reset_pin: self.reset_pin,
            config: self.config,
            observer,
            state: self.state,
            volume: self.volume,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Active mode, `None` unless powered up
    pub fn mode(&self) -> Option<Mode> {
        self.state.mode()
    }

    pub fn address(&self) -> DeviceAddress {
        self.device.address()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Volume restored after a mode switch
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Releases the transport, reset pin and delay provider.
    pub fn release(self) -> (T, RST, D) {
        let (transport, delay) = self.device.release();
        (transport, self.reset_pin, delay)
    }
}

impl<T, RST, D, O> Si4735<T, RST, D, O>
where
    T: Transport,
    RST: OutputPin,
    D: DelayNs,
    O: Observer,
{
    /// Pulses the reset line.
    ///
    /// Holds RST low for the configured pulse time, then releases it. The
    /// chip comes back powered down and the session returns to
    /// `AddressResolved` from any state, including `Faulted`.
    ///
    /// # Errors
    /// * `Error::ResetPin` - the pin could not be driven; if releasing it
    ///   failed the session is `Faulted`
    pub fn reset(&mut self) -> Result<(), Error<T::Error>> {
        self.reset_pin.set_low().map_err(|_| Error::ResetPin)?;
        self.device.delay_ms(self.config.timing.reset_pulse_ms);
        if self.reset_pin.set_high().is_err() {
            self.fault();
            return Err(Error::ResetPin);
        }

        self.device.clear_outstanding();
        self.state = State::AddressResolved;
        self.observer.notify(Event::Reset);
        Ok(())
    }

    /// Powers the chip up in `mode`.
    ///
    /// Sends POWER_UP with the function for `mode` and the clock source
    /// flags, waits the clock-dependent settling delay, then programs the
    /// reference clock properties. The session only becomes
    /// `PoweredUp(mode)` once all of that succeeded.
    ///
    /// # Errors
    /// * `Error::InvalidState` - not in `AddressResolved` or `PoweredDown`
    /// * `Error::InvalidArgument` - the configured reference clock is out of range
    /// * `Error::Bus`, `Error::Timeout`, `Error::Chip` - state is left unchanged
    pub fn power_up(&mut self, mode: Mode) -> Result<(), Error<T::Error>> {
        match self.state {
            State::AddressResolved | State::PoweredDown => {}
            state => return Err(Error::InvalidState(state)),
        }
        self.config.clock.validate()?;

        let result = self.power_up_sequence(mode);
        self.track(result)?;

        self.state = State::PoweredUp(mode);
        self.observer.notify(Event::PoweredUp(mode));
        Ok(())
    }

    /// Powers the chip down.
    ///
    /// # Errors
    /// * `Error::InvalidState` - not powered up
    pub fn power_down(&mut self) -> Result<(), Error<T::Error>> {
        if self.state.mode().is_none() {
            return Err(Error::InvalidState(self.state));
        }

        let result = self.power_down_sequence();
        self.track(result)?;

        self.state = State::PoweredDown;
        self.observer.notify(Event::PoweredDown);
        Ok(())
    }

    /// Switches to `mode`.
    ///
    /// Does nothing if `mode` is already active. Otherwise powers down (if
    /// powered), powers up in the new mode, applies the configured band
    /// limits and spacing and restores the saved volume. The new mode is only
    /// recorded once the whole sequence succeeded.
    ///
    /// # Errors
    /// * `Error::InvalidState` - the session is `Faulted`
    /// * `Error::InvalidArgument` - clock or saved volume out of range; nothing sent
    /// * any bus, timeout or chip error part way; the session becomes `Faulted`
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), Error<T::Error>> {
        match self.state {
            State::Faulted => return Err(Error::InvalidState(State::Faulted)),
            state if state.mode() == Some(mode) => return Ok(()),
            _ => {}
        }
        self.config.clock.validate()?;
        check_volume(self.volume)?;

        let result = self.switch_mode(mode);
        if let Err(err) = self.track(result) {
            self.fault();
            return Err(err);
        }

        self.state = State::PoweredUp(mode);
        self.observer.notify(Event::ModeChanged(mode));
        Ok(())
    }

    /// Writes a property.
    ///
    /// # Errors
    /// * `Error::InvalidState` - not powered up
    pub fn set_property(&mut self, id: PropertyId, value: u16) -> Result<(), Error<T::Error>> {
        self.powered_mode()?;
        let result = self.write_property(id, value);
        self.track(result)
    }

    /// Reads a property.
    ///
    /// # Errors
    /// * `Error::InvalidState` - not powered up
    pub fn get_property(&mut self, id: PropertyId) -> Result<u16, Error<T::Error>> {
        self.powered_mode()?;
        let result = self.device.execute_command(GetProperty { id });
        self.track(result).map(|response| response.value)
    }

    /// Tunes to `channel` in the units of the active mode.
    ///
    /// FM channels are 10 kHz units (10110 is 101.1 MHz), AM channels 1 kHz
    /// units. Waits for the seek/tune complete flag, acknowledges it and
    /// returns the resulting tune status.
    ///
    /// # Errors
    /// * `Error::InvalidState` - not powered up
    /// * `Error::InvalidArgument` - `channel` outside the band limits; nothing sent
    /// * `Error::Timeout` - the tune did not complete in time
    pub fn tune(&mut self, channel: u16) -> Result<TuneStatus, Error<T::Error>> {
        let mode = self.powered_mode()?;
        let band = *self.config.band(mode);
        if !band.contains(channel) {
            return Err(InvalidArgument::Frequency {
                channel,
                bottom: band.bottom,
                top: band.top,
            }
            .into());
        }

        let result = self.tune_sequence(mode, channel);
        let status = self.settle_tuning(mode, result)?;

        self.state = State::Tuned { mode, channel };
        self.observer.notify(Event::Tuned { mode, channel });
        Ok(status)
    }

    /// Seeks to the next valid station.
    ///
    /// With `wrap` the seek continues from the opposite band limit; without
    /// it a seek that hits the limit stops there with `band_limit` set.
    ///
    /// # Errors
    /// * `Error::InvalidState` - not powered up
    /// * `Error::Timeout` - the seek did not complete in time
    pub fn seek(&mut self, direction: Direction, wrap: bool) -> Result<TuneStatus, Error<T::Error>> {
        let mode = self.powered_mode()?;

        let mut flags = SeekFlags::empty();
        flags.set(SeekFlags::SEEK_UP, direction == Direction::Up);
        flags.set(SeekFlags::WRAP, wrap);

        let result = self.seek_sequence(mode, flags);
        let status = self.settle_tuning(mode, result)?;

        let channel = status.frequency;
        self.state = State::Tuned { mode, channel };
        self.observer.notify(Event::Tuned { mode, channel });
        Ok(status)
    }

    /// Tunes one band step up or down, wrapping at the band limits.
    ///
    /// # Errors
    /// * `Error::InvalidState` - not tuned
    pub fn step(&mut self, direction: Direction) -> Result<TuneStatus, Error<T::Error>> {
        let State::Tuned { mode, channel } = self.state else {
            return Err(Error::InvalidState(self.state));
        };
        let next = self.config.band(mode).step_from(channel, direction);
        self.tune(next)
    }

    /// Sets the band limits of the active mode.
    ///
    /// Writes the seek band properties and narrows tune validation to the new
    /// range.
    ///
    /// # Errors
    /// * `Error::InvalidArgument` - limits inverted or outside the hardware range
    /// * `Error::InvalidState` - not powered up
    pub fn set_band_limits(&mut self, bottom: u16, top: u16) -> Result<(), Error<T::Error>> {
        let mode = self.powered_mode()?;
        let band = Band {
            bottom,
            top,
            step: self.config.band(mode).step,
        };
        if !band.fits(mode) {
            return Err(InvalidArgument::BandLimits { bottom, top }.into());
        }

        let (bottom_id, top_id) = mode.band_properties();
        let result = self
            .write_property(bottom_id, bottom)
            .and_then(|()| self.write_property(top_id, top));
        self.track(result)?;

        *self.config.band_mut(mode) = band;
        Ok(())
    }

    /// Sets the step of the active mode, also used as seek spacing.
    ///
    /// # Errors
    /// * `Error::InvalidArgument` - `step` is zero
    /// * `Error::InvalidState` - not powered up
    pub fn set_frequency_step(&mut self, step: u16) -> Result<(), Error<T::Error>> {
        if step == 0 {
            return Err(InvalidArgument::Step(step).into());
        }
        let mode = self.powered_mode()?;

        let result = self.write_property(mode.spacing_property(), step);
        self.track(result)?;

        self.config.band_mut(mode).step = step;
        Ok(())
    }

    /// Sets the audio volume, 0..=63.
    ///
    /// The level is also saved and restored after a mode switch.
    ///
    /// # Errors
    /// * `Error::InvalidArgument` - `level` above 63; nothing sent
    /// * `Error::InvalidState` - not powered up
    pub fn set_volume(&mut self, level: u8) -> Result<(), Error<T::Error>> {
        check_volume(level)?;
        self.powered_mode()?;

        let result = self.write_property(PropertyId::RX_VOLUME, u16::from(level));
        self.track(result)?;

        self.volume = level;
        Ok(())
    }

    /// Raises the volume by one, stopping at 63.
    pub fn volume_up(&mut self) -> Result<u8, Error<T::Error>> {
        let current = self.current_volume()?;
        let level = current.saturating_add(1).min(VOLUME_MAX);
        self.set_volume(level)?;
        Ok(level)
    }

    /// Lowers the volume by one, stopping at 0.
    pub fn volume_down(&mut self) -> Result<u8, Error<T::Error>> {
        let current = self.current_volume()?;
        let level = current.saturating_sub(1);
        self.set_volume(level)?;
        Ok(level)
    }

    /// Sets the minimum RSSI (dBµV) and SNR (dB) a seek accepts as a station
    /// in the active mode.
    ///
    /// # Errors
    /// * `Error::InvalidArgument` - above 127 in FM or 63 in AM; nothing sent
    /// * `Error::InvalidState` - not powered up
    pub fn set_seek_thresholds(&mut self, rssi: u8, snr: u8) -> Result<(), Error<T::Error>> {
        let mode = self.powered_mode()?;
        let max = mode.seek_threshold_max();
        if rssi > max || snr > max {
            return Err(InvalidArgument::SeekThreshold { rssi, snr }.into());
        }

        let (rssi_id, snr_id) = mode.seek_threshold_properties();
        let result = self
            .write_property(rssi_id, u16::from(rssi))
            .and_then(|()| self.write_property(snr_id, u16::from(snr)));
        self.track(result)
    }

    /// Selects the FM de-emphasis time constant.
    ///
    /// # Errors
    /// * `Error::InvalidState` - not powered up in FM
    pub fn set_fm_deemphasis(&mut self, deemphasis: Deemphasis) -> Result<(), Error<T::Error>> {
        if self.powered_mode()? != Mode::Fm {
            return Err(Error::InvalidState(self.state));
        }
        self.set_property(PropertyId::FM_DEEMPHASIS, deemphasis as u16)
    }

    /// Mutes or unmutes both audio channels.
    pub fn set_mute(&mut self, muted: bool) -> Result<(), Error<T::Error>> {
        let value = if muted { HARD_MUTE_BOTH } else { 0 };
        self.set_property(PropertyId::RX_HARD_MUTE, value)
    }

    /// Selects the AM channel filter.
    ///
    /// # Errors
    /// * `Error::InvalidState` - not powered up in AM
    pub fn set_am_bandwidth(
        &mut self,
        bandwidth: AmBandwidth,
        power_line_filter: bool,
    ) -> Result<(), Error<T::Error>> {
        if self.powered_mode()? != Mode::Am {
            return Err(Error::InvalidState(self.state));
        }
        self.set_property(
            PropertyId::AM_CHANNEL_FILTER,
            bandwidth.property_value(power_line_filter),
        )
    }

    /// Reads the interrupt status byte.
    ///
    /// Allowed in every state. ERR in the returned status is reported to the
    /// observer but not treated as a failure.
    pub fn get_status(&mut self) -> Result<StatusByte, Error<T::Error>> {
        let result = self.device.send_command(GetIntStatus);
        let status = self.track(result)?;
        if status.is_error() {
            self.observer.notify(Event::ChipError(status));
        }
        Ok(status)
    }

    /// Reads the tune status of the active mode, acknowledging STCINT.
    pub fn get_tune_status(&mut self) -> Result<TuneStatus, Error<T::Error>> {
        let mode = self.powered_mode()?;
        let result = self.acknowledge_tune(mode);
        self.track(result)
    }

    /// Reads the received signal quality of the active mode.
    pub fn get_rsq_status(&mut self) -> Result<RsqStatus, Error<T::Error>> {
        let mode = self.powered_mode()?;
        let flags = StatusQueryFlags::INTACK;
        let result = match mode {
            Mode::Fm => self.device.execute_command(FmRsqStatus { flags }),
            Mode::Am => self.device.execute_command(AmRsqStatus { flags }),
        };
        self.track(result)
    }

    /// Reads the part and firmware revision.
    ///
    /// This is the 9 byte GET_REV record. The full 14 byte frame, with the
    /// trailing bytes kept raw, comes from
    /// [`get_revision_long`](Self::get_revision_long).
    pub fn get_revision(&mut self) -> Result<Revision, Error<T::Error>> {
        self.powered_mode()?;
        let result = self.device.execute_command(GetRevision);
        self.track(result)
    }

    /// Reads the 14 byte extended revision frame.
    pub fn get_revision_long(&mut self) -> Result<ExtendedRevision, Error<T::Error>> {
        self.powered_mode()?;
        let result = self.device.execute_command(GetRevisionLong);
        self.track(result)
    }

    fn powered_mode(&self) -> Result<Mode, Error<T::Error>> {
        self.state.mode().ok_or(Error::InvalidState(self.state))
    }

    fn current_volume(&mut self) -> Result<u8, Error<T::Error>> {
        let raw = self.get_property(PropertyId::RX_VOLUME)?;
        Ok(u8::try_from(raw).unwrap_or(VOLUME_MAX).min(VOLUME_MAX))
    }

    fn power_up_sequence(&mut self, mode: Mode) -> Result<(), Error<T::Error>> {
        let clock = self.config.clock;
        let reference = u16::try_from(clock.reference_frequency()).map_err(|_| {
            Error::InvalidArgument(InvalidArgument::ReferenceClock {
                frequency_hz: clock.reference_frequency(),
                prescaler: clock.prescaler(),
            })
        })?;

        self.device.write_command(PowerUp {
            config: PowerUpConfig {
                flags: PowerUpFlags::GPO2OEN | clock.power_up_flags(),
                function: mode.function(),
                output: self.config.output,
            },
        })?;
        self.device.delay_ms(self.config.power_up_settle_ms());
        let status = self.device.await_ready()?;
        if status.is_error() {
            return Err(Error::Chip(status));
        }

        self.write_property(PropertyId::REFCLK_FREQ, reference)?;
        self.write_property(PropertyId::REFCLK_PRESCALE, clock.prescaler())
    }

    fn power_down_sequence(&mut self) -> Result<(), Error<T::Error>> {
        self.device.write_command(PowerDown)?;
        self.device.delay_ms(self.config.timing.power_down_settle_ms);
        let status = self.device.await_ready()?;
        if status.is_error() {
            return Err(Error::Chip(status));
        }
        Ok(())
    }

    fn switch_mode(&mut self, mode: Mode) -> Result<(), Error<T::Error>> {
        if self.state.mode().is_some() {
            self.power_down_sequence()?;
            self.observer.notify(Event::PoweredDown);
        }

        self.power_up_sequence(mode)?;
        self.observer.notify(Event::PoweredUp(mode));

        let band = *self.config.band(mode);
        let (bottom_id, top_id) = mode.band_properties();
        self.write_property(bottom_id, band.bottom)?;
        self.write_property(top_id, band.top)?;
        self.write_property(mode.spacing_property(), band.step)?;
        self.write_property(PropertyId::RX_VOLUME, u16::from(self.volume))
    }

    fn tune_sequence(&mut self, mode: Mode, channel: u16) -> Result<TuneStatus, Error<T::Error>> {
        match mode {
            Mode::Fm => self.device.execute_command(FmTuneFreq::new(channel))?,
            Mode::Am => self.device.execute_command(AmTuneFreq::new(channel))?,
        };
        self.wait_for_completion()?;
        self.acknowledge_tune(mode)
    }

    fn seek_sequence(&mut self, mode: Mode, flags: SeekFlags) -> Result<TuneStatus, Error<T::Error>> {
        match mode {
            Mode::Fm => self.device.execute_command(FmSeekStart { flags })?,
            Mode::Am => self.device.execute_command(AmSeekStart {
                config: AmSeekConfig {
                    flags,
                    antenna_cap: 0,
                },
            })?,
        };
        self.wait_for_completion()?;
        self.acknowledge_tune(mode)
    }

    /// Polls GET_INT_STATUS until STCINT is set
    fn wait_for_completion(&mut self) -> Result<StatusByte, Error<T::Error>> {
        let policy = self.config.timing.completion;
        for attempt in 0..policy.max_attempts {
            if attempt > 0 {
                self.device.delay_ms(policy.poll_interval_ms);
            }
            let status = self.device.execute_command(GetIntStatus)?;
            if status.is_tune_complete() {
                return Ok(status);
            }
        }
        Err(Error::Timeout)
    }

    fn acknowledge_tune(&mut self, mode: Mode) -> Result<TuneStatus, Error<T::Error>> {
        let flags = StatusQueryFlags::INTACK;
        match mode {
            Mode::Fm => self.device.execute_command(FmTuneStatus { flags }),
            Mode::Am => self.device.execute_command(AmTuneStatus { flags }),
        }
    }

    /// A failed tune or seek leaves the chip powered but on an unknown channel
    fn settle_tuning(
        &mut self,
        mode: Mode,
        result: Result<TuneStatus, Error<T::Error>>,
    ) -> Result<TuneStatus, Error<T::Error>> {
        let result = self.track(result);
        if result.is_err() {
            self.state = State::PoweredUp(mode);
        }
        result
    }

    fn write_property(&mut self, id: PropertyId, value: u16) -> Result<(), Error<T::Error>> {
        self.device.execute_command(SetProperty::new(id, value))?;
        self.observer.notify(Event::PropertySet { id, value });
        Ok(())
    }

    fn fault(&mut self) {
        self.state = State::Faulted;
        self.observer.notify(Event::Faulted);
    }

    /// Reports chip errors and timeouts to the observer
    fn track<R>(&mut self, result: Result<R, Error<T::Error>>) -> Result<R, Error<T::Error>> {
        match &result {
            Err(Error::Chip(status)) => self.observer.notify(Event::ChipError(*status)),
            Err(Error::Timeout) => self.observer.notify(Event::Timeout),
            _ => {}
        }
        result
    }
}

fn check_volume(level: u8) -> Result<(), InvalidArgument> {
    if level > VOLUME_MAX {
        return Err(InvalidArgument::Volume(level));
    }
    Ok(())
}
