use embedded_hal::i2c::ErrorKind;
use embedded_hal_mock::eh1::delay::{CheckedDelay, NoopDelay, Transaction as DelayTransaction};
use embedded_hal_mock::eh1::digital::{
    Mock as PinMock, State as PinState, Transaction as PinTransaction,
};
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
use si4735::{
    Config, DeviceAddress, Direction, Error, Event, InvalidArgument, Mode, ReadyPolicy, Si4735,
    State,
};

const ADDR: u8 = 0x11;

fn ready() -> I2cTransaction {
    I2cTransaction::read(ADDR, vec![0x80])
}

fn command(bytes: &[u8]) -> Vec<I2cTransaction> {
    vec![I2cTransaction::write(ADDR, bytes.to_vec()), ready()]
}

fn property(id: u16, value: u16) -> Vec<I2cTransaction> {
    let [id_hi, id_lo] = id.to_be_bytes();
    let [hi, lo] = value.to_be_bytes();
    command(&[0x12, 0x00, id_hi, id_lo, hi, lo])
}

fn power_up(function: u8) -> Vec<I2cTransaction> {
    let mut expected = command(&[0x01, 0x50 | function, 0x05]);
    expected.extend(property(0x0201, 32_768));
    expected.extend(property(0x0202, 1));
    expected
}

fn switch_to_am() -> Vec<I2cTransaction> {
    let mut expected = power_up(0x01);
    expected.extend(property(0x3400, 520));
    expected.extend(property(0x3401, 1710));
    expected.extend(property(0x3402, 10));
    expected.extend(property(0x4000, 30));
    expected
}

fn tune_status(status: u8, channel: u16) -> Vec<I2cTransaction> {
    let [hi, lo] = channel.to_be_bytes();
    vec![
        I2cTransaction::write(ADDR, vec![0x22, 0x01]),
        I2cTransaction::read(ADDR, vec![status]),
        I2cTransaction::read(ADDR, vec![status, 0x01, hi, lo, 0x2A, 0x14, 0x00]),
    ]
}

fn fm_tune(channel: u16) -> Vec<I2cTransaction> {
    let [hi, lo] = channel.to_be_bytes();
    let mut expected = command(&[0x20, 0x00, hi, lo, 0x00]);
    expected.extend([
        I2cTransaction::write(ADDR, vec![0x14]),
        I2cTransaction::read(ADDR, vec![0x81]),
    ]);
    expected.extend(tune_status(0x81, channel));
    expected
}

fn radio(
    i2c: &[I2cTransaction],
    pin: &[PinTransaction],
    config: Config,
) -> Si4735<I2cMock, PinMock, NoopDelay> {
    Si4735::new(
        I2cMock::new(i2c),
        PinMock::new(pin),
        NoopDelay::new(),
        DeviceAddress::Primary,
        config,
    )
}

fn finish<O>(radio: Si4735<I2cMock, PinMock, NoopDelay, O>) {
    let (mut i2c, mut pin, _) = radio.release();
    i2c.done();
    pin.done();
}

#[test]
fn reset_pulses_the_reset_line() {
    let mut events = Vec::new();
    let pin = [
        PinTransaction::set(PinState::Low),
        PinTransaction::set(PinState::High),
    ];
    let mut radio = Si4735::new(
        I2cMock::new(&[]),
        PinMock::new(&pin),
        CheckedDelay::new(&[DelayTransaction::delay_ms(100)]),
        DeviceAddress::Primary,
        Config::default(),
    )
    .with_observer(|event: Event| events.push(event));

    radio.reset().unwrap();
    assert_eq!(radio.state(), State::AddressResolved);

    let (mut i2c, mut pin, mut delay) = radio.release();
    i2c.done();
    pin.done();
    delay.done();
    assert_eq!(events, [Event::Reset]);
}

#[test]
fn switching_to_the_active_mode_sends_nothing() {
    let mut radio = radio(&switch_to_am(), &[], Config::default());

    radio.set_mode(Mode::Am).unwrap();
    assert_eq!(radio.state(), State::PoweredUp(Mode::Am));

    radio.set_mode(Mode::Am).unwrap();
    assert_eq!(radio.mode(), Some(Mode::Am));

    finish(radio);
}

#[test]
fn mode_switch_powers_down_first() {
    let mut expected = power_up(0x00);
    expected.extend(command(&[0x11]));
    expected.extend(switch_to_am());
    let mut events = Vec::new();
    let mut radio = radio(&expected, &[], Config::default()).with_observer(|e: Event| events.push(e));

    radio.power_up(Mode::Fm).unwrap();
    radio.set_mode(Mode::Am).unwrap();
    assert_eq!(radio.state(), State::PoweredUp(Mode::Am));

    finish(radio);
    assert!(events.contains(&Event::PoweredDown));
    assert_eq!(events.last(), Some(&Event::ModeChanged(Mode::Am)));
}

#[test]
fn tune_then_read_back_frequency() {
    let mut expected = power_up(0x00);
    expected.extend(fm_tune(10110));
    expected.extend(tune_status(0x80, 10110));
    let mut radio = radio(&expected, &[], Config::default());

    radio.power_up(Mode::Fm).unwrap();
    let tuned = radio.tune(10110).unwrap();
    assert_eq!(tuned.frequency, 10110);
    assert_eq!(
        radio.state(),
        State::Tuned {
            mode: Mode::Fm,
            channel: 10110
        }
    );

    let status = radio.get_tune_status().unwrap();
    assert_eq!(status.frequency, 10110);
    assert!(status.valid);
    assert_eq!(status.rssi, 42);

    finish(radio);
}

#[test]
fn tune_waits_for_seek_tune_complete() {
    let mut expected = power_up(0x00);
    expected.extend(command(&[0x20, 0x00, 0x27, 0x7E, 0x00]));
    expected.extend([
        I2cTransaction::write(ADDR, vec![0x14]),
        I2cTransaction::read(ADDR, vec![0x80]),
        I2cTransaction::write(ADDR, vec![0x14]),
        I2cTransaction::read(ADDR, vec![0x80]),
        I2cTransaction::write(ADDR, vec![0x14]),
        I2cTransaction::read(ADDR, vec![0x81]),
    ]);
    expected.extend(tune_status(0x81, 10110));
    let mut radio = radio(&expected, &[], Config::default());

    radio.power_up(Mode::Fm).unwrap();
    radio.tune(10110).unwrap();

    finish(radio);
}

#[test]
fn tune_gives_up_when_completion_never_arrives() {
    let mut config = Config::default();
    config.timing.completion = ReadyPolicy::new(2, 10);
    let mut expected = power_up(0x00);
    expected.extend(command(&[0x20, 0x00, 0x27, 0x7E, 0x00]));
    expected.extend(command(&[0x14]));
    expected.extend(command(&[0x14]));
    let mut events = Vec::new();
    let mut radio = radio(&expected, &[], config).with_observer(|e: Event| events.push(e));

    radio.power_up(Mode::Fm).unwrap();
    assert_eq!(radio.tune(10110), Err(Error::Timeout));
    assert_eq!(radio.state(), State::PoweredUp(Mode::Fm));

    finish(radio);
    assert_eq!(events.last(), Some(&Event::Timeout));
}

#[test]
fn tune_outside_band_is_rejected_without_traffic() {
    let mut radio = radio(&power_up(0x00), &[], Config::default());

    radio.power_up(Mode::Fm).unwrap();
    assert_eq!(
        radio.tune(10900),
        Err(Error::InvalidArgument(InvalidArgument::Frequency {
            channel: 10900,
            bottom: 6400,
            top: 10800
        }))
    );

    finish(radio);
}

#[test]
fn tune_before_power_up_is_an_invalid_state() {
    let mut radio = radio(&[], &[], Config::default());
    assert_eq!(
        radio.tune(10110),
        Err(Error::InvalidState(State::AddressResolved))
    );
    finish(radio);
}

#[test]
fn volume_above_range_is_rejected_before_any_write() {
    let mut radio = radio(&power_up(0x00), &[], Config::default());

    radio.power_up(Mode::Fm).unwrap();
    assert_eq!(
        radio.set_volume(70),
        Err(Error::InvalidArgument(InvalidArgument::Volume(70)))
    );
    assert_eq!(radio.volume(), 30);

    finish(radio);
}

#[test]
fn volume_up_reads_then_writes() {
    let mut expected = power_up(0x00);
    expected.extend(command(&[0x13, 0x00, 0x40, 0x00]));
    expected.push(I2cTransaction::read(ADDR, vec![0x80, 0x00, 0x00, 0x3F]));
    expected.extend(property(0x4000, 63));
    let mut radio = radio(&expected, &[], Config::default());

    radio.power_up(Mode::Fm).unwrap();
    assert_eq!(radio.volume_up(), Ok(63));
    assert_eq!(radio.volume(), 63);

    finish(radio);
}

#[test]
fn failed_power_up_keeps_state() {
    let mut expected = command(&[0x01, 0x50, 0x05]);
    expected.push(
        I2cTransaction::write(ADDR, vec![0x12, 0x00, 0x02, 0x01, 0x80, 0x00])
            .with_error(ErrorKind::Other),
    );
    let mut radio = radio(&expected, &[], Config::default());

    assert_eq!(radio.power_up(Mode::Fm), Err(Error::Bus(ErrorKind::Other)));
    assert_eq!(radio.state(), State::AddressResolved);

    finish(radio);
}

#[test]
fn power_up_times_out_without_cts() {
    let mut config = Config::default();
    config.timing.ready = ReadyPolicy::new(3, 10);
    let expected = [
        I2cTransaction::write(ADDR, vec![0x01, 0x50, 0x05]),
        I2cTransaction::read(ADDR, vec![0x00]),
        I2cTransaction::read(ADDR, vec![0x00]),
        I2cTransaction::read(ADDR, vec![0x00]),
    ];
    let mut radio = radio(&expected, &[], config);

    assert_eq!(radio.power_up(Mode::Fm), Err(Error::Timeout));
    assert_eq!(radio.state(), State::AddressResolved);

    finish(radio);
}

#[test]
fn failed_mode_switch_faults_until_reset() {
    let expected = [I2cTransaction::write(ADDR, vec![0x01, 0x51, 0x05]).with_error(ErrorKind::Other)];
    let pin = [
        PinTransaction::set(PinState::Low),
        PinTransaction::set(PinState::High),
    ];
    let mut events = Vec::new();
    let mut radio = radio(&expected, &pin, Config::default()).with_observer(|e: Event| events.push(e));

    assert_eq!(radio.set_mode(Mode::Am), Err(Error::Bus(ErrorKind::Other)));
    assert_eq!(radio.state(), State::Faulted);
    assert_eq!(radio.set_mode(Mode::Fm), Err(Error::InvalidState(State::Faulted)));
    assert_eq!(radio.power_up(Mode::Fm), Err(Error::InvalidState(State::Faulted)));

    radio.reset().unwrap();
    assert_eq!(radio.state(), State::AddressResolved);

    finish(radio);
    assert_eq!(events, [Event::Faulted, Event::Reset]);
}

#[test]
fn chip_error_is_reported() {
    let expected = [
        I2cTransaction::write(ADDR, vec![0x01, 0x50, 0x05]),
        I2cTransaction::read(ADDR, vec![0xC0]),
    ];
    let mut events = Vec::new();
    let mut radio = radio(&expected, &[], Config::default()).with_observer(|e: Event| events.push(e));

    let status = match radio.power_up(Mode::Fm) {
        Err(Error::Chip(status)) => status,
        other => panic!("unexpected result {other:?}"),
    };
    assert!(status.is_error());

    finish(radio);
    assert_eq!(events, [Event::ChipError(status)]);
}

#[test]
fn status_is_readable_before_power_up() {
    let expected = [
        I2cTransaction::write(ADDR, vec![0x14]),
        I2cTransaction::read(ADDR, vec![0xC0]),
    ];
    let mut radio = radio(&expected, &[], Config::default());

    let status = radio.get_status().unwrap();
    assert!(status.is_clear_to_send());
    assert!(status.is_error());

    finish(radio);
}

#[test]
fn seek_lands_on_reported_channel() {
    let mut expected = power_up(0x00);
    expected.extend(command(&[0x21, 0x0C]));
    expected.extend([
        I2cTransaction::write(ADDR, vec![0x14]),
        I2cTransaction::read(ADDR, vec![0x81]),
    ]);
    expected.extend(tune_status(0x81, 9870));
    let mut radio = radio(&expected, &[], Config::default());

    radio.power_up(Mode::Fm).unwrap();
    let found = radio.seek(Direction::Up, true).unwrap();
    assert_eq!(found.frequency, 9870);
    assert_eq!(
        radio.state(),
        State::Tuned {
            mode: Mode::Fm,
            channel: 9870
        }
    );

    finish(radio);
}

#[test]
fn step_wraps_at_band_top() {
    let mut expected = power_up(0x00);
    expected.extend(fm_tune(10800));
    expected.extend(fm_tune(6400));
    let mut radio = radio(&expected, &[], Config::default());

    radio.power_up(Mode::Fm).unwrap();
    radio.tune(10800).unwrap();
    radio.step(Direction::Up).unwrap();
    assert_eq!(
        radio.state(),
        State::Tuned {
            mode: Mode::Fm,
            channel: 6400
        }
    );

    finish(radio);
}

#[test]
fn band_limits_narrow_tune_validation() {
    let mut expected = power_up(0x00);
    expected.extend(property(0x1400, 8750));
    expected.extend(property(0x1401, 10800));
    let mut radio = radio(&expected, &[], Config::default());

    radio.power_up(Mode::Fm).unwrap();
    assert_eq!(
        radio.set_band_limits(10800, 8750),
        Err(Error::InvalidArgument(InvalidArgument::BandLimits {
            bottom: 10800,
            top: 8750
        }))
    );
    radio.set_band_limits(8750, 10800).unwrap();
    assert_eq!(radio.config().fm_band.bottom, 8750);
    assert!(matches!(
        radio.tune(8000),
        Err(Error::InvalidArgument(InvalidArgument::Frequency { .. }))
    ));

    finish(radio);
}

#[test]
fn am_bandwidth_needs_am_mode() {
    let mut radio = radio(&power_up(0x00), &[], Config::default());

    radio.power_up(Mode::Fm).unwrap();
    assert_eq!(
        radio.set_am_bandwidth(si4735::AmBandwidth::Khz6, true),
        Err(Error::InvalidState(State::PoweredUp(Mode::Fm)))
    );

    finish(radio);
}

#[test]
fn power_down_returns_to_powered_down() {
    let mut expected = power_up(0x00);
    expected.extend(command(&[0x11]));
    expected.extend(power_up(0x00));
    let mut radio = radio(&expected, &[], Config::default());

    radio.power_up(Mode::Fm).unwrap();
    radio.power_down().unwrap();
    assert_eq!(radio.state(), State::PoweredDown);
    assert_eq!(radio.power_down(), Err(Error::InvalidState(State::PoweredDown)));
    radio.power_up(Mode::Fm).unwrap();

    finish(radio);
}

#[test]
fn timed_out_command_is_waited_for_before_the_next_one() {
    let mut config = Config::default();
    config.timing.ready = ReadyPolicy::new(2, 10);
    let mut expected = power_up(0x00);
    expected.extend([
        I2cTransaction::write(ADDR, vec![0x12, 0x00, 0x40, 0x00, 0x00, 0x0A]),
        I2cTransaction::read(ADDR, vec![0x00]),
        I2cTransaction::read(ADDR, vec![0x00]),
        I2cTransaction::read(ADDR, vec![0x80]),
    ]);
    expected.extend(property(0x4000, 11));
    let mut events = Vec::new();
    let mut radio = radio(&expected, &[], config).with_observer(|e: Event| events.push(e));

    radio.power_up(Mode::Fm).unwrap();
    assert_eq!(radio.set_volume(10), Err(Error::Timeout));
    assert_eq!(radio.volume(), 30);
    radio.set_volume(11).unwrap();
    assert_eq!(radio.volume(), 11);

    finish(radio);
    assert!(events.contains(&Event::Timeout));
}

#[test]
fn still_busy_chip_gets_no_new_command() {
    let mut config = Config::default();
    config.timing.ready = ReadyPolicy::new(2, 10);
    let mut expected = power_up(0x00);
    expected.extend([
        I2cTransaction::write(ADDR, vec![0x12, 0x00, 0x40, 0x00, 0x00, 0x0A]),
        I2cTransaction::read(ADDR, vec![0x00]),
        I2cTransaction::read(ADDR, vec![0x00]),
        I2cTransaction::read(ADDR, vec![0x00]),
        I2cTransaction::read(ADDR, vec![0x00]),
    ]);
    let mut radio = radio(&expected, &[], config);

    radio.power_up(Mode::Fm).unwrap();
    assert_eq!(radio.set_volume(10), Err(Error::Timeout));
    assert_eq!(radio.set_volume(11), Err(Error::Timeout));

    finish(radio);
}

#[test]
fn power_up_failure_after_power_down_faults() {
    let mut expected = power_up(0x00);
    expected.extend(command(&[0x11]));
    expected.push(I2cTransaction::write(ADDR, vec![0x01, 0x51, 0x05]).with_error(ErrorKind::Other));
    let mut events = Vec::new();
    let mut radio = radio(&expected, &[], Config::default()).with_observer(|e: Event| events.push(e));

    radio.power_up(Mode::Fm).unwrap();
    assert_eq!(radio.set_mode(Mode::Am), Err(Error::Bus(ErrorKind::Other)));
    assert_eq!(radio.state(), State::Faulted);
    assert_eq!(radio.mode(), None);
    assert_eq!(radio.tune(1000), Err(Error::InvalidState(State::Faulted)));

    finish(radio);
    assert!(events.contains(&Event::PoweredDown));
    assert_eq!(events.last(), Some(&Event::Faulted));
}

#[test]
fn am_tune_uses_kilohertz_channels() {
    let mut expected = switch_to_am();
    expected.extend(command(&[0x40, 0x00, 0x03, 0xE8, 0x00, 0x00]));
    expected.extend([
        I2cTransaction::write(ADDR, vec![0x14]),
        I2cTransaction::read(ADDR, vec![0x81]),
        I2cTransaction::write(ADDR, vec![0x42, 0x01]),
        I2cTransaction::read(ADDR, vec![0x81]),
        I2cTransaction::read(ADDR, vec![0x81, 0x01, 0x03, 0xE8, 0x30, 0x0C, 0x00]),
        I2cTransaction::write(ADDR, vec![0x42, 0x01]),
        I2cTransaction::read(ADDR, vec![0x80]),
        I2cTransaction::read(ADDR, vec![0x80, 0x01, 0x03, 0xE8, 0x30, 0x0C, 0x00]),
    ]);
    let mut radio = radio(&expected, &[], Config::default());

    radio.set_mode(Mode::Am).unwrap();
    assert!(matches!(
        radio.tune(10110),
        Err(Error::InvalidArgument(InvalidArgument::Frequency {
            bottom: 520,
            top: 1710,
            ..
        }))
    ));

    let tuned = radio.tune(1000).unwrap();
    assert_eq!(tuned.frequency, 1000);
    assert_eq!(
        radio.state(),
        State::Tuned {
            mode: Mode::Am,
            channel: 1000
        }
    );
    assert_eq!(radio.get_tune_status().unwrap().frequency, 1000);

    finish(radio);
}

#[test]
fn frequency_step_rejects_zero_and_writes_spacing() {
    let mut expected = power_up(0x00);
    expected.extend(property(0x1402, 20));
    let mut radio = radio(&expected, &[], Config::default());

    radio.power_up(Mode::Fm).unwrap();
    assert_eq!(
        radio.set_frequency_step(0),
        Err(Error::InvalidArgument(InvalidArgument::Step(0)))
    );
    radio.set_frequency_step(20).unwrap();
    assert_eq!(radio.config().fm_band.step, 20);

    finish(radio);
}

#[test]
fn signal_quality_is_read_for_active_mode() {
    let mut expected = power_up(0x00);
    expected.extend(command(&[0x23, 0x01]));
    expected.push(I2cTransaction::read(ADDR, vec![0x80, 0x00, 0x09, 0xC0, 0x30, 0x14, 0x05]));
    let mut radio = radio(&expected, &[], Config::default());

    radio.power_up(Mode::Fm).unwrap();
    let rsq = radio.get_rsq_status().unwrap();
    assert!(rsq.valid);
    assert!(rsq.pilot);
    assert_eq!(rsq.rssi, 48);
    assert_eq!(rsq.snr, 20);

    finish(radio);
}

#[test]
fn revision_records_are_read() {
    let record = [0x80, 35, b'6', b'0', 0x12, 0x34, b'3', b'0', b'D'];
    let mut long = record.to_vec();
    long.extend([1, 2, 3, 4, 5]);
    let mut expected = power_up(0x00);
    expected.extend(command(&[0x10]));
    expected.push(I2cTransaction::read(ADDR, record.to_vec()));
    expected.extend(command(&[0x10]));
    expected.push(I2cTransaction::read(ADDR, long));
    let mut radio = radio(&expected, &[], Config::default());

    radio.power_up(Mode::Fm).unwrap();
    let revision = radio.get_revision().unwrap();
    assert_eq!(revision.part_number, 35);
    assert_eq!(revision.patch_id, 0x1234);

    let extended = radio.get_revision_long().unwrap();
    assert_eq!(extended.revision, revision);
    assert_eq!(extended.extended, [1, 2, 3, 4, 5]);

    finish(radio);
}

#[test]
fn mute_writes_both_channels() {
    let mut expected = power_up(0x00);
    expected.extend(property(0x4001, 3));
    expected.extend(property(0x4001, 0));
    let mut radio = radio(&expected, &[], Config::default());

    radio.power_up(Mode::Fm).unwrap();
    radio.set_mute(true).unwrap();
    radio.set_mute(false).unwrap();

    finish(radio);
}

#[test]
fn volume_down_stops_at_zero() {
    let mut expected = power_up(0x00);
    expected.extend(command(&[0x13, 0x00, 0x40, 0x00]));
    expected.push(I2cTransaction::read(ADDR, vec![0x80, 0x00, 0x00, 0x00]));
    expected.extend(property(0x4000, 0));
    let mut radio = radio(&expected, &[], Config::default());

    radio.power_up(Mode::Fm).unwrap();
    assert_eq!(radio.volume_down(), Ok(0));
    assert_eq!(radio.volume(), 0);

    finish(radio);
}

#[test]
fn seek_thresholds_use_am_properties() {
    let mut expected = switch_to_am();
    expected.extend(property(0x3404, 0));
    expected.extend(property(0x3403, 10));
    let mut radio = radio(&expected, &[], Config::default());

    radio.set_mode(Mode::Am).unwrap();
    assert_eq!(
        radio.set_seek_thresholds(64, 10),
        Err(Error::InvalidArgument(InvalidArgument::SeekThreshold {
            rssi: 64,
            snr: 10
        }))
    );
    radio.set_seek_thresholds(0, 10).unwrap();

    finish(radio);
}

#[test]
fn fm_deemphasis_needs_fm_mode() {
    let mut expected = power_up(0x00);
    expected.extend(property(0x1100, 1));
    expected.extend(command(&[0x11]));
    expected.extend(switch_to_am());
    let mut radio = radio(&expected, &[], Config::default());

    radio.power_up(Mode::Fm).unwrap();
    radio.set_fm_deemphasis(si4735::Deemphasis::Us50).unwrap();
    radio.set_mode(Mode::Am).unwrap();
    assert_eq!(
        radio.set_fm_deemphasis(si4735::Deemphasis::Us75),
        Err(Error::InvalidState(State::PoweredUp(Mode::Am)))
    );

    finish(radio);
}
