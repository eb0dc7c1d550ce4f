//! Property identifiers
//!
//! Properties are configuration registers inside the chip, written with
//! SET_PROPERTY and read with GET_PROPERTY. Only the ones the driver uses
//! are named here; any other id can be built with [`PropertyId::new`].

/// A 16 bit property identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PropertyId(pub u16);

impl PropertyId {
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Reference clock frequency in Hz, 31130..=34406
    pub const REFCLK_FREQ: Self = Self(0x0201);
    /// Prescaler from RCLK to the reference clock, 1..=4095; bit 12 selects DCLK
    pub const REFCLK_PRESCALE: Self = Self(0x0202);

    /// FM de-emphasis time constant
    pub const FM_DEEMPHASIS: Self = Self(0x1100);
    /// Lower FM seek band limit, 10 kHz units
    pub const FM_SEEK_BAND_BOTTOM: Self = Self(0x1400);
    /// Upper FM seek band limit, 10 kHz units
    pub const FM_SEEK_BAND_TOP: Self = Self(0x1401);
    /// FM seek channel spacing, 10 kHz units
    pub const FM_SEEK_FREQ_SPACING: Self = Self(0x1402);
    /// Minimum SNR for a valid FM seek/tune
    pub const FM_SEEK_TUNE_SNR_THRESHOLD: Self = Self(0x1403);
    /// Minimum RSSI for a valid FM seek/tune
    pub const FM_SEEK_TUNE_RSSI_THRESHOLD: Self = Self(0x1404);

    /// AM channel filter bandwidth and power line noise filter
    pub const AM_CHANNEL_FILTER: Self = Self(0x3102);
    /// Lower AM seek band limit, 1 kHz units
    pub const AM_SEEK_BAND_BOTTOM: Self = Self(0x3400);
    /// Upper AM seek band limit, 1 kHz units
    pub const AM_SEEK_BAND_TOP: Self = Self(0x3401);
    /// AM seek channel spacing, 1 kHz units
    pub const AM_SEEK_FREQ_SPACING: Self = Self(0x3402);
    /// Minimum SNR for a valid AM seek/tune
    pub const AM_SEEK_SNR_THRESHOLD: Self = Self(0x3403);
    /// Minimum RSSI for a valid AM seek/tune
    pub const AM_SEEK_RSSI_THRESHOLD: Self = Self(0x3404);

    /// Audio volume, 0..=63
    pub const RX_VOLUME: Self = Self(0x4000);
    /// Hard mute; bit 1 mutes left, bit 0 mutes right
    pub const RX_HARD_MUTE: Self = Self(0x4001);
}

/// Highest value accepted by [`PropertyId::RX_VOLUME`]
pub const VOLUME_MAX: u8 = 63;

/// Mute both audio channels through [`PropertyId::RX_HARD_MUTE`]
pub const HARD_MUTE_BOTH: u16 = 0x0003;

/// FM de-emphasis time constant (FM_DEEMPHASIS)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Deemphasis {
    /// 50 µs, Europe, Australia, Japan
    Us50 = 1,
    /// 75 µs, USA
    Us75 = 2,
}

/// AM channel filter bandwidth (AM_CHANNEL_FILTER bits 3:0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AmBandwidth {
    Khz6 = 0,
    Khz4 = 1,
    Khz3 = 2,
    Khz2 = 3,
    Khz1 = 4,
    Khz1_8 = 5,
    Khz2_5 = 6,
}

impl AmBandwidth {
    /// AM_CHANNEL_FILTER value; bit 8 enables the power line noise filter
    pub fn property_value(self, power_line_filter: bool) -> u16 {
        let filter = if power_line_filter { 1 << 8 } else { 0 };
        self as u16 | filter
    }
}
