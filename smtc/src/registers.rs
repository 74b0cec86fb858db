//! Memory map of the thermocouple board
//!
//! All multi-byte registers are little endian.

use crate::Error;

/// Bus address of the board at stack level 0.
pub const BASE_ADDRESS: u8 = 0x16;
/// Number of stack levels, and so of boards on one bus.
pub const STACK_LEVELS: u8 = 8;
pub const ADDR_TC_TEMP: u8 = 0;
pub const ADDR_TC_TYPE: u8 = 16;
pub const ADDR_CPU_TEMP: u8 = 24;
pub const ADDR_DIAG_5V: u8 = 25;

pub const ADDR_WDT_RESET: u8 = 27;
pub const ADDR_WDT_PERIOD_SET: u8 = 28;
pub const ADDR_WDT_PERIOD_GET: u8 = 30;
pub const ADDR_WDT_INIT_PERIOD_SET: u8 = 32;
pub const ADDR_WDT_INIT_PERIOD_GET: u8 = 34;
pub const ADDR_WDT_RESET_COUNT: u8 = 36;
pub const ADDR_WDT_CLEAR_RESET_COUNT: u8 = 38;
pub const ADDR_WDT_OFF_PERIOD_SET: u8 = 39;
pub const ADDR_WDT_OFF_PERIOD_GET: u8 = 43;

pub const ADDR_HW_REV_MAJOR: u8 = 47;
pub const ADDR_HW_REV_MINOR: u8 = 48;
/// Also the register probed to detect a board.
pub const ADDR_FW_REV_MAJOR: u8 = 49;
pub const ADDR_FW_REV_MINOR: u8 = 50;

pub const ADDR_TC_MV: u8 = 51;
pub const ADDR_ADC_REINIT_COUNT: u8 = 67;
pub const ADDR_ADC_SPS1: u8 = 71;
pub const ADDR_ADC_SPS2: u8 = 73;
pub const ADDR_CARD_TYPE: u8 = 75;
pub const ADDR_HOST_5V: u8 = 76;
/// Five bytes of RS-485 settings.
pub const ADDR_RS485_SETTINGS: u8 = 78;
pub const ADDR_LED_FUNC: u8 = 83;
pub const ADDR_LED_THRESHOLD: u8 = 85;

/// Calibration resistance, f32. Written together with the channel trailer
/// at [`ADDR_CALIB_CHANNEL`] as one five byte transfer.
pub const ADDR_CALIB_RES: u8 = 101;
pub const ADDR_CALIB_CHANNEL: u8 = 105;
pub const ADDR_SENSORS_TYPE: u8 = 106;
pub const ADDR_ADS_SAMPLE_SWITCH: u8 = 107;
pub const ADDR_THERMISTOR_TEMP: u8 = 109;
pub const ADDR_FILTER_SIZE: u8 = 130;

pub const TC_CHANNELS: u8 = 8;
pub const THERMISTOR_CHANNELS: u8 = 10;

/// Valid range for values written to a quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub name: &'static str,
    pub min: i64,
    pub max: i64,
}

/// One logical value exposed by the board.
///
/// Per-channel quantities are laid out as `channels` consecutive slots of
/// `width` bytes starting at `base`; global quantities have `channels == 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    /// Name of the channel kind, used in diagnostics.
    pub name: &'static str,
    pub base: u8,
    pub width: u8,
    /// Raw value is divided by this to get the engineering value.
    pub scale: f32,
    pub channels: u8,
    pub limits: Option<Limits>,
}

impl Quantity {
    pub const fn global(name: &'static str, base: u8, width: u8, scale: f32) -> Self {
        Self {
            name,
            base,
            width,
            scale,
            channels: 0,
            limits: None,
        }
    }

    pub const fn per_channel(
        name: &'static str,
        base: u8,
        width: u8,
        scale: f32,
        channels: u8,
    ) -> Self {
        Self {
            name,
            base,
            width,
            scale,
            channels,
            limits: None,
        }
    }

    pub const fn limited(mut self, name: &'static str, min: i64, max: i64) -> Self {
        self.limits = Some(Limits { name, min, max });
        self
    }

    /// Number of bytes the quantity occupies in the memory map.
    pub const fn span(&self) -> usize {
        match self.channels {
            0 => self.width as usize,
            n => self.width as usize * n as usize,
        }
    }

    /// Register address of `channel`, counted from 1.
    pub fn channel_address(&self, channel: u8) -> Result<u8, Error> {
        if channel < 1 || channel > self.channels {
            return Err(Error::InvalidArgument(format!(
                "Invalid {} channel number {} [1..{}]!",
                self.name, channel, self.channels
            )));
        }

        Ok(self.base + self.width * (channel - 1))
    }

    /// Reject values outside of the quantity's limits.
    pub fn check(&self, value: i64) -> Result<(), Error> {
        match self.limits {
            Some(limits) if value < limits.min || value > limits.max => {
                Err(Error::InvalidArgument(format!(
                    "Invalid {} value {} [{}..{}]!",
                    limits.name, value, limits.min, limits.max
                )))
            }
            _ => Ok(()),
        }
    }
}

pub const TEMPERATURE: Quantity =
    Quantity::per_channel("thermocouple", ADDR_TC_TEMP, 2, 10.0, TC_CHANNELS);
pub const MILLIVOLTS: Quantity =
    Quantity::per_channel("thermocouple", ADDR_TC_MV, 2, 100.0, TC_CHANNELS);
pub const CONNECTOR_TEMPERATURE: Quantity =
    Quantity::per_channel("thermistor", ADDR_THERMISTOR_TEMP, 2, 10.0, THERMISTOR_CHANNELS);
pub const SENSOR_TYPE: Quantity =
    Quantity::per_channel("thermocouple", ADDR_TC_TYPE, 1, 1.0, TC_CHANNELS)
        .limited("thermocouple type", 0, 7);
pub const FILTER_SIZE: Quantity =
    Quantity::global("filter", ADDR_FILTER_SIZE, 1, 1.0).limited("filter size", 1, 40);
pub const CPU_TEMPERATURE: Quantity = Quantity::global("cpu", ADDR_CPU_TEMP, 1, 1.0);
/// Major and minor byte.
pub const FIRMWARE_REVISION: Quantity = Quantity::global("firmware", ADDR_FW_REV_MAJOR, 2, 1.0);
/// Major and minor byte.
pub const HARDWARE_REVISION: Quantity = Quantity::global("hardware", ADDR_HW_REV_MAJOR, 2, 1.0);
pub const CARD_TYPE: Quantity = Quantity::global("card", ADDR_CARD_TYPE, 1, 1.0);
/// Resistance in ohms plus the channel trailer byte.
pub const CALIBRATION: Quantity =
    Quantity::global("calibration", ADDR_CALIB_RES, 5, 1.0).limited("resistance", 0, 4000);

/// Every quantity served by the typed accessors.
pub const QUANTITIES: [&Quantity; 10] = [
    &TEMPERATURE,
    &MILLIVOLTS,
    &CONNECTOR_TEMPERATURE,
    &SENSOR_TYPE,
    &FILTER_SIZE,
    &CPU_TEMPERATURE,
    &FIRMWARE_REVISION,
    &HARDWARE_REVISION,
    &CARD_TYPE,
    &CALIBRATION,
];
