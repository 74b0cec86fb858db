//! Resistance calibration of the thermocouple channels
//!
//! A calibration point is one five byte write: the reference resistance
//! as a little endian f32, followed by the channel number. The board does
//! the rest; nothing is read back. A resistance of -1 asks the board to
//! restore the factory calibration of the channel.

use log::debug;

use crate::{
    bus::Bus,
    registers::{self, ADDR_CALIB_RES},
    Board, Error,
};

/// Resistance that restores the factory calibration.
pub const RESET_RESISTANCE: f32 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationRecord {
    pub resistance: f32,
    pub channel: u8,
}

impl CalibrationRecord {
    /// Calibration point at `resistance` ohms (0 to 4000) on `channel`.
    pub fn point(channel: u8, resistance: f32) -> Result<Self, Error> {
        let limits = registers::CALIBRATION.limits;

        if let Some(limits) = limits {
            if !(limits.min as f32..=limits.max as f32).contains(&resistance) {
                return Err(Error::InvalidArgument(format!(
                    "Invalid calibration resistance {} [{}..{}]!",
                    resistance, limits.min, limits.max
                )));
            }
        }

        Self::reset(channel).map(|record| Self {
            resistance,
            ..record
        })
    }

    /// Restore the factory calibration of `channel`.
    pub fn reset(channel: u8) -> Result<Self, Error> {
        // The channel range is shared with the thermocouple readings
        registers::TEMPERATURE.channel_address(channel)?;

        Ok(Self {
            resistance: RESET_RESISTANCE,
            channel,
        })
    }

    pub fn to_bytes(&self) -> [u8; 5] {
        let mut buf = [0u8; 5];

        buf[..4].copy_from_slice(&self.resistance.to_le_bytes());
        buf[4] = self.channel;

        buf
    }
}

impl<B: Bus + ?Sized> Board<'_, B> {
    pub fn write_calibration(&mut self, record: &CalibrationRecord) -> Result<(), Error> {
        debug!(
            "board {}: calibration {} ohm on channel {}",
            self.stack(),
            record.resistance,
            record.channel
        );

        self.write_bytes(ADDR_CALIB_RES, &record.to_bytes())
    }

    /// Send one calibration point of `resistance` ohms for `channel`.
    pub fn calibrate(&mut self, channel: u8, resistance: f32) -> Result<(), Error> {
        let record = CalibrationRecord::point(channel, resistance)?;

        self.write_calibration(&record)
    }

    pub fn reset_calibration(&mut self, channel: u8) -> Result<(), Error> {
        let record = CalibrationRecord::reset(channel)?;

        self.write_calibration(&record)
    }
}
