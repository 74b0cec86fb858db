//! Driver for the eight channel thermocouple stack board
//!
//! Up to eight cards share one I2C bus, each answering at
//! [`registers::BASE_ADDRESS`] plus its stack level. A [`Board`] session is
//! opened per command; the [`commands`] table maps the `smtc` command line
//! onto the typed accessors.

pub mod board;
pub mod bus;
pub mod calibration;
pub mod commands;
mod error;
pub mod registers;
pub mod sensor;

pub use board::{list_boards, probe, Board, StackId};
pub use bus::{Bus, BusError, I2cBus, MemoryBus, Transaction};
pub use calibration::CalibrationRecord;
pub use error::Error;
pub use sensor::{SensorCode, SensorType};
