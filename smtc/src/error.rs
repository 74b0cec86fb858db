use thiserror::Error;

use crate::bus::BusError;

#[derive(Debug, Error)]
pub enum Error {
    /// A stack level, channel or value was out of range. Raised before any
    /// bus access.
    #[error("{0}")]
    InvalidArgument(String),
    /// Nothing answered the probe at the board's address.
    #[error("Thermocouple card id {0} not detected")]
    DeviceNotFound(u8),
    #[error("Communication error: {0}")]
    Communication(#[from] BusError),
}
