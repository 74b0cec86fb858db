use std::fmt::Display;

use enum_primitive_derive::Primitive;
use num_traits::FromPrimitive;

/// Thermocouple alloy a channel is configured for.
#[repr(u8)]
#[derive(Primitive, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorType {
    B = 0,
    E = 1,
    J = 2,
    K = 3,
    N = 4,
    R = 5,
    S = 6,
    T = 7,
}

impl SensorType {
    pub const ALL: [SensorType; 8] = [
        Self::B,
        Self::E,
        Self::J,
        Self::K,
        Self::N,
        Self::R,
        Self::S,
        Self::T,
    ];

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn letter(self) -> char {
        match self {
            Self::B => 'B',
            Self::E => 'E',
            Self::J => 'J',
            Self::K => 'K',
            Self::N => 'N',
            Self::R => 'R',
            Self::S => 'S',
            Self::T => 'T',
        }
    }
}

impl Display for SensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.letter(), self.code())
    }
}

/// Sensor type register as read back from the board. Codes the driver
/// doesn't know are kept rather than rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorCode {
    Known(SensorType),
    Unknown(u8),
}

impl SensorCode {
    pub fn raw(self) -> u8 {
        match self {
            Self::Known(sensor) => sensor.code(),
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<u8> for SensorCode {
    fn from(raw: u8) -> Self {
        match SensorType::from_u8(raw) {
            Some(sensor) => Self::Known(sensor),
            None => Self::Unknown(raw),
        }
    }
}

impl Display for SensorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(sensor) => Display::fmt(sensor, f),
            Self::Unknown(raw) => write!(f, "Unknown({})", raw),
        }
    }
}
