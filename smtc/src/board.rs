//! Session with one board of the stack and the typed accessors on top of it

use std::fmt::Display;

use log::{debug, trace, warn};

use crate::{
    bus::Bus,
    registers::{self, Quantity, BASE_ADDRESS, STACK_LEVELS},
    sensor::SensorCode,
    Error,
};

/// Position of a board in the stack, 0 to 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StackId(u8);

impl StackId {
    pub fn new(level: u8) -> Result<Self, Error> {
        if level >= STACK_LEVELS {
            return Err(Error::InvalidArgument(format!(
                "Invalid stack level {} [0..{}]!",
                level,
                STACK_LEVELS - 1
            )));
        }

        Ok(Self(level))
    }

    #[inline]
    pub fn level(self) -> u8 {
        self.0
    }

    /// Bus address the board at this level answers on.
    #[inline]
    pub fn address(self) -> u8 {
        BASE_ADDRESS + self.0
    }

    /// Every stack level, lowest first.
    pub fn all() -> impl DoubleEndedIterator<Item = StackId> {
        (0..STACK_LEVELS).map(Self)
    }
}

impl Display for StackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Check whether a board answers at `address` with a one byte read of
/// the firmware revision.
pub fn probe<B: Bus + ?Sized>(bus: &mut B, address: u8) -> bool {
    let mut buf = [0u8; 1];

    let result = bus
        .select(address)
        .and_then(|_| bus.read(registers::ADDR_FW_REV_MAJOR, &mut buf));

    match result {
        Ok(()) => true,
        Err(e) => {
            trace!("probe of {:#04x} failed: {}", address, e);
            false
        }
    }
}

/// Probe every stack level and return the ones that answered, highest
/// level first.
pub fn list_boards<B: Bus + ?Sized>(bus: &mut B) -> Vec<StackId> {
    let mut found: Vec<StackId> = StackId::all()
        .filter(|stack| probe(&mut *bus, stack.address()))
        .collect();

    found.reverse();

    debug!("{} board(s) answered: {:?}", found.len(), found);

    found
}

/// Open session with a board that answered its probe.
///
/// The bus stays pointed at the board for as long as the session lives.
pub struct Board<'a, B: Bus + ?Sized> {
    bus: &'a mut B,
    stack: StackId,
}

impl<'a, B: Bus + ?Sized> Board<'a, B> {
    /// Validate the stack level, select the board and probe it.
    pub fn open(bus: &'a mut B, level: u8) -> Result<Self, Error> {
        let stack = StackId::new(level)?;

        bus.select(stack.address())?;

        let mut buf = [0u8; 1];
        if let Err(e) = bus.read(registers::ADDR_FW_REV_MAJOR, &mut buf) {
            debug!("board {} at {:#04x}: {}", stack, stack.address(), e);
            return Err(Error::DeviceNotFound(stack.level()));
        }

        debug!("opened board {} at {:#04x}", stack, stack.address());

        Ok(Self { bus, stack })
    }

    #[inline]
    pub fn stack(&self) -> StackId {
        self.stack
    }

    pub(crate) fn read_bytes<const N: usize>(&mut self, register: u8) -> Result<[u8; N], Error> {
        let mut buf = [0u8; N];

        self.bus.read(register, &mut buf)?;

        Ok(buf)
    }

    pub(crate) fn write_bytes(&mut self, register: u8, data: &[u8]) -> Result<(), Error> {
        self.bus.write(register, data)?;

        Ok(())
    }

    fn read_scaled(&mut self, quantity: &Quantity, channel: u8) -> Result<f32, Error> {
        let register = quantity.channel_address(channel)?;
        let raw = i16::from_le_bytes(self.read_bytes(register)?);

        Ok(raw as f32 / quantity.scale)
    }

    /// Thermocouple temperature of `channel` (1 to 8) in celcius.
    #[inline]
    pub fn read_temperature(&mut self, channel: u8) -> Result<f32, Error> {
        self.read_scaled(&registers::TEMPERATURE, channel)
    }

    /// Thermocouple voltage of `channel` (1 to 8) in millivolts.
    #[inline]
    pub fn read_millivolts(&mut self, channel: u8) -> Result<f32, Error> {
        self.read_scaled(&registers::MILLIVOLTS, channel)
    }

    /// Connector temperature measured by thermistor `channel` (1 to 10)
    /// in celcius.
    #[inline]
    pub fn read_connector_temperature(&mut self, channel: u8) -> Result<f32, Error> {
        self.read_scaled(&registers::CONNECTOR_TEMPERATURE, channel)
    }

    pub fn read_sensor_type(&mut self, channel: u8) -> Result<SensorCode, Error> {
        let register = registers::SENSOR_TYPE.channel_address(channel)?;
        let [raw] = self.read_bytes::<1>(register)?;

        let code = SensorCode::from(raw);

        if let SensorCode::Unknown(raw) = code {
            warn!(
                "board {} channel {} reports unknown thermocouple type {}",
                self.stack, channel, raw
            );
        }

        Ok(code)
    }

    /// Configure `channel` for thermocouple type `code` (0 to 7).
    pub fn write_sensor_type(&mut self, channel: u8, code: u8) -> Result<(), Error> {
        registers::SENSOR_TYPE.check(code as i64)?;
        let register = registers::SENSOR_TYPE.channel_address(channel)?;

        self.write_bytes(register, &[code])
    }

    /// Samples in the board's moving average filter.
    pub fn read_filter_size(&mut self) -> Result<u8, Error> {
        let [size] = self.read_bytes::<1>(registers::FILTER_SIZE.base)?;

        Ok(size)
    }

    pub fn write_filter_size(&mut self, size: u8) -> Result<(), Error> {
        registers::FILTER_SIZE.check(size as i64)?;

        self.write_bytes(registers::FILTER_SIZE.base, &[size])
    }

    /// Firmware revision as (major, minor).
    pub fn read_firmware_version(&mut self) -> Result<(u8, u8), Error> {
        let [major, minor] = self.read_bytes::<2>(registers::FIRMWARE_REVISION.base)?;

        Ok((major, minor))
    }

    /// Hardware revision as (major, minor).
    pub fn read_hardware_revision(&mut self) -> Result<(u8, u8), Error> {
        let [major, minor] = self.read_bytes::<2>(registers::HARDWARE_REVISION.base)?;

        Ok((major, minor))
    }

    /// Temperature of the board's own processor in celcius.
    pub fn read_cpu_temperature(&mut self) -> Result<i8, Error> {
        let raw = self.read_bytes(registers::CPU_TEMPERATURE.base)?;

        Ok(i8::from_le_bytes(raw))
    }

    pub fn read_card_type(&mut self) -> Result<u8, Error> {
        let [card] = self.read_bytes::<1>(registers::CARD_TYPE.base)?;

        Ok(card)
    }
}
