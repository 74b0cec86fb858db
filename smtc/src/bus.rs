//! Register addressed transfers over the board bus

use std::collections::BTreeMap;

use log::trace;
use rppal::i2c::{Error as I2CError, I2c};
use thiserror::Error;

/// Size of a board's memory map.
pub const MEMORY_SIZE: usize = 0x100;

#[derive(Debug, Error)]
pub enum BusError {
    #[error(transparent)]
    I2c(#[from] I2CError),
    #[error("no device acknowledged address {0:#04x}")]
    Nack(u8),
    #[error("short transfer, expected {expected} bytes but moved {actual}")]
    ShortTransfer { expected: usize, actual: usize },
    #[error("no device address selected")]
    NotSelected,
}

/// Minimal transport the board driver is built on.
pub trait Bus {
    /// Point subsequent transfers at the device at `address`.
    fn select(&mut self, address: u8) -> Result<(), BusError>;

    /// Read `buf.len()` bytes starting at `register` of the selected device.
    fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusError>;

    /// Write `data` starting at `register` of the selected device.
    fn write(&mut self, register: u8, data: &[u8]) -> Result<(), BusError>;
}

/// Linux I2C character device, opened on first use.
pub struct I2cBus {
    bus: u8,
    i2c: Option<I2c>,
    selected: bool,
}

impl I2cBus {
    pub fn new(bus: u8) -> Self {
        Self {
            bus,
            i2c: None,
            selected: false,
        }
    }

    fn device(&mut self) -> Result<&mut I2c, BusError> {
        match (&mut self.i2c, self.selected) {
            (Some(i2c), true) => Ok(i2c),
            _ => Err(BusError::NotSelected),
        }
    }
}

impl Bus for I2cBus {
    fn select(&mut self, address: u8) -> Result<(), BusError> {
        trace!("i2c-{}: select {:#04x}", self.bus, address);

        let i2c = match self.i2c {
            Some(ref mut i2c) => i2c,
            None => self.i2c.insert(I2c::with_bus(self.bus)?),
        };

        self.selected = false;
        i2c.set_slave_address(address as u16)?;
        self.selected = true;

        Ok(())
    }

    fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusError> {
        trace!("i2c: read {} bytes at {}", buf.len(), register);

        self.device()?.write_read(&[register], buf)?;

        Ok(())
    }

    fn write(&mut self, register: u8, data: &[u8]) -> Result<(), BusError> {
        trace!("i2c: write {:02x?} at {}", data, register);

        let mut buffer = Vec::with_capacity(data.len() + 1);
        buffer.push(register);
        buffer.extend_from_slice(data);

        let written = self.device()?.write(&buffer)?;

        if written != buffer.len() {
            return Err(BusError::ShortTransfer {
                expected: buffer.len(),
                actual: written,
            });
        }

        Ok(())
    }
}

/// One transfer seen by a [`MemoryBus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Select(u8),
    Read { address: u8, register: u8, len: usize },
    Write { address: u8, register: u8, data: Vec<u8> },
}

/// Simulated bus of devices backed by plain memory. Every transfer is
/// logged, including failed ones.
#[derive(Debug, Default)]
pub struct MemoryBus {
    devices: BTreeMap<u8, [u8; MEMORY_SIZE]>,
    selected: Option<u8>,
    log: Vec<Transaction>,
    faulty: bool,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zeroed device at `address`.
    pub fn with_device(mut self, address: u8) -> Self {
        self.add_device(address);
        self
    }

    pub fn add_device(&mut self, address: u8) {
        self.devices.entry(address).or_insert([0; MEMORY_SIZE]);
    }

    /// Fill device memory without going through the log.
    pub fn poke(&mut self, address: u8, register: u8, data: &[u8]) {
        let memory = self.devices.entry(address).or_insert([0; MEMORY_SIZE]);
        let start = register as usize;

        memory[start..start + data.len()].copy_from_slice(data);
    }

    /// Inspect device memory without going through the log.
    pub fn peek(&self, address: u8, register: u8, len: usize) -> Option<&[u8]> {
        let start = register as usize;

        self.devices
            .get(&address)
            .and_then(|memory| memory.get(start..start + len))
    }

    /// Make every following read and write fail.
    pub fn set_faulty(&mut self, faulty: bool) {
        self.faulty = faulty;
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    pub fn clear_transactions(&mut self) {
        self.log.clear();
    }

    fn memory(&mut self, register: u8, len: usize) -> Result<&mut [u8], BusError> {
        let address = self.selected.ok_or(BusError::NotSelected)?;

        if self.faulty {
            return Err(BusError::ShortTransfer {
                expected: len,
                actual: 0,
            });
        }

        let memory = self
            .devices
            .get_mut(&address)
            .ok_or(BusError::Nack(address))?;

        let start = register as usize;
        let available = MEMORY_SIZE - start;

        match memory.get_mut(start..start + len) {
            Some(slice) => Ok(slice),
            None => Err(BusError::ShortTransfer {
                expected: len,
                actual: available,
            }),
        }
    }
}

impl Bus for MemoryBus {
    fn select(&mut self, address: u8) -> Result<(), BusError> {
        self.log.push(Transaction::Select(address));
        self.selected = Some(address);

        Ok(())
    }

    fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusError> {
        if let Some(address) = self.selected {
            self.log.push(Transaction::Read {
                address,
                register,
                len: buf.len(),
            });
        }

        let memory = self.memory(register, buf.len())?;
        buf.copy_from_slice(memory);

        Ok(())
    }

    fn write(&mut self, register: u8, data: &[u8]) -> Result<(), BusError> {
        if let Some(address) = self.selected {
            self.log.push(Transaction::Write {
                address,
                register,
                data: data.to_vec(),
            });
        }

        let memory = self.memory(register, data.len())?;
        memory.copy_from_slice(data);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_bus_reads_back_writes() {
        let mut bus = MemoryBus::new().with_device(0x16);

        bus.select(0x16).unwrap();
        bus.write(10, &[1, 2, 3]).unwrap();

        let mut buf = [0; 3];
        bus.read(10, &mut buf).unwrap();

        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(bus.peek(0x16, 10, 3), Some(&[1, 2, 3][..]));
        assert_eq!(
            bus.transactions(),
            &[
                Transaction::Select(0x16),
                Transaction::Write {
                    address: 0x16,
                    register: 10,
                    data: vec![1, 2, 3]
                },
                Transaction::Read {
                    address: 0x16,
                    register: 10,
                    len: 3
                },
            ]
        );
    }

    #[test]
    fn memory_bus_errors() {
        let mut bus = MemoryBus::new().with_device(0x16);
        let mut buf = [0; 2];

        assert!(matches!(bus.read(0, &mut buf), Err(BusError::NotSelected)));

        bus.select(0x17).unwrap();
        assert!(matches!(bus.read(0, &mut buf), Err(BusError::Nack(0x17))));

        bus.select(0x16).unwrap();
        assert!(matches!(
            bus.read(0xff, &mut buf),
            Err(BusError::ShortTransfer {
                expected: 2,
                actual: 1
            })
        ));

        bus.set_faulty(true);
        assert!(bus.read(0, &mut buf).is_err());
        assert!(bus.write(0, &[0]).is_err());
    }
}
