//! Host-wide pieces shared by every program that talks to the board stack

mod config;
mod lock;

pub use config::{Config, ConfigError};
pub use lock::{BusLock, LocalGuard, LocalLock, LockError, NamedSemaphore, SemaphoreGuard};

/// Name of the semaphore every board utility on the host serializes on.
pub static BUS_LOCK_NAME: &str = "/SMI2C_SEM";

/// I2C bus the board stack sits on, `/dev/i2c-1` on a Raspberry Pi.
pub const DEFAULT_I2C_BUS: u8 = 1;

/// Overrides the I2C bus number.
pub static ENV_I2C_BUS: &str = "SMTC_I2C_BUS";
/// Overrides the bus lock name.
pub static ENV_LOCK_NAME: &str = "SMTC_LOCK_NAME";
