use std::env;

use thiserror::Error;

use crate::{BUS_LOCK_NAME, DEFAULT_I2C_BUS, ENV_I2C_BUS, ENV_LOCK_NAME};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: \"{value}\" is not a valid I2C bus number")]
    InvalidBus { var: &'static str, value: String },
    #[error("{var}: semaphore names must start with '/' and contain no other '/', got \"{value}\"")]
    InvalidLockName { var: &'static str, value: String },
}

/// Runtime settings of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Linux I2C bus number.
    pub i2c_bus: u8,
    /// Name of the POSIX semaphore guarding the bus.
    pub lock_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            i2c_bus: DEFAULT_I2C_BUS,
            lock_name: BUS_LOCK_NAME.to_owned(),
        }
    }
}

impl Config {
    /// Load the defaults, overridden by `SMTC_I2C_BUS` and `SMTC_LOCK_NAME`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as [`Config::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_I2C_BUS) {
            config.i2c_bus = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidBus {
                    var: ENV_I2C_BUS,
                    value: value.clone(),
                })?;
        }

        if let Some(value) = lookup(ENV_LOCK_NAME) {
            let valid = value.len() > 1
                && value.starts_with('/')
                && !value[1..].contains('/')
                && !value.contains('\0');

            if !valid {
                return Err(ConfigError::InvalidLockName {
                    var: ENV_LOCK_NAME,
                    value,
                });
            }

            config.lock_name = value;
        }

        Ok(config)
    }
}
