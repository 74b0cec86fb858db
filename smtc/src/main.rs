use std::{env, io, process::ExitCode};

use log::debug;
use shared::{Config, NamedSemaphore};
use smtc::{commands::CommandTable, I2cBus};

fn main() -> ExitCode {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "warn"),
    );

    let args: Vec<String> = env::args().skip(1).collect();
    let table = CommandTable::standard();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.is_empty() {
        table.write_usage(&mut out).unwrap_or_default();
        return ExitCode::FAILURE;
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    debug!("using /dev/i2c-{} and lock {}", config.i2c_bus, config.lock_name);

    let lock = match NamedSemaphore::open(&config.lock_name) {
        Ok(lock) => lock,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut bus = I2cBus::new(config.i2c_bus);

    match smtc::commands::run(&lock, &table, &mut bus, &mut out, &args) {
        Ok(status) => status.exit_code(),
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
