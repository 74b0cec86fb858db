//! Command table of the `smtc` controller
//!
//! Each command is matched by a name token expected at a fixed argument
//! position (the program name is not part of the arguments). The whole
//! dispatch runs under the host-wide bus lock, see [`run`].

mod calibrate;
mod info;
mod measure;

use std::{io::Write, ops::RangeInclusive, process::ExitCode, str::FromStr};

use log::debug;
use shared::{BusLock, LockError};
use thiserror::Error;

use crate::bus::Bus;

pub use calibrate::{CALIBRATE, CALIBRATE_RESET};
pub use info::{HELP, LIST, VERSION, WARRANTY};
pub use measure::{
    BOARD, FILTER_SIZE_READ, FILTER_SIZE_WRITE, READ, READ_CONNECTOR, READ_MV, SENSOR_TYPE_READ,
    SENSOR_TYPE_WRITE,
};

pub type Handler = fn(&mut Context<'_>, &[String]) -> Result<(), CommandError>;

/// What a handler gets to work with.
pub struct Context<'a> {
    pub bus: &'a mut dyn Bus,
    pub out: &'a mut dyn Write,
    pub table: &'a CommandTable,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Invalid parameters number!")]
    ArgumentCount,
    /// Malformed token, the usage of the command is printed after it.
    #[error("{0}")]
    Argument(String),
    #[error(transparent)]
    Board(#[from] crate::Error),
    #[error("unable to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Result of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    ArgumentCountError,
    ArgumentError,
    Failure,
    InvalidCommand,
}

impl Status {
    #[inline]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Success => ExitCode::SUCCESS,
            _ => ExitCode::FAILURE,
        }
    }
}

pub struct Command {
    pub name: &'static str,
    /// Argument index the name is expected at.
    pub name_pos: usize,
    /// Accepted number of arguments, name included.
    pub args: RangeInclusive<usize>,
    pub handler: Handler,
    pub help: &'static str,
    pub usage: &'static str,
    pub example: &'static str,
}

impl Command {
    fn matches(&self, args: &[String]) -> bool {
        args.get(self.name_pos)
            .map_or(false, |token| token.eq_ignore_ascii_case(self.name))
    }
}

#[derive(Default)]
pub struct CommandTable {
    commands: Vec<Command>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command of the controller, in help order.
    pub fn standard() -> Self {
        let mut table = Self::new();

        table
            .register(HELP)
            .register(WARRANTY)
            .register(LIST)
            .register(VERSION)
            .register(READ)
            .register(READ_MV)
            .register(READ_CONNECTOR)
            .register(BOARD);

        if cfg!(feature = "calibration") {
            table.register(CALIBRATE);
        }

        table
            .register(CALIBRATE_RESET)
            .register(SENSOR_TYPE_READ)
            .register(SENSOR_TYPE_WRITE)
            .register(FILTER_SIZE_READ)
            .register(FILTER_SIZE_WRITE);

        table
    }

    pub fn register(&mut self, command: Command) -> &mut Self {
        self.commands.push(command);
        self
    }

    #[inline]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Case insensitive lookup by name.
    pub fn find(&self, name: &str) -> Option<&Command> {
        self.commands
            .iter()
            .find(|command| command.name.eq_ignore_ascii_case(name))
    }

    /// First command whose name sits at its expected position.
    pub fn lookup(&self, args: &[String]) -> Option<&Command> {
        self.commands.iter().find(|command| command.matches(args))
    }

    /// Run the command named by `args` and report failures to `out`.
    pub fn dispatch(&self, bus: &mut dyn Bus, out: &mut dyn Write, args: &[String]) -> Status {
        let Some(command) = self.lookup(args) else {
            writeln!(out, "Invalid command option").unwrap_or_default();
            self.write_usage(out).unwrap_or_default();
            return Status::InvalidCommand;
        };

        debug!("dispatching {} {:?}", command.name, args);

        let result = match command.args.contains(&args.len()) {
            true => {
                let mut ctx = Context {
                    bus,
                    out: &mut *out,
                    table: self,
                };

                (command.handler)(&mut ctx, args)
            }
            false => Err(CommandError::ArgumentCount),
        };

        match result {
            Ok(()) => Status::Success,
            Err(e @ CommandError::ArgumentCount) => {
                writeln!(out, "{}", e).unwrap_or_default();
                writeln!(out, "{}", command.usage).unwrap_or_default();
                Status::ArgumentCountError
            }
            Err(e @ CommandError::Argument(_)) => {
                writeln!(out, "{}", e).unwrap_or_default();
                writeln!(out, "{}", command.usage).unwrap_or_default();
                Status::ArgumentError
            }
            Err(e) => {
                writeln!(out, "{}", e).unwrap_or_default();
                Status::Failure
            }
        }
    }

    /// Usage lines of every command.
    pub fn write_usage(&self, out: &mut dyn Write) -> std::io::Result<()> {
        for command in &self.commands {
            writeln!(out, "{}", command.usage)?;
        }

        writeln!(out, "Where: <id> = Board level id = 0..7")?;
        writeln!(out, "Type smtc -h <command> for more help")
    }
}

/// Dispatch `args` while holding `lock`. The lock is released before
/// returning, whatever the outcome.
pub fn run<L: BusLock>(
    lock: &L,
    table: &CommandTable,
    bus: &mut dyn Bus,
    out: &mut dyn Write,
    args: &[String],
) -> Result<Status, LockError> {
    let _guard = lock.acquire()?;

    Ok(table.dispatch(bus, out, args))
}

/// Parse argument `index` as `what`.
pub(crate) fn parse_arg<T: FromStr>(
    args: &[String],
    index: usize,
    what: &str,
) -> Result<T, CommandError> {
    let token = args.get(index).ok_or(CommandError::ArgumentCount)?;

    token
        .trim()
        .parse()
        .map_err(|_| CommandError::Argument(format!("Invalid {} \"{}\"", what, token)))
}

/// Stack level of the board a command addresses.
#[inline]
pub(crate) fn board_id(args: &[String]) -> Result<u8, CommandError> {
    parse_arg(args, 0, "board id")
}
