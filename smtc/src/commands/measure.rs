use std::io::Write;

use crate::{registers, sensor::SensorCode, Board};

use super::{board_id, parse_arg, Command, CommandError, Context};

pub const READ: Command = Command {
    name: "read",
    name_pos: 1,
    args: 3..=3,
    handler: read,
    help: "\tread:       Read thermocouple channel temperature",
    usage: "\tUsage:      smtc <id> read <channel>",
    example: "\tExample:    smtc 0 read 2; Read the temperature on channel #2 on Board #0",
};

pub const READ_MV: Command = Command {
    name: "readmv",
    name_pos: 1,
    args: 3..=3,
    handler: read_mv,
    help: "\treadmv:     Read thermocouple channel voltage in mV",
    usage: "\tUsage:      smtc <id> readmv <channel>",
    example: "\tExample:    smtc 0 readmv 2; Read the voltage on channel #2 on Board #0",
};

pub const READ_CONNECTOR: Command = Command {
    name: "readct",
    name_pos: 1,
    args: 3..=3,
    handler: read_connector,
    help: "\treadct:     Read connector temperature measured by one of the 10 thermistors on the card",
    usage: "\tUsage:      smtc <id> readct <channel>",
    example: "\tExample:    smtc 0 readct 2; Read the connector temperature on thermistor #2 on Board #0",
};

pub const BOARD: Command = Command {
    name: "board",
    name_pos: 1,
    args: 2..=2,
    handler: board,
    help: "\tboard:      Display board firmware version and CPU temperature",
    usage: "\tUsage:      smtc <id> board",
    example: "\tExample:    smtc 0 board",
};

pub const SENSOR_TYPE_READ: Command = Command {
    name: "styperd",
    name_pos: 1,
    args: 3..=3,
    handler: sensor_type_read,
    help: "\tstyperd:    Display sensor type [0..7]: (B, E, J, K, N, R, S, T) per channel",
    usage: "\tUsage:      smtc <id> styperd <channel>",
    example: "\tExample:    smtc 0 styperd 1; Display the type of sensor for channel 1 on Board #0",
};

pub const SENSOR_TYPE_WRITE: Command = Command {
    name: "stypewr",
    name_pos: 1,
    args: 4..=4,
    handler: sensor_type_write,
    help: "\tstypewr:    Set sensor type [0..7]: (B, E, J, K, N, R, S, T) per channel",
    usage: "\tUsage:      smtc <id> stypewr <channel> <type>",
    example: "\tExample:    smtc 0 stypewr 1 1; Set the sensor of channel 1 on Board #0 to thermocouple E",
};

pub const FILTER_SIZE_READ: Command = Command {
    name: "fszrd",
    name_pos: 1,
    args: 2..=2,
    handler: filter_size_read,
    help: "\tfszrd:      Display the number of samples of the moving average filter",
    usage: "\tUsage:      smtc <id> fszrd",
    example: "\tExample:    smtc 0 fszrd; Display the moving average filter size of Board #0",
};

pub const FILTER_SIZE_WRITE: Command = Command {
    name: "fszwr",
    name_pos: 1,
    args: 3..=3,
    handler: filter_size_write,
    help: "\tfszwr:      Set the number of samples of the moving average filter [1..40]",
    usage: "\tUsage:      smtc <id> fszwr <value>",
    example: "\tExample:    smtc 0 fszwr 10; Average the last 10 samples on Board #0",
};

/// Parse the channel at argument 2 and check it against `quantity` so a bad
/// channel never reaches the bus, not even for the probe.
fn channel(args: &[String], quantity: &registers::Quantity) -> Result<u8, CommandError> {
    let channel = parse_arg(args, 2, "channel")?;

    quantity.channel_address(channel)?;

    Ok(channel)
}

fn read(ctx: &mut Context<'_>, args: &[String]) -> Result<(), CommandError> {
    let level = board_id(args)?;
    let channel = channel(args, &registers::TEMPERATURE)?;

    let temperature = Board::open(&mut *ctx.bus, level)?.read_temperature(channel)?;

    writeln!(ctx.out, "{:.1}", temperature)?;

    Ok(())
}

fn read_mv(ctx: &mut Context<'_>, args: &[String]) -> Result<(), CommandError> {
    let level = board_id(args)?;
    let channel = channel(args, &registers::MILLIVOLTS)?;

    let millivolts = Board::open(&mut *ctx.bus, level)?.read_millivolts(channel)?;

    writeln!(ctx.out, "{:.2}", millivolts)?;

    Ok(())
}

fn read_connector(ctx: &mut Context<'_>, args: &[String]) -> Result<(), CommandError> {
    let level = board_id(args)?;
    let channel = channel(args, &registers::CONNECTOR_TEMPERATURE)?;

    let temperature = Board::open(&mut *ctx.bus, level)?.read_connector_temperature(channel)?;

    writeln!(ctx.out, "{:.1}", temperature)?;

    Ok(())
}

fn board(ctx: &mut Context<'_>, args: &[String]) -> Result<(), CommandError> {
    let mut board = Board::open(&mut *ctx.bus, board_id(args)?)?;

    let cpu_c = board.read_cpu_temperature()?;
    let (major, minor) = board.read_firmware_version()?;

    writeln!(ctx.out, "Thermocouple card firmware version {}.{:02}", major, minor)?;
    writeln!(ctx.out, "CPU Temp {}C", cpu_c)?;

    Ok(())
}

fn sensor_type_read(ctx: &mut Context<'_>, args: &[String]) -> Result<(), CommandError> {
    let level = board_id(args)?;
    let channel = channel(args, &registers::SENSOR_TYPE)?;

    let code = Board::open(&mut *ctx.bus, level)?.read_sensor_type(channel)?;

    if let SensorCode::Unknown(_) = code {
        writeln!(ctx.out, "Unknown thermocouple type!")?;
    }
    writeln!(ctx.out, "{}", code)?;

    Ok(())
}

fn sensor_type_write(ctx: &mut Context<'_>, args: &[String]) -> Result<(), CommandError> {
    let level = board_id(args)?;
    let channel = channel(args, &registers::SENSOR_TYPE)?;
    let code: i64 = parse_arg(args, 3, "thermocouple type")?;

    registers::SENSOR_TYPE.check(code)?;

    Board::open(&mut *ctx.bus, level)?.write_sensor_type(channel, code as u8)?;

    writeln!(ctx.out, "OK")?;

    Ok(())
}

fn filter_size_read(ctx: &mut Context<'_>, args: &[String]) -> Result<(), CommandError> {
    let size = Board::open(&mut *ctx.bus, board_id(args)?)?.read_filter_size()?;

    writeln!(ctx.out, "{}", size)?;

    Ok(())
}

fn filter_size_write(ctx: &mut Context<'_>, args: &[String]) -> Result<(), CommandError> {
    let level = board_id(args)?;
    let size: i64 = parse_arg(args, 2, "filter size")?;

    registers::FILTER_SIZE.check(size)?;

    Board::open(&mut *ctx.bus, level)?.write_filter_size(size as u8)?;

    writeln!(ctx.out, "Done")?;

    Ok(())
}
