use std::io::Write;

use crate::{calibration::CalibrationRecord, Board};

use super::{board_id, parse_arg, Command, CommandError, Context};

/// Only part of the live table with the `calibration` feature.
pub const CALIBRATE: Command = Command {
    name: "cal",
    name_pos: 1,
    args: 4..=4,
    handler: calibrate,
    help: "\tcal:        Calibrate the resistance measurement, perform 2 points calibration for completion",
    usage: "\tUsage:      smtc <id> cal <channel> <value in ohms>",
    example: "\tExample:    smtc 0 cal 2 100.34; Send one point of calibration at 100.34 ohms for channel #2 on Board #0",
};

pub const CALIBRATE_RESET: Command = Command {
    name: "calrst",
    name_pos: 1,
    args: 3..=3,
    handler: calibrate_reset,
    help: "\tcalrst:     Reset calibration data for one channel",
    usage: "\tUsage:      smtc <id> calrst <channel>",
    example: "\tExample:    smtc 0 calrst 2; Restore the factory calibration of channel #2 on Board #0",
};

fn calibrate(ctx: &mut Context<'_>, args: &[String]) -> Result<(), CommandError> {
    let level = board_id(args)?;
    let channel = parse_arg(args, 2, "channel")?;
    let resistance = parse_arg(args, 3, "resistance")?;

    let record = CalibrationRecord::point(channel, resistance)?;

    Board::open(&mut *ctx.bus, level)?.write_calibration(&record)?;

    writeln!(ctx.out, "OK")?;

    Ok(())
}

fn calibrate_reset(ctx: &mut Context<'_>, args: &[String]) -> Result<(), CommandError> {
    let level = board_id(args)?;
    let channel = parse_arg(args, 2, "channel")?;

    let record = CalibrationRecord::reset(channel)?;

    Board::open(&mut *ctx.bus, level)?.write_calibration(&record)?;

    writeln!(ctx.out, "OK")?;

    Ok(())
}
