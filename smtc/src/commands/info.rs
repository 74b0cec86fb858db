use std::io::Write;

use crate::list_boards;

use super::{Command, CommandError, Context};

pub const HELP: Command = Command {
    name: "-h",
    name_pos: 0,
    args: 1..=2,
    handler: help,
    help: "\t-h          Display the list of command options or one command option details",
    usage: "\tUsage:      smtc -h    Display command options list\n\tUsage:      smtc -h <param>   Display help for <param> command option",
    example: "\tExample:    smtc -h read    Display help for \"read\" command option",
};

pub const VERSION: Command = Command {
    name: "-v",
    name_pos: 0,
    args: 1..=1,
    handler: version,
    help: "\t-v          Display the version number",
    usage: "\tUsage:      smtc -v",
    example: "\tExample:    smtc -v  Display the version number",
};

pub const WARRANTY: Command = Command {
    name: "-warranty",
    name_pos: 0,
    args: 1..=1,
    handler: warranty,
    help: "\t-warranty   Display the warranty",
    usage: "\tUsage:      smtc -warranty",
    example: "\tExample:    smtc -warranty  Display the warranty text",
};

pub const LIST: Command = Command {
    name: "-list",
    name_pos: 0,
    args: 1..=1,
    handler: list,
    help: "\t-list:      List all thermocouple cards connected, return the number of boards and the stack level of every board",
    usage: "\tUsage:      smtc -list",
    example: "\tExample:    smtc -list display all the connected thermocouple cards",
};

static WARRANTY_TEXT: &str = "\
This program is free software; you can redistribute it and/or modify it
under the terms of the GNU Lesser General Public License as published by
the Free Software Foundation, either version 3 of the License, or (at your
option) any later version.

This program is distributed in the hope that it will be useful, but
WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Lesser General Public
License for more details.

You should have received a copy of the GNU Lesser General Public License
along with this program. If not, see <http://www.gnu.org/licenses/>.";

fn help(ctx: &mut Context<'_>, args: &[String]) -> Result<(), CommandError> {
    let Some(name) = args.get(1) else {
        for command in ctx.table.commands() {
            writeln!(ctx.out, "{}", command.help)?;
        }
        return Ok(());
    };

    match ctx.table.find(name) {
        Some(command) => {
            writeln!(ctx.out, "{}", command.help)?;
            writeln!(ctx.out, "{}", command.usage)?;
            writeln!(ctx.out, "{}", command.example)?;
        }
        None => {
            writeln!(ctx.out, "Option \"{}\" not found", name)?;
            if let Some(first) = ctx.table.commands().first() {
                writeln!(ctx.out, "{}", first.help)?;
            }
        }
    }

    Ok(())
}

fn version(ctx: &mut Context<'_>, _: &[String]) -> Result<(), CommandError> {
    writeln!(ctx.out, "smtc v{}", env!("CARGO_PKG_VERSION"))?;
    writeln!(ctx.out)?;
    writeln!(ctx.out, "This is free software with ABSOLUTELY NO WARRANTY.")?;
    writeln!(ctx.out, "For details type: smtc -warranty")?;

    Ok(())
}

fn warranty(ctx: &mut Context<'_>, _: &[String]) -> Result<(), CommandError> {
    writeln!(ctx.out, "{}", WARRANTY_TEXT)?;

    Ok(())
}

fn list(ctx: &mut Context<'_>, _: &[String]) -> Result<(), CommandError> {
    let boards = list_boards(&mut *ctx.bus);

    writeln!(ctx.out, "{} board(s) detected", boards.len())?;

    if !boards.is_empty() {
        let ids: Vec<String> = boards.iter().map(|stack| stack.to_string()).collect();
        writeln!(ctx.out, "Id: {}", ids.join(" "))?;
    }

    Ok(())
}
