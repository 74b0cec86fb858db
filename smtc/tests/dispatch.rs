use std::{
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use shared::LocalLock;
use smtc::{
    commands::{self, CommandTable, Status, CALIBRATE},
    registers::*,
    Bus, BusError, MemoryBus, Transaction,
};

fn args(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_owned).collect()
}

fn run_on(table: &CommandTable, bus: &mut MemoryBus, line: &str) -> (Status, String) {
    let lock = LocalLock::new();
    let mut out = Vec::new();

    let status = commands::run(&lock, table, bus, &mut out, &args(line)).unwrap();

    (status, String::from_utf8(out).unwrap())
}

fn run(bus: &mut MemoryBus, line: &str) -> (Status, String) {
    run_on(&CommandTable::standard(), bus, line)
}

/// Bus with a single board at stack level 0.
fn board_bus() -> MemoryBus {
    let mut bus = MemoryBus::new();
    bus.poke(BASE_ADDRESS, ADDR_FW_REV_MAJOR, &[1, 5]);
    bus
}

fn writes(bus: &MemoryBus) -> Vec<(u8, Vec<u8>)> {
    bus.transactions()
        .iter()
        .filter_map(|t| match t {
            Transaction::Write { register, data, .. } => Some((*register, data.clone())),
            _ => None,
        })
        .collect()
}

#[test]
fn read_prints_one_decimal() {
    let mut bus = board_bus();
    bus.poke(BASE_ADDRESS, ADDR_TC_TEMP + 2, &253i16.to_le_bytes());

    assert_eq!(run(&mut bus, "0 read 2"), (Status::Success, String::from("25.3\n")));
}

#[test]
fn negative_temperatures_keep_their_sign() {
    let mut bus = board_bus();
    bus.poke(BASE_ADDRESS, ADDR_TC_TEMP + 14, &(-105i16).to_le_bytes());

    assert_eq!(run(&mut bus, "0 read 8").1, "-10.5\n");
}

#[test]
fn readmv_prints_two_decimals() {
    let mut bus = board_bus();
    bus.poke(BASE_ADDRESS, ADDR_TC_MV, &12345i16.to_le_bytes());

    assert_eq!(run(&mut bus, "0 readmv 1"), (Status::Success, String::from("123.45\n")));
}

#[test]
fn readct_covers_ten_thermistors() {
    let mut bus = board_bus();
    bus.poke(BASE_ADDRESS, ADDR_THERMISTOR_TEMP + 18, &221i16.to_le_bytes());

    assert_eq!(run(&mut bus, "0 readct 10").1, "22.1\n");

    assert_eq!(
        run(&mut bus, "0 readct 11"),
        (Status::Failure, String::from("Invalid thermistor channel number 11 [1..10]!\n"))
    );
}

#[test]
fn board_prints_firmware_and_cpu_temperature() {
    let mut bus = board_bus();
    bus.poke(BASE_ADDRESS, ADDR_CPU_TEMP, &[43]);

    let (status, out) = run(&mut bus, "0 board");

    assert_eq!(status, Status::Success);
    assert_eq!(out, "Thermocouple card firmware version 1.05\nCPU Temp 43C\n");
}

#[test]
fn styperd_prints_letter_and_code() {
    let mut bus = board_bus();
    bus.poke(BASE_ADDRESS, ADDR_TC_TYPE + 2, &[3]);

    assert_eq!(run(&mut bus, "0 styperd 3"), (Status::Success, String::from("K(3)\n")));
}

#[test]
fn styperd_reports_unknown_codes() {
    let mut bus = board_bus();
    bus.poke(BASE_ADDRESS, ADDR_TC_TYPE, &[12]);

    let (status, out) = run(&mut bus, "0 styperd 1");

    assert_eq!(status, Status::Success);
    assert_eq!(out, "Unknown thermocouple type!\nUnknown(12)\n");
}

#[test]
fn stypewr_writes_one_byte() {
    let mut bus = board_bus();

    assert_eq!(run(&mut bus, "0 stypewr 8 7"), (Status::Success, String::from("OK\n")));
    assert_eq!(writes(&bus), [(ADDR_TC_TYPE + 7, vec![7])]);
}

#[test]
fn stypewr_rejects_out_of_range_types() {
    let mut bus = board_bus();

    assert_eq!(
        run(&mut bus, "0 stypewr 1 8"),
        (Status::Failure, String::from("Invalid thermocouple type value 8 [0..7]!\n"))
    );
    assert!(bus.transactions().is_empty());
}

#[test]
fn filter_size_round_trip() {
    let mut bus = board_bus();

    assert_eq!(run(&mut bus, "0 fszwr 10"), (Status::Success, String::from("Done\n")));
    assert_eq!(bus.peek(BASE_ADDRESS, ADDR_FILTER_SIZE, 1), Some(&[10][..]));
    assert_eq!(run(&mut bus, "0 fszrd").1, "10\n");

    bus.clear_transactions();
    assert_eq!(run(&mut bus, "0 fszwr 41").0, Status::Failure);
    assert_eq!(run(&mut bus, "0 fszwr 0").0, Status::Failure);
    assert!(writes(&bus).is_empty());
}

#[test]
fn calrst_sends_the_reset_record() {
    let mut bus = board_bus();

    assert_eq!(run(&mut bus, "0 calrst 2"), (Status::Success, String::from("OK\n")));

    let mut expected = (-1.0f32).to_le_bytes().to_vec();
    expected.push(2);
    assert_eq!(writes(&bus), [(ADDR_CALIB_RES, expected)]);
}

#[test]
fn cal_sends_one_point() {
    let mut table = CommandTable::standard();
    if table.find("cal").is_none() {
        table.register(CALIBRATE);
    }

    let mut bus = board_bus();

    assert_eq!(
        run_on(&table, &mut bus, "0 cal 2 100.34"),
        (Status::Success, String::from("OK\n"))
    );

    let mut expected = 100.34f32.to_le_bytes().to_vec();
    expected.push(2);
    assert_eq!(writes(&bus), [(ADDR_CALIB_RES, expected)]);

    bus.clear_transactions();
    assert_eq!(run_on(&table, &mut bus, "0 cal 2 4000.5").0, Status::Failure);
    assert!(bus.transactions().is_empty());
}

#[test]
fn list_reports_highest_level_first() {
    let mut bus = MemoryBus::new()
        .with_device(BASE_ADDRESS)
        .with_device(BASE_ADDRESS + 2)
        .with_device(BASE_ADDRESS + 5);

    assert_eq!(
        run(&mut bus, "-list"),
        (Status::Success, String::from("3 board(s) detected\nId: 5 2 0\n"))
    );
}

#[test]
fn list_on_an_empty_stack() {
    let mut bus = MemoryBus::new();

    assert_eq!(run(&mut bus, "-list"), (Status::Success, String::from("0 board(s) detected\n")));
}

#[test]
fn missing_board_is_a_failure() {
    let mut bus = board_bus();

    let (status, out) = run(&mut bus, "3 read 1");

    assert_eq!(status, Status::Failure);
    assert_eq!(out, "Thermocouple card id 3 not detected\n");
}

#[test]
fn invalid_stack_and_channel_never_reach_the_bus() {
    let mut bus = board_bus();

    assert_eq!(
        run(&mut bus, "8 read 1"),
        (Status::Failure, String::from("Invalid stack level 8 [0..7]!\n"))
    );

    for line in ["0 read 0", "0 read 9", "0 readmv 9", "0 styperd 0", "0 stypewr 9 1"] {
        let (status, out) = run(&mut bus, line);
        assert_eq!(status, Status::Failure, "{}", line);
        assert!(out.starts_with("Invalid thermocouple channel number"), "{}", line);
    }

    assert!(bus.transactions().is_empty());
}

#[test]
fn malformed_tokens_print_the_usage() {
    let mut bus = board_bus();

    let (status, out) = run(&mut bus, "0 read two");

    assert_eq!(status, Status::ArgumentError);
    assert_eq!(out, "Invalid channel \"two\"\n\tUsage:      smtc <id> read <channel>\n");
}

#[test]
fn wrong_argument_count_prints_the_usage() {
    let mut bus = board_bus();

    let (status, out) = run(&mut bus, "0 read");

    assert_eq!(status, Status::ArgumentCountError);
    assert_eq!(out, "Invalid parameters number!\n\tUsage:      smtc <id> read <channel>\n");
}

#[test]
fn bus_faults_are_reported() {
    let mut bus = board_bus();
    bus.set_faulty(true);

    let (status, out) = run(&mut bus, "0 read 1");

    // The probe itself fails, so the board counts as absent
    assert_eq!(status, Status::Failure);
    assert_eq!(out, "Thermocouple card id 0 not detected\n");
}

#[test]
fn unknown_command_prints_every_usage() {
    let mut bus = MemoryBus::new();

    let (status, out) = run(&mut bus, "0 frobnicate");

    assert_eq!(status, Status::InvalidCommand);
    assert!(out.starts_with("Invalid command option\n"));
    assert!(out.contains("smtc <id> fszwr <value>"));
    assert!(out.ends_with("Type smtc -h <command> for more help\n"));
}

#[test]
fn help_lists_and_details_commands() {
    let table = CommandTable::standard();
    let mut bus = MemoryBus::new();

    let (status, out) = run_on(&table, &mut bus, "-h");
    assert_eq!(status, Status::Success);
    assert_eq!(out.lines().count(), table.commands().len());

    let out = run_on(&table, &mut bus, "-h READ").1;
    assert_eq!(
        out,
        "\tread:       Read thermocouple channel temperature\n\
         \tUsage:      smtc <id> read <channel>\n\
         \tExample:    smtc 0 read 2; Read the temperature on channel #2 on Board #0\n"
    );

    let out = run_on(&table, &mut bus, "-h nope").1;
    assert!(out.starts_with("Option \"nope\" not found\n\t-h "));

    assert!(bus.transactions().is_empty());
}

#[test]
fn version_needs_no_hardware() {
    let mut bus = MemoryBus::new();

    let (status, out) = run(&mut bus, "-v");

    assert_eq!(status, Status::Success);
    assert!(out.starts_with(&format!("smtc v{}\n", env!("CARGO_PKG_VERSION"))));
    assert!(out.contains("ABSOLUTELY NO WARRANTY"));
    assert!(run(&mut bus, "-warranty").1.contains("WITHOUT ANY WARRANTY"));
    assert!(bus.transactions().is_empty());
}

#[test]
fn lock_is_released_after_a_failure() {
    let table = CommandTable::standard();
    let lock = LocalLock::new();
    let mut bus = MemoryBus::new();
    let mut out = Vec::new();

    let status = commands::run(&lock, &table, &mut bus, &mut out, &args("0 read 1")).unwrap();

    assert_eq!(status, Status::Failure);
    assert!(!lock.is_held());
}

/// Bus that answers every read with zeros and records which invocation
/// touched it in a log shared with other buses.
struct RecordingBus {
    id: usize,
    events: Arc<Mutex<Vec<usize>>>,
}

impl RecordingBus {
    fn record(&self) {
        self.events.lock().unwrap().push(self.id);
        thread::sleep(Duration::from_millis(1));
    }
}

impl Bus for RecordingBus {
    fn select(&mut self, _: u8) -> Result<(), BusError> {
        self.record();
        Ok(())
    }

    fn read(&mut self, _: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.record();
        buf.fill(0);
        Ok(())
    }

    fn write(&mut self, _: u8, _: &[u8]) -> Result<(), BusError> {
        self.record();
        Ok(())
    }
}

#[test]
fn concurrent_invocations_do_not_interleave() {
    // select, probe, cpu temperature, firmware version
    const TRANSFERS: usize = 4;
    const RUNS: usize = 5;

    let lock = Arc::new(LocalLock::new());
    let events = Arc::new(Mutex::new(Vec::new()));

    let threads: Vec<_> = (0..2)
        .map(|id| {
            let lock = lock.clone();
            let events = events.clone();

            thread::spawn(move || {
                let table = CommandTable::standard();
                let mut bus = RecordingBus { id, events };

                for _ in 0..RUNS {
                    let mut out = Vec::new();
                    let status =
                        commands::run(&*lock, &table, &mut bus, &mut out, &args("0 board"))
                            .unwrap();
                    assert_eq!(status, Status::Success);
                }
            })
        })
        .collect();

    for thread in threads {
        thread.join().unwrap();
    }

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2 * RUNS * TRANSFERS);

    for invocation in events.chunks(TRANSFERS) {
        assert!(invocation.iter().all(|id| *id == invocation[0]));
    }
}
