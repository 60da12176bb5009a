use std::env;
use std::process;

use log::{info, warn};

use superchis_sim::debug_flags;
use superchis_sim::stimulus::{self, SequenceReport};
use superchis_sim::{
    ConfigFlags, ControllerSnapshot, HostInputs, HostStrobes, Result, SdramController, SimError,
};

// MAP_SDRAM | WRITE_ENABLE, the value the bench programs
const DEFAULT_CONFIG: u8 = 0x05;
const DEFAULT_AD: u32 = 0x00_0006;
const DEFAULT_LATCH: u32 = 0xA5C3;

const USAGE: &str = "Usage: superchis-sim [--config BYTE] [--ad HEX] [--latch HEX] [--init-edges N]
                     [--reads N] [--writes N] [--idle N]
                     [--save-state PATH] [--load-state PATH] [--json]";

#[derive(Debug, Default, PartialEq)]
struct Options {
    config: Option<u8>,
    ad: Option<u32>,
    latch: Option<u32>,
    init_edges: Option<u64>,
    reads: usize,
    writes: usize,
    idle: usize,
    save_state: Option<String>,
    load_state: Option<String>,
    json: bool,
    help: bool,
}

fn parse_hex(flag: &str, value: &str) -> Result<u32> {
    let digits = value.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(digits, 16)
        .map_err(|e| SimError::Usage(format!("{} expects a hex value, got '{}': {}", flag, value, e)))
}

fn parse_byte(flag: &str, value: &str) -> Result<u8> {
    let parsed = if value.starts_with("0x") || value.starts_with("0X") {
        u8::from_str_radix(&value[2..], 16)
    } else {
        value.parse::<u8>()
    };
    parsed.map_err(|e| SimError::Usage(format!("{} expects a byte, got '{}': {}", flag, value, e)))
}

fn parse_count<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T> {
    value
        .parse::<T>()
        .map_err(|_| SimError::Usage(format!("{} expects a count, got '{}'", flag, value)))
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut i = 1;

    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => {
                options.help = true;
                i += 1;
                continue;
            }
            "--json" => {
                options.json = true;
                i += 1;
                continue;
            }
            _ => {}
        }

        let value = args
            .get(i + 1)
            .ok_or_else(|| SimError::Usage(format!("{} requires a value", flag)))?;
        match flag {
            "--config" => options.config = Some(parse_byte(flag, value)?),
            "--ad" => options.ad = Some(parse_hex(flag, value)?),
            "--latch" => options.latch = Some(parse_hex(flag, value)?),
            "--init-edges" => options.init_edges = Some(parse_count(flag, value)?),
            "--reads" => options.reads = parse_count(flag, value)?,
            "--writes" => options.writes = parse_count(flag, value)?,
            "--idle" => options.idle = parse_count(flag, value)?,
            "--save-state" => options.save_state = Some(value.clone()),
            "--load-state" => options.load_state = Some(value.clone()),
            other => return Err(SimError::Usage(format!("Unknown option: {}", other))),
        }
        i += 2;
    }

    Ok(options)
}

/// Fresh and initialised, or restored from a snapshot. Explicit bus flags override
/// whatever a snapshot carried.
fn build_controller(options: &Options) -> Result<SdramController> {
    let mut controller = match &options.load_state {
        Some(path) => {
            info!("Loading controller state from {}", path);
            ControllerSnapshot::load_from_file(path)?.restore()?
        }
        None => {
            let inputs = HostInputs::new(
                HostStrobes::all(),
                options.ad.unwrap_or(DEFAULT_AD),
                options.latch.unwrap_or(DEFAULT_LATCH),
                ConfigFlags::from_register(options.config.unwrap_or(DEFAULT_CONFIG))?,
            )?;
            let mut controller = SdramController::new();
            controller.set_host_inputs(inputs);

            let edges = options.init_edges.unwrap_or_else(debug_flags::init_edges);
            info!("Initializing for {} half-cycles", edges);
            let tally = stimulus::initialize(&mut controller, edges);
            report("init", &tally, edges / 2);
            if !controller.is_ready() {
                warn!("Controller not ready after {} half-cycles", edges);
            }
            return Ok(controller);
        }
    };

    let inputs = controller.host_inputs_mut();
    if let Some(config) = options.config {
        inputs.config = ConfigFlags::from_register(config)?;
    }
    if let Some(ad) = options.ad {
        inputs.set_address_data(ad)?;
    }
    if let Some(latch) = options.latch {
        inputs.set_internal_address(latch)?;
    }
    Ok(controller)
}

fn report(name: &str, tally: &superchis_sim::CommandTally, cycles: u64) {
    if debug_flags::quiet() {
        return;
    }
    println!("{:<6} {:>6} cycles  {}", name, cycles, stimulus::summarize(tally));
}

fn run(options: &Options) -> Result<()> {
    let mut controller = build_controller(options)?;
    let mut total = SequenceReport::default();

    let sequences = [
        ("read", stimulus::read_sequence(options.reads), options.reads),
        ("write", stimulus::write_sequence(options.writes), options.writes),
        ("idle", stimulus::idle_sequence(options.idle), options.idle),
    ];
    for (name, steps, times) in sequences.iter() {
        if *times == 0 {
            continue;
        }
        info!("Running {} sequence x{}", name, times);
        let result = stimulus::run_sequence(&mut controller, steps);
        report(name, &result.tally, result.cycles);
        total.merge(&result);
    }

    if total.cycles > 0 {
        report("total", &total.tally, total.cycles);
        if total.auto_precharge > 0 && !debug_flags::quiet() {
            println!("       {} accesses with auto precharge", total.auto_precharge);
        }
    }

    if let Some(path) = &options.save_state {
        controller.snapshot().save_to_file(path)?;
        info!("Saved controller state to {}", path);
    }

    if options.json {
        let dump = serde_json::json!({
            "state": controller.read_internal_state(),
            "pins": controller.read_pins(),
            "command": controller.command().name(),
        });
        println!("{}", serde_json::to_string_pretty(&dump)?);
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };

    if options.help {
        eprintln!("{}", USAGE);
        eprintln!("Environment: TRACE_PINS=1 per-cycle trace, QUIET=1 no tallies, SIM_INIT_EDGES=N");
        return;
    }

    if let Err(e) = run(&options) {
        eprintln!("{}", e);
        process::exit(1);
    }
}
