use std::env;
use std::process;

use superchis_sim::debug_flags;
use superchis_sim::stimulus;
use superchis_sim::{ConfigFlags, HostInputs, HostStrobes, SdramController};

// Usage: pin_trace [--ready] [--read | --write] [--latch HEX] <cycles>
//   --ready  run the power-up sequence first (SIM_INIT_EDGES half-cycles)
//   --read   hold nCS and nRD low for the whole trace
//   --write  hold nCS and nWR low for the whole trace
fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage: {} [--ready] [--read | --write] [--latch HEX] <cycles>", args[0]);
        return;
    }

    let mut ready = false;
    let mut strobes = HostStrobes::all();
    let mut latch = 0xA5C3;
    let mut cycles: u64 = 400;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--ready" => ready = true,
            "--read" => strobes = HostStrobes::from_levels(false, false, true),
            "--write" => strobes = HostStrobes::from_levels(false, true, false),
            "--latch" => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("--latch requires a value");
                    process::exit(2);
                };
                latch = match u32::from_str_radix(value.trim_start_matches("0x"), 16) {
                    Ok(v) => v,
                    Err(e) => {
                        eprintln!("--latch: {}", e);
                        process::exit(2);
                    }
                };
                i += 1;
            }
            s => match s.parse::<u64>() {
                Ok(n) => cycles = n,
                Err(_) => {
                    eprintln!("Unknown option: {}", s);
                    process::exit(2);
                }
            },
        }
        i += 1;
    }

    let config = ConfigFlags::MAP_SDRAM | ConfigFlags::WRITE_ENABLE;
    let inputs = match HostInputs::new(HostStrobes::all(), 0x00_0006, latch, config) {
        Ok(inputs) => inputs,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };

    let mut controller = SdramController::new();
    controller.set_host_inputs(inputs);
    if ready {
        stimulus::initialize(&mut controller, debug_flags::init_edges());
    }
    controller.host_inputs_mut().strobes = strobes;

    println!("cycle  state             cmd          A     BA RAS CAS WE CKE");
    for _ in 0..cycles {
        let pins = controller.step_cycle();
        println!(
            "{:>6} {} {:<12} {:04X}  {}  {}   {}   {}  {}",
            controller.cycles(),
            controller.state(),
            pins.command().name(),
            pins.address,
            pins.bank,
            pins.ras as u8,
            pins.cas as u8,
            pins.we as u8,
            pins.cke as u8
        );
    }
}
