//! Host-bus stimulus: canned GBA access patterns and a runner that tallies the SDRAM
//! commands they produce.

use log::info;

use crate::command::{CommandTally, SdramCommand};
use crate::controller::{Edge, SdramController};
use crate::debug_flags;
use crate::pins::HostStrobes;

/// Hold the three host strobes at fixed levels for `edges` half-cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub label: &'static str,
    pub ncs: bool,
    pub nrd: bool,
    pub nwr: bool,
    pub edges: u32,
}

impl Step {
    pub const fn new(label: &'static str, ncs: bool, nrd: bool, nwr: bool, edges: u32) -> Self {
        Step {
            label,
            ncs,
            nrd,
            nwr,
            edges,
        }
    }

    pub fn strobes(&self) -> HostStrobes {
        HostStrobes::from_levels(self.ncs, self.nrd, self.nwr)
    }
}

const SELECT: Step = Step::new("select", false, true, true, 4);
const DESELECT: Step = Step::new("deselect", true, true, true, 6);
const READ_LOW: Step = Step::new("nRD low", false, false, true, 6);
const READ_HIGH: Step = Step::new("nRD high", false, true, true, 4);
const WRITE_LOW: Step = Step::new("nWR low", false, true, false, 6);
const WRITE_HIGH: Step = Step::new("nWR high", false, true, true, 4);
const IDLE: Step = Step::new("idle", true, true, true, 2);

fn access_sequence(times: usize, low: Step, high: Step) -> Vec<Step> {
    let mut steps = Vec::with_capacity(times * 2 + 2);
    steps.push(SELECT);
    for _ in 0..times {
        steps.push(low);
        steps.push(high);
    }
    steps.push(DESELECT);
    steps
}

/// Chip select, `times` pulses on nRD, then deselect.
pub fn read_sequence(times: usize) -> Vec<Step> {
    access_sequence(times, READ_LOW, READ_HIGH)
}

pub fn write_sequence(times: usize) -> Vec<Step> {
    access_sequence(times, WRITE_LOW, WRITE_HIGH)
}

pub fn idle_sequence(times: usize) -> Vec<Step> {
    vec![IDLE; times]
}

/// Drive the bus deselected for `edges` half-cycles; the power-up sequence needs
/// [`debug_flags::init_edges`] of them. The tally samples the pins after every
/// half-cycle, not only falling edges.
pub fn initialize(controller: &mut SdramController, edges: u64) -> CommandTally {
    let strobes = controller.host_inputs().strobes;
    controller.host_inputs_mut().strobes = HostStrobes::all();

    let mut tally = CommandTally::new();
    for _ in 0..edges {
        controller.advance_half_cycle();
        tally.record(controller.command());
    }

    controller.host_inputs_mut().strobes = strobes;
    tally
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceReport {
    pub tally: CommandTally,
    pub cycles: u64,
    pub auto_precharge: u64,
}

impl SequenceReport {
    pub fn merge(&mut self, other: &SequenceReport) {
        self.tally.merge(&other.tally);
        self.cycles += other.cycles;
        self.auto_precharge += other.auto_precharge;
    }
}

/// Apply each step and decode the pins after every falling edge.
pub fn run_sequence(controller: &mut SdramController, steps: &[Step]) -> SequenceReport {
    let trace = debug_flags::trace_pins();
    let mut report = SequenceReport::default();

    for step in steps {
        controller.host_inputs_mut().strobes = step.strobes();
        if trace {
            info!(
                "{} (nCS={} nRD={} nWR={}) for {} edges",
                step.label, step.ncs as u8, step.nrd as u8, step.nwr as u8, step.edges
            );
        }

        for _ in 0..step.edges {
            if controller.advance_half_cycle() == Edge::Rising {
                continue;
            }
            report.cycles += 1;

            let pins = controller.read_pins();
            let command = pins.command();
            report.tally.record(command);
            if pins.auto_precharge() {
                report.auto_precharge += 1;
            }

            if trace {
                info!(
                    "  cycle {:>3}: {} -> {}{}",
                    report.cycles,
                    controller.state(),
                    command,
                    if pins.auto_precharge() {
                        " (auto precharge)"
                    } else {
                        ""
                    }
                );
            }
        }
    }

    report
}

/// One-line `NAME=count` rendering of a tally.
pub fn summarize(tally: &CommandTally) -> String {
    tally
        .iter()
        .map(|(command, n)| format!("{}={}", command, n))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn issued(tally: &CommandTally, command: SdramCommand) -> bool {
    tally.count(command) > 0
}
