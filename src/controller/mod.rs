//! Clock sequencing for the SDRAM controller.
//!
//! One [`SdramController`] owns every flip-flop of the design. Each call to
//! [`SdramController::advance_half_cycle`] flips the clock and runs exactly one phase:
//! the rising edge samples the host bus, the falling edge advances the refresh counter,
//! the state machine, the address lines and finally the output strobes.

use log::{debug, trace};
use serde::Serialize;

use crate::address::AddressBus;
use crate::command::SdramCommand;
use crate::fsm::{ControlFsm, ControlState, FsmInputs};
use crate::pins::{HostInputs, OutputStrobes, PinSnapshot};
use crate::refresh::RefreshCounter;
use crate::strobes;
use crate::sync::SyncSignals;


/// Which phase a half-cycle ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

#[derive(Debug, Clone)]
pub struct SdramController {
    pub(crate) inputs: HostInputs,
    pub(crate) sync: SyncSignals,
    pub(crate) counter: RefreshCounter,
    pub(crate) fsm: ControlFsm,
    pub(crate) address: AddressBus,
    pub(crate) strobes: OutputStrobes,
    pub(crate) clock: bool,
    pub(crate) initialized: bool,
    pub(crate) half_cycles: u64,
}

/// Diagnostic view of every internal register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InternalState {
    pub refresh: bool,
    pub command: bool,
    pub precharge: bool,
    pub access: bool,
    pub ctrl: u8,
    pub refresh_counter: u16,
    pub write_sync: bool,
    pub read_sync: bool,
    pub device_select: bool,
    pub clock: bool,
    pub initialized: bool,
    pub half_cycles: u64,
}

impl InternalState {
    pub fn control_state(&self) -> ControlState {
        ControlState::from_flags(self.refresh, self.command, self.precharge, self.access)
    }

    pub fn sync(&self) -> SyncSignals {
        SyncSignals {
            write_sync: self.write_sync,
            read_sync: self.read_sync,
            device_select: self.device_select,
        }
    }
}

impl Default for SdramController {
    fn default() -> Self {
        Self::new()
    }
}

impl SdramController {
    /// A controller in its power-on state with an idle host bus.
    pub fn new() -> Self {
        SdramController {
            inputs: HostInputs::default(),
            sync: SyncSignals::default(),
            counter: RefreshCounter::new(),
            fsm: ControlFsm::new(),
            address: AddressBus::new(),
            strobes: strobes::POWER_ON,
            clock: false,
            initialized: false,
            half_cycles: 0,
        }
    }

    /// Return every register to its power-on value. Host inputs stay as the driver left them.
    pub fn reset(&mut self) {
        self.sync = SyncSignals::default();
        self.counter.reset();
        self.fsm.reset();
        self.address.reset();
        self.strobes = strobes::POWER_ON;
        self.clock = false;
        self.initialized = false;
        self.half_cycles = 0;
        debug!("controller reset");
    }

    pub fn set_host_inputs(&mut self, inputs: HostInputs) {
        self.inputs = inputs;
    }

    pub fn host_inputs(&self) -> &HostInputs {
        &self.inputs
    }

    pub fn host_inputs_mut(&mut self) -> &mut HostInputs {
        &mut self.inputs
    }

    /// Flip the clock and run the phase belonging to the new level.
    pub fn advance_half_cycle(&mut self) -> Edge {
        self.clock = !self.clock;
        self.half_cycles += 1;
        if self.clock {
            self.rising_edge();
            Edge::Rising
        } else {
            self.falling_edge();
            Edge::Falling
        }
    }

    /// Advance to and through the next falling edge, returning the pins it produced.
    pub fn step_cycle(&mut self) -> PinSnapshot {
        while self.advance_half_cycle() != Edge::Falling {}
        self.read_pins()
    }

    pub fn run_cycles(&mut self, cycles: u64) -> PinSnapshot {
        for _ in 0..cycles {
            self.step_cycle();
        }
        self.read_pins()
    }

    pub fn run_half_cycles(&mut self, edges: u64) {
        for _ in 0..edges {
            self.advance_half_cycle();
        }
    }

    fn rising_edge(&mut self) {
        self.sync = SyncSignals::sample(&self.inputs);
    }

    fn falling_edge(&mut self) {
        let refresh_seen = strobes::refresh_on_pins(self.strobes);
        // the state machine sees the counter as it was before this edge
        let fsm_inputs = FsmInputs {
            sync: self.sync,
            rc7: self.counter.rc7(),
            rc8: self.counter.rc8(),
        };

        self.counter.clock(refresh_seen);

        let previous = self.fsm.state();
        self.fsm.clock(&fsm_inputs);
        let state = self.fsm.state();

        self.address.clock(state, &self.inputs);
        self.strobes = strobes::outputs(state, &self.sync, &self.counter);

        if state != previous {
            debug!("state {} -> {} (ctrl {})", previous, state, self.fsm.ctrl().value());
        }
        if !self.initialized && state.refresh() {
            self.initialized = true;
            debug!("initialization complete after {} cycles", self.cycles());
        }

        trace!(
            "cycle {:>6} {} {:<11} A={:04X} BA={} CKE={} rc={:03X}",
            self.cycles(),
            state,
            self.command().name(),
            self.address.lines(),
            self.address.bank(),
            self.strobes.contains(OutputStrobes::CKE) as u8,
            self.counter.value()
        );
    }

    pub fn read_pins(&self) -> PinSnapshot {
        PinSnapshot::new(self.address.lines(), self.address.bank(), self.strobes)
    }

    pub fn read_internal_state(&self) -> InternalState {
        let state = self.fsm.state();
        InternalState {
            refresh: state.refresh(),
            command: state.command(),
            precharge: state.precharge(),
            access: state.access(),
            ctrl: self.fsm.ctrl().value(),
            refresh_counter: self.counter.value(),
            write_sync: self.sync.write_sync,
            read_sync: self.sync.read_sync,
            device_select: self.sync.device_select,
            clock: self.clock,
            initialized: self.initialized,
            half_cycles: self.half_cycles,
        }
    }

    pub fn state(&self) -> ControlState {
        self.fsm.state()
    }

    pub fn command(&self) -> SdramCommand {
        SdramCommand::decode(
            self.strobes.contains(OutputStrobes::RAS),
            self.strobes.contains(OutputStrobes::CAS),
            self.strobes.contains(OutputStrobes::WE),
        )
    }

    /// True once the power-up refresh and mode-set sequence has finished.
    pub fn is_ready(&self) -> bool {
        self.initialized
    }

    /// Completed falling edges since reset.
    pub fn cycles(&self) -> u64 {
        self.half_cycles / 2
    }

    pub fn half_cycles(&self) -> u64 {
        self.half_cycles
    }

    pub fn clock_level(&self) -> bool {
        self.clock
    }
}
