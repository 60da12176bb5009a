use bitflags::bitflags;

use crate::sync::SyncSignals;


bitflags! {
    /// The controller's four state flip-flops.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ControlState: u8 {
        const REFRESH = 0b0001;
        const COMMAND = 0b0010;
        const PRECHARGE = 0b0100;
        const ACCESS = 0b1000;
    }
}

impl ControlState {
    /// Idle state of an initialised controller while the host is not selecting it.
    pub const READY_IDLE: ControlState = ControlState::REFRESH
        .union(ControlState::COMMAND)
        .union(ControlState::PRECHARGE);

    pub fn refresh(self) -> bool {
        self.contains(ControlState::REFRESH)
    }

    pub fn command(self) -> bool {
        self.contains(ControlState::COMMAND)
    }

    pub fn precharge(self) -> bool {
        self.contains(ControlState::PRECHARGE)
    }

    pub fn access(self) -> bool {
        self.contains(ControlState::ACCESS)
    }

    pub fn from_flags(refresh: bool, command: bool, precharge: bool, access: bool) -> Self {
        let mut state = ControlState::empty();
        state.set(ControlState::REFRESH, refresh);
        state.set(ControlState::COMMAND, command);
        state.set(ControlState::PRECHARGE, precharge);
        state.set(ControlState::ACCESS, access);
        state
    }
}

impl Default for ControlState {
    fn default() -> Self {
        ControlState::empty()
    }
}

impl std::fmt::Display for ControlState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "REF{}CMD{}PRE{}ACC{}",
            self.refresh() as u8,
            self.command() as u8,
            self.precharge() as u8,
            self.access() as u8
        )
    }
}

/// CTRL: four toggle flip-flops wired as a ripple counter. Bit k toggles only
/// when the count pulse is present and every lower bit is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CtrlCounter {
    bits: [bool; 4],
}

impl CtrlCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_value(value: u8) -> Self {
        let mut counter = CtrlCounter::new();
        for (k, bit) in counter.bits.iter_mut().enumerate() {
            *bit = (value >> k) & 1 != 0;
        }
        counter
    }

    pub fn bit(&self, k: usize) -> bool {
        self.bits.get(k).copied().unwrap_or(false)
    }

    pub fn value(&self) -> u8 {
        self.bits
            .iter()
            .enumerate()
            .fold(0, |acc, (k, &bit)| acc | ((bit as u8) << k))
    }

    pub fn is_zero(&self) -> bool {
        self.bits.iter().all(|&bit| !bit)
    }

    /// Next counter value for one clock. All toggle enables come from `self`, so the
    /// carry never sees a bit that already flipped this edge.
    pub fn next(&self, pulse: bool) -> CtrlCounter {
        let [c0, c1, c2, c3] = self.bits;
        CtrlCounter {
            bits: [
                c0 ^ pulse,
                c1 ^ (pulse && c0),
                c2 ^ (pulse && c1 && c0),
                c3 ^ (pulse && c2 && c1 && c0),
            ],
        }
    }

    pub fn clock(&mut self, pulse: bool) {
        *self = self.next(pulse);
    }
}

/// Everything the falling-edge transition reads besides the FSM's own flip-flops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsmInputs {
    pub sync: SyncSignals,
    pub rc7: bool,
    pub rc8: bool,
}

/// State vector plus CTRL, advanced once per falling edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlFsm {
    state: ControlState,
    ctrl: CtrlCounter,
}

impl ControlFsm {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(state: ControlState, ctrl: CtrlCounter) -> Self {
        ControlFsm { state, ctrl }
    }

    pub fn reset(&mut self) {
        *self = ControlFsm::new();
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn ctrl(&self) -> CtrlCounter {
        self.ctrl
    }

    /// Count enable for CTRL: the cycle right after a refresh command.
    pub fn pulse(state: ControlState) -> bool {
        !state.refresh() && state.command() && !state.precharge() && !state.access()
    }

    /// Evaluate the four next-state equations on one snapshot.
    pub fn next_state(state: ControlState, ctrl: CtrlCounter, inputs: &FsmInputs) -> ControlState {
        let refresh = state.refresh();
        let cmd = state.command();
        let pre = state.precharge();
        let acc = state.access();
        let nds = inputs.sync.device_select;
        let wrs = inputs.sync.write_sync;
        let rds = inputs.sync.read_sync;
        let rc7 = inputs.rc7;
        let rc8 = inputs.rc8;
        let ctrl_clear = ctrl.is_zero();

        let next_refresh = (cmd && !pre && acc && !rc8)
            || (cmd && !pre && acc && !rc7)
            || (ctrl_clear && !refresh && cmd && pre && rc8 && rc7)
            || (pre && acc && nds)
            || (!refresh && cmd && pre && acc)
            || (refresh && !pre)
            || (refresh && !cmd)
            || (refresh && nds);

        let cmd_terms = (!refresh && !acc && rc8 && rc7)
            || (refresh && !cmd && !pre && acc && wrs && rds)
            || (!refresh && !cmd && pre && acc && !nds && !rds)
            || (!refresh && !cmd && pre && acc && !wrs && !nds)
            || (!refresh && cmd && !acc)
            || (!refresh && cmd && !pre && rc8 && rc7)
            || (cmd && !pre && !acc)
            || (cmd && !acc && !nds)
            || (cmd && !acc && rc8 && rc7);
        let next_cmd = cmd_terms ^ (refresh && pre);

        let next_pre = (!cmd && !pre && wrs && rds)
            || (!refresh && !pre && rc8 && rc7)
            || (refresh && pre && !acc && nds)
            || (!refresh && !cmd && acc && wrs && !nds && rds)
            || (refresh && cmd && acc)
            || (!refresh && !cmd && !pre)
            || (refresh && !cmd && !acc)
            || (!refresh && !acc && !rc8)
            || (!refresh && !acc && !rc7);

        // product of sums
        let next_acc = (!refresh || cmd || pre || !wrs || !rds)
            && (!pre || acc || !nds || rc8)
            && (!pre || acc || !nds || rc7)
            && (refresh || cmd || !pre || !nds)
            && (!refresh || !cmd || !acc)
            && (refresh || acc)
            && (cmd || acc);

        ControlState::from_flags(next_refresh, next_cmd, next_pre, next_acc)
    }

    /// Advance one falling edge. State and counter are computed from the same
    /// pre-transition snapshot and written together.
    pub fn clock(&mut self, inputs: &FsmInputs) {
        let snapshot = *self;
        let next_state = Self::next_state(snapshot.state, snapshot.ctrl, inputs);
        let next_ctrl = snapshot.ctrl.next(Self::pulse(snapshot.state));

        self.state = next_state;
        self.ctrl = next_ctrl;
    }
}
