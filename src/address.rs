//! SDRAM address and bank outputs.
//!
//! Lines other than A10 are registered multiplexer outputs: the column address comes
//! straight from the internal latch, the row address from latch bits 9 and up. A10 is a
//! toggle flip-flop of its own so it can carry the auto-precharge flag.

use crate::error::{Result, SimError};
use crate::fsm::ControlState;
use crate::pins::{HostInputs, ADDRESS_LINES, BANK_LINES};

pub const A10: usize = 10;
const ROW_OFFSET: u32 = 9;
const ADDRESS_MASK: u16 = (1 << ADDRESS_LINES) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddressBus {
    lines: u16,
    bank: u8,
}

impl AddressBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(lines: u16, bank: u8) -> Self {
        AddressBus {
            lines: lines & ADDRESS_MASK,
            bank: bank & ((1 << BANK_LINES) - 1),
        }
    }

    pub fn reset(&mut self) {
        *self = AddressBus::new();
    }

    pub fn lines(&self) -> u16 {
        self.lines
    }

    pub fn bank(&self) -> u8 {
        self.bank
    }

    pub fn line(&self, line: usize) -> Result<bool> {
        if line >= ADDRESS_LINES {
            return Err(SimError::AddressLineOutOfRange {
                line,
                max: ADDRESS_LINES - 1,
            });
        }
        Ok(self.get(line))
    }

    pub fn a10(&self) -> bool {
        self.get(A10)
    }

    fn get(&self, line: usize) -> bool {
        (self.lines >> line) & 1 != 0
    }

    fn put(&mut self, line: usize, value: bool) {
        if value {
            self.lines |= 1 << line;
        } else {
            self.lines &= !(1 << line);
        }
    }

    /// Toggle enable of the A10 flip-flop.
    pub fn a10_toggle(state: ControlState, a10: bool, ad19: bool) -> bool {
        let refresh = state.refresh();
        let cmd = state.command();
        let pre = state.precharge();
        let acc = state.access();

        let cond = (!ad19 && !refresh && !cmd && !pre && acc)
            || (refresh && !a10 && !cmd && !pre && !acc)
            || (refresh && a10 && cmd && !pre && !acc);
        let xor_term = !refresh && !a10 && !cmd && acc;
        cond ^ xor_term
    }

    /// Value line `line` (not A10) takes this edge, or `None` to hold.
    fn mux(state: ControlState, line: usize, inputs: &HostInputs) -> Option<bool> {
        let cmd = state.command();
        let pre = state.precharge();
        let acc = state.access();

        if state.refresh() {
            if !pre && !acc {
                None
            } else {
                Some(false)
            }
        } else if !cmd && pre && acc {
            inputs.latch_bit(line as u32)
        } else if !cmd && !pre && acc {
            inputs.latch_bit(ROW_OFFSET + line as u32)
        } else {
            None
        }
    }

    /// Falling-edge update from the freshly written state vector.
    pub fn clock(&mut self, state: ControlState, inputs: &HostInputs) {
        let a10 = self.a10();

        for line in (0..ADDRESS_LINES).filter(|&line| line != A10) {
            if let Some(value) = Self::mux(state, line, inputs) {
                self.put(line, value);
            }
        }

        if Self::a10_toggle(state, a10, inputs.ad_bit(19)) {
            self.put(A10, !a10);
        }

        if !state.refresh() && !state.command() && state.access() {
            self.bank = (inputs.ad_bit(22) as u8) | ((inputs.ad_bit(23) as u8) << 1);
        }
    }
}
