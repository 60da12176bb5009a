pub const REFRESH_COUNTER_BITS: u32 = 9;

const COUNTER_MASK: u16 = (1 << REFRESH_COUNTER_BITS) - 1;
// refresh_counter[7] and refresh_counter[8]
const TIMEOUT_BITS: u16 = 0b1_1000_0000;

/// Free-running 9-bit refresh counter, clocked on every falling edge.
///
/// Bits 7 and 8 together flag that a refresh is due. They are cleared asynchronously
/// once the controller has put a refresh command on the pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshCounter {
    value: u16,
}

impl RefreshCounter {
    pub fn new() -> Self {
        RefreshCounter { value: 0 }
    }

    pub(crate) fn from_value(value: u16) -> Self {
        RefreshCounter {
            value: value & COUNTER_MASK,
        }
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }

    pub fn value(&self) -> u16 {
        self.value
    }

    pub fn bit(&self, n: u32) -> bool {
        n < REFRESH_COUNTER_BITS && (self.value >> n) & 1 != 0
    }

    pub fn rc7(&self) -> bool {
        self.bit(7)
    }

    pub fn rc8(&self) -> bool {
        self.bit(8)
    }

    /// Both timeout bits set: the controller owes the SDRAM a refresh.
    pub fn refresh_due(&self) -> bool {
        self.value & TIMEOUT_BITS == TIMEOUT_BITS
    }

    /// Increment by one. `refresh_on_pins` is the refresh-class test on the output pins
    /// as they stood before this edge; when it holds the timeout bits are forced low.
    pub fn clock(&mut self, refresh_on_pins: bool) {
        self.value = (self.value + 1) & COUNTER_MASK;
        if refresh_on_pins {
            self.value &= !TIMEOUT_BITS;
        }
    }
}
