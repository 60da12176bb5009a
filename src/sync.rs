use crate::pins::{ConfigFlags, HostInputs};

/// GBA bus signals as seen by the falling-edge logic. All three are active-low and
/// only change on a rising edge of the controller clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSignals {
    pub write_sync: bool,
    pub read_sync: bool,
    /// Low while the host addresses the SDRAM window.
    pub device_select: bool,
}

impl Default for SyncSignals {
    fn default() -> Self {
        SyncSignals {
            write_sync: true,
            read_sync: true,
            device_select: true,
        }
    }
}

impl SyncSignals {
    /// Sample the host bus. Writes are masked while the write-enable config bit is clear,
    /// and the device is deselected unless the SDRAM is mapped and the SD interface is off.
    pub fn sample(inputs: &HostInputs) -> Self {
        let config = inputs.config;
        SyncSignals {
            write_sync: inputs.nwr() || !config.contains(ConfigFlags::WRITE_ENABLE),
            read_sync: inputs.nrd(),
            device_select: inputs.ncs()
                || config.contains(ConfigFlags::SD_ENABLE)
                || !config.contains(ConfigFlags::MAP_SDRAM),
        }
    }
}
