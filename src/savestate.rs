use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};

use crate::address::AddressBus;
use crate::controller::SdramController;
use crate::error::{Result, SimError};
use crate::fsm::{ControlFsm, ControlState, CtrlCounter};
use crate::pins::{ConfigFlags, HostInputs, HostStrobes, OutputStrobes};
use crate::refresh::RefreshCounter;
use crate::sync::SyncSignals;

/// Every register of a controller plus the host inputs it was being driven with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub version: u32,
    pub state: u8,
    pub ctrl: u8,
    pub refresh_counter: u16,
    pub write_sync: bool,
    pub read_sync: bool,
    pub device_select: bool,
    pub address: u16,
    pub bank: u8,
    pub strobes: u8,
    pub clock: bool,
    pub initialized: bool,
    pub half_cycles: u64,
    pub host: HostSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub strobes: u8,
    pub config: u8,
    pub address_data: u32,
    pub internal_address: u16,
}

impl ControllerSnapshot {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn capture(controller: &SdramController) -> Self {
        let inputs = &controller.inputs;
        ControllerSnapshot {
            version: Self::CURRENT_VERSION,
            state: controller.fsm.state().bits(),
            ctrl: controller.fsm.ctrl().value(),
            refresh_counter: controller.counter.value(),
            write_sync: controller.sync.write_sync,
            read_sync: controller.sync.read_sync,
            device_select: controller.sync.device_select,
            address: controller.address.lines(),
            bank: controller.address.bank(),
            strobes: controller.strobes.bits(),
            clock: controller.clock,
            initialized: controller.initialized,
            half_cycles: controller.half_cycles,
            host: HostSnapshot {
                strobes: inputs.strobes.bits(),
                config: inputs.config.bits(),
                address_data: inputs.address_data(),
                internal_address: inputs.internal_address(),
            },
        }
    }

    /// Rebuild a controller. Host values are re-validated like any other driver input.
    pub fn restore(&self) -> Result<SdramController> {
        if self.version > Self::CURRENT_VERSION {
            return Err(SimError::UnsupportedSnapshot {
                found: self.version,
                current: Self::CURRENT_VERSION,
            });
        }

        let inputs = HostInputs::new(
            HostStrobes::from_bits_truncate(self.host.strobes),
            self.host.address_data,
            self.host.internal_address as u32,
            ConfigFlags::from_register(self.host.config)?,
        )?;

        Ok(SdramController {
            inputs,
            sync: SyncSignals {
                write_sync: self.write_sync,
                read_sync: self.read_sync,
                device_select: self.device_select,
            },
            counter: RefreshCounter::from_value(self.refresh_counter),
            fsm: ControlFsm::from_parts(
                ControlState::from_bits_truncate(self.state),
                CtrlCounter::from_value(self.ctrl),
            ),
            address: AddressBus::from_parts(self.address, self.bank),
            strobes: OutputStrobes::from_bits_truncate(self.strobes),
            clock: self.clock,
            initialized: self.initialized,
            half_cycles: self.half_cycles,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let snapshot: ControllerSnapshot = bincode::deserialize(data)?;
        if snapshot.version > Self::CURRENT_VERSION {
            return Err(SimError::UnsupportedSnapshot {
                found: snapshot.version,
                current: Self::CURRENT_VERSION,
            });
        }
        Ok(snapshot)
    }

    pub fn save_to_file(&self, filename: &str) -> Result<()> {
        let data = self.to_bytes()?;
        let mut file = File::create(filename)?;
        file.write_all(&data)?;
        Ok(())
    }

    pub fn load_from_file(filename: &str) -> Result<Self> {
        let mut file = File::open(filename)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }
}

impl SdramController {
    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot::capture(self)
    }
}
