use bitflags::bitflags;
use serde::Serialize;

use crate::command::SdramCommand;
use crate::error::{Result, SimError};

pub const ADDRESS_LINES: usize = 13;
pub const BANK_LINES: usize = 2;
pub const AD_WIDTH: u32 = 24;
pub const LATCH_WIDTH: u32 = 16;

bitflags! {
    /// Host bus strobes. A set bit means the line is high, i.e. inactive.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HostStrobes: u8 {
        const NWR = 0b001;
        const NRD = 0b010;
        const NCS = 0b100;
    }
}

bitflags! {
    /// Configuration register, encoded the way the cartridge unlock sequence writes it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ConfigFlags: u8 {
        const MAP_SDRAM = 0x01;
        const SD_ENABLE = 0x02;
        const WRITE_ENABLE = 0x04;
    }
}

bitflags! {
    /// SDRAM control outputs. A set bit means the line is high.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OutputStrobes: u8 {
        const RAS = 0b0001;
        const CAS = 0b0010;
        const WE = 0b0100;
        const CKE = 0b1000;
    }
}

impl HostStrobes {
    /// Build from pin levels (`true` = high).
    pub fn from_levels(ncs: bool, nrd: bool, nwr: bool) -> Self {
        let mut strobes = HostStrobes::empty();
        strobes.set(HostStrobes::NCS, ncs);
        strobes.set(HostStrobes::NRD, nrd);
        strobes.set(HostStrobes::NWR, nwr);
        strobes
    }
}

impl ConfigFlags {
    pub fn from_register(raw: u8) -> Result<Self> {
        ConfigFlags::from_bits(raw).ok_or(SimError::InvalidConfig(raw))
    }
}

/// Everything the external driver presents to the controller. The core only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostInputs {
    pub strobes: HostStrobes,
    pub config: ConfigFlags,
    address_data: u32,
    internal_address: u16,
}

impl Default for HostInputs {
    fn default() -> Self {
        HostInputs {
            strobes: HostStrobes::all(),
            config: ConfigFlags::empty(),
            address_data: 0,
            internal_address: 0,
        }
    }
}

impl HostInputs {
    pub fn new(
        strobes: HostStrobes,
        address_data: u32,
        internal_address: u32,
        config: ConfigFlags,
    ) -> Result<Self> {
        let mut inputs = HostInputs {
            strobes,
            config,
            ..HostInputs::default()
        };
        inputs.set_address_data(address_data)?;
        inputs.set_internal_address(internal_address)?;
        Ok(inputs)
    }

    pub fn address_data(&self) -> u32 {
        self.address_data
    }

    pub fn internal_address(&self) -> u16 {
        self.internal_address
    }

    pub fn set_address_data(&mut self, value: u32) -> Result<()> {
        self.address_data = check_width("GP.AD", value, AD_WIDTH)?;
        Ok(())
    }

    pub fn set_internal_address(&mut self, value: u32) -> Result<()> {
        self.internal_address = check_width("internal address", value, LATCH_WIDTH)? as u16;
        Ok(())
    }

    pub fn ad_bit(&self, bit: u32) -> bool {
        bit < AD_WIDTH && (self.address_data >> bit) & 1 != 0
    }

    /// Bits past the 16-bit latch read as `None`; the row mapping leaves those lines alone.
    pub fn latch_bit(&self, bit: u32) -> Option<bool> {
        if bit < LATCH_WIDTH {
            Some((self.internal_address >> bit) & 1 != 0)
        } else {
            None
        }
    }

    pub fn nwr(&self) -> bool {
        self.strobes.contains(HostStrobes::NWR)
    }

    pub fn nrd(&self) -> bool {
        self.strobes.contains(HostStrobes::NRD)
    }

    pub fn ncs(&self) -> bool {
        self.strobes.contains(HostStrobes::NCS)
    }
}

fn check_width(bus: &'static str, value: u32, width: u32) -> Result<u32> {
    if value >> width != 0 {
        return Err(SimError::BusValueOutOfRange { bus, value, width });
    }
    Ok(value)
}

/// Pack an LSB-first bit vector into a bus value. Any non-zero entry counts as 1.
pub fn bits_to_value(bus: &'static str, bits: &[u8], width: u32) -> Result<u32> {
    if bits.len() > width as usize {
        return Err(SimError::BusTooWide {
            bus,
            len: bits.len(),
            width,
        });
    }
    Ok(bits
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b != 0)
        .fold(0, |acc, (i, _)| acc | (1 << i)))
}

/// Externally visible SDRAM pins after the last half-cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PinSnapshot {
    pub address: u16,
    pub bank: u8,
    pub ras: bool,
    pub cas: bool,
    pub we: bool,
    pub cke: bool,
}

impl PinSnapshot {
    pub(crate) fn new(address: u16, bank: u8, strobes: OutputStrobes) -> Self {
        PinSnapshot {
            address,
            bank,
            ras: strobes.contains(OutputStrobes::RAS),
            cas: strobes.contains(OutputStrobes::CAS),
            we: strobes.contains(OutputStrobes::WE),
            cke: strobes.contains(OutputStrobes::CKE),
        }
    }

    pub fn address_line(&self, line: usize) -> Result<bool> {
        if line >= ADDRESS_LINES {
            return Err(SimError::AddressLineOutOfRange {
                line,
                max: ADDRESS_LINES - 1,
            });
        }
        Ok((self.address >> line) & 1 != 0)
    }

    pub fn bank_line(&self, line: usize) -> Result<bool> {
        if line >= BANK_LINES {
            return Err(SimError::AddressLineOutOfRange {
                line,
                max: BANK_LINES - 1,
            });
        }
        Ok((self.bank >> line) & 1 != 0)
    }

    pub fn a10(&self) -> bool {
        self.address & (1 << 10) != 0
    }

    pub fn command(&self) -> SdramCommand {
        SdramCommand::decode(self.ras, self.cas, self.we)
    }

    /// Reads and writes issued with A10 high close the row afterwards.
    pub fn auto_precharge(&self) -> bool {
        matches!(self.command(), SdramCommand::Read | SdramCommand::Write) && self.a10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_inputs_are_inactive() {
        let inputs = HostInputs::default();
        assert!(inputs.nwr());
        assert!(inputs.nrd());
        assert!(inputs.ncs());
        assert_eq!(inputs.address_data(), 0);
        assert_eq!(inputs.internal_address(), 0);
        assert!(inputs.config.is_empty());
    }

    #[test]
    fn test_strobes_from_levels() {
        let strobes = HostStrobes::from_levels(false, false, true);
        assert!(!strobes.contains(HostStrobes::NCS));
        assert!(!strobes.contains(HostStrobes::NRD));
        assert!(strobes.contains(HostStrobes::NWR));
    }

    #[test]
    fn test_address_data_width_is_enforced() {
        let mut inputs = HostInputs::default();
        assert!(inputs.set_address_data(0x00FF_FFFF).is_ok());
        match inputs.set_address_data(0x0100_0000) {
            Err(SimError::BusValueOutOfRange { width, .. }) => assert_eq!(width, 24),
            other => panic!("expected width error, got {:?}", other),
        }
        // Rejected writes leave the bus untouched
        assert_eq!(inputs.address_data(), 0x00FF_FFFF);
    }

    #[test]
    fn test_internal_address_width_is_enforced() {
        assert!(HostInputs::new(HostStrobes::all(), 0, 0x1_0000, ConfigFlags::empty()).is_err());
        let inputs =
            HostInputs::new(HostStrobes::all(), 0, 0xFFFF, ConfigFlags::empty()).unwrap();
        assert_eq!(inputs.latch_bit(15), Some(true));
        assert_eq!(inputs.latch_bit(16), None);
    }

    #[test]
    fn test_config_register_decoding() {
        let config = ConfigFlags::from_register(0x05).unwrap();
        assert!(config.contains(ConfigFlags::MAP_SDRAM));
        assert!(config.contains(ConfigFlags::WRITE_ENABLE));
        assert!(!config.contains(ConfigFlags::SD_ENABLE));
        assert!(matches!(
            ConfigFlags::from_register(0x08),
            Err(SimError::InvalidConfig(0x08))
        ));
    }

    #[test]
    fn test_bits_to_value() {
        assert_eq!(bits_to_value("GP.AD", &[1, 0, 1, 0], AD_WIDTH).unwrap(), 0b0101);
        // Non-binary entries are coerced
        assert_eq!(bits_to_value("GP.AD", &[0, 7], AD_WIDTH).unwrap(), 0b10);
        assert!(matches!(
            bits_to_value("internal address", &[0; 17], LATCH_WIDTH),
            Err(SimError::BusTooWide { len: 17, .. })
        ));
    }

    #[test]
    fn test_snapshot_line_access() {
        let pins = PinSnapshot::new(0x0401, 0b10, OutputStrobes::all());
        assert!(pins.address_line(0).unwrap());
        assert!(pins.address_line(10).unwrap());
        assert!(!pins.address_line(12).unwrap());
        assert!(pins.address_line(13).is_err());
        assert!(!pins.bank_line(0).unwrap());
        assert!(pins.bank_line(1).unwrap());
        assert!(pins.bank_line(2).is_err());
        assert_eq!(pins.command(), SdramCommand::Nop);
    }

    #[test]
    fn test_auto_precharge_needs_a10() {
        let read = OutputStrobes::WE | OutputStrobes::RAS | OutputStrobes::CKE;
        assert!(PinSnapshot::new(0x0400, 0, read).auto_precharge());
        assert!(!PinSnapshot::new(0x0000, 0, read).auto_precharge());
        assert!(!PinSnapshot::new(0x0400, 0, OutputStrobes::all()).auto_precharge());
    }
}
