//! Cycle-level model of the SuperChis cartridge SDRAM controller.
//!
//! The controller is driven half a clock at a time through [`SdramController`]. Host bus
//! levels go in through [`HostInputs`]; the SDRAM side comes back as a [`PinSnapshot`].

pub mod address;
pub mod command;
pub mod controller;
pub mod debug_flags;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod refresh;
pub mod savestate;
pub mod stimulus;
pub mod strobes;
pub mod sync;

pub use command::{CommandTally, SdramCommand};
pub use controller::{Edge, InternalState, SdramController};
pub use error::{Result, SimError};
pub use fsm::ControlState;
pub use pins::{ConfigFlags, HostInputs, HostStrobes, PinSnapshot};
pub use savestate::ControllerSnapshot;
pub use stimulus::{SequenceReport, Step};
