use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

/// Failures raised at the boundary of the simulator. The clocked core itself is
/// total over binary inputs and never produces one of these.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("address line A{line} does not exist (lines 0-{max})")]
    AddressLineOutOfRange { line: usize, max: usize },
    #[error("{bus} value 0x{value:X} does not fit in {width} bits")]
    BusValueOutOfRange {
        bus: &'static str,
        value: u32,
        width: u32,
    },
    #[error("{bus} takes at most {width} bits, got {len}")]
    BusTooWide {
        bus: &'static str,
        len: usize,
        width: u32,
    },
    #[error("unknown configuration bits in 0x{0:02X}")]
    InvalidConfig(u8),
    #[error("snapshot version {found} is not supported (current: {current})")]
    UnsupportedSnapshot { found: u32, current: u32 },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding error: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}
