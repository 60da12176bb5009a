use std::sync::OnceLock;

/// Half-cycles the bench spends with the bus idle before the controller is usable.
pub const DEFAULT_INIT_EDGES: u64 = 13068;

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "on" | "ON"))
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

// Per-cycle state/command lines from the stimulus runner
pub fn trace_pins() -> bool {
    static ON: OnceLock<bool> = OnceLock::new();
    *ON.get_or_init(|| env_flag("TRACE_PINS", false))
}

pub fn quiet() -> bool {
    static ON: OnceLock<bool> = OnceLock::new();
    *ON.get_or_init(|| env_flag("QUIET", false))
}

pub fn init_edges() -> u64 {
    static EDGES: OnceLock<u64> = OnceLock::new();
    *EDGES.get_or_init(|| env_u64("SIM_INIT_EDGES", DEFAULT_INIT_EDGES))
}
