use crate::fsm::ControlState;
use crate::pins::OutputStrobes;
use crate::refresh::RefreshCounter;
use crate::sync::SyncSignals;

/// Strobe levels right after reset: everything high.
pub const POWER_ON: OutputStrobes = OutputStrobes::all();

/// Combinational output stage. Evaluated after the falling-edge state update, so it sees
/// the new state vector and the new refresh counter.
pub fn outputs(state: ControlState, sync: &SyncSignals, counter: &RefreshCounter) -> OutputStrobes {
    let refresh = state.refresh();
    let cmd = state.command();
    let pre = state.precharge();
    let acc = state.access();
    let nds = sync.device_select;
    let wrs = sync.write_sync;
    let rds = sync.read_sync;
    let rc7 = counter.rc7();
    let rc8 = counter.rc8();

    let ras = (cmd && !pre && acc)
        || (refresh && !pre && acc)
        || (!refresh && !cmd && pre)
        || (pre && !acc);

    let cas = (refresh && cmd && acc && nds && !rc8)
        || (refresh && cmd && acc && nds && !rc7)
        || (!cmd && !acc)
        || (!refresh && !cmd && wrs && rds)
        || (pre && !acc)
        || (!pre && acc);

    let we = (refresh || cmd || !pre || !acc || wrs) && (!refresh || pre || acc);

    let cke = (!refresh || !cmd || !pre || !nds || rc8) && (!refresh || !cmd || !pre || !nds || rc7);

    let mut strobes = OutputStrobes::empty();
    strobes.set(OutputStrobes::RAS, ras);
    strobes.set(OutputStrobes::CAS, cas);
    strobes.set(OutputStrobes::WE, we);
    strobes.set(OutputStrobes::CKE, cke);
    strobes
}

/// Refresh-class pattern on the pins: clock enabled, RAS and CAS low, WE high.
pub fn refresh_on_pins(strobes: OutputStrobes) -> bool {
    strobes.contains(OutputStrobes::CKE | OutputStrobes::WE)
        && !strobes.intersects(OutputStrobes::RAS | OutputStrobes::CAS)
}
