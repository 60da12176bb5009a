use std::fmt;

/// SDRAM command implied by the RAS/CAS/WE strobe levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SdramCommand {
    Nop,
    /// RAS and CAS low with WE high. The controller uses this pattern for auto-refresh,
    /// and the equations cannot tell it apart from an activate issued during refresh.
    RefreshActivate,
    RowActivate,
    Read,
    Write,
    Precharge,
    BurstTerminate,
    Invalid,
}

impl SdramCommand {
    pub const ALL: [SdramCommand; 8] = [
        SdramCommand::Nop,
        SdramCommand::RefreshActivate,
        SdramCommand::RowActivate,
        SdramCommand::Read,
        SdramCommand::Write,
        SdramCommand::Precharge,
        SdramCommand::BurstTerminate,
        SdramCommand::Invalid,
    ];

    /// Decode from pin levels (`true` = high).
    pub fn decode(ras: bool, cas: bool, we: bool) -> Self {
        match (ras, cas, we) {
            (true, true, true) => SdramCommand::Nop,
            (false, false, true) => SdramCommand::RefreshActivate,
            (false, true, true) => SdramCommand::RowActivate,
            (true, false, true) => SdramCommand::Read,
            (true, false, false) => SdramCommand::Write,
            (false, true, false) => SdramCommand::Precharge,
            (false, false, false) => SdramCommand::BurstTerminate,
            (true, true, false) => SdramCommand::Invalid,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            SdramCommand::Nop => "NOP",
            SdramCommand::RefreshActivate => "REFRESH/ACT",
            SdramCommand::RowActivate => "ROW_ACT",
            SdramCommand::Read => "READ",
            SdramCommand::Write => "WRITE",
            SdramCommand::Precharge => "PRECHARGE",
            SdramCommand::BurstTerminate => "BURST_TERM",
            SdramCommand::Invalid => "UNKNOWN",
        }
    }
}

impl fmt::Display for SdramCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-command counts gathered while driving the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandTally {
    counts: [u64; 8],
}

impl CommandTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, command: SdramCommand) {
        self.counts[command.index()] += 1;
    }

    pub fn count(&self, command: SdramCommand) -> u64 {
        self.counts[command.index()]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn merge(&mut self, other: &CommandTally) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            *mine += theirs;
        }
    }

    /// Commands seen at least once, in decode-table order.
    pub fn iter(&self) -> impl Iterator<Item = (SdramCommand, u64)> + '_ {
        SdramCommand::ALL
            .iter()
            .map(move |&cmd| (cmd, self.count(cmd)))
            .filter(|&(_, n)| n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_table() {
        let table = [
            ((true, true, true), SdramCommand::Nop),
            ((false, false, true), SdramCommand::RefreshActivate),
            ((false, true, true), SdramCommand::RowActivate),
            ((true, false, true), SdramCommand::Read),
            ((true, false, false), SdramCommand::Write),
            ((false, true, false), SdramCommand::Precharge),
            ((false, false, false), SdramCommand::BurstTerminate),
            ((true, true, false), SdramCommand::Invalid),
        ];
        for ((ras, cas, we), expected) in table {
            assert_eq!(SdramCommand::decode(ras, cas, we), expected);
        }
    }

    #[test]
    fn test_every_pattern_has_a_distinct_command() {
        let mut seen = std::collections::HashSet::new();
        for bits in 0..8u8 {
            let cmd = SdramCommand::decode(bits & 4 != 0, bits & 2 != 0, bits & 1 != 0);
            assert!(seen.insert(cmd));
        }
        assert_eq!(seen.len(), SdramCommand::ALL.len());
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, cmd) in SdramCommand::ALL.iter().enumerate() {
            assert_eq!(cmd.index(), i);
        }
    }

    #[test]
    fn test_tally() {
        let mut tally = CommandTally::new();
        tally.record(SdramCommand::Read);
        tally.record(SdramCommand::Read);
        tally.record(SdramCommand::Nop);

        let mut other = CommandTally::new();
        other.record(SdramCommand::Write);
        tally.merge(&other);

        assert_eq!(tally.count(SdramCommand::Read), 2);
        assert_eq!(tally.count(SdramCommand::Write), 1);
        assert_eq!(tally.total(), 4);
        let listed: Vec<_> = tally.iter().map(|(cmd, _)| cmd).collect();
        assert_eq!(
            listed,
            vec![SdramCommand::Nop, SdramCommand::Read, SdramCommand::Write]
        );
    }
}
