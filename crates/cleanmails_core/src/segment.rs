use crate::{Classification, Level, MergedRow, Row};

/// Which segments an operator may send to phase 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResubmitPolicy {
    /// Good and bad only.
    #[default]
    TwoWay,
    /// Good, risky and bad.
    ThreeWay,
}

impl ResubmitPolicy {
    pub fn allows(self, segment: Classification) -> bool {
        match self {
            ResubmitPolicy::TwoWay => segment != Classification::Risky,
            ResubmitPolicy::ThreeWay => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSelection {
    pub good: bool,
    pub risky: bool,
    pub bad: bool,
}

impl Default for SegmentSelection {
    fn default() -> Self {
        Self {
            good: true,
            risky: false,
            bad: false,
        }
    }
}

impl SegmentSelection {
    /// Flips `segment`. Returns false (and leaves the selection alone) when the
    /// policy does not allow that segment.
    pub fn toggle(&mut self, segment: Classification, policy: ResubmitPolicy) -> bool {
        if !policy.allows(segment) {
            return false;
        }
        let flag = match segment {
            Classification::Good => &mut self.good,
            Classification::Risky => &mut self.risky,
            Classification::Bad => &mut self.bad,
        };
        *flag = !*flag;
        true
    }

    pub fn includes(&self, segment: Classification) -> bool {
        match segment {
            Classification::Good => self.good,
            Classification::Risky => self.risky,
            Classification::Bad => self.bad,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.good || self.risky || self.bad)
    }
}

/// Rows whose segment is selected. Rows without a verdict are never selected.
pub fn select_rows(rows: &[MergedRow], level: Level, selection: &SegmentSelection) -> Vec<Row> {
    rows.iter()
        .filter(|merged| {
            merged
                .classification(level)
                .is_some_and(|segment| selection.includes(segment))
        })
        .map(|merged| merged.row.clone())
        .collect()
}
