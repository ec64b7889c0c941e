use crate::{Classification, Level, MergedRow, Reachable, VerificationResult};

/// Maps a verdict and the level that produced it to a segment.
///
/// `None` in means "no result for this address" and yields `None` out: such
/// rows belong to no named segment. Bad dominates at every level; `Risky`
/// only exists at level 2, where it marks an ambiguous handshake or a
/// catch-all domain.
pub fn classify(result: Option<&VerificationResult>, level: Level) -> Option<Classification> {
    let result = result?;

    if result.reachable == Reachable::No || result.disposable || !result.has_mx_records {
        return Some(Classification::Bad);
    }

    let classification = match level {
        Level::One => Classification::Good,
        Level::Two => {
            if result.reachable == Reachable::Unknown || result.is_catch_all() {
                Classification::Risky
            } else {
                Classification::Good
            }
        }
    };
    Some(classification)
}

impl MergedRow {
    pub fn classification(&self, level: Level) -> Option<Classification> {
        classify(self.result.as_ref(), level)
    }
}
