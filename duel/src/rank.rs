//! Victory-count rank ladder.

use arena_types::{ArenaParams, RankThreshold};

/// Resolves a cumulative victory count to a rank label.
///
/// The ladder is taken from [`ArenaParams::rank_thresholds`] and held
/// sorted, so lookup is a reverse scan for the highest rung at or below the
/// count. Ranks only ever move up because victory counts only ever move up.
#[derive(Clone, Debug)]
pub struct RankTable {
    rungs: Vec<RankThreshold>,
}

impl RankTable {
    pub fn new(params: &ArenaParams) -> Self {
        let mut rungs = params.rank_thresholds.clone();
        rungs.sort_by_key(|r| r.min_victories);
        Self { rungs }
    }

    /// The rank label for `victories`. Empty string if the ladder has no
    /// rung at zero (misconfiguration; defaults always do).
    pub fn rank_for(&self, victories: u64) -> &str {
        self.rungs
            .iter()
            .rev()
            .find(|r| victories >= r.min_victories)
            .map(|r| r.label.as_str())
            .unwrap_or("")
    }
}
