//! The journey: a record under construction or finalized by the reconstructor.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::collections::BTreeSet;

use crate::ids::{FlatIdMap, LocalIdMap};
use crate::record::Direction;

/// An ordered chain of measurements attributed to a single logical packet traversal.
///
/// `members` holds indices into the normalized record sequence it was built from; a `Journey`
/// never owns the records it describes (see the arena-plus-indices note in the crate docs).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Journey {
    pub journey_id: u64,
    pub direction: Direction,
    /// Captured at the journey's entry; acts as a closed filter for the entire journey.
    pub global_ids: FlatIdMap,
    /// Ordered list of record indices, into the normalized record sequence.
    pub members: Vec<usize>,
    pub reconciled_local_ids: LocalIdMap,
    /// Expected labels of the subsequent measurement; `None` once completed.
    pub next_points: Option<BTreeSet<String>>,
    pub ts_in: f64,
    pub ts_out: Option<f64>,
    pub completed: bool,
    /// Index into the direction's path list, when resolvable.
    pub path_id: Option<usize>,
}

impl Journey {
    pub fn new(journey_id: u64, direction: Direction, global_ids: FlatIdMap, ts_in: f64) -> Self {
        Self {
            journey_id,
            direction,
            global_ids,
            members: Vec::new(),
            reconciled_local_ids: LocalIdMap::new(),
            next_points: Some(BTreeSet::new()),
            ts_in,
            ts_out: None,
            completed: false,
            path_id: None,
        }
    }

    /// End-to-end latency in milliseconds, for a completed journey.
    pub fn latency_ms(&self) -> Option<f64> {
        self.ts_out.map(|ts_out| (ts_out - self.ts_in) * 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_journey_is_not_completed_and_has_no_latency() {
        let j = Journey::new(0, Direction::Downlink, FlatIdMap::new(), 1.0);
        assert!(!j.completed);
        assert_eq!(j.latency_ms(), None);
    }

    #[test]
    fn latency_is_in_milliseconds() {
        let mut j = Journey::new(0, Direction::Downlink, FlatIdMap::new(), 1.000);
        j.ts_out = Some(1.002);
        assert!((j.latency_ms().unwrap() - 2.0).abs() < 1e-9);
    }
}
