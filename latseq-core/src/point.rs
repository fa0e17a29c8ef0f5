//! A measurement point: a node in the per-direction topology graph.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::collections::{BTreeMap, BTreeSet};

use crate::record::Direction;

/// A node label denoting a measurement location in the protocol stack (e.g. `rlc.tx.am`).
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    /// Labels observed as `dst_point` when this label appeared as `src_point`, plus every
    /// dotted prefix of each such label (abstract successors).
    pub successors: BTreeSet<String>,
    pub directions_seen: BTreeSet<Direction>,
    pub occurrence_count: u64,
    /// Per-journey residency time in milliseconds, filled in once journeys are reconstructed.
    pub residency_samples: BTreeMap<u64, f64>,
}

impl Point {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that this point was seen as `src_point` of an arc leading to `dst`, in `direction`.
    /// Inserts `dst` and all of its dotted prefixes as abstract successors.
    pub fn observe_successor(&mut self, dst: &str, direction: Direction) {
        for prefix in dotted_prefixes(dst) {
            self.successors.insert(prefix);
        }
        self.directions_seen.insert(direction);
    }

    /// Is `candidate` one of this point's successors, exactly or as an abstract prefix match?
    pub fn accepts_successor(&self, candidate: &str) -> bool {
        self.successors.contains(candidate)
    }
}

/// All dotted prefixes of a label, from the first segment up to the whole label.
///
/// ```
/// use latseq_core::point::dotted_prefixes;
///
/// assert_eq!(dotted_prefixes("a.b.c"), vec!["a", "a.b", "a.b.c"]);
/// assert_eq!(dotted_prefixes("ip"), vec!["ip"]);
/// ```
pub fn dotted_prefixes(label: &str) -> Vec<String> {
    let mut prefixes = Vec::new();
    let mut acc = String::new();
    for segment in label.split('.') {
        if !acc.is_empty() {
            acc.push('.');
        }
        acc.push_str(segment);
        prefixes.push(acc.clone());
    }
    prefixes
}
