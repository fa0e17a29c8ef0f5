//! The per-direction topology: a graph over measurement points, its source/sink sets, and the
//! enumerated source-to-sink paths.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::collections::{BTreeMap, BTreeSet};

use crate::point::Point;
use crate::record::Direction;

/// A value held once per direction.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PerDirection<T> {
    pub downlink: T,
    pub uplink: T,
}

impl<T> PerDirection<T> {
    pub fn get(&self, direction: Direction) -> &T {
        match direction {
            Direction::Downlink => &self.downlink,
            Direction::Uplink => &self.uplink,
        }
    }

    pub fn get_mut(&mut self, direction: Direction) -> &mut T {
        match direction {
            Direction::Downlink => &mut self.downlink,
            Direction::Uplink => &mut self.uplink,
        }
    }
}

/// A directed graph of measurement points, the per-direction source/sink sets, and every
/// enumerated simple path from a source to a sink in each direction.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Topology {
    pub graph: BTreeMap<String, Point>,
    pub sources: PerDirection<BTreeSet<String>>,
    pub sinks: PerDirection<BTreeSet<String>>,
    /// All enumerated source-to-sink paths, per direction, as ordered lists of point labels.
    pub paths: PerDirection<Vec<Vec<String>>>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// The successors of `label` in the topology, or an empty set if `label` is unknown.
    pub fn successors_of(&self, label: &str) -> BTreeSet<String> {
        self.graph
            .get(label)
            .map(|p| p.successors.clone())
            .unwrap_or_default()
    }
}
