//! The configuration surface consumed by the topology builder and the journey reconstructor.
//!
//! This is a plain, `Default`-implementing struct with no knowledge of environment variables,
//! config files, or argv; wiring one from any of those is a boundary collaborator's job.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::collections::BTreeSet;

/// Maximum number of records to look ahead when seeking the next member of a journey.
pub const DEFAULT_FORWARD_DEPTH: usize = 20;
/// Maximum number of records to look ahead when seeking fork siblings at a progression step.
pub const DEFAULT_FORK_DEPTH: usize = 10;

/// Configuration for the topology builder and journey reconstructor.
///
/// ```
/// use latseq_core::config::ReconstructionConfig;
///
/// let config = ReconstructionConfig::default();
/// assert_eq!(config.forward_depth, 20);
/// assert_eq!(config.fork_depth, 10);
/// assert!(config.sources_downlink.contains("ip"));
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReconstructionConfig {
    pub sources_downlink: BTreeSet<String>,
    pub sinks_downlink: BTreeSet<String>,
    pub sources_uplink: BTreeSet<String>,
    pub sinks_uplink: BTreeSet<String>,
    pub forward_depth: usize,
    pub fork_depth: usize,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            sources_downlink: ["ip", "rlc.tx.am"].iter().map(|s| s.to_string()).collect(),
            sinks_downlink: ["phy.out.proc"].iter().map(|s| s.to_string()).collect(),
            sources_uplink: ["phy.in.proc"].iter().map(|s| s.to_string()).collect(),
            sinks_uplink: ["ip"].iter().map(|s| s.to_string()).collect(),
            forward_depth: DEFAULT_FORWARD_DEPTH,
            fork_depth: DEFAULT_FORK_DEPTH,
        }
    }
}

/// A configuration with every source/sink set left empty, forcing inference from the observed
/// graph (see [`crate::topology`] builder in `latseq-in`).
impl ReconstructionConfig {
    pub fn inferred() -> Self {
        Self {
            sources_downlink: BTreeSet::new(),
            sinks_downlink: BTreeSet::new(),
            sources_uplink: BTreeSet::new(),
            sinks_uplink: BTreeSet::new(),
            forward_depth: DEFAULT_FORWARD_DEPTH,
            fork_depth: DEFAULT_FORK_DEPTH,
        }
    }
}
