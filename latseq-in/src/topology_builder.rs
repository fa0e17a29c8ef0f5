//! Builds the per-direction topology graph from a normalized record sequence: nodes, successor
//! edges (including abstract dotted-prefix successors), source/sink sets, and enumerated paths.
use std::collections::BTreeSet;

use latseq_core::config::ReconstructionConfig;
use latseq_core::record::MeasurementRecord;
use latseq_core::topology::{PerDirection, Topology};
use latseq_core::LatseqError;

/// Build the topology from `records`, using `config`'s source/sink sets when non-empty and
/// inferring them from the observed graph otherwise.
///
/// Fails with [`LatseqError::TopologyError`] if either direction enumerates zero source-to-sink
/// paths.
///
/// ```
/// use latseq_core::config::ReconstructionConfig;
/// use latseq_in::normalizer::normalize;
/// use latseq_in::topology_builder::build_topology;
///
/// let log = normalize(
///     "1.000 D ip--rlc.tx.am len100::\n\
///      1.001 D rlc.tx.am--phy.out.proc len100::\n\
///      1.002 U phy.in.proc--ip len100::\n",
/// ).unwrap();
/// let topology = build_topology(&log.records, &ReconstructionConfig::default()).unwrap();
/// // `rlc.tx.am` is itself a downlink source by default, alongside `ip`, so both the
/// // `ip`-rooted path and the shorter `rlc.tx.am`-rooted path enumerate.
/// assert_eq!(topology.paths.downlink.len(), 2);
/// ```
pub fn build_topology(
    records: &[MeasurementRecord],
    config: &ReconstructionConfig,
) -> Result<Topology, LatseqError> {
    let mut topology = Topology::new();
    let mut src_seen: PerDirection<BTreeSet<String>> = PerDirection::default();
    let mut dst_seen: PerDirection<BTreeSet<String>> = PerDirection::default();

    for record in records {
        topology
            .graph
            .entry(record.src_point.clone())
            .or_default()
            .observe_successor(&record.dst_point, record.direction);
        topology
            .graph
            .entry(record.src_point.clone())
            .or_default()
            .occurrence_count += 1;
        topology.graph.entry(record.dst_point.clone()).or_default();

        src_seen.get_mut(record.direction).insert(record.src_point.clone());
        dst_seen.get_mut(record.direction).insert(record.dst_point.clone());
    }

    topology.sources.downlink = resolve_set(
        &config.sources_downlink,
        &src_seen.downlink,
        &dst_seen.downlink,
    );
    topology.sinks.downlink = resolve_set(
        &config.sinks_downlink,
        &dst_seen.downlink,
        &src_seen.downlink,
    );
    topology.sources.uplink = resolve_set(&config.sources_uplink, &src_seen.uplink, &dst_seen.uplink);
    topology.sinks.uplink = resolve_set(&config.sinks_uplink, &dst_seen.uplink, &src_seen.uplink);

    topology.paths.downlink = enumerate_paths(
        &topology,
        &topology.sources.downlink,
        &topology.sinks.downlink,
    );
    topology.paths.uplink = enumerate_paths(&topology, &topology.sources.uplink, &topology.sinks.uplink);

    if topology.paths.downlink.is_empty() {
        return Err(LatseqError::TopologyError {
            direction: "downlink".to_string(),
        });
    }
    if topology.paths.uplink.is_empty() {
        return Err(LatseqError::TopologyError {
            direction: "uplink".to_string(),
        });
    }

    log::info!(
        "topology built: {} nodes, {} downlink paths, {} uplink paths",
        topology.graph.len(),
        topology.paths.downlink.len(),
        topology.paths.uplink.len()
    );

    Ok(topology)
}

/// Use the configured set if non-empty; otherwise infer it as "seen on `own_side` but never on
/// `other_side`" (a node is a source of a direction iff observed as `src_point` there and never
/// as `dst_point` there; symmetrically for sinks).
fn resolve_set(
    configured: &BTreeSet<String>,
    own_side: &BTreeSet<String>,
    other_side: &BTreeSet<String>,
) -> BTreeSet<String> {
    if !configured.is_empty() {
        return configured.clone();
    }
    own_side.difference(other_side).cloned().collect()
}

/// Depth-first enumeration of every simple path (no repeated node) from any of `sources` to any
/// of `sinks`.
fn enumerate_paths(
    topology: &Topology,
    sources: &BTreeSet<String>,
    sinks: &BTreeSet<String>,
) -> Vec<Vec<String>> {
    let mut paths = Vec::new();
    for source in sources {
        let mut visited = BTreeSet::new();
        let mut path = vec![source.clone()];
        visited.insert(source.clone());
        walk(topology, source, sinks, &mut visited, &mut path, &mut paths);
    }
    paths
}

fn walk(
    topology: &Topology,
    node: &str,
    sinks: &BTreeSet<String>,
    visited: &mut BTreeSet<String>,
    path: &mut Vec<String>,
    paths: &mut Vec<Vec<String>>,
) {
    if sinks.contains(node) {
        paths.push(path.clone());
        return;
    }
    let successors = topology.successors_of(node);
    for next in successors {
        if visited.contains(&next) {
            continue;
        }
        visited.insert(next.clone());
        path.push(next.clone());
        walk(topology, &next, sinks, visited, path, paths);
        path.pop();
        visited.remove(&next);
    }
}
