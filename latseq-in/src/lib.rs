//! Ingest pipeline: turns a raw LATSEQ trace into completed journeys.
//!
//! Three stages, each its own module: [`normalizer`] parses and sorts the raw text into
//! [`latseq_core::MeasurementRecord`]s; [`topology_builder`] derives the per-direction graph and
//! source/sink sets those records imply; [`reconstructor`] stitches the records into journeys.
//! [`ReconstructedLatseqLog::from_text`] runs all three in sequence, the way `SegyFile::open`
//! runs the teacher crate's header/trace parsing stages.
pub mod normalizer;
pub mod reconstructor;
pub mod topology_builder;

use latseq_core::config::ReconstructionConfig;
use latseq_core::record::MeasurementRecord;
use latseq_core::{Journey, LatseqError, Topology};

use reconstructor::ReconstructedLog;

/// The result of running the full ingest pipeline over one trace: the normalized records, the
/// topology derived from them, and the reconstructed journeys.
#[derive(Debug)]
pub struct ReconstructedLatseqLog {
    pub records: Vec<MeasurementRecord>,
    pub topology: Topology,
    pub journeys: Vec<Journey>,
    pub orphan_count: u64,
    pub parse_warnings: u64,
}

impl ReconstructedLatseqLog {
    /// Run normalize -> build_topology -> reconstruct over `text`.
    ///
    /// ```
    /// use latseq_core::config::ReconstructionConfig;
    /// use latseq_in::ReconstructedLatseqLog;
    ///
    /// let log = ReconstructedLatseqLog::from_text(
    ///     "1.000 D ip--rlc.tx.am len100:rnti1.drb2:\n\
    ///      1.001 D rlc.tx.am--pdcp len100:rnti1.drb2:\n\
    ///      1.002 D pdcp--phy.out.proc len100:rnti1.drb2:\n\
    ///      9.000 U phy.in.proc--ip len100:rnti9:\n",
    ///     &ReconstructionConfig::default(),
    /// ).unwrap();
    /// assert_eq!(log.journeys.iter().filter(|j| j.completed).count(), 2);
    /// ```
    pub fn from_text(text: &str, config: &ReconstructionConfig) -> Result<Self, LatseqError> {
        let normalized = normalizer::normalize(text)?;
        let topology = topology_builder::build_topology(&normalized.records, config)?;
        let ReconstructedLog {
            journeys,
            orphan_count,
        } = reconstructor::reconstruct(&normalized.records, &topology, config);

        log::info!(
            "ingest complete: {} records, {} journeys ({} completed), {} orphans, {} parse warnings",
            normalized.records.len(),
            journeys.len(),
            journeys.iter().filter(|j| j.completed).count(),
            orphan_count,
            normalized.warnings
        );

        Ok(ReconstructedLatseqLog {
            records: normalized.records,
            topology,
            journeys,
            orphan_count,
            parse_warnings: normalized.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_runs_the_full_pipeline() {
        let config = ReconstructionConfig {
            sources_downlink: ["ip"].iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        let log = ReconstructedLatseqLog::from_text(
            "1.000 D ip--rlc.tx.am len100:rnti1.drb2:\n\
             1.001 D rlc.tx.am--pdcp len100:rnti1.drb2:\n\
             1.002 D pdcp--phy.out.proc len100:rnti1.drb2:\n\
             9.000 U phy.in.proc--ip len100:rnti9:\n",
            &config,
        )
        .unwrap();
        assert_eq!(log.records.len(), 4);
        assert_eq!(log.journeys.iter().filter(|j| j.completed).count(), 2);
        assert_eq!(log.orphan_count, 0);
        assert_eq!(log.parse_warnings, 0);
    }

    #[test]
    fn from_text_propagates_parse_errors() {
        let err = ReconstructedLatseqLog::from_text("# nothing but a comment\n", &ReconstructionConfig::default())
            .unwrap_err();
        assert!(matches!(err, LatseqError::ParseError { .. }));
    }
}
