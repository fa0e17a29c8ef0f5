//! The output shaper: renders a reconstructed log as the flat, timestamp-sorted listing.
use std::collections::BTreeMap;
use std::fmt;

use chrono::{Local, TimeZone};

use latseq_core::ids::{dict_ids_to_str, local_ids_to_str, FlatIdMap};
use latseq_core::journey::Journey;
use latseq_core::record::{Direction, MeasurementRecord};

/// One line of the flat listing: a single measurement's participation in the reconstructed log.
///
/// `id_string` carries a `uidN` token for every completed journey the measurement belongs to
/// (more than one along a fork's shared prefix), each journey's `global_ids`, and the
/// measurement's own (unresolved) `local_ids`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingLine {
    pub timestamp: f64,
    pub direction: Direction,
    pub segment: String,
    pub properties: FlatIdMap,
    pub id_string: String,
}

impl fmt::Display for ListingLine {
    /// `YYYYMMDD_HHMMSS.ffffff <D|U> (len<N>)\t<src>--<dst>\t<id_string>`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.timestamp.floor() as i64;
        let nanos = ((self.timestamp - secs as f64) * 1e9).round().max(0.0) as u32;
        let stamp = Local
            .timestamp_opt(secs, nanos)
            .single()
            .map(|dt| dt.format("%Y%m%d_%H%M%S%.6f").to_string())
            .unwrap_or_else(|| format!("{:.6}", self.timestamp));
        let len = self.properties.get("len").copied().unwrap_or(0);
        write!(
            f,
            "{} {} (len{})\t{}\t{}",
            stamp, self.direction, len, self.segment, self.id_string
        )
    }
}

/// Build the flat listing from `records` and `journeys`: one line per measurement that belongs
/// to at least one completed journey, sorted by timestamp. Orphans and measurements belonging
/// only to incomplete journeys are omitted, matching the upstream tool's own `out_journeys`.
///
/// ```
/// use latseq_core::config::ReconstructionConfig;
/// use latseq_in::normalizer::normalize;
/// use latseq_in::topology_builder::build_topology;
/// use latseq_in::reconstructor::reconstruct;
/// use latseq_out::shaper::build_listing;
///
/// let log = normalize(
///     "1.000 D ip--rlc.tx.am len100:rnti1.drb2:\n\
///      1.001 D rlc.tx.am--pdcp len100:rnti1.drb2:\n\
///      1.002 D pdcp--phy.out.proc len100:rnti1.drb2:\n\
///      9.000 U phy.in.proc--ip len100:rnti9:\n",
/// ).unwrap();
/// let mut config = ReconstructionConfig::default();
/// config.sources_downlink = ["ip"].iter().map(|s| s.to_string()).collect();
/// let topology = build_topology(&log.records, &config).unwrap();
/// let result = reconstruct(&log.records, &topology, &config);
/// let listing = build_listing(&log.records, &result.journeys);
/// assert_eq!(listing.len(), 4);
/// assert!(listing[0].id_string.starts_with("uid0."));
/// ```
pub fn build_listing(records: &[MeasurementRecord], journeys: &[Journey]) -> Vec<ListingLine> {
    let mut completed: Vec<&Journey> = journeys.iter().filter(|j| j.completed).collect();
    completed.sort_by_key(|j| j.journey_id);

    let mut id_strings: BTreeMap<usize, String> = BTreeMap::new();
    for journey in completed {
        for &member_idx in &journey.members {
            let record = &records[member_idx];
            match id_strings.get_mut(&member_idx) {
                Some(existing) => {
                    *existing = format!("uid{}.{}", journey.journey_id, existing);
                }
                None => {
                    id_strings.insert(
                        member_idx,
                        format!(
                            "uid{}.{}.{}",
                            journey.journey_id,
                            dict_ids_to_str(&journey.global_ids),
                            local_ids_to_str(&record.local_ids)
                        ),
                    );
                }
            }
        }
    }

    let mut lines: Vec<ListingLine> = id_strings
        .into_iter()
        .map(|(idx, id_string)| {
            let record = &records[idx];
            ListingLine {
                timestamp: record.timestamp,
                direction: record.direction,
                segment: record.segment(),
                properties: record.properties.clone(),
                id_string,
            }
        })
        .collect();
    lines.sort_by(|a, b| a.timestamp.partial_cmp(&b.timestamp).unwrap());
    lines
}
