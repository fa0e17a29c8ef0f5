//! End-to-end tests that run `latseq-in`'s full ingest pipeline and feed the result through this
//! crate's statistics and listing shapers, checking the two crates agree on the same contracts.
use latseq_core::config::ReconstructionConfig;
use latseq_in::reconstructor::compute_residency;
use latseq_in::ReconstructedLatseqLog;

use crate::shaper::build_listing;
use crate::stats::{latency_summary, point_residency_summary};

fn ip_only_config() -> ReconstructionConfig {
    ReconstructionConfig {
        sources_downlink: ["ip"].iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

/// S1 end to end: a single straight downlink packet, statistics and listing agree with the
/// reconstructed journey.
#[test]
fn s1_straight_packet_flows_through_stats_and_listing() {
    let log = ReconstructedLatseqLog::from_text(
        "1.000 D ip--rlc.tx.am len100:rnti1.drb2:\n\
         1.001 D rlc.tx.am--pdcp len100:rnti1.drb2:\n\
         1.002 D pdcp--phy.out.proc len100:rnti1.drb2:\n\
         9.000 U phy.in.proc--ip len100:rnti9:\n",
        &ip_only_config(),
    )
    .unwrap();

    let summary = latency_summary(&log.journeys);
    assert_eq!(summary.downlink.size, 1);
    assert!((summary.downlink.mean - 2.0).abs() < 1e-9);
    assert_eq!(summary.uplink.size, 1);

    let listing = build_listing(&log.records, &log.journeys);
    assert_eq!(listing.len(), 4);
    assert_eq!(listing[0].segment, "ip--rlc.tx.am");
    assert!(listing[0].id_string.starts_with("uid0."));
}

/// S2: a segmentation fork's shared prefix yields two completed journeys, each contributing a
/// latency sample and its own listing lines, with the shared member carrying both uids.
#[test]
fn s2_fork_contributes_two_latency_samples_and_a_shared_listing_line() {
    let log = ReconstructedLatseqLog::from_text(
        "1.000 D ip--rlc.tx.am len100:rnti1:sn5\n\
         1.001 D rlc.tx.am--rlc.seg.um len100:rnti1:sn5.so1\n\
         1.002 D rlc.seg.um--phy.out.proc len100:rnti1:sn5.so1\n\
         1.003 D rlc.tx.am--rlc.seg.um len100:rnti1:sn5.so2\n\
         1.004 D rlc.seg.um--phy.out.proc len100:rnti1:sn5.so2\n\
         9.000 U phy.in.proc--ip len100:rnti9:\n",
        &ip_only_config(),
    )
    .unwrap();

    let summary = latency_summary(&log.journeys);
    assert_eq!(summary.downlink.size, 2);

    let listing = build_listing(&log.records, &log.journeys);
    let shared = listing.iter().find(|l| l.segment == "ip--rlc.tx.am").unwrap();
    // Both journeys' uids must appear on the shared prefix member.
    assert!(shared.id_string.contains("uid0"));
    assert!(shared.id_string.contains("uid1"));
}

/// S5: an orphan record doesn't appear in the listing, and the unrelated journey it interleaves
/// with is unaffected.
#[test]
fn s5_orphan_is_absent_from_listing() {
    let log = ReconstructedLatseqLog::from_text(
        "1.000 D ip--rlc.tx.am len100:rnti1:\n\
         1.001 D rlc.tx.am--pdcp len100:rnti1:\n\
         1.0015 D pdcp--phy.out.proc len100:rnti2:\n\
         1.002 D pdcp--phy.out.proc len100:rnti1:\n\
         9.000 U phy.in.proc--ip len100:rnti9:\n",
        &ip_only_config(),
    )
    .unwrap();
    assert_eq!(log.orphan_count, 1);

    let listing = build_listing(&log.records, &log.journeys);
    // 3 members of the completed downlink journey + 1 one-hop uplink journey = 4 lines; the
    // orphan (rnti2) never appears.
    assert_eq!(listing.len(), 4);
    assert!(listing.iter().all(|l| !l.id_string.contains("rnti=2")));
}

/// S6: four completed downlink journeys with latencies {0.5, 1.0, 2.0, 4.0} ms summarize to the
/// documented mean/stdev/extremes.
#[test]
fn s6_four_latencies_summarize_correctly() {
    let log = ReconstructedLatseqLog::from_text(
        "1.0000 D ip--rlc.tx.am len100:rnti1:\n\
         1.0005 D rlc.tx.am--phy.out.proc len100:rnti1:\n\
         2.0000 D ip--rlc.tx.am len100:rnti2:\n\
         2.0010 D rlc.tx.am--phy.out.proc len100:rnti2:\n\
         3.0000 D ip--rlc.tx.am len100:rnti3:\n\
         3.0020 D rlc.tx.am--phy.out.proc len100:rnti3:\n\
         4.0000 D ip--rlc.tx.am len100:rnti4:\n\
         4.0040 D rlc.tx.am--phy.out.proc len100:rnti4:\n\
         9.0000 U phy.in.proc--ip len100:rnti9:\n",
        &ip_only_config(),
    )
    .unwrap();

    let summary = latency_summary(&log.journeys);
    assert_eq!(summary.downlink.size, 4);
    assert!((summary.downlink.mean - 1.875).abs() < 1e-9);
    assert!((summary.downlink.stdev - 1.3405).abs() < 1e-3);
    assert!((summary.downlink.min - 0.5).abs() < 1e-9);
    assert!((summary.downlink.max - 4.0).abs() < 1e-9);
}

/// Per-point residency, computed on the ingest side, rolls up into a non-empty per-point summary
/// on the output side, for the point actually traversed mid-journey.
#[test]
fn residency_rolls_up_into_a_per_point_summary() {
    let log = ReconstructedLatseqLog::from_text(
        "1.000 D ip--rlc.tx.am len100:rnti1:\n\
         1.001 D rlc.tx.am--pdcp len100:rnti1:\n\
         1.002 D pdcp--phy.out.proc len100:rnti1:\n\
         9.000 U phy.in.proc--ip len100:rnti9:\n",
        &ip_only_config(),
    )
    .unwrap();

    let residency = compute_residency(&log.records, &log.journeys);
    let summary = point_residency_summary(&residency, &log.journeys);
    assert_eq!(summary.downlink["rlc.tx.am"].size, 1);
    assert!((summary.downlink["rlc.tx.am"].mean - 1.0).abs() < 1e-9);
}
