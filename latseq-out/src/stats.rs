//! Summary statistics over completed journeys: end-to-end latency and per-point residency.
use std::collections::BTreeMap;

use latseq_core::journey::Journey;
use latseq_core::record::Direction;
use latseq_core::topology::PerDirection;

/// Quantile probabilities reported alongside every [`Summary`], in order.
pub const QUANTILE_PROBS: [f64; 5] = [0.10, 0.25, 0.50, 0.75, 0.90];

/// Size, mean, population standard deviation, extremes, and the [`QUANTILE_PROBS`] quantiles of
/// a distribution. An empty distribution summarizes to all-zero fields rather than an error
/// (DegenerateStatistics is non-fatal by construction).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    pub size: usize,
    pub mean: f64,
    pub stdev: f64,
    pub min: f64,
    pub max: f64,
    /// Linear-interpolation quantiles at [`QUANTILE_PROBS`].
    pub quantiles: [f64; 5],
}

impl Summary {
    /// Summarize `values`. Order is irrelevant; this sorts its own copy for the quantiles.
    ///
    /// ```
    /// use latseq_out::stats::Summary;
    ///
    /// let s = Summary::of(&[0.5, 1.0, 2.0, 4.0]);
    /// assert_eq!(s.size, 4);
    /// assert!((s.mean - 1.875).abs() < 1e-9);
    /// assert!((s.stdev - 1.3405).abs() < 1e-3);
    /// assert_eq!(s.min, 0.5);
    /// assert_eq!(s.max, 4.0);
    /// ```
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let size = values.len();
        let mean = values.iter().sum::<f64>() / size as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / size as f64;
        let stdev = variance.sqrt();
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let mut quantiles = [0.0; 5];
        for (i, p) in QUANTILE_PROBS.iter().enumerate() {
            quantiles[i] = interpolated_quantile(&sorted, *p);
        }

        Self {
            size,
            mean,
            stdev,
            min,
            max,
            quantiles,
        }
    }
}

/// Linear-interpolation quantile over an already-sorted slice (numpy's default `linear` method).
fn interpolated_quantile(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let frac = rank - lower as f64;
    sorted[lower] + frac * (sorted[upper] - sorted[lower])
}

/// End-to-end latency summary, per direction, over `journeys`' completed members.
///
/// ```
/// use latseq_core::journey::Journey;
/// use latseq_core::record::Direction;
/// use latseq_core::ids::FlatIdMap;
/// use latseq_out::stats::latency_summary;
///
/// let mut j = Journey::new(0, Direction::Downlink, FlatIdMap::new(), 1.000);
/// j.ts_out = Some(1.002);
/// j.completed = true;
/// let summary = latency_summary(&[j]);
/// assert_eq!(summary.downlink.size, 1);
/// assert_eq!(summary.uplink.size, 0);
/// ```
pub fn latency_summary(journeys: &[Journey]) -> PerDirection<Summary> {
    let mut by_direction: PerDirection<Vec<f64>> = PerDirection::default();
    for journey in journeys.iter().filter(|j| j.completed) {
        if let Some(latency) = journey.latency_ms() {
            by_direction.get_mut(journey.direction).push(latency);
        }
    }
    PerDirection {
        downlink: Summary::of(&by_direction.downlink),
        uplink: Summary::of(&by_direction.uplink),
    }
}

/// Per-point residency summary, per direction, from the residency samples produced by
/// [`crate`]'s ingest-side `compute_residency` (see `latseq-in::reconstructor`).
///
/// `residency` maps point label -> journey id -> residency ms, exactly as returned by
/// `reconstructor::compute_residency`; `journeys` supplies each journey's direction.
pub fn point_residency_summary(
    residency: &BTreeMap<String, BTreeMap<u64, f64>>,
    journeys: &[Journey],
) -> PerDirection<BTreeMap<String, Summary>> {
    let direction_of: BTreeMap<u64, Direction> =
        journeys.iter().map(|j| (j.journey_id, j.direction)).collect();

    let mut result: PerDirection<BTreeMap<String, Summary>> = PerDirection::default();
    for (point, by_journey) in residency {
        let mut samples: PerDirection<Vec<f64>> = PerDirection::default();
        for (journey_id, residency_ms) in by_journey {
            if let Some(direction) = direction_of.get(journey_id) {
                samples.get_mut(*direction).push(*residency_ms);
            }
        }
        if !samples.downlink.is_empty() {
            result.downlink.insert(point.clone(), Summary::of(&samples.downlink));
        }
        if !samples.uplink.is_empty() {
            result.uplink.insert(point.clone(), Summary::of(&samples.uplink));
        }
    }
    result
}
