//! The measurement record: one parsed observation that a packet crossed `src_point -> dst_point`
//! at `timestamp`, in a given direction, carrying properties and identifier sets.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ids::{FlatIdMap, LocalIdMap};

/// Direction of travel through the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Toward the radio.
    Downlink,
    /// Toward the host.
    Uplink,
}

impl Direction {
    /// Parse the single-letter form used in the trace format (`D` or `U`).
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'D' => Some(Direction::Downlink),
            'U' => Some(Direction::Uplink),
            _ => None,
        }
    }

    /// The single-letter form used in the trace and flat-listing formats.
    pub fn as_letter(self) -> char {
        match self {
            Direction::Downlink => 'D',
            Direction::Uplink => 'U',
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_letter())
    }
}

/// One normalized measurement: an immutable observation ready for topology building and
/// journey reconstruction.
///
/// ```
/// use latseq_core::ids::FlatIdMap;
/// use latseq_core::record::{Direction, MeasurementRecord};
///
/// let mut globals = FlatIdMap::new();
/// globals.insert("rnti".to_string(), 1);
/// let record = MeasurementRecord::new(
///     1.000,
///     Direction::Downlink,
///     "ip".to_string(),
///     "rlc.tx.am".to_string(),
///     FlatIdMap::new(),
///     globals,
///     Default::default(),
/// );
/// assert_eq!(record.src_point, "ip");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeasurementRecord {
    /// Seconds since epoch, sub-millisecond resolution expected.
    pub timestamp: f64,
    pub direction: Direction,
    pub src_point: String,
    pub dst_point: String,
    pub properties: FlatIdMap,
    pub global_ids: FlatIdMap,
    pub local_ids: LocalIdMap,
}

impl MeasurementRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        timestamp: f64,
        direction: Direction,
        src_point: String,
        dst_point: String,
        properties: FlatIdMap,
        global_ids: FlatIdMap,
        local_ids: LocalIdMap,
    ) -> Self {
        Self {
            timestamp,
            direction,
            src_point,
            dst_point,
            properties,
            global_ids,
            local_ids,
        }
    }

    /// The `src--dst` segment string used in the flat listing.
    pub fn segment(&self) -> String {
        format!("{}--{}", self.src_point, self.dst_point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_round_trips_through_letter() {
        assert_eq!(Direction::from_letter('D'), Some(Direction::Downlink));
        assert_eq!(Direction::from_letter('U'), Some(Direction::Uplink));
        assert_eq!(Direction::from_letter('X'), None);
        assert_eq!(Direction::Downlink.as_letter(), 'D');
        assert_eq!(Direction::Uplink.as_letter(), 'U');
    }

    #[test]
    fn segment_joins_src_and_dst() {
        let record = MeasurementRecord::new(
            1.0,
            Direction::Downlink,
            "ip".to_string(),
            "rlc.tx.am".to_string(),
            Default::default(),
            Default::default(),
            Default::default(),
        );
        assert_eq!(record.segment(), "ip--rlc.tx.am");
    }
}
