//! A minimal, versioned on-disk envelope for a fully reconstructed result (boundary collaborator
//! only; see the crate docs). This crate defines the envelope and its version-mismatch failure
//! mode, not when or whether to use it.
#![cfg(feature = "to_json")]

use serde::{Deserialize, Serialize};

use crate::errors::LatseqError;
use crate::journey::Journey;
use crate::record::MeasurementRecord;

/// Bump whenever the shape of [`CacheEnvelope`] or its contents changes incompatibly.
pub const CACHE_FORMAT_VERSION: u32 = 1;

/// A cached reconstruction result, tagged with the format version it was written under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEnvelope {
    pub format_version: u32,
    pub records: Vec<MeasurementRecord>,
    pub journeys: Vec<Journey>,
    pub orphan_count: u64,
}

impl CacheEnvelope {
    pub fn new(records: Vec<MeasurementRecord>, journeys: Vec<Journey>, orphan_count: u64) -> Self {
        Self {
            format_version: CACHE_FORMAT_VERSION,
            records,
            journeys,
            orphan_count,
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>, LatseqError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize from JSON bytes, refusing an envelope from a different format version.
    pub fn from_json(bytes: &[u8]) -> Result<Self, LatseqError> {
        let envelope: CacheEnvelope = serde_json::from_slice(bytes)?;
        if envelope.format_version != CACHE_FORMAT_VERSION {
            return Err(LatseqError::CacheVersionMismatch {
                found: envelope.format_version,
                expected: CACHE_FORMAT_VERSION,
            });
        }
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::FlatIdMap;
    use crate::record::Direction;

    #[test]
    fn round_trips_through_json() {
        let record = MeasurementRecord::new(
            1.0,
            Direction::Downlink,
            "ip".to_string(),
            "rlc.tx.am".to_string(),
            FlatIdMap::new(),
            FlatIdMap::new(),
            Default::default(),
        );
        let envelope = CacheEnvelope::new(vec![record], vec![], 0);
        let bytes = envelope.to_json().unwrap();
        let reloaded = CacheEnvelope::from_json(&bytes).unwrap();
        assert_eq!(reloaded.records.len(), 1);
        assert_eq!(reloaded.format_version, CACHE_FORMAT_VERSION);
    }

    #[test]
    fn rejects_mismatched_version() {
        let mut envelope = CacheEnvelope::new(vec![], vec![], 0);
        envelope.format_version = CACHE_FORMAT_VERSION + 1;
        let bytes = serde_json::to_vec(&envelope).unwrap();
        let err = CacheEnvelope::from_json(&bytes).unwrap_err();
        assert!(matches!(err, LatseqError::CacheVersionMismatch { .. }));
    }
}
