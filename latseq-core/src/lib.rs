//! Shared data model and error types for the latseq journey-reconstruction crates.
//!
//! This crate has no knowledge of how to parse a trace file or how to stitch measurements into
//! journeys; it only defines the immutable types that `latseq-in` builds and `latseq-out`
//! consumes, plus the hand-rolled error type and configuration surface common to both.
//!
//! Journeys and points cross-reference the normalized record sequence by integer index rather
//! than by reference, to avoid the cyclic ownership the upstream tool's object graph had
//! (journeys holding measurements, points holding per-journey residencies): an arena-plus-indices
//! model, with the record `Vec` as the arena.
#[cfg(any(feature = "to_json", feature = "serde"))]
extern crate serde;
#[cfg(feature = "to_json")]
extern crate serde_json;

pub mod cache;
pub mod config;
pub mod errors;
pub mod ids;
pub mod journey;
pub mod point;
pub mod record;
pub mod topology;

pub use config::ReconstructionConfig;
pub use errors::LatseqError;
pub use journey::Journey;
pub use point::Point;
pub use record::{Direction, MeasurementRecord};
pub use topology::Topology;
