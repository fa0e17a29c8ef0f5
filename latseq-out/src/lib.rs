//! Output pipeline: turns a reconstructed log into latency/residency statistics and the flat,
//! timestamp-sorted listing described in the crate docs.
//!
//! [`stats`] computes [`stats::Summary`] distributions; [`shaper`] renders the
//! [`shaper::ListingLine`]s. Neither module writes to disk or formats for a terminal — both are
//! out of scope here (pretty-printing and any visualization layer are external collaborators).
pub mod shaper;
pub mod stats;

#[cfg(test)]
mod integration_tests;
