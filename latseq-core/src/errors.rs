/// Error types for the log normalizer, topology builder and the persisted-cache boundary.
///
/// The journey reconstructor and the statistics pass are infallible by contract (see the
/// crate-level docs); they never produce a [`LatseqError`].
#[derive(Debug)]
pub enum LatseqError {
    /// Input file missing or unreadable.
    InputUnavailable(std::io::Error),
    /// A line could not be parsed and none of the comment/empty/sentinel rules apply,
    /// and the whole file yielded zero valid records.
    ParseError { msg: String },
    /// After ingest, a direction enumerated zero source-to-sink paths.
    TopologyError { direction: String },
    /// A cache envelope's format version does not match this build's.
    CacheVersionMismatch { found: u32, expected: u32 },
    #[cfg(feature = "to_json")]
    /// Serialisation/deserialisation error for the persisted-cache envelope.
    SerdeError(serde_json::Error),
}

impl From<std::io::Error> for LatseqError {
    fn from(e: std::io::Error) -> Self {
        Self::InputUnavailable(e)
    }
}

#[cfg(feature = "to_json")]
impl From<serde_json::Error> for LatseqError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerdeError(e)
    }
}

impl std::fmt::Display for LatseqError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use self::LatseqError::*;
        match self {
            InputUnavailable(e) => write!(fmt, "input unavailable: {}", e),
            ParseError { msg } => write!(fmt, "parse error: {}", msg),
            TopologyError { direction } => {
                write!(fmt, "topology has no source-to-sink path for direction {}", direction)
            }
            CacheVersionMismatch { found, expected } => write!(
                fmt,
                "cache envelope version {} does not match expected version {}",
                found, expected
            ),
            #[cfg(feature = "to_json")]
            SerdeError(e) => write!(fmt, "{}", e),
        }
    }
}

impl From<LatseqError> for String {
    fn from(e: LatseqError) -> String {
        e.to_string()
    }
}

impl std::error::Error for LatseqError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use self::LatseqError::*;
        match self {
            InputUnavailable(e) => e.source(),
            #[cfg(feature = "to_json")]
            SerdeError(e) => e.source(),
            _ => None,
        }
    }
}
