/// Errors related to rollup relayer primitives.
#[derive(Debug, thiserror::Error)]
pub enum PrimitiveError {
    /// The codec version is not known.
    #[error("unsupported codec version {0}")]
    UnsupportedCodecVersion(u8),
    /// The rollup status discriminant is not known.
    #[error("invalid rollup status {0}")]
    InvalidRollupStatus(i16),
    /// The proving status discriminant is not known.
    #[error("invalid proving status {0}")]
    InvalidProvingStatus(i16),
}
