use crate::PrimitiveError;

/// The version of the codec used to commit a unit to L1.
///
/// The codec version is fixed by the hardfork active at the first block of a unit and determines
/// the L1 commit cost model.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum CodecVersion {
    /// Calldata based commitment.
    #[display("v0")]
    V0 = 0,
    /// Blob based commitment, introduced by Bernoulli.
    #[display("v1")]
    V1 = 1,
    /// Compressed blob commitment, introduced by Curie.
    #[display("v2")]
    V2 = 2,
    /// Bundled finalization, introduced by Darwin.
    #[display("v3")]
    V3 = 3,
    /// Compressed bundled finalization, introduced by `DarwinV2`.
    #[display("v4")]
    V4 = 4,
}

impl CodecVersion {
    /// Returns the maximum number of chunks a batch of this codec version can hold.
    pub const fn max_chunks_per_batch(&self) -> u64 {
        match self {
            Self::V0 | Self::V1 => 15,
            Self::V2 | Self::V3 | Self::V4 => 45,
        }
    }

    /// Returns true if the codec publishes the batch payload in a blob.
    pub const fn uses_blob(&self) -> bool {
        !matches!(self, Self::V0)
    }

    /// Returns true if batches of this codec are finalized as part of a bundle.
    pub const fn is_bundled(&self) -> bool {
        matches!(self, Self::V3 | Self::V4)
    }
}

impl TryFrom<u8> for CodecVersion {
    type Error = PrimitiveError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::V0),
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            4 => Ok(Self::V4),
            v => Err(PrimitiveError::UnsupportedCodecVersion(v)),
        }
    }
}

impl From<CodecVersion> for u8 {
    fn from(value: CodecVersion) -> Self {
        value as Self
    }
}
