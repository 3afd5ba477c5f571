use crate::CodecVersion;

/// Resolves the codec version active at a given L2 block.
#[auto_impl::auto_impl(&, Arc)]
pub trait CodecVersionResolver: Send + Sync {
    /// Returns the codec version of the block with the given number and timestamp.
    fn codec_version(&self, number: u64, timestamp: u64) -> CodecVersion;

    /// Returns true if the block must be packed into a chunk on its own.
    fn is_sole_chunk_block(&self, _number: u64) -> bool {
        false
    }
}

/// The hardfork activation schedule of the L2 chain.
///
/// Block based forks activate at a block number, time based forks at a timestamp. A `None`
/// activation means the fork is not scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HardforkSchedule {
    /// The Bernoulli activation block.
    pub bernoulli_block: Option<u64>,
    /// The Curie activation block.
    pub curie_block: Option<u64>,
    /// The Darwin activation timestamp.
    pub darwin_time: Option<u64>,
    /// The `DarwinV2` activation timestamp.
    pub darwin_v2_time: Option<u64>,
}

impl HardforkSchedule {
    /// Returns a schedule with every fork active from genesis.
    pub const fn all_active() -> Self {
        Self {
            bernoulli_block: Some(0),
            curie_block: Some(0),
            darwin_time: Some(0),
            darwin_v2_time: Some(0),
        }
    }

    fn is_active_at(activation: Option<u64>, value: u64) -> bool {
        activation.is_some_and(|a| value >= a)
    }
}

impl CodecVersionResolver for HardforkSchedule {
    fn codec_version(&self, number: u64, timestamp: u64) -> CodecVersion {
        if !Self::is_active_at(self.bernoulli_block, number) {
            CodecVersion::V0
        } else if !Self::is_active_at(self.curie_block, number) {
            CodecVersion::V1
        } else if !Self::is_active_at(self.darwin_time, timestamp) {
            CodecVersion::V2
        } else if !Self::is_active_at(self.darwin_v2_time, timestamp) {
            CodecVersion::V3
        } else {
            CodecVersion::V4
        }
    }

    fn is_sole_chunk_block(&self, number: u64) -> bool {
        // the Curie block rewrites the L1 gas oracle and must be proven alone.
        self.curie_block.is_some_and(|curie| curie != 0 && curie == number)
    }
}
