use std::time::Duration;

/// Configuration for the [`crate::ChunkProposer`].
#[derive(Debug, Clone)]
pub struct ChunkProposerConfig {
    /// The interval at which a chunk proposal is attempted.
    pub propose_interval: Duration,
    /// The maximum number of blocks in a chunk.
    pub max_block_num_per_chunk: u64,
    /// The maximum number of transactions in a chunk.
    pub max_tx_num_per_chunk: u64,
    /// The maximum L1 commit gas of a chunk.
    pub max_l1_commit_gas_per_chunk: u64,
    /// The maximum L1 commit calldata size of a chunk.
    pub max_l1_commit_calldata_size_per_chunk: u64,
    /// The maximum row count of any sub-circuit for a chunk.
    pub max_row_consumption_per_chunk: u64,
    /// The maximum age of the first block of a pending chunk, in seconds.
    pub chunk_timeout_sec: u64,
    /// The multiplier applied to the estimated L1 commit gas.
    pub gas_cost_increase_multiplier: f64,
    /// The maximum size of the blob payload before compression.
    pub max_uncompressed_batch_bytes_size: u64,
}

impl Default for ChunkProposerConfig {
    fn default() -> Self {
        Self {
            propose_interval: Duration::from_secs(10),
            max_block_num_per_chunk: 100,
            max_tx_num_per_chunk: 100,
            max_l1_commit_gas_per_chunk: 5_000_000,
            max_l1_commit_calldata_size_per_chunk: 123_740,
            max_row_consumption_per_chunk: 1_000_000,
            chunk_timeout_sec: 300,
            gas_cost_increase_multiplier: 1.2,
            max_uncompressed_batch_bytes_size: u64::MAX,
        }
    }
}

/// Configuration for the [`crate::BatchProposer`].
#[derive(Debug, Clone)]
pub struct BatchProposerConfig {
    /// The interval at which a batch proposal is attempted.
    pub propose_interval: Duration,
    /// The maximum number of chunks in a batch, further bounded by the codec.
    pub max_chunk_num_per_batch: u64,
    /// The maximum L1 commit gas of a batch.
    pub max_l1_commit_gas_per_batch: u64,
    /// The maximum L1 commit calldata size of a batch.
    pub max_l1_commit_calldata_size_per_batch: u64,
    /// The maximum age of the first block of a pending batch, in seconds.
    pub batch_timeout_sec: u64,
    /// The multiplier applied to the estimated L1 commit gas.
    pub gas_cost_increase_multiplier: f64,
    /// The maximum size of the blob payload before compression.
    pub max_uncompressed_batch_bytes_size: u64,
}

impl Default for BatchProposerConfig {
    fn default() -> Self {
        Self {
            propose_interval: Duration::from_secs(10),
            max_chunk_num_per_batch: 45,
            max_l1_commit_gas_per_batch: 5_000_000,
            max_l1_commit_calldata_size_per_batch: 123_740,
            batch_timeout_sec: 300,
            gas_cost_increase_multiplier: 1.2,
            max_uncompressed_batch_bytes_size: u64::MAX,
        }
    }
}

/// Configuration for the [`crate::BundleProposer`].
#[derive(Debug, Clone)]
pub struct BundleProposerConfig {
    /// The interval at which a bundle proposal is attempted.
    pub propose_interval: Duration,
    /// The maximum number of batches in a bundle.
    pub max_batch_num_per_bundle: u64,
    /// The maximum age of the first block of a pending bundle, in seconds.
    pub bundle_timeout_sec: u64,
}

impl Default for BundleProposerConfig {
    fn default() -> Self {
        Self {
            propose_interval: Duration::from_secs(10),
            max_batch_num_per_bundle: 30,
            bundle_timeout_sec: 36_000,
        }
    }
}

/// Scales the estimated gas by the multiplier.
pub(crate) fn over_estimate(gas: u64, multiplier: f64) -> u64 {
    (gas as f64 * multiplier) as u64
}
