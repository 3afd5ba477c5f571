use metrics::{Counter, Gauge, Histogram};
use metrics_derive::Metrics;

/// The metrics for the [`super::ChunkProposer`].
#[derive(Metrics, Clone)]
#[metrics(scope = "proposer.chunk")]
pub struct ChunkProposerMetrics {
    /// The number of proposal attempts.
    pub propose_cycles: Counter,
    /// The number of failed proposal attempts.
    pub propose_failures: Counter,
    /// The number of proposed chunks.
    pub proposed_chunks: Counter,
    /// The number of chunks proposed on the first block timeout.
    pub first_block_timeout_reached: Counter,
    /// The number of attempts without enough blocks.
    pub blocks_not_enough: Counter,
    /// The number of blocks in the latest chunk.
    pub chunk_blocks_num: Gauge,
    /// The number of transactions in the latest chunk.
    pub chunk_tx_num: Gauge,
    /// The estimated L1 commit gas of the latest chunk.
    pub chunk_estimate_l1_commit_gas: Gauge,
    /// The L1 commit calldata size of the latest chunk.
    pub chunk_l1_commit_calldata_size: Gauge,
    /// The blob size of the latest chunk.
    pub chunk_l1_commit_blob_size: Gauge,
    /// The row count of the most loaded sub-circuit in the latest chunk.
    pub chunk_max_row_consumption: Gauge,
    /// The duration of a proposal attempt.
    pub propose_duration: Histogram,
}

/// The metrics for the [`super::BatchProposer`].
#[derive(Metrics, Clone)]
#[metrics(scope = "proposer.batch")]
pub struct BatchProposerMetrics {
    /// The number of proposal attempts.
    pub propose_cycles: Counter,
    /// The number of failed proposal attempts.
    pub propose_failures: Counter,
    /// The number of proposed batches.
    pub proposed_batches: Counter,
    /// The number of batches proposed on the first block timeout.
    pub first_block_timeout_reached: Counter,
    /// The number of attempts without enough chunks.
    pub chunks_not_enough: Counter,
    /// The number of chunks in the latest batch.
    pub batch_chunks_num: Gauge,
    /// The estimated L1 commit gas of the latest batch.
    pub batch_estimate_l1_commit_gas: Gauge,
    /// The L1 commit calldata size of the latest batch.
    pub batch_l1_commit_calldata_size: Gauge,
    /// The blob size of the latest batch.
    pub batch_l1_commit_blob_size: Gauge,
    /// The duration of a proposal attempt.
    pub propose_duration: Histogram,
}

/// The metrics for the [`super::BundleProposer`].
#[derive(Metrics, Clone)]
#[metrics(scope = "proposer.bundle")]
pub struct BundleProposerMetrics {
    /// The number of proposal attempts.
    pub propose_cycles: Counter,
    /// The number of failed proposal attempts.
    pub propose_failures: Counter,
    /// The number of proposed bundles.
    pub proposed_bundles: Counter,
    /// The number of bundles proposed on the first block timeout.
    pub first_block_timeout_reached: Counter,
    /// The number of attempts without enough batches.
    pub batches_not_enough: Counter,
    /// The number of batches in the latest bundle.
    pub bundle_batches_num: Gauge,
}
