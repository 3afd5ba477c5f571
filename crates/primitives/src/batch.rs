use crate::{CodecVersion, ProvingStatus, RollupStatus};
use alloy_primitives::{Bytes, B256};

/// A contiguous run of chunks committed to L1 in a single transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// The index of the batch.
    pub index: u64,
    /// The hash of the batch, the keccak256 of its header.
    pub hash: B256,
    /// The hash of the chunk hashes.
    pub data_hash: B256,
    /// The hash of the parent batch.
    pub parent_batch_hash: B256,
    /// The index of the first chunk.
    pub start_chunk_index: u64,
    /// The hash of the first chunk.
    pub start_chunk_hash: B256,
    /// The index of the last chunk.
    pub end_chunk_index: u64,
    /// The hash of the last chunk.
    pub end_chunk_hash: B256,
    /// The number of the first block of the batch.
    pub start_block_number: u64,
    /// The timestamp of the first block of the batch.
    pub start_block_time: u64,
    /// The number of the last block of the batch.
    pub end_block_number: u64,
    /// The codec version of the batch.
    pub codec_version: CodecVersion,
    /// The total number of L1 messages popped before this batch.
    pub total_l1_messages_popped_before: u64,
    /// The number of L1 messages popped in this batch.
    pub l1_messages_popped: u64,
    /// The estimated L1 commit gas of the batch.
    pub total_l1_commit_gas: u64,
    /// The estimated L1 calldata size of the batch.
    pub total_l1_commit_calldata_size: u64,
    /// The encoded batch header.
    pub batch_header: Bytes,
    /// The state root after the last block of the batch.
    pub state_root: B256,
    /// The withdraw root after the last block of the batch.
    pub withdraw_root: B256,
    /// The rollup status of the batch.
    pub rollup_status: RollupStatus,
    /// The proving status of the batch.
    pub proving_status: ProvingStatus,
    /// The validity proof, once produced.
    pub proof: Option<Bytes>,
    /// The hash of the latest commit transaction.
    pub commit_tx_hash: Option<B256>,
    /// The hash of the latest finalize transaction.
    pub finalize_tx_hash: Option<B256>,
    /// The unix time at which the commit transaction was confirmed.
    pub committed_at: Option<u64>,
    /// The hash of the bundle the batch belongs to, once bundled.
    pub bundle_hash: Option<B256>,
}

impl Batch {
    /// Returns the number of chunks in the batch.
    pub const fn num_chunks(&self) -> u64 {
        self.end_chunk_index - self.start_chunk_index + 1
    }
}
