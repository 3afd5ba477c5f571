use crate::{CodecVersion, RowConsumption};
use alloy_primitives::B256;

/// A contiguous run of L2 blocks, the smallest unit committed to L1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The index of the chunk.
    pub index: u64,
    /// The hash of the chunk.
    pub hash: B256,
    /// The number of the first block in the chunk.
    pub start_block_number: u64,
    /// The hash of the first block in the chunk.
    pub start_block_hash: B256,
    /// The number of the last block in the chunk.
    pub end_block_number: u64,
    /// The hash of the last block in the chunk.
    pub end_block_hash: B256,
    /// The timestamp of the first block in the chunk.
    pub start_block_time: u64,
    /// The total number of L1 messages popped before this chunk.
    pub total_l1_messages_popped_before: u64,
    /// The number of L1 messages popped in this chunk.
    pub total_l1_messages_popped_in_chunk: u64,
    /// The hash of the previous chunk.
    pub parent_chunk_hash: B256,
    /// The state root after the last block of the chunk.
    pub state_root: B256,
    /// The withdraw root after the last block of the chunk.
    pub withdraw_root: B256,
    /// The codec version the chunk is encoded with.
    pub codec_version: CodecVersion,
    /// The total gas used by L2 transactions.
    pub total_l2_tx_gas: u64,
    /// The total number of L2 transactions.
    pub total_l2_tx_num: u64,
    /// The estimated L1 calldata size of the chunk.
    pub total_l1_commit_calldata_size: u64,
    /// The estimated L1 commit gas of the chunk.
    pub total_l1_commit_gas: u64,
    /// The total size of the L2 transaction payloads, the input of the blob size estimate.
    pub total_l2_tx_bytes: u64,
    /// The aggregated row consumption of the blocks.
    pub row_consumption: RowConsumption,
    /// The hash of the batch the chunk belongs to, once batched.
    pub batch_hash: Option<B256>,
}

impl Chunk {
    /// Returns the number of blocks in the chunk.
    pub const fn num_blocks(&self) -> u64 {
        self.end_block_number - self.start_block_number + 1
    }

    /// Returns the total number of L1 messages popped after this chunk.
    pub const fn total_l1_messages_popped_after(&self) -> u64 {
        self.total_l1_messages_popped_before + self.total_l1_messages_popped_in_chunk
    }
}
