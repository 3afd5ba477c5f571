use crate::{
    blob::{blob_size, uncompressed_batch_bytes_size},
    constants::BLOCK_CONTEXT_HASHED_BYTES_SIZE,
    gas::{chunk_l1_commit_calldata_size, chunk_l1_commit_gas},
    CodecError,
};
use alloy_primitives::{keccak256, Bytes, B256};
use rollup_relayer_primitives::{CodecVersion, L2Block, RowConsumption, BLOCK_CONTEXT_SIZE};

/// The resource usage of a candidate chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkMetrics {
    /// The number of blocks.
    pub num_blocks: u64,
    /// The number of transactions, L1 messages included.
    pub tx_num: u64,
    /// The number of L2 transactions.
    pub l2_tx_num: u64,
    /// The gas used by the blocks.
    pub l2_tx_gas: u64,
    /// The total size of the L2 transaction payloads.
    pub l2_tx_bytes: u64,
    /// The row count of the most loaded sub-circuit.
    pub crc_max: u64,
    /// The aggregated row consumption.
    pub row_consumption: RowConsumption,
    /// The timestamp of the first block.
    pub first_block_timestamp: u64,
    /// The estimated L1 commit calldata size.
    pub l1_commit_calldata_size: u64,
    /// The estimated L1 commit gas.
    pub l1_commit_gas: u64,
    /// The estimated blob size, 0 for calldata codecs.
    pub l1_commit_blob_size: u64,
    /// The blob payload size before padding and compression, 0 for calldata codecs.
    pub uncompressed_batch_bytes_size: u64,
}

impl ChunkMetrics {
    /// Computes the metrics of a chunk made of `blocks`.
    pub fn compute(blocks: &[L2Block], codec: CodecVersion) -> Result<Self, CodecError> {
        let first = blocks.first().ok_or(CodecError::EmptyChunk)?;

        let mut row_consumption = RowConsumption::default();
        let mut metrics = Self {
            num_blocks: blocks.len() as u64,
            first_block_timestamp: first.timestamp,
            ..Default::default()
        };
        for block in blocks {
            metrics.tx_num += block.num_transactions;
            metrics.l2_tx_num += block.num_l2_transactions();
            metrics.l2_tx_gas += block.gas_used;
            metrics.l2_tx_bytes += block.l2_tx_bytes();
            row_consumption.accumulate(&block.row_consumption);
        }

        metrics.crc_max = row_consumption.max();
        metrics.row_consumption = row_consumption;
        metrics.l1_commit_gas = chunk_l1_commit_gas(blocks, codec);
        metrics.l1_commit_calldata_size = chunk_l1_commit_calldata_size(blocks, codec);
        metrics.l1_commit_blob_size = blob_size(codec, metrics.l2_tx_bytes);
        metrics.uncompressed_batch_bytes_size =
            uncompressed_batch_bytes_size(codec, metrics.l2_tx_bytes);

        Ok(metrics)
    }
}

/// Returns the number of L1 messages popped by `blocks`, given the number popped before them.
pub fn l1_messages_popped(blocks: &[L2Block], total_popped_before: u64) -> u64 {
    blocks.iter().fold(0, |popped, block| {
        popped + block.num_l1_messages_popped(total_popped_before + popped)
    })
}

/// Computes the hash of a chunk: the keccak256 of the hashed part of every block context
/// followed by every block hash.
pub fn compute_chunk_hash(blocks: &[L2Block]) -> Result<B256, CodecError> {
    if blocks.is_empty() {
        return Err(CodecError::EmptyChunk)
    }

    let mut preimage = Vec::with_capacity(blocks.len() * (BLOCK_CONTEXT_HASHED_BYTES_SIZE + 32));
    for block in blocks {
        preimage.extend_from_slice(&block.context().encode()[..BLOCK_CONTEXT_HASHED_BYTES_SIZE]);
    }
    for block in blocks {
        preimage.extend_from_slice(block.hash.as_slice());
    }

    Ok(keccak256(preimage))
}

/// Encodes a chunk for the commit calldata: the block count followed by every block context.
pub fn encode_chunk(blocks: &[L2Block]) -> Result<Bytes, CodecError> {
    if blocks.is_empty() {
        return Err(CodecError::EmptyChunk)
    }
    let num_blocks =
        u8::try_from(blocks.len()).map_err(|_| CodecError::TooManyBlocks(blocks.len() as u64))?;

    let mut bytes = Vec::with_capacity(1 + blocks.len() * BLOCK_CONTEXT_SIZE);
    bytes.push(num_blocks);
    for block in blocks {
        bytes.extend_from_slice(&block.context().encode());
    }
    Ok(bytes.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollup_relayer_primitives::test_utils::{l2_block, l2_blocks};

    #[test]
    fn test_chunk_metrics() {
        let blocks = l2_blocks(10, 3, 1_000);
        let metrics = ChunkMetrics::compute(&blocks, CodecVersion::V1).unwrap();

        assert_eq!(metrics.num_blocks, 3);
        assert_eq!(metrics.tx_num, 3);
        assert_eq!(metrics.l2_tx_bytes, 300);
        assert_eq!(metrics.first_block_timestamp, 1_000);
        assert_eq!(metrics.l1_commit_calldata_size, 180);
        // rows are summed per sub-circuit across blocks.
        assert_eq!(metrics.crc_max, 300);
        assert!(metrics.l1_commit_blob_size > 0);

        let v0 = ChunkMetrics::compute(&blocks, CodecVersion::V0).unwrap();
        assert_eq!(v0.l1_commit_blob_size, 0);
        assert!(v0.l1_commit_gas > metrics.l1_commit_gas);

        assert!(matches!(ChunkMetrics::compute(&[], CodecVersion::V1), Err(CodecError::EmptyChunk)));
    }

    #[test]
    fn test_l1_messages_popped() {
        let mut first = l2_block(1, 1);
        first.last_l1_message_queue_index = Some(4);
        let second = l2_block(2, 2);
        let mut third = l2_block(3, 3);
        third.last_l1_message_queue_index = Some(7);

        assert_eq!(l1_messages_popped(&[first, second, third], 2), 6);
    }

    #[test]
    fn test_chunk_hash() {
        let blocks = l2_blocks(1, 2, 1);
        let hash = compute_chunk_hash(&blocks).unwrap();
        assert_eq!(hash, compute_chunk_hash(&blocks).unwrap());
        assert_ne!(hash, compute_chunk_hash(&blocks[..1]).unwrap());
        assert!(compute_chunk_hash(&[]).is_err());
    }

    #[test]
    fn test_encode_chunk() {
        let blocks = l2_blocks(1, 2, 1);
        let encoded = encode_chunk(&blocks).unwrap();
        assert_eq!(encoded.len(), 1 + 2 * BLOCK_CONTEXT_SIZE);
        assert_eq!(encoded[0], 2);
        assert_eq!(&encoded[1..1 + BLOCK_CONTEXT_SIZE], &blocks[0].context().encode());

        let too_many = l2_blocks(0, 256, 1);
        assert!(matches!(encode_chunk(&too_many), Err(CodecError::TooManyBlocks(256))));
    }
}
