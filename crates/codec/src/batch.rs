use crate::{
    blob::{blob_size, uncompressed_batch_bytes_size},
    constants::BATCH_HEADER_BYTES_SIZE,
    gas::{batch_l1_commit_gas, skipped_bitmap_size},
    CodecError,
};
use alloy_primitives::{bytes::BufMut, keccak256, Bytes, B256};
use rollup_relayer_primitives::{Chunk, CodecVersion};

/// The resource usage of a candidate batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchMetrics {
    /// The number of chunks.
    pub num_chunks: u64,
    /// The timestamp of the first block of the first chunk.
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

impl BatchMetrics {
    /// Computes the metrics of a batch made of `chunks`.
    pub fn compute(chunks: &[Chunk], codec: CodecVersion) -> Result<Self, CodecError> {
        let first = chunks.first().ok_or(CodecError::EmptyBatch)?;
        let l2_tx_bytes: u64 = chunks.iter().map(|c| c.total_l2_tx_bytes).sum();

        Ok(Self {
            num_chunks: chunks.len() as u64,
            first_block_timestamp: first.start_block_time,
            l1_commit_calldata_size: chunks.iter().map(|c| c.total_l1_commit_calldata_size).sum(),
            l1_commit_gas: batch_l1_commit_gas(chunks),
            l1_commit_blob_size: blob_size(codec, l2_tx_bytes),
            uncompressed_batch_bytes_size: uncompressed_batch_bytes_size(codec, l2_tx_bytes),
        })
    }
}

/// Computes the data hash of a batch: the keccak256 of its chunk hashes.
pub fn compute_data_hash<'a>(chunk_hashes: impl IntoIterator<Item = &'a B256>) -> B256 {
    let preimage: Vec<u8> =
        chunk_hashes.into_iter().flat_map(|hash| hash.as_slice().iter().copied()).collect();
    keccak256(preimage)
}

/// The header of a batch, committed to L1 and referenced by the next batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchHeader {
    /// The batch version.
    pub version: u8,
    /// The index of the batch.
    pub batch_index: u64,
    /// Number of L1 messages popped in the batch.
    pub l1_message_popped: u64,
    /// Number of total L1 messages popped after the batch.
    pub total_l1_message_popped: u64,
    /// The data hash of the batch.
    pub data_hash: B256,
    /// The parent batch hash.
    pub parent_batch_hash: B256,
}

impl BatchHeader {
    /// Builds the header of a batch made of `chunks`.
    pub fn new(
        codec: CodecVersion,
        batch_index: u64,
        parent_batch_hash: B256,
        chunks: &[Chunk],
    ) -> Result<Self, CodecError> {
        let (first, last) = match (chunks.first(), chunks.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(CodecError::EmptyBatch),
        };
        let max = codec.max_chunks_per_batch();
        if chunks.len() as u64 > max {
            return Err(CodecError::TooManyChunks { count: chunks.len() as u64, max })
        }

        let total_l1_message_popped = last.total_l1_messages_popped_after();
        Ok(Self {
            version: codec.into(),
            batch_index,
            l1_message_popped: total_l1_message_popped - first.total_l1_messages_popped_before,
            total_l1_message_popped,
            data_hash: compute_data_hash(chunks.iter().map(|c| &c.hash)),
            parent_batch_hash,
        })
    }

    /// Encodes the header. No message is skipped, so the bitmap is zeroed.
    pub fn encode(&self) -> Bytes {
        let bitmap_size = skipped_bitmap_size(self.l1_message_popped) as usize;
        let mut bytes = Vec::<u8>::with_capacity(BATCH_HEADER_BYTES_SIZE as usize + bitmap_size);
        bytes.put_slice(&self.version.to_be_bytes());
        bytes.put_slice(&self.batch_index.to_be_bytes());
        bytes.put_slice(&self.l1_message_popped.to_be_bytes());
        bytes.put_slice(&self.total_l1_message_popped.to_be_bytes());
        bytes.put_slice(&self.data_hash.0);
        bytes.put_slice(&self.parent_batch_hash.0);
        bytes.put_bytes(0, bitmap_size);
        bytes.into()
    }

    /// Computes the hash for the header.
    pub fn hash_slow(&self) -> B256 {
        keccak256(self.encode())
    }
}
