use crate::{CodecVersion, ProvingStatus, RollupStatus};
use alloy_primitives::{keccak256, Bytes, B256};

/// A contiguous run of batches sharing one codec version, finalized on L1 with a single proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// The index of the bundle.
    pub index: u64,
    /// The hash of the bundle.
    pub hash: B256,
    /// The index of the first batch.
    pub start_batch_index: u64,
    /// The hash of the first batch.
    pub start_batch_hash: B256,
    /// The index of the last batch.
    pub end_batch_index: u64,
    /// The hash of the last batch.
    pub end_batch_hash: B256,
    /// The codec version shared by every batch of the bundle.
    pub codec_version: CodecVersion,
    /// The rollup status of the bundle.
    pub rollup_status: RollupStatus,
    /// The proving status of the bundle.
    pub proving_status: ProvingStatus,
    /// The aggregated proof, once produced.
    pub proof: Option<Bytes>,
    /// The hash of the latest finalize transaction.
    pub finalize_tx_hash: Option<B256>,
    /// The unix time at which the bundle was proposed.
    pub created_at: u64,
}

impl Bundle {
    /// Computes the hash of a bundle from the hashes of its first and last batch.
    pub fn compute_hash(start_batch_hash: B256, end_batch_hash: B256) -> B256 {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(start_batch_hash.as_slice());
        buf[32..].copy_from_slice(end_batch_hash.as_slice());
        keccak256(buf)
    }

    /// Returns the number of batches in the bundle.
    pub const fn num_batches(&self) -> u64 {
        self.end_batch_index - self.start_batch_index + 1
    }
}
