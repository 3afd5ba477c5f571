use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};

/// The size in bytes of an encoded [`BlockContext`].
pub const BLOCK_CONTEXT_SIZE: usize = 60;

/// The number of rows a single sub-circuit of the prover uses for a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCircuitRowUsage {
    /// The name of the sub-circuit.
    pub name: String,
    /// The number of rows used.
    pub row_number: u64,
}

/// The row consumption of a block, or the aggregated row consumption of a run of blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowConsumption(pub Vec<SubCircuitRowUsage>);

impl RowConsumption {
    /// Adds the row usage of `other` to `self`, sub-circuit by sub-circuit.
    pub fn accumulate(&mut self, other: &Self) {
        for usage in &other.0 {
            match self.0.iter_mut().find(|u| u.name == usage.name) {
                Some(existing) => existing.row_number += usage.row_number,
                None => self.0.push(usage.clone()),
            }
        }
    }

    /// Returns the row count of the most loaded sub-circuit.
    pub fn max(&self) -> u64 {
        self.0.iter().map(|u| u.row_number).max().unwrap_or_default()
    }
}

impl FromIterator<(String, u64)> for RowConsumption {
    fn from_iter<T: IntoIterator<Item = (String, u64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(name, row_number)| SubCircuitRowUsage { name, row_number }).collect())
    }
}

/// An L2 block as seen by the proposers.
///
/// Only the fields needed to estimate the L1 commitment cost of the block and to link the block
/// into its chunk are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct L2Block {
    /// The block number.
    pub number: u64,
    /// The block hash.
    pub hash: B256,
    /// The parent block hash.
    pub parent_hash: B256,
    /// The block timestamp, in seconds.
    pub timestamp: u64,
    /// The base fee of the block.
    pub base_fee: u64,
    /// The gas limit of the block.
    pub gas_limit: u64,
    /// The gas used by the block.
    pub gas_used: u64,
    /// The number of transactions, L1 messages included.
    pub num_transactions: u64,
    /// The number of L1 messages included in the block.
    pub num_l1_messages: u64,
    /// The queue index of the last L1 message included in the block.
    pub last_l1_message_queue_index: Option<u64>,
    /// The RLP encoded size of each L2 transaction in the block.
    pub l2_tx_sizes: Vec<u64>,
    /// The prover row consumption of the block.
    pub row_consumption: RowConsumption,
    /// The state root after the block.
    pub state_root: B256,
    /// The withdraw trie root after the block.
    pub withdraw_root: B256,
}

impl L2Block {
    /// Returns the number of L2 transactions in the block.
    pub const fn num_l2_transactions(&self) -> u64 {
        self.num_transactions.saturating_sub(self.num_l1_messages)
    }

    /// Returns the total encoded size of the L2 transactions in the block.
    pub fn l2_tx_bytes(&self) -> u64 {
        self.l2_tx_sizes.iter().sum()
    }

    /// Returns the number of L1 messages popped by this block, skipped messages included, given
    /// the total number of messages popped before it.
    pub const fn num_l1_messages_popped(&self, total_popped_before: u64) -> u64 {
        match self.last_l1_message_queue_index {
            Some(index) if index + 1 > total_popped_before => index + 1 - total_popped_before,
            _ => 0,
        }
    }

    /// Returns the [`BlockContext`] of the block.
    pub const fn context(&self) -> BlockContext {
        BlockContext {
            number: self.number,
            timestamp: self.timestamp,
            base_fee: self.base_fee,
            gas_limit: self.gas_limit,
            num_transactions: self.num_transactions as u16,
            num_l1_messages: self.num_l1_messages as u16,
        }
    }
}

/// The per-block context committed to L1 as part of a chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockContext {
    /// The block number.
    pub number: u64,
    /// The block timestamp.
    pub timestamp: u64,
    /// The base fee.
    pub base_fee: u64,
    /// The gas limit.
    pub gas_limit: u64,
    /// The number of transactions.
    pub num_transactions: u16,
    /// The number of L1 messages.
    pub num_l1_messages: u16,
}

impl BlockContext {
    /// Encodes the context into its fixed size big-endian representation.
    pub fn encode(&self) -> [u8; BLOCK_CONTEXT_SIZE] {
        let mut out = [0u8; BLOCK_CONTEXT_SIZE];
        out[0..8].copy_from_slice(&self.number.to_be_bytes());
        out[8..16].copy_from_slice(&self.timestamp.to_be_bytes());
        out[16..48].copy_from_slice(&U256::from(self.base_fee).to_be_bytes::<32>());
        out[48..56].copy_from_slice(&self.gas_limit.to_be_bytes());
        out[56..58].copy_from_slice(&self.num_transactions.to_be_bytes());
        out[58..60].copy_from_slice(&self.num_l1_messages.to_be_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_consumption_accumulate() {
        let mut total: RowConsumption =
            [("evm".to_string(), 10), ("keccak".to_string(), 5)].into_iter().collect();
        let other: RowConsumption =
            [("keccak".to_string(), 20), ("poseidon".to_string(), 1)].into_iter().collect();
        total.accumulate(&other);

        assert_eq!(total.0.len(), 3);
        assert_eq!(total.max(), 25);
        assert_eq!(RowConsumption::default().max(), 0);
    }

    #[test]
    fn test_l1_messages_popped() {
        let block = L2Block { last_l1_message_queue_index: Some(9), ..Default::default() };
        // messages 4..=9 are popped, skipped messages included.
        assert_eq!(block.num_l1_messages_popped(4), 6);
        assert_eq!(block.num_l1_messages_popped(10), 0);

        let block = L2Block::default();
        assert_eq!(block.num_l1_messages_popped(0), 0);
    }

    #[test]
    fn test_block_context_encoding() {
        let ctx = BlockContext {
            number: 1,
            timestamp: 2,
            base_fee: 3,
            gas_limit: 4,
            num_transactions: 5,
            num_l1_messages: 6,
        };
        let encoded = ctx.encode();
        assert_eq!(encoded[7], 1);
        assert_eq!(encoded[15], 2);
        assert_eq!(encoded[47], 3);
        assert_eq!(encoded[55], 4);
        assert_eq!(encoded[57], 5);
        assert_eq!(encoded[59], 6);
    }
}
