//! Gas estimators for committing blocks, chunks and batches to L1.

use crate::constants::{
    BATCH_HEADER_BYTES_SIZE, CALLDATA_NON_ZERO_BYTE_GAS, SKIPPED_L1_MESSAGE_BITMAP_ITEM_BYTES_SIZE,
};
use rollup_relayer_primitives::{Chunk, CodecVersion, L2Block, BLOCK_CONTEXT_SIZE};

const BLOCK_CONTEXT_BYTES: u64 = BLOCK_CONTEXT_SIZE as u64;

/// Returns the cost of expanding memory to `memory_byte_size` bytes.
pub const fn memory_expansion_cost(memory_byte_size: u64) -> u64 {
    let words = memory_byte_size.div_ceil(32);
    words * words / 512 + 3 * words
}

/// Returns the gas cost of hashing `size` bytes with keccak256.
pub const fn keccak256_gas(size: u64) -> u64 {
    memory_expansion_cost(size) + 30 + 6 * size.div_ceil(32)
}

/// Returns the number of bytes the skipped L1 message bitmap takes for `popped` messages.
pub const fn skipped_bitmap_size(popped: u64) -> u64 {
    SKIPPED_L1_MESSAGE_BITMAP_ITEM_BYTES_SIZE * popped.div_ceil(256)
}

/// Estimates the L1 commit gas of a single block.
pub fn block_l1_commit_gas(block: &L2Block, codec: CodecVersion) -> u64 {
    let num_l1_messages = block.num_l1_messages;

    let mut total = CALLDATA_NON_ZERO_BYTE_GAS * BLOCK_CONTEXT_BYTES;

    // cold sload, call and warm address access to the message queue.
    total += (2100 + 100 + 100) * num_l1_messages;
    // staticcall to the proxy, admin and implementation reads, delegatecall.
    total += (memory_expansion_cost(36) + 100 + 100 + 100 + memory_expansion_cost(36)) *
        num_l1_messages;

    if codec == CodecVersion::V0 {
        for size in &block.l2_tx_sizes {
            total += CALLDATA_NON_ZERO_BYTE_GAS * (4 + size);
            total += keccak256_gas(*size);
        }
    }

    total
}

/// Estimates the L1 commit calldata size of a single block.
pub fn block_l1_commit_calldata_size(block: &L2Block, codec: CodecVersion) -> u64 {
    match codec {
        CodecVersion::V0 => {
            BLOCK_CONTEXT_BYTES + block.l2_tx_sizes.iter().map(|size| 4 + size).sum::<u64>()
        }
        _ => BLOCK_CONTEXT_BYTES,
    }
}

/// Estimates the L1 commit gas of a chunk made of `blocks`.
pub fn chunk_l1_commit_gas(blocks: &[L2Block], codec: CodecVersion) -> u64 {
    let num_blocks = blocks.len() as u64;
    let total_tx_num: u64 = blocks.iter().map(|b| b.num_transactions).sum();

    let mut total: u64 = blocks.iter().map(|b| block_l1_commit_gas(b, codec)).sum();
    // warm sload per block.
    total += 100 * num_blocks;
    // number of blocks field.
    total += CALLDATA_NON_ZERO_BYTE_GAS;
    total += CALLDATA_NON_ZERO_BYTE_GAS * num_blocks * BLOCK_CONTEXT_BYTES;
    // chunk hash.
    total += keccak256_gas(58 * num_blocks + 32 * total_tx_num);
    total
}

/// Estimates the L1 commit calldata size of a chunk made of `blocks`.
pub fn chunk_l1_commit_calldata_size(blocks: &[L2Block], codec: CodecVersion) -> u64 {
    blocks.iter().map(|b| block_l1_commit_calldata_size(b, codec)).sum()
}

/// Estimates the L1 commit gas of a batch made of `chunks`.
///
/// Every chunk adds a correction term for the skipped message bitmap of the header it produces and
/// for the memory its calldata occupies, on top of its own commit gas.
pub fn batch_l1_commit_gas(chunks: &[Chunk]) -> u64 {
    // proxy and pause checks.
    let mut total: u64 = 100_000;
    // cold sloads, sstore and base transaction fee.
    total += 4 * 2100 + 20_000 + 21_000;
    // version in calldata.
    total += CALLDATA_NON_ZERO_BYTE_GAS;
    // cold sload and address access for the message queue, minus the warm accesses.
    total += 2100 + 2600 - 100 - 100;
    // parent batch header hash and calldata, assuming one bitmap item.
    total += keccak256_gas(BATCH_HEADER_BYTES_SIZE + 32);
    total += CALLDATA_NON_ZERO_BYTE_GAS * (BATCH_HEADER_BYTES_SIZE + 32);
    // data hash.
    total += keccak256_gas(32 * chunks.len() as u64);

    for chunk in chunks {
        total += chunk.total_l1_commit_gas;

        let bitmap_size = skipped_bitmap_size(chunk.total_l1_messages_popped_in_chunk);
        total += CALLDATA_NON_ZERO_BYTE_GAS * bitmap_size;
        total += keccak256_gas(BATCH_HEADER_BYTES_SIZE + bitmap_size);
        total += memory_expansion_cost(chunk.total_l1_commit_calldata_size);
    }

    total
}
