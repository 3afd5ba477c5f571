//! Fixtures for tests across the rollup relayer crates.

use crate::{L2Block, RowConsumption};
use alloy_primitives::{B256, U256};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Initializes a test-writer tracing subscriber once per process.
pub fn init_test_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
            .from_env_lossy();

        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}

/// Returns a deterministic block hash for the given number.
pub fn block_hash(number: u64) -> B256 {
    B256::from(U256::from(number) + U256::from(1u64) << 128)
}

/// Returns an L2 block with a single 100 byte L2 transaction.
pub fn l2_block(number: u64, timestamp: u64) -> L2Block {
    L2Block {
        number,
        hash: block_hash(number),
        parent_hash: if number == 0 { B256::ZERO } else { block_hash(number - 1) },
        timestamp,
        base_fee: 1_000_000,
        gas_limit: 10_000_000,
        gas_used: 21_000,
        num_transactions: 1,
        num_l1_messages: 0,
        last_l1_message_queue_index: None,
        l2_tx_sizes: vec![100],
        row_consumption: [("evm".to_string(), 100), ("keccak".to_string(), 50)]
            .into_iter()
            .collect::<RowConsumption>(),
        state_root: B256::repeat_byte((number % 255) as u8 + 1),
        withdraw_root: B256::repeat_byte(0xaa),
    }
}

/// Returns `count` consecutive blocks starting at `start`, one second apart from `timestamp`.
pub fn l2_blocks(start: u64, count: u64, timestamp: u64) -> Vec<L2Block> {
    (0..count).map(|i| l2_block(start + i, timestamp + i)).collect()
}
