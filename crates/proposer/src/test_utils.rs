use crate::{BatchProposer, BatchProposerConfig, ChunkProposer, ChunkProposerConfig};

use rollup_relayer_primitives::{
    test_utils::{init_test_tracing, l2_blocks},
    HardforkSchedule,
};
use scroll_db::{test_utils::setup_test_db, Database, DatabaseOperations};
use std::sync::Arc;

/// A timeout that never elapses during a test.
pub(crate) const NO_TIMEOUT: u64 = u64::MAX / 2;

/// Returns a database holding `count` single block chunks, the first block at timestamp 100.
pub(crate) async fn setup_chunks(schedule: HardforkSchedule, count: u64) -> Arc<Database> {
    init_test_tracing();
    let db = Arc::new(setup_test_db().await);
    db.insert_l2_blocks(l2_blocks(0, count, 100)).await.unwrap();

    let config = ChunkProposerConfig { max_block_num_per_chunk: 1, ..Default::default() };
    let proposer = ChunkProposer::new(config, db.clone(), schedule);
    for _ in 0..count {
        proposer.try_propose().await.unwrap().unwrap();
    }
    db
}

/// Returns a database holding `count` single chunk batches.
pub(crate) async fn setup_batches(schedule: HardforkSchedule, count: u64) -> Arc<Database> {
    let db = setup_chunks(schedule, count).await;

    let config = BatchProposerConfig { max_chunk_num_per_batch: 1, ..Default::default() };
    let proposer = BatchProposer::new(config, db.clone());
    for _ in 0..count {
        proposer.try_propose().await.unwrap().unwrap();
    }
    db
}
