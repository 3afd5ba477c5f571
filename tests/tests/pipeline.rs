//! End to end tests of the proposal and relaying pipeline against a mock L1.

use alloy_primitives::Bytes;
use rollup_relayer_primitives::{HardforkSchedule, ProvingStatus, RollupStatus};
use rollup_relayer_tests::utils::{wait_for, Pipeline, PipelineConfig};
use scroll_db::DatabaseOperations;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A chain that never activates Darwin, batches are finalized one by one.
const PRE_DARWIN: HardforkSchedule =
    HardforkSchedule { bernoulli_block: Some(0), curie_block: Some(0), darwin_time: None, darwin_v2_time: None };

#[tokio::test]
async fn test_bundle_finalized_with_proof() -> eyre::Result<()> {
    let pipeline = Pipeline::new(PipelineConfig::default()).await?;
    let mut confirmations = pipeline.confirmations()?;
    let db = &pipeline.database;

    pipeline.propose_all().await?;
    // blocks 1..=8, two blocks per chunk and two chunks per batch.
    assert_eq!(db.get_latest_chunk().await?.unwrap().index, 4);
    let first = db.get_batch_by_index(1).await?.unwrap();
    let second = db.get_batch_by_index(2).await?.unwrap();
    assert_eq!((first.start_block_number, first.end_block_number), (1, 4));
    assert_eq!(second.parent_batch_hash, first.hash);
    let bundle = db.get_latest_bundle().await?.unwrap();
    assert_eq!((bundle.start_batch_index, bundle.end_batch_index), (1, 2));

    pipeline.relayer.process_pending_batches().await?;
    assert_eq!(pipeline.mine_and_confirm(&mut confirmations).await?, 2);
    for index in [1, 2] {
        assert_eq!(db.get_batch_by_index(index).await?.unwrap().rollup_status, RollupStatus::Committed);
    }

    // bundled batches wait for the bundle proof.
    pipeline.relayer.process_committed_batches().await?;
    pipeline.relayer.process_pending_bundles().await?;
    assert_eq!(pipeline.client.send_count(), 2);

    db.update_bundle_proof(bundle.hash, Bytes::from_static(&[1; 32])).await?;
    pipeline.relayer.process_pending_bundles().await?;
    assert_eq!(pipeline.mine_and_confirm(&mut confirmations).await?, 1);

    let bundle = db.get_bundle_by_hash(bundle.hash).await?.unwrap();
    assert_eq!(bundle.rollup_status, RollupStatus::Finalized);
    for index in [1, 2] {
        let batch = db.get_batch_by_index(index).await?.unwrap();
        assert_eq!(batch.rollup_status, RollupStatus::Finalized);
        assert_eq!(batch.bundle_hash, Some(bundle.hash));
    }
    Ok(())
}

#[tokio::test]
async fn test_pre_darwin_batches_finalized_without_proof() -> eyre::Result<()> {
    let config = PipelineConfig { schedule: PRE_DARWIN, bypass_proofs: true, ..Default::default() };
    let pipeline = Pipeline::new(config).await?;
    let mut confirmations = pipeline.confirmations()?;
    let db = &pipeline.database;

    pipeline.propose_all().await?;
    // pre-Darwin batches are never bundled.
    assert!(db.get_latest_bundle().await?.is_none());

    pipeline.relayer.process_pending_batches().await?;
    pipeline.mine_and_confirm(&mut confirmations).await?;

    // one batch per round, in order.
    for index in [1, 2] {
        pipeline.relayer.process_committed_batches().await?;
        assert_eq!(pipeline.mine_and_confirm(&mut confirmations).await?, 1);
        let batch = db.get_batch_by_index(index).await?.unwrap();
        assert_eq!(batch.rollup_status, RollupStatus::Finalized);
        assert_eq!(batch.proving_status, ProvingStatus::Verified);
    }
    Ok(())
}

#[tokio::test]
async fn test_spawned_pipeline_finalizes_every_block() -> eyre::Result<()> {
    let config = PipelineConfig { bypass_proofs: true, auto_mine: true, ..Default::default() };
    let pipeline = Pipeline::new(config).await?;
    let shutdown = CancellationToken::new();
    let handles = pipeline.spawn(&shutdown)?;

    let db = pipeline.database.clone();
    wait_for(
        || {
            let db = db.clone();
            async move {
                let Some(batch) = db.get_latest_batch().await? else { return Ok(false) };
                Ok(batch.end_block_number == 8 && batch.rollup_status == RollupStatus::Finalized)
            }
        },
        Duration::from_secs(10),
    )
    .await?;

    shutdown.cancel();
    for handle in handles {
        handle.await?;
    }

    let latest = db.get_latest_batch().await?.unwrap();
    for index in 1..=latest.index {
        let batch = db.get_batch_by_index(index).await?.unwrap();
        assert_eq!(batch.rollup_status, RollupStatus::Finalized, "batch {index}");
        assert!(batch.bundle_hash.is_some());
    }
    Ok(())
}
