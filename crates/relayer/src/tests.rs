use super::*;
use alloy_consensus::{Transaction, TxEnvelope};
use alloy_eips::eip2718::Decodable2718;
use alloy_signer_local::PrivateKeySigner;
use rollup_relayer_primitives::{
    test_utils::{init_test_tracing, l2_blocks},
    HardforkSchedule,
};
use rollup_relayer_proposer::{
    BatchProposer, BatchProposerConfig, BundleProposer, BundleProposerConfig, ChunkProposer,
    ChunkProposerConfig,
};
use rollup_relayer_providers::{test_utils::MockChainClient, ConfirmationDepth};
use rollup_relayer_sender::{AccountPool, AccountPoolConfig, SenderConfig};
use scroll_db::test_utils::setup_test_db;

type TestSender = Sender<Arc<MockChainClient>>;

/// The schedule of a chain that never activates Darwin, batches are finalized one by one.
const PRE_DARWIN: HardforkSchedule = HardforkSchedule {
    bernoulli_block: Some(0),
    curie_block: Some(0),
    darwin_time: None,
    darwin_v2_time: None,
};

struct TestContext {
    client: Arc<MockChainClient>,
    database: Arc<Database>,
    relayer: Relayer<Arc<MockChainClient>>,
    commit_confirmations: mpsc::Receiver<Confirmation>,
    finalize_confirmations: mpsc::Receiver<Confirmation>,
}

async fn sender(
    client: &Arc<MockChainClient>,
    name: &str,
    signers: Vec<PrivateKeySigner>,
    pending_limit: usize,
) -> Arc<TestSender> {
    for signer in &signers {
        client.set_balance(signer.address(), U256::from(10u128.pow(18)));
    }
    let pool_config = AccountPoolConfig { min_balance: U256::from(1_000), ..Default::default() };
    let pool = AccountPool::new(client.clone(), signers, pool_config).await.unwrap();
    let config = SenderConfig {
        name: name.to_string(),
        confirmations: ConfirmationDepth::Latest,
        pending_limit,
        ..Default::default()
    };
    Arc::new(Sender::new(config, client.clone(), Arc::new(pool)).await.unwrap())
}

async fn setup_with(config: RelayerConfig, num_blocks: u64, pending_limit: usize) -> TestContext {
    init_test_tracing();
    let database = Arc::new(setup_test_db().await);
    database.insert_l2_blocks(l2_blocks(0, num_blocks, 100)).await.unwrap();

    let client = Arc::new(MockChainClient::default());
    let commit_sender =
        sender(&client, "commit", vec![PrivateKeySigner::random()], pending_limit).await;
    let finalize_sender =
        sender(&client, "finalize", vec![PrivateKeySigner::random()], pending_limit).await;
    let commit_confirmations = commit_sender.confirmations().unwrap();
    let finalize_confirmations = finalize_sender.confirmations().unwrap();

    let relayer = Relayer::new(config, database.clone(), commit_sender, finalize_sender)
        .await
        .unwrap();
    TestContext { client, database, relayer, commit_confirmations, finalize_confirmations }
}

async fn setup(config: RelayerConfig, num_blocks: u64) -> TestContext {
    setup_with(config, num_blocks, 10).await
}

fn config() -> RelayerConfig {
    RelayerConfig { rollup_contract_address: alloy_primitives::Address::repeat_byte(0xaa), ..Default::default() }
}

impl TestContext {
    /// Proposes one single block batch per block after genesis.
    async fn propose_batches(&self, schedule: HardforkSchedule, count: u64) {
        let chunks = ChunkProposer::new(
            ChunkProposerConfig { max_block_num_per_chunk: 1, ..Default::default() },
            self.database.clone(),
            schedule,
        );
        let batches = BatchProposer::new(
            BatchProposerConfig { max_chunk_num_per_batch: 1, ..Default::default() },
            self.database.clone(),
        );
        for _ in 0..count {
            chunks.try_propose().await.unwrap().unwrap();
            batches.try_propose().await.unwrap().unwrap();
        }
    }

    async fn batch(&self, index: u64) -> Batch {
        self.database.get_batch_by_index(index).await.unwrap().unwrap()
    }

    /// Returns the last transaction sent to the chain.
    fn last_sent(&self) -> TxEnvelope {
        let raw = self.client.sent_transactions().pop().unwrap();
        TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap()
    }

    /// Mines every sent transaction and applies the resulting confirmations.
    async fn confirm_all(&mut self) {
        self.client.mine_all();
        self.relayer.commit_sender.check_pending().await.unwrap();
        self.relayer.finalize_sender.check_pending().await.unwrap();
        while let Ok(confirmation) = self.commit_confirmations.try_recv() {
            self.relayer.handle_confirmation(confirmation).await.unwrap();
        }
        while let Ok(confirmation) = self.finalize_confirmations.try_recv() {
            self.relayer.handle_confirmation(confirmation).await.unwrap();
        }
    }
}

#[tokio::test]
async fn test_genesis_import() {
    let ctx = setup(config(), 3).await;

    let genesis = ctx.batch(0).await;
    assert_eq!(genesis.rollup_status, RollupStatus::Finalized);
    assert_eq!(genesis.proving_status, ProvingStatus::Verified);
    assert_eq!((genesis.start_chunk_index, genesis.end_chunk_index), (0, 0));
    assert_eq!(genesis.parent_batch_hash, B256::ZERO);
    assert_eq!(ctx.database.get_first_unchunked_block_number().await.unwrap(), 1);
    assert_eq!(ctx.database.get_first_unbatched_chunk_index().await.unwrap(), 1);

    // importing twice is a no-op.
    ctx.relayer.initialize_genesis().await.unwrap();
    assert_eq!(ctx.database.get_latest_batch().await.unwrap().unwrap(), genesis);
}

#[tokio::test]
async fn test_missing_genesis_block() {
    init_test_tracing();
    let database = Arc::new(setup_test_db().await);
    let client = Arc::new(MockChainClient::default());
    let commit = sender(&client, "commit", vec![PrivateKeySigner::random()], 10).await;
    let finalize = sender(&client, "finalize", vec![PrivateKeySigner::random()], 10).await;

    let err = Relayer::new(config(), database, commit, finalize).await.unwrap_err();
    assert!(matches!(err, RelayerError::MissingGenesisBlock));
}

#[tokio::test]
async fn test_shared_sender_account() {
    init_test_tracing();
    let database = Arc::new(setup_test_db().await);
    database.insert_l2_blocks(l2_blocks(0, 1, 100)).await.unwrap();
    let client = Arc::new(MockChainClient::default());
    let shared = PrivateKeySigner::random();
    let commit = sender(&client, "commit", vec![shared.clone()], 10).await;
    let finalize =
        sender(&client, "finalize", vec![PrivateKeySigner::random(), shared.clone()], 10).await;

    let err = Relayer::new(config(), database.clone(), commit, finalize).await.unwrap_err();
    assert!(matches!(err, RelayerError::SharedSenderAccount(address) if address == shared.address()));
    // nothing was imported.
    assert!(database.get_latest_batch().await.unwrap().is_none());
}

#[tokio::test]
async fn test_commit_lifecycle() {
    let mut ctx = setup(config(), 3).await;
    ctx.propose_batches(HardforkSchedule::all_active(), 2).await;

    ctx.relayer.process_pending_batches().await.unwrap();
    assert_eq!(ctx.client.send_count(), 2);
    for index in [1, 2] {
        let batch = ctx.batch(index).await;
        assert_eq!(batch.rollup_status, RollupStatus::Committing);
        assert!(batch.commit_tx_hash.is_some());
    }

    let tx = ctx.last_sent();
    assert_eq!(tx.to(), Some(config().rollup_contract_address));
    let call = abi::commitBatchCall::abi_decode(tx.input()).unwrap();
    assert_eq!(call.version, 4);
    assert_eq!(call.parent_batch_header, ctx.batch(1).await.batch_header);
    assert_eq!(call.chunks.len(), 1);
    // a single block per chunk.
    assert_eq!(call.chunks[0][0], 1);

    ctx.confirm_all().await;
    for index in [1, 2] {
        let batch = ctx.batch(index).await;
        assert_eq!(batch.rollup_status, RollupStatus::Committed);
        assert!(batch.committed_at.is_some());
    }

    // committed batches are not resubmitted.
    ctx.relayer.process_pending_batches().await.unwrap();
    assert_eq!(ctx.client.send_count(), 2);
}

#[tokio::test]
async fn test_failed_commit_resubmits_without_gas_floor() {
    let mut ctx = setup(config(), 2).await;
    ctx.propose_batches(HardforkSchedule::all_active(), 1).await;

    ctx.relayer.process_pending_batches().await.unwrap();
    // the estimate of the mock chain scaled by the sender.
    let estimated_gas_limit = 150_000;
    assert!(ctx.last_sent().gas_limit() > estimated_gas_limit);

    ctx.client.set_revert(true);
    ctx.confirm_all().await;
    assert_eq!(ctx.batch(1).await.rollup_status, RollupStatus::CommitFailed);

    ctx.client.set_revert(false);
    ctx.relayer.process_pending_batches().await.unwrap();
    assert_eq!(ctx.client.send_count(), 2);
    assert_eq!(ctx.last_sent().gas_limit(), estimated_gas_limit);
    assert_eq!(ctx.batch(1).await.rollup_status, RollupStatus::Committing);

    ctx.confirm_all().await;
    assert_eq!(ctx.batch(1).await.rollup_status, RollupStatus::Committed);
}

#[tokio::test]
async fn test_full_sender_defers_commit() {
    let ctx = setup_with(config(), 3, 1).await;
    ctx.propose_batches(HardforkSchedule::all_active(), 2).await;

    ctx.relayer.process_pending_batches().await.unwrap();
    assert_eq!(ctx.client.send_count(), 1);
    assert_eq!(ctx.batch(1).await.rollup_status, RollupStatus::Committing);
    assert_eq!(ctx.batch(2).await.rollup_status, RollupStatus::Pending);
}

#[tokio::test]
async fn test_finalize_verified_batch() {
    let mut ctx = setup(config(), 2).await;
    ctx.propose_batches(PRE_DARWIN, 1).await;
    ctx.relayer.process_pending_batches().await.unwrap();
    ctx.confirm_all().await;

    // unproven and no bypass.
    ctx.relayer.process_committed_batches().await.unwrap();
    assert_eq!(ctx.client.send_count(), 1);

    let batch = ctx.batch(1).await;
    let proof = Bytes::from_static(&[0xde, 0xad]);
    ctx.database.update_batch_proof(batch.hash, proof.clone()).await.unwrap();
    ctx.relayer.process_committed_batches().await.unwrap();
    assert_eq!(ctx.client.send_count(), 2);

    let call = abi::finalizeBatchWithProofCall::abi_decode(ctx.last_sent().input()).unwrap();
    assert_eq!(call.batch_header, batch.batch_header);
    assert_eq!(call.prev_state_root, ctx.batch(0).await.state_root);
    assert_eq!(call.post_state_root, batch.state_root);
    assert_eq!(call.aggr_proof, proof);
    assert_eq!(ctx.batch(1).await.rollup_status, RollupStatus::Finalizing);

    ctx.confirm_all().await;
    let batch = ctx.batch(1).await;
    assert_eq!(batch.rollup_status, RollupStatus::Finalized);
    assert!(batch.finalize_tx_hash.is_some());
}

#[tokio::test]
async fn test_finalize_batch_without_proof() {
    let config = RelayerConfig { enable_test_env_bypass_features: true, ..config() };
    let mut ctx = setup(config, 2).await;
    ctx.propose_batches(PRE_DARWIN, 1).await;
    ctx.relayer.process_pending_batches().await.unwrap();
    ctx.confirm_all().await;

    ctx.relayer.process_committed_batches().await.unwrap();
    assert!(abi::finalizeBatchCall::abi_decode(ctx.last_sent().input()).is_ok());
    let batch = ctx.batch(1).await;
    assert_eq!(batch.rollup_status, RollupStatus::Finalizing);
    assert_eq!(batch.proving_status, ProvingStatus::Verified);
}

#[tokio::test]
async fn test_failed_proving_is_not_finalized() {
    let config = RelayerConfig { enable_test_env_bypass_features: true, ..config() };
    let mut ctx = setup(config, 2).await;
    ctx.propose_batches(PRE_DARWIN, 1).await;
    ctx.relayer.process_pending_batches().await.unwrap();
    ctx.confirm_all().await;

    let batch = ctx.batch(1).await;
    ctx.database.update_batch_proving_status(batch.hash, ProvingStatus::Failed).await.unwrap();
    ctx.relayer.process_committed_batches().await.unwrap();
    assert_eq!(ctx.client.send_count(), 1);
    assert_eq!(ctx.batch(1).await.rollup_status, RollupStatus::Committed);
}

#[tokio::test]
async fn test_bundle_lifecycle() {
    let mut ctx = setup(config(), 3).await;
    ctx.propose_batches(HardforkSchedule::all_active(), 2).await;
    ctx.relayer.process_pending_batches().await.unwrap();
    ctx.confirm_all().await;

    // bundled codecs are never finalized batch by batch.
    ctx.relayer.process_committed_batches().await.unwrap();
    assert_eq!(ctx.client.send_count(), 2);

    let bundle = BundleProposer::new(
        BundleProposerConfig { max_batch_num_per_bundle: 10, bundle_timeout_sec: 0, ..Default::default() },
        ctx.database.clone(),
    )
    .try_propose()
    .await
    .unwrap()
    .unwrap();
    assert_eq!((bundle.start_batch_index, bundle.end_batch_index), (1, 2));

    // unproven and no bypass.
    ctx.relayer.process_pending_bundles().await.unwrap();
    assert_eq!(ctx.client.send_count(), 2);

    let proof = Bytes::from_static(&[0xbe, 0xef]);
    ctx.database.update_bundle_proof(bundle.hash, proof.clone()).await.unwrap();
    ctx.relayer.process_pending_bundles().await.unwrap();
    assert_eq!(ctx.client.send_count(), 3);

    let last = ctx.batch(2).await;
    let call = abi::finalizeBundleWithProofCall::abi_decode(ctx.last_sent().input()).unwrap();
    assert_eq!(call.batch_header, last.batch_header);
    assert_eq!(call.post_state_root, last.state_root);
    assert_eq!(call.aggr_proof, proof);
    for index in [1, 2] {
        assert_eq!(ctx.batch(index).await.rollup_status, RollupStatus::Finalizing);
    }

    ctx.confirm_all().await;
    let bundle = ctx.database.get_bundle_by_hash(bundle.hash).await.unwrap().unwrap();
    assert_eq!(bundle.rollup_status, RollupStatus::Finalized);
    for index in [1, 2] {
        assert_eq!(ctx.batch(index).await.rollup_status, RollupStatus::Finalized);
    }
    assert!(ctx.database.get_first_pending_bundle().await.unwrap().is_none());
}

#[tokio::test]
async fn test_finalize_bundle_without_proof() {
    let config = RelayerConfig { enable_test_env_bypass_features: true, ..config() };
    let mut ctx = setup(config, 2).await;
    ctx.propose_batches(HardforkSchedule::all_active(), 1).await;
    ctx.relayer.process_pending_batches().await.unwrap();
    ctx.confirm_all().await;

    let bundle = BundleProposer::new(
        BundleProposerConfig { bundle_timeout_sec: 0, ..Default::default() },
        ctx.database.clone(),
    )
    .try_propose()
    .await
    .unwrap()
    .unwrap();

    ctx.relayer.process_pending_bundles().await.unwrap();
    assert!(abi::finalizeBundleCall::abi_decode(ctx.last_sent().input()).is_ok());

    let bundle = ctx.database.get_bundle_by_hash(bundle.hash).await.unwrap().unwrap();
    assert_eq!(bundle.rollup_status, RollupStatus::Finalizing);
    assert_eq!(bundle.proving_status, ProvingStatus::Verified);
    assert_eq!(ctx.batch(1).await.proving_status, ProvingStatus::Verified);
}

#[tokio::test]
async fn test_uncommitted_bundle_waits() {
    let config = RelayerConfig { enable_test_env_bypass_features: true, ..config() };
    let mut ctx = setup(config, 2).await;
    ctx.propose_batches(HardforkSchedule::all_active(), 1).await;
    BundleProposer::new(
        BundleProposerConfig { bundle_timeout_sec: 0, ..Default::default() },
        ctx.database.clone(),
    )
    .try_propose()
    .await
    .unwrap()
    .unwrap();

    ctx.relayer.process_pending_bundles().await.unwrap();
    assert_eq!(ctx.client.send_count(), 0);

    ctx.relayer.process_pending_batches().await.unwrap();
    ctx.relayer.process_pending_bundles().await.unwrap();
    // the commit is still in flight.
    assert_eq!(ctx.client.send_count(), 1);

    ctx.confirm_all().await;
    ctx.relayer.process_pending_bundles().await.unwrap();
    assert_eq!(ctx.client.send_count(), 2);
}

#[tokio::test]
async fn test_spawn_takes_confirmation_channels() {
    let ctx = setup(config(), 1).await;
    let relayer = Arc::new(ctx.relayer);
    // the test context already owns both channels.
    assert!(matches!(
        relayer.spawn(CancellationToken::new()),
        Err(RelayerError::ConfirmationsTaken("commit"))
    ));
}

#[test]
fn test_commit_calldata_carries_bitmap() {
    let mut batch = Batch {
        index: 1,
        hash: B256::repeat_byte(1),
        data_hash: B256::ZERO,
        parent_batch_hash: B256::ZERO,
        start_chunk_index: 1,
        start_chunk_hash: B256::ZERO,
        end_chunk_index: 1,
        end_chunk_hash: B256::ZERO,
        start_block_number: 1,
        start_block_time: 0,
        end_block_number: 1,
        codec_version: CodecVersion::V1,
        total_l1_messages_popped_before: 0,
        l1_messages_popped: 0,
        total_l1_commit_gas: 0,
        total_l1_commit_calldata_size: 0,
        batch_header: Bytes::from(vec![1u8; BATCH_HEADER_BYTES_SIZE as usize + 32]),
        state_root: B256::ZERO,
        withdraw_root: B256::ZERO,
        rollup_status: RollupStatus::Pending,
        proving_status: ProvingStatus::Unassigned,
        proof: None,
        commit_tx_hash: None,
        finalize_tx_hash: None,
        committed_at: None,
        bundle_hash: None,
    };
    let parent = Batch { index: 0, batch_header: Bytes::from_static(&[7; 89]), ..batch.clone() };

    let data = commit_batch_calldata(&batch, &parent, vec![Bytes::from_static(&[1])]);
    assert_eq!(data[..4], abi::commitBatchCall::SELECTOR);
    let call = abi::commitBatchCall::abi_decode(&data).unwrap();
    assert_eq!(call.version, 1);
    assert_eq!(call.parent_batch_header, parent.batch_header);
    assert_eq!(call.skipped_l1_message_bitmap.len(), 32);

    batch.batch_header = Bytes::from(vec![1u8; BATCH_HEADER_BYTES_SIZE as usize]);
    let call = abi::commitBatchCall::abi_decode(&commit_batch_calldata(&batch, &parent, vec![]))
        .unwrap();
    assert!(call.skipped_l1_message_bitmap.is_empty());
}
