//! Helpers running the whole proposal and relaying pipeline against a mock L1.

use alloy_primitives::{Address, U256};
use alloy_signer_local::PrivateKeySigner;
use rollup_relayer::{Relayer, RelayerConfig};
use rollup_relayer_primitives::{
    test_utils::{init_test_tracing, l2_blocks},
    HardforkSchedule,
};
use rollup_relayer_proposer::{
    spawn_proposer, BatchProposer, BatchProposerConfig, BundleProposer, BundleProposerConfig,
    ChunkProposer, ChunkProposerConfig,
};
use rollup_relayer_providers::{test_utils::MockChainClient, ConfirmationDepth};
use rollup_relayer_sender::{AccountPool, AccountPoolConfig, Confirmation, Sender, SenderConfig};
use scroll_db::{test_utils::setup_test_db, Database, DatabaseOperations};
use std::{future::Future, sync::Arc, time::Duration};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

/// The chain client every pipeline component talks to.
pub type TestClient = Arc<MockChainClient>;

/// The interval of every spawned loop.
const TICK: Duration = Duration::from_millis(10);

/// The configuration of a test [`Pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The number of L2 blocks, genesis included.
    pub num_blocks: u64,
    /// The hardfork schedule of the L2 chain.
    pub schedule: HardforkSchedule,
    /// Finalize without proof as soon as a unit is committed or proposed.
    pub bypass_proofs: bool,
    /// Whether the mock chain mines transactions on broadcast.
    pub auto_mine: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_blocks: 9,
            schedule: HardforkSchedule::all_active(),
            bypass_proofs: false,
            auto_mine: false,
        }
    }
}

/// Every component of the relayer, wired to an in-memory database and a mock L1.
#[derive(Debug)]
pub struct Pipeline {
    /// The mock L1.
    pub client: TestClient,
    /// The database.
    pub database: Arc<Database>,
    /// The chunk proposer, two blocks per chunk.
    pub chunk_proposer: Arc<ChunkProposer<HardforkSchedule>>,
    /// The batch proposer, two chunks per batch.
    pub batch_proposer: Arc<BatchProposer>,
    /// The bundle proposer.
    pub bundle_proposer: Arc<BundleProposer>,
    /// The commit sender.
    pub commit_sender: Arc<Sender<TestClient>>,
    /// The finalize sender.
    pub finalize_sender: Arc<Sender<TestClient>>,
    /// The relayer.
    pub relayer: Arc<Relayer<TestClient>>,
}

/// The confirmation channels of both senders, when the relayer loop is not running.
#[derive(Debug)]
pub struct Confirmations {
    commit: mpsc::Receiver<Confirmation>,
    finalize: mpsc::Receiver<Confirmation>,
}

impl Pipeline {
    /// Builds a pipeline over `config.num_blocks` stored L2 blocks.
    pub async fn new(config: PipelineConfig) -> eyre::Result<Self> {
        init_test_tracing();
        let database = Arc::new(setup_test_db().await);
        database.insert_l2_blocks(l2_blocks(0, config.num_blocks, 100)).await?;

        let client = Arc::new(if config.auto_mine {
            MockChainClient::auto_mining()
        } else {
            MockChainClient::default()
        });
        let commit_sender = sender(&client, "commit").await?;
        let finalize_sender = sender(&client, "finalize").await?;

        let relayer_config = RelayerConfig {
            rollup_contract_address: Address::repeat_byte(0x11),
            enable_test_env_bypass_features: config.bypass_proofs,
            process_interval: TICK,
            ..Default::default()
        };
        let relayer = Arc::new(
            Relayer::new(
                relayer_config,
                database.clone(),
                commit_sender.clone(),
                finalize_sender.clone(),
            )
            .await?,
        );

        let chunk_proposer = Arc::new(ChunkProposer::new(
            ChunkProposerConfig {
                propose_interval: TICK,
                max_block_num_per_chunk: 2,
                chunk_timeout_sec: 0,
                ..Default::default()
            },
            database.clone(),
            config.schedule,
        ));
        let batch_proposer = Arc::new(BatchProposer::new(
            BatchProposerConfig {
                propose_interval: TICK,
                max_chunk_num_per_batch: 2,
                batch_timeout_sec: 0,
                ..Default::default()
            },
            database.clone(),
        ));
        let bundle_proposer = Arc::new(BundleProposer::new(
            BundleProposerConfig { propose_interval: TICK, bundle_timeout_sec: 0, ..Default::default() },
            database.clone(),
        ));

        Ok(Self {
            client,
            database,
            chunk_proposer,
            batch_proposer,
            bundle_proposer,
            commit_sender,
            finalize_sender,
            relayer,
        })
    }

    /// Runs every proposer until it has nothing left to propose.
    pub async fn propose_all(&self) -> eyre::Result<()> {
        while self.chunk_proposer.try_propose().await?.is_some() {}
        while self.batch_proposer.try_propose().await?.is_some() {}
        while self.bundle_proposer.try_propose().await?.is_some() {}
        Ok(())
    }

    /// Takes the confirmation channels of both senders, to be drained by
    /// [`Pipeline::mine_and_confirm`].
    pub fn confirmations(&self) -> eyre::Result<Confirmations> {
        let commit = self
            .commit_sender
            .confirmations()
            .ok_or_else(|| eyre::eyre!("commit confirmations taken"))?;
        let finalize = self
            .finalize_sender
            .confirmations()
            .ok_or_else(|| eyre::eyre!("finalize confirmations taken"))?;
        Ok(Confirmations { commit, finalize })
    }

    /// Mines every broadcast transaction and hands the resulting confirmations to the relayer,
    /// returning their number.
    pub async fn mine_and_confirm(&self, confirmations: &mut Confirmations) -> eyre::Result<usize> {
        self.client.mine_all();
        self.commit_sender.check_pending().await?;
        self.finalize_sender.check_pending().await?;

        let mut count = 0;
        while let Ok(confirmation) = confirmations.commit.try_recv() {
            self.relayer.handle_confirmation(confirmation).await?;
            count += 1;
        }
        while let Ok(confirmation) = confirmations.finalize.try_recv() {
            self.relayer.handle_confirmation(confirmation).await?;
            count += 1;
        }
        Ok(count)
    }

    /// Spawns every loop of the pipeline.
    pub fn spawn(&self, shutdown: &CancellationToken) -> eyre::Result<Vec<JoinHandle<()>>> {
        Ok(vec![
            self.commit_sender.spawn(shutdown.clone()),
            self.finalize_sender.spawn(shutdown.clone()),
            self.relayer.spawn(shutdown.clone())?,
            spawn_proposer(self.chunk_proposer.clone(), TICK, shutdown.clone()),
            spawn_proposer(self.batch_proposer.clone(), TICK, shutdown.clone()),
            spawn_proposer(self.bundle_proposer.clone(), TICK, shutdown.clone()),
        ])
    }
}

async fn sender(client: &TestClient, name: &str) -> eyre::Result<Arc<Sender<TestClient>>> {
    let signer = PrivateKeySigner::random();
    client.set_balance(signer.address(), U256::from(10u128.pow(18)));
    let pool_config = AccountPoolConfig { min_balance: U256::from(1_000), ..Default::default() };
    let pool = AccountPool::new(client.clone(), vec![signer], pool_config).await?;
    let config = SenderConfig {
        name: name.to_string(),
        confirmations: ConfirmationDepth::Latest,
        check_pending_interval: TICK,
        ..Default::default()
    };
    Ok(Arc::new(Sender::new(config, client.clone(), Arc::new(pool)).await?))
}

/// Polls `condition` until it holds, failing after `timeout`.
pub async fn wait_for<F, Fut>(mut condition: F, timeout: Duration) -> eyre::Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = eyre::Result<bool>>,
{
    let start = tokio::time::Instant::now();
    while !condition().await? {
        if start.elapsed() > timeout {
            eyre::bail!("condition not met after {timeout:?}");
        }
        tokio::time::sleep(TICK).await;
    }
    Ok(())
}
