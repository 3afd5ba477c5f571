//! The rollup relayer binary, wiring the proposers, the senders and the relayer together.

mod args;
pub use args::{
    BatchProposerArgs, BundleProposerArgs, ChunkProposerArgs, DatabaseArgs, HardforkArgs,
    L1ProviderArgs, MetricsArgs, RelayerArgs, RollupRelayerArgs, SenderArgs,
};

mod constants;

use alloy_provider::ProviderBuilder;
use alloy_rpc_client::RpcClient;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::layers::RetryBackoffLayer;
use metrics_exporter_prometheus::PrometheusBuilder;
use rollup_relayer::Relayer;
use rollup_relayer_proposer::{spawn_proposer, BatchProposer, BundleProposer, ChunkProposer};
use rollup_relayer_providers::{AlloyChainClient, ChainClient};
use rollup_relayer_sender::{AccountPool, AccountPoolConfig, Sender, SenderConfig};
use scroll_db::{Database, DatabaseConnectionProvider};
use scroll_migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs the rollup relayer until ctrl-c is received.
pub async fn run(args: RollupRelayerArgs) -> eyre::Result<()> {
    tracing::info!(target: "scroll::relayer", "starting rollup relayer");

    if let Some(addr) = args.metrics.addr {
        PrometheusBuilder::new().with_http_listener(addr).install()?;
        tracing::info!(target: "scroll::relayer", %addr, "serving metrics");
    }

    let database = Arc::new(Database::new(&args.database.url).await?);
    Migrator::up(database.get_connection(), None).await?;

    let L1ProviderArgs { url, compute_units_per_second, max_retries, initial_backoff } = args.l1;
    let client = RpcClient::builder()
        .layer(RetryBackoffLayer::new(max_retries, initial_backoff, compute_units_per_second))
        .connect(&url)
        .await?;
    let client = Arc::new(AlloyChainClient::new(ProviderBuilder::new().connect_client(client)));

    let pool_config = args.sender.account_pool_config();
    let commit_sender = sender(
        client.clone(),
        args.sender.config("commit"),
        args.relayer.commit_keys.clone(),
        pool_config.clone(),
    )
    .await?;
    let finalize_sender = sender(
        client.clone(),
        args.sender.config("finalize"),
        args.relayer.finalize_keys.clone(),
        pool_config,
    )
    .await?;

    let relayer = Arc::new(
        Relayer::new(
            args.relayer.config(),
            database.clone(),
            commit_sender.clone(),
            finalize_sender.clone(),
        )
        .await?,
    );

    let shutdown = CancellationToken::new();
    let chunk_config = args.chunk.config();
    let batch_config = args.batch.config();
    let bundle_config = args.bundle.config();
    let handles = vec![
        commit_sender.spawn(shutdown.clone()),
        finalize_sender.spawn(shutdown.clone()),
        relayer.spawn(shutdown.clone())?,
        spawn_proposer(
            Arc::new(ChunkProposer::new(
                chunk_config.clone(),
                database.clone(),
                args.hardforks.schedule(),
            )),
            chunk_config.propose_interval,
            shutdown.clone(),
        ),
        spawn_proposer(
            Arc::new(BatchProposer::new(batch_config.clone(), database.clone())),
            batch_config.propose_interval,
            shutdown.clone(),
        ),
        spawn_proposer(
            Arc::new(BundleProposer::new(bundle_config.clone(), database)),
            bundle_config.propose_interval,
            shutdown.clone(),
        ),
    ];

    tokio::signal::ctrl_c().await?;
    tracing::info!(target: "scroll::relayer", "received ctrl-c, shutting down");
    shutdown.cancel();
    for handle in handles {
        handle.await?;
    }

    Ok(())
}

/// Loads the account pool of a sender and returns the sender.
async fn sender<C: ChainClient + Clone + 'static>(
    client: C,
    config: SenderConfig,
    signers: Vec<PrivateKeySigner>,
    pool_config: AccountPoolConfig,
) -> eyre::Result<Arc<Sender<C>>> {
    let pool = AccountPool::new(client.clone(), signers, pool_config).await?;
    Ok(Arc::new(Sender::new(config, client, Arc::new(pool)).await?))
}
