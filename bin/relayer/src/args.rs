use crate::constants;

use alloy_primitives::{Address, U256};
use alloy_signer_local::PrivateKeySigner;
use rollup_relayer::RelayerConfig;
use rollup_relayer_primitives::HardforkSchedule;
use rollup_relayer_proposer::{BatchProposerConfig, BundleProposerConfig, ChunkProposerConfig};
use rollup_relayer_providers::ConfirmationDepth;
use rollup_relayer_sender::{AccountPoolConfig, SenderConfig, TxType};
use std::{net::SocketAddr, time::Duration};

/// The rollup relayer command line arguments.
#[derive(Debug, clap::Parser)]
#[command(name = "rollup-relayer", about = "Proposes, commits and finalizes rollup batches on L1")]
pub struct RollupRelayerArgs {
    /// The L1 provider arguments.
    #[command(flatten)]
    pub l1: L1ProviderArgs,
    /// The database arguments.
    #[command(flatten)]
    pub database: DatabaseArgs,
    /// The relayer arguments.
    #[command(flatten)]
    pub relayer: RelayerArgs,
    /// The arguments shared by both senders.
    #[command(flatten)]
    pub sender: SenderArgs,
    /// The chunk proposer arguments.
    #[command(flatten)]
    pub chunk: ChunkProposerArgs,
    /// The batch proposer arguments.
    #[command(flatten)]
    pub batch: BatchProposerArgs,
    /// The bundle proposer arguments.
    #[command(flatten)]
    pub bundle: BundleProposerArgs,
    /// The hardfork schedule of the L2 chain.
    #[command(flatten)]
    pub hardforks: HardforkArgs,
    /// The metrics arguments.
    #[command(flatten)]
    pub metrics: MetricsArgs,
}

/// The L1 provider arguments.
#[derive(Debug, Clone, clap::Args)]
pub struct L1ProviderArgs {
    /// The URL of the L1 RPC endpoint.
    #[arg(long = "l1.url", id = "l1_url", value_name = "L1_URL", env = "ROLLUP_RELAYER_L1_URL")]
    pub url: String,
    /// The compute units per second for the provider.
    #[arg(long = "l1.cups", id = "l1_compute_units_per_second", value_name = "L1_COMPUTE_UNITS_PER_SECOND", default_value_t = constants::PROVIDER_COMPUTE_UNITS_PER_SECOND)]
    pub compute_units_per_second: u64,
    /// The max amount of retries for the provider.
    #[arg(long = "l1.max-retries", id = "l1_max_retries", value_name = "L1_MAX_RETRIES", default_value_t = constants::L1_PROVIDER_MAX_RETRIES)]
    pub max_retries: u32,
    /// The initial backoff for the provider, in milliseconds.
    #[arg(long = "l1.initial-backoff", id = "l1_initial_backoff", value_name = "L1_INITIAL_BACKOFF", default_value_t = constants::L1_PROVIDER_INITIAL_BACKOFF)]
    pub initial_backoff: u64,
}

/// The database arguments.
#[derive(Debug, Clone, clap::Args)]
pub struct DatabaseArgs {
    /// The database url.
    #[arg(long = "db.url", id = "db_url", value_name = "DB_URL", env = "ROLLUP_RELAYER_DB_URL", default_value = constants::DEFAULT_DATABASE_URL)]
    pub url: String,
}

/// The relayer arguments.
#[derive(Debug, Clone, clap::Args)]
pub struct RelayerArgs {
    /// The address of the rollup contract on L1.
    #[arg(long = "relayer.rollup-contract", value_name = "ADDRESS")]
    pub rollup_contract_address: Address,
    /// The comma separated private keys of the commit sender.
    #[arg(
        long = "relayer.commit-keys",
        value_name = "PRIVATE_KEYS",
        env = "ROLLUP_RELAYER_COMMIT_KEYS",
        value_delimiter = ',',
        hide_env_values = true,
        required = true
    )]
    pub commit_keys: Vec<PrivateKeySigner>,
    /// The comma separated private keys of the finalize sender.
    #[arg(
        long = "relayer.finalize-keys",
        value_name = "PRIVATE_KEYS",
        env = "ROLLUP_RELAYER_FINALIZE_KEYS",
        value_delimiter = ',',
        hide_env_values = true,
        required = true
    )]
    pub finalize_keys: Vec<PrivateKeySigner>,
    /// The multiplier applied to the estimated commit gas to obtain the gas limit floor.
    #[arg(long = "relayer.commit-gas-limit-multiplier", default_value_t = constants::DEFAULT_COMMIT_GAS_LIMIT_MULTIPLIER)]
    pub commit_gas_limit_multiplier: f64,
    /// Finalize units without proof once their timeout elapsed. Test networks only.
    #[arg(long = "relayer.test-env-bypass", default_value_t = false)]
    pub enable_test_env_bypass_features: bool,
    /// The time after commitment after which a batch is finalized without proof, in seconds.
    #[arg(long = "relayer.finalize-batch-without-proof-timeout", default_value_t = 0)]
    pub finalize_batch_without_proof_timeout_sec: u64,
    /// The time after proposal after which a bundle is finalized without proof, in seconds.
    #[arg(long = "relayer.finalize-bundle-without-proof-timeout", default_value_t = 0)]
    pub finalize_bundle_without_proof_timeout_sec: u64,
    /// The interval between two relaying rounds, in milliseconds.
    #[arg(long = "relayer.process-interval", default_value_t = constants::DEFAULT_PROCESS_INTERVAL)]
    pub process_interval: u64,
}

impl RelayerArgs {
    /// Returns the [`RelayerConfig`] described by the arguments.
    pub const fn config(&self) -> RelayerConfig {
        RelayerConfig {
            rollup_contract_address: self.rollup_contract_address,
            l1_commit_gas_limit_multiplier: self.commit_gas_limit_multiplier,
            enable_test_env_bypass_features: self.enable_test_env_bypass_features,
            finalize_batch_without_proof_timeout_sec: self.finalize_batch_without_proof_timeout_sec,
            finalize_bundle_without_proof_timeout_sec: self
                .finalize_bundle_without_proof_timeout_sec,
            process_interval: Duration::from_millis(self.process_interval),
        }
    }
}

/// The arguments shared by the commit and the finalize sender.
#[derive(Debug, Clone, clap::Args)]
pub struct SenderArgs {
    /// The type of transactions to build.
    #[arg(long = "sender.tx-type", default_value_t = TxType::DynamicFeeTx)]
    pub tx_type: TxType,
    /// The depth at which a receipt is final: finalized, safe, latest or depth:N.
    #[arg(long = "sender.confirmations", default_value = "finalized")]
    pub confirmations: ConfirmationDepth,
    /// The number of blocks to wait for inclusion before escalating the fees.
    #[arg(long = "sender.escalate-blocks", default_value_t = constants::DEFAULT_ESCALATE_BLOCKS)]
    pub escalate_blocks: u64,
    /// The numerator of the fee escalation ratio.
    #[arg(long = "sender.escalate-multiple-num", default_value_t = 11)]
    pub escalate_multiple_num: u128,
    /// The denominator of the fee escalation ratio.
    #[arg(long = "sender.escalate-multiple-den", default_value_t = 10)]
    pub escalate_multiple_den: u128,
    /// The maximum gas price or fee cap, in wei.
    #[arg(long = "sender.max-gas-price", default_value_t = constants::DEFAULT_MAX_GAS_PRICE)]
    pub max_gas_price: u128,
    /// The minimum gas price or priority fee, in wei.
    #[arg(long = "sender.min-gas-tip", default_value_t = 0)]
    pub min_gas_tip: u128,
    /// The maximum number of in-flight transactions per sender.
    #[arg(long = "sender.pending-limit", default_value_t = constants::DEFAULT_PENDING_LIMIT)]
    pub pending_limit: usize,
    /// The interval at which in-flight transactions are checked, in milliseconds.
    #[arg(long = "sender.check-pending-interval", default_value_t = constants::DEFAULT_CHECK_PENDING_INTERVAL)]
    pub check_pending_interval: u64,
    /// The interval at which account balances are checked, in milliseconds.
    #[arg(long = "sender.check-balance-interval", default_value_t = constants::DEFAULT_CHECK_BALANCE_INTERVAL)]
    pub check_balance_interval: u64,
    /// The balance every sender account is topped up to at start-up, in wei.
    #[arg(long = "sender.min-balance", default_value_t = constants::DEFAULT_MIN_BALANCE)]
    pub min_balance: u128,
}

impl SenderArgs {
    /// Returns the [`SenderConfig`] of the sender with the provided name.
    pub fn config(&self, name: &str) -> SenderConfig {
        SenderConfig {
            name: name.to_string(),
            tx_type: self.tx_type,
            confirmations: self.confirmations,
            escalate_blocks: self.escalate_blocks,
            escalate_multiple_num: self.escalate_multiple_num,
            escalate_multiple_den: self.escalate_multiple_den,
            max_gas_price: self.max_gas_price,
            min_gas_tip: self.min_gas_tip,
            pending_limit: self.pending_limit,
            check_pending_interval: Duration::from_millis(self.check_pending_interval),
            check_balance_interval: Duration::from_millis(self.check_balance_interval),
        }
    }

    /// Returns the [`AccountPoolConfig`] of the sender accounts.
    pub fn account_pool_config(&self) -> AccountPoolConfig {
        AccountPoolConfig { min_balance: U256::from(self.min_balance), ..Default::default() }
    }
}

/// The chunk proposer arguments.
#[derive(Debug, Clone, clap::Args)]
pub struct ChunkProposerArgs {
    /// The interval between two chunk proposals, in milliseconds.
    #[arg(long = "chunk.propose-interval", id = "chunk_propose_interval", default_value_t = constants::DEFAULT_PROPOSE_INTERVAL)]
    pub propose_interval: u64,
    /// The maximum number of blocks in a chunk.
    #[arg(long = "chunk.max-block-num", id = "chunk_max_block_num", default_value_t = constants::DEFAULT_MAX_BLOCK_NUM_PER_CHUNK)]
    pub max_block_num: u64,
    /// The maximum number of transactions in a chunk.
    #[arg(long = "chunk.max-tx-num", id = "chunk_max_tx_num", default_value_t = constants::DEFAULT_MAX_TX_NUM_PER_CHUNK)]
    pub max_tx_num: u64,
    /// The maximum L1 commit gas of a chunk.
    #[arg(long = "chunk.max-l1-commit-gas", id = "chunk_max_l1_commit_gas", default_value_t = constants::DEFAULT_MAX_L1_COMMIT_GAS)]
    pub max_l1_commit_gas: u64,
    /// The maximum L1 commit calldata size of a chunk.
    #[arg(long = "chunk.max-l1-commit-calldata-size", id = "chunk_max_l1_commit_calldata_size", default_value_t = constants::DEFAULT_MAX_L1_COMMIT_CALLDATA_SIZE)]
    pub max_l1_commit_calldata_size: u64,
    /// The maximum row consumption of any sub-circuit for a chunk.
    #[arg(long = "chunk.max-row-consumption", id = "chunk_max_row_consumption", default_value_t = constants::DEFAULT_MAX_ROW_CONSUMPTION_PER_CHUNK)]
    pub max_row_consumption: u64,
    /// The maximum age of the first block of a pending chunk, in seconds.
    #[arg(long = "chunk.timeout", id = "chunk_timeout", default_value_t = constants::DEFAULT_PROPOSER_TIMEOUT)]
    pub timeout: u64,
    /// The multiplier applied to the estimated L1 commit gas.
    #[arg(long = "chunk.gas-cost-increase-multiplier", id = "chunk_gas_cost_increase_multiplier", default_value_t = constants::DEFAULT_GAS_COST_INCREASE_MULTIPLIER)]
    pub gas_cost_increase_multiplier: f64,
    /// The maximum size of the blob payload before compression.
    #[arg(long = "chunk.max-uncompressed-batch-bytes-size", id = "chunk_max_uncompressed_batch_bytes_size", default_value_t = u64::MAX)]
    pub max_uncompressed_batch_bytes_size: u64,
}

impl ChunkProposerArgs {
    /// Returns the [`ChunkProposerConfig`] described by the arguments.
    pub const fn config(&self) -> ChunkProposerConfig {
        ChunkProposerConfig {
            propose_interval: Duration::from_millis(self.propose_interval),
            max_block_num_per_chunk: self.max_block_num,
            max_tx_num_per_chunk: self.max_tx_num,
            max_l1_commit_gas_per_chunk: self.max_l1_commit_gas,
            max_l1_commit_calldata_size_per_chunk: self.max_l1_commit_calldata_size,
            max_row_consumption_per_chunk: self.max_row_consumption,
            chunk_timeout_sec: self.timeout,
            gas_cost_increase_multiplier: self.gas_cost_increase_multiplier,
            max_uncompressed_batch_bytes_size: self.max_uncompressed_batch_bytes_size,
        }
    }
}

/// The batch proposer arguments.
#[derive(Debug, Clone, clap::Args)]
pub struct BatchProposerArgs {
    /// The interval between two batch proposals, in milliseconds.
    #[arg(long = "batch.propose-interval", id = "batch_propose_interval", default_value_t = constants::DEFAULT_PROPOSE_INTERVAL)]
    pub propose_interval: u64,
    /// The maximum number of chunks in a batch, further bounded by the codec.
    #[arg(long = "batch.max-chunk-num", id = "batch_max_chunk_num", default_value_t = constants::DEFAULT_MAX_CHUNK_NUM_PER_BATCH)]
    pub max_chunk_num: u64,
    /// The maximum L1 commit gas of a batch.
    #[arg(long = "batch.max-l1-commit-gas", id = "batch_max_l1_commit_gas", default_value_t = constants::DEFAULT_MAX_L1_COMMIT_GAS)]
    pub max_l1_commit_gas: u64,
    /// The maximum L1 commit calldata size of a batch.
    #[arg(long = "batch.max-l1-commit-calldata-size", id = "batch_max_l1_commit_calldata_size", default_value_t = constants::DEFAULT_MAX_L1_COMMIT_CALLDATA_SIZE)]
    pub max_l1_commit_calldata_size: u64,
    /// The maximum age of the first block of a pending batch, in seconds.
    #[arg(long = "batch.timeout", id = "batch_timeout", default_value_t = constants::DEFAULT_PROPOSER_TIMEOUT)]
    pub timeout: u64,
    /// The multiplier applied to the estimated L1 commit gas.
    #[arg(long = "batch.gas-cost-increase-multiplier", id = "batch_gas_cost_increase_multiplier", default_value_t = constants::DEFAULT_GAS_COST_INCREASE_MULTIPLIER)]
    pub gas_cost_increase_multiplier: f64,
    /// The maximum size of the blob payload before compression.
    #[arg(long = "batch.max-uncompressed-batch-bytes-size", id = "batch_max_uncompressed_batch_bytes_size", default_value_t = u64::MAX)]
    pub max_uncompressed_batch_bytes_size: u64,
}

impl BatchProposerArgs {
    /// Returns the [`BatchProposerConfig`] described by the arguments.
    pub const fn config(&self) -> BatchProposerConfig {
        BatchProposerConfig {
            propose_interval: Duration::from_millis(self.propose_interval),
            max_chunk_num_per_batch: self.max_chunk_num,
            max_l1_commit_gas_per_batch: self.max_l1_commit_gas,
            max_l1_commit_calldata_size_per_batch: self.max_l1_commit_calldata_size,
            batch_timeout_sec: self.timeout,
            gas_cost_increase_multiplier: self.gas_cost_increase_multiplier,
            max_uncompressed_batch_bytes_size: self.max_uncompressed_batch_bytes_size,
        }
    }
}

/// The bundle proposer arguments.
#[derive(Debug, Clone, clap::Args)]
pub struct BundleProposerArgs {
    /// The interval between two bundle proposals, in milliseconds.
    #[arg(long = "bundle.propose-interval", id = "bundle_propose_interval", default_value_t = constants::DEFAULT_PROPOSE_INTERVAL)]
    pub propose_interval: u64,
    /// The maximum number of batches in a bundle.
    #[arg(long = "bundle.max-batch-num", id = "bundle_max_batch_num", default_value_t = constants::DEFAULT_MAX_BATCH_NUM_PER_BUNDLE)]
    pub max_batch_num: u64,
    /// The maximum age of the first block of a pending bundle, in seconds.
    #[arg(long = "bundle.timeout", id = "bundle_timeout", default_value_t = constants::DEFAULT_BUNDLE_TIMEOUT)]
    pub timeout: u64,
}

impl BundleProposerArgs {
    /// Returns the [`BundleProposerConfig`] described by the arguments.
    pub const fn config(&self) -> BundleProposerConfig {
        BundleProposerConfig {
            propose_interval: Duration::from_millis(self.propose_interval),
            max_batch_num_per_bundle: self.max_batch_num,
            bundle_timeout_sec: self.timeout,
        }
    }
}

/// The hardfork schedule arguments. An unset fork is never activated.
#[derive(Debug, Clone, clap::Args)]
pub struct HardforkArgs {
    /// The Bernoulli activation block.
    #[arg(long = "hardforks.bernoulli-block", value_name = "BLOCK")]
    pub bernoulli_block: Option<u64>,
    /// The Curie activation block.
    #[arg(long = "hardforks.curie-block", value_name = "BLOCK")]
    pub curie_block: Option<u64>,
    /// The Darwin activation timestamp.
    #[arg(long = "hardforks.darwin-time", value_name = "TIMESTAMP")]
    pub darwin_time: Option<u64>,
    /// The `DarwinV2` activation timestamp.
    #[arg(long = "hardforks.darwin-v2-time", value_name = "TIMESTAMP")]
    pub darwin_v2_time: Option<u64>,
}

impl HardforkArgs {
    /// Returns the [`HardforkSchedule`] described by the arguments.
    pub const fn schedule(&self) -> HardforkSchedule {
        HardforkSchedule {
            bernoulli_block: self.bernoulli_block,
            curie_block: self.curie_block,
            darwin_time: self.darwin_time,
            darwin_v2_time: self.darwin_v2_time,
        }
    }
}

/// The metrics arguments.
#[derive(Debug, Clone, clap::Args)]
pub struct MetricsArgs {
    /// The address the Prometheus exporter listens on. Metrics are not exported when unset.
    #[arg(long = "metrics.addr", value_name = "SOCKET_ADDR")]
    pub addr: Option<SocketAddr>,
}
