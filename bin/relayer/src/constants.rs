/// The max retries for the L1 provider.
pub(crate) const L1_PROVIDER_MAX_RETRIES: u32 = 10;

/// The initial backoff for the L1 provider, in milliseconds.
pub(crate) const L1_PROVIDER_INITIAL_BACKOFF: u64 = 100;

/// The default provider compute units per second.
pub(crate) const PROVIDER_COMPUTE_UNITS_PER_SECOND: u64 = 50;

/// The default database url.
pub(crate) const DEFAULT_DATABASE_URL: &str = "sqlite://rollup-relayer.db?mode=rwc";

/// The default interval between two relaying rounds, in milliseconds.
pub(crate) const DEFAULT_PROCESS_INTERVAL: u64 = 2_000;

/// The default interval between two proposal attempts, in milliseconds.
pub(crate) const DEFAULT_PROPOSE_INTERVAL: u64 = 10_000;

/// The default interval at which in-flight transactions are checked, in milliseconds.
pub(crate) const DEFAULT_CHECK_PENDING_INTERVAL: u64 = 3_000;

/// The default interval at which sender balances are checked, in milliseconds.
pub(crate) const DEFAULT_CHECK_BALANCE_INTERVAL: u64 = 60_000;

/// The default number of blocks after which an unmined transaction is resubmitted.
pub(crate) const DEFAULT_ESCALATE_BLOCKS: u64 = 100;

/// The default maximum number of in-flight transactions per sender.
pub(crate) const DEFAULT_PENDING_LIMIT: usize = 50;

/// The default maximum gas price, in wei.
pub(crate) const DEFAULT_MAX_GAS_PRICE: u128 = 1_000_000_000_000;

/// The default minimum balance of a sender account, in wei.
pub(crate) const DEFAULT_MIN_BALANCE: u128 = 100_000_000_000_000_000_000;

/// The default multiplier applied to the estimated commit gas.
pub(crate) const DEFAULT_COMMIT_GAS_LIMIT_MULTIPLIER: f64 = 1.2;

/// The default multiplier applied to estimated gas by the proposers.
pub(crate) const DEFAULT_GAS_COST_INCREASE_MULTIPLIER: f64 = 1.2;

/// The default maximum number of blocks per chunk.
pub(crate) const DEFAULT_MAX_BLOCK_NUM_PER_CHUNK: u64 = 100;

/// The default maximum number of transactions per chunk.
pub(crate) const DEFAULT_MAX_TX_NUM_PER_CHUNK: u64 = 100;

/// The default maximum L1 commit gas of a chunk or a batch.
pub(crate) const DEFAULT_MAX_L1_COMMIT_GAS: u64 = 5_000_000;

/// The default maximum L1 commit calldata size of a chunk or a batch.
pub(crate) const DEFAULT_MAX_L1_COMMIT_CALLDATA_SIZE: u64 = 123_740;

/// The default maximum row consumption of a chunk.
pub(crate) const DEFAULT_MAX_ROW_CONSUMPTION_PER_CHUNK: u64 = 1_000_000;

/// The default chunk and batch timeout, in seconds.
pub(crate) const DEFAULT_PROPOSER_TIMEOUT: u64 = 300;

/// The default maximum number of chunks per batch.
pub(crate) const DEFAULT_MAX_CHUNK_NUM_PER_BATCH: u64 = 45;

/// The default maximum number of batches per bundle.
pub(crate) const DEFAULT_MAX_BATCH_NUM_PER_BUNDLE: u64 = 30;

/// The default bundle timeout, in seconds.
pub(crate) const DEFAULT_BUNDLE_TIMEOUT: u64 = 36_000;
