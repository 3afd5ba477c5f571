use crate::ChainClientError;

use alloy_primitives::{Address, Bytes, B256, U256};
use std::{fmt, str::FromStr};

/// The subset of a block header the sender needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockHeader {
    /// The block number.
    pub number: u64,
    /// The base fee of the block, absent before London.
    pub base_fee: Option<u128>,
}

/// The outcome of an included transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// The hash of the transaction.
    pub tx_hash: B256,
    /// The number of the block including the transaction.
    pub block_number: u64,
    /// Whether the transaction succeeded.
    pub success: bool,
}

/// The parameters of a gas estimation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GasEstimateRequest {
    /// The sender.
    pub from: Address,
    /// The target.
    pub to: Address,
    /// The value transferred.
    pub value: U256,
    /// The calldata.
    pub data: Bytes,
}

/// The depth at which a block is considered confirmed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationDepth {
    /// The latest finalized block.
    #[default]
    Finalized,
    /// The latest safe block.
    Safe,
    /// The latest block.
    Latest,
    /// The block `n` blocks behind the latest block.
    BlockDepth(u64),
}

impl FromStr for ConfirmationDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("finalized") {
            Ok(Self::Finalized)
        } else if s.eq_ignore_ascii_case("safe") {
            Ok(Self::Safe)
        } else if s.eq_ignore_ascii_case("latest") {
            Ok(Self::Latest)
        } else if let Some(rest) = s.strip_prefix("depth:") {
            rest.parse::<u64>()
                .map(Self::BlockDepth)
                .map_err(|_| format!("Expected a valid number after 'depth:', got '{rest}'"))
        } else {
            Err("Expected 'finalized', 'safe', 'latest' or 'depth:{number}' (e.g. 'depth:6')"
                .to_string())
        }
    }
}

impl fmt::Display for ConfirmationDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finalized => write!(f, "finalized"),
            Self::Safe => write!(f, "safe"),
            Self::Latest => write!(f, "latest"),
            Self::BlockDepth(depth) => write!(f, "depth:{depth}"),
        }
    }
}

/// A client of the base chain node the rollup transactions are delivered to.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait ChainClient: Send + Sync {
    /// Returns the chain id.
    async fn chain_id(&self) -> Result<u64, ChainClientError>;

    /// Returns the nonce of the next transaction of `address`, pending transactions included.
    async fn pending_nonce_at(&self, address: Address) -> Result<u64, ChainClientError>;

    /// Returns the suggested legacy gas price.
    async fn suggest_gas_price(&self) -> Result<u128, ChainClientError>;

    /// Returns the suggested priority fee.
    async fn suggest_gas_tip_cap(&self) -> Result<u128, ChainClientError>;

    /// Returns the balance of `address` at the latest block.
    async fn balance_at(&self, address: Address) -> Result<U256, ChainClientError>;

    /// Returns the header of the latest block.
    async fn latest_header(&self) -> Result<BlockHeader, ChainClientError>;

    /// Estimates the gas used by the call.
    async fn estimate_gas(&self, request: GasEstimateRequest) -> Result<u64, ChainClientError>;

    /// Broadcasts a signed, EIP-2718 encoded transaction and returns its hash.
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, ChainClientError>;

    /// Returns the receipt of the transaction, if it was included.
    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ChainClientError>;

    /// Returns the number of the latest block considered confirmed at `depth`.
    async fn latest_confirmed_block_number(
        &self,
        depth: ConfirmationDepth,
    ) -> Result<u64, ChainClientError>;
}
