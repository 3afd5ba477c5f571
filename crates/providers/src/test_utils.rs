//! Test utilities for the chain client.

use crate::{
    BlockHeader, ChainClient, ChainClientError, ConfirmationDepth, GasEstimateRequest,
    TransactionReceipt,
};

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

/// The chain id reported by the [`MockChainClient`].
pub const MOCK_CHAIN_ID: u64 = 1337;

/// An in-memory, scriptable [`ChainClient`].
///
/// Broadcast transactions are identified by the hash of their raw encoding and stay pending until
/// they are mined, either explicitly or on broadcast when auto mining is enabled.
#[derive(Debug)]
pub struct MockChainClient {
    state: Mutex<MockChainState>,
}

#[derive(Debug)]
struct MockChainState {
    block_number: u64,
    base_fee: Option<u128>,
    gas_price: u128,
    gas_tip: u128,
    gas_estimate: u64,
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    sent: Vec<Bytes>,
    unmined: Vec<B256>,
    receipts: HashMap<B256, TransactionReceipt>,
    send_errors: VecDeque<ChainClientError>,
    auto_mine: bool,
    mine_on_send_error: bool,
    revert: bool,
    calls: u64,
}

impl Default for MockChainClient {
    fn default() -> Self {
        Self {
            state: Mutex::new(MockChainState {
                block_number: 100,
                base_fee: Some(1_000_000_000),
                gas_price: 1_000_000_000,
                gas_tip: 100_000_000,
                gas_estimate: 100_000,
                balances: HashMap::new(),
                nonces: HashMap::new(),
                sent: Vec::new(),
                unmined: Vec::new(),
                receipts: HashMap::new(),
                send_errors: VecDeque::new(),
                auto_mine: false,
                mine_on_send_error: false,
                revert: false,
                calls: 0,
            }),
        }
    }
}

impl MockChainClient {
    /// Returns a new [`MockChainClient`] which mines every transaction on broadcast.
    pub fn auto_mining() -> Self {
        let client = Self::default();
        client.state.lock().auto_mine = true;
        client
    }

    /// Sets the balance of the address.
    pub fn set_balance(&self, address: Address, balance: U256) {
        self.state.lock().balances.insert(address, balance);
    }

    /// Sets the pending nonce of the address.
    pub fn set_nonce(&self, address: Address, nonce: u64) {
        self.state.lock().nonces.insert(address, nonce);
    }

    /// Sets the base fee of the latest block.
    pub fn set_base_fee(&self, base_fee: Option<u128>) {
        self.state.lock().base_fee = base_fee;
    }

    /// Sets the suggested legacy gas price and priority fee.
    pub fn set_gas_prices(&self, gas_price: u128, gas_tip: u128) {
        let mut state = self.state.lock();
        state.gas_price = gas_price;
        state.gas_tip = gas_tip;
    }

    /// Makes every transaction mined from now on revert.
    pub fn set_revert(&self, revert: bool) {
        self.state.lock().revert = revert;
    }

    /// Queues an error returned by the next broadcast.
    pub fn push_send_error(&self, error: ChainClientError) {
        self.state.lock().send_errors.push_back(error);
    }

    /// Mines every pending transaction before a queued broadcast error is returned, as if the
    /// rejected transaction lost a race against an earlier one.
    pub fn set_mine_on_send_error(&self, mine: bool) {
        self.state.lock().mine_on_send_error = mine;
    }

    /// Advances the chain by `count` empty blocks.
    pub fn advance_blocks(&self, count: u64) {
        self.state.lock().block_number += count;
    }

    /// Mines every pending transaction in a new block and returns their hashes.
    pub fn mine_all(&self) -> Vec<B256> {
        self.state.lock().mine_unmined()
    }

    /// Inserts a receipt for the transaction, whether or not it was broadcast through the client.
    pub fn mine(&self, hash: B256, success: bool) {
        let mut state = self.state.lock();
        state.unmined.retain(|h| *h != hash);
        let block_number = state.block_number;
        state.receipts.insert(hash, TransactionReceipt { tx_hash: hash, block_number, success });
    }

    /// Returns the raw transactions broadcast so far.
    pub fn sent_transactions(&self) -> Vec<Bytes> {
        self.state.lock().sent.clone()
    }

    /// Returns the number of successful broadcasts.
    pub fn send_count(&self) -> usize {
        self.state.lock().sent.len()
    }

    /// Returns the total number of calls made to the client.
    pub fn call_count(&self) -> u64 {
        self.state.lock().calls
    }

    /// Returns the current block number.
    pub fn block_number(&self) -> u64 {
        self.state.lock().block_number
    }

    fn record_call(&self) -> parking_lot::MutexGuard<'_, MockChainState> {
        let mut state = self.state.lock();
        state.calls += 1;
        state
    }
}

impl MockChainState {
    fn mine_unmined(&mut self) -> Vec<B256> {
        self.block_number += 1;
        let hashes = std::mem::take(&mut self.unmined);
        for hash in &hashes {
            self.include(*hash);
        }
        hashes
    }

    fn include(&mut self, hash: B256) {
        let receipt =
            TransactionReceipt { tx_hash: hash, block_number: self.block_number, success: !self.revert };
        self.receipts.insert(hash, receipt);
    }
}

#[async_trait::async_trait]
impl ChainClient for MockChainClient {
    async fn chain_id(&self) -> Result<u64, ChainClientError> {
        let _ = self.record_call();
        Ok(MOCK_CHAIN_ID)
    }

    async fn pending_nonce_at(&self, address: Address) -> Result<u64, ChainClientError> {
        let state = self.record_call();
        Ok(state.nonces.get(&address).copied().unwrap_or_default())
    }

    async fn suggest_gas_price(&self) -> Result<u128, ChainClientError> {
        Ok(self.record_call().gas_price)
    }

    async fn suggest_gas_tip_cap(&self) -> Result<u128, ChainClientError> {
        Ok(self.record_call().gas_tip)
    }

    async fn balance_at(&self, address: Address) -> Result<U256, ChainClientError> {
        let state = self.record_call();
        Ok(state.balances.get(&address).copied().unwrap_or_default())
    }

    async fn latest_header(&self) -> Result<BlockHeader, ChainClientError> {
        let state = self.record_call();
        Ok(BlockHeader { number: state.block_number, base_fee: state.base_fee })
    }

    async fn estimate_gas(&self, _request: GasEstimateRequest) -> Result<u64, ChainClientError> {
        Ok(self.record_call().gas_estimate)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, ChainClientError> {
        let mut state = self.record_call();
        if let Some(err) = state.send_errors.pop_front() {
            if state.mine_on_send_error {
                state.mine_unmined();
            }
            return Err(err);
        }
        let hash = keccak256(&raw);
        state.sent.push(raw);
        if state.auto_mine {
            state.block_number += 1;
            state.include(hash);
        } else {
            state.unmined.push(hash);
        }
        Ok(hash)
    }

    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ChainClientError> {
        let state = self.record_call();
        Ok(state.receipts.get(&hash).copied())
    }

    async fn latest_confirmed_block_number(
        &self,
        depth: ConfirmationDepth,
    ) -> Result<u64, ChainClientError> {
        let state = self.record_call();
        Ok(match depth {
            ConfirmationDepth::BlockDepth(depth) => state.block_number.saturating_sub(depth),
            _ => state.block_number,
        })
    }
}
