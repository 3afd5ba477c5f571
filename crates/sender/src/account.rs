use crate::{
    transaction::{sign_transaction, UnsignedFields},
    AccountPoolConfig, AccountPoolMetrics, GasFees, SenderError, TxType,
};

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use parking_lot::Mutex;
use rollup_relayer_providers::ChainClient;
use std::{
    collections::VecDeque,
    ops::Deref,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

/// The gas limit of a funding transfer.
const FUNDING_GAS_LIMIT: u64 = 500_000;

/// A signing identity with its locally tracked nonce.
#[derive(Debug)]
pub struct Account {
    signer: PrivateKeySigner,
    nonce: AtomicU64,
}

impl Account {
    /// Returns a new [`Account`] with the provided signer and next nonce.
    pub const fn new(signer: PrivateKeySigner, nonce: u64) -> Self {
        Self { signer, nonce: AtomicU64::new(nonce) }
    }

    /// Returns the address of the account.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Returns the nonce of the next transaction of the account.
    pub fn nonce(&self) -> u64 {
        self.nonce.load(Ordering::Acquire)
    }

    /// Sets the nonce of the next transaction of the account.
    pub fn set_nonce(&self, nonce: u64) {
        self.nonce.store(nonce, Ordering::Release);
    }

    pub(crate) const fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

/// A fixed set of signing identities behind a queue.
///
/// An account is owned exclusively by the holder of its [`AccountLease`] until the lease is
/// dropped.
#[derive(Debug)]
pub struct AccountPool<C> {
    /// The client of the chain the accounts transact on.
    client: C,
    /// The chain id.
    chain_id: u64,
    /// Every account of the pool.
    accounts: Vec<Arc<Account>>,
    /// The accounts available for checkout.
    available: Mutex<VecDeque<Arc<Account>>>,
    /// The pool configuration.
    config: AccountPoolConfig,
    /// The pool metrics.
    metrics: AccountPoolMetrics,
}

impl<C> AccountPool<C> {
    /// Returns the chain id the accounts sign for.
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Returns every account of the pool.
    pub fn accounts(&self) -> &[Arc<Account>] {
        &self.accounts
    }

    /// Returns the minimum balance of an account.
    pub const fn min_balance(&self) -> U256 {
        self.config.min_balance
    }

    /// Checks out an account, or returns [`None`] if every account is in use.
    pub fn acquire(&self) -> Option<AccountLease<'_, C>> {
        let account = self.available.lock().pop_front()?;
        self.metrics.available_accounts.decrement(1.0);
        Some(AccountLease { pool: self, account })
    }

    /// Returns an account to the pool.
    pub fn release(&self, account: Arc<Account>) {
        self.available.lock().push_back(account);
        self.metrics.available_accounts.increment(1.0);
    }
}

impl<C: ChainClient> AccountPool<C> {
    /// Creates a new [`AccountPool`], seeding every nonce from the pending nonce on chain and
    /// funding the accounts below the minimum balance from the richest one.
    pub async fn new(
        client: C,
        signers: Vec<PrivateKeySigner>,
        config: AccountPoolConfig,
    ) -> Result<Self, SenderError> {
        if signers.is_empty() {
            return Err(SenderError::EmptyAccountPool);
        }
        let chain_id = client.chain_id().await?;

        let mut accounts = Vec::with_capacity(signers.len());
        for signer in signers {
            let signer = signer.with_chain_id(Some(chain_id));
            let nonce = client.pending_nonce_at(signer.address()).await?;
            tracing::debug!(target: "scroll::account_pool", address = ?signer.address(), nonce, "loaded account");
            accounts.push(Arc::new(Account::new(signer, nonce)));
        }

        let pool = Self {
            client,
            chain_id,
            available: Mutex::new(accounts.iter().cloned().collect()),
            accounts,
            config,
            metrics: AccountPoolMetrics::default(),
        };
        pool.metrics.available_accounts.set(pool.accounts.len() as f64);
        pool.fund_accounts().await?;

        Ok(pool)
    }

    /// Resets the nonce of the account to its pending nonce on chain.
    pub async fn reset_nonce(&self, account: &Account) {
        match self.client.pending_nonce_at(account.address()).await {
            Ok(nonce) => {
                account.set_nonce(nonce);
                self.metrics.nonce_resets.increment(1);
                tracing::info!(target: "scroll::account_pool", address = ?account.address(), nonce, "reset nonce");
            }
            Err(err) => {
                tracing::warn!(target: "scroll::account_pool", address = ?account.address(), ?err, "failed to reset nonce");
            }
        }
    }

    /// Tops up every account below the minimum balance from the richest account, waits for the
    /// funding transactions to be mined and resets the nonce of the richest account.
    async fn fund_accounts(&self) -> Result<(), SenderError> {
        let mut balances = Vec::with_capacity(self.accounts.len());
        for account in &self.accounts {
            balances.push(self.client.balance_at(account.address()).await?);
        }
        let Some((root_index, root_balance)) =
            balances.iter().enumerate().max_by_key(|(_, balance)| **balance)
        else {
            return Ok(());
        };
        let root = &self.accounts[root_index];

        let under_balance: Vec<_> = self
            .accounts
            .iter()
            .zip(&balances)
            .enumerate()
            .filter(|(i, (_, balance))| *i != root_index && **balance < self.config.min_balance)
            .map(|(_, (account, balance))| (account.address(), self.config.min_balance - *balance))
            .collect();
        if under_balance.is_empty() {
            return Ok(());
        }

        let required = under_balance.iter().fold(U256::ZERO, |acc, (_, amount)| acc + *amount);
        if *root_balance <= required {
            tracing::warn!(target: "scroll::account_pool", root = ?root.address(), ?root_balance, ?required, "insufficient balance to fund accounts");
            return Ok(());
        }

        let gas_price = self.client.suggest_gas_price().await?.saturating_mul(2);
        let mut hashes = Vec::with_capacity(under_balance.len());
        for (address, amount) in under_balance {
            let fields = UnsignedFields {
                chain_id: self.chain_id,
                tx_type: TxType::LegacyTx,
                nonce: root.nonce(),
                gas_limit: FUNDING_GAS_LIMIT,
                fees: GasFees::Legacy { gas_price },
            };
            let (raw, _) = sign_transaction(root, fields, address, amount, Bytes::new())?;
            match self.client.send_raw_transaction(raw).await {
                Ok(hash) => {
                    root.set_nonce(root.nonce() + 1);
                    self.metrics.funding_transactions.increment(1);
                    tracing::info!(target: "scroll::account_pool", from = ?root.address(), to = ?address, ?amount, ?hash, "sent funding transaction");
                    hashes.push(hash);
                }
                Err(err) => {
                    tracing::error!(target: "scroll::account_pool", to = ?address, ?err, "failed to send funding transaction");
                }
            }
        }

        self.wait_for_receipts(hashes).await;
        self.reset_nonce(root).await;
        Ok(())
    }

    async fn wait_for_receipts(&self, mut hashes: Vec<B256>) {
        let deadline = Instant::now() + self.config.funding_timeout;
        while !hashes.is_empty() {
            let mut remaining = Vec::with_capacity(hashes.len());
            for hash in hashes {
                match self.client.transaction_receipt(hash).await {
                    Ok(Some(receipt)) => {
                        tracing::debug!(target: "scroll::account_pool", ?hash, success = receipt.success, "funding transaction mined");
                    }
                    Ok(None) => remaining.push(hash),
                    Err(err) => {
                        tracing::warn!(target: "scroll::account_pool", ?hash, ?err, "failed to fetch funding receipt");
                        remaining.push(hash);
                    }
                }
            }
            hashes = remaining;
            if hashes.is_empty() {
                break;
            }
            if Instant::now() >= deadline {
                tracing::warn!(target: "scroll::account_pool", pending = hashes.len(), "timed out waiting for funding transactions");
                break;
            }
            tokio::time::sleep(self.config.funding_poll_interval).await;
        }
    }
}

/// An account checked out of the [`AccountPool`], returned to the pool on drop.
#[derive(Debug)]
pub struct AccountLease<'a, C> {
    pool: &'a AccountPool<C>,
    account: Arc<Account>,
}

impl<C> AccountLease<'_, C> {
    /// Returns a shared handle to the leased account.
    pub const fn account(&self) -> &Arc<Account> {
        &self.account
    }
}

impl<C> Deref for AccountLease<'_, C> {
    type Target = Account;

    fn deref(&self) -> &Self::Target {
        self.account()
    }
}

impl<C> Drop for AccountLease<'_, C> {
    fn drop(&mut self) {
        self.pool.release(self.account.clone());
    }
}
