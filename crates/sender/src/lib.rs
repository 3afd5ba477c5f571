//! A library delivering rollup transactions to the base chain.
//!
//! The [`Sender`] signs submissions with accounts checked out of an [`AccountPool`], tracks them
//! until a receipt is final, escalates the fees of stuck transactions and emits a single
//! [`Confirmation`] per submission.

use alloy_primitives::B256;
use parking_lot::Mutex;
use rollup_relayer_providers::{ChainClient, GasEstimateRequest};
use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

mod account;
pub use account::{Account, AccountLease, AccountPool};

mod config;
pub use config::{AccountPoolConfig, SenderConfig, TxType};

mod error;
pub use error::SenderError;

mod fee;
pub use fee::{EscalationPolicy, GasFees};

mod metrics;
pub use metrics::{AccountPoolMetrics, SenderMetrics};

mod transaction;
pub use transaction::{Confirmation, SubmissionKind, TxContext, TxRequest};
use transaction::{sign_transaction, PendingTransaction, UnsignedFields};

/// The capacity of the confirmation channel.
pub const CONFIRMATION_CHANNEL_CAPACITY: usize = 128;

/// The in-flight transactions of the sender.
#[derive(Debug, Default)]
struct PendingPool {
    /// Broadcast transactions by id.
    transactions: HashMap<String, PendingTransaction>,
    /// Ids of submissions which are being broadcast.
    reserved: HashSet<String>,
}

impl PendingPool {
    fn len(&self) -> usize {
        self.transactions.len() + self.reserved.len()
    }
}

/// Delivers transactions to the base chain and reports their terminal outcome.
#[derive(Debug)]
pub struct Sender<C> {
    /// The sender configuration.
    config: SenderConfig,
    /// The chain client.
    client: C,
    /// The signing accounts.
    pool: Arc<AccountPool<C>>,
    /// The in-flight transactions.
    pending: Mutex<PendingPool>,
    /// The latest observed block number.
    block_number: AtomicU64,
    /// The latest observed base fee.
    base_fee: Mutex<u128>,
    /// The confirmation channel.
    confirmation_tx: mpsc::Sender<Confirmation>,
    /// The receiving half of the confirmation channel, until taken.
    confirmation_rx: Mutex<Option<mpsc::Receiver<Confirmation>>>,
    /// The sender metrics.
    metrics: SenderMetrics,
}

impl<C: ChainClient + 'static> Sender<C> {
    /// Returns a new [`Sender`] with the provided configuration, client and account pool.
    pub async fn new(
        config: SenderConfig,
        client: C,
        pool: Arc<AccountPool<C>>,
    ) -> Result<Self, SenderError> {
        config.validate()?;
        let header = client.latest_header().await?;
        let (confirmation_tx, confirmation_rx) = mpsc::channel(CONFIRMATION_CHANNEL_CAPACITY);
        let metrics = SenderMetrics::new_with_labels(&[("sender", config.name.clone())]);

        Ok(Self {
            config,
            client,
            pool,
            pending: Mutex::new(PendingPool::default()),
            block_number: AtomicU64::new(header.number),
            base_fee: Mutex::new(header.base_fee.unwrap_or_default()),
            confirmation_tx,
            confirmation_rx: Mutex::new(Some(confirmation_rx)),
            metrics,
        })
    }

    /// Spawns the reconciliation loop of the sender onto the tokio runtime.
    pub fn spawn(self: &Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.clone().run(shutdown))
    }

    /// Takes the receiving half of the confirmation channel, or returns [`None`] if it was
    /// already taken.
    ///
    /// The channel is bounded and must be drained promptly, the reconciliation loop waits on it.
    pub fn confirmations(&self) -> Option<mpsc::Receiver<Confirmation>> {
        self.confirmation_rx.lock().take()
    }

    /// Returns the number of in-flight transactions.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Returns the maximum number of in-flight transactions.
    pub const fn pending_limit(&self) -> usize {
        self.config.pending_limit
    }

    /// Returns true if no further transaction can be submitted until one is confirmed.
    pub fn is_full(&self) -> bool {
        self.pending_count() >= self.pending_limit()
    }

    /// Returns the account pool of the sender.
    pub fn account_pool(&self) -> &AccountPool<C> {
        &self.pool
    }

    /// Signs and broadcasts the transaction and tracks it until its receipt is final.
    pub async fn submit(&self, request: TxRequest) -> Result<B256, SenderError> {
        let start = Instant::now();
        {
            let mut pending = self.pending.lock();
            if pending.len() >= self.config.pending_limit {
                return Err(SenderError::PendingPoolFull);
            }
            if pending.transactions.contains_key(&request.id) ||
                !pending.reserved.insert(request.id.clone())
            {
                return Err(SenderError::DuplicateId(request.id));
            }
        }

        let res = self.sign_and_send(&request).await;
        let mut pending = self.pending.lock();
        pending.reserved.remove(&request.id);
        let record = match res {
            Ok(record) => record,
            Err(err) => {
                self.metrics.send_failures.increment(1);
                return Err(err);
            }
        };

        let hash = record.tx_hash;
        tracing::info!(target: "scroll::sender", id = %request.id, ?hash, nonce = record.nonce, from = ?record.account.address(), "sent transaction");
        pending.transactions.insert(request.id, record);
        self.metrics.pending_transactions.set(pending.len() as f64);
        self.metrics.sent_transactions.increment(1);
        self.metrics.submit_duration.record(start.elapsed().as_secs_f64());

        Ok(hash)
    }

    /// Checks out an account and runs the read nonce, sign, broadcast and bump nonce sequence
    /// while holding it.
    async fn sign_and_send(&self, request: &TxRequest) -> Result<PendingTransaction, SenderError> {
        let lease = self.pool.acquire().ok_or(SenderError::NoAvailableAccount)?;
        let (gas_limit, fees) = self.estimate_fees(&lease, request).await?;

        let nonce = lease.nonce();
        let fields = UnsignedFields {
            chain_id: self.pool.chain_id(),
            tx_type: self.config.tx_type,
            nonce,
            gas_limit,
            fees,
        };
        let (raw, _) =
            sign_transaction(&lease, fields, request.to, request.value, request.data.clone())?;
        let tx_hash = match self.client.send_raw_transaction(raw).await {
            Ok(hash) => hash,
            Err(err) => {
                tracing::error!(target: "scroll::sender", id = %request.id, nonce, ?err, "failed to send transaction");
                if err.is_nonce_conflict() {
                    self.pool.reset_nonce(&lease).await;
                }
                return Err(err.into());
            }
        };
        lease.set_nonce(nonce + 1);

        Ok(PendingTransaction {
            request: request.clone(),
            account: lease.account().clone(),
            nonce,
            gas_limit,
            fees,
            tx_hash,
            submit_block: self.block_number.load(Ordering::Acquire),
        })
    }

    /// Returns the gas limit and initial fees of the transaction.
    async fn estimate_fees(
        &self,
        account: &Account,
        request: &TxRequest,
    ) -> Result<(u64, GasFees), SenderError> {
        let estimate = GasEstimateRequest {
            from: account.address(),
            to: request.to,
            value: request.value,
            data: request.data.clone(),
        };
        let gas_limit = match self.client.estimate_gas(estimate).await {
            Ok(gas) => (gas.saturating_mul(3) / 2).max(request.min_gas_limit),
            Err(err) if request.min_gas_limit > 0 => {
                tracing::warn!(target: "scroll::sender", id = %request.id, ?err, fallback = request.min_gas_limit, "gas estimation failed, using fallback gas limit");
                request.min_gas_limit
            }
            Err(err) => return Err(err.into()),
        };

        let fees = match self.config.tx_type {
            TxType::LegacyTx | TxType::AccessListTx => GasFees::legacy(
                self.client.suggest_gas_price().await?,
                self.config.min_gas_tip,
                self.config.max_gas_price,
            ),
            TxType::DynamicFeeTx => GasFees::dynamic(
                self.client.suggest_gas_tip_cap().await?,
                *self.base_fee.lock(),
                self.config.min_gas_tip,
                self.config.max_gas_price,
            ),
        };
        Ok((gas_limit, fees))
    }

    /// Reconciles every in-flight transaction against the chain.
    ///
    /// A transaction whose receipt is at or below the confirmed block is removed and confirmed,
    /// a transaction still unmined after the escalation window is resubmitted with higher fees.
    pub async fn check_pending(&self) -> Result<(), SenderError> {
        let header = self.client.latest_header().await?;
        self.block_number.store(header.number, Ordering::Release);
        if let Some(base_fee) = header.base_fee {
            *self.base_fee.lock() = base_fee;
        }
        let confirmed = self.client.latest_confirmed_block_number(self.config.confirmations).await?;

        let snapshot: Vec<_> = self.pending.lock().transactions.values().cloned().collect();
        for pending in snapshot {
            match self.client.transaction_receipt(pending.tx_hash).await {
                Ok(Some(receipt)) if receipt.block_number <= confirmed => {
                    self.confirm(&pending, receipt.success, receipt.tx_hash).await;
                }
                Ok(Some(_)) => {}
                Ok(None) if pending.submit_block + self.config.escalate_blocks < header.number => {
                    self.resubmit(pending, header.number, header.base_fee.unwrap_or_default())
                        .await;
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(target: "scroll::sender", id = %pending.request.id, hash = ?pending.tx_hash, ?err, "failed to fetch receipt");
                }
            }
        }
        Ok(())
    }

    /// Removes the transaction from the pool and emits its confirmation.
    async fn confirm(&self, pending: &PendingTransaction, success: bool, tx_hash: B256) {
        let removed = {
            let mut pool = self.pending.lock();
            let removed = pool.transactions.remove(&pending.request.id).is_some();
            self.metrics.pending_transactions.set(pool.len() as f64);
            removed
        };
        if !removed {
            return;
        }

        if success {
            self.metrics.confirmed_successful_transactions.increment(1);
        } else {
            self.metrics.confirmed_failed_transactions.increment(1);
        }
        tracing::info!(target: "scroll::sender", id = %pending.request.id, ?tx_hash, success, "transaction confirmed");

        let confirmation = Confirmation {
            id: pending.request.id.clone(),
            context: pending.request.context,
            success,
            tx_hash,
        };
        if self.confirmation_tx.send(confirmation).await.is_err() {
            tracing::warn!(target: "scroll::sender", id = %pending.request.id, "confirmation channel closed");
        }
    }

    /// Rebroadcasts the transaction with the same nonce and escalated fees.
    async fn resubmit(&self, pending: PendingTransaction, block_number: u64, base_fee: u128) {
        let policy = EscalationPolicy {
            multiple_num: self.config.escalate_multiple_num,
            multiple_den: self.config.escalate_multiple_den,
            max_gas_price: self.config.max_gas_price,
        };
        let fees = pending.fees.escalate(&policy, base_fee);
        let fields = UnsignedFields {
            chain_id: self.pool.chain_id(),
            tx_type: self.config.tx_type,
            nonce: pending.nonce,
            gas_limit: pending.gas_limit,
            fees,
        };
        let request = &pending.request;
        let raw = match sign_transaction(
            &pending.account,
            fields,
            request.to,
            request.value,
            request.data.clone(),
        ) {
            Ok((raw, _)) => raw,
            Err(err) => {
                tracing::error!(target: "scroll::sender", id = %request.id, ?err, "failed to sign resubmitted transaction");
                return;
            }
        };

        match self.client.send_raw_transaction(raw).await {
            Ok(tx_hash) => {
                tracing::info!(target: "scroll::sender", id = %request.id, old_hash = ?pending.tx_hash, new_hash = ?tx_hash, ?fees, "resubmitted transaction");
                self.metrics.resubmitted_transactions.increment(1);
                if let Some(record) = self.pending.lock().transactions.get_mut(&request.id) {
                    record.fees = fees;
                    record.tx_hash = tx_hash;
                    record.submit_block = block_number;
                }
            }
            Err(err) if err.is_nonce_conflict() => {
                // the nonce was consumed, most likely by the previous broadcast.
                self.metrics.resubmit_nonce_conflicts.increment(1);
                match self.client.transaction_receipt(pending.tx_hash).await {
                    Ok(Some(receipt)) => {
                        self.confirm(&pending, receipt.success, receipt.tx_hash).await;
                    }
                    res => {
                        tracing::error!(target: "scroll::sender", id = %request.id, hash = ?pending.tx_hash, ?res, "nonce consumed by an unknown transaction, dropping pending transaction");
                        let mut pool = self.pending.lock();
                        pool.transactions.remove(&request.id);
                        self.metrics.pending_transactions.set(pool.len() as f64);
                    }
                }
            }
            Err(err) => {
                tracing::error!(target: "scroll::sender", id = %request.id, hash = ?pending.tx_hash, ?err, "failed to resubmit transaction");
            }
        }
    }

    /// Counts and reports the accounts below the minimum balance.
    pub async fn check_balance(&self) -> Result<usize, SenderError> {
        let min_balance = self.pool.min_balance();
        let mut under_balance = 0;
        for account in self.pool.accounts() {
            let balance = self.client.balance_at(account.address()).await?;
            if balance < min_balance {
                under_balance += 1;
                tracing::warn!(target: "scroll::sender", address = ?account.address(), ?balance, ?min_balance, "account balance below minimum");
            }
        }
        self.metrics.under_balance_accounts.set(under_balance as f64);
        Ok(under_balance)
    }

    /// Execution loop for the sender.
    async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        let mut check_pending = tokio::time::interval(self.config.check_pending_interval);
        let mut check_balance = tokio::time::interval(self.config.check_balance_interval);
        check_pending.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        check_balance.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    tracing::info!(target: "scroll::sender", name = %self.config.name, "shutting down sender");
                    break;
                }
                _ = check_pending.tick() => {
                    if let Err(err) = self.check_pending().await {
                        tracing::error!(target: "scroll::sender", ?err, "failed to check pending transactions");
                    }
                }
                _ = check_balance.tick() => {
                    if let Err(err) = self.check_balance().await {
                        tracing::error!(target: "scroll::sender", ?err, "failed to check balances");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
impl<C> Sender<C> {
    fn pending_fees(&self, id: &str) -> Option<GasFees> {
        self.pending.lock().transactions.get(id).map(|tx| tx.fees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bytes, U256};
    use alloy_signer_local::PrivateKeySigner;
    use rollup_relayer_primitives::test_utils::init_test_tracing;
    use rollup_relayer_providers::{test_utils::MockChainClient, ChainClientError};
    use std::time::Duration;

    const ESCALATE_BLOCKS: u64 = 3;

    async fn setup(
        accounts: usize,
        config: SenderConfig,
    ) -> (Arc<MockChainClient>, Sender<Arc<MockChainClient>>) {
        init_test_tracing();
        let client = Arc::new(MockChainClient::default());
        let signers: Vec<_> = (0..accounts).map(|_| PrivateKeySigner::random()).collect();
        for signer in &signers {
            client.set_balance(signer.address(), U256::from(1_000_000));
        }
        let pool_config = AccountPoolConfig {
            min_balance: U256::from(1_000),
            funding_timeout: Duration::from_millis(10),
            funding_poll_interval: Duration::from_millis(1),
        };
        let pool = AccountPool::new(client.clone(), signers, pool_config).await.unwrap();
        let sender = Sender::new(config, client.clone(), Arc::new(pool)).await.unwrap();
        (client, sender)
    }

    fn test_config() -> SenderConfig {
        SenderConfig {
            confirmations: rollup_relayer_providers::ConfirmationDepth::Latest,
            escalate_blocks: ESCALATE_BLOCKS,
            pending_limit: 4,
            ..Default::default()
        }
    }

    fn request(id: &str) -> TxRequest {
        TxRequest {
            id: id.to_string(),
            context: TxContext { kind: SubmissionKind::CommitBatch, unit_hash: B256::ZERO },
            to: Address::repeat_byte(0x42),
            value: U256::ZERO,
            data: Bytes::from_static(&[1, 2, 3]),
            min_gas_limit: 0,
        }
    }

    #[tokio::test]
    async fn test_submit_and_confirm() {
        let (client, sender) = setup(1, test_config()).await;
        let mut confirmations = sender.confirmations().unwrap();
        assert!(sender.confirmations().is_none());

        let hash = sender.submit(request("a")).await.unwrap();
        assert_eq!(sender.pending_count(), 1);
        assert_eq!(sender.account_pool().accounts()[0].nonce(), 1);

        // not mined yet, nothing is emitted.
        sender.check_pending().await.unwrap();
        assert!(confirmations.try_recv().is_err());

        client.mine_all();
        sender.check_pending().await.unwrap();
        let confirmation = confirmations.try_recv().unwrap();
        assert_eq!(confirmation.id, "a");
        assert_eq!(confirmation.tx_hash, hash);
        assert!(confirmation.success);
        assert_eq!(confirmation.context.kind, SubmissionKind::CommitBatch);
        assert_eq!(sender.pending_count(), 0);

        // a confirmation is emitted once.
        sender.check_pending().await.unwrap();
        assert!(confirmations.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_reverted_transaction_confirmation() {
        let (client, sender) = setup(1, test_config()).await;
        let mut confirmations = sender.confirmations().unwrap();
        sender.submit(request("a")).await.unwrap();

        client.set_revert(true);
        client.mine_all();
        sender.check_pending().await.unwrap();
        assert!(!confirmations.try_recv().unwrap().success);
    }

    #[tokio::test]
    async fn test_waits_for_confirmation_depth() {
        let config = SenderConfig {
            confirmations: rollup_relayer_providers::ConfirmationDepth::BlockDepth(2),
            ..test_config()
        };
        let (client, sender) = setup(1, config).await;
        let mut confirmations = sender.confirmations().unwrap();
        sender.submit(request("a")).await.unwrap();
        client.mine_all();

        sender.check_pending().await.unwrap();
        assert!(confirmations.try_recv().is_err());

        client.advance_blocks(2);
        sender.check_pending().await.unwrap();
        assert!(confirmations.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_base_fee_above_u64() {
        let config =
            SenderConfig { tx_type: TxType::DynamicFeeTx, max_gas_price: u128::MAX, ..test_config() };
        let (client, sender) = setup(1, config).await;
        let base_fee = u64::MAX as u128 + 1;
        client.set_base_fee(Some(base_fee));
        sender.check_pending().await.unwrap();

        sender.submit(request("a")).await.unwrap();
        let fees = sender.pending_fees("a").unwrap();
        assert!(fees.max_price() > base_fee);
        assert_eq!(
            fees,
            GasFees::dynamic(100_000_000, base_fee, sender.config.min_gas_tip, u128::MAX)
        );
    }

    #[tokio::test]
    async fn test_duplicate_id() {
        let (_client, sender) = setup(2, test_config()).await;
        sender.submit(request("a")).await.unwrap();
        let err = sender.submit(request("a")).await.unwrap_err();
        assert!(matches!(err, SenderError::DuplicateId(_)));
        assert!(err.is_expected());
        assert_eq!(sender.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_pool_full_does_not_contact_chain() {
        let config = SenderConfig { pending_limit: 1, ..test_config() };
        let (client, sender) = setup(1, config).await;
        sender.submit(request("a")).await.unwrap();
        assert!(sender.is_full());
        assert_eq!(sender.pending_count(), sender.pending_limit());

        let calls = client.call_count();
        let err = sender.submit(request("b")).await.unwrap_err();
        assert!(matches!(err, SenderError::PendingPoolFull));
        assert_eq!(client.call_count(), calls);
    }

    #[tokio::test]
    async fn test_no_available_account() {
        let (_client, sender) = setup(1, test_config()).await;
        let _lease = sender.account_pool().acquire().unwrap();
        let err = sender.submit(request("a")).await.unwrap_err();
        assert!(matches!(err, SenderError::NoAvailableAccount));
        assert_eq!(sender.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_send_failure_resets_nonce() {
        let (client, sender) = setup(1, test_config()).await;
        let address = sender.account_pool().accounts()[0].address();
        client.set_nonce(address, 9);
        client.push_send_error(ChainClientError::Rejected("nonce too low".into()));

        let err = sender.submit(request("a")).await.unwrap_err();
        assert!(!err.is_expected());
        assert_eq!(sender.pending_count(), 0);
        assert_eq!(sender.account_pool().accounts()[0].nonce(), 9);

        // the id can be submitted again.
        sender.submit(request("a")).await.unwrap();
        assert_eq!(sender.account_pool().accounts()[0].nonce(), 10);
    }

    #[tokio::test]
    async fn test_resubmission_escalates_fees() {
        let (client, sender) = setup(1, test_config()).await;
        let first = sender.submit(request("a")).await.unwrap();
        let initial = sender.pending_fees("a").unwrap();

        // within the escalation window nothing is resent.
        client.advance_blocks(ESCALATE_BLOCKS);
        sender.check_pending().await.unwrap();
        assert_eq!(client.send_count(), 1);

        client.advance_blocks(1);
        sender.check_pending().await.unwrap();
        assert_eq!(client.send_count(), 2);
        let escalated = sender.pending_fees("a").unwrap();
        assert!(escalated.max_price() > initial.max_price());
        assert!(escalated.max_price() <= sender.config.max_gas_price);
        assert_eq!(sender.pending_count(), 1);

        // the same nonce is reused.
        assert_eq!(sender.account_pool().accounts()[0].nonce(), 1);
        let sent = client.sent_transactions();
        assert_ne!(alloy_primitives::keccak256(&sent[1]), first);
    }

    #[tokio::test]
    async fn test_resubmit_nonce_conflict_drops_transaction() {
        let (client, sender) = setup(1, test_config()).await;
        let mut confirmations = sender.confirmations().unwrap();
        sender.submit(request("a")).await.unwrap();

        client.advance_blocks(ESCALATE_BLOCKS + 1);
        client.push_send_error(ChainClientError::Rejected("nonce too low".into()));
        sender.check_pending().await.unwrap();

        // the nonce went to an unknown transaction, the record is dropped without confirmation.
        assert_eq!(sender.pending_count(), 0);
        assert!(confirmations.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_resubmit_nonce_conflict_confirms_previous_broadcast() {
        let (client, sender) = setup(1, test_config()).await;
        let mut confirmations = sender.confirmations().unwrap();
        let hash = sender.submit(request("a")).await.unwrap();

        // the first broadcast is included while its replacement is rejected.
        client.advance_blocks(ESCALATE_BLOCKS + 1);
        client.set_mine_on_send_error(true);
        client.push_send_error(ChainClientError::Rejected("nonce too low".into()));
        sender.check_pending().await.unwrap();

        assert_eq!(sender.pending_count(), 0);
        assert_eq!(client.send_count(), 1);
        let confirmation = confirmations.try_recv().unwrap();
        assert_eq!(confirmation.id, "a");
        assert_eq!(confirmation.tx_hash, hash);
        assert!(confirmation.success);

        // the record is gone, nothing is emitted twice.
        sender.check_pending().await.unwrap();
        assert!(confirmations.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_resubmit_other_failure_keeps_transaction() {
        let (client, sender) = setup(1, test_config()).await;
        sender.submit(request("a")).await.unwrap();
        let initial = sender.pending_fees("a").unwrap();

        client.advance_blocks(ESCALATE_BLOCKS + 1);
        client.push_send_error(ChainClientError::Rejected("insufficient funds".into()));
        sender.check_pending().await.unwrap();

        assert_eq!(sender.pending_count(), 1);
        assert_eq!(sender.pending_fees("a").unwrap(), initial);
    }

    #[tokio::test]
    async fn test_check_balance() {
        let (client, sender) = setup(2, test_config()).await;
        assert_eq!(sender.check_balance().await.unwrap(), 0);
        let address = sender.account_pool().accounts()[1].address();
        client.set_balance(address, U256::from(1));
        assert_eq!(sender.check_balance().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sender_shutdown() {
        let (_client, sender) = setup(1, test_config()).await;
        let shutdown = CancellationToken::new();
        let handle = Arc::new(sender).spawn(shutdown.clone());
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.cancel();
        handle.await.expect("sender task panicked");
    }
}
