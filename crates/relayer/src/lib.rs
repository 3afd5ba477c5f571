//! The relayer moving proposed batches and bundles through their L1 lifecycle.
//!
//! Pending batches are committed through the commit [`Sender`], committed batches and proven
//! bundles are finalized through the finalize [`Sender`]. Every submission carries a [`TxContext`]
//! which the sender echoes on its [`Confirmation`], from which the relayer resolves the next status.

use alloy_primitives::{Bytes, B256, U256};
use alloy_sol_types::SolCall;
use rollup_relayer_primitives::{
    Batch, Bundle, Chunk, CodecVersion, ProvingStatus, RollupStatus, RowConsumption,
};
use rollup_relayer_providers::ChainClient;
use rollup_relayer_sender::{Confirmation, Sender, SubmissionKind, TxContext, TxRequest};
use scroll_codec::{compute_chunk_hash, constants::BATCH_HEADER_BYTES_SIZE, encode_chunk, BatchHeader};
use scroll_db::{Database, DatabaseOperations};
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

pub mod abi;

mod config;
pub use config::{RelayerConfig, PENDING_BATCHES_PER_ROUND};

mod error;
pub use error::RelayerError;

mod metrics;
pub use metrics::RelayerMetrics;

/// The prefix of the correlation id of bundle finalization.
const FINALIZE_BUNDLE_ID_PREFIX: &str = "finalizeBundle-";

/// Commits and finalizes rollup units on L1.
#[derive(Debug)]
pub struct Relayer<C> {
    /// The relayer configuration.
    config: RelayerConfig,
    /// The database.
    database: Arc<Database>,
    /// The sender of commit transactions.
    commit_sender: Arc<Sender<C>>,
    /// The sender of finalize transactions.
    finalize_sender: Arc<Sender<C>>,
    /// The relayer metrics.
    metrics: RelayerMetrics,
}

impl<C: ChainClient + 'static> Relayer<C> {
    /// Returns a new [`Relayer`], importing the genesis batch if no batch exists.
    pub async fn new(
        config: RelayerConfig,
        database: Arc<Database>,
        commit_sender: Arc<Sender<C>>,
        finalize_sender: Arc<Sender<C>>,
    ) -> Result<Self, RelayerError> {
        RelayerConfig::validate_sender_accounts(
            commit_sender.account_pool().accounts().iter().map(|a| a.address()),
            finalize_sender.account_pool().accounts().iter().map(|a| a.address()),
        )?;

        let relayer = Self {
            config,
            database,
            commit_sender,
            finalize_sender,
            metrics: RelayerMetrics::default(),
        };
        relayer.initialize_genesis().await?;
        Ok(relayer)
    }

    /// Spawns the relaying loop onto the tokio runtime. The loop owns the confirmation channels
    /// of both senders.
    pub fn spawn(self: &Arc<Self>, shutdown: CancellationToken) -> Result<JoinHandle<()>, RelayerError> {
        let commit_confirmations =
            self.commit_sender.confirmations().ok_or(RelayerError::ConfirmationsTaken("commit"))?;
        let finalize_confirmations = self
            .finalize_sender
            .confirmations()
            .ok_or(RelayerError::ConfirmationsTaken("finalize"))?;
        Ok(tokio::spawn(self.clone().run(commit_confirmations, finalize_confirmations, shutdown)))
    }

    /// Imports block 0 as chunk 0 and batch 0, finalized and verified. No-op once a batch exists.
    pub async fn initialize_genesis(&self) -> Result<(), RelayerError> {
        if let Some(latest) = self.database.get_latest_batch().await? {
            tracing::info!(target: "scroll::relayer", latest_index = latest.index, "genesis already imported");
            return Ok(())
        }
        let genesis = self
            .database
            .get_l2_blocks_in_range(0, 0)
            .await?
            .pop()
            .ok_or(RelayerError::MissingGenesisBlock)?;
        tracing::info!(target: "scroll::relayer", hash = ?genesis.hash, "importing genesis");

        let blocks = [genesis];
        let genesis = &blocks[0];
        let chunk = Chunk {
            index: 0,
            hash: compute_chunk_hash(&blocks)?,
            start_block_number: 0,
            start_block_hash: genesis.hash,
            end_block_number: 0,
            end_block_hash: genesis.hash,
            start_block_time: genesis.timestamp,
            total_l1_messages_popped_before: 0,
            total_l1_messages_popped_in_chunk: 0,
            parent_chunk_hash: B256::ZERO,
            state_root: genesis.state_root,
            withdraw_root: B256::ZERO,
            codec_version: CodecVersion::V0,
            total_l2_tx_gas: 0,
            total_l2_tx_num: 0,
            total_l1_commit_calldata_size: 0,
            total_l1_commit_gas: 0,
            total_l2_tx_bytes: 0,
            row_consumption: RowConsumption::default(),
            batch_hash: None,
        };
        let header = BatchHeader::new(CodecVersion::V0, 0, B256::ZERO, std::slice::from_ref(&chunk))?;
        let batch = Batch {
            index: 0,
            hash: header.hash_slow(),
            data_hash: header.data_hash,
            parent_batch_hash: B256::ZERO,
            start_chunk_index: 0,
            start_chunk_hash: chunk.hash,
            end_chunk_index: 0,
            end_chunk_hash: chunk.hash,
            start_block_number: 0,
            start_block_time: genesis.timestamp,
            end_block_number: 0,
            codec_version: CodecVersion::V0,
            total_l1_messages_popped_before: 0,
            l1_messages_popped: 0,
            total_l1_commit_gas: 0,
            total_l1_commit_calldata_size: 0,
            batch_header: header.encode(),
            state_root: genesis.state_root,
            withdraw_root: B256::ZERO,
            rollup_status: RollupStatus::Finalized,
            proving_status: ProvingStatus::Verified,
            proof: None,
            commit_tx_hash: None,
            finalize_tx_hash: None,
            committed_at: None,
            bundle_hash: None,
        };

        let tx = self.database.tx().await?;
        tx.insert_chunk(chunk.clone()).await?;
        tx.set_chunk_hash_for_blocks(0, 0, chunk.hash).await?;
        tx.insert_batch(batch.clone()).await?;
        tx.set_batch_hash_for_chunks(0, 0, batch.hash).await?;
        tx.commit().await?;

        tracing::info!(target: "scroll::relayer", batch_hash = ?batch.hash, "imported genesis chunk and batch");
        Ok(())
    }

    /// Submits commit transactions for the earliest pending or commit-failed batches.
    pub async fn process_pending_batches(&self) -> Result<(), RelayerError> {
        let batches = self.database.get_pending_batches(PENDING_BATCHES_PER_ROUND).await?;
        for batch in batches {
            if batch.index == 0 {
                tracing::error!(target: "scroll::relayer", "genesis batch is never committed by the relayer");
                continue
            }
            self.metrics.process_pending_batches_total.increment(1);

            let parent = self.batch_by_index(batch.index - 1).await?;
            let chunks =
                self.database.get_chunks_in_range(batch.start_chunk_index, batch.end_chunk_index).await?;
            let mut encoded_chunks = Vec::with_capacity(chunks.len());
            for chunk in &chunks {
                let blocks = self
                    .database
                    .get_l2_blocks_in_range(chunk.start_block_number, chunk.end_block_number)
                    .await?;
                encoded_chunks.push(encode_chunk(&blocks)?);
            }

            let min_gas_limit = if batch.rollup_status == RollupStatus::CommitFailed {
                tracing::warn!(target: "scroll::relayer", index = batch.index, hash = ?batch.hash, "batch commit previously failed, estimating gas for the re-submission");
                0
            } else {
                self.config.commit_gas_floor(batch.total_l1_commit_gas)
            };
            let request = TxRequest {
                id: batch.hash.to_string(),
                context: TxContext { kind: SubmissionKind::CommitBatch, unit_hash: batch.hash },
                to: self.config.rollup_contract_address,
                value: U256::ZERO,
                data: commit_batch_calldata(&batch, &parent, encoded_chunks),
                min_gas_limit,
            };

            let Some(tx_hash) = self.submit(&self.commit_sender, request).await? else {
                self.metrics.process_pending_batches_deferred_total.increment(1);
                return Ok(())
            };
            self.database
                .update_batch_commit_status(batch.hash, RollupStatus::Committing, Some(tx_hash))
                .await?;
            self.metrics.process_pending_batches_success_total.increment(1);
            tracing::info!(target: "scroll::relayer", index = batch.index, hash = ?batch.hash, ?tx_hash, "sent commit batch transaction");
        }
        Ok(())
    }

    /// Submits the finalize transaction of the earliest committed batch, if its codec is finalized
    /// batch by batch and it is proven, or if proving timed out on a test network.
    pub async fn process_committed_batches(&self) -> Result<(), RelayerError> {
        let Some(batch) = self.database.get_earliest_committed_batch().await? else { return Ok(()) };
        self.metrics.process_committed_batches_total.increment(1);
        if batch.codec_version.is_bundled() {
            tracing::trace!(target: "scroll::relayer", index = batch.index, "batch is finalized within a bundle");
            return Ok(())
        }

        let with_proof = match batch.proving_status {
            ProvingStatus::Unassigned | ProvingStatus::Assigned => {
                let Some(committed_at) = batch.committed_at else {
                    tracing::error!(target: "scroll::relayer", index = batch.index, hash = ?batch.hash, "committed batch without commit time");
                    return Ok(())
                };
                if !self.bypass_proof(committed_at, self.config.finalize_batch_without_proof_timeout_sec) {
                    return Ok(())
                }
                false
            }
            ProvingStatus::Verified => {
                self.metrics.process_committed_batches_finalized_total.increment(1);
                true
            }
            ProvingStatus::Failed => {
                tracing::error!(target: "scroll::relayer", index = batch.index, hash = ?batch.hash, "batch proving failed");
                return Ok(())
            }
        };

        let parent = self.batch_by_index(batch.index.saturating_sub(1)).await?;
        let data = if with_proof {
            let Some(proof) = batch.proof.clone() else {
                tracing::error!(target: "scroll::relayer", index = batch.index, hash = ?batch.hash, "verified batch without proof");
                return Ok(())
            };
            abi::finalizeBatchWithProofCall {
                batch_header: batch.batch_header.clone(),
                prev_state_root: parent.state_root,
                post_state_root: batch.state_root,
                withdraw_root: batch.withdraw_root,
                aggr_proof: proof,
            }
            .abi_encode()
        } else {
            abi::finalizeBatchCall {
                batch_header: batch.batch_header.clone(),
                prev_state_root: parent.state_root,
                post_state_root: batch.state_root,
                withdraw_root: batch.withdraw_root,
            }
            .abi_encode()
        };
        let request = TxRequest {
            id: batch.hash.to_string(),
            context: TxContext { kind: SubmissionKind::FinalizeBatch, unit_hash: batch.hash },
            to: self.config.rollup_contract_address,
            value: U256::ZERO,
            data: data.into(),
            min_gas_limit: 0,
        };

        let Some(tx_hash) = self.submit(&self.finalize_sender, request).await? else { return Ok(()) };

        let tx = self.database.tx().await?;
        tx.update_batch_finalize_status(batch.hash, RollupStatus::Finalizing, Some(tx_hash)).await?;
        if !with_proof {
            // the prover may skip the batch.
            tx.update_batch_proving_status(batch.hash, ProvingStatus::Verified).await?;
        }
        tx.commit().await?;

        self.metrics.process_committed_batches_finalized_success_total.increment(1);
        tracing::info!(target: "scroll::relayer", with_proof, index = batch.index, hash = ?batch.hash, ?tx_hash, "sent finalize batch transaction");
        Ok(())
    }

    /// Submits the finalize transaction of the earliest pending bundle, if it is proven or if
    /// proving timed out on a test network.
    pub async fn process_pending_bundles(&self) -> Result<(), RelayerError> {
        let Some(bundle) = self.database.get_first_pending_bundle().await? else { return Ok(()) };
        self.metrics.process_pending_bundles_total.increment(1);

        let last = self.batch_by_index(bundle.end_batch_index).await?;
        if matches!(
            last.rollup_status,
            RollupStatus::Pending | RollupStatus::Committing | RollupStatus::CommitFailed
        ) {
            tracing::debug!(target: "scroll::relayer", index = bundle.index, last_batch = last.index, "bundle not committed yet");
            return Ok(())
        }

        let with_proof = match bundle.proving_status {
            ProvingStatus::Unassigned | ProvingStatus::Assigned => {
                if !self.bypass_proof(bundle.created_at, self.config.finalize_bundle_without_proof_timeout_sec) {
                    return Ok(())
                }
                false
            }
            ProvingStatus::Verified => {
                self.metrics.process_pending_bundles_finalized_total.increment(1);
                true
            }
            ProvingStatus::Failed => {
                tracing::error!(target: "scroll::relayer", index = bundle.index, hash = ?bundle.hash, "bundle proving failed");
                return Ok(())
            }
        };

        let data = if with_proof {
            let Some(proof) = bundle.proof.clone() else {
                tracing::error!(target: "scroll::relayer", index = bundle.index, hash = ?bundle.hash, "verified bundle without proof");
                return Ok(())
            };
            abi::finalizeBundleWithProofCall {
                batch_header: last.batch_header.clone(),
                post_state_root: last.state_root,
                withdraw_root: last.withdraw_root,
                aggr_proof: proof,
            }
            .abi_encode()
        } else {
            abi::finalizeBundleCall {
                batch_header: last.batch_header.clone(),
                post_state_root: last.state_root,
                withdraw_root: last.withdraw_root,
            }
            .abi_encode()
        };
        let request = TxRequest {
            id: format!("{FINALIZE_BUNDLE_ID_PREFIX}{}", bundle.hash),
            context: TxContext { kind: SubmissionKind::FinalizeBundle, unit_hash: bundle.hash },
            to: self.config.rollup_contract_address,
            value: U256::ZERO,
            data: data.into(),
            min_gas_limit: 0,
        };

        let Some(tx_hash) = self.submit(&self.finalize_sender, request).await? else { return Ok(()) };

        let members = if with_proof {
            Vec::new()
        } else {
            self.database
                .get_batches_from(bundle.start_batch_index, CodecVersion::V0, bundle.num_batches())
                .await?
        };
        let tx = self.database.tx().await?;
        tx.update_bundle_finalize_status(bundle.hash, RollupStatus::Finalizing, Some(tx_hash)).await?;
        if !with_proof {
            tx.update_bundle_proving_status(bundle.hash, ProvingStatus::Verified).await?;
            for batch in &members {
                tx.update_batch_proving_status(batch.hash, ProvingStatus::Verified).await?;
            }
        }
        tx.commit().await?;

        self.metrics.process_pending_bundles_finalized_success_total.increment(1);
        tracing::info!(target: "scroll::relayer", with_proof, index = bundle.index, start_batch = bundle.start_batch_index, end_batch = bundle.end_batch_index, ?tx_hash, "sent finalize bundle transaction");
        Ok(())
    }

    /// Resolves the status of the unit a confirmed transaction applies to.
    pub async fn handle_confirmation(&self, confirmation: Confirmation) -> Result<(), RelayerError> {
        let Confirmation { context: TxContext { kind, unit_hash }, success, tx_hash, .. } = confirmation;
        match kind {
            SubmissionKind::CommitBatch => {
                let status = if success {
                    self.metrics.batches_committed_confirmed_total.increment(1);
                    RollupStatus::Committed
                } else {
                    self.metrics.batches_committed_confirmed_failed_total.increment(1);
                    tracing::warn!(target: "scroll::relayer", batch_hash = ?unit_hash, ?tx_hash, "commit batch transaction reverted");
                    RollupStatus::CommitFailed
                };
                self.database.update_batch_commit_status(unit_hash, status, Some(tx_hash)).await?;
            }
            SubmissionKind::FinalizeBatch => {
                let status = if success {
                    self.metrics.batches_finalized_confirmed_total.increment(1);
                    RollupStatus::Finalized
                } else {
                    self.metrics.batches_finalized_confirmed_failed_total.increment(1);
                    tracing::warn!(target: "scroll::relayer", batch_hash = ?unit_hash, ?tx_hash, "finalize batch transaction reverted");
                    RollupStatus::FinalizeFailed
                };
                self.database.update_batch_finalize_status(unit_hash, status, Some(tx_hash)).await?;
            }
            SubmissionKind::FinalizeBundle => {
                let status = if success {
                    self.metrics.bundles_finalized_confirmed_total.increment(1);
                    RollupStatus::Finalized
                } else {
                    self.metrics.bundles_finalized_confirmed_failed_total.increment(1);
                    tracing::warn!(target: "scroll::relayer", bundle_hash = ?unit_hash, ?tx_hash, "finalize bundle transaction reverted");
                    RollupStatus::FinalizeFailed
                };
                let tx = self.database.tx().await?;
                tx.update_bundle_finalize_status(unit_hash, status, Some(tx_hash)).await?;
                tx.commit().await?;
            }
        }

        tracing::info!(target: "scroll::relayer", ?kind, ?unit_hash, success, ?tx_hash, "transaction confirmed on L1");
        Ok(())
    }

    /// Submits the request, returning [`None`] if the sender deferred it.
    async fn submit(
        &self,
        sender: &Sender<C>,
        request: TxRequest,
    ) -> Result<Option<B256>, RelayerError> {
        let id = request.id.clone();
        match sender.submit(request).await {
            Ok(tx_hash) => Ok(Some(tx_hash)),
            Err(err) if err.is_expected() => {
                tracing::debug!(target: "scroll::relayer", id, %err, "submission deferred to the next round");
                Ok(None)
            }
            Err(err) => {
                tracing::error!(target: "scroll::relayer", id, ?err, "failed to submit transaction");
                Err(err.into())
            }
        }
    }

    async fn batch_by_index(&self, index: u64) -> Result<Batch, RelayerError> {
        self.database.get_batch_by_index(index).await?.ok_or(RelayerError::MissingBatch(index))
    }

    /// Returns true if finalization without proof is enabled and `timeout_secs` elapsed since
    /// `since`.
    fn bypass_proof(&self, since: u64, timeout_secs: u64) -> bool {
        self.config.enable_test_env_bypass_features &&
            since.saturating_add(timeout_secs) <= unix_time()
    }

    async fn process(&self) {
        if let Err(err) = self.process_pending_batches().await {
            tracing::error!(target: "scroll::relayer", ?err, "failed to process pending batches");
        }
        if let Err(err) = self.process_committed_batches().await {
            tracing::error!(target: "scroll::relayer", ?err, "failed to process committed batches");
        }
        if let Err(err) = self.process_pending_bundles().await {
            tracing::error!(target: "scroll::relayer", ?err, "failed to process pending bundles");
        }
    }

    async fn on_confirmation(&self, confirmation: Confirmation) {
        let id = confirmation.id.clone();
        if let Err(err) = self.handle_confirmation(confirmation).await {
            tracing::warn!(target: "scroll::relayer", %id, ?err, "failed to handle confirmation");
        }
    }

    async fn run(
        self: Arc<Self>,
        mut commit_confirmations: mpsc::Receiver<Confirmation>,
        mut finalize_confirmations: mpsc::Receiver<Confirmation>,
        shutdown: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(self.config.process_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    tracing::info!(target: "scroll::relayer", "shutting down relayer");
                    break;
                }
                Some(confirmation) = commit_confirmations.recv() => {
                    self.on_confirmation(confirmation).await;
                }
                Some(confirmation) = finalize_confirmations.recv() => {
                    self.on_confirmation(confirmation).await;
                }
                _ = ticker.tick() => {
                    self.process().await;
                }
            }
        }
    }
}

/// Encodes the commit calldata of a batch following `parent`.
pub fn commit_batch_calldata(batch: &Batch, parent: &Batch, chunks: Vec<Bytes>) -> Bytes {
    let bitmap = batch
        .batch_header
        .get(BATCH_HEADER_BYTES_SIZE as usize..)
        .map(Bytes::copy_from_slice)
        .unwrap_or_default();
    abi::commitBatchCall {
        version: batch.codec_version.into(),
        parent_batch_header: parent.batch_header.clone(),
        chunks,
        skipped_l1_message_bitmap: bitmap,
    }
    .abi_encode()
    .into()
}

fn unix_time() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests;
