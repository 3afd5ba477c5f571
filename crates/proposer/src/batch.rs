use crate::{
    config::over_estimate,
    packing::{
        first_exceeded, pack, truncate_at_boundary, unix_time, Candidates, Deadline,
        ProposalTrigger,
    },
    BatchProposerConfig, BatchProposerMetrics, LimitExceeded, Propose, ProposerError,
};

use alloy_primitives::B256;
use rollup_relayer_primitives::{Batch, Chunk, CodecVersion, ProvingStatus, RollupStatus};
use scroll_codec::{constants::MAX_BLOB_SIZE, BatchHeader, BatchMetrics, CodecError};
use scroll_db::{Database, DatabaseOperations};
use std::{sync::Arc, time::Instant};

/// Packs contiguous unbatched chunks into batches.
#[derive(Debug)]
pub struct BatchProposer {
    /// The proposer configuration.
    config: BatchProposerConfig,
    /// The database.
    database: Arc<Database>,
    /// The proposer metrics.
    metrics: BatchProposerMetrics,
}

impl BatchProposer {
    /// Returns a new [`BatchProposer`].
    pub fn new(config: BatchProposerConfig, database: Arc<Database>) -> Self {
        Self { config, database, metrics: BatchProposerMetrics::default() }
    }

    /// Proposes the next batch if the unbatched chunks allow it, returning the new batch.
    pub async fn try_propose(&self) -> Result<Option<Batch>, ProposerError> {
        self.metrics.propose_cycles.increment(1);
        let start = Instant::now();
        let res = self.propose().await;
        self.metrics.propose_duration.record(start.elapsed().as_secs_f64());
        if res.is_err() {
            self.metrics.propose_failures.increment(1);
        }
        res
    }

    async fn propose(&self) -> Result<Option<Batch>, ProposerError> {
        let parent = self.database.get_latest_batch().await?;
        let first_index = parent.as_ref().map_or(0, |b| b.end_chunk_index + 1);
        let mut chunks =
            self.database.get_chunks_from(first_index, self.config.max_chunk_num_per_batch).await?;
        let Some(first) = chunks.first() else {
            tracing::trace!(target: "scroll::proposer::batch", first_index, "no unbatched chunks");
            return Ok(None)
        };
        let codec = first.codec_version;
        let first_timestamp = first.start_block_time;

        let mut window =
            codec.max_chunks_per_batch().min(self.config.max_chunk_num_per_batch) as usize;
        chunks.truncate(window);

        // no batch may straddle a codec upgrade.
        let same_codec = truncate_at_boundary(&chunks, |chunk| chunk.codec_version);
        if same_codec < chunks.len() {
            chunks.truncate(same_codec);
            window = same_codec;
        }

        let candidates =
            Candidates { item: "chunk", first_index, items: chunks.as_slice(), window };
        let deadline = Deadline {
            first_timestamp,
            timeout_secs: self.config.batch_timeout_sec,
            now: unix_time(),
        };
        let packed = pack(
            candidates,
            deadline,
            |chunks| Ok(BatchMetrics::compute(chunks, codec)?),
            |metrics| self.exceeded(metrics),
        )?;
        let Some(packed) = packed else {
            tracing::debug!(target: "scroll::proposer::batch", first_index, count = chunks.len(), "pending chunks do not reach one of the constraints or contain a timeout block");
            self.metrics.chunks_not_enough.increment(1);
            return Ok(None)
        };

        if packed.trigger == ProposalTrigger::Timeout {
            self.metrics.first_block_timeout_reached.increment(1);
        }
        self.commit(parent, &chunks[..packed.count], codec, packed.metrics).await.map(Some)
    }

    /// Returns the first ceiling the batch breaches.
    fn exceeded(&self, metrics: &BatchMetrics) -> Option<LimitExceeded> {
        let config = &self.config;
        first_exceeded([
            (
                "l1_commit_calldata_size",
                metrics.l1_commit_calldata_size,
                config.max_l1_commit_calldata_size_per_batch,
            ),
            (
                "l1_commit_gas",
                over_estimate(metrics.l1_commit_gas, config.gas_cost_increase_multiplier),
                config.max_l1_commit_gas_per_batch,
            ),
            ("l1_commit_blob_size", metrics.l1_commit_blob_size, MAX_BLOB_SIZE),
            (
                "uncompressed_batch_bytes_size",
                metrics.uncompressed_batch_bytes_size,
                config.max_uncompressed_batch_bytes_size,
            ),
        ])
    }

    /// Persists the batch and stamps its chunks in one transaction.
    async fn commit(
        &self,
        parent: Option<Batch>,
        chunks: &[Chunk],
        codec: CodecVersion,
        metrics: BatchMetrics,
    ) -> Result<Batch, ProposerError> {
        let (first, last) = match (chunks.first(), chunks.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(CodecError::EmptyBatch.into()),
        };
        let index = parent.as_ref().map_or(0, |p| p.index + 1);
        let parent_hash = parent.as_ref().map_or(B256::ZERO, |p| p.hash);
        let header = BatchHeader::new(codec, index, parent_hash, chunks)?;

        let batch = Batch {
            index,
            hash: header.hash_slow(),
            data_hash: header.data_hash,
            parent_batch_hash: parent_hash,
            start_chunk_index: first.index,
            start_chunk_hash: first.hash,
            end_chunk_index: last.index,
            end_chunk_hash: last.hash,
            start_block_number: first.start_block_number,
            start_block_time: first.start_block_time,
            end_block_number: last.end_block_number,
            codec_version: codec,
            total_l1_messages_popped_before: first.total_l1_messages_popped_before,
            l1_messages_popped: header.l1_message_popped,
            total_l1_commit_gas: metrics.l1_commit_gas,
            total_l1_commit_calldata_size: metrics.l1_commit_calldata_size,
            batch_header: header.encode(),
            state_root: last.state_root,
            withdraw_root: last.withdraw_root,
            rollup_status: RollupStatus::Pending,
            proving_status: ProvingStatus::Unassigned,
            proof: None,
            commit_tx_hash: None,
            finalize_tx_hash: None,
            committed_at: None,
            bundle_hash: None,
        };

        let tx = self.database.tx().await?;
        tx.insert_batch(batch.clone()).await?;
        tx.set_batch_hash_for_chunks(batch.start_chunk_index, batch.end_chunk_index, batch.hash)
            .await?;
        tx.commit().await?;

        tracing::info!(target: "scroll::proposer::batch", index, hash = ?batch.hash, start_chunk = batch.start_chunk_index, end_chunk = batch.end_chunk_index, %codec, "proposed batch");
        self.metrics.proposed_batches.increment(1);
        self.metrics.batch_chunks_num.set(metrics.num_chunks as f64);
        self.metrics.batch_estimate_l1_commit_gas.set(metrics.l1_commit_gas as f64);
        self.metrics.batch_l1_commit_calldata_size.set(metrics.l1_commit_calldata_size as f64);
        self.metrics.batch_l1_commit_blob_size.set(metrics.l1_commit_blob_size as f64);

        Ok(batch)
    }
}

#[async_trait::async_trait]
impl Propose for BatchProposer {
    fn unit(&self) -> &'static str {
        "batch"
    }

    async fn propose_next(&self) -> Result<Option<u64>, ProposerError> {
        Ok(self.try_propose().await?.map(|batch| batch.index))
    }
}
