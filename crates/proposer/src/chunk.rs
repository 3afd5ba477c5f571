use crate::{
    config::over_estimate,
    packing::{first_exceeded, pack, unix_time, Candidates, Deadline, ProposalTrigger},
    ChunkProposerConfig, ChunkProposerMetrics, LimitExceeded, Propose, ProposerError,
};

use rollup_relayer_primitives::{Chunk, CodecVersion, CodecVersionResolver, L2Block};
use scroll_codec::{
    compute_chunk_hash,
    constants::{MAX_BLOB_SIZE, MAX_BLOCKS_PER_CHUNK},
    l1_messages_popped, ChunkMetrics,
};
use scroll_db::{Database, DatabaseOperations};
use std::{sync::Arc, time::Instant};

/// Packs contiguous unchunked L2 blocks into chunks.
#[derive(Debug)]
pub struct ChunkProposer<R> {
    /// The proposer configuration.
    config: ChunkProposerConfig,
    /// The database.
    database: Arc<Database>,
    /// The codec version resolver.
    resolver: R,
    /// The proposer metrics.
    metrics: ChunkProposerMetrics,
}

impl<R: CodecVersionResolver> ChunkProposer<R> {
    /// Returns a new [`ChunkProposer`].
    pub fn new(config: ChunkProposerConfig, database: Arc<Database>, resolver: R) -> Self {
        Self { config, database, resolver, metrics: ChunkProposerMetrics::default() }
    }

    /// Proposes the next chunk if the unchunked blocks allow it, returning the new chunk.
    pub async fn try_propose(&self) -> Result<Option<Chunk>, ProposerError> {
        self.metrics.propose_cycles.increment(1);
        let start = Instant::now();
        let res = self.propose().await;
        self.metrics.propose_duration.record(start.elapsed().as_secs_f64());
        if res.is_err() {
            self.metrics.propose_failures.increment(1);
        }
        res
    }

    async fn propose(&self) -> Result<Option<Chunk>, ProposerError> {
        let parent = self.database.get_latest_chunk().await?;
        let first_number = parent.as_ref().map_or(0, |c| c.end_block_number + 1);
        let max_blocks = self.config.max_block_num_per_chunk.min(MAX_BLOCKS_PER_CHUNK);
        let blocks = self.database.get_l2_blocks_from(first_number, max_blocks).await?;

        // blocks must be contiguous from the first unchunked block.
        let contiguous = blocks
            .iter()
            .enumerate()
            .take_while(|(i, block)| block.number == first_number + *i as u64)
            .count();
        let Some(first) = blocks[..contiguous].first() else {
            tracing::trace!(target: "scroll::proposer::chunk", first_number, "no unchunked blocks");
            return Ok(None)
        };
        let codec = self.resolver.codec_version(first.number, first.timestamp);

        if self.resolver.is_sole_chunk_block(first.number) {
            tracing::info!(target: "scroll::proposer::chunk", number = first.number, "proposing fork block in a sole chunk");
            let metrics = ChunkMetrics::compute(&blocks[..1], codec)?;
            return self.commit(parent, &blocks[..1], codec, metrics).await.map(Some)
        }

        // no chunk may straddle a fork.
        let mut window = max_blocks as usize;
        let same_fork = blocks[..contiguous]
            .iter()
            .skip(1)
            .position(|block| {
                self.resolver.codec_version(block.number, block.timestamp) != codec ||
                    self.resolver.is_sole_chunk_block(block.number)
            })
            .map_or(contiguous, |i| i + 1);
        if same_fork < contiguous {
            window = same_fork;
        }
        let blocks = &blocks[..same_fork];

        let candidates =
            Candidates { item: "block", first_index: first.number, items: blocks, window };
        let deadline = Deadline {
            first_timestamp: first.timestamp,
            timeout_secs: self.config.chunk_timeout_sec,
            now: unix_time(),
        };
        let packed = pack(
            candidates,
            deadline,
            |blocks| Ok(ChunkMetrics::compute(blocks, codec)?),
            |metrics| self.exceeded(metrics),
        )?;
        let Some(packed) = packed else {
            tracing::debug!(target: "scroll::proposer::chunk", first_number, count = blocks.len(), "pending blocks do not reach one of the constraints or contain a timeout block");
            self.metrics.blocks_not_enough.increment(1);
            return Ok(None)
        };

        if packed.trigger == ProposalTrigger::Timeout {
            self.metrics.first_block_timeout_reached.increment(1);
        }
        self.commit(parent, &blocks[..packed.count], codec, packed.metrics).await.map(Some)
    }

    /// Returns the first ceiling the chunk breaches.
    fn exceeded(&self, metrics: &ChunkMetrics) -> Option<LimitExceeded> {
        let config = &self.config;
        first_exceeded([
            ("tx_num", metrics.tx_num, config.max_tx_num_per_chunk),
            (
                "l1_commit_calldata_size",
                metrics.l1_commit_calldata_size,
                config.max_l1_commit_calldata_size_per_chunk,
            ),
            (
                "l1_commit_gas",
                over_estimate(metrics.l1_commit_gas, config.gas_cost_increase_multiplier),
                config.max_l1_commit_gas_per_chunk,
            ),
            ("row_consumption", metrics.crc_max, config.max_row_consumption_per_chunk),
            ("l1_commit_blob_size", metrics.l1_commit_blob_size, MAX_BLOB_SIZE),
            (
                "uncompressed_batch_bytes_size",
                metrics.uncompressed_batch_bytes_size,
                config.max_uncompressed_batch_bytes_size,
            ),
        ])
    }

    /// Persists the chunk and stamps its blocks in one transaction.
    async fn commit(
        &self,
        parent: Option<Chunk>,
        blocks: &[L2Block],
        codec: CodecVersion,
        metrics: ChunkMetrics,
    ) -> Result<Chunk, ProposerError> {
        let (first, last) = match (blocks.first(), blocks.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(scroll_codec::CodecError::EmptyChunk.into()),
        };
        let popped_before =
            parent.as_ref().map(Chunk::total_l1_messages_popped_after).unwrap_or_default();

        let chunk = Chunk {
            index: parent.as_ref().map_or(0, |p| p.index + 1),
            hash: compute_chunk_hash(blocks)?,
            start_block_number: first.number,
            start_block_hash: first.hash,
            end_block_number: last.number,
            end_block_hash: last.hash,
            start_block_time: first.timestamp,
            total_l1_messages_popped_before: popped_before,
            total_l1_messages_popped_in_chunk: l1_messages_popped(blocks, popped_before),
            parent_chunk_hash: parent.as_ref().map(|p| p.hash).unwrap_or_default(),
            state_root: last.state_root,
            withdraw_root: last.withdraw_root,
            codec_version: codec,
            total_l2_tx_gas: metrics.l2_tx_gas,
            total_l2_tx_num: metrics.l2_tx_num,
            total_l1_commit_calldata_size: metrics.l1_commit_calldata_size,
            total_l1_commit_gas: metrics.l1_commit_gas,
            total_l2_tx_bytes: metrics.l2_tx_bytes,
            row_consumption: metrics.row_consumption.clone(),
            batch_hash: None,
        };

        let tx = self.database.tx().await?;
        tx.insert_chunk(chunk.clone()).await?;
        tx.set_chunk_hash_for_blocks(chunk.start_block_number, chunk.end_block_number, chunk.hash)
            .await?;
        tx.commit().await?;

        tracing::info!(target: "scroll::proposer::chunk", index = chunk.index, hash = ?chunk.hash, start = chunk.start_block_number, end = chunk.end_block_number, %codec, "proposed chunk");
        self.metrics.proposed_chunks.increment(1);
        self.metrics.chunk_blocks_num.set(metrics.num_blocks as f64);
        self.metrics.chunk_tx_num.set(metrics.tx_num as f64);
        self.metrics.chunk_estimate_l1_commit_gas.set(metrics.l1_commit_gas as f64);
        self.metrics.chunk_l1_commit_calldata_size.set(metrics.l1_commit_calldata_size as f64);
        self.metrics.chunk_l1_commit_blob_size.set(metrics.l1_commit_blob_size as f64);
        self.metrics.chunk_max_row_consumption.set(metrics.crc_max as f64);

        Ok(chunk)
    }
}

#[async_trait::async_trait]
impl<R: CodecVersionResolver> Propose for ChunkProposer<R> {
    fn unit(&self) -> &'static str {
        "chunk"
    }

    async fn propose_next(&self) -> Result<Option<u64>, ProposerError> {
        Ok(self.try_propose().await?.map(|chunk| chunk.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::NO_TIMEOUT;
    use alloy_primitives::B256;
    use rollup_relayer_primitives::{
        test_utils::{init_test_tracing, l2_blocks},
        HardforkSchedule,
    };
    use scroll_db::test_utils::setup_test_db;

    fn config() -> ChunkProposerConfig {
        ChunkProposerConfig {
            max_block_num_per_chunk: 100,
            max_tx_num_per_chunk: 100,
            max_l1_commit_gas_per_chunk: 50_000_000,
            max_l1_commit_calldata_size_per_chunk: 1_000_000,
            max_row_consumption_per_chunk: 1_000_000,
            chunk_timeout_sec: 0,
            gas_cost_increase_multiplier: 1.2,
            max_uncompressed_batch_bytes_size: u64::MAX,
            ..Default::default()
        }
    }

    async fn setup(
        config: ChunkProposerConfig,
        schedule: HardforkSchedule,
        blocks: Vec<L2Block>,
    ) -> ChunkProposer<HardforkSchedule> {
        init_test_tracing();
        let db = Arc::new(setup_test_db().await);
        db.insert_l2_blocks(blocks).await.unwrap();
        ChunkProposer::new(config, db, schedule)
    }

    #[tokio::test]
    async fn test_timeout_proposes_all_blocks() {
        let proposer = setup(config(), HardforkSchedule::all_active(), l2_blocks(0, 2, 100)).await;

        let chunk = proposer.try_propose().await.unwrap().unwrap();
        assert_eq!((chunk.index, chunk.start_block_number, chunk.end_block_number), (0, 0, 1));
        assert_eq!(chunk.codec_version, CodecVersion::V4);
        assert_eq!(chunk.total_l2_tx_num, 2);
        assert_eq!(chunk.total_l2_tx_bytes, 200);
        assert_eq!(chunk.parent_chunk_hash, B256::ZERO);

        assert_eq!(proposer.database.get_first_unchunked_block_number().await.unwrap(), 2);

        // every block is consumed.
        assert!(proposer.try_propose().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_waits_without_timeout() {
        let config = ChunkProposerConfig { chunk_timeout_sec: NO_TIMEOUT, ..config() };
        let proposer = setup(config, HardforkSchedule::all_active(), l2_blocks(0, 2, 100)).await;
        assert!(proposer.try_propose().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_window_full() {
        let config =
            ChunkProposerConfig { max_block_num_per_chunk: 3, chunk_timeout_sec: NO_TIMEOUT, ..config() };
        let proposer = setup(config, HardforkSchedule::all_active(), l2_blocks(0, 5, 100)).await;

        let chunk = proposer.try_propose().await.unwrap().unwrap();
        assert_eq!((chunk.start_block_number, chunk.end_block_number), (0, 2));
        // two blocks left, the window is not full.
        assert!(proposer.try_propose().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_contiguous_chunks_under_limits() {
        let config =
            ChunkProposerConfig { max_tx_num_per_chunk: 2, chunk_timeout_sec: NO_TIMEOUT, ..config() };
        let proposer = setup(config, HardforkSchedule::all_active(), l2_blocks(0, 5, 100)).await;

        let first = proposer.try_propose().await.unwrap().unwrap();
        let second = proposer.try_propose().await.unwrap().unwrap();
        assert_eq!((first.start_block_number, first.end_block_number), (0, 1));
        assert_eq!(second.start_block_number, first.end_block_number + 1);
        assert_eq!(second.end_block_number, 3);
        assert_eq!(second.parent_chunk_hash, first.hash);
        assert!(first.total_l2_tx_num <= 2 && second.total_l2_tx_num <= 2);

        // the last block waits for company or its timeout.
        assert!(proposer.try_propose().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_first_block_exceeding_limits() {
        let config = ChunkProposerConfig { max_row_consumption_per_chunk: 10, ..config() };
        let proposer = setup(config, HardforkSchedule::all_active(), l2_blocks(0, 2, 100)).await;

        let err = proposer.try_propose().await.unwrap_err();
        assert!(matches!(
            err,
            ProposerError::FirstItemExceedsLimits {
                item: "block",
                index: 0,
                exceeded: LimitExceeded { limit: "row_consumption", value: 100, max: 10 }
            }
        ));
        // the failure repeats every round.
        assert!(proposer.try_propose().await.is_err());
    }

    #[tokio::test]
    async fn test_curie_block_in_sole_chunk() {
        let schedule = HardforkSchedule {
            bernoulli_block: Some(0),
            curie_block: Some(2),
            darwin_time: None,
            darwin_v2_time: None,
        };
        let config = ChunkProposerConfig { chunk_timeout_sec: NO_TIMEOUT, ..config() };
        let proposer = setup(config, schedule, l2_blocks(0, 5, 100)).await;

        // the window is cut before the fork block and proposed right away.
        let chunk = proposer.try_propose().await.unwrap().unwrap();
        assert_eq!((chunk.start_block_number, chunk.end_block_number), (0, 1));
        assert_eq!(chunk.codec_version, CodecVersion::V1);

        let chunk = proposer.try_propose().await.unwrap().unwrap();
        assert_eq!((chunk.start_block_number, chunk.end_block_number), (2, 2));
        assert_eq!(chunk.codec_version, CodecVersion::V2);

        assert!(proposer.try_propose().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_block_count_fits_encoding() {
        let config = ChunkProposerConfig {
            max_block_num_per_chunk: 300,
            max_tx_num_per_chunk: 1_000,
            max_l1_commit_calldata_size_per_chunk: u64::MAX,
            max_l1_commit_gas_per_chunk: u64::MAX,
            max_row_consumption_per_chunk: u64::MAX,
            chunk_timeout_sec: NO_TIMEOUT,
            ..config()
        };
        let proposer = setup(config, HardforkSchedule::all_active(), l2_blocks(0, 300, 1)).await;

        // the full encodable window is proposed without waiting for the timeout.
        let chunk = proposer.try_propose().await.unwrap().unwrap();
        assert_eq!((chunk.start_block_number, chunk.end_block_number), (0, 254));
        let blocks = proposer
            .database
            .get_l2_blocks_from(chunk.start_block_number, 300)
            .await
            .unwrap()
            .into_iter()
            .take_while(|block| block.number <= chunk.end_block_number)
            .collect::<Vec<_>>();
        assert!(scroll_codec::encode_chunk(&blocks).is_ok());
    }

    #[tokio::test]
    async fn test_gap_in_blocks() {
        let mut blocks = l2_blocks(0, 2, 100);
        blocks.extend(l2_blocks(5, 2, 105));
        let proposer = setup(config(), HardforkSchedule::all_active(), blocks).await;

        let chunk = proposer.try_propose().await.unwrap().unwrap();
        assert_eq!(chunk.end_block_number, 1);
        // block 2 was not ingested yet.
        assert!(proposer.try_propose().await.unwrap().is_none());
    }
}
