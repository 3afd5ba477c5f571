use crate::{
    packing::{pack, truncate_at_boundary, unix_time, Candidates, Deadline, ProposalTrigger},
    BundleProposerConfig, BundleProposerMetrics, Propose, ProposerError,
};

use rollup_relayer_primitives::{Batch, Bundle, CodecVersion, ProvingStatus, RollupStatus};
use scroll_db::{Database, DatabaseOperations};
use std::sync::Arc;

/// Groups contiguous unbundled batches into bundles finalized with a single proof.
///
/// Only batches of a bundled codec are considered, earlier batches are finalized one by one.
#[derive(Debug)]
pub struct BundleProposer {
    /// The proposer configuration.
    config: BundleProposerConfig,
    /// The database.
    database: Arc<Database>,
    /// The proposer metrics.
    metrics: BundleProposerMetrics,
}

impl BundleProposer {
    /// Returns a new [`BundleProposer`].
    pub fn new(config: BundleProposerConfig, database: Arc<Database>) -> Self {
        Self { config, database, metrics: BundleProposerMetrics::default() }
    }

    /// Proposes the next bundle if the unbundled batches allow it, returning the new bundle.
    pub async fn try_propose(&self) -> Result<Option<Bundle>, ProposerError> {
        self.metrics.propose_cycles.increment(1);
        let res = self.propose().await;
        if res.is_err() {
            self.metrics.propose_failures.increment(1);
        }
        res
    }

    async fn propose(&self) -> Result<Option<Bundle>, ProposerError> {
        let parent = self.database.get_latest_bundle().await?;
        let first_index = parent.as_ref().map_or(0, |b| b.end_batch_index + 1);
        let mut batches = self
            .database
            .get_batches_from(first_index, CodecVersion::V3, self.config.max_batch_num_per_bundle)
            .await?;
        let Some(first) = batches.first() else {
            tracing::trace!(target: "scroll::proposer::bundle", first_index, "no unbundled batches");
            return Ok(None)
        };
        let first_index = first.index;
        let first_timestamp = first.start_block_time;

        let mut window = self.config.max_batch_num_per_bundle as usize;
        let same_codec = truncate_at_boundary(&batches, |batch| batch.codec_version);
        if same_codec < batches.len() {
            batches.truncate(same_codec);
            window = same_codec;
        }

        let candidates =
            Candidates { item: "batch", first_index, items: batches.as_slice(), window };
        let deadline = Deadline {
            first_timestamp,
            timeout_secs: self.config.bundle_timeout_sec,
            now: unix_time(),
        };
        let Some(packed) = pack(candidates, deadline, |batches| Ok(batches.len()), |_| None)?
        else {
            tracing::debug!(target: "scroll::proposer::bundle", first_index, count = batches.len(), "pending batches are not enough and do not contain a timeout batch");
            self.metrics.batches_not_enough.increment(1);
            return Ok(None)
        };

        if packed.trigger == ProposalTrigger::Timeout {
            self.metrics.first_block_timeout_reached.increment(1);
        }
        self.commit(parent, &batches[..packed.count]).await.map(Some)
    }

    /// Persists the bundle and stamps its batches in one transaction.
    async fn commit(
        &self,
        parent: Option<Bundle>,
        batches: &[Batch],
    ) -> Result<Bundle, ProposerError> {
        let (first, last) = match (batches.first(), batches.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(scroll_codec::CodecError::EmptyBatch.into()),
        };

        let bundle = Bundle {
            index: parent.as_ref().map_or(0, |p| p.index + 1),
            hash: Bundle::compute_hash(first.hash, last.hash),
            start_batch_index: first.index,
            start_batch_hash: first.hash,
            end_batch_index: last.index,
            end_batch_hash: last.hash,
            codec_version: first.codec_version,
            rollup_status: RollupStatus::Pending,
            proving_status: ProvingStatus::Unassigned,
            proof: None,
            finalize_tx_hash: None,
            created_at: unix_time(),
        };

        let tx = self.database.tx().await?;
        tx.insert_bundle(bundle.clone()).await?;
        tx.set_bundle_hash_for_batches(bundle.start_batch_index, bundle.end_batch_index, bundle.hash)
            .await?;
        tx.commit().await?;

        tracing::info!(target: "scroll::proposer::bundle", index = bundle.index, hash = ?bundle.hash, start_batch = bundle.start_batch_index, end_batch = bundle.end_batch_index, codec = %bundle.codec_version, "proposed bundle");
        self.metrics.proposed_bundles.increment(1);
        self.metrics.bundle_batches_num.set(batches.len() as f64);

        Ok(bundle)
    }
}

#[async_trait::async_trait]
impl Propose for BundleProposer {
    fn unit(&self) -> &'static str {
        "bundle"
    }

    async fn propose_next(&self) -> Result<Option<u64>, ProposerError> {
        Ok(self.try_propose().await?.map(|bundle| bundle.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{setup_batches, NO_TIMEOUT};
    use rollup_relayer_primitives::HardforkSchedule;

    fn config(max_batch_num_per_bundle: u64, bundle_timeout_sec: u64) -> BundleProposerConfig {
        BundleProposerConfig { max_batch_num_per_bundle, bundle_timeout_sec, ..Default::default() }
    }

    #[tokio::test]
    async fn test_timeout_proposes_all_batches() {
        let db = setup_batches(HardforkSchedule::all_active(), 3).await;
        let proposer = BundleProposer::new(config(10, 0), db.clone());

        let bundle = proposer.try_propose().await.unwrap().unwrap();
        assert_eq!((bundle.index, bundle.start_batch_index, bundle.end_batch_index), (0, 0, 2));
        assert_eq!(bundle.hash, Bundle::compute_hash(bundle.start_batch_hash, bundle.end_batch_hash));
        assert_eq!(bundle.rollup_status, RollupStatus::Pending);

        let batch = db.get_batch_by_index(1).await.unwrap().unwrap();
        assert_eq!(batch.bundle_hash, Some(bundle.hash));
        assert_eq!(db.get_first_unbundled_batch_index().await.unwrap(), 3);
        assert!(proposer.try_propose().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_window_full() {
        let db = setup_batches(HardforkSchedule::all_active(), 3).await;
        let proposer = BundleProposer::new(config(2, NO_TIMEOUT), db);

        let bundle = proposer.try_propose().await.unwrap().unwrap();
        assert_eq!((bundle.start_batch_index, bundle.end_batch_index), (0, 1));
        assert!(proposer.try_propose().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_skips_unbundled_codecs() {
        // batches 0 and 1 predate Darwin.
        let schedule = HardforkSchedule {
            darwin_time: Some(102),
            darwin_v2_time: None,
            ..HardforkSchedule::all_active()
        };
        let db = setup_batches(schedule, 5).await;
        let proposer = BundleProposer::new(config(10, 0), db);

        let bundle = proposer.try_propose().await.unwrap().unwrap();
        assert_eq!((bundle.start_batch_index, bundle.end_batch_index), (2, 4));
        assert_eq!(bundle.codec_version, CodecVersion::V3);
    }

    #[tokio::test]
    async fn test_truncates_at_codec_upgrade() {
        let schedule = HardforkSchedule { darwin_v2_time: Some(102), ..HardforkSchedule::all_active() };
        let db = setup_batches(schedule, 4).await;
        let proposer = BundleProposer::new(config(10, NO_TIMEOUT), db);

        let bundle = proposer.try_propose().await.unwrap().unwrap();
        assert_eq!((bundle.start_batch_index, bundle.end_batch_index), (0, 1));
        assert_eq!(bundle.codec_version, CodecVersion::V3);

        let next = proposer.try_propose().await.unwrap();
        assert!(next.is_none());
    }
}
