use super::{models, DatabaseError};
use crate::DatabaseConnectionProvider;

use alloy_primitives::{Bytes, B256};
use rollup_relayer_primitives::{
    Batch, Bundle, Chunk, CodecVersion, L2Block, ProvingStatus, RollupStatus,
};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// The [`DatabaseOperations`] trait provides methods for interacting with the database.
#[async_trait::async_trait]
pub trait DatabaseOperations: DatabaseConnectionProvider {
    /// Insert [`L2Block`]s into the database.
    async fn insert_l2_blocks(&self, blocks: Vec<L2Block>) -> Result<(), DatabaseError> {
        tracing::trace!(target: "scroll::db", count = blocks.len(), "Inserting L2 blocks into database.");
        if blocks.is_empty() {
            return Ok(())
        }
        let blocks = blocks
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<models::l2_block::ActiveModel>, _>>()?;
        models::l2_block::Entity::insert_many(blocks).exec(self.get_connection()).await?;
        Ok(())
    }

    /// Get the number of the first block not included in a chunk.
    ///
    /// Returns 0 if no chunk was ever proposed.
    async fn get_first_unchunked_block_number(&self) -> Result<u64, DatabaseError> {
        Ok(self.get_latest_chunk().await?.map(|c| c.end_block_number + 1).unwrap_or_default())
    }

    /// Get at most `limit` [`L2Block`]s with a number greater or equal to `number`, ascending.
    async fn get_l2_blocks_from(
        &self,
        number: u64,
        limit: u64,
    ) -> Result<Vec<L2Block>, DatabaseError> {
        models::l2_block::Entity::find()
            .filter(models::l2_block::Column::Number.gte(number as i64))
            .order_by_asc(models::l2_block::Column::Number)
            .limit(limit)
            .all(self.get_connection())
            .await?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    /// Get the [`L2Block`]s in the inclusive range `[start, end]`, ascending.
    async fn get_l2_blocks_in_range(
        &self,
        start: u64,
        end: u64,
    ) -> Result<Vec<L2Block>, DatabaseError> {
        models::l2_block::Entity::find()
            .filter(models::l2_block::Column::Number.between(start as i64, end as i64))
            .order_by_asc(models::l2_block::Column::Number)
            .all(self.get_connection())
            .await?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    /// Set the chunk hash of the blocks in the inclusive range `[start, end]`.
    async fn set_chunk_hash_for_blocks(
        &self,
        start: u64,
        end: u64,
        chunk_hash: B256,
    ) -> Result<(), DatabaseError> {
        tracing::trace!(target: "scroll::db", start, end, ?chunk_hash, "Setting chunk hash for L2 blocks.");
        models::l2_block::Entity::update_many()
            .col_expr(models::l2_block::Column::ChunkHash, Expr::value(chunk_hash.to_vec()))
            .filter(models::l2_block::Column::Number.between(start as i64, end as i64))
            .exec(self.get_connection())
            .await?;
        Ok(())
    }

    /// Insert a [`Chunk`] into the database.
    async fn insert_chunk(&self, chunk: Chunk) -> Result<(), DatabaseError> {
        tracing::trace!(target: "scroll::db", chunk_hash = ?chunk.hash, chunk_index = chunk.index, "Inserting chunk into database.");
        let chunk: models::chunk::ActiveModel = chunk.try_into()?;
        chunk.insert(self.get_connection()).await?;
        Ok(())
    }

    /// Get the [`Chunk`] with the highest index.
    async fn get_latest_chunk(&self) -> Result<Option<Chunk>, DatabaseError> {
        models::chunk::Entity::find()
            .order_by_desc(models::chunk::Column::Index)
            .one(self.get_connection())
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Get a [`Chunk`] by its index.
    async fn get_chunk_by_index(&self, index: u64) -> Result<Option<Chunk>, DatabaseError> {
        models::chunk::Entity::find_by_id(index as i64)
            .one(self.get_connection())
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Get the index of the first chunk not included in a batch.
    ///
    /// Returns 0 if no batch was ever proposed.
    async fn get_first_unbatched_chunk_index(&self) -> Result<u64, DatabaseError> {
        Ok(self.get_latest_batch().await?.map(|b| b.end_chunk_index + 1).unwrap_or_default())
    }

    /// Get at most `limit` [`Chunk`]s with an index greater or equal to `index`, ascending.
    async fn get_chunks_from(&self, index: u64, limit: u64) -> Result<Vec<Chunk>, DatabaseError> {
        models::chunk::Entity::find()
            .filter(models::chunk::Column::Index.gte(index as i64))
            .order_by_asc(models::chunk::Column::Index)
            .limit(limit)
            .all(self.get_connection())
            .await?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    /// Get the [`Chunk`]s in the inclusive index range `[start, end]`, ascending.
    async fn get_chunks_in_range(&self, start: u64, end: u64) -> Result<Vec<Chunk>, DatabaseError> {
        models::chunk::Entity::find()
            .filter(models::chunk::Column::Index.between(start as i64, end as i64))
            .order_by_asc(models::chunk::Column::Index)
            .all(self.get_connection())
            .await?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    /// Set the batch hash of the chunks in the inclusive index range `[start, end]`.
    async fn set_batch_hash_for_chunks(
        &self,
        start: u64,
        end: u64,
        batch_hash: B256,
    ) -> Result<(), DatabaseError> {
        tracing::trace!(target: "scroll::db", start, end, ?batch_hash, "Setting batch hash for chunks.");
        models::chunk::Entity::update_many()
            .col_expr(models::chunk::Column::BatchHash, Expr::value(batch_hash.to_vec()))
            .filter(models::chunk::Column::Index.between(start as i64, end as i64))
            .exec(self.get_connection())
            .await?;
        Ok(())
    }

    /// Insert a [`Batch`] into the database.
    async fn insert_batch(&self, batch: Batch) -> Result<(), DatabaseError> {
        tracing::trace!(target: "scroll::db", batch_hash = ?batch.hash, batch_index = batch.index, "Inserting batch into database.");
        let batch: models::batch::ActiveModel = batch.into();
        batch.insert(self.get_connection()).await?;
        Ok(())
    }

    /// Get the [`Batch`] with the highest index.
    async fn get_latest_batch(&self) -> Result<Option<Batch>, DatabaseError> {
        models::batch::Entity::find()
            .order_by_desc(models::batch::Column::Index)
            .one(self.get_connection())
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Get a [`Batch`] by its index.
    async fn get_batch_by_index(&self, index: u64) -> Result<Option<Batch>, DatabaseError> {
        models::batch::Entity::find_by_id(index as i64)
            .one(self.get_connection())
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Get a [`Batch`] by its hash.
    async fn get_batch_by_hash(&self, hash: B256) -> Result<Option<Batch>, DatabaseError> {
        models::batch::Entity::find()
            .filter(models::batch::Column::Hash.eq(hash.to_vec()))
            .one(self.get_connection())
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Get the index of the first batch not included in a bundle.
    ///
    /// Returns 0 if no bundle was ever proposed.
    async fn get_first_unbundled_batch_index(&self) -> Result<u64, DatabaseError> {
        Ok(self.get_latest_bundle().await?.map(|b| b.end_batch_index + 1).unwrap_or_default())
    }

    /// Get at most `limit` [`Batch`]es with an index greater or equal to `index` and a codec
    /// version greater or equal to `min_codec_version`, ascending.
    async fn get_batches_from(
        &self,
        index: u64,
        min_codec_version: CodecVersion,
        limit: u64,
    ) -> Result<Vec<Batch>, DatabaseError> {
        models::batch::Entity::find()
            .filter(
                Condition::all()
                    .add(models::batch::Column::Index.gte(index as i64))
                    .add(models::batch::Column::CodecVersion.gte(u8::from(min_codec_version))),
            )
            .order_by_asc(models::batch::Column::Index)
            .limit(limit)
            .all(self.get_connection())
            .await?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    /// Set the bundle hash of the batches in the inclusive index range `[start, end]`.
    async fn set_bundle_hash_for_batches(
        &self,
        start: u64,
        end: u64,
        bundle_hash: B256,
    ) -> Result<(), DatabaseError> {
        tracing::trace!(target: "scroll::db", start, end, ?bundle_hash, "Setting bundle hash for batches.");
        models::batch::Entity::update_many()
            .col_expr(models::batch::Column::BundleHash, Expr::value(bundle_hash.to_vec()))
            .filter(models::batch::Column::Index.between(start as i64, end as i64))
            .exec(self.get_connection())
            .await?;
        Ok(())
    }

    /// Get at most `limit` batches waiting for a commit transaction, ascending.
    ///
    /// Batches whose commit transaction reverted are returned as well.
    async fn get_pending_batches(&self, limit: u64) -> Result<Vec<Batch>, DatabaseError> {
        models::batch::Entity::find()
            .filter(models::batch::Column::RollupStatus.is_in([
                i16::from(RollupStatus::Pending),
                i16::from(RollupStatus::CommitFailed),
            ]))
            .order_by_asc(models::batch::Column::Index)
            .limit(limit)
            .all(self.get_connection())
            .await?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    /// Get the committed [`Batch`] with the lowest index.
    async fn get_earliest_committed_batch(&self) -> Result<Option<Batch>, DatabaseError> {
        models::batch::Entity::find()
            .filter(models::batch::Column::RollupStatus.eq(i16::from(RollupStatus::Committed)))
            .order_by_asc(models::batch::Column::Index)
            .one(self.get_connection())
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Update the rollup status and commit transaction hash of a batch.
    ///
    /// Entering [`RollupStatus::Committed`] stamps the commit time.
    async fn update_batch_commit_status(
        &self,
        hash: B256,
        status: RollupStatus,
        tx_hash: Option<B256>,
    ) -> Result<(), DatabaseError> {
        tracing::trace!(target: "scroll::db", batch_hash = ?hash, %status, ?tx_hash, "Updating batch commit status.");
        let mut update = models::batch::Entity::update_many()
            .col_expr(models::batch::Column::RollupStatus, Expr::value(i16::from(status)));
        if let Some(tx_hash) = tx_hash {
            update =
                update.col_expr(models::batch::Column::CommitTxHash, Expr::value(tx_hash.to_vec()));
        }
        if status == RollupStatus::Committed {
            update = update
                .col_expr(models::batch::Column::CommittedAt, Expr::value(unix_time() as i64));
        }
        let res = update
            .filter(models::batch::Column::Hash.eq(hash.to_vec()))
            .exec(self.get_connection())
            .await?;
        if res.rows_affected == 0 {
            tracing::error!(target: "scroll::db", batch_hash = ?hash, "Batch not found in DB when updating commit status.");
            return Err(DatabaseError::BatchNotFound(hash))
        }
        Ok(())
    }

    /// Update the rollup status and finalize transaction hash of a batch.
    async fn update_batch_finalize_status(
        &self,
        hash: B256,
        status: RollupStatus,
        tx_hash: Option<B256>,
    ) -> Result<(), DatabaseError> {
        tracing::trace!(target: "scroll::db", batch_hash = ?hash, %status, ?tx_hash, "Updating batch finalize status.");
        let mut update = models::batch::Entity::update_many()
            .col_expr(models::batch::Column::RollupStatus, Expr::value(i16::from(status)));
        if let Some(tx_hash) = tx_hash {
            update = update
                .col_expr(models::batch::Column::FinalizeTxHash, Expr::value(tx_hash.to_vec()));
        }
        let res = update
            .filter(models::batch::Column::Hash.eq(hash.to_vec()))
            .exec(self.get_connection())
            .await?;
        if res.rows_affected == 0 {
            tracing::error!(target: "scroll::db", batch_hash = ?hash, "Batch not found in DB when updating finalize status.");
            return Err(DatabaseError::BatchNotFound(hash))
        }
        Ok(())
    }

    /// Update the proving status of a batch.
    async fn update_batch_proving_status(
        &self,
        hash: B256,
        status: ProvingStatus,
    ) -> Result<(), DatabaseError> {
        let res = models::batch::Entity::update_many()
            .col_expr(models::batch::Column::ProvingStatus, Expr::value(i16::from(status)))
            .filter(models::batch::Column::Hash.eq(hash.to_vec()))
            .exec(self.get_connection())
            .await?;
        if res.rows_affected == 0 {
            return Err(DatabaseError::BatchNotFound(hash))
        }
        Ok(())
    }

    /// Store the proof of a batch and mark it as verified.
    async fn update_batch_proof(&self, hash: B256, proof: Bytes) -> Result<(), DatabaseError> {
        tracing::trace!(target: "scroll::db", batch_hash = ?hash, "Storing batch proof.");
        let res = models::batch::Entity::update_many()
            .col_expr(models::batch::Column::Proof, Expr::value(proof.to_vec()))
            .col_expr(
                models::batch::Column::ProvingStatus,
                Expr::value(i16::from(ProvingStatus::Verified)),
            )
            .filter(models::batch::Column::Hash.eq(hash.to_vec()))
            .exec(self.get_connection())
            .await?;
        if res.rows_affected == 0 {
            return Err(DatabaseError::BatchNotFound(hash))
        }
        Ok(())
    }

    /// Insert a [`Bundle`] into the database.
    async fn insert_bundle(&self, bundle: Bundle) -> Result<(), DatabaseError> {
        tracing::trace!(target: "scroll::db", bundle_hash = ?bundle.hash, bundle_index = bundle.index, "Inserting bundle into database.");
        let bundle: models::bundle::ActiveModel = bundle.into();
        bundle.insert(self.get_connection()).await?;
        Ok(())
    }

    /// Get the [`Bundle`] with the highest index.
    async fn get_latest_bundle(&self) -> Result<Option<Bundle>, DatabaseError> {
        models::bundle::Entity::find()
            .order_by_desc(models::bundle::Column::Index)
            .one(self.get_connection())
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Get a [`Bundle`] by its hash.
    async fn get_bundle_by_hash(&self, hash: B256) -> Result<Option<Bundle>, DatabaseError> {
        models::bundle::Entity::find()
            .filter(models::bundle::Column::Hash.eq(hash.to_vec()))
            .one(self.get_connection())
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Get the pending [`Bundle`] with the lowest index.
    async fn get_first_pending_bundle(&self) -> Result<Option<Bundle>, DatabaseError> {
        models::bundle::Entity::find()
            .filter(models::bundle::Column::RollupStatus.eq(i16::from(RollupStatus::Pending)))
            .order_by_asc(models::bundle::Column::Index)
            .one(self.get_connection())
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Update the rollup status and finalize transaction hash of a bundle and of every batch it
    /// contains.
    async fn update_bundle_finalize_status(
        &self,
        hash: B256,
        status: RollupStatus,
        tx_hash: Option<B256>,
    ) -> Result<(), DatabaseError> {
        tracing::trace!(target: "scroll::db", bundle_hash = ?hash, %status, ?tx_hash, "Updating bundle finalize status.");
        let mut bundle_update = models::bundle::Entity::update_many()
            .col_expr(models::bundle::Column::RollupStatus, Expr::value(i16::from(status)));
        let mut batch_update = models::batch::Entity::update_many()
            .col_expr(models::batch::Column::RollupStatus, Expr::value(i16::from(status)));
        if let Some(tx_hash) = tx_hash {
            bundle_update = bundle_update
                .col_expr(models::bundle::Column::FinalizeTxHash, Expr::value(tx_hash.to_vec()));
            batch_update = batch_update
                .col_expr(models::batch::Column::FinalizeTxHash, Expr::value(tx_hash.to_vec()));
        }

        let res = bundle_update
            .filter(models::bundle::Column::Hash.eq(hash.to_vec()))
            .exec(self.get_connection())
            .await?;
        if res.rows_affected == 0 {
            tracing::error!(target: "scroll::db", bundle_hash = ?hash, "Bundle not found in DB when updating finalize status.");
            return Err(DatabaseError::BundleNotFound(hash))
        }
        batch_update
            .filter(models::batch::Column::BundleHash.eq(hash.to_vec()))
            .exec(self.get_connection())
            .await?;
        Ok(())
    }

    /// Update the proving status of a bundle.
    async fn update_bundle_proving_status(
        &self,
        hash: B256,
        status: ProvingStatus,
    ) -> Result<(), DatabaseError> {
        let res = models::bundle::Entity::update_many()
            .col_expr(models::bundle::Column::ProvingStatus, Expr::value(i16::from(status)))
            .filter(models::bundle::Column::Hash.eq(hash.to_vec()))
            .exec(self.get_connection())
            .await?;
        if res.rows_affected == 0 {
            return Err(DatabaseError::BundleNotFound(hash))
        }
        Ok(())
    }

    /// Store the proof of a bundle and mark it as verified.
    async fn update_bundle_proof(&self, hash: B256, proof: Bytes) -> Result<(), DatabaseError> {
        tracing::trace!(target: "scroll::db", bundle_hash = ?hash, "Storing bundle proof.");
        let res = models::bundle::Entity::update_many()
            .col_expr(models::bundle::Column::Proof, Expr::value(proof.to_vec()))
            .col_expr(
                models::bundle::Column::ProvingStatus,
                Expr::value(i16::from(ProvingStatus::Verified)),
            )
            .filter(models::bundle::Column::Hash.eq(hash.to_vec()))
            .exec(self.get_connection())
            .await?;
        if res.rows_affected == 0 {
            return Err(DatabaseError::BundleNotFound(hash))
        }
        Ok(())
    }
}

impl<T> DatabaseOperations for T where T: DatabaseConnectionProvider + Sync {}

/// Returns the current unix time in seconds.
fn unix_time() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
