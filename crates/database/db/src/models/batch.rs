use crate::DatabaseError;

use alloy_primitives::B256;
use rollup_relayer_primitives::Batch;
use sea_orm::{entity::prelude::*, ActiveValue};

/// A database model that represents a batch.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "batch")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    index: i64,
    hash: Vec<u8>,
    data_hash: Vec<u8>,
    parent_batch_hash: Vec<u8>,
    start_chunk_index: i64,
    start_chunk_hash: Vec<u8>,
    end_chunk_index: i64,
    end_chunk_hash: Vec<u8>,
    start_block_number: i64,
    start_block_time: i64,
    end_block_number: i64,
    codec_version: i16,
    total_l1_messages_popped_before: i64,
    l1_messages_popped: i64,
    total_l1_commit_gas: i64,
    total_l1_commit_calldata_size: i64,
    batch_header: Vec<u8>,
    state_root: Vec<u8>,
    withdraw_root: Vec<u8>,
    rollup_status: i16,
    proving_status: i16,
    proof: Option<Vec<u8>>,
    commit_tx_hash: Option<Vec<u8>>,
    finalize_tx_hash: Option<Vec<u8>>,
    committed_at: Option<i64>,
    bundle_hash: Option<Vec<u8>>,
}

/// The relation for the batch model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the batch model.
impl ActiveModelBehavior for ActiveModel {}

impl From<Batch> for ActiveModel {
    fn from(batch: Batch) -> Self {
        Self {
            index: ActiveValue::Set(batch.index as i64),
            hash: ActiveValue::Set(batch.hash.to_vec()),
            data_hash: ActiveValue::Set(batch.data_hash.to_vec()),
            parent_batch_hash: ActiveValue::Set(batch.parent_batch_hash.to_vec()),
            start_chunk_index: ActiveValue::Set(batch.start_chunk_index as i64),
            start_chunk_hash: ActiveValue::Set(batch.start_chunk_hash.to_vec()),
            end_chunk_index: ActiveValue::Set(batch.end_chunk_index as i64),
            end_chunk_hash: ActiveValue::Set(batch.end_chunk_hash.to_vec()),
            start_block_number: ActiveValue::Set(batch.start_block_number as i64),
            start_block_time: ActiveValue::Set(batch.start_block_time as i64),
            end_block_number: ActiveValue::Set(batch.end_block_number as i64),
            codec_version: ActiveValue::Set(u8::from(batch.codec_version).into()),
            total_l1_messages_popped_before: ActiveValue::Set(
                batch.total_l1_messages_popped_before as i64,
            ),
            l1_messages_popped: ActiveValue::Set(batch.l1_messages_popped as i64),
            total_l1_commit_gas: ActiveValue::Set(batch.total_l1_commit_gas as i64),
            total_l1_commit_calldata_size: ActiveValue::Set(
                batch.total_l1_commit_calldata_size as i64,
            ),
            batch_header: ActiveValue::Set(batch.batch_header.to_vec()),
            state_root: ActiveValue::Set(batch.state_root.to_vec()),
            withdraw_root: ActiveValue::Set(batch.withdraw_root.to_vec()),
            rollup_status: ActiveValue::Set(batch.rollup_status.into()),
            proving_status: ActiveValue::Set(batch.proving_status.into()),
            proof: ActiveValue::Set(batch.proof.map(|p| p.to_vec())),
            commit_tx_hash: ActiveValue::Set(batch.commit_tx_hash.map(|h| h.to_vec())),
            finalize_tx_hash: ActiveValue::Set(batch.finalize_tx_hash.map(|h| h.to_vec())),
            committed_at: ActiveValue::Set(batch.committed_at.map(|t| t as i64)),
            bundle_hash: ActiveValue::Set(batch.bundle_hash.map(|h| h.to_vec())),
        }
    }
}

impl TryFrom<Model> for Batch {
    type Error = DatabaseError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            index: value.index as u64,
            hash: B256::from_slice(&value.hash),
            data_hash: B256::from_slice(&value.data_hash),
            parent_batch_hash: B256::from_slice(&value.parent_batch_hash),
            start_chunk_index: value.start_chunk_index as u64,
            start_chunk_hash: B256::from_slice(&value.start_chunk_hash),
            end_chunk_index: value.end_chunk_index as u64,
            end_chunk_hash: B256::from_slice(&value.end_chunk_hash),
            start_block_number: value.start_block_number as u64,
            start_block_time: value.start_block_time as u64,
            end_block_number: value.end_block_number as u64,
            codec_version: (value.codec_version as u8).try_into()?,
            total_l1_messages_popped_before: value.total_l1_messages_popped_before as u64,
            l1_messages_popped: value.l1_messages_popped as u64,
            total_l1_commit_gas: value.total_l1_commit_gas as u64,
            total_l1_commit_calldata_size: value.total_l1_commit_calldata_size as u64,
            batch_header: value.batch_header.into(),
            state_root: B256::from_slice(&value.state_root),
            withdraw_root: B256::from_slice(&value.withdraw_root),
            rollup_status: value.rollup_status.try_into()?,
            proving_status: value.proving_status.try_into()?,
            proof: value.proof.map(Into::into),
            commit_tx_hash: value.commit_tx_hash.map(|h| B256::from_slice(&h)),
            finalize_tx_hash: value.finalize_tx_hash.map(|h| B256::from_slice(&h)),
            committed_at: value.committed_at.map(|t| t as u64),
            bundle_hash: value.bundle_hash.map(|h| B256::from_slice(&h)),
        })
    }
}
