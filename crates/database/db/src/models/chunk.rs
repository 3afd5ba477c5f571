use crate::DatabaseError;

use alloy_primitives::B256;
use rollup_relayer_primitives::Chunk;
use sea_orm::{entity::prelude::*, ActiveValue};

/// A database model that represents a chunk.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "chunk")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    index: i64,
    hash: Vec<u8>,
    start_block_number: i64,
    start_block_hash: Vec<u8>,
    end_block_number: i64,
    end_block_hash: Vec<u8>,
    start_block_time: i64,
    total_l1_messages_popped_before: i64,
    total_l1_messages_popped_in_chunk: i64,
    parent_chunk_hash: Vec<u8>,
    state_root: Vec<u8>,
    withdraw_root: Vec<u8>,
    codec_version: i16,
    total_l2_tx_gas: i64,
    total_l2_tx_num: i64,
    total_l1_commit_calldata_size: i64,
    total_l1_commit_gas: i64,
    total_l2_tx_bytes: i64,
    row_consumption: String,
    batch_hash: Option<Vec<u8>>,
}

/// The relation for the chunk model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the chunk model.
impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Chunk> for ActiveModel {
    type Error = DatabaseError;

    fn try_from(chunk: Chunk) -> Result<Self, Self::Error> {
        Ok(Self {
            index: ActiveValue::Set(chunk.index as i64),
            hash: ActiveValue::Set(chunk.hash.to_vec()),
            start_block_number: ActiveValue::Set(chunk.start_block_number as i64),
            start_block_hash: ActiveValue::Set(chunk.start_block_hash.to_vec()),
            end_block_number: ActiveValue::Set(chunk.end_block_number as i64),
            end_block_hash: ActiveValue::Set(chunk.end_block_hash.to_vec()),
            start_block_time: ActiveValue::Set(chunk.start_block_time as i64),
            total_l1_messages_popped_before: ActiveValue::Set(
                chunk.total_l1_messages_popped_before as i64,
            ),
            total_l1_messages_popped_in_chunk: ActiveValue::Set(
                chunk.total_l1_messages_popped_in_chunk as i64,
            ),
            parent_chunk_hash: ActiveValue::Set(chunk.parent_chunk_hash.to_vec()),
            state_root: ActiveValue::Set(chunk.state_root.to_vec()),
            withdraw_root: ActiveValue::Set(chunk.withdraw_root.to_vec()),
            codec_version: ActiveValue::Set(u8::from(chunk.codec_version).into()),
            total_l2_tx_gas: ActiveValue::Set(chunk.total_l2_tx_gas as i64),
            total_l2_tx_num: ActiveValue::Set(chunk.total_l2_tx_num as i64),
            total_l1_commit_calldata_size: ActiveValue::Set(
                chunk.total_l1_commit_calldata_size as i64,
            ),
            total_l1_commit_gas: ActiveValue::Set(chunk.total_l1_commit_gas as i64),
            total_l2_tx_bytes: ActiveValue::Set(chunk.total_l2_tx_bytes as i64),
            row_consumption: ActiveValue::Set(serde_json::to_string(&chunk.row_consumption)?),
            batch_hash: ActiveValue::Set(chunk.batch_hash.map(|h| h.to_vec())),
        })
    }
}

impl TryFrom<Model> for Chunk {
    type Error = DatabaseError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            index: value.index as u64,
            hash: B256::from_slice(&value.hash),
            start_block_number: value.start_block_number as u64,
            start_block_hash: B256::from_slice(&value.start_block_hash),
            end_block_number: value.end_block_number as u64,
            end_block_hash: B256::from_slice(&value.end_block_hash),
            start_block_time: value.start_block_time as u64,
            total_l1_messages_popped_before: value.total_l1_messages_popped_before as u64,
            total_l1_messages_popped_in_chunk: value.total_l1_messages_popped_in_chunk as u64,
            parent_chunk_hash: B256::from_slice(&value.parent_chunk_hash),
            state_root: B256::from_slice(&value.state_root),
            withdraw_root: B256::from_slice(&value.withdraw_root),
            codec_version: (value.codec_version as u8).try_into()?,
            total_l2_tx_gas: value.total_l2_tx_gas as u64,
            total_l2_tx_num: value.total_l2_tx_num as u64,
            total_l1_commit_calldata_size: value.total_l1_commit_calldata_size as u64,
            total_l1_commit_gas: value.total_l1_commit_gas as u64,
            total_l2_tx_bytes: value.total_l2_tx_bytes as u64,
            row_consumption: serde_json::from_str(&value.row_consumption)?,
            batch_hash: value.batch_hash.map(|h| B256::from_slice(&h)),
        })
    }
}
