use crate::DatabaseError;

use alloy_primitives::B256;
use rollup_relayer_primitives::L2Block;
use sea_orm::{entity::prelude::*, ActiveValue};

/// A database model that represents an L2 block.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "l2_block")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    number: i64,
    hash: Vec<u8>,
    parent_hash: Vec<u8>,
    timestamp: i64,
    base_fee: i64,
    gas_limit: i64,
    gas_used: i64,
    num_transactions: i64,
    num_l1_messages: i64,
    last_l1_message_queue_index: Option<i64>,
    l2_tx_sizes: String,
    row_consumption: String,
    state_root: Vec<u8>,
    withdraw_root: Vec<u8>,
    chunk_hash: Option<Vec<u8>>,
}

/// The relation for the L2 block model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the L2 block model.
impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<L2Block> for ActiveModel {
    type Error = DatabaseError;

    fn try_from(block: L2Block) -> Result<Self, Self::Error> {
        Ok(Self {
            number: ActiveValue::Set(block.number as i64),
            hash: ActiveValue::Set(block.hash.to_vec()),
            parent_hash: ActiveValue::Set(block.parent_hash.to_vec()),
            timestamp: ActiveValue::Set(block.timestamp as i64),
            base_fee: ActiveValue::Set(block.base_fee as i64),
            gas_limit: ActiveValue::Set(block.gas_limit as i64),
            gas_used: ActiveValue::Set(block.gas_used as i64),
            num_transactions: ActiveValue::Set(block.num_transactions as i64),
            num_l1_messages: ActiveValue::Set(block.num_l1_messages as i64),
            last_l1_message_queue_index: ActiveValue::Set(
                block.last_l1_message_queue_index.map(|i| i as i64),
            ),
            l2_tx_sizes: ActiveValue::Set(serde_json::to_string(&block.l2_tx_sizes)?),
            row_consumption: ActiveValue::Set(serde_json::to_string(&block.row_consumption)?),
            state_root: ActiveValue::Set(block.state_root.to_vec()),
            withdraw_root: ActiveValue::Set(block.withdraw_root.to_vec()),
            chunk_hash: ActiveValue::Set(None),
        })
    }
}

impl TryFrom<Model> for L2Block {
    type Error = DatabaseError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            number: value.number as u64,
            hash: B256::from_slice(&value.hash),
            parent_hash: B256::from_slice(&value.parent_hash),
            timestamp: value.timestamp as u64,
            base_fee: value.base_fee as u64,
            gas_limit: value.gas_limit as u64,
            gas_used: value.gas_used as u64,
            num_transactions: value.num_transactions as u64,
            num_l1_messages: value.num_l1_messages as u64,
            last_l1_message_queue_index: value.last_l1_message_queue_index.map(|i| i as u64),
            l2_tx_sizes: serde_json::from_str(&value.l2_tx_sizes)?,
            row_consumption: serde_json::from_str(&value.row_consumption)?,
            state_root: B256::from_slice(&value.state_root),
            withdraw_root: B256::from_slice(&value.withdraw_root),
        })
    }
}
