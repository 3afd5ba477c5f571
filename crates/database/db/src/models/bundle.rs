use crate::DatabaseError;

use alloy_primitives::B256;
use rollup_relayer_primitives::Bundle;
use sea_orm::{entity::prelude::*, ActiveValue};

/// A database model that represents a bundle.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bundle")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    index: i64,
    hash: Vec<u8>,
    start_batch_index: i64,
    start_batch_hash: Vec<u8>,
    end_batch_index: i64,
    end_batch_hash: Vec<u8>,
    codec_version: i16,
    rollup_status: i16,
    proving_status: i16,
    proof: Option<Vec<u8>>,
    finalize_tx_hash: Option<Vec<u8>>,
    created_at: i64,
}

/// The relation for the bundle model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the bundle model.
impl ActiveModelBehavior for ActiveModel {}

impl From<Bundle> for ActiveModel {
    fn from(bundle: Bundle) -> Self {
        Self {
            index: ActiveValue::Set(bundle.index as i64),
            hash: ActiveValue::Set(bundle.hash.to_vec()),
            start_batch_index: ActiveValue::Set(bundle.start_batch_index as i64),
            start_batch_hash: ActiveValue::Set(bundle.start_batch_hash.to_vec()),
            end_batch_index: ActiveValue::Set(bundle.end_batch_index as i64),
            end_batch_hash: ActiveValue::Set(bundle.end_batch_hash.to_vec()),
            codec_version: ActiveValue::Set(u8::from(bundle.codec_version).into()),
            rollup_status: ActiveValue::Set(bundle.rollup_status.into()),
            proving_status: ActiveValue::Set(bundle.proving_status.into()),
            proof: ActiveValue::Set(bundle.proof.map(|p| p.to_vec())),
            finalize_tx_hash: ActiveValue::Set(bundle.finalize_tx_hash.map(|h| h.to_vec())),
            created_at: ActiveValue::Set(bundle.created_at as i64),
        }
    }
}

impl TryFrom<Model> for Bundle {
    type Error = DatabaseError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            index: value.index as u64,
            hash: B256::from_slice(&value.hash),
            start_batch_index: value.start_batch_index as u64,
            start_batch_hash: B256::from_slice(&value.start_batch_hash),
            end_batch_index: value.end_batch_index as u64,
            end_batch_hash: B256::from_slice(&value.end_batch_hash),
            codec_version: (value.codec_version as u8).try_into()?,
            rollup_status: value.rollup_status.try_into()?,
            proving_status: value.proving_status.try_into()?,
            proof: value.proof.map(Into::into),
            finalize_tx_hash: value.finalize_tx_hash.map(|h| B256::from_slice(&h)),
            created_at: value.created_at as u64,
        })
    }
}
