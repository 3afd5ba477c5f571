use super::HASH_LENGTH;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(L2Block::Table)
                    .if_not_exists()
                    .col(pk_auto(L2Block::Number))
                    .col(binary_len(L2Block::Hash, HASH_LENGTH).unique_key())
                    .col(binary_len(L2Block::ParentHash, HASH_LENGTH))
                    .col(big_unsigned(L2Block::Timestamp))
                    .col(big_unsigned(L2Block::BaseFee))
                    .col(big_unsigned(L2Block::GasLimit))
                    .col(big_unsigned(L2Block::GasUsed))
                    .col(big_unsigned(L2Block::NumTransactions))
                    .col(big_unsigned(L2Block::NumL1Messages))
                    .col(big_unsigned_null(L2Block::LastL1MessageQueueIndex))
                    .col(text(L2Block::L2TxSizes))
                    .col(text(L2Block::RowConsumption))
                    .col(binary_len(L2Block::StateRoot, HASH_LENGTH))
                    .col(binary_len(L2Block::WithdrawRoot, HASH_LENGTH))
                    .col(binary_len_null(L2Block::ChunkHash, HASH_LENGTH))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_l2_block_chunk_hash")
                    .col(L2Block::ChunkHash)
                    .table(L2Block::Table)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(L2Block::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum L2Block {
    Table,
    Number,
    Hash,
    ParentHash,
    Timestamp,
    BaseFee,
    GasLimit,
    GasUsed,
    NumTransactions,
    NumL1Messages,
    LastL1MessageQueueIndex,
    L2TxSizes,
    RowConsumption,
    StateRoot,
    WithdrawRoot,
    ChunkHash,
}
