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
                    .table(Chunk::Table)
                    .if_not_exists()
                    .col(pk_auto(Chunk::Index))
                    .col(binary_len(Chunk::Hash, HASH_LENGTH).unique_key())
                    .col(big_unsigned(Chunk::StartBlockNumber))
                    .col(binary_len(Chunk::StartBlockHash, HASH_LENGTH))
                    .col(big_unsigned(Chunk::EndBlockNumber))
                    .col(binary_len(Chunk::EndBlockHash, HASH_LENGTH))
                    .col(big_unsigned(Chunk::StartBlockTime))
                    .col(big_unsigned(Chunk::TotalL1MessagesPoppedBefore))
                    .col(big_unsigned(Chunk::TotalL1MessagesPoppedInChunk))
                    .col(binary_len(Chunk::ParentChunkHash, HASH_LENGTH))
                    .col(binary_len(Chunk::StateRoot, HASH_LENGTH))
                    .col(binary_len(Chunk::WithdrawRoot, HASH_LENGTH))
                    .col(small_integer(Chunk::CodecVersion))
                    .col(big_unsigned(Chunk::TotalL2TxGas))
                    .col(big_unsigned(Chunk::TotalL2TxNum))
                    .col(big_unsigned(Chunk::TotalL1CommitCalldataSize))
                    .col(big_unsigned(Chunk::TotalL1CommitGas))
                    .col(big_unsigned(Chunk::TotalL2TxBytes))
                    .col(text(Chunk::RowConsumption))
                    .col(binary_len_null(Chunk::BatchHash, HASH_LENGTH))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Chunk::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Chunk {
    Table,
    Index,
    Hash,
    StartBlockNumber,
    StartBlockHash,
    EndBlockNumber,
    EndBlockHash,
    StartBlockTime,
    TotalL1MessagesPoppedBefore,
    TotalL1MessagesPoppedInChunk,
    ParentChunkHash,
    StateRoot,
    WithdrawRoot,
    CodecVersion,
    TotalL2TxGas,
    TotalL2TxNum,
    TotalL1CommitCalldataSize,
    TotalL1CommitGas,
    TotalL2TxBytes,
    RowConsumption,
    BatchHash,
}
