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
                    .table(Batch::Table)
                    .if_not_exists()
                    .col(pk_auto(Batch::Index))
                    .col(binary_len(Batch::Hash, HASH_LENGTH).unique_key())
                    .col(binary_len(Batch::DataHash, HASH_LENGTH))
                    .col(binary_len(Batch::ParentBatchHash, HASH_LENGTH))
                    .col(big_unsigned(Batch::StartChunkIndex))
                    .col(binary_len(Batch::StartChunkHash, HASH_LENGTH))
                    .col(big_unsigned(Batch::EndChunkIndex))
                    .col(binary_len(Batch::EndChunkHash, HASH_LENGTH))
                    .col(big_unsigned(Batch::StartBlockNumber))
                    .col(big_unsigned(Batch::StartBlockTime))
                    .col(big_unsigned(Batch::EndBlockNumber))
                    .col(small_integer(Batch::CodecVersion))
                    .col(big_unsigned(Batch::TotalL1MessagesPoppedBefore))
                    .col(big_unsigned(Batch::L1MessagesPopped))
                    .col(big_unsigned(Batch::TotalL1CommitGas))
                    .col(big_unsigned(Batch::TotalL1CommitCalldataSize))
                    .col(binary(Batch::BatchHeader))
                    .col(binary_len(Batch::StateRoot, HASH_LENGTH))
                    .col(binary_len(Batch::WithdrawRoot, HASH_LENGTH))
                    .col(small_integer(Batch::RollupStatus))
                    .col(small_integer(Batch::ProvingStatus))
                    .col(binary_null(Batch::Proof))
                    .col(binary_len_null(Batch::CommitTxHash, HASH_LENGTH))
                    .col(binary_len_null(Batch::FinalizeTxHash, HASH_LENGTH))
                    .col(big_unsigned_null(Batch::CommittedAt))
                    .col(binary_len_null(Batch::BundleHash, HASH_LENGTH))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_batch_rollup_status")
                    .col(Batch::RollupStatus)
                    .table(Batch::Table)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Batch::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Batch {
    Table,
    Index,
    Hash,
    DataHash,
    ParentBatchHash,
    StartChunkIndex,
    StartChunkHash,
    EndChunkIndex,
    EndChunkHash,
    StartBlockNumber,
    StartBlockTime,
    EndBlockNumber,
    CodecVersion,
    TotalL1MessagesPoppedBefore,
    L1MessagesPopped,
    TotalL1CommitGas,
    TotalL1CommitCalldataSize,
    BatchHeader,
    StateRoot,
    WithdrawRoot,
    RollupStatus,
    ProvingStatus,
    Proof,
    CommitTxHash,
    FinalizeTxHash,
    CommittedAt,
    BundleHash,
}
