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
                    .table(Bundle::Table)
                    .if_not_exists()
                    .col(pk_auto(Bundle::Index))
                    .col(binary_len(Bundle::Hash, HASH_LENGTH).unique_key())
                    .col(big_unsigned(Bundle::StartBatchIndex))
                    .col(binary_len(Bundle::StartBatchHash, HASH_LENGTH))
                    .col(big_unsigned(Bundle::EndBatchIndex))
                    .col(binary_len(Bundle::EndBatchHash, HASH_LENGTH))
                    .col(small_integer(Bundle::CodecVersion))
                    .col(small_integer(Bundle::RollupStatus))
                    .col(small_integer(Bundle::ProvingStatus))
                    .col(binary_null(Bundle::Proof))
                    .col(binary_len_null(Bundle::FinalizeTxHash, HASH_LENGTH))
                    .col(big_unsigned(Bundle::CreatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Bundle::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Bundle {
    Table,
    Index,
    Hash,
    StartBatchIndex,
    StartBatchHash,
    EndBatchIndex,
    EndBatchHash,
    CodecVersion,
    RollupStatus,
    ProvingStatus,
    Proof,
    FinalizeTxHash,
    CreatedAt,
}
