// `async_trait` impls of `MigrationTrait` cannot name the `SchemaManager` lifetime.
#![allow(elided_lifetimes_in_paths)]

pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_l2_block_table;
mod m20240601_000002_create_chunk_table;
mod m20240601_000003_create_batch_table;
mod m20240601_000004_create_bundle_table;

/// The length in bytes of every hash column.
const HASH_LENGTH: u32 = 32;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_l2_block_table::Migration),
            Box::new(m20240601_000002_create_chunk_table::Migration),
            Box::new(m20240601_000003_create_batch_table::Migration),
            Box::new(m20240601_000004_create_bundle_table::Migration),
        ]
    }
}
