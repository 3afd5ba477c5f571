//! L1 commitment cost estimation and hashing for Scroll rollup units.
//!
//! The estimators approximate the gas, calldata and blob usage of committing chunks and batches
//! to the rollup contract. Costs are not additive across items: the batch estimate charges
//! per-chunk correction terms that depend on the chunk count and on the number of popped L1
//! messages, so every estimate is recomputed from the full item set.

pub use batch::{compute_data_hash, BatchHeader, BatchMetrics};
mod batch;

pub use blob::{padded_blob_size, uncompressed_batch_bytes_size};
mod blob;

pub use chunk::{compute_chunk_hash, encode_chunk, l1_messages_popped, ChunkMetrics};
mod chunk;

pub mod constants;

pub use error::CodecError;
mod error;

pub mod gas;
