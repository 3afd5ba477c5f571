//! Primitive types for the rollup relayer.
//!
//! L2 blocks are packed into [`Chunk`]s, chunks into [`Batch`]es and batches into [`Bundle`]s.
//! Each tier is a contiguous run of the tier below it and is committed to L1 as a single unit.

pub use block::{BlockContext, L2Block, RowConsumption, SubCircuitRowUsage, BLOCK_CONTEXT_SIZE};
mod block;

pub use batch::Batch;
mod batch;

pub use bundle::Bundle;
mod bundle;

pub use chunk::Chunk;
mod chunk;

pub use codec::CodecVersion;
mod codec;

pub use error::PrimitiveError;
mod error;

pub use hardfork::{CodecVersionResolver, HardforkSchedule};
mod hardfork;

pub use status::{ProvingStatus, RollupStatus};
mod status;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
