/// The gas consumed per non zero byte of calldata.
pub const CALLDATA_NON_ZERO_BYTE_GAS: u64 = 16;

/// The size of a blob in bytes.
pub const MAX_BLOB_SIZE: u64 = 131_072;

/// The length in bytes of the fixed part of a batch header.
pub const BATCH_HEADER_BYTES_SIZE: u64 = 89;

/// The length in bytes of each item in the skipped L1 messages bitmap.
pub const SKIPPED_L1_MESSAGE_BITMAP_ITEM_BYTES_SIZE: u64 = 32;

/// The length in bytes of the part of the block context included in the chunk hash.
pub const BLOCK_CONTEXT_HASHED_BYTES_SIZE: usize = 58;

/// The maximum number of blocks in a chunk, its block count is encoded in one byte.
pub const MAX_BLOCKS_PER_CHUNK: u64 = u8::MAX as u64;
