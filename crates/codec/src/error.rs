/// An error occurring during cost estimation or hashing.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A chunk must contain at least one block.
    #[error("empty chunk")]
    EmptyChunk,
    /// A batch must contain at least one chunk.
    #[error("empty batch")]
    EmptyBatch,
    /// The chunk holds more blocks than its encoding can count.
    #[error("too many blocks in chunk: {0}")]
    TooManyBlocks(u64),
    /// The batch holds more chunks than its codec supports.
    #[error("too many chunks in batch: {count} > {max}")]
    TooManyChunks {
        /// The number of chunks.
        count: u64,
        /// The maximum allowed by the codec.
        max: u64,
    },
}
