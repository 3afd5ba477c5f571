use rollup_relayer_primitives::CodecVersion;

/// Returns the blob space needed to store `data_size` bytes, where every 32 byte field element
/// holds 31 bytes of data behind a zero byte.
pub const fn padded_blob_size(data_size: u64) -> u64 {
    let mut padded = data_size / 31 * 32;
    if data_size % 31 != 0 {
        padded += 1 + data_size % 31;
    }
    padded
}

/// Returns the size of the blob payload before padding: the metadata sized for the codec's
/// maximum chunk count followed by the L2 transaction payloads.
///
/// Returns 0 for codecs that commit through calldata.
pub const fn uncompressed_batch_bytes_size(codec: CodecVersion, l2_tx_bytes: u64) -> u64 {
    if !codec.uses_blob() {
        return 0
    }
    2 + 4 * codec.max_chunks_per_batch() + l2_tx_bytes
}

/// Estimates the blob size of a unit carrying `l2_tx_bytes` of L2 transactions.
///
/// Compressing codecs are estimated on the uncompressed payload, an upper bound of the real size.
pub(crate) const fn blob_size(codec: CodecVersion, l2_tx_bytes: u64) -> u64 {
    if !codec.uses_blob() {
        return 0
    }
    padded_blob_size(uncompressed_batch_bytes_size(codec, l2_tx_bytes))
}
