use crate::LimitExceeded;

use scroll_codec::CodecError;
use scroll_db::DatabaseError;

/// An error occurring at a proposer.
#[derive(Debug, thiserror::Error)]
pub enum ProposerError {
    /// A database error occurred.
    #[error(transparent)]
    Database(#[from] DatabaseError),
    /// A codec error occurred.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The first candidate of a unit breaches a ceiling on its own. The configuration or the item
    /// needs a manual fix.
    #[error("first {item} {index} exceeds limits: {exceeded}")]
    FirstItemExceedsLimits {
        /// The kind of item.
        item: &'static str,
        /// The index or number of the item.
        index: u64,
        /// The breached ceiling.
        exceeded: LimitExceeded,
    },
}
