use alloy_primitives::Address;
use rollup_relayer_sender::SenderError;
use scroll_codec::CodecError;
use scroll_db::DatabaseError;

/// An error occurring at the [`crate::Relayer`].
#[derive(Debug, thiserror::Error)]
pub enum RelayerError {
    /// A database error occurred.
    #[error(transparent)]
    Database(#[from] DatabaseError),
    /// A codec error occurred.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// A submission failed.
    #[error(transparent)]
    Sender(#[from] SenderError),
    /// The genesis block is not in the database.
    #[error("missing genesis block")]
    MissingGenesisBlock,
    /// A batch referenced by another unit is not in the database.
    #[error("missing batch {0}")]
    MissingBatch(u64),
    /// An account signs for both the commit and the finalize sender.
    #[error("account {0} is shared by the commit and finalize senders")]
    SharedSenderAccount(Address),
    /// The confirmation channel of a sender was already taken.
    #[error("confirmation channel of the {0} sender already taken")]
    ConfirmationsTaken(&'static str),
}
