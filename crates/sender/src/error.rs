use rollup_relayer_providers::ChainClientError;

/// An error occurring at the [`crate::Sender`] or [`crate::AccountPool`].
#[derive(Debug, thiserror::Error)]
pub enum SenderError {
    /// Every account of the pool is checked out.
    #[error("no available account")]
    NoAvailableAccount,
    /// The number of in-flight transactions reached the configured limit.
    #[error("pending pool is full")]
    PendingPoolFull,
    /// A transaction with the same id is already in flight.
    #[error("duplicate transaction id {0}")]
    DuplicateId(String),
    /// The account pool was created without accounts.
    #[error("empty account pool")]
    EmptyAccountPool,
    /// The sender configuration is invalid.
    #[error("invalid sender configuration: {0}")]
    InvalidConfig(&'static str),
    /// A chain client error occurred.
    #[error(transparent)]
    ChainClient(#[from] ChainClientError),
    /// A signing error occurred.
    #[error("failed to sign transaction: {0}")]
    Signer(#[from] alloy_signer::Error),
}

impl SenderError {
    /// Returns true if the error is an expected, retryable condition rather than a failure.
    pub const fn is_expected(&self) -> bool {
        matches!(self, Self::NoAvailableAccount | Self::PendingPoolFull | Self::DuplicateId(_))
    }
}
