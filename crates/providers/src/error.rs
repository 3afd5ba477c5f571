use alloy_transport::{RpcError, TransportErrorKind};

/// Node error messages signalling that the nonce of a transaction was already used.
const NONCE_CONFLICT_MESSAGES: [&str; 3] =
    ["nonce too low", "replacement transaction underpriced", "already known"];

/// An error occurring at the [`crate::ChainClient`].
#[derive(Debug, thiserror::Error)]
pub enum ChainClientError {
    /// L1 RPC error.
    #[error(transparent)]
    Rpc(#[from] RpcError<TransportErrorKind>),
    /// The node returned no block for the requested tag.
    #[error("missing block for {0}")]
    MissingBlock(String),
    /// The node rejected the request.
    #[error("rejected: {0}")]
    Rejected(String),
}

impl ChainClientError {
    /// Returns true if the error signals that the nonce of the submitted transaction was already
    /// consumed or is held by another pending transaction.
    pub fn is_nonce_conflict(&self) -> bool {
        let message = match self {
            Self::Rpc(RpcError::ErrorResp(payload)) => payload.message.to_lowercase(),
            Self::Rejected(message) => message.to_lowercase(),
            _ => return false,
        };
        NONCE_CONFLICT_MESSAGES.iter().any(|m| message.contains(m))
    }
}
