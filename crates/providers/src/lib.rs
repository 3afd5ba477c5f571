//! The crate exposes the base chain client used to deliver rollup transactions along with its
//! alloy backed implementation.

pub use alloy::AlloyChainClient;
mod alloy;

pub use client::{
    BlockHeader, ChainClient, ConfirmationDepth, GasEstimateRequest, TransactionReceipt,
};
mod client;

pub use error::ChainClientError;
mod error;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
