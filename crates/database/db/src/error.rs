use alloy_primitives::B256;
use rollup_relayer_primitives::PrimitiveError;

/// The error type for database operations.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// A database error occurred.
    #[error("database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),
    /// A batch was not found in the database.
    #[error("batch with hash [{0}] not found in database")]
    BatchNotFound(B256),
    /// A bundle was not found in the database.
    #[error("bundle with hash [{0}] not found in database")]
    BundleNotFound(B256),
    /// A persisted row holds a value that does not map to a primitive type.
    #[error("invalid persisted value: {0}")]
    InvalidValue(#[from] PrimitiveError),
    /// A persisted JSON column could not be decoded.
    #[error("invalid persisted json: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
