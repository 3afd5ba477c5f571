use crate::PrimitiveError;

/// The rollup status of a batch or bundle on L1.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RollupStatus {
    /// The unit has been proposed but no commit transaction was sent.
    Pending = 1,
    /// A commit transaction is in flight.
    Committing = 2,
    /// The commit transaction was included and succeeded.
    Committed = 3,
    /// A finalize transaction is in flight.
    Finalizing = 4,
    /// The finalize transaction was included and succeeded.
    Finalized = 5,
    /// The commit transaction was included but reverted.
    CommitFailed = 6,
    /// The finalize transaction was included but reverted.
    FinalizeFailed = 7,
}

impl TryFrom<i16> for RollupStatus {
    type Error = PrimitiveError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::Pending,
            2 => Self::Committing,
            3 => Self::Committed,
            4 => Self::Finalizing,
            5 => Self::Finalized,
            6 => Self::CommitFailed,
            7 => Self::FinalizeFailed,
            v => return Err(PrimitiveError::InvalidRollupStatus(v)),
        })
    }
}

impl From<RollupStatus> for i16 {
    fn from(value: RollupStatus) -> Self {
        value as Self
    }
}

/// The proving status of a batch or bundle.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ProvingStatus {
    /// No prover has picked up the task.
    Unassigned = 1,
    /// A prover is working on the task.
    Assigned = 2,
    /// The proof was produced and verified.
    Verified = 3,
    /// Proving failed.
    Failed = 4,
}

impl TryFrom<i16> for ProvingStatus {
    type Error = PrimitiveError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::Unassigned,
            2 => Self::Assigned,
            3 => Self::Verified,
            4 => Self::Failed,
            v => return Err(PrimitiveError::InvalidProvingStatus(v)),
        })
    }
}

impl From<ProvingStatus> for i16 {
    fn from(value: ProvingStatus) -> Self {
        value as Self
    }
}
