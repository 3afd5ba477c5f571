use crate::RelayerError;

use alloy_primitives::Address;
use std::{collections::HashSet, time::Duration};

/// The number of pending batches considered for commitment per round.
pub const PENDING_BATCHES_PER_ROUND: u64 = 5;

/// Configuration for the [`crate::Relayer`].
#[derive(Debug, Clone)]
pub struct RelayerConfig {
    /// The address of the rollup contract on L1.
    pub rollup_contract_address: Address,
    /// The multiplier applied to the estimated commit gas to obtain the gas limit floor.
    pub l1_commit_gas_limit_multiplier: f64,
    /// Enables finalization without proof once a unit waited long enough. Test networks only.
    pub enable_test_env_bypass_features: bool,
    /// The time after commitment after which a batch is finalized without proof, in seconds.
    pub finalize_batch_without_proof_timeout_sec: u64,
    /// The time after proposal after which a bundle is finalized without proof, in seconds.
    pub finalize_bundle_without_proof_timeout_sec: u64,
    /// The interval between two relaying rounds.
    pub process_interval: Duration,
}

impl Default for RelayerConfig {
    fn default() -> Self {
        Self {
            rollup_contract_address: Address::ZERO,
            l1_commit_gas_limit_multiplier: 1.2,
            enable_test_env_bypass_features: false,
            finalize_batch_without_proof_timeout_sec: 0,
            finalize_bundle_without_proof_timeout_sec: 0,
            process_interval: Duration::from_secs(2),
        }
    }
}

impl RelayerConfig {
    /// Checks that no account signs for both the commit and the finalize sender. A shared account
    /// would interleave nonces across the two senders.
    pub fn validate_sender_accounts(
        commit: impl IntoIterator<Item = Address>,
        finalize: impl IntoIterator<Item = Address>,
    ) -> Result<(), RelayerError> {
        let commit: HashSet<_> = commit.into_iter().collect();
        finalize
            .into_iter()
            .find(|address| commit.contains(address))
            .map_or(Ok(()), |address| Err(RelayerError::SharedSenderAccount(address)))
    }

    /// Returns the gas limit floor of a commit transaction.
    pub(crate) fn commit_gas_floor(&self, total_l1_commit_gas: u64) -> u64 {
        (total_l1_commit_gas as f64 * self.l1_commit_gas_limit_multiplier) as u64
    }
}
