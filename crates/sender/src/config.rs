use crate::SenderError;

use alloy_primitives::U256;
use rollup_relayer_providers::ConfirmationDepth;
use std::{fmt, str::FromStr, time::Duration};

/// The type of transaction built by the sender.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TxType {
    /// A legacy transaction.
    LegacyTx,
    /// An EIP-2930 transaction with an empty access list.
    AccessListTx,
    /// An EIP-1559 transaction.
    #[default]
    DynamicFeeTx,
}

impl FromStr for TxType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("LegacyTx") {
            Ok(Self::LegacyTx)
        } else if s.eq_ignore_ascii_case("AccessListTx") {
            Ok(Self::AccessListTx)
        } else if s.eq_ignore_ascii_case("DynamicFeeTx") {
            Ok(Self::DynamicFeeTx)
        } else {
            Err(format!("Expected 'LegacyTx', 'AccessListTx' or 'DynamicFeeTx', got '{s}'"))
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LegacyTx => write!(f, "LegacyTx"),
            Self::AccessListTx => write!(f, "AccessListTx"),
            Self::DynamicFeeTx => write!(f, "DynamicFeeTx"),
        }
    }
}

/// Configuration for the [`crate::Sender`].
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// The name of the sender, used to label its metrics.
    pub name: String,
    /// The type of transactions to build.
    pub tx_type: TxType,
    /// The depth at which a receipt is considered final.
    pub confirmations: ConfirmationDepth,
    /// The number of blocks to wait for inclusion before escalating the fees.
    pub escalate_blocks: u64,
    /// The numerator of the fee escalation ratio.
    pub escalate_multiple_num: u128,
    /// The denominator of the fee escalation ratio.
    pub escalate_multiple_den: u128,
    /// The maximum gas price or fee cap, in wei.
    pub max_gas_price: u128,
    /// The minimum gas price or priority fee, in wei.
    pub min_gas_tip: u128,
    /// The maximum number of in-flight transactions.
    pub pending_limit: usize,
    /// The interval at which in-flight transactions are reconciled.
    pub check_pending_interval: Duration,
    /// The interval at which account balances are checked.
    pub check_balance_interval: Duration,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            name: "sender".to_string(),
            tx_type: TxType::DynamicFeeTx,
            confirmations: ConfirmationDepth::Finalized,
            escalate_blocks: 3,
            escalate_multiple_num: 11,
            escalate_multiple_den: 10,
            max_gas_price: 1_000_000_000_000,
            min_gas_tip: 0,
            pending_limit: 500,
            check_pending_interval: Duration::from_secs(3),
            check_balance_interval: Duration::from_secs(600),
        }
    }
}

impl SenderConfig {
    /// Validates the configuration.
    pub const fn validate(&self) -> Result<(), SenderError> {
        if self.escalate_multiple_den == 0 {
            return Err(SenderError::InvalidConfig("escalate multiple denominator is zero"));
        }
        if self.escalate_multiple_num <= self.escalate_multiple_den {
            return Err(SenderError::InvalidConfig(
                "escalate multiple numerator must exceed the denominator",
            ));
        }
        if self.pending_limit == 0 {
            return Err(SenderError::InvalidConfig("pending limit is zero"));
        }
        Ok(())
    }
}

/// Configuration for the [`crate::AccountPool`].
#[derive(Debug, Clone)]
pub struct AccountPoolConfig {
    /// The balance every account is topped up to at start-up.
    pub min_balance: U256,
    /// The maximum time to wait for the funding transactions to be mined.
    pub funding_timeout: Duration,
    /// The interval at which funding receipts are polled.
    pub funding_poll_interval: Duration,
}

impl Default for AccountPoolConfig {
    fn default() -> Self {
        Self {
            // 100 ether.
            min_balance: U256::from(100_000_000_000_000_000_000u128),
            funding_timeout: Duration::from_secs(120),
            funding_poll_interval: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sender_config() {
        assert!(SenderConfig::default().validate().is_ok());

        let config = SenderConfig { escalate_multiple_num: 10, ..Default::default() };
        assert!(matches!(config.validate(), Err(SenderError::InvalidConfig(_))));

        let config = SenderConfig { escalate_multiple_den: 0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = SenderConfig { pending_limit: 0, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tx_type_from_str() {
        assert_eq!("legacytx".parse::<TxType>().unwrap(), TxType::LegacyTx);
        assert_eq!("DynamicFeeTx".parse::<TxType>().unwrap(), TxType::DynamicFeeTx);
        assert!("BlobTx".parse::<TxType>().is_err());
        assert_eq!(TxType::AccessListTx.to_string(), "AccessListTx");
    }
}
