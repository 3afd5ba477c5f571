/// The fee parameters of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasFees {
    /// A single gas price, used by legacy and access list transactions.
    Legacy {
        /// The gas price.
        gas_price: u128,
    },
    /// EIP-1559 fees.
    Dynamic {
        /// The priority fee.
        max_priority_fee_per_gas: u128,
        /// The fee cap.
        max_fee_per_gas: u128,
    },
}

/// The ratio and ceiling applied when escalating the fees of a stuck transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationPolicy {
    /// The numerator of the escalation ratio.
    pub multiple_num: u128,
    /// The denominator of the escalation ratio.
    pub multiple_den: u128,
    /// The maximum gas price or fee cap.
    pub max_gas_price: u128,
}

impl GasFees {
    /// Returns the fees of a legacy transaction given the suggested gas price.
    pub fn legacy(suggested_gas_price: u128, min_gas_tip: u128, max_gas_price: u128) -> Self {
        Self::Legacy { gas_price: suggested_gas_price.max(min_gas_tip).min(max_gas_price) }
    }

    /// Returns the fees of a dynamic fee transaction given the suggested priority fee and the
    /// latest base fee.
    pub fn dynamic(
        suggested_tip: u128,
        base_fee: u128,
        min_gas_tip: u128,
        max_gas_price: u128,
    ) -> Self {
        let tip = suggested_tip.max(min_gas_tip);
        let fee_cap = base_fee.saturating_mul(2).saturating_add(tip).min(max_gas_price);
        Self::Dynamic { max_priority_fee_per_gas: tip.min(fee_cap), max_fee_per_gas: fee_cap }
    }

    /// Returns the maximum price paid per unit of gas.
    pub const fn max_price(&self) -> u128 {
        match self {
            Self::Legacy { gas_price } => *gas_price,
            Self::Dynamic { max_fee_per_gas, .. } => *max_fee_per_gas,
        }
    }

    /// Returns the escalated fees for a resubmission.
    ///
    /// Every escalated fee is at least the previous one and at most the policy ceiling. The fee cap
    /// of a dynamic fee transaction also covers the escalated `base_fee`.
    pub fn escalate(&self, policy: &EscalationPolicy, base_fee: u128) -> Self {
        match *self {
            Self::Legacy { gas_price } => Self::Legacy { gas_price: policy.bump(gas_price) },
            Self::Dynamic { max_priority_fee_per_gas, max_fee_per_gas } => {
                let tip = policy.bump(max_priority_fee_per_gas);
                let covered = tip.saturating_add(policy.scale(base_fee));
                let fee_cap =
                    policy.bump(max_fee_per_gas).max(covered.min(policy.max_gas_price));
                Self::Dynamic { max_priority_fee_per_gas: tip.min(fee_cap), max_fee_per_gas: fee_cap }
            }
        }
    }
}

impl EscalationPolicy {
    fn scale(&self, value: u128) -> u128 {
        value.saturating_mul(self.multiple_num) / self.multiple_den
    }

    /// Scales the value by the ratio, clamped to the ceiling, adding one wei when the ratio leaves
    /// it unchanged.
    fn bump(&self, value: u128) -> u128 {
        let escalated = self.scale(value).min(self.max_gas_price);
        if escalated > value {
            escalated
        } else if value < self.max_gas_price {
            value + 1
        } else {
            value
        }
    }
}
