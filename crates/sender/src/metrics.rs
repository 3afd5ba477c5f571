use metrics::{Counter, Gauge, Histogram};
use metrics_derive::Metrics;

/// The metrics for the [`super::Sender`].
#[derive(Metrics, Clone)]
#[metrics(scope = "sender")]
pub struct SenderMetrics {
    /// The number of transactions broadcast on submission.
    pub sent_transactions: Counter,
    /// The number of failed submissions.
    pub send_failures: Counter,
    /// The number of resubmitted transactions.
    pub resubmitted_transactions: Counter,
    /// The number of nonce conflicts hit while resubmitting.
    pub resubmit_nonce_conflicts: Counter,
    /// The number of confirmed successful transactions.
    pub confirmed_successful_transactions: Counter,
    /// The number of confirmed reverted transactions.
    pub confirmed_failed_transactions: Counter,
    /// The number of in-flight transactions.
    pub pending_transactions: Gauge,
    /// The number of accounts below the minimum balance.
    pub under_balance_accounts: Gauge,
    /// The duration of a submission, broadcast included.
    pub submit_duration: Histogram,
}

/// The metrics for the [`super::AccountPool`].
#[derive(Metrics, Clone)]
#[metrics(scope = "account_pool")]
pub struct AccountPoolMetrics {
    /// The number of accounts available for checkout.
    pub available_accounts: Gauge,
    /// The number of funding transactions sent.
    pub funding_transactions: Counter,
    /// The number of nonce resets.
    pub nonce_resets: Counter,
}
