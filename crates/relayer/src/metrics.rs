use metrics::Counter;
use metrics_derive::Metrics;

/// The metrics of the [`crate::Relayer`].
#[derive(Metrics, Clone)]
#[metrics(scope = "relayer")]
pub struct RelayerMetrics {
    /// The number of pending batches processed.
    pub process_pending_batches_total: Counter,
    /// The number of commit transactions submitted.
    pub process_pending_batches_success_total: Counter,
    /// The number of commit submissions deferred by the sender.
    pub process_pending_batches_deferred_total: Counter,
    /// The number of committed batches processed.
    pub process_committed_batches_total: Counter,
    /// The number of verified batches processed.
    pub process_committed_batches_finalized_total: Counter,
    /// The number of batch finalize transactions submitted.
    pub process_committed_batches_finalized_success_total: Counter,
    /// The number of pending bundles processed.
    pub process_pending_bundles_total: Counter,
    /// The number of verified bundles processed.
    pub process_pending_bundles_finalized_total: Counter,
    /// The number of bundle finalize transactions submitted.
    pub process_pending_bundles_finalized_success_total: Counter,
    /// The number of successful commit confirmations.
    pub batches_committed_confirmed_total: Counter,
    /// The number of reverted commit confirmations.
    pub batches_committed_confirmed_failed_total: Counter,
    /// The number of successful batch finalize confirmations.
    pub batches_finalized_confirmed_total: Counter,
    /// The number of reverted batch finalize confirmations.
    pub batches_finalized_confirmed_failed_total: Counter,
    /// The number of successful bundle finalize confirmations.
    pub bundles_finalized_confirmed_total: Counter,
    /// The number of reverted bundle finalize confirmations.
    pub bundles_finalized_confirmed_failed_total: Counter,
}
