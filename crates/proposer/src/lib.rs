//! Proposers packing L2 blocks into chunks, chunks into batches and batches into bundles.
//!
//! The three proposers share one greedy algorithm: candidates are walked in order, the unit grows
//! while every resource ceiling holds, and a unit that breaches no ceiling is only emitted once
//! its window is full or its oldest item timed out.

use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

mod batch;
pub use batch::BatchProposer;

mod bundle;
pub use bundle::BundleProposer;

mod chunk;
pub use chunk::ChunkProposer;

mod config;
pub use config::{BatchProposerConfig, BundleProposerConfig, ChunkProposerConfig};

mod error;
pub use error::ProposerError;

mod metrics;
pub use metrics::{BatchProposerMetrics, BundleProposerMetrics, ChunkProposerMetrics};

mod packing;
pub use packing::{LimitExceeded, ProposalTrigger};

#[cfg(test)]
mod test_utils;

/// A proposer driven by a periodic loop.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait Propose: Send + Sync {
    /// The kind of unit proposed, used in logs.
    fn unit(&self) -> &'static str;

    /// Proposes the next unit if possible, returning its index.
    async fn propose_next(&self) -> Result<Option<u64>, ProposerError>;
}

/// Spawns a loop calling the proposer every `interval` until `shutdown` is cancelled.
///
/// Errors are logged and retried on the next tick: a first item breaching a ceiling keeps failing
/// until the configuration is fixed.
pub fn spawn_proposer<P: Propose + 'static>(
    proposer: Arc<P>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    tracing::info!(target: "scroll::proposer", unit = proposer.unit(), "shutting down proposer");
                    break;
                }
                _ = ticker.tick() => {
                    match proposer.propose_next().await {
                        Ok(Some(index)) => {
                            tracing::trace!(target: "scroll::proposer", unit = proposer.unit(), index, "proposed unit");
                        }
                        Ok(None) => {}
                        Err(err) => {
                            tracing::error!(target: "scroll::proposer", unit = proposer.unit(), ?err, "failed to propose");
                        }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Debug, Default)]
    struct CountingProposer {
        calls: AtomicU64,
    }

    #[async_trait::async_trait]
    impl Propose for CountingProposer {
        fn unit(&self) -> &'static str {
            "test"
        }

        async fn propose_next(&self) -> Result<Option<u64>, ProposerError> {
            let call = self.calls.fetch_add(1, Ordering::Relaxed);
            // every other tick fails.
            if call % 2 == 1 {
                return Err(ProposerError::FirstItemExceedsLimits {
                    item: "test",
                    index: call,
                    exceeded: LimitExceeded { limit: "test", value: 2, max: 1 },
                })
            }
            Ok(Some(call))
        }
    }

    #[tokio::test]
    async fn test_proposer_loop_survives_errors_and_stops() {
        let proposer = Arc::new(CountingProposer::default());
        let shutdown = CancellationToken::new();
        let handle = spawn_proposer(proposer.clone(), Duration::from_millis(5), shutdown.clone());

        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();
        handle.await.unwrap();

        assert!(proposer.calls.load(Ordering::Relaxed) >= 3);
    }
}
