//! The greedy packing shared by every proposer.
//!
//! Candidates are taken in order and the metrics of every prefix are recomputed from scratch, L1
//! commit costs are not additive across items.

use crate::ProposerError;

use std::fmt;

/// A ceiling breached by a candidate unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitExceeded {
    /// The name of the ceiling.
    pub limit: &'static str,
    /// The value of the candidate unit.
    pub value: u64,
    /// The configured ceiling.
    pub max: u64,
}

impl fmt::Display for LimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} > {}", self.limit, self.value, self.max)
    }
}

/// Returns the first ceiling in `checks` exceeded by its value.
pub(crate) fn first_exceeded(
    checks: impl IntoIterator<Item = (&'static str, u64, u64)>,
) -> Option<LimitExceeded> {
    checks
        .into_iter()
        .find(|(_, value, max)| value > max)
        .map(|(limit, value, max)| LimitExceeded { limit, value, max })
}

/// The event that triggered a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalTrigger {
    /// The next candidate would breach a ceiling.
    LimitReached,
    /// The candidate window was consumed entirely.
    WindowFull,
    /// The oldest candidate timed out.
    Timeout,
}

/// The prefix of the candidates selected for a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Packed<M> {
    /// The number of candidates in the unit.
    pub(crate) count: usize,
    /// The metrics of the unit.
    pub(crate) metrics: M,
    /// The proposal trigger.
    pub(crate) trigger: ProposalTrigger,
}

/// The timeout of the oldest candidate.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    /// The timestamp of the oldest candidate.
    pub(crate) first_timestamp: u64,
    /// The timeout in seconds.
    pub(crate) timeout_secs: u64,
    /// The current unix time.
    pub(crate) now: u64,
}

impl Deadline {
    const fn expired(&self) -> bool {
        self.first_timestamp.saturating_add(self.timeout_secs) < self.now
    }
}

/// The candidate items of a unit.
#[derive(Debug)]
pub(crate) struct Candidates<'a, T> {
    /// The kind of item.
    pub(crate) item: &'static str,
    /// The index or number of the first item.
    pub(crate) first_index: u64,
    /// The items, possibly truncated at a protocol boundary.
    pub(crate) items: &'a [T],
    /// The size of the window, equal to the item count when truncated.
    pub(crate) window: usize,
}

/// Greedily selects the longest prefix of the candidates that respects every ceiling.
///
/// Returns [`None`] if the candidates neither breach a ceiling nor fill the window nor time out.
/// A first candidate breaching a ceiling on its own is an error.
pub(crate) fn pack<T, M>(
    candidates: Candidates<'_, T>,
    deadline: Deadline,
    mut measure: impl FnMut(&[T]) -> Result<M, ProposerError>,
    exceeded: impl Fn(&M) -> Option<LimitExceeded>,
) -> Result<Option<Packed<M>>, ProposerError> {
    let mut accepted = None;
    for count in 1..=candidates.items.len() {
        let metrics = measure(&candidates.items[..count])?;
        if let Some(exceeded) = exceeded(&metrics) {
            let Some(metrics) = accepted else {
                return Err(ProposerError::FirstItemExceedsLimits {
                    item: candidates.item,
                    index: candidates.first_index,
                    exceeded,
                })
            };
            tracing::debug!(target: "scroll::proposer", item = candidates.item, first_index = candidates.first_index, %exceeded, "breaking limit condition");
            return Ok(Some(Packed { count: count - 1, metrics, trigger: ProposalTrigger::LimitReached }))
        }
        accepted = Some(metrics);
    }

    let Some(metrics) = accepted else { return Ok(None) };
    let count = candidates.items.len();
    let trigger = if count >= candidates.window {
        ProposalTrigger::WindowFull
    } else if deadline.expired() {
        ProposalTrigger::Timeout
    } else {
        return Ok(None)
    };
    Ok(Some(Packed { count, metrics, trigger }))
}

/// Returns the length of the prefix of `items` sharing the key of the first item.
pub(crate) fn truncate_at_boundary<T, K: PartialEq>(items: &[T], key: impl Fn(&T) -> K) -> usize {
    let Some(first) = items.first().map(&key) else { return 0 };
    items.iter().skip(1).position(|item| key(item) != first).map_or(items.len(), |i| i + 1)
}

/// Returns the current unix time in seconds.
pub(crate) fn unix_time() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
