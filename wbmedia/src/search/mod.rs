//! Zoned, batched existence search.
//!
//! Both the shard resolver and the video locator look for the first candidate
//! that exists in a bounded space. This module provides the shared driver:
//! zones are searched in order, each zone in fixed-size batches whose probes
//! run concurrently, with an overall deadline and cooperative cancellation.
//!
//! # Batch Semantics
//!
//! ```text
//! zone[0]: [c0 c1 c2 c3 | c4 c5 c6 c7 | c8 c9]   batch_size = 4
//!           └─ join ──┘   └─ join ──┘   └join┘
//!                 delay ─►      delay ─►
//! zone[1]: ...
//! ```
//!
//! - All probes of a batch are awaited together; the winner is the first
//!   `Exists` in candidate order, so ties resolve to the lowest candidate.
//! - Batch N+1 never starts before batch N has settled.
//! - When the deadline passes mid-batch, the outstanding probes are dropped.

mod zone;

pub use zone::{SearchPlan, SearchZone};

use std::future::Future;

use futures::future::join_all;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cdn::ProbeOutcome;

/// Counts of probe outcomes observed during a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeTally {
    pub exists: usize,
    pub absent: usize,
    pub transient: usize,
    /// Number of batches that settled.
    pub batches: usize,
}

impl ProbeTally {
    /// Record a single outcome.
    pub fn record(&mut self, outcome: ProbeOutcome) {
        match outcome {
            ProbeOutcome::Exists => self.exists += 1,
            ProbeOutcome::Absent => self.absent += 1,
            ProbeOutcome::TransientError => self.transient += 1,
        }
    }

    /// Total settled probes.
    pub fn probes(&self) -> usize {
        self.exists + self.absent + self.transient
    }

    /// Probes that produced an HTTP response.
    pub fn responded(&self) -> usize {
        self.exists + self.absent
    }

    /// True when probes settled but none of them reached the CDN.
    ///
    /// An exhaustive search in this state did not really run: the network
    /// path itself is broken.
    pub fn unreachable(&self) -> bool {
        self.probes() > 0 && self.responded() == 0
    }
}

/// Terminal state of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome<T> {
    /// A candidate exists.
    Found {
        candidate: T,
        zone: String,
        tally: ProbeTally,
    },
    /// Every candidate was probed and none exists.
    Exhausted(ProbeTally),
    /// The deadline passed before the space was exhausted.
    TimedOut(ProbeTally),
    /// The caller cancelled the search.
    Cancelled(ProbeTally),
}

impl<T> SearchOutcome<T> {
    /// The candidate, if one was found.
    pub fn found(&self) -> Option<&T> {
        match self {
            SearchOutcome::Found { candidate, .. } => Some(candidate),
            _ => None,
        }
    }

    /// Probe counts accumulated before the search ended.
    pub fn tally(&self) -> ProbeTally {
        match self {
            SearchOutcome::Found { tally, .. }
            | SearchOutcome::Exhausted(tally)
            | SearchOutcome::TimedOut(tally)
            | SearchOutcome::Cancelled(tally) => *tally,
        }
    }
}

/// Receives a notification after every settled batch.
pub trait BatchObserver: Send {
    /// Called with the number of settled batches and the plan's total.
    fn batch_completed(&mut self, completed: usize, total: usize) -> impl Future<Output = ()> + Send;
}

/// Observer that ignores batch notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {
    async fn batch_completed(&mut self, _completed: usize, _total: usize) {}
}

/// Runs a zoned search.
///
/// # Arguments
///
/// * `plan` - Zones, batch size, inter-batch delay and timeout
/// * `probe` - Probes one candidate
/// * `observer` - Notified after each settled batch
/// * `cancel` - Aborts the search when cancelled
///
/// # Returns
///
/// The first existing candidate (lowest in candidate order within its batch),
/// or the reason the search stopped without one.
pub async fn run_search<T, P, Fut, O>(
    plan: &SearchPlan<T>,
    probe: P,
    observer: &mut O,
    cancel: &CancellationToken,
) -> SearchOutcome<T>
where
    T: Copy,
    P: Fn(T) -> Fut,
    Fut: Future<Output = ProbeOutcome>,
    O: BatchObserver,
{
    let started = Instant::now();
    let deadline = started + plan.timeout();
    let total_batches = plan.total_batches();
    let mut completed = 0usize;
    let mut tally = ProbeTally::default();

    for zone in plan.zones() {
        debug!(
            zone = zone.name(),
            candidates = zone.len(),
            "Searching zone"
        );

        for batch in zone.candidates().chunks(plan.batch_size()) {
            if cancel.is_cancelled() {
                return SearchOutcome::Cancelled(tally);
            }
            if Instant::now() >= deadline {
                debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Search deadline reached");
                return SearchOutcome::TimedOut(tally);
            }

            let probes = join_all(batch.iter().map(|&candidate| probe(candidate)));
            let results = tokio::select! {
                biased;
                _ = cancel.cancelled() => return SearchOutcome::Cancelled(tally),
                settled = tokio::time::timeout_at(deadline, probes) => match settled {
                    Ok(results) => results,
                    Err(_) => {
                        debug!(
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "Search deadline reached mid-batch"
                        );
                        return SearchOutcome::TimedOut(tally);
                    }
                },
            };

            tally.batches += 1;
            completed += 1;
            results.iter().for_each(|outcome| tally.record(*outcome));

            if let Some(index) = results.iter().position(|outcome| outcome.exists()) {
                return SearchOutcome::Found {
                    candidate: batch[index],
                    zone: zone.name().to_string(),
                    tally,
                };
            }

            // A slow observer must not stretch the search past its deadline.
            let _ = tokio::time::timeout_at(
                deadline,
                observer.batch_completed(completed, total_batches),
            )
            .await;

            if completed < total_batches && !plan.batch_delay().is_zero() {
                let wake = (Instant::now() + plan.batch_delay()).min(deadline);
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return SearchOutcome::Cancelled(tally),
                    _ = tokio::time::sleep_until(wake) => {}
                }
            }
        }
    }

    debug!(
        probes = tally.probes(),
        batches = tally.batches,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Search space exhausted"
    );
    SearchOutcome::Exhausted(tally)
}
