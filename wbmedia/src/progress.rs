//! Video search progress reporting.
//!
//! The search driver notifies a [`BatchObserver`] after each batch. The
//! [`ProgressObserver`] turns those notifications into percentages, throttles
//! them with [`ProgressThrottle`] and forwards the survivors to a
//! [`ProgressSink`]. A failing sink is logged and otherwise ignored; it never
//! affects the search.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::warn;

use crate::search::BatchObserver;

/// Default minimum time between two progress updates.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(2);

/// Default percentage advance that forces an update.
pub const DEFAULT_PROGRESS_STEP: u8 = 10;

/// Boxed future returned by [`ProgressSink::report`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors a progress sink may report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    /// The receiving side has gone away.
    #[error("progress receiver closed")]
    Closed,

    /// The receiver is not keeping up; the update was dropped.
    #[error("progress channel full")]
    Full,

    /// Any other sink failure.
    #[error("progress sink failed: {0}")]
    Failed(String),
}

/// Receives percent-complete updates (0..=100).
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: u8) -> BoxFuture<'_, Result<(), ProgressError>>;
}

/// Adapts an async closure into a [`ProgressSink`].
pub struct FnProgress<F>(pub F);

impl<F, Fut> ProgressSink for FnProgress<F>
where
    F: Fn(u8) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ProgressError>> + Send + 'static,
{
    fn report(&self, percent: u8) -> BoxFuture<'_, Result<(), ProgressError>> {
        Box::pin((self.0)(percent))
    }
}

/// Bounded channel sink. A full channel drops the update instead of
/// stalling the search.
impl ProgressSink for mpsc::Sender<u8> {
    fn report(&self, percent: u8) -> BoxFuture<'_, Result<(), ProgressError>> {
        let result = self.try_send(percent).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ProgressError::Full,
            mpsc::error::TrySendError::Closed(_) => ProgressError::Closed,
        });
        Box::pin(async move { result })
    }
}

/// Debounce rule for progress updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressThrottle {
    /// Emit when at least this long has passed since the last update.
    pub interval: Duration,
    /// Emit when percent advanced by at least this many points.
    pub step: u8,
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self {
            interval: DEFAULT_PROGRESS_INTERVAL,
            step: DEFAULT_PROGRESS_STEP,
        }
    }
}

impl ProgressThrottle {
    pub fn new(interval: Duration, step: u8) -> Self {
        Self { interval, step }
    }

    /// Decides whether `percent` should be reported at `now`.
    ///
    /// `last` is the time and value of the previous emitted update. Percent
    /// never moves backwards, and 100 is emitted exactly once.
    pub fn should_emit(&self, last: Option<(Instant, u8)>, now: Instant, percent: u8) -> bool {
        let Some((last_at, last_percent)) = last else {
            return true;
        };
        if percent <= last_percent {
            return false;
        }
        if percent >= 100 {
            return true;
        }
        percent - last_percent >= self.step
            || now.saturating_duration_since(last_at) >= self.interval
    }
}

/// [`BatchObserver`] that reports throttled percentages to a sink.
pub struct ProgressObserver<'a> {
    sink: Option<&'a dyn ProgressSink>,
    throttle: ProgressThrottle,
    last: Option<(Instant, u8)>,
}

impl<'a> ProgressObserver<'a> {
    pub fn new(sink: Option<&'a dyn ProgressSink>, throttle: ProgressThrottle) -> Self {
        Self {
            sink,
            throttle,
            last: None,
        }
    }

    /// Last percent forwarded to the sink.
    pub fn last_percent(&self) -> Option<u8> {
        self.last.map(|(_, p)| p)
    }

    /// Reports `percent` if the throttle allows it.
    pub async fn update(&mut self, percent: u8) {
        let Some(sink) = self.sink else {
            return;
        };
        let percent = percent.min(100);
        let now = Instant::now();
        if !self.throttle.should_emit(self.last, now, percent) {
            return;
        }
        self.last = Some((now, percent));
        if let Err(e) = sink.report(percent).await {
            warn!(percent, error = %e, "Progress update failed");
        }
    }

    /// Reports completion.
    pub async fn finish(&mut self) {
        self.update(100).await;
    }
}

impl BatchObserver for ProgressObserver<'_> {
    async fn batch_completed(&mut self, completed: usize, total: usize) {
        if total == 0 {
            return;
        }
        let percent = (completed.saturating_mul(100) / total).min(100) as u8;
        self.update(percent).await;
    }
}
