//! Shard resolution.
//!
//! Finds the shard hosting an article's photos.
//!
//! # State Machine
//!
//! ```text
//! CacheCheck ──hit, re-probe ok──────────────────────► Cached
//!     │
//!     │ miss / cached shard gone
//!     ▼
//! HotZone (20..=30) ──► Rest (1..19, 31..100) ──found──► Discovered (cache written)
//!                                │
//!                                └─exhausted / deadline──► NotFound
//! ```
//!
//! The deadline runs from the start of `resolve` and covers the cache
//! re-probe. Cancellation may end any state with `Cancelled`.
//!
//! Probe failures are never raised. The only error is
//! [`MediaError::Transport`], returned when an exhaustive search received no
//! HTTP response at all.

mod config;

pub use config::{
    ShardSearchConfig, DEFAULT_SHARD_BATCH_DELAY, DEFAULT_SHARD_BATCH_SIZE,
    DEFAULT_SHARD_HOT_ZONE, DEFAULT_SHARD_TIMEOUT,
};

use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::article::ProductId;
use crate::cache::BasketCache;
use crate::cdn::{HttpClient, Prober};
use crate::coord::{AddressCoordinates, ShardNumber};
use crate::error::MediaError;
use crate::search::{run_search, NoopObserver, SearchOutcome};

/// Result of a shard resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardResolution {
    /// The cached shard still answers.
    Cached(ShardNumber),
    /// Found by searching; the cache now points at it.
    Discovered(ShardNumber),
    /// No shard found within the deadline.
    NotFound,
    /// The caller cancelled the lookup before it concluded.
    Cancelled,
}

impl ShardResolution {
    /// The hosting shard, if any.
    pub fn shard(self) -> Option<ShardNumber> {
        match self {
            ShardResolution::Cached(shard) | ShardResolution::Discovered(shard) => Some(shard),
            ShardResolution::NotFound | ShardResolution::Cancelled => None,
        }
    }
}

/// Locates the photo shard of an article, backed by a [`BasketCache`].
pub struct ShardResolver<C: HttpClient> {
    prober: Prober<C>,
    cache: Arc<BasketCache>,
    config: ShardSearchConfig,
}

impl<C: HttpClient> ShardResolver<C> {
    pub fn new(prober: Prober<C>, cache: Arc<BasketCache>, config: ShardSearchConfig) -> Self {
        Self {
            prober,
            cache,
            config,
        }
    }

    /// Resolves the hosting shard for `id`.
    ///
    /// # Arguments
    ///
    /// * `id` - The article
    /// * `coords` - Coordinates derived from `id`
    /// * `cancel` - Aborts the lookup, which then reports `Cancelled`
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Transport`] when the full search completed
    /// without a single probe reaching the CDN.
    pub async fn resolve(
        &self,
        id: ProductId,
        coords: &AddressCoordinates,
        cancel: &CancellationToken,
    ) -> Result<ShardResolution, MediaError> {
        let volume = coords.photo_volume;
        let started = Instant::now();
        let deadline = started + self.config.timeout;

        if let Some(shard) = self.cache.get(volume) {
            let recheck = self.prober.probe_shard_for_photo(id, coords, shard);
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(article = %id, volume, "Shard lookup cancelled during cache check");
                    return Ok(ShardResolution::Cancelled);
                }
                outcome = tokio::time::timeout_at(deadline, recheck) => match outcome {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        info!(
                            article = %id,
                            volume,
                            shard = %shard,
                            timeout_s = self.config.timeout.as_secs(),
                            "Shard search timed out during cache check"
                        );
                        return Ok(ShardResolution::NotFound);
                    }
                },
            };
            if outcome.exists() {
                debug!(article = %id, volume, shard = %shard, "Basket cache hit");
                return Ok(ShardResolution::Cached(shard));
            }
            info!(
                article = %id,
                volume,
                shard = %shard,
                ?outcome,
                "Cached shard no longer answers, searching again"
            );
        }

        let plan = self
            .config
            .plan(deadline.saturating_duration_since(Instant::now()));
        let outcome = run_search(
            &plan,
            |shard| self.prober.probe_shard_for_photo(id, coords, shard),
            &mut NoopObserver,
            cancel,
        )
        .await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            SearchOutcome::Found { candidate, zone, tally } => {
                self.cache.insert(volume, candidate);
                info!(
                    article = %id,
                    volume,
                    shard = %candidate,
                    zone = %zone,
                    probes = tally.probes(),
                    elapsed_ms,
                    "Shard found"
                );
                Ok(ShardResolution::Discovered(candidate))
            }
            SearchOutcome::Exhausted(tally) if tally.unreachable() => {
                warn!(article = %id, probes = tally.probes(), elapsed_ms, "No probe reached the CDN");
                Err(MediaError::Transport(format!(
                    "none of {} shard probes for article {} received a response",
                    tally.probes(),
                    id
                )))
            }
            SearchOutcome::Exhausted(tally) => {
                info!(article = %id, probes = tally.probes(), elapsed_ms, "No shard hosts article");
                Ok(ShardResolution::NotFound)
            }
            SearchOutcome::TimedOut(tally) => {
                info!(
                    article = %id,
                    probes = tally.probes(),
                    timeout_s = self.config.timeout.as_secs(),
                    "Shard search timed out"
                );
                Ok(ShardResolution::NotFound)
            }
            SearchOutcome::Cancelled(tally) => {
                debug!(article = %id, probes = tally.probes(), "Shard search cancelled");
                Ok(ShardResolution::Cancelled)
            }
        }
    }
}
