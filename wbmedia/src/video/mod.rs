//! Video location.
//!
//! Two strategies are tried in order under a single deadline:
//!
//! 1. **Legacy**: one probe of `{legacy_base}/{id}/{id}.mp4`.
//! 2. **HLS**: a zoned search over (shard, vol) pairs for
//!    `videonme-basket-NN/.../vol{vol}/part{id/10000}/{id}/hls/{quality}/index.m3u8`.
//!
//! ```text
//!            ┌──────────┐ 200
//!  start ───►│  legacy  ├──────────────────────────► Found(Legacy)
//!            └────┬─────┘
//!                 │ miss
//!                 ▼
//!   hot vols 1..=50 × shards ──► extended 51..=200 × shards
//!       │ found                      │ found          │ exhausted
//!       ▼                            ▼                ▼
//!   Found(Hls)                   Found(Hls)        NotFound
//! ```
//!
//! The deadline and cancellation may end the search in any state. Neither a
//! missing video nor a deadline is an error.

mod config;

pub use config::{
    HlsCandidate, VideoSearchConfig, DEFAULT_EXTENDED_VOLUMES, DEFAULT_HOT_VOLUMES,
    DEFAULT_LEGACY_DELAY, DEFAULT_VIDEO_BATCH_DELAY, DEFAULT_VIDEO_BATCH_SIZE,
    DEFAULT_VIDEO_TIMEOUT,
};

use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::article::ProductId;
use crate::cdn::{HttpClient, ProbeOutcome, Prober};
use crate::coord::{AddressCoordinates, ShardNumber};
use crate::error::MediaError;
use crate::progress::{ProgressObserver, ProgressSink};
use crate::search::{run_search, SearchOutcome};

/// Where a video was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "scheme", rename_all = "lowercase")]
pub enum VideoSource {
    /// Single-file legacy host.
    Legacy,
    /// HLS playlist on a video shard.
    Hls { shard: ShardNumber, vol: u16 },
}

/// A located video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoLocation {
    pub url: String,
    pub source: VideoSource,
}

impl VideoLocation {
    /// Whether the URL is an HLS playlist rather than a direct file.
    pub fn is_hls(&self) -> bool {
        matches!(self.source, VideoSource::Hls { .. })
    }
}

/// Terminal state of a video search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSearch {
    Found(VideoLocation),
    /// Both strategies were exhausted.
    NotFound,
    /// The deadline passed first.
    TimedOut,
    /// The caller cancelled the search.
    Cancelled,
}

impl VideoSearch {
    pub fn location(&self) -> Option<&VideoLocation> {
        match self {
            VideoSearch::Found(location) => Some(location),
            _ => None,
        }
    }

    pub fn into_location(self) -> Option<VideoLocation> {
        match self {
            VideoSearch::Found(location) => Some(location),
            _ => None,
        }
    }

    /// Whether the result may be remembered. A cancelled search proved
    /// nothing about the article.
    pub fn is_conclusive(&self) -> bool {
        !matches!(self, VideoSearch::Cancelled)
    }
}

/// Searches the legacy host and the HLS shard space for an article's video.
pub struct VideoLocator<C: HttpClient> {
    prober: Prober<C>,
    config: VideoSearchConfig,
}

impl<C: HttpClient> VideoLocator<C> {
    pub fn new(prober: Prober<C>, config: VideoSearchConfig) -> Self {
        Self { prober, config }
    }

    /// Locates the video of `id`.
    ///
    /// # Arguments
    ///
    /// * `id` - The article
    /// * `coords` - Coordinates derived from `id`
    /// * `progress` - Receives throttled percent-complete updates of the HLS search
    /// * `cancel` - Aborts the search
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Transport`] when every probe, the legacy one
    /// included, failed without an HTTP response.
    pub async fn locate(
        &self,
        id: ProductId,
        coords: &AddressCoordinates,
        progress: Option<&dyn ProgressSink>,
        cancel: &CancellationToken,
    ) -> Result<VideoSearch, MediaError> {
        let started = Instant::now();
        let deadline = started + self.config.timeout;

        let legacy = match self.probe_legacy(id, deadline, cancel).await {
            Some(outcome) => outcome,
            None if cancel.is_cancelled() => return Ok(VideoSearch::Cancelled),
            None => return Ok(VideoSearch::TimedOut),
        };
        if legacy.exists() {
            let url = self.prober.urls().legacy_video_url(id);
            info!(article = %id, url = %url, "Legacy video found");
            return Ok(VideoSearch::Found(VideoLocation {
                url,
                source: VideoSource::Legacy,
            }));
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        let plan = self.config.plan(remaining);
        let mut observer = ProgressObserver::new(progress, self.config.throttle());

        let outcome = run_search(
            &plan,
            |(shard, vol)| self.prober.probe_hls(id, coords, shard, vol),
            &mut observer,
            cancel,
        )
        .await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            SearchOutcome::Found {
                candidate: (shard, vol),
                zone,
                tally,
            } => {
                observer.finish().await;
                let url = self.prober.urls().hls_url(id, coords, shard, vol);
                info!(
                    article = %id,
                    shard = %shard,
                    vol,
                    zone = %zone,
                    probes = tally.probes(),
                    elapsed_ms,
                    "HLS video found"
                );
                Ok(VideoSearch::Found(VideoLocation {
                    url,
                    source: VideoSource::Hls { shard, vol },
                }))
            }
            SearchOutcome::Exhausted(tally) if tally.unreachable() && !legacy.responded() => {
                warn!(article = %id, probes = tally.probes(), elapsed_ms, "No video probe reached the CDN");
                Err(MediaError::Transport(format!(
                    "none of {} video probes for article {} received a response",
                    tally.probes() + 1,
                    id
                )))
            }
            SearchOutcome::Exhausted(tally) => {
                observer.finish().await;
                info!(article = %id, probes = tally.probes() + 1, elapsed_ms, "No video");
                Ok(VideoSearch::NotFound)
            }
            SearchOutcome::TimedOut(tally) => {
                info!(
                    article = %id,
                    probes = tally.probes() + 1,
                    timeout_s = self.config.timeout.as_secs(),
                    "Video search timed out"
                );
                Ok(VideoSearch::TimedOut)
            }
            SearchOutcome::Cancelled(tally) => {
                debug!(article = %id, probes = tally.probes() + 1, "Video search cancelled");
                Ok(VideoSearch::Cancelled)
            }
        }
    }

    /// Paces, then probes the legacy URL. `None` when the deadline or
    /// cancellation intervened.
    async fn probe_legacy(
        &self,
        id: ProductId,
        deadline: Instant,
        cancel: &CancellationToken,
    ) -> Option<ProbeOutcome> {
        let url = self.prober.urls().legacy_video_url(id);
        let attempt = async {
            tokio::time::sleep(self.config.legacy_delay).await;
            self.prober.probe(&url).await
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            outcome = tokio::time::timeout_at(deadline, attempt) => outcome.ok(),
        }
    }
}
