//! Photo enumeration.
//!
//! Photos on a shard are numbered `1.webp`, `2.webp`, ... without gaps, so
//! enumeration probes indices in order and stops at the first miss.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::article::ProductId;
use crate::cdn::{HttpClient, Prober};
use crate::coord::{AddressCoordinates, ShardNumber};

/// Default cap on enumerated photos.
pub const DEFAULT_MAX_PHOTOS: u32 = 20;

/// Default pause before each photo probe.
pub const DEFAULT_PHOTO_PACING: Duration = Duration::from_millis(10);

/// Photo enumeration settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoConfig {
    /// Highest photo index probed.
    pub max_photos: u32,
    /// Pause before each probe.
    pub pacing: Duration,
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            max_photos: DEFAULT_MAX_PHOTOS,
            pacing: DEFAULT_PHOTO_PACING,
        }
    }
}

/// Sequentially probes photo indices on a known shard.
pub struct PhotoEnumerator<C: HttpClient> {
    prober: Prober<C>,
    config: PhotoConfig,
}

impl<C: HttpClient> PhotoEnumerator<C> {
    pub fn new(prober: Prober<C>, config: PhotoConfig) -> Self {
        Self { prober, config }
    }

    /// Returns the URLs of every existing photo, in index order.
    ///
    /// Stops at the first index that is not confirmed present, at
    /// `max_photos`, or when `cancel` fires. An empty list is a valid result.
    pub async fn enumerate(
        &self,
        id: ProductId,
        coords: &AddressCoordinates,
        shard: ShardNumber,
        cancel: &CancellationToken,
    ) -> Vec<String> {
        let urls = self.prober.urls();
        let mut photos = Vec::new();

        for index in 1..=self.config.max_photos {
            if !self.config.pacing.is_zero() {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.config.pacing) => {}
                }
            } else if cancel.is_cancelled() {
                break;
            }

            let url = urls.photo_url(id, coords, shard, index);
            if !self.prober.probe(&url).await.exists() {
                break;
            }
            photos.push(url);
        }

        debug!(article = %id, shard = %shard, photos = photos.len(), "Photos enumerated");
        photos
    }
}
