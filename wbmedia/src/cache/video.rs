//! Video discovery cache with lazy TTL expiry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::clock::{Clock, SystemClock};
use crate::article::ProductId;

/// Default entry lifetime.
pub const DEFAULT_VIDEO_TTL: Duration = Duration::from_secs(3600);

/// Default period of the background eviction sweep.
pub const DEFAULT_EVICTION_INTERVAL: Duration = Duration::from_secs(300);

/// Video cache settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCacheConfig {
    /// How long an entry stays valid after it is written.
    pub ttl: Duration,
    /// How often the background sweep runs.
    pub eviction_interval: Duration,
}

impl Default for VideoCacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_VIDEO_TTL,
            eviction_interval: DEFAULT_EVICTION_INTERVAL,
        }
    }
}

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoCacheLookup {
    /// Nothing cached, or the entry expired.
    Miss,
    /// A previous search established the product has no video.
    NoVideo,
    /// A previously discovered video URL.
    Video(String),
}

impl VideoCacheLookup {
    /// True for `NoVideo` and `Video`.
    pub fn is_hit(&self) -> bool {
        !matches!(self, VideoCacheLookup::Miss)
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            VideoCacheLookup::Video(url) => Some(url),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    url: Option<String>,
    stored_at: Instant,
}

/// Article → video URL cache, including negative entries.
///
/// Expiry is lazy: an expired entry is removed by the `get` that observes
/// it, or by [`evict_expired`](Self::evict_expired).
pub struct VideoCache {
    entries: DashMap<ProductId, Entry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl VideoCache {
    /// Creates a cache using the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Looks up `id`, evicting the entry if it has expired.
    pub fn get(&self, id: ProductId) -> VideoCacheLookup {
        let now = self.clock.now();
        {
            let Some(entry) = self.entries.get(&id) else {
                return VideoCacheLookup::Miss;
            };
            if !self.is_expired(&entry, now) {
                return match &entry.url {
                    Some(url) => VideoCacheLookup::Video(url.clone()),
                    None => VideoCacheLookup::NoVideo,
                };
            }
        }

        // Re-check under the write lock; a concurrent set may have refreshed it.
        self.entries
            .remove_if(&id, |_, entry| self.is_expired(entry, now));
        VideoCacheLookup::Miss
    }

    /// Stores a result for `id`, overwriting any previous entry.
    ///
    /// `None` records that the product has no video.
    pub fn set(&self, id: ProductId, url: Option<String>) {
        self.entries.insert(
            id,
            Entry {
                url,
                stored_at: self.clock.now(),
            },
        );
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !self.is_expired(entry, now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        now.saturating_duration_since(entry.stored_at) > self.ttl
    }
}

/// Spawns a task that periodically calls [`VideoCache::evict_expired`].
///
/// The task exits when `shutdown` is cancelled.
pub fn spawn_eviction_task(
    cache: Arc<VideoCache>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        // The first tick fires immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("Video cache eviction task stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let evicted = cache.evict_expired();
                    if evicted > 0 {
                        debug!(evicted, remaining = cache.len(), "Evicted expired video cache entries");
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    fn cache_with_clock(ttl: Duration) -> (Arc<ManualClock>, VideoCache) {
        let clock = Arc::new(ManualClock::new());
        let cache = VideoCache::with_clock(ttl, clock.clone());
        (clock, cache)
    }

    fn id(n: u64) -> ProductId {
        ProductId::new(n)
    }

    #[test]
    fn test_miss_on_empty() {
        let cache = VideoCache::new(DEFAULT_VIDEO_TTL);
        assert_eq!(cache.get(id(12345678)), VideoCacheLookup::Miss);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_positive_and_negative_entries() {
        let (_, cache) = cache_with_clock(Duration::from_secs(60));
        cache.set(id(1), Some("https://video.wildberries.ru/1/1.mp4".into()));
        cache.set(id(2), None);

        let hit = cache.get(id(1));
        assert!(hit.is_hit());
        assert_eq!(hit.url(), Some("https://video.wildberries.ru/1/1.mp4"));

        let negative = cache.get(id(2));
        assert_eq!(negative, VideoCacheLookup::NoVideo);
        assert!(negative.is_hit());
        assert_eq!(negative.url(), None);
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let (clock, cache) = cache_with_clock(Duration::from_secs(1));
        cache.set(id(1), Some("u".into()));

        clock.advance(Duration::from_secs(1));
        assert!(cache.get(id(1)).is_hit());

        clock.advance(Duration::from_millis(1));
        assert_eq!(cache.get(id(1)), VideoCacheLookup::Miss);
        // Lazy expiry removed it.
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_set_overwrites_and_refreshes() {
        let (clock, cache) = cache_with_clock(Duration::from_secs(10));
        cache.set(id(1), None);
        clock.advance(Duration::from_secs(8));
        cache.set(id(1), Some("new".into()));
        clock.advance(Duration::from_secs(8));

        assert_eq!(cache.get(id(1)), VideoCacheLookup::Video("new".into()));
    }

    #[test]
    fn test_evict_expired_counts_removed() {
        let (clock, cache) = cache_with_clock(Duration::from_secs(5));
        cache.set(id(1), None);
        cache.set(id(2), Some("a".into()));
        clock.advance(Duration::from_secs(3));
        cache.set(id(3), Some("b".into()));
        clock.advance(Duration::from_secs(3));

        assert_eq!(cache.evict_expired(), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(id(3)).is_hit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_task_sweeps_and_stops() {
        let cache = Arc::new(VideoCache::new(Duration::from_millis(100)));
        cache.set(id(1), None);

        let shutdown = CancellationToken::new();
        let handle = spawn_eviction_task(
            Arc::clone(&cache),
            Duration::from_millis(50),
            shutdown.clone(),
        );

        // The sweep runs on the tokio clock while TTL uses the system clock,
        // so only check that the task shuts down cleanly.
        tokio::time::sleep(Duration::from_millis(120)).await;
        shutdown.cancel();
        handle.await.unwrap();
    }
}
