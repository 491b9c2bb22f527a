//! Media discovery facade.
//!
//! [`MediaService`] ties the resolver, the photo enumerator, the video
//! locator and both caches together behind a single `fetch` call.
//!
//! # Flow
//!
//! ```text
//! fetch(id)
//!   ├─ photos requested ─► ShardResolver ─NotFound─────────────► NotFound
//!   │                           │ shard
//!   │                           ▼
//!   │              join!(PhotoEnumerator, search_video)
//!   └─ skip_photos ──────────────────────► search_video
//!                                                │
//!                          photos or video ─► Found(ProductMedia)
//!                          neither ─────────► NoMedia
//! ```
//!
//! Every call takes its own [`CancellationToken`]. Tokens handed out by
//! [`MediaService::request_token`] are children of the service's shutdown
//! token, so cancelling one request leaves the others running while
//! shutdown stops them all.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::article::ProductId;
use crate::cache::{BasketCache, VideoCache, VideoCacheLookup};
use crate::cdn::{HttpClient, Prober};
use crate::coord::{derive_coordinates, AddressCoordinates};
use crate::error::MediaError;
use crate::photos::{PhotoConfig, PhotoEnumerator};
use crate::progress::ProgressSink;
use crate::resolver::{ShardResolution, ShardResolver, ShardSearchConfig};
use crate::video::{VideoLocator, VideoSearchConfig};

/// Discovered media of an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductMedia {
    pub id: ProductId,
    /// Photo URLs in index order.
    pub photos: Vec<String>,
    /// Playlist or direct-file URL.
    pub video: Option<String>,
}

impl ProductMedia {
    pub fn has_photos(&self) -> bool {
        !self.photos.is_empty()
    }

    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }

    /// No photos and no video.
    pub fn is_empty(&self) -> bool {
        !self.has_photos() && !self.has_video()
    }
}

/// What to look up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaRequest {
    pub skip_video: bool,
    pub skip_photos: bool,
}

impl MediaRequest {
    /// Photos and video.
    pub fn all() -> Self {
        Self::default()
    }

    /// Photos only; video is typically searched later with
    /// [`MediaService::search_video`].
    pub fn photos_only() -> Self {
        Self {
            skip_video: true,
            skip_photos: false,
        }
    }

    pub fn video_only() -> Self {
        Self {
            skip_video: false,
            skip_photos: true,
        }
    }
}

/// Outcome of a media fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "media", rename_all = "snake_case")]
pub enum MediaResolution {
    /// At least one photo or a video.
    Found(ProductMedia),
    /// No shard hosts the article.
    NotFound,
    /// The article exists but has neither photos nor video.
    NoMedia,
}

impl MediaResolution {
    pub fn media(&self) -> Option<&ProductMedia> {
        match self {
            MediaResolution::Found(media) => Some(media),
            _ => None,
        }
    }
}

/// Media discovery over a shared client and shared caches.
pub struct MediaService<C: HttpClient> {
    resolver: ShardResolver<C>,
    photos: PhotoEnumerator<C>,
    video: VideoLocator<C>,
    video_cache: Arc<VideoCache>,
    shutdown: CancellationToken,
}

impl<C: HttpClient> MediaService<C> {
    /// Creates a service.
    ///
    /// # Arguments
    ///
    /// * `prober` - Shared prober (client and URL templates)
    /// * `basket_cache` - Volume → shard cache
    /// * `video_cache` - Article → video cache
    /// * `shards` / `photos` / `video` - Component settings
    pub fn new(
        prober: Prober<C>,
        basket_cache: Arc<BasketCache>,
        video_cache: Arc<VideoCache>,
        shards: ShardSearchConfig,
        photos: PhotoConfig,
        video: VideoSearchConfig,
    ) -> Self {
        Self {
            resolver: ShardResolver::new(prober.clone(), basket_cache, shards),
            photos: PhotoEnumerator::new(prober.clone(), photos),
            video: VideoLocator::new(prober, video),
            video_cache,
            shutdown: CancellationToken::new(),
        }
    }

    /// Parents every request token on `shutdown`.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// A fresh token for one request, cancelled on shutdown.
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    pub fn video_cache(&self) -> &Arc<VideoCache> {
        &self.video_cache
    }

    /// Resolves the media of `id`.
    ///
    /// `progress` receives updates from the video search only.
    ///
    /// # Errors
    ///
    /// - [`MediaError::InvalidInput`] when both photos and video are skipped
    /// - [`MediaError::Transport`] when the CDN could not be reached at all
    /// - [`MediaError::Cancelled`] when `cancel` fired before the lookup concluded
    pub async fn fetch(
        &self,
        id: ProductId,
        request: MediaRequest,
        progress: Option<&dyn ProgressSink>,
        cancel: &CancellationToken,
    ) -> Result<MediaResolution, MediaError> {
        let result = self.fetch_inner(id, request, progress, cancel).await;
        match &result {
            Ok(MediaResolution::Found(media)) => info!(
                article = %id,
                photos = media.photos.len(),
                video = media.has_video(),
                "Media resolved"
            ),
            Ok(MediaResolution::NotFound) => info!(article = %id, "Article not found on CDN"),
            Ok(MediaResolution::NoMedia) => info!(article = %id, "Article has no media"),
            Err(MediaError::Transport(reason)) => {
                error!(article = %id, reason = %reason, "Media discovery failed")
            }
            Err(MediaError::Cancelled) => debug!(article = %id, "Media request cancelled"),
            Err(e) => debug!(article = %id, error = %e, "Rejected media request"),
        }
        result
    }

    async fn fetch_inner(
        &self,
        id: ProductId,
        request: MediaRequest,
        progress: Option<&dyn ProgressSink>,
        cancel: &CancellationToken,
    ) -> Result<MediaResolution, MediaError> {
        if request.skip_photos && request.skip_video {
            return Err(MediaError::InvalidInput(
                "both photos and video were skipped".to_string(),
            ));
        }
        let coords = derive_coordinates(id);

        if request.skip_photos {
            let video = self.cached_video(id, &coords, progress, cancel).await?;
            return Ok(assemble(id, Vec::new(), video));
        }

        let shard = match self.resolver.resolve(id, &coords, cancel).await? {
            ShardResolution::Cancelled => return Err(MediaError::Cancelled),
            ShardResolution::NotFound => return Ok(MediaResolution::NotFound),
            ShardResolution::Cached(shard) | ShardResolution::Discovered(shard) => shard,
        };

        let photos = self.photos.enumerate(id, &coords, shard, cancel);
        let (photos, video) = if request.skip_video {
            (photos.await, None)
        } else {
            let (photos, video) =
                tokio::join!(photos, self.cached_video(id, &coords, progress, cancel));
            (photos, video?)
        };

        // Enumeration stops early on cancel; a partial list is not an answer.
        if cancel.is_cancelled() {
            return Err(MediaError::Cancelled);
        }
        Ok(assemble(id, photos, video))
    }

    /// Looks up the video of `id`, consulting the video cache first.
    ///
    /// Intended for the background half of a photos-first response.
    /// Conclusive results, negative ones included, are cached.
    ///
    /// # Errors
    ///
    /// [`MediaError::Cancelled`] when `cancel` fired first; nothing is cached.
    pub async fn search_video(
        &self,
        id: ProductId,
        progress: Option<&dyn ProgressSink>,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, MediaError> {
        let coords = derive_coordinates(id);
        self.cached_video(id, &coords, progress, cancel).await
    }

    async fn cached_video(
        &self,
        id: ProductId,
        coords: &AddressCoordinates,
        progress: Option<&dyn ProgressSink>,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, MediaError> {
        match self.video_cache.get(id) {
            VideoCacheLookup::Video(url) => {
                debug!(article = %id, "Video cache hit");
                return Ok(Some(url));
            }
            VideoCacheLookup::NoVideo => {
                debug!(article = %id, "Video cache hit (no video)");
                return Ok(None);
            }
            VideoCacheLookup::Miss => {}
        }

        let search = self.video.locate(id, coords, progress, cancel).await?;
        if !search.is_conclusive() {
            return Err(MediaError::Cancelled);
        }
        let url = search.into_location().map(|location| location.url);
        self.video_cache.set(id, url.clone());
        Ok(url)
    }
}

fn assemble(id: ProductId, photos: Vec<String>, video: Option<String>) -> MediaResolution {
    let media = ProductMedia { id, photos, video };
    if media.is_empty() {
        MediaResolution::NoMedia
    } else {
        MediaResolution::Found(media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdn::{CdnUrls, MockCdn};
    use std::time::Duration;

    const PHOTO_BASE: &str = "https://basket-01.wbbasket.ru/vol123/part12345/12345678/images/big";
    const HLS_1_1: &str =
        "https://videonme-basket-01.wbbasket.ru/vol1/part1234/12345678/hls/1440p/index.m3u8";

    fn service(cdn: &Arc<MockCdn>) -> MediaService<MockCdn> {
        MediaService::new(
            Prober::new(Arc::clone(cdn), CdnUrls::default()),
            Arc::new(BasketCache::new()),
            Arc::new(VideoCache::new(Duration::from_secs(3600))),
            ShardSearchConfig {
                batch_delay: Duration::ZERO,
                ..Default::default()
            },
            PhotoConfig {
                pacing: Duration::ZERO,
                ..Default::default()
            },
            VideoSearchConfig {
                max_shard: 2,
                batch_delay: Duration::ZERO,
                legacy_delay: Duration::ZERO,
                ..Default::default()
            },
        )
    }

    fn id() -> ProductId {
        ProductId::new(12_345_678)
    }

    fn token() -> CancellationToken {
        CancellationToken::new()
    }

    fn photo(n: u32) -> String {
        format!("{PHOTO_BASE}/{n}.webp")
    }

    #[tokio::test]
    async fn test_photos_and_hls_video() {
        let cdn = Arc::new(MockCdn::with_existing([photo(1), photo(2), photo(3), HLS_1_1.into()]));
        let service = service(&cdn);

        let result = service.fetch(id(), MediaRequest::all(), None, &token()).await.unwrap();

        let media = result.media().unwrap();
        assert_eq!(media.photos, vec![photo(1), photo(2), photo(3)]);
        assert_eq!(media.video.as_deref(), Some(HLS_1_1));
    }

    #[tokio::test]
    async fn test_not_found_skips_video_search() {
        let cdn = Arc::new(MockCdn::new());
        let service = service(&cdn);

        let result = service.fetch(id(), MediaRequest::all(), None, &token()).await.unwrap();

        assert_eq!(result, MediaResolution::NotFound);
        assert_eq!(cdn.probes_matching("videonme"), 0);
        assert_eq!(cdn.probes_matching("video.wildberries"), 0);
    }

    #[tokio::test]
    async fn test_no_media_is_distinct_from_not_found() {
        // Photo 1 answers the shard search, then vanishes before enumeration.
        let cdn = Arc::new(MockCdn::new());
        cdn.add_once(photo(1));
        let service = service(&cdn);

        let result = service.fetch(id(), MediaRequest::all(), None, &token()).await.unwrap();

        assert_eq!(result, MediaResolution::NoMedia);
        assert!(cdn.probes_matching("videonme") > 0);
    }

    #[tokio::test]
    async fn test_no_media_when_shard_has_nothing() {
        let cdn = Arc::new(MockCdn::new());
        let service = service(&cdn);

        let result = service
            .fetch(id(), MediaRequest::video_only(), None, &token())
            .await
            .unwrap();
        assert_eq!(result, MediaResolution::NoMedia);
    }

    #[tokio::test]
    async fn test_negative_video_result_is_cached() {
        let cdn = Arc::new(MockCdn::with_existing([photo(1)]));
        let service = service(&cdn);

        let first = service.fetch(id(), MediaRequest::all(), None, &token()).await.unwrap();
        assert_eq!(first.media().unwrap().video, None);
        assert_eq!(service.video_cache().get(id()), VideoCacheLookup::NoVideo);

        cdn.reset_counters();
        let second = service.fetch(id(), MediaRequest::all(), None, &token()).await.unwrap();

        assert_eq!(second, first);
        assert_eq!(cdn.probes_matching("videonme"), 0);
        assert_eq!(cdn.probes_matching("video.wildberries"), 0);
    }

    #[tokio::test]
    async fn test_photos_only_then_background_video() {
        let cdn = Arc::new(MockCdn::with_existing([photo(1), HLS_1_1.into()]));
        let service = service(&cdn);

        let first = service
            .fetch(id(), MediaRequest::photos_only(), None, &token())
            .await
            .unwrap();
        assert_eq!(first.media().unwrap().video, None);
        assert_eq!(cdn.probes_matching("videonme"), 0);

        let video = service.search_video(id(), None, &token()).await.unwrap();
        assert_eq!(video.as_deref(), Some(HLS_1_1));
        assert_eq!(
            service.video_cache().get(id()),
            VideoCacheLookup::Video(HLS_1_1.into())
        );
    }

    #[tokio::test]
    async fn test_skipping_everything_is_invalid() {
        let cdn = Arc::new(MockCdn::new());
        let request = MediaRequest {
            skip_video: true,
            skip_photos: true,
        };
        let err = service(&cdn).fetch(id(), request, None, &token()).await.unwrap_err();
        assert!(matches!(err, MediaError::InvalidInput(_)));
        assert_eq!(cdn.probe_count(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_cdn_propagates_transport() {
        let cdn = Arc::new(MockCdn::failing());
        let err = service(&cdn)
            .fetch(id(), MediaRequest::all(), None, &token())
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Transport(_)));
    }

    #[test]
    fn test_resolution_json_shape() {
        let found = MediaResolution::Found(ProductMedia {
            id: id(),
            photos: vec![photo(1)],
            video: None,
        });
        let value = serde_json::to_value(&found).unwrap();
        assert_eq!(value["status"], "found");
        assert_eq!(value["media"]["id"], 12_345_678);
        assert_eq!(value["media"]["photos"][0], photo(1));
        assert!(value["media"]["video"].is_null());

        let not_found = serde_json::to_value(MediaResolution::NotFound).unwrap();
        assert_eq!(not_found["status"], "not_found");
    }

    #[tokio::test]
    async fn test_cancelled_video_search_is_not_cached() {
        let cdn = Arc::new(MockCdn::new());
        let service = service(&cdn);
        let cancel = service.request_token();
        cancel.cancel();

        let err = service.search_video(id(), None, &cancel).await.unwrap_err();
        assert_eq!(err, MediaError::Cancelled);
        assert!(service.video_cache().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_fetch_is_an_error_not_absence() {
        let cdn = Arc::new(MockCdn::with_existing([photo(1)]));
        let service = service(&cdn);
        let cancel = service.request_token();
        cancel.cancel();

        let err = service
            .fetch(id(), MediaRequest::all(), None, &cancel)
            .await
            .unwrap_err();
        assert_eq!(err, MediaError::Cancelled);
        assert_eq!(cdn.probe_count(), 0);
    }

    #[tokio::test]
    async fn test_cancelling_one_request_leaves_later_requests_working() {
        let cdn = Arc::new(MockCdn::with_existing([photo(1), photo(2), HLS_1_1.into()]));
        let service = service(&cdn);

        let first = service.request_token();
        first.cancel();
        let err = service
            .fetch(id(), MediaRequest::all(), None, &first)
            .await
            .unwrap_err();
        assert_eq!(err, MediaError::Cancelled);

        let result = service
            .fetch(id(), MediaRequest::all(), None, &service.request_token())
            .await
            .unwrap();
        let media = result.media().unwrap();
        assert_eq!(media.photos, vec![photo(1), photo(2)]);
        assert_eq!(media.video.as_deref(), Some(HLS_1_1));
    }

    #[tokio::test]
    async fn test_shutdown_cancels_outstanding_request_tokens() {
        let cdn = Arc::new(MockCdn::with_existing([photo(1)]));
        let shutdown = CancellationToken::new();
        let service = service(&cdn).with_shutdown(shutdown.clone());
        let request = service.request_token();

        shutdown.cancel();

        assert!(request.is_cancelled());
        let err = service
            .search_video(id(), None, &request)
            .await
            .unwrap_err();
        assert_eq!(err, MediaError::Cancelled);
    }
}
