//! Application bootstrap implementation.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::config::AppConfig;
use super::error::AppError;
use crate::cache::{spawn_eviction_task, BasketCache, VideoCache};
use crate::cdn::{CdnUrls, HttpClient, Prober, ReqwestClient};
use crate::media::MediaService;

/// Media discovery application with its background tasks.
///
/// Construction order:
/// 1. HTTP client (fails fast when the TLS backend is unusable)
/// 2. Shared caches
/// 3. Video cache eviction task
/// 4. Media service
pub struct MediaApp<C: HttpClient = ReqwestClient> {
    service: Arc<MediaService<C>>,
    basket_cache: Arc<BasketCache>,
    video_cache: Arc<VideoCache>,
    shutdown: CancellationToken,
    eviction_task: Option<JoinHandle<()>>,
}

impl MediaApp<ReqwestClient> {
    /// Start the application with the production HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::HttpClient`] if the client cannot be built.
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        let client = ReqwestClient::new(&config.http)?;
        info!(
            max_connections = config.http.max_connections,
            max_connections_per_host = config.http.max_connections_per_host,
            "HTTP client created"
        );
        Ok(Self::start_with_client(config, Arc::new(client)).await)
    }
}

impl<C: HttpClient + 'static> MediaApp<C> {
    /// Start the application over an existing client.
    pub async fn start_with_client(config: AppConfig, client: Arc<C>) -> Self {
        let shutdown = CancellationToken::new();
        let basket_cache = Arc::new(BasketCache::new());
        let video_cache = Arc::new(VideoCache::new(config.video_cache.ttl));

        let eviction_task = spawn_eviction_task(
            Arc::clone(&video_cache),
            config.video_cache.eviction_interval,
            shutdown.child_token(),
        );
        info!(
            ttl_secs = config.video_cache.ttl.as_secs(),
            interval_secs = config.video_cache.eviction_interval.as_secs(),
            "Video cache eviction task started"
        );

        let prober = Prober::new(client, CdnUrls::new(config.cdn.clone()));
        let service = MediaService::new(
            prober,
            Arc::clone(&basket_cache),
            Arc::clone(&video_cache),
            config.shards,
            config.photos,
            config.video,
        )
        .with_shutdown(shutdown.child_token());

        Self {
            service: Arc::new(service),
            basket_cache,
            video_cache,
            shutdown,
            eviction_task: Some(eviction_task),
        }
    }

    /// The media service.
    pub fn service(&self) -> Arc<MediaService<C>> {
        Arc::clone(&self.service)
    }

    /// A token for one request; cancelling it leaves the app running.
    pub fn request_token(&self) -> CancellationToken {
        self.service.request_token()
    }

    pub fn basket_cache(&self) -> &Arc<BasketCache> {
        &self.basket_cache
    }

    pub fn video_cache(&self) -> &Arc<VideoCache> {
        &self.video_cache
    }

    /// Cancels in-flight searches and stops background tasks.
    pub async fn shutdown(mut self) {
        info!("Shutting down media app");
        self.shutdown.cancel();
        if let Some(task) = self.eviction_task.take() {
            if let Err(e) = task.await {
                debug!(error = %e, "Eviction task ended abnormally");
            }
        }
    }
}

impl<C: HttpClient> Drop for MediaApp<C> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::ProductId;
    use crate::cdn::MockCdn;
    use crate::media::{MediaRequest, MediaResolution};

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let app = MediaApp::start(AppConfig::default()).await.unwrap();
        assert!(app.basket_cache().is_empty());
        assert!(app.video_cache().is_empty());
        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_caches_are_shared_with_service() {
        let cdn = Arc::new(MockCdn::with_existing([
            "https://basket-21.wbbasket.ru/vol123/part12345/12345678/images/big/1.webp",
        ]));
        let mut config = AppConfig::default();
        config.shards.batch_delay = std::time::Duration::ZERO;
        config.photos.pacing = std::time::Duration::ZERO;
        let app = MediaApp::start_with_client(config, cdn).await;

        let result = app
            .service()
            .fetch(
                ProductId::new(12_345_678),
                MediaRequest::photos_only(),
                None,
                &app.request_token(),
            )
            .await
            .unwrap();

        assert!(matches!(result, MediaResolution::Found(_)));
        assert_eq!(app.basket_cache().len(), 1);
        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_request_tokens_are_independent() {
        let app = MediaApp::start_with_client(AppConfig::default(), Arc::new(MockCdn::new())).await;
        let first = app.request_token();
        let second = app.request_token();

        first.cancel();
        assert!(!second.is_cancelled());
        assert!(!app.request_token().is_cancelled());
        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_cancels_request_tokens() {
        let app = MediaApp::start_with_client(AppConfig::default(), Arc::new(MockCdn::new())).await;
        let token = app.request_token();
        app.shutdown().await;
        assert!(token.is_cancelled());
    }
}
