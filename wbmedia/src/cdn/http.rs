//! HTTP client abstraction for testability

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Default per-request timeout for existence probes.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default cap on concurrent requests across all hosts.
pub const DEFAULT_MAX_CONNECTIONS: usize = 100;

/// Default cap on concurrent requests to a single host.
pub const DEFAULT_MAX_CONNECTIONS_PER_HOST: usize = 50;

/// Errors raised by the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// The underlying client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),

    /// The URL could not be parsed or has no host.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request did not complete within the request timeout.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// Connection, DNS or protocol failure.
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Timeout for a single request.
    pub request_timeout: Duration,
    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,
    /// Maximum in-flight requests overall.
    pub max_connections: usize,
    /// Maximum in-flight requests per host.
    pub max_connections_per_host: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            max_connections_per_host: DEFAULT_MAX_CONNECTIONS_PER_HOST,
        }
    }
}

/// Trait for HTTP client operations.
///
/// Only existence checks are needed by the engine, so the trait exposes a
/// single HEAD operation returning the response status. This abstraction
/// allows mock CDNs to be injected in tests.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP HEAD request and returns the status code.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Errors
    ///
    /// Returns an error when no HTTP response was received at all.
    fn head(&self, url: &str) -> impl Future<Output = Result<u16, HttpError>> + Send;
}

impl<C: HttpClient> HttpClient for Arc<C> {
    fn head(&self, url: &str) -> impl Future<Output = Result<u16, HttpError>> + Send {
        (**self).head(url)
    }
}

/// Bounds concurrent requests overall and per host.
///
/// The per-host permit is taken first so a busy host does not hold global
/// permits while it waits.
#[derive(Debug)]
struct ConnectionLimiter {
    total: Arc<Semaphore>,
    per_host: DashMap<String, Arc<Semaphore>>,
    per_host_limit: usize,
}

impl ConnectionLimiter {
    fn new(total: usize, per_host: usize) -> Self {
        Self {
            total: Arc::new(Semaphore::new(total.max(1))),
            per_host: DashMap::new(),
            per_host_limit: per_host.max(1),
        }
    }

    async fn acquire(
        &self,
        host: &str,
    ) -> Result<(OwnedSemaphorePermit, OwnedSemaphorePermit), tokio::sync::AcquireError> {
        let host_semaphore = self
            .per_host
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(self.per_host_limit)))
            .clone();

        let host_permit = host_semaphore.acquire_owned().await?;
        let total_permit = Arc::clone(&self.total).acquire_owned().await?;
        Ok((host_permit, total_permit))
    }
}

/// Real HTTP client implementation using reqwest.
#[derive(Debug)]
pub struct ReqwestClient {
    client: reqwest::Client,
    limiter: ConnectionLimiter,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient from the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::ClientBuild`] if the TLS backend or connection
    /// pool cannot be initialised.
    pub fn new(config: &HttpConfig) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.max_connections_per_host)
            .user_agent(concat!("wbmedia/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            limiter: ConnectionLimiter::new(
                config.max_connections,
                config.max_connections_per_host,
            ),
        })
    }
}

impl HttpClient for ReqwestClient {
    fn head(&self, url: &str) -> impl Future<Output = Result<u16, HttpError>> + Send {
        let url = url.to_string();
        async move {
            let host = reqwest::Url::parse(&url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .ok_or_else(|| HttpError::InvalidUrl(url.clone()))?;

            let _permits = self
                .limiter
                .acquire(&host)
                .await
                .map_err(|e| HttpError::Request {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;

            let response = self.client.head(&url).send().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::Timeout { url: url.clone() }
                } else {
                    HttpError::Request {
                        url: url.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

            Ok(response.status().as_u16())
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum MockMode {
        Respond,
        Hang,
        Fail,
    }

    /// Mock CDN for testing.
    ///
    /// URLs registered as existing answer 200, everything else 404. Every
    /// request is counted and recorded.
    pub struct MockCdn {
        existing: Mutex<HashSet<String>>,
        once: Mutex<HashSet<String>>,
        requested: Mutex<Vec<String>>,
        probes: AtomicUsize,
        mode: MockMode,
    }

    impl MockCdn {
        pub fn new() -> Self {
            Self {
                existing: Mutex::new(HashSet::new()),
                once: Mutex::new(HashSet::new()),
                requested: Mutex::new(Vec::new()),
                probes: AtomicUsize::new(0),
                mode: MockMode::Respond,
            }
        }

        /// A CDN whose requests never complete.
        pub fn hanging() -> Self {
            Self {
                mode: MockMode::Hang,
                ..Self::new()
            }
        }

        /// A CDN that is unreachable (every request errors).
        pub fn failing() -> Self {
            Self {
                mode: MockMode::Fail,
                ..Self::new()
            }
        }

        pub fn with_existing<I, S>(urls: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            let cdn = Self::new();
            for url in urls {
                cdn.add(url);
            }
            cdn
        }

        pub fn add(&self, url: impl Into<String>) {
            self.existing.lock().unwrap().insert(url.into());
        }

        /// Registers a URL that answers 200 for a single request.
        pub fn add_once(&self, url: impl Into<String>) {
            self.once.lock().unwrap().insert(url.into());
        }

        pub fn probe_count(&self) -> usize {
            self.probes.load(Ordering::SeqCst)
        }

        pub fn probes_matching(&self, needle: &str) -> usize {
            self.requested
                .lock()
                .unwrap()
                .iter()
                .filter(|u| u.contains(needle))
                .count()
        }

        pub fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }

        pub fn reset_counters(&self) {
            self.probes.store(0, Ordering::SeqCst);
            self.requested.lock().unwrap().clear();
        }
    }

    impl HttpClient for MockCdn {
        fn head(&self, url: &str) -> impl Future<Output = Result<u16, HttpError>> + Send {
            let url = url.to_string();
            async move {
                self.probes.fetch_add(1, Ordering::SeqCst);
                self.requested.lock().unwrap().push(url.clone());
                match self.mode {
                    MockMode::Hang => std::future::pending::<Result<u16, HttpError>>().await,
                    MockMode::Fail => Err(HttpError::Request {
                        url,
                        reason: "dns error: no resolver".to_string(),
                    }),
                    MockMode::Respond => {
                        if self.existing.lock().unwrap().contains(&url)
                            || self.once.lock().unwrap().remove(&url)
                        {
                            Ok(200)
                        } else {
                            Ok(404)
                        }
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn test_mock_cdn_existing_and_missing() {
        let cdn = MockCdn::with_existing(["https://a.example/1"]);
        assert_eq!(cdn.head("https://a.example/1").await, Ok(200));
        assert_eq!(cdn.head("https://a.example/2").await, Ok(404));
        assert_eq!(cdn.probe_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_cdn_once() {
        let cdn = MockCdn::new();
        cdn.add_once("https://a.example/1");
        assert_eq!(cdn.head("https://a.example/1").await, Ok(200));
        assert_eq!(cdn.head("https://a.example/1").await, Ok(404));
    }

    #[tokio::test]
    async fn test_mock_cdn_failing() {
        let cdn = MockCdn::failing();
        assert!(matches!(
            cdn.head("https://a.example/1").await,
            Err(HttpError::Request { .. })
        ));
    }

    #[tokio::test]
    async fn test_arc_client_delegates() {
        let cdn = Arc::new(MockCdn::with_existing(["https://a.example/1"]));
        assert_eq!(cdn.head("https://a.example/1").await, Ok(200));
        assert_eq!(cdn.probe_count(), 1);
    }

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.max_connections, 100);
        assert_eq!(config.max_connections_per_host, 50);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(ReqwestClient::new(&HttpConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_reqwest_client_rejects_invalid_url() {
        let client = ReqwestClient::new(&HttpConfig::default()).unwrap();
        assert!(matches!(
            client.head("not a url").await,
            Err(HttpError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_limiter_bounds_per_host() {
        let limiter = ConnectionLimiter::new(10, 1);
        let first = limiter.acquire("basket-01.example").await.unwrap();

        // Same host must wait, another host proceeds.
        let blocked = tokio::time::timeout(
            Duration::from_millis(20),
            limiter.acquire("basket-01.example"),
        )
        .await;
        assert!(blocked.is_err());
        assert!(limiter.acquire("basket-02.example").await.is_ok());

        drop(first);
        assert!(limiter.acquire("basket-01.example").await.is_ok());
    }

    #[tokio::test]
    async fn test_limiter_bounds_total() {
        let limiter = ConnectionLimiter::new(1, 5);
        let _held = limiter.acquire("a.example").await.unwrap();
        let blocked =
            tokio::time::timeout(Duration::from_millis(20), limiter.acquire("b.example")).await;
        assert!(blocked.is_err());
    }
}
