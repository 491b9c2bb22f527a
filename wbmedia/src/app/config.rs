//! Application configuration.

use std::time::Duration;

use crate::cache::VideoCacheConfig;
use crate::cdn::{CdnConfig, HttpConfig};
use crate::config::ConfigFile;
use crate::photos::PhotoConfig;
use crate::resolver::ShardSearchConfig;
use crate::video::VideoSearchConfig;

/// Settings of every component the application wires together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub cdn: CdnConfig,
    pub http: HttpConfig,
    pub shards: ShardSearchConfig,
    pub photos: PhotoConfig,
    pub video: VideoSearchConfig,
    pub video_cache: VideoCacheConfig,
}

impl AppConfig {
    /// Create application config from the configuration file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        Self {
            cdn: config.cdn.clone(),
            http: config.http.clone(),
            shards: config.shards.clone(),
            photos: config.photos.clone(),
            video: config.video.clone(),
            video_cache: config.cache.clone(),
        }
    }

    /// Set the shard search deadline.
    pub fn with_shard_timeout(mut self, timeout: Duration) -> Self {
        self.shards.timeout = timeout;
        self
    }

    /// Set the video search deadline.
    pub fn with_video_timeout(mut self, timeout: Duration) -> Self {
        self.video.timeout = timeout;
        self
    }

    /// Set the video cache TTL.
    pub fn with_video_cache_ttl(mut self, ttl: Duration) -> Self {
        self.video_cache.ttl = ttl;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_file_copies_sections() {
        let file = ConfigFile::parse("[shards]\nbatch_size = 25\n\n[cache]\nvideo_ttl_secs = 10\n")
            .unwrap();
        let config = AppConfig::from_config_file(&file);

        assert_eq!(config.shards.batch_size, 25);
        assert_eq!(config.video_cache.ttl, Duration::from_secs(10));
        assert_eq!(config.video, VideoSearchConfig::default());
    }

    #[test]
    fn test_builders() {
        let config = AppConfig::default()
            .with_shard_timeout(Duration::from_secs(5))
            .with_video_timeout(Duration::from_secs(3))
            .with_video_cache_ttl(Duration::from_secs(60));

        assert_eq!(config.shards.timeout, Duration::from_secs(5));
        assert_eq!(config.video.timeout, Duration::from_secs(3));
        assert_eq!(config.video_cache.ttl, Duration::from_secs(60));
    }
}
