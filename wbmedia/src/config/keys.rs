//! Configuration keys.

use std::fmt;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::{ConfigError, ConfigFile};

/// Every configurable setting, addressed as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    CdnScheme,
    CdnPhotoHost,
    CdnVideoHost,
    CdnLegacyVideoBase,
    CdnHlsQuality,

    ShardsMaxShard,
    ShardsHotZone,
    ShardsBatchSize,
    ShardsTimeoutSecs,
    ShardsBatchDelayMs,

    PhotosMaxPhotos,
    PhotosPacingMs,

    VideoMaxShard,
    VideoHotVolumes,
    VideoExtendedVolumes,
    VideoBatchSize,
    VideoTimeoutSecs,
    VideoBatchDelayMs,
    VideoLegacyDelayMs,
    VideoProgressIntervalMs,
    VideoProgressStep,

    CacheVideoTtlSecs,
    CacheEvictionIntervalSecs,

    HttpRequestTimeoutSecs,
    HttpConnectTimeoutSecs,
    HttpMaxConnections,
    HttpMaxConnectionsPerHost,

    LoggingLevel,
    LoggingFileDir,
}

const ALL_KEYS: [ConfigKey; 29] = [
    ConfigKey::CdnScheme,
    ConfigKey::CdnPhotoHost,
    ConfigKey::CdnVideoHost,
    ConfigKey::CdnLegacyVideoBase,
    ConfigKey::CdnHlsQuality,
    ConfigKey::ShardsMaxShard,
    ConfigKey::ShardsHotZone,
    ConfigKey::ShardsBatchSize,
    ConfigKey::ShardsTimeoutSecs,
    ConfigKey::ShardsBatchDelayMs,
    ConfigKey::PhotosMaxPhotos,
    ConfigKey::PhotosPacingMs,
    ConfigKey::VideoMaxShard,
    ConfigKey::VideoHotVolumes,
    ConfigKey::VideoExtendedVolumes,
    ConfigKey::VideoBatchSize,
    ConfigKey::VideoTimeoutSecs,
    ConfigKey::VideoBatchDelayMs,
    ConfigKey::VideoLegacyDelayMs,
    ConfigKey::VideoProgressIntervalMs,
    ConfigKey::VideoProgressStep,
    ConfigKey::CacheVideoTtlSecs,
    ConfigKey::CacheEvictionIntervalSecs,
    ConfigKey::HttpRequestTimeoutSecs,
    ConfigKey::HttpConnectTimeoutSecs,
    ConfigKey::HttpMaxConnections,
    ConfigKey::HttpMaxConnectionsPerHost,
    ConfigKey::LoggingLevel,
    ConfigKey::LoggingFileDir,
];

impl ConfigKey {
    /// All keys in file order.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// INI section of the key.
    pub fn section(self) -> &'static str {
        use ConfigKey::*;
        match self {
            CdnScheme | CdnPhotoHost | CdnVideoHost | CdnLegacyVideoBase | CdnHlsQuality => "cdn",
            ShardsMaxShard | ShardsHotZone | ShardsBatchSize | ShardsTimeoutSecs
            | ShardsBatchDelayMs => "shards",
            PhotosMaxPhotos | PhotosPacingMs => "photos",
            VideoMaxShard | VideoHotVolumes | VideoExtendedVolumes | VideoBatchSize
            | VideoTimeoutSecs | VideoBatchDelayMs | VideoLegacyDelayMs
            | VideoProgressIntervalMs | VideoProgressStep => "video",
            CacheVideoTtlSecs | CacheEvictionIntervalSecs => "cache",
            HttpRequestTimeoutSecs | HttpConnectTimeoutSecs | HttpMaxConnections
            | HttpMaxConnectionsPerHost => "http",
            LoggingLevel | LoggingFileDir => "logging",
        }
    }

    /// Key name within its section.
    pub fn key_name(self) -> &'static str {
        use ConfigKey::*;
        match self {
            CdnScheme => "scheme",
            CdnPhotoHost => "photo_host",
            CdnVideoHost => "video_host",
            CdnLegacyVideoBase => "legacy_video_base",
            CdnHlsQuality => "hls_quality",
            ShardsMaxShard | VideoMaxShard => "max_shard",
            ShardsHotZone => "hot_zone",
            ShardsBatchSize | VideoBatchSize => "batch_size",
            ShardsTimeoutSecs | VideoTimeoutSecs => "timeout_secs",
            ShardsBatchDelayMs | VideoBatchDelayMs => "batch_delay_ms",
            PhotosMaxPhotos => "max_photos",
            PhotosPacingMs => "pacing_ms",
            VideoHotVolumes => "hot_volumes",
            VideoExtendedVolumes => "extended_volumes",
            VideoLegacyDelayMs => "legacy_delay_ms",
            VideoProgressIntervalMs => "progress_interval_ms",
            VideoProgressStep => "progress_step",
            CacheVideoTtlSecs => "video_ttl_secs",
            CacheEvictionIntervalSecs => "eviction_interval_secs",
            HttpRequestTimeoutSecs => "request_timeout_secs",
            HttpConnectTimeoutSecs => "connect_timeout_secs",
            HttpMaxConnections => "max_connections",
            HttpMaxConnectionsPerHost => "max_connections_per_host",
            LoggingLevel => "level",
            LoggingFileDir => "file_dir",
        }
    }

    /// Dotted name, e.g. `shards.hot_zone`.
    pub fn name(self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value rendered as it appears in the file.
    pub fn get(self, config: &ConfigFile) -> String {
        use ConfigKey::*;
        match self {
            CdnScheme => config.cdn.scheme.clone(),
            CdnPhotoHost => config.cdn.photo_host.clone(),
            CdnVideoHost => config.cdn.video_host.clone(),
            CdnLegacyVideoBase => config.cdn.legacy_video_base.clone(),
            CdnHlsQuality => config.cdn.hls_quality.clone(),

            ShardsMaxShard => config.shards.max_shard.to_string(),
            ShardsHotZone => format_range(&config.shards.hot_zone),
            ShardsBatchSize => config.shards.batch_size.to_string(),
            ShardsTimeoutSecs => config.shards.timeout.as_secs().to_string(),
            ShardsBatchDelayMs => millis(config.shards.batch_delay),

            PhotosMaxPhotos => config.photos.max_photos.to_string(),
            PhotosPacingMs => millis(config.photos.pacing),

            VideoMaxShard => config.video.max_shard.to_string(),
            VideoHotVolumes => format_range(&config.video.hot_volumes),
            VideoExtendedVolumes => format_range(&config.video.extended_volumes),
            VideoBatchSize => config.video.batch_size.to_string(),
            VideoTimeoutSecs => config.video.timeout.as_secs().to_string(),
            VideoBatchDelayMs => millis(config.video.batch_delay),
            VideoLegacyDelayMs => millis(config.video.legacy_delay),
            VideoProgressIntervalMs => millis(config.video.progress_interval),
            VideoProgressStep => config.video.progress_step.to_string(),

            CacheVideoTtlSecs => config.cache.ttl.as_secs().to_string(),
            CacheEvictionIntervalSecs => config.cache.eviction_interval.as_secs().to_string(),

            HttpRequestTimeoutSecs => config.http.request_timeout.as_secs().to_string(),
            HttpConnectTimeoutSecs => config.http.connect_timeout.as_secs().to_string(),
            HttpMaxConnections => config.http.max_connections.to_string(),
            HttpMaxConnectionsPerHost => config.http.max_connections_per_host.to_string(),

            LoggingLevel => config.logging.level.clone(),
            LoggingFileDir => config
                .logging
                .file_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Parses `value` and stores it in `config`.
    pub fn set(self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        use ConfigKey::*;
        let value = value.trim();
        match self {
            CdnScheme => config.cdn.scheme = self.text(value)?,
            CdnPhotoHost => config.cdn.photo_host = self.text(value)?,
            CdnVideoHost => config.cdn.video_host = self.text(value)?,
            CdnLegacyVideoBase => config.cdn.legacy_video_base = self.text(value)?,
            CdnHlsQuality => config.cdn.hls_quality = self.text(value)?,

            ShardsMaxShard => config.shards.max_shard = self.number(value)?,
            ShardsHotZone => config.shards.hot_zone = self.range(value)?,
            ShardsBatchSize => config.shards.batch_size = self.positive(value)?,
            ShardsTimeoutSecs => config.shards.timeout = Duration::from_secs(self.number(value)?),
            ShardsBatchDelayMs => {
                config.shards.batch_delay = Duration::from_millis(self.number(value)?)
            }

            PhotosMaxPhotos => config.photos.max_photos = self.number(value)?,
            PhotosPacingMs => config.photos.pacing = Duration::from_millis(self.number(value)?),

            VideoMaxShard => config.video.max_shard = self.number(value)?,
            VideoHotVolumes => config.video.hot_volumes = self.range(value)?,
            VideoExtendedVolumes => config.video.extended_volumes = self.range(value)?,
            VideoBatchSize => config.video.batch_size = self.positive(value)?,
            VideoTimeoutSecs => config.video.timeout = Duration::from_secs(self.number(value)?),
            VideoBatchDelayMs => {
                config.video.batch_delay = Duration::from_millis(self.number(value)?)
            }
            VideoLegacyDelayMs => {
                config.video.legacy_delay = Duration::from_millis(self.number(value)?)
            }
            VideoProgressIntervalMs => {
                config.video.progress_interval = Duration::from_millis(self.number(value)?)
            }
            VideoProgressStep => config.video.progress_step = self.number(value)?,

            CacheVideoTtlSecs => config.cache.ttl = Duration::from_secs(self.number(value)?),
            CacheEvictionIntervalSecs => {
                config.cache.eviction_interval = Duration::from_secs(self.positive(value)?)
            }

            HttpRequestTimeoutSecs => {
                config.http.request_timeout = Duration::from_secs(self.positive(value)?)
            }
            HttpConnectTimeoutSecs => {
                config.http.connect_timeout = Duration::from_secs(self.positive(value)?)
            }
            HttpMaxConnections => config.http.max_connections = self.positive(value)?,
            HttpMaxConnectionsPerHost => {
                config.http.max_connections_per_host = self.positive(value)?
            }

            LoggingLevel => config.logging.level = self.text(value)?,
            LoggingFileDir => {
                config.logging.file_dir = (!value.is_empty()).then(|| PathBuf::from(value))
            }
        }
        Ok(())
    }

    fn invalid(self, value: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            section: self.section(),
            key: self.key_name(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    fn text(self, value: &str) -> Result<String, ConfigError> {
        if value.is_empty() {
            return Err(self.invalid(value, "must not be empty"));
        }
        Ok(value.to_string())
    }

    fn number<T>(self, value: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        value
            .parse()
            .map_err(|e: T::Err| self.invalid(value, e.to_string()))
    }

    fn positive<T>(self, value: &str) -> Result<T, ConfigError>
    where
        T: FromStr + PartialOrd + Default,
        T::Err: fmt::Display,
    {
        let n: T = self.number(value)?;
        if n <= T::default() {
            return Err(self.invalid(value, "must be greater than zero"));
        }
        Ok(n)
    }

    fn range(self, value: &str) -> Result<RangeInclusive<u16>, ConfigError> {
        let (start, end) = value
            .split_once('-')
            .ok_or_else(|| self.invalid(value, "expected START-END"))?;
        let start: u16 = self.number(start.trim())?;
        let end: u16 = self.number(end.trim())?;
        if start > end {
            return Err(self.invalid(value, "start exceeds end"));
        }
        Ok(start..=end)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (section, key) = s
            .split_once('.')
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))?;
        ConfigKey::all()
            .iter()
            .copied()
            .find(|k| k.section() == section && k.key_name() == key)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

fn format_range(range: &RangeInclusive<u16>) -> String {
    format!("{}-{}", range.start(), range.end())
}

fn millis(d: Duration) -> String {
    d.as_millis().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique_and_parse_back() {
        let mut seen = HashSet::new();
        for key in ConfigKey::all() {
            let name = key.name();
            assert!(seen.insert(name.clone()), "duplicate key {}", name);
            assert_eq!(name.parse::<ConfigKey>().unwrap(), *key);
        }
    }

    #[test]
    fn test_unknown_key() {
        assert!(matches!(
            "shards.nope".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!("nodot".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn test_get_set_every_key_with_its_own_default() {
        let mut config = ConfigFile::default();
        for key in ConfigKey::all() {
            let value = key.get(&config);
            key.set(&mut config, &value).unwrap();
        }
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_range_values() {
        let mut config = ConfigFile::default();
        ConfigKey::VideoHotVolumes.set(&mut config, "1 - 10").unwrap();
        assert_eq!(config.video.hot_volumes, 1..=10);
        assert!(ConfigKey::VideoHotVolumes.set(&mut config, "10-1").is_err());
        assert!(ConfigKey::VideoHotVolumes.set(&mut config, "10").is_err());
    }

    #[test]
    fn test_zero_rejected_where_positive_required() {
        let mut config = ConfigFile::default();
        let err = ConfigKey::HttpMaxConnections.set(&mut config, "0").unwrap_err();
        assert!(err.to_string().contains("[http] max_connections"));
    }

    #[test]
    fn test_empty_file_dir_clears_it() {
        let mut config = ConfigFile::default();
        ConfigKey::LoggingFileDir.set(&mut config, "/var/log/wbmedia").unwrap();
        assert_eq!(config.logging.file_dir, Some(PathBuf::from("/var/log/wbmedia")));
        ConfigKey::LoggingFileDir.set(&mut config, "").unwrap();
        assert_eq!(config.logging.file_dir, None);
    }
}
