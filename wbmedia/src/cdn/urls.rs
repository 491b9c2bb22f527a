//! CDN URL templates.
//!
//! # URL Shapes
//!
//! - Photo: `https://basket-{shard:02}.{photo_host}/vol{vol}/part{part}/{id}/images/big/{n}.webp`
//! - HLS video: `https://videonme-basket-{shard:02}.{video_host}/vol{vol}/part{part}/{id}/hls/{quality}/index.m3u8`
//! - Legacy video: `{legacy_video_base}/{id}/{id}.mp4`
//!
//! The photo `vol`/`part` come from [`AddressCoordinates`]; the HLS `vol` is
//! searched independently and only its `part` is derived.

use crate::article::ProductId;
use crate::coord::{AddressCoordinates, ShardNumber};

/// Default host suffix for both photo and video shards.
pub const DEFAULT_CDN_HOST: &str = "wbbasket.ru";

/// Default base of the legacy single-file video host.
pub const DEFAULT_LEGACY_VIDEO_BASE: &str = "https://video.wildberries.ru";

/// Default HLS rendition probed for video existence.
pub const DEFAULT_HLS_QUALITY: &str = "1440p";

/// CDN host configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdnConfig {
    /// URL scheme for shard hosts (`https` in production).
    pub scheme: String,
    /// Host suffix of photo shards (`basket-NN.<photo_host>`).
    pub photo_host: String,
    /// Host suffix of video shards (`videonme-basket-NN.<video_host>`).
    pub video_host: String,
    /// Scheme and host of the legacy video server.
    pub legacy_video_base: String,
    /// HLS rendition directory name.
    pub hls_quality: String,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            photo_host: DEFAULT_CDN_HOST.to_string(),
            video_host: DEFAULT_CDN_HOST.to_string(),
            legacy_video_base: DEFAULT_LEGACY_VIDEO_BASE.to_string(),
            hls_quality: DEFAULT_HLS_QUALITY.to_string(),
        }
    }
}

/// Builds CDN URLs from coordinates.
#[derive(Debug, Clone)]
pub struct CdnUrls {
    config: CdnConfig,
}

impl CdnUrls {
    /// Creates a URL builder for the given hosts.
    pub fn new(config: CdnConfig) -> Self {
        Self { config }
    }

    /// URL of photo `index` (1-based) on the given shard.
    pub fn photo_url(
        &self,
        id: ProductId,
        coords: &AddressCoordinates,
        shard: ShardNumber,
        index: u32,
    ) -> String {
        format!(
            "{}://basket-{}.{}/vol{}/part{}/{}/images/big/{}.webp",
            self.config.scheme,
            shard,
            self.config.photo_host,
            coords.photo_volume,
            coords.photo_part,
            id,
            index
        )
    }

    /// URL of the HLS playlist for a (shard, vol) candidate.
    pub fn hls_url(
        &self,
        id: ProductId,
        coords: &AddressCoordinates,
        shard: ShardNumber,
        vol: u16,
    ) -> String {
        format!(
            "{}://videonme-basket-{}.{}/vol{}/part{}/{}/hls/{}/index.m3u8",
            self.config.scheme,
            shard,
            self.config.video_host,
            vol,
            coords.video_part,
            id,
            self.config.hls_quality
        )
    }

    /// URL of the legacy direct video file.
    pub fn legacy_video_url(&self, id: ProductId) -> String {
        format!(
            "{}/{}/{}.mp4",
            self.config.legacy_video_base.trim_end_matches('/'),
            id,
            id
        )
    }
}

impl Default for CdnUrls {
    fn default() -> Self {
        Self::new(CdnConfig::default())
    }
}
