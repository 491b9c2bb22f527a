//! Video search configuration.

use std::ops::RangeInclusive;
use std::time::Duration;

use crate::coord::{ShardNumber, MAX_SHARD, MIN_SHARD};
use crate::progress::{ProgressThrottle, DEFAULT_PROGRESS_INTERVAL, DEFAULT_PROGRESS_STEP};
use crate::search::{SearchPlan, SearchZone};

/// Default volumes searched first.
pub const DEFAULT_HOT_VOLUMES: RangeInclusive<u16> = 1..=50;

/// Default volumes searched once the hot zone is exhausted.
pub const DEFAULT_EXTENDED_VOLUMES: RangeInclusive<u16> = 51..=200;

/// Default number of (shard, vol) pairs probed concurrently.
pub const DEFAULT_VIDEO_BATCH_SIZE: usize = 100;

/// Default wall-clock budget of a video search.
pub const DEFAULT_VIDEO_TIMEOUT: Duration = Duration::from_secs(30);

/// Default pause between video batches.
pub const DEFAULT_VIDEO_BATCH_DELAY: Duration = Duration::from_millis(10);

/// Default pause before the legacy probe.
pub const DEFAULT_LEGACY_DELAY: Duration = Duration::from_millis(20);

/// A (shard, vol) candidate of the HLS search.
pub type HlsCandidate = (ShardNumber, u16);

/// Tunables of the video search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSearchConfig {
    /// Highest shard probed.
    pub max_shard: u16,
    /// Volumes searched first.
    pub hot_volumes: RangeInclusive<u16>,
    /// Volumes searched after the hot zone.
    pub extended_volumes: RangeInclusive<u16>,
    /// Pairs probed concurrently per batch.
    pub batch_size: usize,
    /// Deadline of the whole search, legacy probe included.
    pub timeout: Duration,
    /// Pause between consecutive batches.
    pub batch_delay: Duration,
    /// Pause before the legacy probe.
    pub legacy_delay: Duration,
    /// Minimum time between progress updates.
    pub progress_interval: Duration,
    /// Percentage advance forcing a progress update.
    pub progress_step: u8,
}

impl Default for VideoSearchConfig {
    fn default() -> Self {
        Self {
            max_shard: MAX_SHARD,
            hot_volumes: DEFAULT_HOT_VOLUMES,
            extended_volumes: DEFAULT_EXTENDED_VOLUMES,
            batch_size: DEFAULT_VIDEO_BATCH_SIZE,
            timeout: DEFAULT_VIDEO_TIMEOUT,
            batch_delay: DEFAULT_VIDEO_BATCH_DELAY,
            legacy_delay: DEFAULT_LEGACY_DELAY,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            progress_step: DEFAULT_PROGRESS_STEP,
        }
    }
}

impl VideoSearchConfig {
    /// Progress debounce rule.
    pub fn throttle(&self) -> ProgressThrottle {
        ProgressThrottle::new(self.progress_interval, self.progress_step)
    }

    /// Builds the hot/extended plan with the given time budget.
    ///
    /// Candidates within a zone are ordered lexicographically by
    /// (shard, vol), so a batch tie resolves to the lowest pair.
    pub fn plan(&self, timeout: Duration) -> SearchPlan<HlsCandidate> {
        let zones = [
            SearchZone::new("hot", self.pairs(&self.hot_volumes)),
            SearchZone::new("extended", self.pairs(&self.extended_volumes)),
        ]
        .into_iter()
        .filter(|z| !z.is_empty())
        .collect();

        SearchPlan::new(zones, self.batch_size, self.batch_delay, timeout)
    }

    fn pairs(&self, volumes: &RangeInclusive<u16>) -> Vec<HlsCandidate> {
        let vol_start = (*volumes.start()).max(1);
        let vol_end = *volumes.end();
        ShardNumber::range(MIN_SHARD..=self.max_shard)
            .flat_map(|shard| (vol_start..=vol_end).map(move |vol| (shard, vol)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan_sizes() {
        let plan = VideoSearchConfig::default().plan(DEFAULT_VIDEO_TIMEOUT);
        let zones = plan.zones();

        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].len(), 100 * 50);
        assert_eq!(zones[1].len(), 100 * 150);
        assert_eq!(plan.total_batches(), 50 + 150);
    }

    #[test]
    fn test_pairs_are_shard_major() {
        let config = VideoSearchConfig {
            max_shard: 2,
            hot_volumes: 1..=3,
            ..Default::default()
        };
        let plan = config.plan(DEFAULT_VIDEO_TIMEOUT);
        let hot: Vec<(u16, u16)> = plan.zones()[0]
            .candidates()
            .iter()
            .map(|(s, v)| (s.get(), *v))
            .collect();
        assert_eq!(hot, vec![(1, 1), (1, 2), (1, 3), (2, 1), (2, 2), (2, 3)]);
    }

    #[test]
    fn test_throttle_uses_configured_values() {
        let config = VideoSearchConfig {
            progress_interval: Duration::from_secs(5),
            progress_step: 25,
            ..Default::default()
        };
        assert_eq!(config.throttle(), ProgressThrottle::new(Duration::from_secs(5), 25));
    }
}
