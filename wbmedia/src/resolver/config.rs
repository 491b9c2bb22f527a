//! Shard search configuration.

use std::ops::RangeInclusive;
use std::time::Duration;

use crate::coord::{ShardNumber, MAX_SHARD, MIN_SHARD};
use crate::search::{SearchPlan, SearchZone};

/// Default shards probed first.
pub const DEFAULT_SHARD_HOT_ZONE: RangeInclusive<u16> = 20..=30;

/// Default number of shards probed concurrently.
pub const DEFAULT_SHARD_BATCH_SIZE: usize = 50;

/// Default wall-clock budget of a full shard search.
pub const DEFAULT_SHARD_TIMEOUT: Duration = Duration::from_secs(90);

/// Default pause between shard batches.
pub const DEFAULT_SHARD_BATCH_DELAY: Duration = Duration::from_millis(50);

/// Tunables of the shard search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSearchConfig {
    /// Highest shard probed (the lowest is always 1).
    pub max_shard: u16,
    /// Shards probed before the remainder of the space.
    pub hot_zone: RangeInclusive<u16>,
    /// Shards probed concurrently per batch.
    pub batch_size: usize,
    /// Overall deadline of the full search.
    pub timeout: Duration,
    /// Pause between consecutive batches.
    pub batch_delay: Duration,
}

impl Default for ShardSearchConfig {
    fn default() -> Self {
        Self {
            max_shard: MAX_SHARD,
            hot_zone: DEFAULT_SHARD_HOT_ZONE,
            batch_size: DEFAULT_SHARD_BATCH_SIZE,
            timeout: DEFAULT_SHARD_TIMEOUT,
            batch_delay: DEFAULT_SHARD_BATCH_DELAY,
        }
    }
}

impl ShardSearchConfig {
    /// Builds the two-zone search plan: the hot zone, then every other shard
    /// in ascending order, bounded by `timeout`.
    pub fn plan(&self, timeout: Duration) -> SearchPlan<ShardNumber> {
        let max = self.max_shard.min(MAX_SHARD);
        let hot_start = (*self.hot_zone.start()).max(MIN_SHARD);
        let hot_end = (*self.hot_zone.end()).min(max);

        let hot: Vec<ShardNumber> = ShardNumber::range(hot_start..=hot_end).collect();
        let rest: Vec<ShardNumber> = ShardNumber::range(MIN_SHARD..=max)
            .filter(|s| !(hot_start..=hot_end).contains(&s.get()))
            .collect();

        let zones = [SearchZone::new("hot", hot), SearchZone::new("rest", rest)]
            .into_iter()
            .filter(|z| !z.is_empty())
            .collect();

        SearchPlan::new(zones, self.batch_size, self.batch_delay, timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(zone: &SearchZone<ShardNumber>) -> Vec<u16> {
        zone.candidates().iter().map(|s| s.get()).collect()
    }

    #[test]
    fn test_default_plan_covers_every_shard_once() {
        let config = ShardSearchConfig::default();
        let plan = config.plan(config.timeout);
        let zones = plan.zones();

        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].name(), "hot");
        assert_eq!(numbers(&zones[0]), (20..=30).collect::<Vec<_>>());

        let rest = numbers(&zones[1]);
        assert_eq!(rest.len(), 89);
        assert_eq!(rest.first(), Some(&1));
        assert_eq!(rest[18], 19);
        assert_eq!(rest[19], 31);
        assert_eq!(rest.last(), Some(&100));

        assert_eq!(plan.candidate_count(), 100);
        assert_eq!(plan.total_batches(), 3);
    }

    #[test]
    fn test_empty_hot_zone_is_dropped() {
        #[allow(clippy::reversed_empty_ranges)]
        let config = ShardSearchConfig {
            hot_zone: 1..=0,
            ..Default::default()
        };
        let plan = config.plan(config.timeout);
        assert_eq!(plan.zones().len(), 1);
        assert_eq!(plan.zones()[0].name(), "rest");
        assert_eq!(plan.candidate_count(), 100);
    }

    #[test]
    fn test_max_shard_bounds_both_zones() {
        let config = ShardSearchConfig {
            max_shard: 25,
            ..Default::default()
        };
        let plan = config.plan(config.timeout);
        assert_eq!(numbers(&plan.zones()[0]), (20..=25).collect::<Vec<_>>());
        assert_eq!(numbers(&plan.zones()[1]), (1..=19).collect::<Vec<_>>());
    }
}
