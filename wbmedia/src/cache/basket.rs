//! Volume to shard cache.

use dashmap::DashMap;

use crate::coord::ShardNumber;

/// Maps a photo volume to the shard last seen hosting it.
///
/// Growth is bounded by the number of distinct volumes seen, so no eviction
/// is performed.
#[derive(Debug, Default)]
pub struct BasketCache {
    entries: DashMap<u64, ShardNumber>,
}

impl BasketCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached shard for `volume`, if any.
    pub fn get(&self, volume: u64) -> Option<ShardNumber> {
        self.entries.get(&volume).map(|entry| *entry)
    }

    /// Record `shard` as hosting `volume`, replacing any previous entry.
    pub fn insert(&self, volume: u64, shard: ShardNumber) {
        self.entries.insert(volume, shard);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn shard(n: u16) -> ShardNumber {
        ShardNumber::new(n).unwrap()
    }

    #[test]
    fn test_insert_get_overwrite() {
        let cache = BasketCache::new();
        assert_eq!(cache.get(123), None);

        cache.insert(123, shard(10));
        assert_eq!(cache.get(123), Some(shard(10)));

        cache.insert(123, shard(15));
        assert_eq!(cache.get(123), Some(shard(15)));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_writers_on_distinct_volumes() {
        let cache = Arc::new(BasketCache::new());
        let mut handles = Vec::new();

        for volume in 0..100u64 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                let n = (volume % 100 + 1) as u16;
                cache.insert(volume, shard(n));
                assert_eq!(cache.get(volume), Some(shard(n)));
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(cache.len(), 100);
    }
}
