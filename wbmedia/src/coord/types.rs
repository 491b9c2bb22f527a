//! Coordinate and shard types.

use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;
use thiserror::Error;

/// Lowest shard number served by the CDN.
pub const MIN_SHARD: u16 = 1;

/// Highest shard number probed.
pub const MAX_SHARD: u16 = 100;

/// Addressing coordinates derived from an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AddressCoordinates {
    /// `vol` path segment on the photo CDN, also the basket cache key.
    pub photo_volume: u64,
    /// `part` path segment on the photo CDN.
    pub photo_part: u64,
    /// `part` path segment on the video CDN.
    pub video_part: u64,
}

/// Shard number outside the accepted range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("shard {value} outside range {min}..={max}")]
pub struct ShardRangeError {
    pub value: u16,
    pub min: u16,
    pub max: u16,
}

/// A CDN shard ("basket") number.
///
/// Displayed zero-padded to two digits, the form used in CDN host names
/// (`basket-07`, `basket-42`, `basket-100`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ShardNumber(u16);

impl ShardNumber {
    /// Create a shard number, validating it against `MIN_SHARD..=MAX_SHARD`.
    pub fn new(value: u16) -> Result<Self, ShardRangeError> {
        if (MIN_SHARD..=MAX_SHARD).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ShardRangeError {
                value,
                min: MIN_SHARD,
                max: MAX_SHARD,
            })
        }
    }

    /// The raw shard number.
    pub const fn get(self) -> u16 {
        self.0
    }

    /// All shards in `range`, clamped to the valid shard space.
    pub fn range(range: RangeInclusive<u16>) -> impl Iterator<Item = ShardNumber> {
        let start = (*range.start()).max(MIN_SHARD);
        let end = (*range.end()).min(MAX_SHARD);
        (start..=end).map(ShardNumber)
    }
}

impl fmt::Display for ShardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}
