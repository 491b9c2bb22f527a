//! Coordinate derivation module
//!
//! Derives the CDN addressing coordinates ("volume" and "part") from an
//! article number. The photo and video CDNs use different divisors, so both
//! schemes are computed together.

mod types;

pub use types::{AddressCoordinates, ShardNumber, ShardRangeError, MAX_SHARD, MIN_SHARD};

use crate::article::ProductId;

/// Divisor producing the photo volume (`vol` path segment).
pub const PHOTO_VOLUME_DIVISOR: u64 = 100_000;

/// Divisor producing the photo part (`part` path segment).
pub const PHOTO_PART_DIVISOR: u64 = 1_000;

/// Divisor producing the video part (`part` path segment on the video CDN).
pub const VIDEO_PART_DIVISOR: u64 = 10_000;

/// Derives the addressing coordinates for an article.
///
/// Pure and total: every identifier yields coordinates. Integer (floor)
/// division is used throughout; floating point would misplace identifiers
/// near divisor boundaries.
///
/// # Arguments
///
/// * `id` - The article number
///
/// # Returns
///
/// The photo volume, photo part and video part for the article.
#[inline]
pub fn derive_coordinates(id: ProductId) -> AddressCoordinates {
    let raw = id.get();
    AddressCoordinates {
        photo_volume: raw / PHOTO_VOLUME_DIVISOR,
        photo_part: raw / PHOTO_PART_DIVISOR,
        video_part: raw / VIDEO_PART_DIVISOR,
    }
}
