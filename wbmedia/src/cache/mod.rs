//! Process-local caches.
//!
//! Two caches amortise repeated lookups:
//!
//! - [`BasketCache`]: photo volume → hosting shard. No TTL; a stale entry is
//!   detected by re-probing and overwritten by the resolver.
//! - [`VideoCache`]: article → video URL or an explicit "no video" marker,
//!   expiring lazily after a TTL.
//!
//! Both are explicitly constructed and shared through `Arc`, never global.
//! They are backed by `DashMap`, so operations on different keys do not
//! contend. Concurrent writes to the same key are last-writer-wins.

mod basket;
mod clock;
mod video;

pub use basket::BasketCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use video::{spawn_eviction_task, VideoCache, VideoCacheConfig, VideoCacheLookup};
