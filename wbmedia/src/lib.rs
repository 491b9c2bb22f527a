//! WbMedia - CDN media discovery for marketplace articles
//!
//! This library resolves a marketplace article number to the photo and video
//! assets hosted on a sharded CDN whose shard layout is not published. The
//! hosting shard is discovered by probing, photos are enumerated by
//! sequential existence checks, and videos are located through a zoned
//! (shard, volume) search.
//!
//! # Architecture
//!
//! ```text
//! ProductId ──► coord (volume / part derivation)
//!                  │
//!      ┌───────────┴─────────────┐
//!      ▼                         ▼
//! ShardResolver ◄─ BasketCache   VideoCache ─► VideoLocator
//!      │                                          │
//!      ▼                                          │
//! PhotoEnumerator                                 │
//!      └──────────────► MediaService ◄────────────┘
//!                           │
//!                           ▼
//!                     MediaResolution
//! ```
//!
//! All network access goes through the [`cdn::HttpClient`] trait so that
//! every component can be exercised against a mock CDN.

pub mod app;
pub mod article;
pub mod cache;
pub mod cdn;
pub mod config;
pub mod coord;
pub mod error;
pub mod logging;
pub mod media;
pub mod photos;
pub mod progress;
pub mod resolver;
pub mod search;
pub mod video;

pub use article::{extract_article, ArticleError, ProductId};
pub use error::MediaError;
pub use media::{MediaRequest, MediaResolution, MediaService, ProductMedia};
