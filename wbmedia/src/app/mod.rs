//! Application bootstrap and lifecycle management.
//!
//! [`MediaApp`] builds the HTTP client, the shared caches and the
//! [`MediaService`](crate::media::MediaService), and owns the background
//! video cache eviction task.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        MediaApp                          │
//! │                                                          │
//! │  1. ReqwestClient (connection limits) ──► Prober         │
//! │  2. BasketCache, VideoCache (Arc, shared)                │
//! │  3. Video cache eviction task (stops on shutdown)        │
//! │  4. MediaService ◄── all of the above                    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use wbmedia::app::{AppConfig, MediaApp};
//!
//! let app = MediaApp::start(AppConfig::default()).await?;
//! let cancel = app.request_token();
//! let result = app.service().fetch(id, MediaRequest::all(), None, &cancel).await?;
//! app.shutdown().await;
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::MediaApp;
pub use config::AppConfig;
pub use error::AppError;
