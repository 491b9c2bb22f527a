//! CDN access layer
//!
//! This module provides the HTTP seam used for existence probing, the URL
//! templates of the photo and video CDNs, and the [`Prober`] that turns raw
//! HTTP results into [`ProbeOutcome`] values.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wbmedia::cdn::{CdnConfig, CdnUrls, HttpConfig, Prober, ReqwestClient};
//!
//! let client = Arc::new(ReqwestClient::new(&HttpConfig::default())?);
//! let prober = Prober::new(client, CdnUrls::new(CdnConfig::default()));
//! let outcome = prober.probe(&prober.urls().legacy_video_url(id)).await;
//! ```

mod http;
mod probe;
mod urls;

pub use http::{HttpClient, HttpConfig, HttpError, ReqwestClient};
pub use probe::{ProbeOutcome, Prober};
pub use urls::{CdnConfig, CdnUrls};

#[cfg(test)]
pub use http::tests::MockCdn;
