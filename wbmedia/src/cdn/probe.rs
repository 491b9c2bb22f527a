//! Existence probing.
//!
//! A probe is a single HEAD request whose result is folded into a
//! [`ProbeOutcome`]. Per-probe failures never propagate as errors; they are
//! reported as [`ProbeOutcome::TransientError`] and aggregated by the caller.

use std::sync::Arc;

use tracing::trace;

use super::http::HttpClient;
use super::urls::CdnUrls;
use crate::article::ProductId;
use crate::coord::{AddressCoordinates, ShardNumber};

/// Result of a single existence probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The resource answered 200.
    Exists,
    /// The CDN answered with any other status.
    Absent,
    /// No HTTP response was received (timeout, DNS, connection reset).
    TransientError,
}

impl ProbeOutcome {
    /// Whether the resource was confirmed present.
    pub fn exists(self) -> bool {
        matches!(self, ProbeOutcome::Exists)
    }

    /// Whether the CDN produced an HTTP response.
    pub fn responded(self) -> bool {
        !matches!(self, ProbeOutcome::TransientError)
    }
}

/// Issues existence probes against the CDN.
pub struct Prober<C: HttpClient> {
    client: Arc<C>,
    urls: CdnUrls,
}

impl<C: HttpClient> Clone for Prober<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            urls: self.urls.clone(),
        }
    }
}

impl<C: HttpClient> Prober<C> {
    /// Creates a prober using the given client and URL templates.
    pub fn new(client: Arc<C>, urls: CdnUrls) -> Self {
        Self { client, urls }
    }

    /// URL templates used by this prober.
    pub fn urls(&self) -> &CdnUrls {
        &self.urls
    }

    /// Probes an arbitrary URL.
    pub async fn probe(&self, url: &str) -> ProbeOutcome {
        match self.client.head(url).await {
            Ok(200) => ProbeOutcome::Exists,
            Ok(status) => {
                trace!(url, status, "Probe absent");
                ProbeOutcome::Absent
            }
            Err(e) => {
                trace!(url, error = %e, "Probe failed");
                ProbeOutcome::TransientError
            }
        }
    }

    /// Checks whether `shard` hosts the article's photos.
    ///
    /// The first photo is used as the witness: a product hosted on a shard
    /// always has `1.webp` there.
    pub async fn probe_shard_for_photo(
        &self,
        id: ProductId,
        coords: &AddressCoordinates,
        shard: ShardNumber,
    ) -> ProbeOutcome {
        let url = self.urls.photo_url(id, coords, shard, 1);
        self.probe(&url).await
    }

    /// Checks whether the HLS playlist exists for a (shard, vol) candidate.
    pub async fn probe_hls(
        &self,
        id: ProductId,
        coords: &AddressCoordinates,
        shard: ShardNumber,
        vol: u16,
    ) -> ProbeOutcome {
        let url = self.urls.hls_url(id, coords, shard, vol);
        self.probe(&url).await
    }
}
