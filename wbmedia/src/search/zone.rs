//! Search zones and plans.

use std::time::Duration;

/// A named, ordered set of candidates searched as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchZone<T> {
    name: String,
    candidates: Vec<T>,
}

impl<T> SearchZone<T> {
    /// Creates a zone from an ordered candidate list.
    pub fn new(name: impl Into<String>, candidates: Vec<T>) -> Self {
        Self {
            name: name.into(),
            candidates,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn candidates(&self) -> &[T] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Zones plus the batching and timing parameters of a search.
#[derive(Debug, Clone)]
pub struct SearchPlan<T> {
    zones: Vec<SearchZone<T>>,
    batch_size: usize,
    batch_delay: Duration,
    timeout: Duration,
}

impl<T> SearchPlan<T> {
    /// Creates a plan. A batch size of zero is treated as one.
    pub fn new(
        zones: Vec<SearchZone<T>>,
        batch_size: usize,
        batch_delay: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            zones,
            batch_size: batch_size.max(1),
            batch_delay,
            timeout,
        }
    }

    pub fn zones(&self) -> &[SearchZone<T>] {
        &self.zones
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn batch_delay(&self) -> Duration {
        self.batch_delay
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Total candidates across all zones.
    pub fn candidate_count(&self) -> usize {
        self.zones.iter().map(SearchZone::len).sum()
    }

    /// Number of batches needed to exhaust every zone.
    ///
    /// Zones are batched independently, so a short tail batch per zone is
    /// counted separately.
    pub fn total_batches(&self) -> usize {
        self.zones
            .iter()
            .map(|z| z.len().div_ceil(self.batch_size))
            .sum()
    }
}
