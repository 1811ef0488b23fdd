//! Read-only record snapshot for the estimator
//!
//! Loaded once at startup. Readers take an `Arc` clone and compute without
//! holding the lock; a refresh swaps in a new snapshot wholesale.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sqlx::PgPool;

use crate::estimator::{self, Estimate, QueryFeatures};
use crate::models::StopRecord;

#[derive(Debug)]
pub struct Snapshot {
    records: Vec<StopRecord>,
    loaded_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(records: Vec<StopRecord>) -> Self {
        Self { records, loaded_at: Utc::now() }
    }

    pub async fn load(pool: &PgPool) -> Result<Self, sqlx::Error> {
        let records = StopRecord::load_all(pool).await?;
        Ok(Self::new(records))
    }

    pub fn records(&self) -> &[StopRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn estimate(&self, features: &QueryFeatures) -> Estimate {
        estimator::estimate(&self.records, features)
    }

    /// Distinct stop durations in first-seen order
    pub fn stop_durations(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for duration in self.records.iter().filter_map(|r| r.stop_duration.as_deref()) {
            if !seen.iter().any(|d| d == duration) {
                seen.push(duration.to_string());
            }
        }
        seen
    }
}

/// Shared handle to the current snapshot
#[derive(Debug, Clone)]
pub struct SnapshotHandle {
    inner: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotHandle {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { inner: Arc::new(RwLock::new(Arc::new(snapshot))) }
    }

    pub fn current(&self) -> Arc<Snapshot> {
        self.inner.read().clone()
    }

    pub fn replace(&self, snapshot: Snapshot) {
        *self.inner.write() = Arc::new(snapshot);
    }
}
