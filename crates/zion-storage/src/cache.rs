//! Freshness cache for the business-data snapshot.
//!
//! The snapshot lives in one persisted slot together with its capture time.
//! It is served only while younger than the TTL; stale, missing and corrupt
//! slots all read as absent.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, warn};

use zion_core::clock::{Clock, SystemClock};
use zion_core::config::CacheConfig;
use zion_core::error::ZionError;
use zion_core::money::Money;
use zion_core::types::{CachedSnapshot, DataSnapshot};

use crate::slot::SlotStore;

/// Default freshness window.
pub const DEFAULT_TTL_SECS: i64 = 5 * 60;

/// Failures inside the cache. Never surfaced past `load`/`save`.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache read failed: {0}")]
    Read(ZionError),
    #[error("cache slot is corrupt: {0}")]
    Corrupt(serde_json::Error),
    #[error("cache write failed: {0}")]
    Write(ZionError),
    #[error("cache encode failed: {0}")]
    Encode(serde_json::Error),
}

/// Snapshot cache over a persisted slot.
pub struct FreshnessCache {
    store: Arc<dyn SlotStore>,
    key: String,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for FreshnessCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreshnessCache")
            .field("key", &self.key)
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish()
    }
}

impl FreshnessCache {
    pub fn new(store: Arc<dyn SlotStore>, key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            key: key.into(),
            ttl,
            clock: Arc::new(SystemClock),
        }
    }

    /// Build a cache from the `[cache]` config section.
    pub fn from_config(store: Arc<dyn SlotStore>, config: &CacheConfig) -> Self {
        let ttl = i64::try_from(config.ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(|| Duration::seconds(DEFAULT_TTL_SECS));
        Self::new(store, config.slot_key.clone(), ttl)
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached snapshot, if present, readable and younger than the TTL.
    pub fn load(&self) -> Option<CachedSnapshot> {
        match self.try_load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to load cached snapshot");
                None
            }
        }
    }

    /// Like [`load`](Self::load) but reports why nothing was returned.
    ///
    /// `Ok(None)` means never written or stale.
    pub fn try_load(&self) -> Result<Option<CachedSnapshot>, CacheError> {
        let Some(raw) = self.store.read(&self.key).map_err(CacheError::Read)? else {
            debug!(key = %self.key, "Cache slot empty");
            return Ok(None);
        };
        let cached: CachedSnapshot = serde_json::from_str(&raw).map_err(CacheError::Corrupt)?;

        let age = self.clock.now() - cached.captured_at;
        if age >= self.ttl {
            debug!(
                key = %self.key,
                age_secs = age.num_seconds(),
                "Cached snapshot is stale"
            );
            return Ok(None);
        }
        Ok(Some(cached))
    }

    /// Stamp `snapshot` with the current time and persist it.
    ///
    /// Failures are logged and swallowed.
    pub fn save(&self, snapshot: &DataSnapshot) {
        if let Err(e) = self.try_save(snapshot) {
            warn!(key = %self.key, error = %e, "Failed to save snapshot to cache");
        }
    }

    /// Like [`save`](Self::save) but returns the failure.
    pub fn try_save(&self, snapshot: &DataSnapshot) -> Result<CachedSnapshot, CacheError> {
        let cached = CachedSnapshot {
            data: snapshot.clone(),
            captured_at: self.clock.now(),
        };
        let raw = serde_json::to_string(&cached).map_err(CacheError::Encode)?;
        self.store.write(&self.key, &raw).map_err(CacheError::Write)?;
        debug!(
            key = %self.key,
            subscriptions = snapshot.subscriptions.len(),
            tasks = snapshot.tasks.len(),
            "Snapshot cached"
        );
        Ok(cached)
    }
}

/// Total monthly cost of all subscriptions in `snapshot`.
///
/// Unparsable amounts count as zero; the result is exact to the cent.
pub fn aggregate_monthly_cost(snapshot: &DataSnapshot) -> Money {
    snapshot.monthly_cost()
}

// =============================================================================
// Tests
// =============================================================================
