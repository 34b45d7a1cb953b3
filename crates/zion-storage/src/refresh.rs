//! Data feed refresh: fetch the full data set and keep the cache current.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use zion_core::error::ZionError;
use zion_core::types::{ConnectionStatus, DataSnapshot, Subscription};

use crate::cache::FreshnessCache;

/// Source of the full business data set.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch a complete snapshot. `current` is the data the session holds now.
    async fn fetch(&self, current: &DataSnapshot) -> Result<DataSnapshot, ZionError>;
}

/// Built-in demo feed: eight fixed subscriptions, tasks carried over.
#[derive(Debug, Default, Clone, Copy)]
pub struct DemoDataSource;

impl DemoDataSource {
    pub fn subscriptions() -> Vec<Subscription> {
        [
            ("Netflix", "15.99"),
            ("Spotify", "9.99"),
            ("GitHub Pro", "4.00"),
            ("Adobe CC", "52.99"),
            ("Notion", "8.00"),
            ("Figma", "12.00"),
            ("ChatGPT Plus", "20.00"),
            ("Vercel Pro", "20.00"),
        ]
        .into_iter()
        .map(|(name, amount)| Subscription::new(name, amount))
        .collect()
    }
}

#[async_trait]
impl DataSource for DemoDataSource {
    async fn fetch(&self, current: &DataSnapshot) -> Result<DataSnapshot, ZionError> {
        Ok(DataSnapshot {
            subscriptions: Self::subscriptions(),
            tasks: current.tasks.clone(),
            resets: None,
        })
    }
}

/// Result of the startup sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct StartupOutcome {
    pub data: DataSnapshot,
    pub status: ConnectionStatus,
    /// Whether a fresh cached snapshot was available before the fetch.
    pub restored_from_cache: bool,
}

/// Couples a data source with the freshness cache.
pub struct DataRefresher {
    source: Arc<dyn DataSource>,
    cache: Arc<FreshnessCache>,
}

impl DataRefresher {
    pub fn new(source: Arc<dyn DataSource>, cache: Arc<FreshnessCache>) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &FreshnessCache {
        &self.cache
    }

    /// Fetch the full data set and cache it.
    pub async fn refresh(&self, current: &DataSnapshot) -> Result<DataSnapshot, ZionError> {
        let data = self.source.fetch(current).await?;
        self.cache.save(&data);
        info!(
            subscriptions = data.subscriptions.len(),
            monthly_total = %data.monthly_cost(),
            "Data refreshed"
        );
        Ok(data)
    }

    /// Startup: use the cached snapshot if fresh, then refresh from the source.
    ///
    /// A failed fetch keeps whatever the cache supplied and reports
    /// [`ConnectionStatus::Error`].
    pub async fn start(&self) -> StartupOutcome {
        let cached = self.cache.load().map(|c| c.data);
        let restored_from_cache = cached.is_some();
        let current = cached.unwrap_or_default();

        match self.refresh(&current).await {
            Ok(data) => StartupOutcome {
                data,
                status: ConnectionStatus::Connected,
                restored_from_cache,
            },
            Err(e) => {
                warn!(error = %e, "Initial data fetch failed");
                StartupOutcome {
                    data: current,
                    status: ConnectionStatus::Error,
                    restored_from_cache,
                }
            }
        }
    }
}
