//! Zion storage crate - SQLite-backed slots, freshness cache, data refresh.
//!
//! The business-data snapshot is persisted as one JSON record in a
//! key-value slot and served only while fresh.

pub mod cache;
pub mod db;
pub mod migrations;
pub mod refresh;
pub mod slot;

pub use cache::{aggregate_monthly_cost, CacheError, FreshnessCache};
pub use db::Database;
pub use refresh::{DataRefresher, DataSource, DemoDataSource, StartupOutcome};
pub use slot::{MemorySlotStore, SlotStore, SqliteSlotStore};
