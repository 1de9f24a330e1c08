//! Data backend for the area sales dashboard.
//!
//! Pulls appointment, sales, and leaderboard records from a local mirror
//! of the warehouse, joins them against per-area goal tables, and produces
//! the typed rows a rendering collaborator turns into progress cards and
//! ranked tables. The aggregation pipeline itself is pure; all I/O lives
//! in the store and dashboard modules.

pub mod areas;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod goals;
pub mod gold_standard;
mod latency;
pub mod leaderboard;
pub mod pipeline;
pub mod store;
pub mod types;

pub use dashboard::{AreaCard, Dashboard, DashboardResult, PacingResult};
pub use error::StoreError;
pub use pipeline::{aggregate, aggregate_with_pacing, month_pace, AreaPacing, AreaProgress};
pub use store::{FactSource, GoalSource, Warehouse};
pub use types::{DateRange, FactRow, GoalPolicy};

pub use latency::{record_latency, rollups, QueryRollup};
