//! Display models derived from monitoring snapshots.
//!
//! ## Submodules
//!
//! - [`format`]: Human-readable sizes, counts, rates and uptimes
//! - [`history`]: Per-instance samples for sparklines
//! - [`monitor`]: Table rows and health ([`MonitorData`], [`InstanceRow`], [`HealthStatus`])
//!
//! ## Data Flow
//!
//! ```text
//! MonitoringSnapshot (from the scheduler)
//!        │
//!        ▼
//! MonitorData::from_snapshot()
//!        │
//!        ├──▶ InstanceRow (health escalated by Thresholds)
//!        │
//!        └──▶ History::record() (for sparklines)
//! ```

pub mod format;
pub mod history;
pub mod monitor;

pub use history::History;
pub use monitor::{
    child_columns, columns, snapshot_report, HealthStatus, InstanceRow, MonitorData, Thresholds,
};
