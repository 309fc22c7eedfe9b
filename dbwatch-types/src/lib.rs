//! # dbwatch-types
//!
//! Core types for dbwatch. This crate defines the data the monitoring backend
//! serves for Redis, Kafka, MySQL and PostgreSQL, the per-category YAML
//! configuration documents, and the small set of metric derivations the
//! dashboard computes on top of raw telemetry.
//!
//! ## Example
//!
//! ```rust
//! use dbwatch_types::{MonitoringSnapshot, RedisInstanceMetrics};
//!
//! let json = r#"{"redis": [{
//!     "name": "replica-1",
//!     "role": "slave",
//!     "status": "online",
//!     "master_repl_offset": 900000000,
//!     "replica_offset": 899999500
//! }]}"#;
//!
//! let snapshot: MonitoringSnapshot = serde_json::from_str(json).unwrap();
//! let redis: &[RedisInstanceMetrics] = snapshot.as_redis().unwrap();
//!
//! assert_eq!(redis[0].replication_lag(), 500);
//! ```

mod category;
mod config;
mod kafka;
mod metrics;
mod redis;
mod snapshot;
mod sql;
mod status;

pub use category::*;
pub use config::*;
pub use kafka::*;
pub use metrics::*;
pub use redis::*;
pub use snapshot::*;
pub use sql::*;
pub use status::{Instance, InstanceStatus, StatusCounts};
