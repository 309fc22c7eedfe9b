//! # dbwatch
//!
//! A terminal dashboard and library for watching Redis, Kafka, MySQL and
//! PostgreSQL through a monitoring backend's HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐  │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal │  │
//! │  │ (state) │    │ (derive) │    │ (render)│    │          │  │
//! │  └────┬────┘    └──────────┘    └─────────┘    └──────────┘  │
//! │       │ start / stop / switch       ▲ watch::Receiver        │
//! │       ▼                             │                        │
//! │  ┌───────────┐  fetch(category)  ┌──┴──────────────────┐     │
//! │  │ scheduler │──────────────────▶│ dbwatch-client      │     │
//! │  │ (timer)   │◀──── snapshot ────│ (HTTP, envelope)    │     │
//! │  └───────────┘                   └─────────────────────┘     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`scheduler`]**: one polling session at a time, with stale results
//!   discarded before they reach the display
//! - **[`data`]**: turns a [`MonitoringSnapshot`](dbwatch_types::MonitoringSnapshot)
//!   into health-annotated table rows, keeps sparkline history and formats
//!   values
//! - **[`app`]**: dashboard state and navigation
//! - **[`ui`]**: ratatui rendering
//! - **[`commands`]**: one-shot `fetch`, `health` and `config` subcommands
//! - **[`settings`]** and **[`logging`]**: layered configuration and tracing
//!
//! ## Usage
//!
//! ```bash
//! # Dashboard, polling Redis straight away
//! dbwatch --base-url http://localhost:8085 --category redis --start
//!
//! # One snapshot as JSON
//! dbwatch fetch kafka --pretty
//!
//! # Round-trip backend configuration through a directory
//! dbwatch config pull --dir ./config
//! dbwatch config push --dir ./config
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use dbwatch::{App, Intervals, RefreshScheduler, Thresholds};
//! use dbwatch_client::{ApiClient, MonitoringService};
//! use dbwatch_types::Category;
//!
//! # tokio_test::block_on(async {
//! let client = ApiClient::builder()
//!     .base_url("http://localhost:8085")
//!     .timeout(Duration::from_secs(5))
//!     .build()
//!     .unwrap();
//! let fetcher = Arc::new(MonitoringService::new(client));
//! let scheduler = RefreshScheduler::new(fetcher, tokio::runtime::Handle::current());
//!
//! let mut app = App::new(scheduler, Category::Redis, Intervals::default(), Thresholds::default());
//! app.toggle_monitoring();
//! # });
//! ```

pub mod app;
pub mod commands;
pub mod data;
pub mod events;
pub mod logging;
pub mod scheduler;
pub mod settings;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, Intervals};
pub use data::{HealthStatus, InstanceRow, MonitorData, Thresholds};
pub use scheduler::{DisplayState, PollingSession, RefreshScheduler, SnapshotFetcher, TimerStats};
pub use settings::Settings;
