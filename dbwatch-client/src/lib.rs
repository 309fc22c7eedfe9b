//! # dbwatch-client
//!
//! HTTP client for the dbwatch backend. Every JSON endpoint answers with an
//! envelope `{success, data, message, error}`; [`ApiClient`] unwraps it once
//! and the two services build on top:
//!
//! - [`MonitoringService`] fetches [`MonitoringSnapshot`]s per category
//! - [`ConfigService`] reads and writes the per-category YAML documents
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dbwatch_client::{ApiClient, MonitoringService};
//! use dbwatch_types::Category;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::builder()
//!         .base_url("http://localhost:8085")
//!         .build()?;
//!
//!     let snapshot = MonitoringService::new(client).fetch(Category::Redis).await?;
//!     println!("{} redis instances", snapshot.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod monitoring;

pub use api::{ApiClient, ApiClientBuilder, ApiResponse, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use config::ConfigService;
pub use error::{ApiResult, ClientError, RequestError};
pub use monitoring::{BackendHealth, MonitoringService};

pub use dbwatch_types::{Category, MonitoringSnapshot};
