//! Monitoring service (`/api/v1/monitoring/<slug>`) and backend health.

use dbwatch_types::{Category, MonitoringSnapshot, RedisInstanceMetrics};
use serde::{Deserialize, Serialize};

use crate::{ApiClient, ApiResult, ClientError};

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendHealth {
    pub status: String,
    pub message: String,
}

impl BackendHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(
            self.status.to_ascii_lowercase().as_str(),
            "ok" | "healthy" | "up"
        )
    }
}

/// Fetches monitoring snapshots from the backend.
#[derive(Debug, Clone)]
pub struct MonitoringService {
    client: ApiClient,
}

impl MonitoringService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Endpoint path for a category.
    pub fn endpoint(category: Category) -> String {
        format!("/api/v1/monitoring/{}", category.slug())
    }

    /// Fetch one snapshot for `category`.
    ///
    /// A payload keyed by a different category is rejected.
    pub async fn fetch(&self, category: Category) -> ApiResult<MonitoringSnapshot> {
        let endpoint = Self::endpoint(category);
        let snapshot: MonitoringSnapshot = self.client.get_envelope(&endpoint).await?;

        if snapshot.category() != category {
            return Err(ClientError::WrongCategory {
                endpoint,
                expected: category,
                actual: snapshot.category(),
            });
        }
        Ok(snapshot)
    }

    /// Fetch every category concurrently, in tab order.
    pub async fn fetch_all(&self) -> ApiResult<Vec<MonitoringSnapshot>> {
        let (kafka, redis, mysql, postgres) = tokio::try_join!(
            self.fetch(Category::Kafka),
            self.fetch(Category::Redis),
            self.fetch(Category::Mysql),
            self.fetch(Category::Postgres),
        )?;
        Ok(vec![kafka, redis, mysql, postgres])
    }

    /// Convenience for the Redis instance list alone.
    pub async fn redis_instances(&self) -> ApiResult<Vec<RedisInstanceMetrics>> {
        Ok(self
            .fetch(Category::Redis)
            .await?
            .into_redis()
            .unwrap_or_default())
    }

    pub async fn health(&self) -> ApiResult<BackendHealth> {
        self.client.get_json("/health").await
    }
}
