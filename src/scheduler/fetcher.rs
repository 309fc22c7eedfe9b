//! The fetch seam between the scheduler and the backend.

use async_trait::async_trait;
use dbwatch_client::{ApiResult, MonitoringService};
use dbwatch_types::{Category, MonitoringSnapshot};

/// Fetches one snapshot for a category.
///
/// Implemented by [`MonitoringService`] for the real backend.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync + 'static {
    async fn fetch(&self, category: Category) -> ApiResult<MonitoringSnapshot>;
}

#[async_trait]
impl SnapshotFetcher for MonitoringService {
    async fn fetch(&self, category: Category) -> ApiResult<MonitoringSnapshot> {
        MonitoringService::fetch(self, category).await
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use dbwatch_client::ClientError;
    use dbwatch_types::{
        Category, InstanceStatus, KafkaBrokerMetrics, MonitoringSnapshot, MysqlMetrics,
        PostgresMetrics, RedisInstanceMetrics,
    };
    use parking_lot::Mutex;

    use super::*;

    /// A fetcher with scripted latency, failures and payloads.
    ///
    /// The n-th call (1-based) returns a snapshot whose single instance is
    /// named `call-n` (`broker-n` for Kafka), so tests can tell which fetch
    /// was applied.
    #[derive(Default)]
    pub struct ScriptedFetcher {
        calls: Mutex<Vec<Category>>,
        delays: Mutex<HashMap<Category, VecDeque<Duration>>>,
        failing: AtomicBool,
        misroute_to: Mutex<Option<Category>>,
        scripted: Mutex<VecDeque<MonitoringSnapshot>>,
    }

    impl ScriptedFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue latencies for the next fetches of `category`.
        pub fn delay(&self, category: Category, delays: &[u64]) {
            self.delays
                .lock()
                .entry(category)
                .or_default()
                .extend(delays.iter().map(|ms| Duration::from_millis(*ms)));
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Answer every request with a payload for `category` instead.
        pub fn misroute_to(&self, category: Category) {
            *self.misroute_to.lock() = Some(category);
        }

        /// Serve these snapshots in order, repeating the last one.
        pub fn script(&self, snapshots: Vec<MonitoringSnapshot>) {
            *self.scripted.lock() = snapshots.into();
        }

        fn next_scripted(&self) -> Option<MonitoringSnapshot> {
            let mut scripted = self.scripted.lock();
            if scripted.len() > 1 {
                scripted.pop_front()
            } else {
                scripted.front().cloned()
            }
        }

        pub fn calls(&self) -> Vec<Category> {
            self.calls.lock().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl SnapshotFetcher for ScriptedFetcher {
        async fn fetch(&self, category: Category) -> ApiResult<MonitoringSnapshot> {
            let call = {
                let mut calls = self.calls.lock();
                calls.push(category);
                calls.len()
            };
            let delay = self
                .delays
                .lock()
                .get_mut(&category)
                .and_then(|d| d.pop_front());
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if self.failing.load(Ordering::SeqCst) {
                return Err(ClientError::Timeout {
                    endpoint: MonitoringService::endpoint(category),
                });
            }
            if let Some(snapshot) = self.next_scripted() {
                return Ok(snapshot);
            }
            let served = (*self.misroute_to.lock()).unwrap_or(category);
            Ok(marked(served, call))
        }
    }

    /// A one-instance snapshot marked with the call number.
    pub fn marked(category: Category, n: usize) -> MonitoringSnapshot {
        let name = format!("call-{n}");
        let status = InstanceStatus::Online;
        match category {
            Category::Kafka => MonitoringSnapshot::Kafka(vec![KafkaBrokerMetrics {
                broker_id: n as i64,
                status,
                ..Default::default()
            }]),
            Category::Redis => MonitoringSnapshot::Redis(vec![RedisInstanceMetrics {
                name,
                status,
                ..Default::default()
            }]),
            Category::Mysql => MonitoringSnapshot::Mysql(vec![MysqlMetrics {
                name,
                status,
                ..Default::default()
            }]),
            Category::Postgres => MonitoringSnapshot::Postgres(vec![PostgresMetrics {
                name,
                status,
                ..Default::default()
            }]),
        }
    }

    /// Name of the first instance, as produced by [`marked`].
    pub fn marker(snapshot: &MonitoringSnapshot) -> Option<String> {
        snapshot.instances().first().map(|i| i.name())
    }
}
