//! Kafka broker metrics as served by `/api/v1/monitoring/kafka`.

use serde::{Deserialize, Serialize};

use crate::status::null_as_default;
use crate::{Instance, InstanceStatus};

/// Per-topic figures reported by a broker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaTopicMetrics {
    pub name: String,
    pub partitions: i64,
    pub replication_factor: i64,
    /// In-sync replica count across all partitions.
    pub isr_count: i64,
    pub messages_per_sec: f64,
    pub bytes_in_per_sec: f64,
    pub bytes_out_per_sec: f64,
    /// Bytes on disk.
    pub total_size: i64,
    pub retention_ms: i64,
}

impl KafkaTopicMetrics {
    /// Whether fewer replicas are in sync than the topic expects.
    pub fn is_under_replicated(&self) -> bool {
        self.isr_count < self.partitions * self.replication_factor
    }
}

/// Consumer group lag summary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaConsumerGroup {
    pub group_id: String,
    /// Stable, Empty, Dead, PreparingRebalance or CompletingRebalance.
    pub state: String,
    pub members: i64,
    pub lag: i64,
}

/// One Kafka broker and the cluster view it reports.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaBrokerMetrics {
    pub broker_id: i64,
    pub host: String,
    pub port: u16,
    pub status: InstanceStatus,
    pub version: String,
    pub cluster_id: String,
    /// Absent when the broker did not report a controller.
    pub controller_id: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub topics: Vec<KafkaTopicMetrics>,
    #[serde(deserialize_with = "null_as_default")]
    pub consumer_groups: Vec<KafkaConsumerGroup>,
    pub total_partitions: i64,
    pub total_topics: i64,
    #[serde(rename = "under_replicated_partitions")]
    pub under_replicated: i64,
    pub offline_partitions: i64,
    pub bytes_in_per_sec: f64,
    pub bytes_out_per_sec: f64,
    pub messages_in_per_sec: f64,
    pub timestamp: String,
}

impl KafkaBrokerMetrics {
    /// Sum of lag across all consumer groups seen by this broker.
    pub fn total_consumer_lag(&self) -> i64 {
        self.consumer_groups.iter().map(|g| g.lag.max(0)).sum()
    }

    /// Topics whose in-sync replica count is short.
    pub fn under_replicated_topics(&self) -> impl Iterator<Item = &KafkaTopicMetrics> {
        self.topics.iter().filter(|t| t.is_under_replicated())
    }

    /// Whether this broker is the cluster controller.
    pub fn is_controller(&self) -> bool {
        self.controller_id == Some(self.broker_id)
    }
}

impl Instance for KafkaBrokerMetrics {
    fn name(&self) -> String {
        format!("broker-{}", self.broker_id)
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn status(&self) -> InstanceStatus {
        self.status
    }
}
