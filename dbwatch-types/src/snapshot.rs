//! MonitoringSnapshot - the complete data set for one category from one fetch.

use serde::{Deserialize, Serialize};

use crate::status::null_as_default;
use crate::{
    Category, Instance, KafkaBrokerMetrics, MysqlMetrics, PostgresMetrics, RedisInstanceMetrics,
    StatusCounts,
};

/// One fetch worth of monitoring data for a single category.
///
/// The wire form is the backend payload object, keyed by the category slug:
///
/// ```
/// use dbwatch_types::{Category, MonitoringSnapshot};
///
/// let json = r#"{"redis": [{"name": "cache", "status": "online"}]}"#;
/// let snapshot: MonitoringSnapshot = serde_json::from_str(json).unwrap();
///
/// assert_eq!(snapshot.category(), Category::Redis);
/// assert_eq!(snapshot.status_counts().online, 1);
/// ```
///
/// Snapshots are never merged. A newer one replaces the old one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MonitoringSnapshot {
    #[serde(rename = "kafka", deserialize_with = "null_as_default")]
    Kafka(Vec<KafkaBrokerMetrics>),
    #[serde(rename = "redis", deserialize_with = "null_as_default")]
    Redis(Vec<RedisInstanceMetrics>),
    #[serde(rename = "mysql", deserialize_with = "null_as_default")]
    Mysql(Vec<MysqlMetrics>),
    #[serde(rename = "postgresql", deserialize_with = "null_as_default")]
    Postgres(Vec<PostgresMetrics>),
}

impl MonitoringSnapshot {
    /// An empty snapshot for the given category.
    pub fn empty(category: Category) -> Self {
        match category {
            Category::Kafka => MonitoringSnapshot::Kafka(Vec::new()),
            Category::Redis => MonitoringSnapshot::Redis(Vec::new()),
            Category::Mysql => MonitoringSnapshot::Mysql(Vec::new()),
            Category::Postgres => MonitoringSnapshot::Postgres(Vec::new()),
        }
    }

    /// The category this snapshot belongs to.
    pub fn category(&self) -> Category {
        match self {
            MonitoringSnapshot::Kafka(_) => Category::Kafka,
            MonitoringSnapshot::Redis(_) => Category::Redis,
            MonitoringSnapshot::Mysql(_) => Category::Mysql,
            MonitoringSnapshot::Postgres(_) => Category::Postgres,
        }
    }

    /// Number of instances in the snapshot.
    pub fn len(&self) -> usize {
        match self {
            MonitoringSnapshot::Kafka(v) => v.len(),
            MonitoringSnapshot::Redis(v) => v.len(),
            MonitoringSnapshot::Mysql(v) => v.len(),
            MonitoringSnapshot::Postgres(v) => v.len(),
        }
    }

    /// Check if the snapshot holds no instances.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every instance as a category-independent view, in payload order.
    pub fn instances(&self) -> Vec<&dyn Instance> {
        match self {
            MonitoringSnapshot::Kafka(v) => v.iter().map(|i| i as &dyn Instance).collect(),
            MonitoringSnapshot::Redis(v) => v.iter().map(|i| i as &dyn Instance).collect(),
            MonitoringSnapshot::Mysql(v) => v.iter().map(|i| i as &dyn Instance).collect(),
            MonitoringSnapshot::Postgres(v) => v.iter().map(|i| i as &dyn Instance).collect(),
        }
    }

    /// Online / warning / offline / unknown counts across all instances.
    pub fn status_counts(&self) -> StatusCounts {
        StatusCounts::tally(self.instances())
    }

    /// Redis instances, if this is a Redis snapshot.
    pub fn as_redis(&self) -> Option<&[RedisInstanceMetrics]> {
        match self {
            MonitoringSnapshot::Redis(v) => Some(v),
            _ => None,
        }
    }

    /// Consume the snapshot, returning its Redis instances if it has any.
    pub fn into_redis(self) -> Option<Vec<RedisInstanceMetrics>> {
        match self {
            MonitoringSnapshot::Redis(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_key_selects_category() {
        let cases = [
            (r#"{"kafka": []}"#, Category::Kafka),
            (r#"{"redis": []}"#, Category::Redis),
            (r#"{"mysql": []}"#, Category::Mysql),
            (r#"{"postgresql": []}"#, Category::Postgres),
        ];
        for (json, category) in cases {
            let snapshot: MonitoringSnapshot = serde_json::from_str(json).unwrap();
            assert_eq!(snapshot.category(), category);
            assert!(snapshot.is_empty());
        }
    }

    #[test]
    fn test_null_payload_is_empty() {
        let snapshot: MonitoringSnapshot = serde_json::from_str(r#"{"kafka": null}"#).unwrap();
        assert_eq!(snapshot, MonitoringSnapshot::empty(Category::Kafka));
    }

    #[test]
    fn test_status_counts() {
        let json = r#"{"postgresql": [
            {"name": "a", "status": "online"},
            {"name": "b", "status": "offline"},
            {"name": "c", "status": "online"},
            {"name": "d", "status": "rebooting"}
        ]}"#;
        let snapshot: MonitoringSnapshot = serde_json::from_str(json).unwrap();
        let counts = snapshot.status_counts();

        assert_eq!(counts.online, 2);
        assert_eq!(counts.offline, 1);
        assert_eq!(counts.unknown, 1);
        assert_eq!(counts.total(), snapshot.len());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(serde_json::from_str::<MonitoringSnapshot>(r#"{"mongodb": []}"#).is_err());
    }

    #[test]
    fn test_serialize_uses_slug_key() {
        let json = serde_json::to_string(&MonitoringSnapshot::empty(Category::Postgres)).unwrap();
        assert_eq!(json, r#"{"postgresql":[]}"#);
    }
}
