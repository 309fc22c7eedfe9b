//! Redis instance metrics as served by `/api/v1/monitoring/redis`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::status::null_as_default;
use crate::{parse_human_size, Instance, InstanceStatus};

/// Key counts for one logical Redis database (`db0`, `db1`, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisKeyspace {
    pub keys: i64,
    pub expires: i64,
    /// Average TTL in milliseconds.
    pub avg_ttl: i64,
}

/// One Redis server as reported by the backend's `INFO` collector.
///
/// Field names follow the backend JSON. Every field is optional on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisInstanceMetrics {
    pub name: String,
    pub mode: String,
    pub host: String,
    pub port: u16,
    pub status: InstanceStatus,
    pub role: String,

    // Clients
    pub connected_clients: i64,
    pub blocked_clients: i64,

    // Memory
    pub used_memory: i64,
    pub used_memory_human: String,
    pub used_memory_rss: i64,
    pub used_memory_peak: i64,
    pub used_memory_peak_human: String,
    pub max_memory: i64,
    pub memory_usage_percent: f64,
    pub memory_fragmentation_ratio: f64,

    // CPU
    pub cpu_usage: f64,
    pub cpu_usage_sys: f64,

    // Commands
    pub total_commands: i64,
    pub commands_per_sec: i64,
    pub instantaneous_ops_per_sec: i64,

    pub uptime: i64,
    pub uptime_human: String,

    // Keyspace stats
    pub keyspace_hits: i64,
    pub keyspace_misses: i64,
    pub hit_rate: f64,
    pub evicted_keys: i64,
    pub expired_keys: i64,
    pub total_keys: i64,
    pub database_count: i64,

    // Replication
    pub replication_role: String,
    pub connected_slaves: i64,
    pub master_repl_offset: i64,
    pub replica_offset: i64,

    // Persistence
    pub loading: i64,
    pub rdb_last_save_time: i64,
    pub rdb_changes_since_last_save: i64,
    pub aof_enabled: bool,

    // Network
    pub network_input_bytes: i64,
    pub network_output_bytes: i64,
    pub rejected_connections: i64,

    #[serde(deserialize_with = "null_as_default")]
    pub keyspace: BTreeMap<String, RedisKeyspace>,

    /// RFC 3339 collection time, passed through as-is.
    pub timestamp: String,
}

impl RedisInstanceMetrics {
    /// Effective replication role, preferring `role` over `replication_role`.
    pub fn effective_role(&self) -> &str {
        if self.role.is_empty() {
            &self.replication_role
        } else {
            &self.role
        }
    }

    /// Whether this instance replicates from a primary.
    pub fn is_replica(&self) -> bool {
        self.effective_role().eq_ignore_ascii_case("slave")
    }

    /// Bytes this replica is behind its primary.
    ///
    /// A primary reports `replica_offset` as 0 by convention, so only
    /// replicas produce a non-zero lag. Same clamping as
    /// [`crate::calculate_replication_lag`], kept in integers so offsets past
    /// 2^53 stay exact.
    pub fn replication_lag(&self) -> u64 {
        if !self.is_replica() {
            return 0;
        }
        self.master_repl_offset
            .saturating_sub(self.replica_offset)
            .max(0) as u64
    }

    /// Used memory in bytes, falling back to the human string when the raw
    /// counter is missing.
    pub fn memory_used_bytes(&self) -> f64 {
        if self.used_memory > 0 {
            self.used_memory as f64
        } else {
            parse_human_size(&self.used_memory_human)
        }
    }

    /// Peak memory in bytes, with the same fallback as [`Self::memory_used_bytes`].
    pub fn memory_peak_bytes(&self) -> f64 {
        if self.used_memory_peak > 0 {
            self.used_memory_peak as f64
        } else {
            parse_human_size(&self.used_memory_peak_human)
        }
    }

    /// Sum of keys across every database in the keyspace section.
    pub fn keyspace_total_keys(&self) -> i64 {
        self.keyspace.values().map(|db| db.keys).sum()
    }
}

impl Instance for RedisInstanceMetrics {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn status(&self) -> InstanceStatus {
        self.status
    }
}
