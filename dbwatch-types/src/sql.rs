//! MySQL and PostgreSQL instance metrics.

use serde::{Deserialize, Serialize};

use crate::status::null_as_default;
use crate::{Instance, InstanceStatus};

/// Size and activity of one logical database on a server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseInfo {
    pub name: String,
    /// Bytes on disk.
    pub size: i64,
    pub size_human: String,
    pub connections: i64,
    pub transactions: i64,
    pub commits: i64,
    pub rollbacks: i64,
}

/// `SHOW SLAVE STATUS` summary for a MySQL replica.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MysqlReplication {
    pub slave_io_running: bool,
    pub slave_sql_running: bool,
    pub master_host: String,
    pub master_port: u16,
    /// `None` while the SQL thread is stopped.
    pub seconds_behind_master: Option<i64>,
    pub last_io_error: String,
    pub last_sql_error: String,
}

impl MysqlReplication {
    /// Both replication threads are running.
    pub fn is_running(&self) -> bool {
        self.slave_io_running && self.slave_sql_running
    }
}

/// One MySQL server as served by `/api/v1/monitoring/mysql`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MysqlMetrics {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub status: InstanceStatus,
    pub version: String,
    pub database_size: i64,
    pub database_size_human: String,
    pub connections: i64,
    pub max_connections: i64,
    pub connection_percent: f64,
    pub threads_running: i64,
    pub threads_connected: i64,
    pub slow_queries: i64,
    pub queries_per_sec: f64,
    pub innodb_buffer_pool_size: i64,
    pub innodb_buffer_pool_used: i64,
    /// Buffer pool hit ratio in percent.
    pub innodb_buffer_pool_hit: f64,
    pub uptime: i64,
    pub replication_status: Option<MysqlReplication>,
    #[serde(deserialize_with = "null_as_default")]
    pub databases: Vec<DatabaseInfo>,
    pub timestamp: String,
}

impl MysqlMetrics {
    /// Seconds behind the primary, or `None` when not a replica or unknown.
    pub fn seconds_behind_master(&self) -> Option<i64> {
        self.replication_status
            .as_ref()
            .and_then(|r| r.seconds_behind_master)
    }
}

impl Instance for MysqlMetrics {
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

/// One PostgreSQL server as served by `/api/v1/monitoring/postgresql`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresMetrics {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub status: InstanceStatus,
    pub version: String,
    pub database_size: i64,
    pub database_size_human: String,
    pub connections: i64,
    pub max_connections: i64,
    pub connection_percent: f64,
    pub active_connections: i64,
    pub idle_connections: i64,
    /// Cache hit ratio in percent.
    pub cache_hit_ratio: f64,
    pub transactions_per_sec: f64,
    pub queries_per_sec: f64,
    /// Replication lag in bytes.
    pub replication_lag: i64,
    pub replication_state: String,
    pub is_replica: bool,
    pub deadlocks: i64,
    pub conflict_count: i64,
    pub slow_queries: i64,
    pub uptime: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub databases: Vec<DatabaseInfo>,
    pub timestamp: String,
}

impl PostgresMetrics {
    /// Replication lag in bytes; zero for primaries and for negative reports.
    pub fn replication_lag_bytes(&self) -> u64 {
        if self.is_replica {
            self.replication_lag.max(0) as u64
        } else {
            0
        }
    }
}

impl Instance for PostgresMetrics {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_replication_nullable_lag() {
        let json = r#"{
            "name": "production",
            "host": "db-1",
            "port": 3306,
            "status": "warning",
            "replication_status": {
                "slave_io_running": true,
                "slave_sql_running": false,
                "seconds_behind_master": null
            },
            "databases": null
        }"#;

        let mysql: MysqlMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(mysql.status, InstanceStatus::Warning);
        assert!(mysql.databases.is_empty());
        assert_eq!(mysql.seconds_behind_master(), None);
        assert!(!mysql.replication_status.unwrap().is_running());
    }

    #[test]
    fn test_postgres_lag_only_for_replicas() {
        let mut pg = PostgresMetrics {
            replication_lag: 4096,
            ..Default::default()
        };
        assert_eq!(pg.replication_lag_bytes(), 0);

        pg.is_replica = true;
        assert_eq!(pg.replication_lag_bytes(), 4096);

        pg.replication_lag = -12;
        assert_eq!(pg.replication_lag_bytes(), 0);
    }
}
