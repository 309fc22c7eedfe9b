//! Display rows and health derived from monitoring snapshots.
//!
//! Each category maps onto the same [`InstanceRow`] shape: a fixed set of
//! table cells, two numeric series for the detail sparklines, a list of
//! key/value details and an optional child table (Kafka topics, Redis
//! keyspace, SQL databases).

use std::time::Instant;

use dbwatch_types::{
    Category, InstanceStatus, KafkaBrokerMetrics, MonitoringSnapshot, MysqlMetrics,
    PostgresMetrics, RedisInstanceMetrics, StatusCounts,
};
use serde_json::json;

use super::format::{
    format_byte_rate, format_bytes, format_count, format_percent, format_rate, format_uptime,
};

/// Thresholds that escalate an instance's reported status.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Replication or consumer lag (bytes or messages) that triggers a warning.
    pub lag_warning: u64,
    pub lag_critical: u64,
    /// Memory or connection usage percentage that triggers a warning.
    pub usage_warning: f64,
    pub usage_critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            lag_warning: 1024 * 1024,
            lag_critical: 64 * 1024 * 1024,
            usage_warning: 80.0,
            usage_critical: 95.0,
        }
    }
}

impl Thresholds {
    pub fn lag(&self, lag: u64) -> HealthStatus {
        if lag >= self.lag_critical {
            HealthStatus::Critical
        } else if lag >= self.lag_warning {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }

    pub fn usage(&self, percent: f64) -> HealthStatus {
        if percent >= self.usage_critical {
            HealthStatus::Critical
        } else if percent >= self.usage_warning {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }
}

/// Health status for an instance, worst last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthStatus {
    Healthy,
    Unknown,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "OK",
            HealthStatus::Unknown => "??",
            HealthStatus::Warning => "WARN",
            HealthStatus::Critical => "CRIT",
        }
    }
}

impl From<InstanceStatus> for HealthStatus {
    fn from(status: InstanceStatus) -> Self {
        match status {
            InstanceStatus::Online => HealthStatus::Healthy,
            InstanceStatus::Warning => HealthStatus::Warning,
            InstanceStatus::Offline => HealthStatus::Critical,
            InstanceStatus::Unknown => HealthStatus::Unknown,
        }
    }
}

/// One instance, ready for the table and the detail view.
#[derive(Debug, Clone)]
pub struct InstanceRow {
    pub name: String,
    pub endpoint: String,
    pub status: InstanceStatus,
    pub health: HealthStatus,
    /// One cell per entry of [`columns`].
    pub cells: Vec<String>,
    /// Throughput sample for the history sparkline.
    pub throughput: f64,
    /// Usage percentage sample for the history sparkline.
    pub usage: f64,
    pub lag: u64,
    pub details: Vec<(String, String)>,
    /// One row per child, one cell per entry of [`child_columns`].
    pub children: Vec<Vec<String>>,
}

/// A processed snapshot.
#[derive(Debug, Clone)]
pub struct MonitorData {
    pub category: Category,
    /// Sorted worst health first, then by name.
    pub rows: Vec<InstanceRow>,
    pub counts: StatusCounts,
    pub last_updated: Instant,
}

impl MonitorData {
    pub fn from_snapshot(snapshot: &MonitoringSnapshot, thresholds: &Thresholds) -> Self {
        let mut rows: Vec<InstanceRow> = match snapshot {
            MonitoringSnapshot::Kafka(brokers) => {
                brokers.iter().map(|b| kafka_row(b, thresholds)).collect()
            }
            MonitoringSnapshot::Redis(instances) => {
                instances.iter().map(|r| redis_row(r, thresholds)).collect()
            }
            MonitoringSnapshot::Mysql(instances) => {
                instances.iter().map(|m| mysql_row(m, thresholds)).collect()
            }
            MonitoringSnapshot::Postgres(instances) => {
                instances.iter().map(|p| postgres_row(p, thresholds)).collect()
            }
        };

        rows.sort_by(|a, b| b.health.cmp(&a.health).then_with(|| a.name.cmp(&b.name)));

        Self {
            category: snapshot.category(),
            rows,
            counts: snapshot.status_counts(),
            last_updated: Instant::now(),
        }
    }

    /// Rows whose health is worse than healthy.
    pub fn unhealthy(&self) -> impl Iterator<Item = &InstanceRow> {
        self.rows.iter().filter(|r| r.health > HealthStatus::Healthy)
    }

    /// Worst health across all rows; healthy when empty.
    pub fn overall_health(&self) -> HealthStatus {
        self.rows
            .iter()
            .map(|r| r.health)
            .max()
            .unwrap_or(HealthStatus::Healthy)
    }

    pub fn total_lag(&self) -> u64 {
        self.rows.iter().map(|r| r.lag).sum()
    }
}

/// Table headers for a category.
pub fn columns(category: Category) -> &'static [&'static str] {
    match category {
        Category::Kafka => &[
            "Broker", "Endpoint", "Topics", "Parts", "UnderRepl", "In", "Out", "Lag", "Status",
        ],
        Category::Redis => &[
            "Name", "Endpoint", "Role", "Memory", "Mem%", "Clients", "Ops/s", "Hit%", "Lag",
            "Status",
        ],
        Category::Mysql => &[
            "Name", "Endpoint", "Version", "Conns", "QPS", "Slow", "BufHit%", "Repl", "Status",
        ],
        Category::Postgres => &[
            "Name", "Endpoint", "Role", "Conns", "TPS", "Cache%", "Lag", "Deadlocks", "Status",
        ],
    }
}

/// Child table headers for a category.
pub fn child_columns(category: Category) -> &'static [&'static str] {
    match category {
        Category::Kafka => &["Topic", "Parts", "RF", "ISR", "Msg/s", "Size"],
        Category::Redis => &["DB", "Keys", "Expires", "Avg TTL"],
        Category::Mysql | Category::Postgres => &["Database", "Size", "Conns", "Txns"],
    }
}

fn kafka_row(broker: &KafkaBrokerMetrics, thresholds: &Thresholds) -> InstanceRow {
    let lag = broker.total_consumer_lag() as u64;
    let mut health = HealthStatus::from(broker.status).max(thresholds.lag(lag));
    if broker.offline_partitions > 0 {
        health = HealthStatus::Critical;
    } else if broker.under_replicated > 0 {
        health = health.max(HealthStatus::Warning);
    }

    let name = if broker.is_controller() {
        format!("broker-{} *", broker.broker_id)
    } else {
        format!("broker-{}", broker.broker_id)
    };
    let endpoint = format!("{}:{}", broker.host, broker.port);

    InstanceRow {
        cells: vec![
            name.clone(),
            endpoint.clone(),
            broker.total_topics.to_string(),
            broker.total_partitions.to_string(),
            broker.under_replicated.to_string(),
            format_byte_rate(broker.bytes_in_per_sec),
            format_byte_rate(broker.bytes_out_per_sec),
            format_count(lag),
            broker.status.as_str().to_string(),
        ],
        details: vec![
            ("Version".into(), broker.version.clone()),
            ("Cluster".into(), broker.cluster_id.clone()),
            (
                "Controller".into(),
                broker
                    .controller_id
                    .map_or_else(|| "-".to_string(), |id| id.to_string()),
            ),
            ("Offline partitions".into(), broker.offline_partitions.to_string()),
            ("Messages in".into(), format_rate(broker.messages_in_per_sec)),
            ("Consumer groups".into(), broker.consumer_groups.len().to_string()),
            ("Consumer lag".into(), format_count(lag)),
        ],
        children: broker
            .topics
            .iter()
            .map(|t| {
                vec![
                    t.name.clone(),
                    t.partitions.to_string(),
                    t.replication_factor.to_string(),
                    t.isr_count.to_string(),
                    format_rate(t.messages_per_sec),
                    format_bytes(t.total_size as f64),
                ]
            })
            .collect(),
        name,
        endpoint,
        status: broker.status,
        health,
        throughput: broker.messages_in_per_sec,
        usage: if broker.total_partitions > 0 {
            broker.under_replicated as f64 / broker.total_partitions as f64 * 100.0
        } else {
            0.0
        },
        lag,
    }
}

fn redis_row(redis: &RedisInstanceMetrics, thresholds: &Thresholds) -> InstanceRow {
    let lag = redis.replication_lag();
    let health = HealthStatus::from(redis.status)
        .max(thresholds.lag(lag))
        .max(thresholds.usage(redis.memory_usage_percent));
    let endpoint = format!("{}:{}", redis.host, redis.port);
    let ops = redis.instantaneous_ops_per_sec.max(0) as f64;

    InstanceRow {
        cells: vec![
            redis.name.clone(),
            endpoint.clone(),
            redis.effective_role().to_string(),
            format_bytes(redis.memory_used_bytes()),
            format_percent(redis.memory_usage_percent),
            redis.connected_clients.to_string(),
            format_rate(ops),
            format_percent(redis.hit_rate),
            if redis.is_replica() {
                format_bytes(lag as f64)
            } else {
                "-".to_string()
            },
            redis.status.as_str().to_string(),
        ],
        details: vec![
            ("Mode".into(), redis.mode.clone()),
            ("Uptime".into(), format_uptime(redis.uptime)),
            ("Peak memory".into(), format_bytes(redis.memory_peak_bytes())),
            ("RSS".into(), format_bytes(redis.used_memory_rss as f64)),
            (
                "Fragmentation".into(),
                format!("{:.2}", redis.memory_fragmentation_ratio),
            ),
            ("CPU".into(), format!("{:.1}s", redis.cpu_usage)),
            ("Blocked clients".into(), redis.blocked_clients.to_string()),
            ("Total keys".into(), format_count(redis.keyspace_total_keys().max(0) as u64)),
            ("Evicted keys".into(), format_count(redis.evicted_keys.max(0) as u64)),
            ("Connected replicas".into(), redis.connected_slaves.to_string()),
            ("Master offset".into(), redis.master_repl_offset.to_string()),
            (
                "AOF".into(),
                if redis.aof_enabled { "on" } else { "off" }.to_string(),
            ),
        ],
        children: redis
            .keyspace
            .iter()
            .map(|(db, ks)| {
                vec![
                    db.clone(),
                    format_count(ks.keys.max(0) as u64),
                    format_count(ks.expires.max(0) as u64),
                    format!("{}ms", ks.avg_ttl),
                ]
            })
            .collect(),
        name: redis.name.clone(),
        endpoint,
        status: redis.status,
        health,
        throughput: ops,
        usage: redis.memory_usage_percent,
        lag,
    }
}

fn mysql_row(mysql: &MysqlMetrics, thresholds: &Thresholds) -> InstanceRow {
    let mut health =
        HealthStatus::from(mysql.status).max(thresholds.usage(mysql.connection_percent));
    let replication = match &mysql.replication_status {
        None => "-".to_string(),
        Some(r) if !r.is_running() => {
            health = HealthStatus::Critical;
            "stopped".to_string()
        }
        Some(r) => match r.seconds_behind_master {
            Some(secs) => format!("{secs}s"),
            None => "?".to_string(),
        },
    };
    let endpoint = format!("{}:{}", mysql.host, mysql.port);

    let mut details: Vec<(String, String)> = vec![
        ("Uptime".into(), format_uptime(mysql.uptime)),
        ("Size".into(), format_bytes(mysql.database_size as f64)),
        (
            "Connections".into(),
            format!("{}/{}", mysql.connections, mysql.max_connections),
        ),
        ("Threads running".into(), mysql.threads_running.to_string()),
        (
            "Buffer pool".into(),
            format!(
                "{} / {}",
                format_bytes(mysql.innodb_buffer_pool_used as f64),
                format_bytes(mysql.innodb_buffer_pool_size as f64)
            ),
        ),
    ];
    if let Some(r) = &mysql.replication_status {
        details.push((
            "Master".into(),
            format!("{}:{}", r.master_host, r.master_port),
        ));
        for error in [&r.last_io_error, &r.last_sql_error] {
            if !error.is_empty() {
                details.push(("Replication error".into(), error.clone()));
            }
        }
    }

    InstanceRow {
        cells: vec![
            mysql.name.clone(),
            endpoint.clone(),
            mysql.version.clone(),
            mysql.connections.to_string(),
            format_rate(mysql.queries_per_sec),
            format_count(mysql.slow_queries.max(0) as u64),
            format_percent(mysql.innodb_buffer_pool_hit),
            replication,
            mysql.status.as_str().to_string(),
        ],
        details,
        children: database_rows(&mysql.databases),
        name: mysql.name.clone(),
        endpoint,
        status: mysql.status,
        health,
        throughput: mysql.queries_per_sec,
        usage: mysql.connection_percent,
        lag: 0,
    }
}

fn postgres_row(pg: &PostgresMetrics, thresholds: &Thresholds) -> InstanceRow {
    let lag = pg.replication_lag_bytes();
    let health = HealthStatus::from(pg.status)
        .max(thresholds.lag(lag))
        .max(thresholds.usage(pg.connection_percent));
    let endpoint = format!("{}:{}", pg.host, pg.port);

    InstanceRow {
        cells: vec![
            pg.name.clone(),
            endpoint.clone(),
            if pg.is_replica { "replica" } else { "primary" }.to_string(),
            format!("{}/{}", pg.connections, pg.max_connections),
            format_rate(pg.transactions_per_sec),
            format_percent(pg.cache_hit_ratio),
            if pg.is_replica {
                format_bytes(lag as f64)
            } else {
                "-".to_string()
            },
            pg.deadlocks.to_string(),
            pg.status.as_str().to_string(),
        ],
        details: vec![
            ("Version".into(), pg.version.clone()),
            ("Uptime".into(), format_uptime(pg.uptime)),
            ("Size".into(), format_bytes(pg.database_size as f64)),
            ("Active".into(), pg.active_connections.to_string()),
            ("Idle".into(), pg.idle_connections.to_string()),
            ("QPS".into(), format_rate(pg.queries_per_sec)),
            ("Replication state".into(), pg.replication_state.clone()),
            ("Conflicts".into(), pg.conflict_count.to_string()),
            ("Slow queries".into(), pg.slow_queries.to_string()),
        ],
        children: database_rows(&pg.databases),
        name: pg.name.clone(),
        endpoint,
        status: pg.status,
        health,
        throughput: pg.transactions_per_sec,
        usage: pg.connection_percent,
        lag,
    }
}

fn database_rows(databases: &[dbwatch_types::DatabaseInfo]) -> Vec<Vec<String>> {
    databases
        .iter()
        .map(|db| {
            let size = if db.size > 0 {
                format_bytes(db.size as f64)
            } else {
                db.size_human.clone()
            };
            vec![
                db.name.clone(),
                size,
                db.connections.to_string(),
                format_count(db.transactions.max(0) as u64),
            ]
        })
        .collect()
}

/// JSON summary of a snapshot: the raw payload with derived figures.
pub fn snapshot_report(snapshot: &MonitoringSnapshot, thresholds: &Thresholds) -> serde_json::Value {
    let data = MonitorData::from_snapshot(snapshot, thresholds);
    let instances: Vec<serde_json::Value> = data
        .rows
        .iter()
        .map(|row| {
            json!({
                "name": row.name,
                "endpoint": row.endpoint,
                "status": row.status.as_str(),
                "health": format!("{:?}", row.health),
                "lag": row.lag,
            })
        })
        .collect();

    json!({
        "category": data.category.slug(),
        "summary": {
            "total": data.counts.total(),
            "online": data.counts.online,
            "warning": data.counts.warning,
            "offline": data.counts.offline,
            "unknown": data.counts.unknown,
            "unhealthy": data.unhealthy().count(),
            "total_lag": data.total_lag(),
        },
        "instances": instances,
        "snapshot": snapshot,
    })
}

#[cfg(test)]
mod tests {
    use dbwatch_types::{KafkaConsumerGroup, MysqlReplication, RedisKeyspace};

    use super::*;

    fn redis(name: &str, status: InstanceStatus) -> RedisInstanceMetrics {
        RedisInstanceMetrics {
            name: name.to_string(),
            host: "10.0.0.1".to_string(),
            port: 6379,
            status,
            role: "master".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_rows_sorted_worst_first() {
        let snapshot = MonitoringSnapshot::Redis(vec![
            redis("b-ok", InstanceStatus::Online),
            redis("a-ok", InstanceStatus::Online),
            redis("down", InstanceStatus::Offline),
            redis("mystery", InstanceStatus::Unknown),
        ]);
        let data = MonitorData::from_snapshot(&snapshot, &Thresholds::default());

        let names: Vec<_> = data.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["down", "mystery", "a-ok", "b-ok"]);
        assert_eq!(data.counts.total(), 4);
        assert_eq!(data.overall_health(), HealthStatus::Critical);
        assert_eq!(data.unhealthy().count(), 2);
    }

    #[test]
    fn test_redis_replica_lag_escalates() {
        let mut replica = redis("replica", InstanceStatus::Online);
        replica.role = "slave".to_string();
        replica.master_repl_offset = 900_000_000;
        replica.replica_offset = 800_000_000;
        replica.keyspace.insert(
            "db0".to_string(),
            RedisKeyspace {
                keys: 1500,
                expires: 10,
                avg_ttl: 300,
            },
        );

        let data = MonitorData::from_snapshot(
            &MonitoringSnapshot::Redis(vec![replica]),
            &Thresholds::default(),
        );
        let row = &data.rows[0];
        assert_eq!(row.lag, 100_000_000);
        assert_eq!(row.health, HealthStatus::Critical);
        assert_eq!(row.cells.len(), columns(Category::Redis).len());
        assert_eq!(row.children, vec![vec!["db0", "1.5K", "10", "300ms"]]);
    }

    #[test]
    fn test_redis_memory_from_human_size() {
        let mut r = redis("cache", InstanceStatus::Online);
        r.used_memory_human = "1.5M".to_string();
        r.memory_usage_percent = 85.0;

        let data =
            MonitorData::from_snapshot(&MonitoringSnapshot::Redis(vec![r]), &Thresholds::default());
        assert_eq!(data.rows[0].cells[3], "1.5MB");
        assert_eq!(data.rows[0].health, HealthStatus::Warning);
    }

    #[test]
    fn test_kafka_offline_partitions_are_critical() {
        let broker = KafkaBrokerMetrics {
            broker_id: 2,
            controller_id: Some(2),
            status: InstanceStatus::Online,
            offline_partitions: 1,
            consumer_groups: vec![KafkaConsumerGroup {
                group_id: "orders".to_string(),
                lag: 42,
                ..Default::default()
            }],
            ..Default::default()
        };
        let data = MonitorData::from_snapshot(
            &MonitoringSnapshot::Kafka(vec![broker]),
            &Thresholds::default(),
        );
        let row = &data.rows[0];
        assert_eq!(row.name, "broker-2 *");
        assert!(row.details.contains(&("Controller".to_string(), "2".to_string())));
        assert_eq!(row.lag, 42);
        assert_eq!(row.health, HealthStatus::Critical);
        assert_eq!(row.cells.len(), columns(Category::Kafka).len());
    }

    #[test]
    fn test_mysql_stopped_replication_is_critical() {
        let mysql = MysqlMetrics {
            name: "orders".to_string(),
            status: InstanceStatus::Online,
            replication_status: Some(MysqlReplication {
                slave_io_running: true,
                slave_sql_running: false,
                last_sql_error: "duplicate key".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let data = MonitorData::from_snapshot(
            &MonitoringSnapshot::Mysql(vec![mysql]),
            &Thresholds::default(),
        );
        let row = &data.rows[0];
        assert_eq!(row.health, HealthStatus::Critical);
        assert_eq!(row.cells[7], "stopped");
        assert!(row
            .details
            .iter()
            .any(|(k, v)| k == "Replication error" && v == "duplicate key"));
    }

    #[test]
    fn test_postgres_primary_has_no_lag() {
        let pg = PostgresMetrics {
            name: "main".to_string(),
            status: InstanceStatus::Online,
            replication_lag: 5_000_000_000,
            is_replica: false,
            ..Default::default()
        };
        let data = MonitorData::from_snapshot(
            &MonitoringSnapshot::Postgres(vec![pg]),
            &Thresholds::default(),
        );
        assert_eq!(data.rows[0].lag, 0);
        assert_eq!(data.rows[0].health, HealthStatus::Healthy);
        assert_eq!(data.rows[0].cells[6], "-");
    }

    #[test]
    fn test_snapshot_report() {
        let snapshot = MonitoringSnapshot::Redis(vec![
            redis("a", InstanceStatus::Online),
            redis("b", InstanceStatus::Offline),
        ]);
        let report = snapshot_report(&snapshot, &Thresholds::default());

        assert_eq!(report["category"], "redis");
        assert_eq!(report["summary"]["total"], 2);
        assert_eq!(report["summary"]["offline"], 1);
        assert_eq!(report["summary"]["unhealthy"], 1);
        assert_eq!(report["instances"][0]["name"], "b");
        assert_eq!(report["snapshot"]["redis"][1]["name"], "b");
    }

    #[test]
    fn test_empty_snapshot() {
        let data = MonitorData::from_snapshot(
            &MonitoringSnapshot::empty(Category::Postgres),
            &Thresholds::default(),
        );
        assert!(data.rows.is_empty());
        assert_eq!(data.overall_health(), HealthStatus::Healthy);
        assert_eq!(data.category, Category::Postgres);
    }
}
