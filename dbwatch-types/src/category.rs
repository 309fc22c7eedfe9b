//! Resource categories monitored by dbwatch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A kind of backing service the dashboard can watch.
///
/// The same four categories key both the monitoring endpoints and the
/// configuration endpoints of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Kafka,
    Redis,
    Mysql,
    #[serde(rename = "postgresql", alias = "postgres")]
    Postgres,
}

impl Category {
    /// All categories in dashboard tab order.
    pub const ALL: [Category; 4] = [
        Category::Kafka,
        Category::Redis,
        Category::Mysql,
        Category::Postgres,
    ];

    /// Path segment used by the backend API (`/api/v1/monitoring/<slug>`).
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Kafka => "kafka",
            Category::Redis => "redis",
            Category::Mysql => "mysql",
            Category::Postgres => "postgresql",
        }
    }

    /// Returns the display label for this category.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Kafka => "Kafka",
            Category::Redis => "Redis",
            Category::Mysql => "MySQL",
            Category::Postgres => "PostgreSQL",
        }
    }

    /// Position in [`Category::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Category::Kafka => 0,
            Category::Redis => 1,
            Category::Mysql => 2,
            Category::Postgres => 3,
        }
    }

    /// Cycle to the next category.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Cycle to the previous category.
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Returned when a string names no known category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category '{0}' (expected kafka, redis, mysql or postgresql)")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kafka" => Ok(Category::Kafka),
            "redis" => Ok(Category::Redis),
            "mysql" => Ok(Category::Mysql),
            "postgresql" | "postgres" => Ok(Category::Postgres),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugs_match_backend_routes() {
        let slugs: Vec<&str> = Category::ALL.iter().map(|c| c.slug()).collect();
        assert_eq!(slugs, vec!["kafka", "redis", "mysql", "postgresql"]);
    }

    #[test]
    fn test_parse_accepts_postgres_alias() {
        assert_eq!("postgres".parse::<Category>(), Ok(Category::Postgres));
        assert_eq!("PostgreSQL".parse::<Category>(), Ok(Category::Postgres));
        assert_eq!(" redis ".parse::<Category>(), Ok(Category::Redis));
        assert!("mongo".parse::<Category>().is_err());
    }

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(Category::Postgres.next(), Category::Kafka);
        assert_eq!(Category::Kafka.prev(), Category::Postgres);
        assert_eq!(Category::Redis.next(), Category::Mysql);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Category::Postgres).unwrap(), "\"postgresql\"");
        let parsed: Category = serde_json::from_str("\"postgres\"").unwrap();
        assert_eq!(parsed, Category::Postgres);
    }
}
