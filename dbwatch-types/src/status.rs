//! Instance status shared by every category.

use serde::{Deserialize, Deserializer, Serialize};

/// Reported status of a single monitored instance.
///
/// Unknown strings decode as [`InstanceStatus::Unknown`] so a new backend
/// status never fails the whole snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Online,
    Warning,
    Offline,
    #[default]
    #[serde(other)]
    Unknown,
}

impl InstanceStatus {
    /// Returns the lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Online => "online",
            InstanceStatus::Warning => "warning",
            InstanceStatus::Offline => "offline",
            InstanceStatus::Unknown => "unknown",
        }
    }
}

/// Common view over a monitored instance of any category.
pub trait Instance {
    /// Display name of the instance.
    fn name(&self) -> String;

    /// `host:port` of the instance.
    fn endpoint(&self) -> String;

    /// Reported status.
    fn status(&self) -> InstanceStatus;
}

/// Per-status instance counts for a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusCounts {
    pub online: usize,
    pub warning: usize,
    pub offline: usize,
    pub unknown: usize,
}

impl StatusCounts {
    /// Count statuses across a set of instances.
    pub fn tally<'a, I, T>(instances: I) -> Self
    where
        I: IntoIterator<Item = &'a T>,
        T: Instance + ?Sized + 'a,
    {
        let mut counts = Self::default();
        for instance in instances {
            match instance.status() {
                InstanceStatus::Online => counts.online += 1,
                InstanceStatus::Warning => counts.warning += 1,
                InstanceStatus::Offline => counts.offline += 1,
                InstanceStatus::Unknown => counts.unknown += 1,
            }
        }
        counts
    }

    /// Total number of instances counted.
    pub fn total(&self) -> usize {
        self.online + self.warning + self.offline + self.unknown
    }
}

/// Go encodes nil slices and maps as `null`; treat that as empty.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_status_does_not_fail() {
        let status: InstanceStatus = serde_json::from_str("\"degraded\"").unwrap();
        assert_eq!(status, InstanceStatus::Unknown);

        let status: InstanceStatus = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(status, InstanceStatus::Warning);
    }
}
