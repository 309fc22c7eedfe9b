//! Per-instance sample history for the detail sparklines.

use std::collections::{HashMap, VecDeque};

use super::monitor::MonitorData;

/// Maximum number of samples kept per instance.
pub const MAX_HISTORY_SIZE: usize = 31;

/// Recent throughput and usage samples, keyed by instance name.
#[derive(Debug, Clone, Default)]
pub struct History {
    throughput: HashMap<String, VecDeque<f64>>,
    usage: HashMap<String, VecDeque<f64>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sample per row of `data`.
    pub fn record(&mut self, data: &MonitorData) {
        for row in &data.rows {
            push(self.throughput.entry(row.name.clone()).or_default(), row.throughput);
            push(self.usage.entry(row.name.clone()).or_default(), row.usage);
        }
    }

    pub fn clear(&mut self) {
        self.throughput.clear();
        self.usage.clear();
    }

    /// Number of samples held for `name`.
    pub fn len(&self, name: &str) -> usize {
        self.throughput.get(name).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self) -> bool {
        self.throughput.is_empty()
    }

    /// Throughput sparkline (levels 0-7).
    pub fn throughput_sparkline(&self, name: &str) -> Vec<u8> {
        normalize_sparkline(self.throughput.get(name))
    }

    /// Usage sparkline (levels 0-7), scaled to 0-100%.
    pub fn usage_sparkline(&self, name: &str) -> Vec<u8> {
        let Some(values) = self.usage.get(name) else {
            return Vec::new();
        };
        values
            .iter()
            .map(|v| ((v.clamp(0.0, 100.0) / 100.0) * 7.0).round() as u8)
            .collect()
    }
}

fn push(samples: &mut VecDeque<f64>, value: f64) {
    samples.push_back(if value.is_finite() { value } else { 0.0 });
    if samples.len() > MAX_HISTORY_SIZE {
        samples.pop_front();
    }
}

/// Scale samples to 0-7 between their min and max.
///
/// Fewer than two samples gives an empty line.
fn normalize_sparkline(data: Option<&VecDeque<f64>>) -> Vec<u8> {
    let Some(values) = data else {
        return Vec::new();
    };
    if values.len() < 2 {
        return Vec::new();
    }

    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let min = values.iter().copied().fold(f64::MAX, f64::min);
    let range = max - min;

    values
        .iter()
        .map(|&v| {
            if range <= f64::EPSILON {
                0
            } else {
                (((v - min) / range) * 7.0).round().min(7.0) as u8
            }
        })
        .collect()
}
