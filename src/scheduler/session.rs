//! Polling sessions.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dbwatch_types::Category;
use tokio::task::JoinHandle;

/// Identifies one start-to-stop polling session of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The lifetime during which one category is polled at one interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollingSession {
    pub id: SessionId,
    pub category: Category,
    pub interval: Duration,
    pub started_at: Instant,
}

impl PollingSession {
    pub fn new(id: SessionId, category: Category, interval: Duration) -> Self {
        Self {
            id,
            category,
            interval,
            started_at: Instant::now(),
        }
    }
}

/// Scheduler-side bookkeeping for the live session.
///
/// Ticks are numbered from 1 within a session. The counter is shared with
/// the timer task so out-of-band refreshes draw from the same sequence.
#[derive(Debug)]
pub(crate) struct ActiveSession {
    pub session: PollingSession,
    pub ticks: Arc<AtomicU64>,
    pub last_applied_tick: u64,
    pub timer: JoinHandle<()>,
}

impl ActiveSession {
    pub fn next_tick(&self) -> u64 {
        self.ticks.fetch_add(1, Ordering::SeqCst) + 1
    }
}
