//! Refresh scheduler: polls the active category on a fixed cadence.
//!
//! ## Lifecycle
//!
//! ```text
//!  start(category, interval)            stop() / Drop
//!         │                                  │
//!         ▼                                  ▼
//!  ┌──────────────┐  tick n  ┌─────────┐  abort timer, clear session
//!  │ timer task   │────────▶ │ fetch n │────┐
//!  │ (1 per sched)│          └─────────┘    │ completion
//!  └──────────────┘                          ▼
//!                         apply iff session current, n > last applied,
//!                         and the payload matches the session category
//!                                            │
//!                                            ▼
//!                                watch::Sender<DisplayState>
//! ```
//!
//! Each tick spawns its fetch as a separate task, so completions can arrive
//! out of order. The guard in [`RefreshScheduler`] decides which results
//! reach the display; everything else is counted as discarded.

mod fetcher;
mod session;

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dbwatch_client::ApiResult;
use dbwatch_types::{Category, MonitoringSnapshot};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub use fetcher::SnapshotFetcher;
pub use session::{PollingSession, SessionId};

#[cfg(test)]
pub(crate) use fetcher::mock;

use session::ActiveSession;

/// What the display shows, published after every change.
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    /// The running session, `None` while stopped.
    pub session: Option<PollingSession>,
    /// Latest applied snapshot. Kept after `stop()`.
    pub snapshot: Option<Arc<MonitoringSnapshot>>,
    /// When `snapshot` was applied.
    pub updated_at: Option<Instant>,
    /// Most recent fetch failure; cleared by the next applied snapshot.
    pub last_error: Option<String>,
    /// Snapshots applied since the scheduler was created.
    pub applied: u64,
    /// Fetch results dropped by the stale-response guard.
    pub discarded: u64,
}

impl DisplayState {
    /// The snapshot, if it belongs to `category`.
    pub fn snapshot_for(&self, category: Category) -> Option<&MonitoringSnapshot> {
        self.snapshot
            .as_deref()
            .filter(|s| s.category() == category)
    }
}

/// Timer accounting, for asserting that timers never overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerStats {
    pub started: u64,
    pub cancelled: u64,
    /// Timers currently running: always 0 or 1.
    pub live: u64,
}

#[derive(Default)]
struct Shared {
    active: Option<ActiveSession>,
    next_session: u64,
    stats: TimerStats,
}

struct Inner {
    shared: Mutex<Shared>,
    display: watch::Sender<DisplayState>,
}

/// Polls one category at a time and publishes the latest snapshot.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use dbwatch::{RefreshScheduler, SnapshotFetcher};
/// use dbwatch_client::{ApiClient, MonitoringService};
/// use dbwatch_types::Category;
///
/// # tokio_test::block_on(async {
/// let service = MonitoringService::new(ApiClient::builder().build().unwrap());
/// let fetcher: Arc<dyn SnapshotFetcher> = Arc::new(service);
/// let scheduler = RefreshScheduler::new(fetcher, tokio::runtime::Handle::current());
///
/// let mut display = scheduler.subscribe();
/// scheduler.start(Category::Redis, Duration::from_secs(3));
/// display.changed().await.unwrap();
/// # });
/// ```
pub struct RefreshScheduler {
    fetcher: Arc<dyn SnapshotFetcher>,
    runtime: Handle,
    inner: Arc<Inner>,
}

impl RefreshScheduler {
    /// Create a stopped scheduler that spawns its tasks on `runtime`.
    pub fn new(fetcher: Arc<dyn SnapshotFetcher>, runtime: Handle) -> Self {
        let (display, _) = watch::channel(DisplayState::default());
        Self {
            fetcher,
            runtime,
            inner: Arc::new(Inner {
                shared: Mutex::new(Shared::default()),
                display,
            }),
        }
    }

    /// Start polling `category`: one fetch now, then one every `interval`.
    ///
    /// A running session is cancelled first, so at most one timer exists.
    pub fn start(&self, category: Category, interval: Duration) -> PollingSession {
        let mut shared = self.inner.shared.lock();
        self.start_locked(&mut shared, category, interval)
    }

    /// Stop polling. Returns `false` if nothing was running.
    ///
    /// Fetches already in flight still complete, but their results are
    /// discarded. The last snapshot stays on display.
    pub fn stop(&self) -> bool {
        let mut shared = self.inner.shared.lock();
        let Some(active) = Self::cancel_locked(&mut shared) else {
            return false;
        };
        info!(
            session = %active.session.id,
            category = %active.session.category,
            "polling stopped"
        );
        self.inner.display.send_modify(|state| state.session = None);
        true
    }

    /// Move a running session to `category`.
    ///
    /// Cancels the current timer and starts one for the new category in a
    /// single critical section. Does nothing and returns `false` while
    /// stopped. Switching to the category already polled keeps the session.
    pub fn switch_category(&self, category: Category) -> bool {
        let mut shared = self.inner.shared.lock();
        let Some(current) = shared.active.as_ref().map(|a| a.session.clone()) else {
            return false;
        };
        if current.category != category {
            self.start_locked(&mut shared, category, current.interval);
        }
        true
    }

    /// Issue one fetch now under the current session.
    ///
    /// Returns `false` while stopped.
    pub fn refresh_now(&self) -> bool {
        let shared = self.inner.shared.lock();
        let Some(active) = shared.active.as_ref() else {
            return false;
        };
        let tick = active.next_tick();
        self.spawn_fetch(active.session.id, active.session.category, tick);
        true
    }

    pub fn is_active(&self) -> bool {
        self.inner.shared.lock().active.is_some()
    }

    /// The running session, if any.
    pub fn session(&self) -> Option<PollingSession> {
        self.inner
            .shared
            .lock()
            .active
            .as_ref()
            .map(|a| a.session.clone())
    }

    pub fn timer_stats(&self) -> TimerStats {
        self.inner.shared.lock().stats
    }

    /// Receive every change to the display state.
    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.inner.display.subscribe()
    }

    /// A copy of the current display state.
    pub fn state(&self) -> DisplayState {
        self.inner.display.borrow().clone()
    }

    fn start_locked(
        &self,
        shared: &mut Shared,
        category: Category,
        interval: Duration,
    ) -> PollingSession {
        Self::cancel_locked(shared);

        shared.next_session += 1;
        let session = PollingSession::new(SessionId(shared.next_session), category, interval);
        let ticks = Arc::new(AtomicU64::new(0));

        let timer = {
            let inner = self.inner.clone();
            let fetcher = self.fetcher.clone();
            let ticks = ticks.clone();
            let id = session.id;
            self.runtime.spawn(async move {
                let mut timer = tokio::time::interval(interval);
                timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    timer.tick().await;
                    let tick = ticks.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
                    spawn_fetch(&inner, &fetcher, id, category, tick);
                }
            })
        };

        shared.stats.started += 1;
        shared.stats.live += 1;
        shared.active = Some(ActiveSession {
            session: session.clone(),
            ticks,
            last_applied_tick: 0,
            timer,
        });

        info!(
            session = %session.id,
            %category,
            interval_ms = interval.as_millis() as u64,
            "polling started"
        );

        let published = session.clone();
        self.inner.display.send_modify(move |state| {
            if state.snapshot.as_ref().map(|s| s.category()) != Some(category) {
                state.snapshot = None;
                state.updated_at = None;
            }
            state.last_error = None;
            state.session = Some(published);
        });

        session
    }

    fn cancel_locked(shared: &mut Shared) -> Option<ActiveSession> {
        let active = shared.active.take()?;
        active.timer.abort();
        shared.stats.cancelled += 1;
        shared.stats.live -= 1;
        Some(active)
    }

    fn spawn_fetch(&self, session: SessionId, category: Category, tick: u64) {
        let _guard = self.runtime.enter();
        spawn_fetch(&self.inner, &self.fetcher, session, category, tick);
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_fetch(
    inner: &Arc<Inner>,
    fetcher: &Arc<dyn SnapshotFetcher>,
    session: SessionId,
    category: Category,
    tick: u64,
) {
    let inner = inner.clone();
    let fetcher = fetcher.clone();
    tokio::spawn(async move {
        let result = fetcher.fetch(category).await;
        inner.complete(session, tick, result);
    });
}

impl Inner {
    /// Apply or discard one fetch result.
    fn complete(&self, session: SessionId, tick: u64, result: ApiResult<MonitoringSnapshot>) {
        let mut shared = self.shared.lock();

        let active = match shared.active.as_mut() {
            Some(active) if active.session.id == session => active,
            _ => {
                debug!(%session, tick, "discarding result from ended session");
                return self.discard();
            }
        };
        if tick <= active.last_applied_tick {
            debug!(
                %session,
                tick,
                last_applied = active.last_applied_tick,
                "discarding superseded result"
            );
            return self.discard();
        }

        match result {
            Ok(snapshot) => {
                if snapshot.category() != active.session.category {
                    debug!(
                        %session,
                        expected = %active.session.category,
                        actual = %snapshot.category(),
                        "discarding result for another category"
                    );
                    return self.discard();
                }
                active.last_applied_tick = tick;
                debug!(%session, tick, instances = snapshot.len(), "snapshot applied");
                self.display.send_modify(|state| {
                    state.snapshot = Some(Arc::new(snapshot));
                    state.updated_at = Some(Instant::now());
                    state.last_error = None;
                    state.applied += 1;
                });
            }
            Err(err) => {
                warn!(%session, tick, category = %active.session.category, "fetch failed: {err}");
                let message = err.to_string();
                self.display
                    .send_modify(|state| state.last_error = Some(message));
            }
        }
    }

    fn discard(&self) {
        self.display.send_modify(|state| state.discarded += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{marker, ScriptedFetcher};
    use super::*;

    const DASHBOARD: Duration = Duration::from_millis(3000);

    fn scheduler(fetcher: &Arc<ScriptedFetcher>) -> RefreshScheduler {
        RefreshScheduler::new(fetcher.clone(), Handle::current())
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    fn shown(scheduler: &RefreshScheduler) -> Option<String> {
        scheduler.state().snapshot.as_deref().and_then(marker)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_immediately_then_every_interval() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let scheduler = scheduler(&fetcher);

        scheduler.start(Category::Redis, DASHBOARD);
        advance(10).await;
        assert_eq!(fetcher.call_count(), 1);
        assert_eq!(shown(&scheduler).as_deref(), Some("call-1"));

        advance(3000).await;
        assert_eq!(fetcher.call_count(), 2);
        assert_eq!(shown(&scheduler).as_deref(), Some("call-2"));

        advance(6000).await;
        assert_eq!(fetcher.call_count(), 4);
        assert!(fetcher.calls().iter().all(|c| *c == Category::Redis));
        assert_eq!(scheduler.state().applied, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_discards_in_flight_result() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.delay(Category::Redis, &[500]);
        let scheduler = scheduler(&fetcher);

        scheduler.start(Category::Redis, DASHBOARD);
        advance(100).await;
        assert!(scheduler.stop());

        advance(1000).await;
        let state = scheduler.state();
        assert_eq!(state.applied, 0);
        assert_eq!(state.discarded, 1);
        assert!(state.snapshot.is_none());
        assert!(state.session.is_none());

        advance(10_000).await;
        assert_eq!(fetcher.call_count(), 1);
        assert!(!scheduler.stop());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_keeps_last_snapshot() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let scheduler = scheduler(&fetcher);

        scheduler.start(Category::Mysql, DASHBOARD);
        advance(10).await;
        scheduler.stop();

        assert_eq!(shown(&scheduler).as_deref(), Some("call-1"));
        assert!(!scheduler.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_early_tick_never_overwrites_newer() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        // tick 1 lands at 2500ms, ticks 2 and 3 at 1100ms and 2100ms
        fetcher.delay(Category::Redis, &[2500, 100, 100]);
        let scheduler = scheduler(&fetcher);

        scheduler.start(Category::Redis, Duration::from_millis(1000));
        advance(2600).await;

        let state = scheduler.state();
        assert_eq!(fetcher.call_count(), 3);
        assert_eq!(state.applied, 2);
        assert_eq!(state.discarded, 1);
        assert_eq!(shown(&scheduler).as_deref(), Some("call-3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_category_replaces_exactly_one_timer() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let scheduler = scheduler(&fetcher);

        scheduler.start(Category::Redis, DASHBOARD);
        advance(10).await;
        assert!(scheduler.switch_category(Category::Mysql));

        assert_eq!(
            scheduler.timer_stats(),
            TimerStats {
                started: 2,
                cancelled: 1,
                live: 1,
            }
        );

        advance(10).await;
        let state = scheduler.state();
        assert_eq!(state.snapshot_for(Category::Mysql).and_then(marker).as_deref(), Some("call-2"));
        assert_eq!(state.session.map(|s| s.category), Some(Category::Mysql));

        advance(3000).await;
        assert_eq!(
            fetcher.calls(),
            vec![Category::Redis, Category::Mysql, Category::Mysql]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_discards_old_category_in_flight() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.delay(Category::Redis, &[500]);
        let scheduler = scheduler(&fetcher);

        scheduler.start(Category::Redis, DASHBOARD);
        advance(100).await;
        scheduler.switch_category(Category::Postgres);
        advance(1000).await;

        let state = scheduler.state();
        assert_eq!(state.snapshot.as_ref().map(|s| s.category()), Some(Category::Postgres));
        assert_eq!(state.applied, 1);
        assert_eq!(state.discarded, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_while_stopped_starts_nothing() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let scheduler = scheduler(&fetcher);

        assert!(!scheduler.switch_category(Category::Kafka));
        advance(5000).await;

        assert_eq!(fetcher.call_count(), 0);
        assert_eq!(scheduler.timer_stats(), TimerStats::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_to_same_category_keeps_session() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let scheduler = scheduler(&fetcher);

        let session = scheduler.start(Category::Kafka, DASHBOARD);
        assert!(scheduler.switch_category(Category::Kafka));

        assert_eq!(scheduler.session().map(|s| s.id), Some(session.id));
        assert_eq!(scheduler.timer_stats().started, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_never_overlaps_timers() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let scheduler = scheduler(&fetcher);

        for category in Category::ALL {
            scheduler.start(category, DASHBOARD);
            assert_eq!(scheduler.timer_stats().live, 1);
        }
        scheduler.stop();

        assert_eq!(
            scheduler.timer_stats(),
            TimerStats {
                started: 4,
                cancelled: 4,
                live: 0,
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_snapshot_and_keeps_polling() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let scheduler = scheduler(&fetcher);

        scheduler.start(Category::Redis, Duration::from_millis(1000));
        advance(10).await;
        fetcher.set_failing(true);

        advance(2000).await;
        let state = scheduler.state();
        assert_eq!(fetcher.call_count(), 3);
        assert!(state.last_error.is_some());
        assert_eq!(shown(&scheduler).as_deref(), Some("call-1"));
        assert!(scheduler.is_active());

        fetcher.set_failing(false);
        advance(1000).await;
        let state = scheduler.state();
        assert!(state.last_error.is_none());
        assert_eq!(shown(&scheduler).as_deref(), Some("call-4"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_payload_for_other_category_is_never_applied() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.misroute_to(Category::Kafka);
        let scheduler = scheduler(&fetcher);

        scheduler.start(Category::Redis, Duration::from_millis(1000));
        advance(2500).await;

        let state = scheduler.state();
        assert!(state.snapshot.is_none());
        assert_eq!(state.applied, 0);
        assert_eq!(state.discarded, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_now() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let scheduler = scheduler(&fetcher);

        assert!(!scheduler.refresh_now());

        scheduler.start(Category::Mysql, Duration::from_secs(60));
        advance(10).await;
        assert!(scheduler.refresh_now());
        advance(10).await;

        assert_eq!(fetcher.call_count(), 2);
        assert_eq!(shown(&scheduler).as_deref(), Some("call-2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_same_category_keeps_snapshot_until_replaced() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.delay(Category::Redis, &[0, 400]);
        let scheduler = scheduler(&fetcher);

        scheduler.start(Category::Redis, DASHBOARD);
        advance(10).await;
        scheduler.start(Category::Redis, Duration::from_millis(1500));
        advance(10).await;
        assert_eq!(shown(&scheduler).as_deref(), Some("call-1"));

        advance(500).await;
        assert_eq!(shown(&scheduler).as_deref(), Some("call-2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_polling() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let scheduler = scheduler(&fetcher);
        let display = scheduler.subscribe();

        scheduler.start(Category::Kafka, Duration::from_millis(1000));
        advance(10).await;
        drop(scheduler);

        advance(5000).await;
        assert_eq!(fetcher.call_count(), 1);
        assert!(display.borrow().session.is_none());
    }
}
