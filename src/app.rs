//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use dbwatch_types::Category;
use tokio::sync::watch;

use crate::data::{snapshot_report, History, InstanceRow, MonitorData, Thresholds};
use crate::scheduler::{DisplayState, RefreshScheduler};
use crate::ui::overview::{sort_rows_by, SortColumn};
use crate::ui::Theme;

/// Polling cadences for the two screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intervals {
    pub dashboard: Duration,
    pub detail: Duration,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            dashboard: Duration::from_millis(3000),
            detail: Duration::from_millis(1500),
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    /// The category tab on screen.
    pub category: Category,
    scheduler: RefreshScheduler,
    display: watch::Receiver<DisplayState>,
    /// Last display state received from the scheduler.
    pub state: DisplayState,
    last_applied: u64,

    pub data: Option<MonitorData>,
    pub history: History,
    pub thresholds: Thresholds,
    pub intervals: Intervals,

    // Navigation state
    pub selected_index: usize,
    /// Instance the detail overlay is pinned to, by name.
    pub detail_instance: Option<String>,

    // Sorting
    pub sort_column: SortColumn,
    pub sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create an app showing `category`, with monitoring stopped.
    pub fn new(
        scheduler: RefreshScheduler,
        category: Category,
        intervals: Intervals,
        thresholds: Thresholds,
    ) -> Self {
        let display = scheduler.subscribe();
        let state = display.borrow().clone();
        Self {
            running: true,
            show_help: false,
            show_detail_overlay: false,
            category,
            state,
            scheduler,
            display,
            last_applied: 0,
            data: None,
            history: History::new(),
            thresholds,
            intervals,
            selected_index: 0,
            detail_instance: None,
            sort_column: SortColumn::default(),
            sort_ascending: false,
            filter_text: String::new(),
            filter_active: false,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    pub fn is_monitoring(&self) -> bool {
        self.scheduler.is_active()
    }

    /// Interval the current screen polls at.
    pub fn current_interval(&self) -> Duration {
        if self.show_detail_overlay {
            self.intervals.detail
        } else {
            self.intervals.dashboard
        }
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Pick up the scheduler's latest state.
    ///
    /// Returns true if anything changed since the last call.
    pub fn poll(&mut self) -> bool {
        if !self.display.has_changed().unwrap_or(false) {
            return false;
        }
        let state = self.display.borrow_and_update().clone();

        if state.applied != self.last_applied {
            self.last_applied = state.applied;
            if let Some(snapshot) = state.snapshot_for(self.category) {
                let data = MonitorData::from_snapshot(snapshot, &self.thresholds);
                self.history.record(&data);
                self.selected_index = self
                    .selected_index
                    .min(self.visible_count(&data).saturating_sub(1));
                self.data = Some(data);
                self.anchor_selection();
            }
        }

        self.state = state;
        true
    }

    /// Start or stop polling the current category.
    pub fn toggle_monitoring(&mut self) {
        if self.scheduler.stop() {
            self.set_status_message("Monitoring paused".to_string());
        } else {
            let interval = self.current_interval();
            self.scheduler.start(self.category, interval);
            self.set_status_message(format!(
                "Monitoring {} every {:.1}s",
                self.category.label(),
                interval.as_secs_f64()
            ));
        }
    }

    /// Show another category; a running session follows it.
    pub fn set_category(&mut self, category: Category) {
        if category == self.category {
            return;
        }
        self.category = category;
        self.data = None;
        self.history.clear();
        self.selected_index = 0;
        self.show_detail_overlay = false;
        self.detail_instance = None;

        let dashboard = self.intervals.dashboard;
        match self.scheduler.session() {
            Some(session) if session.interval != dashboard => {
                self.scheduler.start(category, dashboard);
            }
            Some(_) => {
                self.scheduler.switch_category(category);
            }
            None => {}
        }
    }

    pub fn next_category(&mut self) {
        self.set_category(self.category.next());
    }

    pub fn prev_category(&mut self) {
        self.set_category(self.category.prev());
    }

    /// Fetch now instead of waiting for the next tick.
    pub fn refresh(&mut self) {
        if !self.scheduler.refresh_now() {
            self.set_status_message("Monitoring is paused (press m to start)".to_string());
        }
    }

    /// Rows after filtering and sorting, in display order.
    pub fn visible_rows(&self) -> Vec<&InstanceRow> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        let mut rows: Vec<&InstanceRow> = data
            .rows
            .iter()
            .filter(|r| self.matches_filter(&r.name))
            .collect();
        sort_rows_by(&mut rows, self.sort_column, self.sort_ascending);
        rows
    }

    /// The row under the cursor.
    pub fn selected_row(&self) -> Option<&InstanceRow> {
        self.visible_rows().get(self.selected_index).copied()
    }

    /// The row the detail overlay shows; follows the instance across re-sorts.
    pub fn detail_row(&self) -> Option<&InstanceRow> {
        let name = self.detail_instance.as_deref()?;
        self.data.as_ref()?.rows.iter().find(|r| r.name == name)
    }

    /// Keep the cursor on the pinned instance after rows change order.
    fn anchor_selection(&mut self) {
        let Some(ref name) = self.detail_instance else {
            return;
        };
        let position = self.visible_rows().iter().position(|r| &r.name == name);
        if let Some(index) = position {
            self.selected_index = index;
        }
    }

    /// While the overlay is open, moving the cursor moves the overlay too.
    fn follow_selection(&mut self) {
        if self.show_detail_overlay {
            if let Some(name) = self.selected_row().map(|r| r.name.clone()) {
                self.detail_instance = Some(name);
            }
        }
    }

    fn visible_count(&self, data: &MonitorData) -> usize {
        data.rows.iter().filter(|r| self.matches_filter(&r.name)).count()
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        if let Some(ref data) = self.data {
            let max = self.visible_count(data).saturating_sub(1);
            self.selected_index = (self.selected_index + n).min(max);
        }
        self.follow_selection();
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_index = self.selected_index.saturating_sub(n);
        self.follow_selection();
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
        self.follow_selection();
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        if let Some(ref data) = self.data {
            self.selected_index = self.visible_count(data).saturating_sub(1);
        }
        self.follow_selection();
    }

    /// Open the detail overlay for the selected instance.
    ///
    /// A running session switches to the detail interval.
    pub fn enter_detail(&mut self) {
        let Some(name) = self.selected_row().map(|r| r.name.clone()) else {
            return;
        };
        self.detail_instance = Some(name);
        self.show_detail_overlay = true;
        self.restart_at(self.intervals.detail);
    }

    /// Close the detail overlay and return to the dashboard interval.
    pub fn close_overlay(&mut self) {
        if !self.show_detail_overlay {
            return;
        }
        self.show_detail_overlay = false;
        self.detail_instance = None;
        self.restart_at(self.intervals.dashboard);
    }

    fn restart_at(&mut self, interval: Duration) {
        if let Some(session) = self.scheduler.session() {
            if session.interval != interval {
                self.scheduler.start(session.category, interval);
            }
        }
    }

    /// Navigate back: close the overlay first, then clear the filter.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.close_overlay();
        } else if !self.filter_text.is_empty() {
            self.clear_filter();
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column.
    pub fn cycle_sort(&mut self) {
        self.sort_column = self.sort_column.next();
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        self.sort_ascending = !self.sort_ascending;
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.selected_index = 0;
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Check if an instance name matches the current filter.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.scheduler.stop();
        self.running = false;
    }

    /// Write the displayed snapshot and its summary to `path`.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(snapshot) = self.state.snapshot_for(self.category) else {
            bail!("No data to export");
        };
        let report = snapshot_report(snapshot, &self.thresholds);
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
