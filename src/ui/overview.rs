//! Instance table for the active category.

use std::cmp::Ordering;

use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::{columns, InstanceRow};

/// Column to sort the instance table by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    /// Worst health first when descending.
    #[default]
    Health,
    Name,
    Throughput,
    Usage,
    Lag,
}

impl SortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::Health => SortColumn::Name,
            SortColumn::Name => SortColumn::Throughput,
            SortColumn::Throughput => SortColumn::Usage,
            SortColumn::Usage => SortColumn::Lag,
            SortColumn::Lag => SortColumn::Health,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Health => "health",
            SortColumn::Name => "name",
            SortColumn::Throughput => "throughput",
            SortColumn::Usage => "usage",
            SortColumn::Lag => "lag",
        }
    }
}

/// Sort rows by `column`, falling back to name for ties.
pub fn sort_rows_by(rows: &mut [&InstanceRow], column: SortColumn, ascending: bool) {
    rows.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Health => a.health.cmp(&b.health),
            SortColumn::Name => a.name.cmp(&b.name),
            SortColumn::Throughput => a.throughput.total_cmp(&b.throughput),
            SortColumn::Usage => a.usage.total_cmp(&b.usage),
            SortColumn::Lag => a.lag.cmp(&b.lag),
        };
        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };
        if primary == Ordering::Equal {
            a.name.cmp(&b.name)
        } else {
            primary
        }
    });
}

/// Render the instance table, or a placeholder when there is nothing to show.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(ref data) = app.data else {
        let message = if app.is_monitoring() {
            format!("Waiting for {} metrics...", app.category.label())
        } else {
            format!(
                "Monitoring is paused.\n\nPress m to start polling {}.",
                app.category.label()
            )
        };
        let paragraph = Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.muted))
            .block(block.title(format!(" {} ", app.category.label())));
        frame.render_widget(paragraph, area);
        return;
    };

    if data.rows.is_empty() {
        let paragraph = Paragraph::new(format!("No {} instances configured", app.category.label()))
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.muted))
            .block(block.title(format!(" {} (0) ", app.category.label())));
        frame.render_widget(paragraph, area);
        return;
    }

    let rows = app.visible_rows();
    let headers = columns(app.category);
    let status_col = headers.len() - 1;

    let header = Row::new(headers.iter().map(|h| Cell::from(*h)).collect::<Vec<_>>())
        .height(1)
        .style(app.theme.header);

    let table_rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            let health_style = app.theme.status_style(row.health);
            let cells: Vec<Cell> = row
                .cells
                .iter()
                .enumerate()
                .map(|(i, text)| {
                    if i == status_col {
                        Cell::from(Span::styled(
                            format!("{} {}", row.health.symbol(), text),
                            health_style,
                        ))
                    } else {
                        Cell::from(text.clone())
                    }
                })
                .collect();
            Row::new(cells)
        })
        .collect();

    // Name and endpoint get the larger share
    let widths: Vec<Constraint> = (0..headers.len())
        .map(|i| match i {
            0 | 1 => Constraint::Fill(2),
            i if i == status_col => Constraint::Min(12),
            _ => Constraint::Fill(1),
        })
        .collect();

    let selected = app.selected_index.min(rows.len().saturating_sub(1));
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };
    let position_info = if !rows.is_empty() {
        format!(" [{}/{}]", selected + 1, rows.len())
    } else {
        String::new()
    };

    let title = format!(
        " {} ({}/{}) [s:sort {}{}]{}{} ",
        app.category.label(),
        rows.len(),
        data.rows.len(),
        app.sort_column.label(),
        sort_dir,
        filter_info,
        position_info
    );

    let table = Table::new(table_rows, widths)
        .header(header)
        .block(block.title(title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

#[cfg(test)]
mod tests {
    use dbwatch_types::InstanceStatus;

    use super::*;
    use crate::data::HealthStatus;

    fn row(name: &str, health: HealthStatus, throughput: f64, lag: u64) -> InstanceRow {
        InstanceRow {
            name: name.to_string(),
            endpoint: String::new(),
            status: InstanceStatus::Online,
            health,
            cells: Vec::new(),
            throughput,
            usage: 0.0,
            lag,
            details: Vec::new(),
            children: Vec::new(),
        }
    }

    fn names(rows: &[&InstanceRow]) -> Vec<String> {
        rows.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn test_sort_by_health_descending() {
        let a = row("a", HealthStatus::Healthy, 5.0, 0);
        let b = row("b", HealthStatus::Critical, 1.0, 0);
        let c = row("c", HealthStatus::Critical, 9.0, 0);
        let mut rows = vec![&a, &b, &c];

        sort_rows_by(&mut rows, SortColumn::Health, false);
        assert_eq!(names(&rows), ["b", "c", "a"]);

        sort_rows_by(&mut rows, SortColumn::Throughput, false);
        assert_eq!(names(&rows), ["c", "a", "b"]);
    }

    #[test]
    fn test_sort_ties_break_by_name() {
        let x = row("x", HealthStatus::Healthy, 0.0, 7);
        let y = row("y", HealthStatus::Healthy, 0.0, 7);
        let mut rows = vec![&y, &x];

        sort_rows_by(&mut rows, SortColumn::Lag, true);
        assert_eq!(names(&rows), ["x", "y"]);
    }

    #[test]
    fn test_sort_column_cycles() {
        let mut col = SortColumn::default();
        for _ in 0..5 {
            col = col.next();
        }
        assert_eq!(col, SortColumn::Health);
    }
}
