//! Common UI components shared across views.
//!
//! This module contains the header bar, category tabs, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use dbwatch_types::Category;

use crate::app::App;
use crate::data::format::format_bytes;
use crate::data::HealthStatus;

/// Render the header bar: overall health, status counts and polling state.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let badge = if app.is_monitoring() {
        Span::styled(" LIVE ", app.theme.live)
    } else {
        Span::styled(" PAUSED ", app.theme.paused)
    };

    let Some(ref data) = app.data else {
        let line = Line::from(vec![
            badge,
            Span::styled(" DBWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("│ {} │ no data", app.category.label())),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let counts = data.counts;
    let overall = data.overall_health();
    let dim = Style::default().add_modifier(Modifier::DIM);
    let count_span = |n: usize, status: HealthStatus| {
        if n > 0 {
            Span::styled(n.to_string(), app.theme.status_style(status))
        } else {
            Span::styled("0", dim)
        }
    };

    let mut spans = vec![
        badge,
        Span::styled(" ● ", app.theme.status_style(overall)),
        Span::styled("DBWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        count_span(counts.online, HealthStatus::Healthy),
        Span::raw(" online "),
        count_span(counts.warning, HealthStatus::Warning),
        Span::raw(" warn "),
        count_span(counts.offline, HealthStatus::Critical),
        Span::raw(" offline "),
        count_span(counts.unknown, HealthStatus::Unknown),
        Span::raw(" unknown │ "),
        Span::styled(
            counts.total().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {} ", app.category.label())),
    ];
    let lag = data.total_lag();
    if lag > 0 {
        let lag = match app.category {
            Category::Kafka => format!("{lag} msgs"),
            _ => format_bytes(lag as f64),
        };
        spans.push(Span::raw(format!("│ lag {lag} ")));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn tab_title(category: Category) -> String {
    format!("{}:{}", category.index() + 1, category.label())
}

/// Render the category tab bar.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Category::ALL.iter().map(|c| Line::from(tab_title(*c))).collect();

    let tabs = Tabs::new(titles)
        .select(app.category.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// The tab drawn at `column` of the tab bar.
///
/// Each tab is its title padded by one space on both sides, followed by a
/// one-column divider.
pub fn tab_at(column: u16) -> Option<Category> {
    let mut start = 0u16;
    for category in Category::ALL {
        let width = tab_title(category).chars().count() as u16 + 2;
        if column < start + width {
            return Some(category);
        }
        start += width + 1;
    }
    None
}

/// Render the status bar: last update, errors and controls.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(ref err) = app.state.last_error {
        let paragraph = Paragraph::new(format!(" Fetch failed: {} | r:retry q:quit", err))
            .style(Style::default().fg(app.theme.critical));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = if app.filter_active {
        "Type to search | Enter:apply Esc:cancel"
    } else if app.show_detail_overlay {
        "↑↓:instance Esc:close r:refresh ?:help"
    } else {
        "m:start/stop Tab:category Enter:detail /:search s:sort ?:help q:quit"
    };

    let polling = match app.state.session {
        Some(ref session) => format!("every {:.1}s", session.interval.as_secs_f64()),
        None => "paused".to_string(),
    };
    let updated = match app.state.updated_at {
        Some(at) => format!("updated {:.1}s ago", at.elapsed().as_secs_f64()),
        None => "never updated".to_string(),
    };

    let status = format!(" {} | {} | {} | {}", app.category.label(), polling, updated, controls);
    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Monitoring"),
        Line::from("  m/Space     Start or stop polling"),
        Line::from("  r           Refresh now"),
        Line::from("  Tab/←/→     Switch category"),
        Line::from("  1-4         Jump to category"),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ↑/↓ j/k     Select instance"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Instance detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Table"),
        Line::from("  /           Filter by name"),
        Line::from("  c           Clear filter"),
        Line::from("  s/S         Sort column/direction"),
        Line::from(""),
        section(" General"),
        Line::from("  e           Export to JSON"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 28u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
