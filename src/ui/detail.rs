//! Instance detail overlay.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::{child_columns, HealthStatus};

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the selected instance as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }
    let Some(row) = app.detail_row() else {
        return;
    };

    let overlay_width = (area.width * 95 / 100).clamp(MIN_OVERLAY_WIDTH, 110);
    let overlay_height = (area.height * 90 / 100).clamp(MIN_OVERLAY_HEIGHT, 50);
    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let detail_rows = (row.details.len() as u16).div_ceil(2);
    let chunks = Layout::vertical([
        Constraint::Length(6),               // name, status, sparklines
        Constraint::Length(detail_rows + 2), // key/value details
        Constraint::Min(4),                  // child table
        Constraint::Length(1),               // footer
    ])
    .split(overlay_area);

    // ===== HEADER =====
    let health_style = app.theme.status_style(row.health);
    let health_label = match row.health {
        HealthStatus::Healthy => "Healthy",
        HealthStatus::Unknown => "Unknown",
        HealthStatus::Warning => "Warning",
        HealthStatus::Critical => "Critical",
    };
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let header_lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", row.name), bold),
            Span::styled(row.endpoint.clone(), Style::default().fg(app.theme.muted)),
        ]),
        Line::from(vec![
            Span::raw(" Status: "),
            Span::styled(
                format!("{} {} ({})", row.health.symbol(), health_label, row.status.as_str()),
                health_style.add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw(" Throughput "),
            Span::styled(
                render_sparkline(&app.history.throughput_sparkline(&row.name)),
                Style::default().fg(app.theme.highlight),
            ),
        ]),
        Line::from(vec![
            Span::raw(" Usage      "),
            Span::styled(
                render_sparkline(&app.history.usage_sparkline(&row.name)),
                app.theme.status_style(app.thresholds.usage(row.usage)),
            ),
            Span::raw(format!(" {:.1}%", row.usage)),
        ]),
    ];

    let header = Paragraph::new(header_lines).block(
        Block::default()
            .title(format!(" {} Instance ", app.category.label()))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.highlight)),
    );
    frame.render_widget(header, chunks[0]);

    // ===== DETAILS =====
    let label_style = Style::default().fg(app.theme.muted);
    let detail_lines: Vec<Line> = row
        .details
        .chunks(2)
        .map(|pair| {
            let mut spans = Vec::new();
            for (key, value) in pair {
                spans.push(Span::styled(format!(" {key:<20}"), label_style));
                spans.push(Span::raw(format!("{value:<24}")));
            }
            Line::from(spans)
        })
        .collect();
    let details = Paragraph::new(detail_lines).block(
        Block::default()
            .title(" Details ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );
    frame.render_widget(details, chunks[1]);

    // ===== CHILDREN =====
    let headers = child_columns(app.category);
    let child_block = Block::default()
        .title(format!(" {} ({}) ", headers[0], row.children.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if row.children.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  No {} reported", headers[0].to_lowercase()),
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .block(child_block);
        frame.render_widget(empty, chunks[2]);
    } else {
        let header = Row::new(headers.iter().map(|h| Cell::from(*h)).collect::<Vec<_>>())
            .height(1)
            .style(app.theme.header);
        let rows: Vec<Row> = row
            .children
            .iter()
            .map(|cells| Row::new(cells.iter().map(|c| Cell::from(c.clone())).collect::<Vec<_>>()))
            .collect();
        let widths: Vec<Constraint> = (0..headers.len())
            .map(|i| {
                if i == 0 {
                    Constraint::Fill(3)
                } else {
                    Constraint::Fill(1)
                }
            })
            .collect();

        let table = Table::new(rows, widths).header(header).block(child_block);
        frame.render_widget(table, chunks[2]);
    }

    // ===== FOOTER =====
    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " ↑↓ switch instance | Esc to close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[3]);
}

fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return "collecting…".to_string();
    }
    data.iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]).collect()
}
