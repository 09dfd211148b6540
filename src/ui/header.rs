use std::collections::VecDeque;

use chrono::{DateTime, Local};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph, Sparkline};

use crate::cluster::rollup::Rollup;
use crate::ui::theme::Theme;

/// CPU history is stored in hundredths of a percent.
const SPARKLINE_MAX: u64 = 10_000;

pub struct HeaderInfo<'a> {
    pub endpoint: &'a str,
    pub rollup: &'a Rollup,
    pub skipped_count: usize,
    pub updated_at: Option<DateTime<Local>>,
    pub stale: bool,
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    info: &HeaderInfo<'_>,
    theme: &Theme,
    cpu_history: &VecDeque<u64>,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    render_branding(frame, chunks[0], info, theme);
    render_memory_gauge(frame, chunks[1], info.rollup, theme);
    render_cpu_sparkline(frame, chunks[2], info.rollup, theme, cpu_history);
}

fn render_branding(frame: &mut Frame, area: Rect, info: &HeaderInfo<'_>, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let secondary = Style::default().fg(theme.text_secondary);
    let mut spans = vec![
        Span::styled(
            " dtop ",
            Style::default()
                .fg(theme.header_accent_fg)
                .bg(theme.header_accent_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            info.endpoint,
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
    ];

    let mut status = vec![
        Span::styled(format!("Workers: {}", info.rollup.worker_count), secondary),
        Span::raw("  "),
        Span::styled(updated_label(info.updated_at), secondary),
    ];
    if info.skipped_count > 0 {
        status.push(Span::raw("  "));
        status.push(Span::styled(
            format!("Skipped: {}", info.skipped_count),
            Style::default().fg(theme.status_err),
        ));
    }
    if info.stale {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            " STALE ",
            Style::default()
                .fg(theme.header_accent_fg)
                .bg(theme.status_err)
                .add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(vec![Line::from(spans), Line::from(status)]), inner);
}

fn updated_label(updated_at: Option<DateTime<Local>>) -> String {
    match updated_at {
        Some(at) => format!("Updated {}", at.format("%H:%M:%S")),
        None => "Updated never".to_string(),
    }
}

fn render_memory_gauge(frame: &mut Frame, area: Rect, rollup: &Rollup, theme: &Theme) {
    let utilization = rollup.avg_memory_utilization;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " MEM ",
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(
            Style::default()
                .fg(theme.gauge_filled)
                .bg(theme.gauge_unfilled),
        )
        // Overloaded workers can push the average past 100%.
        .ratio(utilization.clamp(0.0, 1.0))
        .label(format!("{:.1}% avg", utilization * 100.0));

    frame.render_widget(gauge, area);
}

fn render_cpu_sparkline(
    frame: &mut Frame,
    area: Rect,
    rollup: &Rollup,
    theme: &Theme,
    cpu_history: &VecDeque<u64>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            format!(" CPU {:.0}% ", rollup.avg_cpu),
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let data: Vec<u64> = cpu_history.iter().copied().collect();
    let sparkline = Sparkline::default()
        .block(block)
        .data(&data)
        .max(SPARKLINE_MAX)
        .style(Style::default().fg(theme.sparkline_color));

    frame.render_widget(sparkline, area);
}
