use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::ui::theme::Theme;

const OVERLAY_WIDTH: u16 = 44;

/// Keybind reference, centered over the dashboard.
pub fn render(frame: &mut Frame, area: Rect, entries: &[(String, &str)], theme: &Theme) {
    let width = OVERLAY_WIDTH.min(area.width.saturating_sub(4));
    // Entries, a blank spacer, the theme line, two border rows.
    let height = (entries.len() as u16 + 4).min(area.height.saturating_sub(2));
    let overlay = centered_rect(width, height, area);

    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " Keys ",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(overlay);

    let key_style = Style::default()
        .fg(theme.pill_key_fg)
        .bg(theme.pill_key_bg)
        .add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line> = entries
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!(" {key:>8} "), key_style),
                Span::styled(format!("  {desc}"), Style::default().fg(theme.pill_desc_fg)),
            ])
        })
        .collect();
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!(" theme: {}", theme.name),
        Style::default().fg(theme.text_secondary),
    )));

    frame.render_widget(block, overlay);
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(theme.surface_bg)),
        inner,
    );
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}
